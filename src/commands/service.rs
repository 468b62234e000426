use super::{open_registry, route_upstream};
use crate::cli::ServiceCommands;
use crate::output::UserOutput;
use lns::config::ConfigDir;
use lns::{Framework, ServiceRequest};

pub fn run_service(cmd: &ServiceCommands, config: &ConfigDir, out: &dyn UserOutput) -> anyhow::Result<()> {
    let mut manager = open_registry(config)?;

    match cmd {
        ServiceCommands::Add {
            project,
            name,
            framework,
            port,
            hostname,
            docker,
            container_name,
            path_prefix,
        } => {
            let request = ServiceRequest {
                name: name.clone(),
                framework: Framework::from(framework.as_str()),
                port: *port,
                hostname: hostname.clone(),
                docker: *docker,
                container_name: container_name.clone(),
                path_prefix: path_prefix.clone(),
            };
            let auto = request.port.is_none();
            let (service, port) = manager.add_service(project, request)?;

            let owner = manager
                .get_project(project)
                .ok_or_else(|| lns::Error::ProjectNotFound(project.clone()))?;
            out.success(&format!(
                "Added service '{}' to '{}' on port {}{}",
                service.name,
                project,
                port,
                if auto { " (auto-assigned)" } else { "" }
            ));
            out.status(&format!(
                "  {} -> {}",
                owner.service_hostname(&service),
                route_upstream(&service)
            ));
            if service.docker && service.container_name.is_none() {
                out.warning("  --docker without --container-name routes to localhost");
            }
        }
        ServiceCommands::Remove { project, name } => {
            let port = manager
                .get_project(project)
                .and_then(|p| p.service(name))
                .map(|s| s.port);
            manager.remove_service(project, name)?;
            match port {
                Some(port) => out.success(&format!(
                    "Removed service '{}' from '{}' (port {} released)",
                    name, project, port
                )),
                None => out.success(&format!("Removed service '{}' from '{}'", name, project)),
            }
        }
    }

    Ok(())
}
