use super::{open_registry, route_upstream};
use crate::cli::ProjectCommands;
use crate::output::UserOutput;
use lns::config::ConfigDir;
use lns::Project;

pub fn run_project(cmd: &ProjectCommands, config: &ConfigDir, out: &dyn UserOutput) -> anyhow::Result<()> {
    let mut manager = open_registry(config)?;

    match cmd {
        ProjectCommands::Add {
            name,
            path,
            prefix,
            docker_network,
        } => {
            let project = manager.add_project(
                name,
                path.as_deref(),
                prefix.as_deref(),
                docker_network.as_deref(),
            )?;
            out.success(&format!("Added project '{}'", project.name));
            out.status(&format!("  Hostname prefix: {}", project.prefix()));
            out.status(&format!("  Add a service with: lns service add {} <name>", project.name));
        }
        ProjectCommands::Remove { name } => {
            let released = manager
                .get_project(name)
                .map(|p| p.services.len())
                .unwrap_or_default();
            manager.remove_project(name)?;
            out.success(&format!(
                "Removed project '{}' ({} port{} released)",
                name,
                released,
                if released == 1 { "" } else { "s" }
            ));
        }
        ProjectCommands::List { json } => {
            let projects = manager.list_projects();
            if *json {
                out.status(&serde_json::to_string_pretty(&projects)?);
                return Ok(());
            }

            if projects.is_empty() {
                out.status("No projects registered.");
                out.status("Register one with `lns project add <name>`.");
                return Ok(());
            }
            for project in projects {
                let path = project
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string());
                out.status(&format!(
                    "  {:<20} {:>2} service(s)  {}",
                    project.name,
                    project.services.len(),
                    path
                ));
            }
        }
        ProjectCommands::Show { name, json } => {
            let project = manager
                .get_project(name)
                .ok_or_else(|| lns::Error::ProjectNotFound(name.clone()))?;
            if *json {
                out.status(&serde_json::to_string_pretty(project)?);
            } else {
                print_project(project, out);
            }
        }
        ProjectCommands::SetPath { name, path } => {
            manager.update_project_path(name, path)?;
            out.success(&format!("Updated path of '{}' to {}", name, path.display()));
        }
    }

    Ok(())
}

fn print_project(project: &Project, out: &dyn UserOutput) {
    out.status(&format!("Project: {}", project.name));
    out.status(&format!("  Prefix: {}", project.prefix()));
    if let Some(path) = &project.path {
        out.status(&format!("  Path: {}", path.display()));
    }
    if let Some(network) = &project.docker_network {
        out.status(&format!("  Docker network: {}", network));
    }
    out.blank();

    if project.services.is_empty() {
        out.status("  No services registered.");
        return;
    }
    for service in &project.services {
        out.status(&format!(
            "  {:<16} {:>5}  {:<10} {} -> {}{}",
            service.name,
            service.port,
            service.framework,
            project.service_hostname(service),
            route_upstream(service),
            service
                .path_prefix
                .as_deref()
                .map(|p| format!("  (path {})", p))
                .unwrap_or_default()
        ));
    }
}
