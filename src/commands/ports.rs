use super::open_registry;
use crate::cli::PortsCommands;
use crate::output::UserOutput;
use lns::config::ConfigDir;
use lns::Framework;

pub fn run_ports(cmd: &PortsCommands, config: &ConfigDir, out: &dyn UserOutput) -> anyhow::Result<()> {
    let manager = open_registry(config)?;

    match cmd {
        PortsCommands::List { json } => {
            let ports = manager.port_list();
            if *json {
                out.status(&serde_json::to_string_pretty(&ports)?);
                return Ok(());
            }

            out.status("Port Assignments");
            out.status("================");
            out.blank();
            if ports.is_empty() {
                out.status("No ports are currently assigned.");
                out.status("Ports are assigned by `lns service add`.");
                return Ok(());
            }
            for entry in &ports {
                out.status(&format!(
                    "  {:>5}  {:<20} {}",
                    entry.port, entry.project, entry.service
                ));
            }
        }
        PortsCommands::Check { port } => match manager.check_port_conflict(*port) {
            Some(owner) => out.status(&format!("Port {} is in use by {}", port, owner)),
            None => out.status(&format!("Port {} is available", port)),
        },
        PortsCommands::Suggest { framework } => {
            let framework = Framework::from(framework.as_str());
            let suggestion = manager.suggest_port(&framework);
            out.status(&format!(
                "{} (preferred range for {}: {}-{})",
                suggestion.port, framework, suggestion.range_start, suggestion.range_end
            ));
            if !(suggestion.range_start..=suggestion.range_end).contains(&suggestion.port) {
                out.warning("Preferred range is full; suggested port is from the overflow range");
            }
        }
    }

    Ok(())
}

pub fn run_frameworks(out: &dyn UserOutput) -> anyhow::Result<()> {
    out.status(&format!(
        "  {:<10} {:>7}  {:<11} {}",
        "FRAMEWORK", "DEFAULT", "RANGE", "HMR"
    ));
    for framework in Framework::all() {
        let info = framework.info();
        out.status(&format!(
            "  {:<10} {:>7}  {:<11} {}",
            framework,
            info.default_port,
            format!("{}-{}", info.port_start, info.port_end),
            if info.needs_hmr { "yes" } else { "no" }
        ));
    }
    Ok(())
}
