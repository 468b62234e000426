use crate::cli::SettingsCommands;
use crate::output::UserOutput;
use lns::config::ConfigDir;
use lns::Settings;

pub fn run_settings(cmd: &SettingsCommands, config: &ConfigDir, out: &dyn UserOutput) -> anyhow::Result<()> {
    let path = config.settings_path();
    let current = Settings::load_from(&path)?;

    match cmd {
        SettingsCommands::Show { json } => {
            if *json {
                out.status(&serde_json::to_string_pretty(&current)?);
            } else {
                out.status(&format!("http_port:  {}", current.http_port));
                out.status(&format!("admin_addr: {}", current.admin_addr));
            }
        }
        SettingsCommands::Set {
            http_port,
            admin_addr,
        } => {
            let requested = Settings {
                http_port: http_port.unwrap_or(current.http_port),
                admin_addr: admin_addr.clone().unwrap_or(current.admin_addr),
            };
            let saved = requested.clone().normalized();
            if saved != requested {
                out.warning(&format!(
                    "Invalid value replaced with default (http_port {}, admin_addr {})",
                    saved.http_port, saved.admin_addr
                ));
            }

            config.ensure()?;
            saved.save_to(&path)?;
            out.success(&format!("Saved settings to {}", path.display()));
        }
    }

    Ok(())
}
