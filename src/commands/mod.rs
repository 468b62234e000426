mod ports;
mod project;
mod service;
mod settings;

pub use ports::{run_frameworks, run_ports};
pub use project::run_project;
pub use service::run_service;
pub use settings::run_settings;

use lns::config::ConfigDir;
use lns::{RegistryManager, Service};

/// Opens the registry inside `config`.
fn open_registry(config: &ConfigDir) -> anyhow::Result<RegistryManager> {
    Ok(RegistryManager::open(config.registry_path())?)
}

/// Address the proxy forwards to: the container for Docker-routed services.
fn route_upstream(service: &Service) -> String {
    if service.docker {
        service.docker_upstream()
    } else {
        service.upstream()
    }
}
