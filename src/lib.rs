//! # lns
//!
//! A registry for local development servers.
//!
//! ## Features
//!
//! - **Projects and Services**: Group the dev servers of one codebase under a project name
//! - **Port Allocation**: Each service gets a port from its framework's preferred range,
//!   with an overflow range once that fills up
//! - **Collision Index**: No two services anywhere in the registry share a port
//! - **Proxy Routing Data**: Effective hostnames (`{prefix}-{service}.localhost`) and
//!   upstream addresses for a reverse proxy to consume
//! - **Settings**: Listener port and admin address for the proxy layer
//!
//! ## Quick Start
//!
//! ```no_run
//! use lns::{Framework, RegistryManager, ServiceRequest};
//!
//! # fn example() -> Result<(), lns::Error> {
//! let mut manager = RegistryManager::new()?;
//! manager.add_project("blog", None, None, None)?;
//!
//! // Picks 3000, or the next free port in 3000-3099
//! let (web, _) = manager.add_service("blog", ServiceRequest::new("web", Framework::NextJs))?;
//!
//! let project = manager.get_project("blog").expect("just added");
//! println!("{} -> {}", project.service_hostname(&web), web.upstream());
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Model
//!
//! The registry is one JSON file. A [`RegistryManager`] reads it once and
//! rewrites all of it after every mutating call, through a temp file and a
//! rename. There is no locking: two processes mutating the same file race,
//! and the last writer wins.

pub mod config;
pub mod error;
pub mod models;
pub mod registry;

// Re-export commonly used types
pub use config::Settings;
pub use error::{Error, Result};
pub use models::{Framework, FrameworkInfo, PortOwner, Project, Registry, Service, Violation};
pub use registry::{PortEntry, PortSuggestion, RegistryManager, ServiceRequest};
