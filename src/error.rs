// Allow unused_assignments at module level because thiserror's generated code
// for struct variants triggers false positive warnings - the fields ARE used
// in the Display impl but rustc's lint pass doesn't see this.
#![allow(unused_assignments)]

use crate::models::PortOwner;
use miette::Diagnostic;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Project '{0}' not found")]
    #[diagnostic(
        code(lns::project::not_found),
        help("List registered projects with `lns project list`")
    )]
    ProjectNotFound(String),

    #[error("Service '{service}' not found in project '{project}'")]
    #[diagnostic(
        code(lns::service::not_found),
        help("Show the project's services with `lns project show {project}`")
    )]
    ServiceNotFound { project: String, service: String },

    #[error("Project '{0}' already exists")]
    #[diagnostic(
        code(lns::project::exists),
        help("Choose a different name or remove the existing project with `lns project remove {0}`")
    )]
    ProjectExists(String),

    #[error("Service '{service}' already exists in project '{project}'")]
    #[diagnostic(
        code(lns::service::exists),
        help("Choose a different service name or remove it with `lns service remove {project} {service}`")
    )]
    ServiceExists { project: String, service: String },

    #[error("Port {port} is already in use by {owner}")]
    #[diagnostic(
        code(lns::port::conflict),
        help("Omit --port to auto-assign a free port, or run `lns ports list` to see assignments")
    )]
    PortConflict { port: u16, owner: PortOwner },

    #[error("Invalid port {0}: ports must be between 1 and 65535")]
    #[diagnostic(code(lns::port::invalid))]
    InvalidPort(u16),

    #[error("Failed to decode {}: {source}", .path.display())]
    #[diagnostic(
        code(lns::storage::decode),
        help("The file is not valid JSON. Fix it by hand or move it aside to start fresh")
    )]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Filesystem error at {}: {source}", .path.display())]
    #[diagnostic(code(lns::filesystem::error))]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Registry is inconsistent: {0}")]
    #[diagnostic(
        code(lns::registry::inconsistent),
        help("The port index and the project service lists disagree. Remove the offending project or service and try again")
    )]
    Inconsistent(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for the "referenced project or service does not exist" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::ProjectNotFound(_) | Error::ServiceNotFound { .. }
        )
    }

    /// True for the "duplicate project or service name" family.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::ProjectExists(_) | Error::ServiceExists { .. })
    }

    /// Returns a helpful suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Error::ProjectNotFound(name) => Some(format!(
                "Register it first with 'lns project add {}', or check 'lns project list'.",
                name
            )),
            Error::ServiceNotFound { project, .. } => Some(format!(
                "Check the services registered for '{}' with 'lns project show {}'.",
                project, project
            )),
            Error::ProjectExists(_) | Error::ServiceExists { .. } => {
                Some("Names must be unique. Pick another name or remove the existing entry first.".to_string())
            }
            Error::PortConflict { port, owner } => Some(format!(
                "Port {} belongs to {}. Omit --port to let lns pick a free port in the framework's range.",
                port, owner
            )),
            Error::InvalidPort(_) => {
                Some("Omit --port to auto-assign a port instead of passing 0.".to_string())
            }
            Error::Decode { path, .. } => Some(format!(
                "Inspect {} for syntax errors. Moving it aside resets lns to an empty state.",
                path.display()
            )),
            Error::Filesystem { path, .. } => Some(format!(
                "Check permissions and free space for {}.",
                path.display()
            )),
            _ => None,
        }
    }

    /// Formats the error with its suggestion (if any) for user-friendly display.
    pub fn with_suggestion(&self) -> String {
        match self.suggestion() {
            Some(suggestion) => format!("{}\n\nHint: {}", self, suggestion),
            None => self.to_string(),
        }
    }
}
