//! Plain data records for the registry: projects, their services, and the
//! port index. Nothing here performs I/O.

pub mod framework;

pub use framework::{valid_frameworks, Framework, FrameworkInfo};

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

/// Version tag written into new registry files.
pub const REGISTRY_VERSION: &str = "1.0";

/// One runnable dev server inside a project, bound to one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub port: u16,
    #[serde(default)]
    pub framework: Framework,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub docker: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_prefix: Option<String>,
}

impl Service {
    /// Hostname the proxy routes to this service: the explicit override, or
    /// `{prefix}-{name}.localhost`.
    pub fn hostname(&self, project_prefix: &str) -> String {
        match self.hostname.as_deref().filter(|h| !h.is_empty()) {
            Some(hostname) => hostname.to_string(),
            None => format!("{}-{}.localhost", project_prefix, self.name),
        }
    }

    pub fn upstream(&self) -> String {
        format!("localhost:{}", self.port)
    }

    /// Upstream address when the proxy itself runs inside Docker. Falls back to
    /// [`Service::upstream`] unless the service is Docker-routed with a
    /// container name.
    pub fn docker_upstream(&self) -> String {
        match self.container_name.as_deref().filter(|c| !c.is_empty()) {
            Some(container) if self.docker => format!("{}:{}", container, self.port),
            _ => self.upstream(),
        }
    }
}

/// A named group of services, usually one local codebase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<Service>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docker_network: Option<String>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            path: None,
            services: Vec::new(),
            docker_network: None,
        }
    }

    /// Hostname prefix; the project name unless an explicit prefix is set.
    pub fn prefix(&self) -> &str {
        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => &self.name,
        }
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn service_hostname(&self, service: &Service) -> String {
        service.hostname(self.prefix())
    }
}

/// The `(project, service)` pair holding a port.
///
/// Stored on disk as `"project:service"`; the string is split once, on the
/// first `:`, when the registry is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PortOwner {
    pub project: String,
    pub service: String,
}

impl PortOwner {
    pub fn new(project: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            service: service.into(),
        }
    }
}

impl From<String> for PortOwner {
    fn from(owner: String) -> Self {
        match owner.split_once(':') {
            Some((project, service)) => PortOwner::new(project, service),
            None => PortOwner::new(owner, String::new()),
        }
    }
}

impl From<PortOwner> for String {
    fn from(owner: PortOwner) -> Self {
        owner.to_string()
    }
}

impl fmt::Display for PortOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project, self.service)
    }
}

/// The aggregate root: every project plus the authoritative port index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: HashMap<String, Project>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub port_assignments: BTreeMap<u16, PortOwner>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            version: REGISTRY_VERSION.to_string(),
            projects: HashMap::new(),
            port_assignments: BTreeMap::new(),
        }
    }

    pub fn owner_of(&self, port: u16) -> Option<&PortOwner> {
        self.port_assignments.get(&port)
    }

    /// Verifies that the port index and the service lists describe the same
    /// assignments, and that names are unique. Returns the first violation.
    pub fn check_consistency(&self) -> Result<()> {
        match self.violations().into_iter().next() {
            Some(violation) => Err(Error::Inconsistent(violation.to_string())),
            None => Ok(()),
        }
    }

    /// Every way the registry breaks its invariants, in a stable order
    /// (projects by name, services in list order, then orphaned ports).
    pub fn violations(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut seen_ports: HashMap<u16, PortOwner> = HashMap::new();

        for (key, project) in self.sorted_projects() {
            if key != &project.name {
                violations.push(Violation::MisnamedProject {
                    key: key.clone(),
                    name: project.name.clone(),
                });
            }

            let mut names = HashSet::new();
            for service in &project.services {
                if !names.insert(service.name.as_str()) {
                    violations.push(Violation::DuplicateService {
                        project: project.name.clone(),
                        service: service.name.clone(),
                    });
                }

                let owner = PortOwner::new(&project.name, &service.name);
                if let Some(first) = seen_ports.get(&service.port) {
                    violations.push(Violation::SharedPort {
                        port: service.port,
                        first: first.clone(),
                        second: owner.clone(),
                    });
                } else {
                    seen_ports.insert(service.port, owner.clone());
                }

                match self.port_assignments.get(&service.port) {
                    Some(indexed) if indexed == &owner => {}
                    Some(indexed) => violations.push(Violation::IndexMismatch {
                        port: service.port,
                        indexed: indexed.clone(),
                        used_by: owner,
                    }),
                    None => violations.push(Violation::MissingIndex {
                        port: service.port,
                        owner,
                    }),
                }
            }
        }

        for (port, owner) in &self.port_assignments {
            if !seen_ports.contains_key(port) {
                violations.push(Violation::OrphanIndex {
                    port: *port,
                    owner: owner.clone(),
                });
            }
        }

        violations
    }

    /// Drops the index entry for `port` if `owner` holds it. Another service
    /// still listed on the same port then takes the entry over.
    pub fn release_port(&mut self, port: u16, owner: &PortOwner) {
        if self.port_assignments.get(&port) != Some(owner) {
            return;
        }
        self.port_assignments.remove(&port);

        let next = self.sorted_projects().into_iter().find_map(|(_, project)| {
            project
                .services
                .iter()
                .find(|s| s.port == port)
                .map(|s| PortOwner::new(&project.name, &s.name))
        });
        if let Some(next) = next {
            self.port_assignments.insert(port, next);
        }
    }

    fn sorted_projects(&self) -> Vec<(&String, &Project)> {
        let mut projects: Vec<_> = self.projects.iter().collect();
        projects.sort_by(|a, b| a.0.cmp(b.0));
        projects
    }
}

/// One broken invariant, as found by [`Registry::violations`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Violation {
    MisnamedProject { key: String, name: String },
    DuplicateService { project: String, service: String },
    SharedPort { port: u16, first: PortOwner, second: PortOwner },
    IndexMismatch { port: u16, indexed: PortOwner, used_by: PortOwner },
    MissingIndex { port: u16, owner: PortOwner },
    OrphanIndex { port: u16, owner: PortOwner },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MisnamedProject { key, name } => {
                write!(f, "project stored under '{}' is named '{}'", key, name)
            }
            Violation::DuplicateService { project, service } => {
                write!(f, "service '{}' appears twice in project '{}'", service, project)
            }
            Violation::SharedPort { port, first, second } => {
                write!(f, "port {} is held by both {} and {}", port, first, second)
            }
            Violation::IndexMismatch {
                port,
                indexed,
                used_by,
            } => write!(f, "port {} is indexed to {} but used by {}", port, indexed, used_by),
            Violation::MissingIndex { port, owner } => write!(
                f,
                "port {} used by {} is missing from the port index",
                port, owner
            ),
            Violation::OrphanIndex { port, owner } => write!(
                f,
                "port {} is indexed to {} but no such service holds it",
                port, owner
            ),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
