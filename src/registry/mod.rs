//! The registry manager: loads the registry file once, applies mutations in
//! memory, and rewrites the whole file after each one.
//!
//! # Example
//!
//! ```no_run
//! use lns::{Framework, RegistryManager, ServiceRequest};
//!
//! # fn example() -> Result<(), lns::Error> {
//! let mut manager = RegistryManager::new()?;
//! manager.add_project("blog", Some("/srv/blog".as_ref()), None, None)?;
//! let (_, port) = manager.add_service("blog", ServiceRequest::new("web", Framework::NextJs))?;
//! println!("blog-web.localhost -> localhost:{}", port);
//! # Ok(())
//! # }
//! ```

pub mod allocator;

use crate::config;
use crate::error::{Error, Result};
use crate::models::{Framework, PortOwner, Project, Registry, Service, Violation};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

pub use allocator::{find_available_port, LAST_RESORT_PORT, OVERFLOW_RANGE};

/// Everything needed to register a service.
///
/// `port: None` asks the manager to pick a free port in the framework's
/// preferred range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRequest {
    pub name: String,
    pub framework: Framework,
    pub port: Option<u16>,
    pub hostname: Option<String>,
    pub docker: bool,
    pub container_name: Option<String>,
    pub path_prefix: Option<String>,
}

impl ServiceRequest {
    pub fn new(name: impl Into<String>, framework: Framework) -> Self {
        Self {
            name: name.into(),
            framework,
            ..Self::default()
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn docker(mut self, container_name: Option<String>) -> Self {
        self.docker = true;
        self.container_name = container_name;
        self
    }

    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }
}

/// One row of [`RegistryManager::port_list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortEntry {
    pub port: u16,
    pub project: String,
    pub service: String,
}

/// Result of [`RegistryManager::suggest_port`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortSuggestion {
    pub port: u16,
    pub range_start: u16,
    pub range_end: u16,
}

/// Owns the in-memory registry and the file it was loaded from.
///
/// One instance per process; there is no locking against other processes
/// writing the same file, and the last writer wins.
#[derive(Debug)]
pub struct RegistryManager {
    registry: Registry,
    path: PathBuf,
}

impl RegistryManager {
    /// Opens the registry at the default location (see [`config::registry_path`]).
    pub fn new() -> Result<Self> {
        Self::open(config::registry_path())
    }

    /// Opens the registry stored at `path`. A missing file is an empty registry.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let registry = Self::load(&path)?;
        Ok(Self { registry, path })
    }

    /// Reads the registry file at `path`.
    ///
    /// Missing file ⇒ empty registry. Malformed file ⇒ [`Error::Decode`].
    /// Missing or null maps are normalized to empty.
    pub fn load(path: &Path) -> Result<Registry> {
        let Some(registry) = config::read_json::<Registry>(path)? else {
            tracing::debug!(path = %path.display(), "No registry file, starting empty");
            return Ok(Registry::new());
        };

        if let Err(e) = registry.check_consistency() {
            tracing::warn!(path = %path.display(), "Loaded registry is inconsistent: {}", e);
        }
        tracing::debug!(
            path = %path.display(),
            projects = registry.projects.len(),
            ports = registry.port_assignments.len(),
            "Loaded registry"
        );
        Ok(registry)
    }

    /// Writes the full registry back to its file.
    pub fn save(&self) -> Result<()> {
        config::write_json_atomic(&self.path, &self.registry)?;
        tracing::debug!(path = %self.path.display(), "Saved registry");
        Ok(())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs one mutation as a unit.
    ///
    /// `mutate` works on a copy and must check its preconditions before
    /// changing anything. The copy is rejected if it breaks an invariant the
    /// current registry did not already break; otherwise it is swapped in and
    /// saved. A failed save leaves the new state in memory.
    fn apply<T, F>(&mut self, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut Registry) -> Result<T>,
    {
        let mut next = self.registry.clone();
        let out = mutate(&mut next)?;

        let existing: HashSet<Violation> = self.registry.violations().into_iter().collect();
        if let Some(introduced) = next
            .violations()
            .into_iter()
            .find(|v| !existing.contains(v))
        {
            return Err(Error::Inconsistent(introduced.to_string()));
        }

        self.registry = next;
        self.save()?;
        Ok(out)
    }

    pub fn add_project(
        &mut self,
        name: &str,
        path: Option<&Path>,
        prefix: Option<&str>,
        docker_network: Option<&str>,
    ) -> Result<Project> {
        let project = self.apply(|registry| {
            if registry.projects.contains_key(name) {
                return Err(Error::ProjectExists(name.to_string()));
            }

            let project = Project {
                name: name.to_string(),
                prefix: non_empty(prefix),
                path: path.filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf),
                services: Vec::new(),
                docker_network: non_empty(docker_network),
            };
            registry.projects.insert(name.to_string(), project.clone());
            Ok(project)
        })?;

        tracing::info!(project = name, "Added project");
        Ok(project)
    }

    /// Removes a project and releases every port its services held.
    pub fn remove_project(&mut self, name: &str) -> Result<()> {
        let released = self.apply(|registry| {
            let project = registry
                .projects
                .remove(name)
                .ok_or_else(|| Error::ProjectNotFound(name.to_string()))?;

            for service in &project.services {
                registry.release_port(service.port, &PortOwner::new(name, &service.name));
            }
            Ok(project.services.len())
        })?;

        tracing::info!(project = name, released, "Removed project");
        Ok(())
    }

    pub fn get_project(&self, name: &str) -> Option<&Project> {
        self.registry.projects.get(name)
    }

    /// All projects, sorted by name.
    pub fn list_projects(&self) -> Vec<&Project> {
        let mut projects: Vec<&Project> = self.registry.projects.values().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        projects
    }

    /// Registers a service and records its port.
    ///
    /// With `request.port == None` a port is picked by [`find_available_port`].
    /// An explicit port that is already taken fails with
    /// [`Error::PortConflict`]; it is never silently replaced.
    pub fn add_service(&mut self, project_name: &str, request: ServiceRequest) -> Result<(Service, u16)> {
        let service = self.apply(|registry| {
            let project = registry
                .projects
                .get(project_name)
                .ok_or_else(|| Error::ProjectNotFound(project_name.to_string()))?;

            if project.service(&request.name).is_some() {
                return Err(Error::ServiceExists {
                    project: project_name.to_string(),
                    service: request.name.clone(),
                });
            }

            let port = match request.port {
                Some(0) => return Err(Error::InvalidPort(0)),
                Some(port) => port,
                None => find_available_port(&request.framework, |p| {
                    registry.port_assignments.contains_key(&p)
                }),
            };

            // Also catches the unchecked last-resort port from the allocator.
            if let Some(owner) = registry.port_assignments.get(&port) {
                return Err(Error::PortConflict {
                    port,
                    owner: owner.clone(),
                });
            }

            let service = Service {
                name: request.name,
                port,
                framework: request.framework,
                hostname: non_empty(request.hostname.as_deref()),
                docker: request.docker,
                container_name: non_empty(request.container_name.as_deref()),
                path_prefix: non_empty(request.path_prefix.as_deref()),
            };

            registry
                .port_assignments
                .insert(port, PortOwner::new(project_name, &service.name));
            if let Some(project) = registry.projects.get_mut(project_name) {
                project.services.push(service.clone());
            }
            Ok(service)
        })?;

        tracing::info!(
            project = project_name,
            service = %service.name,
            port = service.port,
            framework = %service.framework,
            "Added service"
        );
        let port = service.port;
        Ok((service, port))
    }

    /// Removes one service and releases exactly its port.
    pub fn remove_service(&mut self, project_name: &str, service_name: &str) -> Result<()> {
        let port = self.apply(|registry| {
            let project = registry
                .projects
                .get_mut(project_name)
                .ok_or_else(|| Error::ProjectNotFound(project_name.to_string()))?;

            let index = project
                .services
                .iter()
                .position(|s| s.name == service_name)
                .ok_or_else(|| Error::ServiceNotFound {
                    project: project_name.to_string(),
                    service: service_name.to_string(),
                })?;

            let service = project.services.remove(index);
            registry.release_port(service.port, &PortOwner::new(project_name, service_name));
            Ok(service.port)
        })?;

        tracing::info!(project = project_name, service = service_name, port, "Removed service");
        Ok(())
    }

    /// Owner of `port`, if it is assigned.
    pub fn check_port_conflict(&self, port: u16) -> Option<&PortOwner> {
        self.registry.owner_of(port)
    }

    pub fn is_port_available(&self, port: u16) -> bool {
        !self.registry.port_assignments.contains_key(&port)
    }

    /// First free port for `framework`; see [`allocator::find_available_port`].
    pub fn find_available_port(&self, framework: &Framework) -> u16 {
        find_available_port(framework, |p| !self.is_port_available(p))
    }

    /// Copy of the port index.
    pub fn port_assignments(&self) -> BTreeMap<u16, PortOwner> {
        self.registry.port_assignments.clone()
    }

    /// Every assignment as a flat row, ascending by port.
    pub fn port_list(&self) -> Vec<PortEntry> {
        self.registry
            .port_assignments
            .iter()
            .map(|(port, owner)| PortEntry {
                port: *port,
                project: owner.project.clone(),
                service: owner.service.clone(),
            })
            .collect()
    }

    /// The port [`RegistryManager::add_service`] would pick right now, with
    /// the framework's preferred range. Nothing is reserved.
    pub fn suggest_port(&self, framework: &Framework) -> PortSuggestion {
        let info = framework.info();
        PortSuggestion {
            port: self.find_available_port(framework),
            range_start: info.port_start,
            range_end: info.port_end,
        }
    }

    pub fn update_project_path(&mut self, name: &str, path: &Path) -> Result<()> {
        self.apply(|registry| {
            let project = registry
                .projects
                .get_mut(name)
                .ok_or_else(|| Error::ProjectNotFound(name.to_string()))?;
            project.path = Some(path.to_path_buf()).filter(|p| !p.as_os_str().is_empty());
            Ok(())
        })?;

        tracing::info!(project = name, path = %path.display(), "Updated project path");
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
