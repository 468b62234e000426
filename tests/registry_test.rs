use lns::{Error, Framework, PortOwner, RegistryManager, ServiceRequest};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create an isolated registry file location
fn create_test_registry() -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("lns").join("registry.json");
    (temp_dir, path)
}

/// Registers `blog` with `web` (nextjs, auto) and `api` (fastapi, auto).
fn blog_with_two_services(path: &Path) -> RegistryManager {
    let mut manager = RegistryManager::open(path).unwrap();
    manager
        .add_project("blog", Some(Path::new("/srv/blog")), None, None)
        .unwrap();
    manager
        .add_service("blog", ServiceRequest::new("web", Framework::NextJs))
        .unwrap();
    manager
        .add_service("blog", ServiceRequest::new("api", Framework::FastApi))
        .unwrap();
    manager
}

#[test]
fn test_blog_scenario_assigns_range_starts_and_rejects_conflict() {
    let (_dir, path) = create_test_registry();
    let mut manager = RegistryManager::open(&path).unwrap();

    manager
        .add_project("blog", Some(Path::new("/srv/blog")), Some(""), Some(""))
        .unwrap();

    let (web, port) = manager
        .add_service("blog", ServiceRequest::new("web", Framework::NextJs))
        .unwrap();
    assert_eq!(port, 3000);
    assert_eq!(web.port, 3000);

    let (_, port) = manager
        .add_service("blog", ServiceRequest::new("api", Framework::FastApi))
        .unwrap();
    assert_eq!(port, 8000);

    let err = manager
        .add_service("blog", ServiceRequest::new("web2", Framework::NextJs).port(3000))
        .unwrap_err();
    match err {
        Error::PortConflict { port, owner } => {
            assert_eq!(port, 3000);
            assert_eq!(owner, PortOwner::new("blog", "web"));
            assert_eq!(owner.to_string(), "blog:web");
        }
        other => panic!("expected PortConflict, got {:?}", other),
    }

    // The failed call must not have touched the registry.
    assert!(manager.get_project("blog").unwrap().service("web2").is_none());
    assert_eq!(manager.port_assignments().len(), 2);
}

#[test]
fn test_remove_project_releases_all_ports() {
    let (_dir, path) = create_test_registry();
    let mut manager = blog_with_two_services(&path);

    manager.remove_project("blog").unwrap();

    assert!(manager.port_assignments().is_empty());
    assert!(manager.get_project("blog").is_none());

    let reloaded = RegistryManager::open(&path).unwrap();
    assert!(reloaded.port_assignments().is_empty());
    assert!(reloaded.list_projects().is_empty());
}

#[test]
fn test_remove_project_leaves_other_projects_alone() {
    let (_dir, path) = create_test_registry();
    let mut manager = blog_with_two_services(&path);
    manager.add_project("shop", None, None, None).unwrap();
    manager
        .add_service("shop", ServiceRequest::new("web", Framework::NextJs))
        .unwrap();

    manager.remove_project("blog").unwrap();

    let assignments = manager.port_assignments();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[&3001], PortOwner::new("shop", "web"));
}

#[test]
fn test_remove_service_frees_exactly_one_port() {
    let (_dir, path) = create_test_registry();
    let mut manager = blog_with_two_services(&path);
    let before = manager.port_assignments();

    manager.remove_service("blog", "web").unwrap();

    let after = manager.port_assignments();
    assert_eq!(after.len(), before.len() - 1);
    assert!(!after.contains_key(&3000));
    assert_eq!(after.get(&8000), before.get(&8000));
    assert!(manager.is_port_available(3000));

    // The freed port is handed out again.
    let (_, port) = manager
        .add_service("blog", ServiceRequest::new("web", Framework::NextJs))
        .unwrap();
    assert_eq!(port, 3000);
}

#[test]
fn test_not_found_and_already_exists() {
    let (_dir, path) = create_test_registry();
    let mut manager = blog_with_two_services(&path);

    let err = manager.remove_project("nope").unwrap_err();
    assert!(matches!(err, Error::ProjectNotFound(ref name) if name == "nope"));

    let project_missing = manager.remove_service("nope", "web").unwrap_err();
    let service_missing = manager.remove_service("blog", "nope").unwrap_err();
    assert!(project_missing.is_not_found());
    assert!(service_missing.is_not_found());
    assert!(matches!(service_missing, Error::ServiceNotFound { .. }));
    assert_ne!(project_missing.to_string(), service_missing.to_string());

    let err = manager
        .add_service("nope", ServiceRequest::new("web", Framework::Vite))
        .unwrap_err();
    assert!(matches!(err, Error::ProjectNotFound(_)));

    let err = manager.add_project("blog", None, None, None).unwrap_err();
    assert!(err.is_already_exists());

    let err = manager
        .add_service("blog", ServiceRequest::new("web", Framework::Vite))
        .unwrap_err();
    assert!(matches!(err, Error::ServiceExists { .. }));

    let err = manager
        .update_project_path("nope", Path::new("/tmp"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_same_service_name_in_different_projects() {
    let (_dir, path) = create_test_registry();
    let mut manager = blog_with_two_services(&path);
    manager.add_project("shop", None, None, None).unwrap();

    let (_, port) = manager
        .add_service("shop", ServiceRequest::new("web", Framework::NextJs))
        .unwrap();
    assert_eq!(port, 3001);
}

#[test]
fn test_port_list_is_sorted_triples() {
    let (_dir, path) = create_test_registry();
    let mut manager = blog_with_two_services(&path);
    manager
        .add_service("blog", ServiceRequest::new("docs", Framework::Vite))
        .unwrap();
    manager
        .add_service("blog", ServiceRequest::new("admin", Framework::Generic).port(1234))
        .unwrap();

    let list = manager.port_list();
    let ports: Vec<u16> = list.iter().map(|e| e.port).collect();
    assert_eq!(ports, [1234, 3000, 5173, 8000]);
    assert_eq!(list[0].project, "blog");
    assert_eq!(list[0].service, "admin");
    assert_eq!(list[3].service, "api");
}

#[test]
fn test_port_assignments_is_a_copy() {
    let (_dir, path) = create_test_registry();
    let manager = blog_with_two_services(&path);

    let mut copy = manager.port_assignments();
    copy.clear();

    assert_eq!(manager.port_assignments().len(), 2);
    assert_eq!(
        manager.check_port_conflict(8000),
        Some(&PortOwner::new("blog", "api"))
    );
    assert_eq!(manager.check_port_conflict(8001), None);
}

#[test]
fn test_suggest_port_does_not_reserve() {
    let (_dir, path) = create_test_registry();
    let mut manager = blog_with_two_services(&path);

    let suggestion = manager.suggest_port(&Framework::NextJs);
    assert_eq!(suggestion.port, 3001);
    assert_eq!((suggestion.range_start, suggestion.range_end), (3000, 3099));
    assert!(manager.is_port_available(3001));

    let again = manager.suggest_port(&Framework::NextJs);
    assert_eq!(again, suggestion);

    let (_, port) = manager
        .add_service("blog", ServiceRequest::new("web2", Framework::NextJs))
        .unwrap();
    assert_eq!(port, suggestion.port);

    let unknown = manager.suggest_port(&Framework::from("phoenix"));
    assert_eq!((unknown.port, unknown.range_start, unknown.range_end), (9000, 9000, 9099));
}

#[test]
fn test_update_project_path_keeps_services() {
    let (_dir, path) = create_test_registry();
    let mut manager = blog_with_two_services(&path);
    let before = manager.port_assignments();

    manager
        .update_project_path("blog", Path::new("/home/me/blog"))
        .unwrap();

    let reloaded = RegistryManager::open(&path).unwrap();
    let blog = reloaded.get_project("blog").unwrap();
    assert_eq!(blog.path.as_deref(), Some(Path::new("/home/me/blog")));
    assert_eq!(blog.services.len(), 2);
    assert_eq!(reloaded.port_assignments(), before);
}

#[test]
fn test_reload_round_trip() {
    let (_dir, path) = create_test_registry();
    let mut manager = blog_with_two_services(&path);
    manager
        .add_project("shop", None, Some("s"), Some("shop_net"))
        .unwrap();
    manager
        .add_service(
            "shop",
            ServiceRequest::new("db-admin", Framework::from("pgweb"))
                .port(8081)
                .hostname("pg.localhost")
                .docker(Some("shop-pgweb".to_string()))
                .path_prefix("/admin"),
        )
        .unwrap();

    let reloaded = RegistryManager::open(&path).unwrap();
    assert_eq!(reloaded.registry(), manager.registry());

    let shop = reloaded.get_project("shop").unwrap();
    let pgweb = shop.service("db-admin").unwrap();
    assert_eq!(pgweb.framework, Framework::Unknown("pgweb".to_string()));
    assert_eq!(shop.service_hostname(pgweb), "pg.localhost");
    assert_eq!(pgweb.docker_upstream(), "shop-pgweb:8081");
    assert_eq!(pgweb.upstream(), "localhost:8081");
}

#[test]
fn test_effective_hostnames_use_prefix() {
    let (_dir, path) = create_test_registry();
    let mut manager = RegistryManager::open(&path).unwrap();
    manager.add_project("blog", None, Some("b"), None).unwrap();
    let (web, _) = manager
        .add_service("blog", ServiceRequest::new("web", Framework::NextJs))
        .unwrap();

    let blog = manager.get_project("blog").unwrap();
    assert_eq!(blog.service_hostname(&web), "b-web.localhost");
}

#[test]
fn test_persisted_file_layout() {
    let (_dir, path) = create_test_registry();
    let _manager = blog_with_two_services(&path);

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["version"], "1.0");
    assert_eq!(value["port_assignments"]["3000"], "blog:web");
    assert_eq!(value["port_assignments"]["8000"], "blog:api");
    assert_eq!(value["projects"]["blog"]["path"], "/srv/blog");
    assert_eq!(value["projects"]["blog"]["services"][1]["framework"], "fastapi");
}

#[test]
fn test_loads_registry_written_by_older_format() {
    let (_dir, path) = create_test_registry();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        r#"{
  "version": "1.0",
  "projects": {
    "blog": {
      "name": "blog",
      "services": [ { "name": "web", "port": 3000, "framework": "nextjs" } ]
    }
  },
  "port_assignments": { "3000": "blog:web" }
}"#,
    )
    .unwrap();

    let mut manager = RegistryManager::open(&path).unwrap();
    assert_eq!(manager.check_port_conflict(3000), Some(&PortOwner::new("blog", "web")));

    let (_, port) = manager
        .add_service("blog", ServiceRequest::new("api", Framework::NextJs))
        .unwrap();
    assert_eq!(port, 3001);

    fs::write(&path, r#"{"version": "1.0"}"#).unwrap();
    let manager = RegistryManager::open(&path).unwrap();
    assert!(manager.list_projects().is_empty());
    assert!(manager.port_assignments().is_empty());
}

#[test]
fn test_corrupt_registry_is_a_decode_error() {
    let (_dir, path) = create_test_registry();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{\"projects\": {").unwrap();

    let err = RegistryManager::open(&path).unwrap_err();
    match err {
        Error::Decode { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected Decode, got {:?}", other),
    }

    // The corrupt file is left as-is.
    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"projects\": {");
}

/// `a:x` and `b:y` both on 9999, with the index naming only `b:y`: what an
/// unchecked last-resort assignment leaves behind.
const DOUBLE_BOOKED: &str = r#"{
  "version": "1.0",
  "projects": {
    "a": { "name": "a", "services": [ { "name": "x", "port": 9999, "framework": "generic" } ] },
    "b": { "name": "b", "services": [ { "name": "y", "port": 9999, "framework": "generic" } ] }
  },
  "port_assignments": { "9999": "b:y" }
}"#;

fn open_double_booked() -> (TempDir, PathBuf, RegistryManager) {
    let (dir, path) = create_test_registry();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, DOUBLE_BOOKED).unwrap();
    let manager = RegistryManager::open(&path).unwrap();
    assert!(manager.registry().check_consistency().is_err());
    (dir, path, manager)
}

#[test]
fn test_double_booked_registry_accepts_unrelated_changes() {
    let (_dir, path, mut manager) = open_double_booked();

    manager.add_project("unrelated", None, None, None).unwrap();
    let (_, port) = manager
        .add_service("unrelated", ServiceRequest::new("web", Framework::NextJs))
        .unwrap();
    assert_eq!(port, 3000);

    // The existing breakage is carried over untouched.
    let reloaded = RegistryManager::open(&path).unwrap();
    assert_eq!(
        reloaded.check_port_conflict(9999),
        Some(&PortOwner::new("b", "y"))
    );
    assert!(reloaded.get_project("unrelated").is_some());
}

#[test]
fn test_removing_either_holder_repairs_double_booking() {
    let (_dir, path, mut manager) = open_double_booked();
    manager.remove_project("a").unwrap();
    assert!(manager.registry().check_consistency().is_ok());
    assert_eq!(manager.check_port_conflict(9999), Some(&PortOwner::new("b", "y")));

    let (_dir, _path, mut manager) = open_double_booked();
    manager.remove_service("b", "y").unwrap();
    assert!(manager.registry().check_consistency().is_ok());
    assert_eq!(manager.check_port_conflict(9999), Some(&PortOwner::new("a", "x")));

    let (_dir, _path, mut manager) = open_double_booked();
    manager.remove_service("a", "x").unwrap();
    assert!(manager.registry().check_consistency().is_ok());

    let (_dir, _path, mut manager) = open_double_booked();
    manager.remove_project("b").unwrap();
    assert!(manager.registry().check_consistency().is_ok());
    assert_eq!(manager.check_port_conflict(9999), Some(&PortOwner::new("a", "x")));

    let reloaded = RegistryManager::open(&path).unwrap();
    assert!(reloaded.registry().check_consistency().is_ok());
}

#[test]
fn test_failed_save_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let blocker = temp_dir.path().join("lns");

    let mut manager = RegistryManager::open(blocker.join("registry.json")).unwrap();
    // A plain file where the config directory should be.
    fs::write(&blocker, "").unwrap();
    let err = manager.add_project("blog", None, None, None).unwrap_err();
    assert!(matches!(err, Error::Filesystem { .. }));
}
