use std::path::Path;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use volumefile_core::{ErrorKind, MapProvider, Value, VolumeClient, MOUNT_VARIABLE};

fn client_for(mount: &Path) -> VolumeClient {
    let provider = MapProvider::new().with(MOUNT_VARIABLE, mount.display().to_string());
    VolumeClient::with_provider(Arc::new(provider))
}

#[test]
fn tree_without_markers_is_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Value::from_yaml(
        r#"
server:
  host: localhost
  port: 8080
  tls: false
  ratio: 0.5
  owner: null
tags: [a, b]
"#,
    )
    .unwrap();
    let before = config.clone();

    client_for(dir.path()).resolve_volume_files(&mut config).unwrap();

    assert_eq!(config, before);
}

#[test]
fn resolves_nested_reference_without_touching_siblings() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("db-pass"), "s3cret\n").unwrap();
    let mut config = Value::from_yaml(
        r#"
name: app
database:
  host: db.internal
  credentials:
    user: admin
    password: volumefile:db-pass
"#,
    )
    .unwrap();

    client_for(dir.path()).resolve_volume_files(&mut config).unwrap();

    let expected = Value::from_yaml(
        r#"
name: app
database:
  host: db.internal
  credentials:
    user: admin
    password: "s3cret\n"
"#,
    )
    .unwrap();
    assert_eq!(config, expected);
}

#[test]
fn traversal_reference_stays_inside_mount() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("passwd"), "from-mount").unwrap();
    let mut config = Value::from_yaml("file: volumefile:../../etc/passwd\n").unwrap();

    client_for(dir.path()).resolve_volume_files(&mut config).unwrap();

    assert_eq!(config.get_path("file").unwrap().as_str(), Some("from-mount"));
}

#[test]
fn missing_file_reports_name_and_leaves_tree() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("present"), "yes").unwrap();
    let mut config = Value::from_yaml(
        r#"
first: volumefile:present
second:
  deeper: volumefile:absent
"#,
    )
    .unwrap();
    let before = config.clone();

    let err = client_for(dir.path())
        .resolve_volume_files(&mut config)
        .unwrap_err();

    match &err.kind {
        ErrorKind::Io { file, variable, .. } => {
            assert_eq!(file, "absent");
            assert_eq!(variable, MOUNT_VARIABLE);
        }
        other => panic!("expected Io error, got {:?}", other),
    }
    assert_eq!(err.path.as_deref(), Some("second.deeper"));
    assert_eq!(config, before);
}

#[test]
fn second_pass_is_noop_unless_contents_carry_marker() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("plain"), "just text").unwrap();
    std::fs::write(dir.path().join("pointer"), "volumefile:plain").unwrap();
    let client = client_for(dir.path());

    let mut config = Value::from_yaml("a: volumefile:plain\nb: volumefile:pointer\n").unwrap();
    client.resolve_volume_files(&mut config).unwrap();
    assert_eq!(config.get_path("a").unwrap().as_str(), Some("just text"));
    assert_eq!(config.get_path("b").unwrap().as_str(), Some("volumefile:plain"));

    // Contents that contain the marker are detected again on another pass
    client.resolve_volume_files(&mut config).unwrap();
    assert_eq!(config.get_path("a").unwrap().as_str(), Some("just text"));
    assert_eq!(config.get_path("b").unwrap().as_str(), Some("just text"));
}

#[test]
fn sequences_are_walked() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("t1"), "one").unwrap();
    std::fs::write(dir.path().join("t2"), "two").unwrap();
    let mut config = Value::from_json(
        r#"{"tokens": ["volumefile:t1", 3, {"inner": "volumefile:t2"}]}"#,
    )
    .unwrap();

    client_for(dir.path()).resolve_volume_files(&mut config).unwrap();

    assert_eq!(config.get_path("tokens[0]").unwrap().as_str(), Some("one"));
    assert_eq!(config.get_path("tokens[1]").unwrap().as_i64(), Some(3));
    assert_eq!(config.get_path("tokens[2].inner").unwrap().as_str(), Some("two"));
}

#[test]
fn default_client_reads_mount_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("api-key"), "k-123").unwrap();
    std::env::set_var(MOUNT_VARIABLE, dir.path());

    let mut config = Value::from_yaml("api: volumefile:api-key\n").unwrap();
    let result = VolumeClient::new().resolve_volume_files(&mut config);
    std::env::remove_var(MOUNT_VARIABLE);

    result.unwrap();
    assert_eq!(config.get_path("api").unwrap().as_str(), Some("k-123"));
}
