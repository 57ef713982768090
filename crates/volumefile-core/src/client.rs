//! Client façade binding a value provider to the resolution engine

use std::sync::Arc;

use crate::error::Result;
use crate::provider::{EnvProvider, ValueProvider};
use crate::resolver::{self, ResolvedPaths};
use crate::value::Value;

/// Resolves volume file references using a bound [`ValueProvider`]
///
/// ```rust,no_run
/// use volumefile_core::{Value, VolumeClient};
///
/// let mut config = Value::from_yaml("database:\n  password: volumefile:db-pass\n")?;
/// VolumeClient::new().resolve_volume_files(&mut config)?;
/// # Ok::<(), volumefile_core::Error>(())
/// ```
#[derive(Clone)]
pub struct VolumeClient {
    provider: Arc<dyn ValueProvider>,
}

impl Default for VolumeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VolumeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VolumeClient").finish_non_exhaustive()
    }
}

impl VolumeClient {
    /// Create a client reading the mount directory from the environment
    pub fn new() -> Self {
        Self::with_provider(Arc::new(EnvProvider))
    }

    /// Create a client with a custom provider
    pub fn with_provider(provider: Arc<dyn ValueProvider>) -> Self {
        Self { provider }
    }

    /// Read a single file from the mount
    pub fn resolve_volume_file(&self, volume_file: &str) -> Result<String> {
        resolver::resolve_volume_file(self.provider.as_ref(), volume_file)
    }

    /// The referenced file name if `value` is a volume file reference
    pub fn is_volume_file(&self, value: &Value) -> Option<String> {
        resolver::detect(value)
    }

    /// Read every referenced file without touching the tree
    pub fn collect_volume_files(&self, config: &Value) -> Result<ResolvedPaths> {
        resolver::collect_volume_files(self.provider.as_ref(), config)
    }

    /// Replace every volume file reference in `config` with the file contents
    ///
    /// On error `config` is left exactly as it was.
    pub fn resolve_volume_files(&self, config: &mut Value) -> Result<()> {
        resolver::resolve_volume_files(self.provider.as_ref(), config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{FnProvider, MapProvider};
    use crate::resolver::MOUNT_VARIABLE;

    #[test]
    fn test_is_volume_file() {
        let client = VolumeClient::with_provider(Arc::new(MapProvider::new()));

        assert_eq!(
            client.is_volume_file(&Value::from("volumefile:cert.pem")),
            Some("cert.pem".to_string())
        );
        assert_eq!(client.is_volume_file(&Value::from("cert.pem")), None);
        assert_eq!(client.is_volume_file(&Value::Integer(7)), None);
    }

    #[test]
    fn test_closure_provider() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("token"), "abc").unwrap();
        let mount = dir.path().display().to_string();
        let client = VolumeClient::with_provider(Arc::new(FnProvider::new(move |key: &str| {
            (key == MOUNT_VARIABLE).then(|| mount.clone())
        })));

        assert_eq!(client.resolve_volume_file("token").unwrap(), "abc");
    }

    #[test]
    fn test_missing_mount_surfaces_unchanged() {
        let client = VolumeClient::with_provider(Arc::new(MapProvider::new()));
        let mut config =
            Value::from_yaml("name: app\na: volumefile:x\nnested:\n  port: 5432\n").unwrap();
        let before = config.clone();

        let err = client.resolve_volume_files(&mut config).unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(err.path, Some("a".to_string()));
        assert_eq!(config, before);
    }

    #[test]
    fn test_no_markers_needs_no_mount() {
        let client = VolumeClient::with_provider(Arc::new(MapProvider::new()));
        let mut config = Value::from_yaml("a: 1\nb: text\n").unwrap();
        let before = config.clone();

        client.resolve_volume_files(&mut config).unwrap();

        assert_eq!(config, before);
    }
}
