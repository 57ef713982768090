//! Volume file resolution
//!
//! Strings containing `volumefile:<name>` are references to files on a volume
//! mounted at the directory named by `PCR_VOLUME_MOUNT`. Resolution happens in
//! two phases: [`collect_volume_files`] walks the tree and reads every
//! referenced file, then [`ResolvedPaths::apply_to`] writes the contents back.
//! Nothing is written unless every read succeeded.

use indexmap::IndexMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::provider::ValueProvider;
use crate::value::{PathSegment, Value, ValuePath};

/// Name of the variable holding the mount directory
pub const MOUNT_VARIABLE: &str = "PCR_VOLUME_MOUNT";

/// Marker flagging a string as a volume file reference
pub const VOLUME_FILE_PREFIX: &str = "volumefile:";

/// Extract the referenced file name from a string
///
/// The name is whatever follows the marker, reduced to its last path
/// component so a reference can never point outside the mount:
///
/// ```rust
/// use volumefile_core::resolver::volume_file_name;
///
/// assert_eq!(volume_file_name("volumefile:db.pass"), Some("db.pass".into()));
/// assert_eq!(volume_file_name("volumefile:../../etc/passwd"), Some("passwd".into()));
/// assert_eq!(volume_file_name("plain value"), None);
/// ```
///
/// Returns `None` when the marker is missing, when nothing usable follows it
/// (`volumefile:`, `volumefile:..`), or when the marker appears more than once.
pub fn volume_file_name(s: &str) -> Option<String> {
    let start = s.find(VOLUME_FILE_PREFIX)?;
    let reference = &s[start + VOLUME_FILE_PREFIX.len()..];
    if reference.contains(VOLUME_FILE_PREFIX) {
        return None;
    }
    base_name(reference)
}

/// Marker detection on an arbitrary tree node; only strings can match
pub fn detect(value: &Value) -> Option<String> {
    value.as_str().and_then(volume_file_name)
}

fn base_name(reference: &str) -> Option<String> {
    Path::new(reference)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// Read a volume file relative to the mount directory
///
/// Only the last path component of `volume_file` is used.
pub fn resolve_volume_file(provider: &dyn ValueProvider, volume_file: &str) -> Result<String> {
    let mount = provider
        .get(MOUNT_VARIABLE)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| Error::configuration(MOUNT_VARIABLE))?;

    let name = base_name(volume_file).ok_or_else(|| {
        let err = std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "reference does not name a file",
        );
        Error::io(volume_file, MOUNT_VARIABLE, &err)
    })?;

    let file_path = std::path::absolute(Path::new(&mount).join(&name))
        .map_err(|e| Error::io(volume_file, MOUNT_VARIABLE, &e))?;
    log::trace!("Reading volume file: {}", file_path.display());

    std::fs::read_to_string(&file_path).map_err(|e| Error::io(volume_file, MOUNT_VARIABLE, &e))
}

/// File contents gathered for one resolution pass, keyed by tree position
#[derive(Clone, Default, PartialEq)]
pub struct ResolvedPaths {
    entries: IndexMap<ValuePath, String>,
}

impl std::fmt::Debug for ResolvedPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Volume files are usually secrets
        f.debug_map()
            .entries(
                self.entries
                    .keys()
                    .map(|path| (path.to_string(), "[REDACTED]")),
            )
            .finish()
    }
}

impl ResolvedPaths {
    /// Number of references resolved
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no references were found
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contents recorded for a position, if it held a reference
    pub fn get(&self, path: &ValuePath) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Iterate over (position, contents) pairs in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&ValuePath, &str)> {
        self.entries.iter().map(|(p, c)| (p, c.as_str()))
    }

    /// Write every recorded file content back into `target`
    ///
    /// Either all entries are written or, on error, `target` is unchanged.
    pub fn apply_to(self, target: &mut Value) -> Result<()> {
        if self.entries.is_empty() {
            return Ok(());
        }

        let mut staged = target.clone();
        for (path, contents) in self.entries {
            staged.set_at(&path, Value::String(contents)).map_err(|_| {
                Error::internal(format!(
                    "Volume file target '{}' is no longer writable",
                    path
                ))
                .with_path(path.to_string())
            })?;
        }
        *target = staged;
        Ok(())
    }
}

/// Walk `root` and read the file behind every volume reference
///
/// The tree is not modified. The first failing read aborts the walk.
pub fn collect_volume_files(provider: &dyn ValueProvider, root: &Value) -> Result<ResolvedPaths> {
    let mut resolved = ResolvedPaths::default();
    collect_node(provider, root, &mut ValuePath::root(), &mut resolved)?;
    Ok(resolved)
}

fn collect_node(
    provider: &dyn ValueProvider,
    node: &Value,
    path: &mut ValuePath,
    resolved: &mut ResolvedPaths,
) -> Result<()> {
    match node {
        Value::Mapping(map) => {
            for (key, child) in map {
                path.push(PathSegment::Key(key.clone()));
                collect_node(provider, child, path, resolved)?;
                path.pop();
            }
        }
        Value::Sequence(seq) => {
            for (idx, child) in seq.iter().enumerate() {
                path.push(PathSegment::Index(idx));
                collect_node(provider, child, path, resolved)?;
                path.pop();
            }
        }
        // A bare scalar root has no position to write back to
        Value::String(s) if !path.is_root() => match volume_file_name(s) {
            Some(name) => {
                let contents = resolve_volume_file(provider, &name)
                    .map_err(|e| e.with_path(path.to_string()))?;
                log::debug!("Resolved volume file '{}' at {}", name, path);
                resolved.entries.insert(path.clone(), contents);
            }
            None if s.contains(VOLUME_FILE_PREFIX) => {
                log::warn!(
                    "Ignoring value at {}: contains '{}' but is not a single volume file reference",
                    path,
                    VOLUME_FILE_PREFIX
                );
            }
            None => {}
        },
        _ => {}
    }
    Ok(())
}

/// Resolve every volume reference in `root`, in place
pub fn resolve_volume_files(provider: &dyn ValueProvider, root: &mut Value) -> Result<()> {
    let resolved = collect_volume_files(provider, root)?;
    resolved.apply_to(root)
}
