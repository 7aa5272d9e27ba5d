//! # Runtime Artifact Cache
//!
//! Every bridged type belongs to a [`Component`] that bundles the JVM
//! artifacts (jars) the engine needs to load it. Before a worker is launched
//! the tree is walked, the components it touches are collected, and their
//! artifacts are materialized into a cache directory shared by every run on
//! the machine (`~/.jmeter-dsl/jars` by default).
//!
//! ## Concurrency
//!
//! The cache directory is the only state shared between runs. Materializing
//! an artifact is an idempotent create: if the file already exists it is left
//! untouched, otherwise it is copied to a unique temporary sibling and renamed
//! into place. Two runs racing on the same artifact may both copy it, which is
//! harmless. The stale-version purge runs at most once per directory per
//! process, guarded by a process-wide lock.

use parking_lot::Mutex;
use std::collections::{BTreeSet, HashSet};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info};

use super::serializer::{type_path, BridgedObject, WireValue};
use crate::error::{DslError, Result};
use crate::utils::generate_execution_id;

/// A bundle of runtime artifacts shipped for a group of bridged types.
#[derive(Debug)]
pub struct Component {
    pub name: &'static str,
    pub artifacts: &'static [&'static str],
}

/// Core elements, the embedded engine and the bridge entry point itself.
/// The first artifact doubles as the cache version marker.
pub static CORE: Component = Component {
    name: "core",
    artifacts: &["jmeter-java-dsl-bridge-1.29.jar"],
};

pub static BLAZEMETER: Component = Component {
    name: "blazemeter",
    artifacts: &["jmeter-java-dsl-blazemeter-1.29.jar"],
};

pub static AZURE: Component = Component {
    name: "azure",
    artifacts: &["jmeter-java-dsl-azure-1.29.jar"],
};

static PREPARED_DIRS: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();

/// Collect the components needed by `root` and everything reachable from it.
///
/// Types are visited once each; the result keeps first-seen order and holds
/// each component at most once.
pub fn required_components(root: &dyn BridgedObject) -> Vec<&'static Component> {
    let mut seen_types = HashSet::new();
    let mut components: Vec<&'static Component> = Vec::new();
    collect_components(root, &mut seen_types, &mut components);
    components
}

fn collect_components(
    obj: &dyn BridgedObject,
    seen_types: &mut HashSet<String>,
    components: &mut Vec<&'static Component>,
) {
    if seen_types.insert(type_path(obj)) {
        let component = obj.component();
        if !components.iter().any(|c| c.name == component.name) {
            components.push(component);
        }
    }
    for field in obj.fields() {
        match field.value {
            WireValue::Node(node) => collect_components(node, seen_types, components),
            WireValue::Nodes(nodes) => {
                for node in nodes {
                    collect_components(node, seen_types, components);
                }
            }
            _ => {}
        }
    }
}

/// Cache directory plus the places bundled artifacts are copied from.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    dir: PathBuf,
    sources: Vec<PathBuf>,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>, sources: Vec<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sources,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Purge the cache if it does not hold the current core artifact, then
    /// make sure it exists. Runs once per directory per process.
    pub fn prepare(&self) -> Result<()> {
        let lock = PREPARED_DIRS.get_or_init(|| Mutex::new(HashSet::new()));
        let mut prepared = lock.lock();
        if prepared.contains(&self.dir) {
            return Ok(());
        }

        let marker = self.dir.join(CORE.artifacts[0]);
        if !marker.exists() && self.dir.exists() {
            info!(
                "Artifact cache {} is outdated, purging it",
                self.dir.display()
            );
            match fs::remove_dir_all(&self.dir) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        fs::create_dir_all(&self.dir)?;
        prepared.insert(self.dir.clone());
        Ok(())
    }

    /// Delete the cache directory. Returns whether there was anything to
    /// delete. The next run prepares and fills it again.
    pub fn clear(&self) -> Result<bool> {
        let lock = PREPARED_DIRS.get_or_init(|| Mutex::new(HashSet::new()));
        let mut prepared = lock.lock();
        prepared.remove(&self.dir);
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                info!("Removed artifact cache {}", self.dir.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Ensure `artifact` is present in the cache and return its path.
    pub fn materialize(&self, artifact: &str) -> Result<PathBuf> {
        let target = self.dir.join(artifact);
        if target.exists() {
            return Ok(target);
        }

        let source = self
            .sources
            .iter()
            .map(|dir| dir.join(artifact))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| DslError::MissingArtifact {
                name: artifact.to_string(),
                searched: self.sources.clone(),
            })?;

        let staging = self
            .dir
            .join(format!(".{}.{}.tmp", artifact, generate_execution_id()));
        debug!("Copying {} into {}", source.display(), target.display());
        fs::copy(&source, &staging)?;
        if let Err(e) = fs::rename(&staging, &target) {
            let _ = fs::remove_file(&staging);
            // another run may have won the race
            if !target.exists() {
                return Err(e.into());
            }
        }
        Ok(target)
    }

    /// Materialize every artifact required by `root` and build the class path
    /// argument: sorted, de-duplicated, joined with the platform separator.
    pub fn resolve_classpath(&self, root: &dyn BridgedObject) -> Result<OsString> {
        self.prepare()?;
        let mut entries = BTreeSet::new();
        for component in required_components(root) {
            debug!("Resolving artifacts of component '{}'", component.name);
            for artifact in component.artifacts {
                entries.insert(self.materialize(artifact)?);
            }
        }
        std::env::join_paths(entries)
            .map_err(|e| DslError::Format(format!("Invalid class path entry: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::serializer::{Field, Namespace};
    use tempfile::TempDir;

    struct Plugin;

    impl BridgedObject for Plugin {
        fn type_name(&self) -> &'static str {
            "Plugin"
        }

        fn namespace(&self) -> Namespace {
            Namespace::Extension("Azure")
        }

        fn component(&self) -> &'static Component {
            &AZURE
        }

        fn fields(&self) -> Vec<Field<'_>> {
            vec![]
        }
    }

    struct Root {
        children: Vec<Box<dyn BridgedObject>>,
    }

    impl BridgedObject for Root {
        fn type_name(&self) -> &'static str {
            "DslTestPlan"
        }

        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field {
                name: "children",
                value: WireValue::Nodes(self.children.iter().map(|c| c.as_ref()).collect()),
            }]
        }
    }

    fn source_dir_with(artifacts: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in artifacts {
            fs::write(dir.path().join(name), name.as_bytes()).unwrap();
        }
        dir
    }

    #[test]
    fn test_required_components_are_deduplicated() {
        let root = Root {
            children: vec![
                Box::new(Plugin),
                Box::new(Root { children: vec![Box::new(Plugin)] }),
            ],
        };
        let names: Vec<_> = required_components(&root).iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["core", "azure"]);
    }

    #[test]
    fn test_materialize_copies_missing_artifact() {
        let sources = source_dir_with(&[CORE.artifacts[0]]);
        let cache_root = TempDir::new().unwrap();
        let cache = ArtifactCache::new(cache_root.path().join("jars"), vec![sources.path().into()]);
        cache.prepare().unwrap();

        let path = cache.materialize(CORE.artifacts[0]).unwrap();
        assert!(path.is_file());
        assert_eq!(fs::read(&path).unwrap(), CORE.artifacts[0].as_bytes());
    }

    #[test]
    fn test_concurrent_materialize_of_same_artifact() {
        let sources = source_dir_with(&[CORE.artifacts[0]]);
        let cache_root = TempDir::new().unwrap();
        let cache = ArtifactCache::new(cache_root.path().join("jars"), vec![sources.path().into()]);
        cache.prepare().unwrap();

        let results: Vec<Result<PathBuf>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| cache.materialize(CORE.artifacts[0])))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let target = cache.dir().join(CORE.artifacts[0]);
        for result in results {
            assert_eq!(result.unwrap(), target);
        }
        assert_eq!(fs::read(&target).unwrap(), CORE.artifacts[0].as_bytes());
        let leftovers: Vec<_> = fs::read_dir(cache.dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "staging files left: {:?}", leftovers);
    }

    #[test]
    fn test_materialize_keeps_existing_artifact() {
        let sources = source_dir_with(&[CORE.artifacts[0]]);
        let cache_root = TempDir::new().unwrap();
        fs::write(cache_root.path().join(CORE.artifacts[0]), b"cached").unwrap();
        let cache = ArtifactCache::new(cache_root.path(), vec![sources.path().into()]);

        let path = cache.materialize(CORE.artifacts[0]).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"cached");
    }

    #[test]
    fn test_missing_artifact_is_reported() {
        let cache_root = TempDir::new().unwrap();
        let cache = ArtifactCache::new(cache_root.path(), vec![]);
        let err = cache.materialize("nope.jar").unwrap_err();
        assert!(matches!(err, DslError::MissingArtifact { ref name, .. } if name == "nope.jar"));
    }

    #[test]
    fn test_prepare_purges_outdated_cache() {
        let cache_root = TempDir::new().unwrap();
        let dir = cache_root.path().join("jars");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("jmeter-java-dsl-bridge-0.1.jar"), b"old").unwrap();

        let cache = ArtifactCache::new(&dir, vec![]);
        cache.prepare().unwrap();
        assert!(dir.is_dir());
        assert!(!dir.join("jmeter-java-dsl-bridge-0.1.jar").exists());
    }

    #[test]
    fn test_resolve_classpath_includes_extension_artifacts() {
        let sources = source_dir_with(&[CORE.artifacts[0], AZURE.artifacts[0]]);
        let cache_root = TempDir::new().unwrap();
        let cache = ArtifactCache::new(cache_root.path().join("jars"), vec![sources.path().into()]);
        let root = Root {
            children: vec![Box::new(Plugin)],
        };

        let classpath = cache.resolve_classpath(&root).unwrap();
        let entries: Vec<PathBuf> = std::env::split_paths(&classpath).collect();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|p| p.starts_with(cache.dir())));
    }

    #[test]
    fn test_clear_removes_cache() {
        let cache_root = TempDir::new().unwrap();
        let cache = ArtifactCache::new(cache_root.path().join("jars"), vec![]);
        cache.prepare().unwrap();
        assert!(cache.dir().is_dir());
        assert!(cache.clear().unwrap());
        assert!(!cache.dir().exists());
        assert!(!cache.clear().unwrap());
    }
}
