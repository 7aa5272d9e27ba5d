//! # Bridge Configuration
//!
//! Where to find the JVM, where bundled artifacts live and where they are
//! cached. Values come from explicit setters, then the environment, then the
//! defaults in [`crate::defaults`]:
//!
//! | Setting | Environment | Default |
//! |---|---|---|
//! | java executable | `JMETER_DSL_JAVA`, `JAVA_HOME` | `java` on `PATH` |
//! | cache root | `JMETER_DSL_HOME` | `~/.jmeter-dsl` |
//! | artifact sources | `JMETER_DSL_ARTIFACTS` | `<exe dir>/artifacts` |
//!
//! A `log4j2.xml` in the working directory is passed to the engine when
//! present.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::bridge::artifacts::ArtifactCache;
use crate::defaults;

pub const JAVA_ENV: &str = "JMETER_DSL_JAVA";
pub const JAVA_HOME_ENV: &str = "JAVA_HOME";
pub const HOME_ENV: &str = "JMETER_DSL_HOME";
pub const ARTIFACTS_ENV: &str = "JMETER_DSL_ARTIFACTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub java: PathBuf,
    /// Extra JVM arguments placed before the class path.
    pub jvm_args: Vec<String>,
    pub cache_dir: PathBuf,
    pub artifact_sources: Vec<PathBuf>,
    pub log_config: Option<PathBuf>,
}

impl BridgeConfig {
    /// Resolve the configuration from the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::from_lookup(|key| std::env::var_os(key));
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join(defaults::ARTIFACTS_DIR)))
        {
            config.artifact_sources.push(dir);
        }
        config.log_config = probe_log_config(Path::new(defaults::LOG_CONFIG_FILE));
        config
    }

    /// Resolve from an arbitrary variable lookup. Leaves out everything that
    /// depends on the running process (exe dir, working directory).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let java = lookup(JAVA_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                lookup(JAVA_HOME_ENV).map(|home| PathBuf::from(home).join("bin").join("java"))
            })
            .unwrap_or_else(|| PathBuf::from(defaults::JAVA_EXECUTABLE));

        let cache_root = lookup(HOME_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| user_home(&lookup).join(defaults::CACHE_ROOT_DIR));

        let artifact_sources = lookup(ARTIFACTS_ENV)
            .map(|paths| std::env::split_paths(&paths).collect())
            .unwrap_or_default();

        Self {
            java,
            jvm_args: Vec::new(),
            cache_dir: cache_root.join(defaults::JARS_DIR),
            artifact_sources,
            log_config: None,
        }
    }

    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    pub fn with_jvm_args(mut self, args: Vec<String>) -> Self {
        self.jvm_args = args;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_artifact_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.artifact_sources = sources;
        self
    }

    pub fn with_log_config(mut self, path: Option<PathBuf>) -> Self {
        self.log_config = path;
        self
    }

    pub fn artifact_cache(&self) -> ArtifactCache {
        ArtifactCache::new(&self.cache_dir, self.artifact_sources.clone())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn user_home<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<OsString>,
{
    let var = if cfg!(windows) { "HOMEPATH" } else { "HOME" };
    match lookup(var) {
        Some(home) => PathBuf::from(home),
        None => {
            let fallback = std::env::temp_dir();
            warn!(
                "{} is not set, caching artifacts under {}",
                var,
                fallback.display()
            );
            fallback
        }
    }
}

/// Absolute path of the logging config file, if it exists.
fn probe_log_config(path: &Path) -> Option<PathBuf> {
    if !path.is_file() {
        return None;
    }
    std::fs::canonicalize(path).ok()
}

/// Split a JVM argument string the way a shell would for simple cases:
/// whitespace separated, with single or double quotes grouping words.
pub fn split_jvm_args(args: &str) -> Vec<String> {
    let mut ret = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut in_word = false;
    for c in args.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    ret.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        ret.push(current);
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map: HashMap<String, OsString> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_under_user_home() {
        let home_var = if cfg!(windows) { "HOMEPATH" } else { "HOME" };
        let config = BridgeConfig::from_lookup(lookup_from(&[(home_var, "/home/tester")]));
        assert_eq!(config.java, PathBuf::from("java"));
        assert_eq!(
            config.cache_dir,
            PathBuf::from("/home/tester").join(".jmeter-dsl").join("jars")
        );
        assert!(config.artifact_sources.is_empty());
        assert!(config.jvm_args.is_empty());
    }

    #[test]
    fn test_java_resolution_order() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            (JAVA_HOME_ENV, "/opt/jdk"),
            ("HOME", "/h"),
        ]));
        assert_eq!(config.java, PathBuf::from("/opt/jdk").join("bin").join("java"));

        let config = BridgeConfig::from_lookup(lookup_from(&[
            (JAVA_ENV, "/usr/local/bin/java17"),
            (JAVA_HOME_ENV, "/opt/jdk"),
        ]));
        assert_eq!(config.java, PathBuf::from("/usr/local/bin/java17"));
    }

    #[test]
    fn test_cache_root_override() {
        let config = BridgeConfig::from_lookup(lookup_from(&[(HOME_ENV, "/var/cache/dsl")]));
        assert_eq!(config.cache_dir, PathBuf::from("/var/cache/dsl").join("jars"));
    }

    #[cfg(unix)]
    #[test]
    fn test_artifact_sources_path_list() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            (HOME_ENV, "/c"),
            (ARTIFACTS_ENV, "/a:/b"),
        ]));
        assert_eq!(
            config.artifact_sources,
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn test_split_jvm_args() {
        assert_eq!(split_jvm_args("-Xmx1g  -Dfoo=bar"), vec!["-Xmx1g", "-Dfoo=bar"]);
        assert_eq!(
            split_jvm_args("-Dmsg=\"hello world\" -ea"),
            vec!["-Dmsg=hello world", "-ea"]
        );
        assert_eq!(split_jvm_args("-Dempty=''"), vec!["-Dempty="]);
        assert!(split_jvm_args("   ").is_empty());
    }

    #[test]
    fn test_probe_missing_log_config() {
        assert_eq!(probe_log_config(Path::new("definitely-missing-log4j2.xml")), None);
    }
}
