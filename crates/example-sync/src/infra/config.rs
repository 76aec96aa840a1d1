//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: &str = include_str!("../../assets/default-config.toml");
static DEFAULTS: Lazy<Defaults> = Lazy::new(|| {
    toml::from_str(DEFAULT_CONFIG).expect("embedded default-config.toml sets every field")
});
static WORKSPACE_CONFIG_FILE: &str = ".example-sync.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
///
/// Every field is optional so that a later layer only overrides what it sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub docs_dir: Option<PathBuf>,
    #[serde(default)]
    pub sandbox_file: Option<PathBuf>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
}

/// Values from `assets/default-config.toml`, used for anything no layer sets.
#[derive(Debug, Deserialize)]
struct Defaults {
    docs_dir: PathBuf,
    sandbox_file: PathBuf,
    language: String,
    extension: String,
}

impl SyncConfig {
    pub fn docs_dir(&self) -> PathBuf {
        self.docs_dir
            .clone()
            .unwrap_or_else(|| DEFAULTS.docs_dir.clone())
    }

    pub fn sandbox_file(&self) -> PathBuf {
        self.sandbox_file
            .clone()
            .unwrap_or_else(|| DEFAULTS.sandbox_file.clone())
    }

    pub fn language(&self) -> String {
        self.language
            .clone()
            .unwrap_or_else(|| DEFAULTS.language.clone())
    }

    pub fn extension(&self) -> String {
        self.extension
            .clone()
            .unwrap_or_else(|| DEFAULTS.extension.clone())
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    root: Option<PathBuf>,
    docs_dir: Option<PathBuf>,
    sandbox_file: Option<PathBuf>,
    language: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            root: env::var_os("EXAMPLE_SYNC_ROOT").map(PathBuf::from),
            docs_dir: env::var_os("EXAMPLE_SYNC_DOCS_DIR").map(PathBuf::from),
            sandbox_file: env::var_os("EXAMPLE_SYNC_SANDBOX").map(PathBuf::from),
            language: env::var("EXAMPLE_SYNC_LANGUAGE").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(root: &Path, language: &str) -> Self {
        Self {
            root: Some(root.to_path_buf()),
            language: Some(language.to_owned()),
            ..Self::default()
        }
    }
}

impl SyncConfig {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        Self::load_for_root(None)
    }

    /// Like [`SyncConfig::load`], but an explicit `root` wins over `EXAMPLE_SYNC_ROOT` and decides
    /// which workspace config file is read.
    pub fn load_for_root(root: Option<PathBuf>) -> Result<Self> {
        let mut env = EnvOverrides::from_env();
        if root.is_some() {
            env.root = root;
        }
        let cwd = env::current_dir().context("failed to determine current directory")?;
        Self::load_from(&cwd, global_config_path(), env)
    }

    fn load_from(cwd: &Path, global: Option<PathBuf>, env: EnvOverrides) -> Result<Self> {
        let workspace = workspace_config_path(cwd, env.root.as_deref());
        Self::load_with_layers(global, Some(workspace), env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<SyncConfig> = Vec::new();

        if let Some(global_path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %global_path.display(), "loading global config");
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            tracing::debug!(path = %workspace_path.display(), "loading workspace config");
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers
            .into_iter()
            .reduce(SyncConfig::merge)
            .unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: SyncConfig =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            root: other.root.or(self.root),
            docs_dir: other.docs_dir.or(self.docs_dir),
            sandbox_file: other.sandbox_file.or(self.sandbox_file),
            language: other.language.or(self.language),
            extension: other.extension.or(self.extension),
        }
    }
}

fn apply_env_overrides(mut config: SyncConfig, env: EnvOverrides) -> SyncConfig {
    if let Some(root) = env.root {
        config.root = Some(root);
    }
    if let Some(docs_dir) = env.docs_dir {
        config.docs_dir = Some(docs_dir);
    }
    if let Some(sandbox_file) = env.sandbox_file {
        config.sandbox_file = Some(sandbox_file);
    }
    if let Some(language) = env.language {
        config.language = Some(language);
    }
    config
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("example-sync/config.toml"))
}

fn workspace_config_path(cwd: &Path, root: Option<&Path>) -> PathBuf {
    let root = match root {
        Some(root) => cwd.join(root),
        None => find_repo_root(cwd).unwrap_or_else(|| cwd.to_path_buf()),
    };
    root.join(WORKSPACE_CONFIG_FILE)
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Fully resolved locations every sync operation works against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub root: PathBuf,
    pub docs_dir: PathBuf,
    pub sandbox_file: PathBuf,
    pub language: String,
    pub extension: String,
}

impl Workspace {
    /// Workspace rooted at `root` using the built-in layout.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let config = SyncConfig::default();
        let root = root.into();
        Self {
            docs_dir: root.join(config.docs_dir()),
            sandbox_file: root.join(config.sandbox_file()),
            language: config.language(),
            extension: config.extension(),
            root,
        }
    }

    /// Resolve a configuration against a base directory.
    ///
    /// A configured `root` is joined onto `base`; without one, the nearest ancestor holding `.git`
    /// is used, falling back to `base` itself.
    pub fn from_config(config: &SyncConfig, base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let root = match &config.root {
            Some(root) => base.join(root),
            None => find_repo_root(&base).unwrap_or(base),
        };

        Self {
            docs_dir: root.join(config.docs_dir()),
            sandbox_file: root.join(config.sandbox_file()),
            language: config.language(),
            extension: config.extension(),
            root,
        }
    }

    /// Render `path` relative to the workspace root when possible.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
