//! Configuration module for Typesync
//!
//! Configuration is project-local: `typesync.toml` at the project root,
//! falling back to built-in defaults. Unknown keys are collected as
//! non-fatal warnings rather than rejected.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{TypesyncError, TypesyncResult};

/// Config file name at the project root
pub const CONFIG_FILE: &str = "typesync.toml";

/// Schema input and snapshot location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Schema source file: introspection JSON or SDL text
    #[serde(default = "default_schema_source")]
    pub source: PathBuf,

    /// Snapshot output path
    #[serde(default = "default_schema_output")]
    pub output: PathBuf,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            source: default_schema_source(),
            output: default_schema_output(),
        }
    }
}

fn default_schema_source() -> PathBuf {
    PathBuf::from("schema.graphql")
}

fn default_schema_output() -> PathBuf {
    PathBuf::from(".cache/typesync/schema.json")
}

/// Type-definitions output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Generated type-definitions path, always fully overwritten
    #[serde(default = "default_codegen_output")]
    pub output: PathBuf,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            output: default_codegen_output(),
        }
    }
}

fn default_codegen_output() -> PathBuf {
    PathBuf::from("src/__generated__/types.d.ts")
}

/// Source annotation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotateConfig {
    /// Rewrite untyped call sites to reference generated types
    #[serde(default = "default_true")]
    pub auto_fix: bool,
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self { auto_fix: true }
    }
}

/// Watch-mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce window in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    crate::scheduler::DEFAULT_DEBOUNCE_MS
}

fn default_true() -> bool {
    true
}

fn default_source_dir() -> PathBuf {
    PathBuf::from("src")
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for source files embedding queries
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    #[serde(default)]
    pub schema: SchemaConfig,

    #[serde(default)]
    pub codegen: CodegenConfig,

    #[serde(default)]
    pub annotate: AnnotateConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            schema: SchemaConfig::default(),
            codegen: CodegenConfig::default(),
            annotate: AnnotateConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> TypesyncResult<Self> {
        let (config, _warnings) = Self::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> TypesyncResult<(Self, Vec<ConfigWarning>)> {
        let content = std::fs::read_to_string(path)?;

        let mut unknown_paths: Vec<String> = Vec::new();
        let deserializer = toml::de::Deserializer::new(&content);

        let config: Self = serde_ignored::deserialize(deserializer, |key| {
            unknown_paths.push(key.to_string());
        })
        .map_err(|e| TypesyncError::InvalidConfig {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let warnings = unknown_paths
            .into_iter()
            .map(|key| ConfigWarning {
                key,
                file: path.to_path_buf(),
            })
            .collect();

        Ok((config, warnings))
    }

    /// Load from the project config file, or fall back to defaults
    pub fn load_or_default(project_root: &Path) -> Self {
        let path = project_root.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Snapshot path resolved against the project root
    pub fn schema_output_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.schema.output)
    }

    /// Schema source path resolved against the project root
    pub fn schema_source_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.schema.source)
    }

    /// Type-definitions output path resolved against the project root
    pub fn type_defs_output_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.codegen.output)
    }

    /// Source directory resolved against the project root
    pub fn source_dir_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.source_dir)
    }
}
