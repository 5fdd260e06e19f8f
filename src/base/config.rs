//! Load configuration via `config` crate with env-override support.

use std::{
    ops::Deref,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Deserialize;

use super::types::Res;

/// Default location of the ticket topic store.
fn default_store_path() -> PathBuf {
    PathBuf::from("ticket_topics.db")
}

/// Default directory holding the wiki documents.
fn default_document_dir() -> PathBuf {
    PathBuf::from("Wikis")
}

/// Default root of the code available for inspection.
fn default_code_root() -> PathBuf {
    PathBuf::from("CodeBase")
}

/// Default extension of wiki documents.
fn default_document_extension() -> String {
    ".pdf".to_string()
}

/// Default extension used when listing code files.
fn default_code_extension() -> String {
    ".cs".to_string()
}

/// Default suffix inserted into the name of a fixed code file.
fn default_fixed_suffix() -> String {
    "_fixed".to_string()
}

/// Default cap on document search results.
fn default_max_results() -> usize {
    5
}

/// Default name the server advertises to clients.
fn default_server_name() -> String {
    "AdsDiagnosticsServer".to_string()
}

/// Configuration for the diagnostics server.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// Path of the on-disk ticket topic store (`ADS_DIAG_STORE_PATH`).
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Directory scanned for wiki documents (`ADS_DIAG_DOCUMENT_DIR`).
    #[serde(default = "default_document_dir")]
    pub document_dir: PathBuf,
    /// Root of the sandboxed code tree (`ADS_DIAG_CODE_ROOT`).
    /// All code operations must resolve inside this directory.
    #[serde(default = "default_code_root")]
    pub code_root: PathBuf,
    /// Extension a file must carry to count as a document (`ADS_DIAG_DOCUMENT_EXTENSION`).
    #[serde(default = "default_document_extension")]
    pub document_extension: String,
    /// Extension used by `list_code_files` when the caller gives none (`ADS_DIAG_DEFAULT_CODE_EXTENSION`).
    #[serde(default = "default_code_extension")]
    pub default_code_extension: String,
    /// Suffix used by `write_fixed_code_file` when the caller gives none (`ADS_DIAG_DEFAULT_FIXED_SUFFIX`).
    #[serde(default = "default_fixed_suffix")]
    pub default_fixed_suffix: String,
    /// Result cap used by `find_documents` when the caller gives none (`ADS_DIAG_DEFAULT_MAX_RESULTS`).
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
    /// Server name reported during the MCP handshake (`ADS_DIAG_SERVER_NAME`).
    #[serde(default = "default_server_name")]
    pub server_name: String,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            document_dir: default_document_dir(),
            code_root: default_code_root(),
            document_extension: default_document_extension(),
            default_code_extension: default_code_extension(),
            default_fixed_suffix: default_fixed_suffix(),
            default_max_results: default_max_results(),
            server_name: default_server_name(),
        }
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Config {
    pub fn load(explicit_path: Option<&Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("ADS_DIAG"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let inner: ConfigInner = cfg.build()?.try_deserialize()?;
        let result = Config::from(inner);

        result.validate()?;

        Ok(result)
    }

    /// Checks the invariants the services rely on.
    pub fn validate(&self) -> Res<()> {
        if !self.document_extension.starts_with('.') {
            return Err(anyhow::anyhow!("Document extension must start with a `.`."));
        }

        if !self.default_code_extension.starts_with('.') {
            return Err(anyhow::anyhow!("Default code extension must start with a `.`."));
        }

        if self.default_max_results < 1 {
            return Err(anyhow::anyhow!("Default max results must be at least 1."));
        }

        if self.default_fixed_suffix.is_empty() {
            return Err(anyhow::anyhow!("Default fixed suffix must not be empty."));
        }

        if self.default_fixed_suffix.contains(['/', '\\']) {
            return Err(anyhow::anyhow!("Default fixed suffix must not contain path separators."));
        }

        Ok(())
    }
}
