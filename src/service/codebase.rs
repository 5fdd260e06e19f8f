//! Sandboxed access to the code root.
//!
//! Every path an agent supplies is resolved lexically against the code root
//! before anything touches the filesystem, and must stay inside it. Once the
//! target is known to exist, its real path is checked again so symbolic links
//! cannot lead out of the root either.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::base::{
    config::Config,
    error::{ToolError, ToolRes},
    types::{CodeFileRecord, CodeListing, Res, SavedCodeFile},
};

const OUTSIDE_ROOT: &str = "File path is outside the allowed CodeBase directory.";
const OUTSIDE_ROOT_FOR_LISTING: &str = "Project folder is outside the allowed CodeBase directory.";
const OUTSIDE_ROOT_FOR_WRITING: &str = "Original file path is outside the allowed CodeBase directory for writing.";

/// The sandboxed code tree.
#[derive(Debug, Clone)]
pub struct CodeBase {
    /// Absolute, lexically normalized root.
    root: PathBuf,
}

impl CodeBase {
    /// Anchors the sandbox at `root`, made absolute against the working directory.
    pub fn new(root: &Path) -> Res<Self> {
        let absolute = if root.is_absolute() { root.to_path_buf() } else { std::env::current_dir()?.join(root) };

        Ok(Self { root: normalize(&absolute) })
    }

    pub fn from_config(config: &Config) -> Res<Self> {
        Self::new(&config.code_root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lexically resolves `requested` and rejects anything outside the root.
    ///
    /// Relative paths are taken relative to the root.
    fn contain(&self, requested: &str, denial: &str) -> ToolRes<PathBuf> {
        let candidate = Path::new(requested);
        let joined = if candidate.is_absolute() { candidate.to_path_buf() } else { self.root.join(candidate) };
        let resolved = normalize(&joined);

        if !resolved.starts_with(&self.root) {
            warn!("Rejected path `{}` outside the code root.", requested);
            return Err(ToolError::access_denied(denial));
        }

        Ok(resolved)
    }

    /// Checks that an existing path still lies inside the root once links are followed.
    fn confirm_real_path(&self, resolved: &Path, denial: &str) -> ToolRes<()> {
        let real_root = self.root.canonicalize().map_err(|err| ToolError::failed(format!("Failed to resolve code root: {err}")))?;
        let real_path = resolved.canonicalize().map_err(|err| ToolError::failed(format!("Failed to resolve '{}': {err}", resolved.display())))?;

        if !real_path.starts_with(&real_root) {
            warn!("Rejected `{}`, which resolves outside the code root.", resolved.display());
            return Err(ToolError::access_denied(denial));
        }

        Ok(())
    }

    /// Recursively lists files under `subfolder` whose names end with `extension`.
    #[instrument(skip(self))]
    pub fn list(&self, subfolder: &str, extension: &str) -> ToolRes<CodeListing> {
        let target = self.contain(subfolder, OUTSIDE_ROOT_FOR_LISTING)?;

        if !target.is_dir() {
            return Err(ToolError::not_found(format!("Project directory not found: {}", target.display())));
        }

        self.confirm_real_path(&target, OUTSIDE_ROOT_FOR_LISTING)?;

        let mut files = Vec::new();

        for entry in WalkDir::new(&target).sort_by_file_name() {
            let entry = entry.map_err(|err| ToolError::failed(format!("Failed to list project directory '{}': {err}", target.display())))?;

            if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(extension) {
                files.push(entry.path().display().to_string());
            }
        }

        debug!("Listed {} `{}` files under `{}`.", files.len(), extension, target.display());

        if files.is_empty() {
            return Ok(CodeListing::Empty {
                message: format!("No '{extension}' files found in '{}'.", target.display()),
                files,
            });
        }

        Ok(CodeListing::Found {
            project_subfolder: subfolder.to_string(),
            files,
        })
    }

    /// Reads a code file as UTF-8 text.
    #[instrument(skip(self))]
    pub fn read(&self, path: &str) -> ToolRes<CodeFileRecord> {
        let resolved = self.contain(path, OUTSIDE_ROOT)?;

        if !resolved.is_file() {
            return Err(ToolError::not_found(format!("Code file not found: {path}")));
        }

        self.confirm_real_path(&resolved, OUTSIDE_ROOT)?;

        let content = fs::read_to_string(&resolved).map_err(|err| ToolError::failed(format!("Failed to read code file '{path}': {err}")))?;

        Ok(CodeFileRecord {
            path: path.to_string(),
            content,
        })
    }

    /// Writes `content` next to `original_path` under a name derived by inserting
    /// `suffix` before the extension. An existing target is overwritten.
    #[instrument(skip(self, content))]
    pub fn write_fixed(&self, original_path: &str, content: &str, suffix: &str) -> ToolRes<SavedCodeFile> {
        if suffix.is_empty() {
            return Err(ToolError::invalid("Suffix must not be empty; the original file is never overwritten."));
        }

        if suffix.contains(['/', '\\']) {
            return Err(ToolError::invalid("Suffix must not contain path separators."));
        }

        let resolved = self.contain(original_path, OUTSIDE_ROOT_FOR_WRITING)?;

        if !resolved.is_file() {
            return Err(ToolError::not_found(format!("Original code file not found: {original_path}, cannot determine save location.")));
        }

        self.confirm_real_path(&resolved, OUTSIDE_ROOT_FOR_WRITING)?;

        let target = fixed_path(&resolved, suffix).ok_or_else(|| ToolError::invalid(format!("Cannot derive a file name from '{original_path}'.")))?;

        // An existing link at the target is followed by the write, so it must land inside the root too.
        if fs::symlink_metadata(&target).is_ok_and(|meta| meta.file_type().is_symlink()) {
            self.confirm_real_path(&target, OUTSIDE_ROOT_FOR_WRITING).map_err(|err| match err {
                ToolError::Failed(_) => ToolError::access_denied(OUTSIDE_ROOT_FOR_WRITING),
                other => other,
            })?;
        }

        fs::write(&target, content).map_err(|err| ToolError::failed(format!("Failed to write fixed code file '{}': {err}", target.display())))?;

        info!("Saved fixed code file `{}`.", target.display());

        Ok(SavedCodeFile {
            status: "success".to_string(),
            saved_path: target.display().to_string(),
        })
    }

    /// Sorted names of the top-level project folders, skipping hidden ones and caches.
    pub fn projects(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.root) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| !name.starts_with('.') && name != "__pycache__")
            .collect();

        names.sort();
        names
    }

    /// Markdown listing served as the `codebase://projects` resource.
    pub fn projects_markdown(&self) -> String {
        let names = self.projects();
        let mut out = String::from("# Available Code Projects in CodeBase\n\n");

        if names.is_empty() {
            out.push_str("No project folders found in the CodeBase directory.\n");
            return out;
        }

        for name in &names {
            out.push_str(&format!("- `{name}`\n"));
        }

        out.push_str("\nUse `list_code_files` with a project folder name to see its code files.\n");
        out
    }
}

// Helpers.

/// Resolves `.` and `..` components without touching the filesystem.
///
/// `..` never climbs above the filesystem root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }

    out
}

/// `dir/name.ext` becomes `dir/name<suffix>.ext`; a file without an extension just gains the suffix.
fn fixed_path(path: &Path, suffix: &str) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_string_lossy();

    let name = match path.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };

    Some(path.with_file_name(name))
}

// Tests.
