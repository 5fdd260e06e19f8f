//! Read-only enumeration resources.

use crate::{
    base::prompts::{DOCUMENTS_RESOURCE_URI, PROJECTS_RESOURCE_URI},
    runtime::Runtime,
};

/// A resource the server advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub mime_type: &'static str,
}

pub const RESOURCES: &[ResourceSpec] = &[
    ResourceSpec {
        uri: DOCUMENTS_RESOURCE_URI,
        name: "Available wiki documents",
        description: "Markdown list of the wiki documents available for diagnosis.",
        mime_type: "text/markdown",
    },
    ResourceSpec {
        uri: PROJECTS_RESOURCE_URI,
        name: "Code projects",
        description: "Markdown list of the project folders in the code base.",
        mime_type: "text/markdown",
    },
];

/// Serves the enumeration resources from the runtime's services.
#[derive(Clone)]
pub struct ResourceCatalog {
    runtime: Runtime,
}

impl ResourceCatalog {
    pub fn new(runtime: Runtime) -> Self {
        Self { runtime }
    }

    pub fn list(&self) -> &'static [ResourceSpec] {
        RESOURCES
    }

    /// Renders the resource at `uri`; `None` for an unknown uri.
    pub fn read(&self, uri: &str) -> Option<String> {
        match uri {
            DOCUMENTS_RESOURCE_URI => Some(self.runtime.documents.available_markdown()),
            PROJECTS_RESOURCE_URI => Some(self.runtime.code.projects_markdown()),
            _ => None,
        }
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{
        base::{
            config::{Config, ConfigInner},
            prompts::ALL_PROMPTS,
        },
        service::{backend::BackendClient, db::DbClient},
    };

    async fn catalog(root: &std::path::Path) -> ResourceCatalog {
        let config = Config::from(ConfigInner {
            document_dir: root.join("Wikis"),
            code_root: root.join("CodeBase"),
            ..Default::default()
        });
        let db = DbClient::surreal_memory().await.unwrap();

        ResourceCatalog::new(Runtime::with_clients(config, db, BackendClient::placeholder()).unwrap())
    }

    #[tokio::test]
    async fn test_every_prompt_resource_is_registered() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = catalog(dir.path()).await;

        for prompt in ALL_PROMPTS {
            for uri in prompt.resources {
                assert!(catalog.list().iter().any(|r| r.uri == *uri), "prompt `{}` references unknown resource `{}`", prompt.name, uri);
                assert!(catalog.read(uri).is_some());
            }
        }
    }

    #[tokio::test]
    async fn test_read_listings() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Wikis")).unwrap();
        fs::create_dir_all(dir.path().join("CodeBase/Pacing")).unwrap();
        fs::write(dir.path().join("Wikis/Pacing.pdf"), b"").unwrap();
        let catalog = catalog(dir.path()).await;

        assert!(catalog.read(DOCUMENTS_RESOURCE_URI).unwrap().contains("- `Pacing.pdf`"));
        assert!(catalog.read(PROJECTS_RESOURCE_URI).unwrap().contains("- `Pacing`"));
        assert_eq!(catalog.read("documents://missing"), None);
    }
}
