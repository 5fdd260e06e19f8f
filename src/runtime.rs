//! Runtime services and shared state for the diagnostics server.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, TicketTopic},
    },
    service::{
        backend::BackendClient,
        codebase::CodeBase,
        db::{DbClient, default_ticket_topics},
        documents::DocumentLibrary,
        mcp::DiagnosticsServer,
        topics::TopicResolver,
    },
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the topic store, the document and code views, the ads
/// backend, and configuration. It is designed to be trivially cloneable,
/// allowing it to be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The ticket topic store, held open for the life of the process.
    pub db: DbClient,
    /// Ticket id to topic resolution over `db`.
    pub topics: TopicResolver,
    /// The wiki document directory.
    pub documents: DocumentLibrary,
    /// The sandboxed code root.
    pub code: CodeBase,
    /// The ads platform backend.
    pub backend: BackendClient,
}

impl Runtime {
    /// Create a new runtime instance backed by the on-disk topic store.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        let db = DbClient::surreal_file(&config.store_path).await?;

        Self::with_clients(config, db, BackendClient::placeholder())
    }

    /// Create a runtime around existing clients.
    pub fn with_clients(config: Config, db: DbClient, backend: BackendClient) -> Res<Self> {
        let topics = TopicResolver::new(db.clone());
        let documents = DocumentLibrary::from_config(&config);
        let code = CodeBase::from_config(&config)?;

        Ok(Self {
            config,
            db,
            topics,
            documents,
            code,
            backend,
        })
    }

    /// Serves MCP over stdio until the client disconnects.
    pub async fn start(&self) -> Res<()> {
        DiagnosticsServer::new(self).serve_stdio().await
    }

    /// Writes the default ticket topics; rows that already exist are kept.
    pub async fn seed(&self) -> Res<usize> {
        let topics: Vec<TicketTopic> = default_ticket_topics();

        self.db.seed_ticket_topics(&topics).await
    }
}
