//! SurrealDB implementation for ticket topic storage.

use std::{path::Path, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::{
    Surreal,
    engine::local::{Db, Mem, SurrealKv},
};
use tracing::{debug, info, instrument};

use crate::base::types::{Res, TicketTopic};

use super::{DbClient, GenericDbClient};

const TOPIC_TABLE: &str = "ticket_topic";

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Opens (or creates) the on-disk store at `path`.
    ///
    /// The embedded engine holds the store until the handle is dropped, so only one
    /// process can use a given `path` at a time.
    pub async fn surreal_file(path: &Path) -> Res<Self> {
        let db = Surreal::new::<SurrealKv>(path.to_string_lossy().into_owned())
            .await
            .with_context(|| format!("Failed to open topic store at `{}` (is another ads-diagnostics process using it?)", path.display()))?;
        let client = SurrealDbClient::new(db).await?;

        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates a throwaway in-memory store.
    pub async fn surreal_memory() -> Res<Self> {
        let db = Surreal::new::<Mem>(()).await?;
        let client = SurrealDbClient::new(db).await?;

        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// A ticket topic row; the record id is the ticket id.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TopicRecord {
    topic: String,
}

/// SurrealDB ticket topic client.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Db>,
}

impl SurrealDbClient {
    /// Selects the namespace and defines the schema.
    #[instrument(name = "SurrealDbClient::new", skip_all)]
    async fn new(db: Surreal<Db>) -> Res<Self> {
        db.use_ns("ads").use_db("diagnostics").await?;

        db.query(
            r#"
            DEFINE TABLE IF NOT EXISTS ticket_topic SCHEMAFULL;
            DEFINE FIELD IF NOT EXISTS topic ON ticket_topic TYPE string;
            "#,
        )
        .await?
        .check()?;

        info!("Ticket topic store initialized.");

        Ok(Self { db })
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(skip(self))]
    async fn get_ticket_topic(&self, ticket_id: i64) -> Res<Option<String>> {
        let record: Option<TopicRecord> = self.db.select((TOPIC_TABLE, ticket_id)).await?;

        debug!("Ticket `{}` has topic {:?}.", ticket_id, record.as_ref().map(|r| &r.topic));

        Ok(record.map(|r| r.topic))
    }

    #[instrument(skip_all)]
    async fn seed_ticket_topics(&self, topics: &[TicketTopic]) -> Res<usize> {
        let mut inserted = 0;

        for ticket in topics {
            let existing: Option<TopicRecord> = self.db.select((TOPIC_TABLE, ticket.ticket_id)).await?;

            if existing.is_some() {
                debug!("Ticket `{}` already has a topic, skipping.", ticket.ticket_id);
                continue;
            }

            let _: Option<TopicRecord> = self
                .db
                .create((TOPIC_TABLE, ticket.ticket_id))
                .content(TopicRecord { topic: ticket.topic.clone() })
                .await?;

            inserted += 1;
        }

        info!("Seeded {} of {} ticket topics.", inserted, topics.len());

        Ok(inserted)
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::db::default_ticket_topics;

    #[tokio::test]
    async fn test_missing_ticket_has_no_topic() {
        let db = DbClient::surreal_memory().await.unwrap();

        assert_eq!(db.get_ticket_topic(42).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_seed_then_lookup() {
        let db = DbClient::surreal_memory().await.unwrap();

        let inserted = db.seed_ticket_topics(&default_ticket_topics()).await.unwrap();

        assert_eq!(inserted, 20);
        assert_eq!(db.get_ticket_topic(7).await.unwrap().as_deref(), Some("Cloud Computing"));
        assert_eq!(db.get_ticket_topic(20).await.unwrap().as_deref(), Some("IT Support"));
        assert_eq!(db.get_ticket_topic(21).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_open_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let store_path = blocker.join("ticket_topics.db");

        let err = DbClient::surreal_file(&store_path).await.err().unwrap();

        assert!(err.to_string().starts_with("Failed to open topic store at"));
        assert!(err.to_string().contains("ticket_topics.db"));
    }

    #[tokio::test]
    async fn test_seed_keeps_existing_rows() {
        let db = DbClient::surreal_memory().await.unwrap();
        db.seed_ticket_topics(&[TicketTopic::new(7, "Custom Label")]).await.unwrap();

        let inserted = db.seed_ticket_topics(&default_ticket_topics()).await.unwrap();

        assert_eq!(inserted, 19);
        assert_eq!(db.get_ticket_topic(7).await.unwrap().as_deref(), Some("Custom Label"));
    }
}
