//! Ticket id to topic resolution.

use tracing::{instrument, warn};

use crate::base::types::{Res, UNKNOWN_TOPIC};

use super::db::DbClient;

/// Resolves ticket ids to topic labels against the ticket topic store.
#[derive(Clone)]
pub struct TopicResolver {
    db: DbClient,
}

impl TopicResolver {
    pub fn new(db: DbClient) -> Self {
        Self { db }
    }

    /// Returns the stored topic, or [`UNKNOWN_TOPIC`] when the ticket has no row.
    ///
    /// Store failures are returned as errors; they are never folded into the sentinel.
    #[instrument(skip(self))]
    pub async fn resolve(&self, ticket_id: i64) -> Res<String> {
        let topic = self.db.get_ticket_topic(ticket_id).await?;

        Ok(topic.unwrap_or_else(|| UNKNOWN_TOPIC.to_string()))
    }

    /// Like [`Self::resolve`], but replaces a store failure with a generic phrase
    /// naming the ticket, for use inside prompt text.
    pub async fn resolve_or_describe(&self, ticket_id: i64) -> String {
        match self.resolve(ticket_id).await {
            Ok(topic) => topic,
            Err(err) => {
                warn!("Failed to resolve topic for ticket `{}`: {:#}", ticket_id, err);
                format!("issue related to ticket {ticket_id}")
            }
        }
    }
}

// Tests.
