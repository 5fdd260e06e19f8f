//! Ticket topic storage.
//!
//! The store maps a ticket id to the topic label the ticket was classified
//! under. Lookups are read-only during normal operation; the table is filled
//! once by the `seed` command.

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Res, TicketTopic};

pub mod surreal;

// Traits.

/// Generic database client trait that clients must implement.
///
/// Implementing this trait allows different storage backends to be used for
/// ticket topics, and lets tests swap in a mock.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Gets the topic stored for the ticket, or `None` if the ticket has no row.
    async fn get_ticket_topic(&self, ticket_id: i64) -> Res<Option<String>>;

    /// Inserts every topic whose ticket is not stored yet.
    ///
    /// Existing rows are left untouched. Returns the number of rows inserted.
    async fn seed_ticket_topics(&self, topics: &[TicketTopic]) -> Res<usize>;
}

#[cfg(test)]
mockall::mock! {
    pub Db {}

    #[async_trait]
    impl GenericDbClient for Db {
        async fn get_ticket_topic(&self, ticket_id: i64) -> Res<Option<String>>;
        async fn seed_ticket_topics(&self, topics: &[TicketTopic]) -> Res<usize>;
    }
}

/// Database client for ticket topics.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    /// The database client instance.
    pub inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}

// Seed data.

/// Default ticket topics written by `ads-diagnostics seed`.
pub const DEFAULT_TICKET_TOPICS: &[(i64, &str)] = &[
    (1, "Data Analysis"),
    (2, "Machine Learning"),
    (3, "Web Development"),
    (4, "Data Visualization"),
    (5, "Natural Language Processing"),
    (6, "Cybersecurity"),
    (7, "Cloud Computing"),
    (8, "Mobile App Development"),
    (9, "Game Development"),
    (10, "Artificial Intelligence"),
    (11, "DevOps"),
    (12, "Database Management"),
    (13, "E-commerce Solutions"),
    (14, "Blockchain Technology"),
    (15, "Internet of Things"),
    (16, "Software Testing"),
    (17, "UI/UX Design"),
    (18, "Big Data"),
    (19, "Digital Marketing"),
    (20, "IT Support"),
];

/// Builds the default seed set as owned records.
pub fn default_ticket_topics() -> Vec<TicketTopic> {
    DEFAULT_TICKET_TOPICS.iter().map(|(id, topic)| TicketTopic::new(*id, *topic)).collect()
}
