//! Library root for `ads-diagnostics`.
//!
//! Ads-diagnostics is an MCP server that gives an LLM agent what it needs to
//! diagnose ads customer escalations:
//! - Resolve a ticket id to its topic label
//! - Search and read the wiki documents
//! - List, read and propose fixes for code in a sandboxed code base
//! - Follow scripted diagnosis prompts that name the tools to call
//!
//! The server speaks MCP over stdio, keeps ticket topics in SurrealDB, and
//! is built around traits that allow the store and the ads backends to be
//! swapped out.

pub mod base;
pub mod interaction;
pub mod prelude;
pub mod runtime;
pub mod service;

use base::{
    config::Config,
    types::{Res, Void},
};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Opens the topic store and serves MCP over stdio until the client disconnects.
pub async fn start(config: Config) -> Void {
    info!("Starting ads-diagnostics ...");

    let runtime = runtime::Runtime::new(config).await?;

    runtime.start().await
}

/// Writes the default ticket topics into the store, keeping rows that already exist.
pub async fn seed(config: Config) -> Res<usize> {
    let runtime = runtime::Runtime::new(config).await?;

    let inserted = runtime.seed().await?;

    info!("Inserted {} ticket topics into `{}`.", inserted, runtime.config.store_path.display());

    Ok(inserted)
}

/// Resolves a single ticket id against the store.
pub async fn topic(config: Config, ticket_id: i64) -> Res<String> {
    let runtime = runtime::Runtime::new(config).await?;

    runtime.topics.resolve(ticket_id).await
}
