//! Service integrations behind the agent-facing surface.
//!
//! This module contains the services used by the diagnostics server:
//! - The ticket topic store (e.g., SurrealDB) and topic resolution
//! - The wiki document library and the sandboxed code base
//! - The ads platform backends (placeholders for now)
//! - The MCP server itself
//!
//! Services that talk to something swappable define both a generic trait and
//! a concrete implementation, allowing for extensibility and easy testing.

pub mod backend;
pub mod codebase;
pub mod db;
pub mod documents;
pub mod mcp;
pub mod topics;
