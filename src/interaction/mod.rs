//! Agent-facing interaction handlers.
//!
//! This module turns the services into what an MCP client sees:
//! - `registry`: the `Tool` trait and the name-to-tool registry
//! - `tools`: every tool implementation
//! - `prompts`: prompt assembly for the diagnostic scenarios
//! - `resources`: the markdown enumeration resources

pub mod prompts;
pub mod registry;
pub mod resources;
pub mod tools;
