//! Core components, types, and utilities for the diagnostics server.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Diagnostic prompt templates handed to the agent.
//! - Common types, result handling, and the tool error taxonomy.

pub mod config;
pub mod error;
pub mod prompts;
pub mod types;
