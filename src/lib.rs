//! modeldeck is a terminal client for a self-hosted language model.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the chat session, the streaming reader, the deployment
//!   orchestrator and the shared server URL that connects the two.
//! - [`commands`] implements slash-command parsing and execution for the REPL.
//! - [`api`] defines the request and response payloads exchanged with the
//!   generation backend and the deployment service.
//! - [`utils`] holds URL helpers and the chat transcript logger.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod logging;
pub mod utils;
