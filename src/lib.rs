//! Salesdeck - sales boards, pipelines and reusable templates from the command line
//!
//! This library provides the core functionality for Salesdeck, including:
//! - Database operations and migrations
//! - Data models for boards, pipelines, stages, deals and templates
//! - Repository layer for data access
//! - Domain services and the messenger connecting them
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use salesdeck::context::AppContext;
//! use salesdeck::services::boards;
//!
//! fn main() -> anyhow::Result<()> {
//!     let app = AppContext::in_memory()?;
//!     let board = boards::add(&app.service(), "Enterprise")?;
//!     println!("{}", board.id);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod messenger;
pub mod models;
pub mod repo;
pub mod services;
pub mod utils;
