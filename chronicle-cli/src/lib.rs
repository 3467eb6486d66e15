//! Chronicle CLI - Command-line interface for chronicle migrations.
//!
//! This crate provides the CLI tool for managing migration scripts,
//! inspecting changelog status and exporting merged up-scripts.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
