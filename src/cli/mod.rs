//! CLI module for the Ragbase API
//!
//! Provides the `serve` subcommand that runs the HTTP service.

pub mod serve;

use clap::{Parser, Subcommand};

/// Ragbase - hybrid lexical and vector retrieval over knowledge bases
#[derive(Parser)]
#[command(name = "ragbase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,
}
