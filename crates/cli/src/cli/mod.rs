// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "offsync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Queue HTTP requests while offline and replay them in order")]
#[command(
    long_about = "Queue HTTP requests while offline and replay them in order.\n\n\
    Requests are kept in a durable sync log and sent in creation order by 'offsync sync'.\n\
    Set OFFSYNC_LOG (e.g. OFFSYNC_LOG=debug) to control logging."
)]
pub struct Cli {
    /// Run as if offsync was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    /// Log debug output to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize offsync in the current directory
    #[command(after_help = "\
Examples:
  offsync init                       Create .offsync/ with the default store
  offsync init --store /tmp/app.db   Keep the store outside the project")]
    Init {
        /// Store path (relative to .offsync/ or absolute)
        #[arg(long, value_parser = non_empty_string)]
        store: Option<String>,
    },

    /// Queue a request in the sync log
    #[command(
        arg_required_else_help = true,
        after_help = "\
Examples:
  offsync queue POST https://api.example.com/items -d '{\"id\":1}'
  offsync queue DELETE https://api.example.com/items/1
  offsync queue PUT https://api.example.com/items/1 -H 'authorization: Bearer t' -d '{}'"
    )]
    Queue {
        /// HTTP method
        method: String,

        /// Absolute request URL
        url: String,

        /// Request header as 'name: value' (repeatable)
        #[arg(long = "header", short = 'H')]
        headers: Vec<String>,

        /// Request body; JSON bodies get a JSON content type
        #[arg(long = "data", short = 'd')]
        data: Option<String>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List the sync log in creation order
    Log {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Remove an entry from the sync log
    #[command(arg_required_else_help = true)]
    Remove {
        /// Sync log id
        id: String,
    },

    /// Revert the local store changes recorded with an entry
    #[command(arg_required_else_help = true)]
    Undo {
        /// Sync log id
        id: String,
    },

    /// Re-apply the local store changes recorded with an entry
    #[command(arg_required_else_help = true)]
    Redo {
        /// Sync log id
        id: String,
    },

    /// Replay the sync log over HTTP
    #[command(after_help = "\
Examples:
  offsync sync                              Replay with the configured preflight
  offsync sync --no-preflight               Skip the OPTIONS connectivity probe
  offsync sync --preflight-timeout-ms 500   Give up quickly when offline")]
    Sync {
        /// Skip the OPTIONS preflight for every entry
        #[arg(long)]
        no_preflight: bool,

        /// Preflight timeout in milliseconds
        #[arg(long, value_name = "ms")]
        preflight_timeout_ms: Option<u64>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Manage the offline cache
    #[command(subcommand)]
    Cache(CacheCommand),

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Offline cache commands.
#[derive(Subcommand)]
pub enum CacheCommand {
    /// List cached requests
    List {
        /// Cache name
        #[arg(long, default_value = "default")]
        name: String,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
    /// Fetch a URL and cache the response
    #[command(arg_required_else_help = true)]
    Add {
        /// Absolute URL to fetch with GET
        url: String,

        /// Cache name
        #[arg(long, default_value = "default")]
        name: String,
    },
    /// Remove every cached response
    Clear {
        /// Cache name
        #[arg(long, default_value = "default")]
        name: String,
    },
}

/// Configuration commands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
