use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `formguard` - bot verification endpoint for web forms.
#[derive(Parser, Debug)]
#[command(name = "formguard")]
#[command(version)]
#[command(about = "Score-based bot verification for web forms.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.formguard/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the verification endpoint
    Serve {
        /// Port to listen on (use 0 for random available port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },

    /// Ask the scoring provider about a token and print its verdict
    Check {
        /// Proof token issued by the anti-bot agent
        #[arg(short, long)]
        token: String,
    },

    /// Call a running verification endpoint the way a form would
    Probe {
        /// Endpoint base URL (default: [form] endpoint_url)
        #[arg(long)]
        url: Option<String>,

        /// Proof token to send in the `token` header
        #[arg(short, long)]
        token: String,
    },

    /// Show the resolved configuration
    Status,
}
