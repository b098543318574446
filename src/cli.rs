use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "shopscout", version, about = "LLM-planned product research")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP gateway.
    Serve {
        /// Bind host; overrides the config value.
        #[arg(long)]
        host: Option<String>,
        /// Bind port; overrides the config value.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one research query and print the report.
    Research {
        /// What to research, e.g. "best noise cancelling earbuds under $150".
        query: String,
        /// Use the larger model and a longer report.
        #[arg(long)]
        deep: bool,
        /// Print the full terminal state as JSON instead of the report.
        #[arg(long)]
        json: bool,
    },
    /// List stored reports.
    History {
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Print one full report by id instead of the listing.
        #[arg(long)]
        id: Option<String>,
    },
}
