#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names
)]

use anyhow::Result;
use clap::Parser;
use futures_util::StreamExt;
use shopscout::app::build_runtime;
use shopscout::cli::{Cli, Command};
use shopscout::config::Config;
use shopscout::engine::RunState;
use shopscout::gateway::{self, AppState};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS.
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let mut config = Config::load_or_init()?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.gateway.host = host;
            }
            if let Some(port) = port {
                config.gateway.port = port;
            }
            let runtime = build_runtime(&config).await?;
            let state = AppState {
                dispatcher: runtime.dispatcher,
                store: runtime.store,
            };
            gateway::serve(&config.gateway, state).await
        }
        Command::Research { query, deep, json } => {
            let runtime = build_runtime(&config).await?;
            let stream = runtime.dispatcher.run_stream(RunState::new(query, deep));
            futures_util::pin_mut!(stream);

            let mut last = None;
            while let Some(event) = stream.next().await {
                eprintln!("[{:>3}%] {}", event.progress, event.description);
                last = Some(event.state);
            }
            let Some(state) = last else {
                anyhow::bail!("research run produced no output");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                println!("{}", state.final_report.unwrap_or_default());
            }
            Ok(())
        }
        Command::History { limit, id } => {
            let runtime = build_runtime(&config).await?;
            if let Some(id) = id {
                match runtime.store.get(&id).await? {
                    Some(report) => println!("{}", report.report),
                    None => anyhow::bail!("no report with id {id}"),
                }
            } else {
                for summary in runtime.store.list(limit).await? {
                    println!(
                        "{}  {}  [{}]  {}",
                        summary.created_at.format("%Y-%m-%d %H:%M"),
                        summary.id,
                        summary.intent,
                        summary.query
                    );
                }
            }
            Ok(())
        }
    }
}
