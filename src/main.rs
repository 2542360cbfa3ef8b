use std::net::SocketAddr;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use case_translator::api::{start_server, ApiContext};
use case_translator::config::Config;
use case_translator::pipeline::event::StorageEvent;
use case_translator::pipeline::processor::PipelineOutcome;

#[derive(Parser)]
#[command(name = "case-translator")]
#[command(version)]
#[command(about = "Translates case documents dropped in storage and links them to CRM cases")]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve /events, /intake and /health until ctrl-c.
    Serve {
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen: SocketAddr,
    },
    /// Run the pipeline once for a single object.
    Process {
        /// Defaults to the intake bucket.
        #[arg(long)]
        bucket: Option<String>,
        #[arg(long)]
        key: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    case_translator::init_tracing();
    tracing::debug!(config = ?cli.config, "Configuration loaded");

    let result = match cli.command {
        Commands::Serve { listen } => serve(&cli.config, listen),
        Commands::Process { bucket, key } => {
            let bucket = bucket.unwrap_or_else(|| cli.config.intake_bucket.clone());
            process_once(&cli.config, StorageEvent::new(bucket, key))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Clients are built before the runtime starts; pipeline runs happen on
/// the blocking pool.
fn serve(config: &Config, listen: SocketAddr) -> Result<(), String> {
    let store = config.build_store().map_err(|e| e.to_string())?;
    let processor = config
        .build_processor(store.clone())
        .map_err(|e| e.to_string())?;
    let ctx = ApiContext::new(processor, store, &config.intake_bucket);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {e}"))?;

    runtime.block_on(async move {
        let mut server = start_server(ctx, listen)
            .await
            .map_err(|e| e.to_string())?;

        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for ctrl-c: {e}");
        }
        server.shutdown();
        server.stopped().await;
        Ok(())
    })
}

fn process_once(config: &Config, event: StorageEvent) -> Result<(), String> {
    let store = config.build_store().map_err(|e| e.to_string())?;
    let processor = config.build_processor(store).map_err(|e| e.to_string())?;

    let result = processor.process(&event);
    let outcome = PipelineOutcome::of(&result);
    println!("{}", outcome.body());

    match result {
        Ok(report) => {
            tracing::info!(
                run_id = %report.run_id,
                content_version_id = %report.delivery.content_version_id,
                link_id = %report.delivery.link_id,
                "Run complete"
            );
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    }
}
