mod cli;
mod logging;
mod render;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use repo_scan::{Phase, ScanRequest, ScanSession};
use scan_api::ScanApiClient;
use tracing::info;

use crate::cli::Cli;
use crate::render::Renderer;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    logging::init_tracing(&cli.log_level, cli.log_format)?;

    let mut request = ScanRequest::new(cli.repository_url.as_str())?;
    if let Some(token) = cli.token.as_deref() {
        request = request.with_access_token(token);
    }

    let client = ScanApiClient::new(cli.api_config()).context("failed to build HTTP client")?;
    let session = ScanSession::new(client);

    let stop = session.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("stop requested");
            stop.stop();
        }
    });

    let mut renderer = Renderer::new(cli.output, std::io::stdout());
    let state = session
        .start_with_handler(&request, |state| renderer.observe(state))
        .await?;
    renderer
        .finish(&state)
        .context("failed to write scan output")?;

    Ok(exit_code(state.phase))
}

fn exit_code(phase: Phase) -> ExitCode {
    match phase {
        Phase::Finished => ExitCode::SUCCESS,
        Phase::Stopped => ExitCode::from(130),
        Phase::Idle | Phase::Running | Phase::Failed => ExitCode::FAILURE,
    }
}
