//! OpenAI Client Sample - runs every completions variant once

use anyhow::Context;
use openai_client_sample::{ConfigLoader, Console, DemoRunner, DemoSettings, OpenAiClientBuilder};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so stdout carries only the demo output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = ConfigLoader::from_env()
        .context("Failed to load configuration")?
        .into_config();
    info!(
        endpoint = %config.endpoint.base_url(),
        completions = %config.completions_deployment,
        chat = %config.chat_deployment,
        "Configuration loaded"
    );

    let builder = OpenAiClientBuilder::from_config(&config);
    let client = builder.build_client().context("Failed to build client")?;
    let async_client = builder
        .build_async_client()
        .context("Failed to build async client")?;

    let summary = DemoRunner::new(
        &client,
        &async_client,
        Console::stdio(),
        DemoSettings::from(&config),
    )
    .run_all();

    Ok(if summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
