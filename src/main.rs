use std::process;

use richchunk::{
    application::{
        error::AppError,
        output::format_chunks,
        render::{ChunkRequest, ChunkService, ComrakChunkService},
    },
    config,
    infra::{input::read_markdown, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

fn main() {
    if let Err(error) = run() {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    let markdown = read_markdown(cli_args.input.as_deref())?;
    let service = ComrakChunkService::new(settings.render);
    let chunks = service.chunk(&ChunkRequest::new(markdown));
    info!(
        chunks = chunks.len(),
        max_chunk_length = service.config().max_chunk_length,
        "chunked input"
    );

    println!("{}", format_chunks(&chunks, cli_args.format)?);
    Ok(())
}
