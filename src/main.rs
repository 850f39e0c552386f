use apistub::cli::Cli;
use apistub::server::{HttpServer, StubServer};
use apistub::spec::{load_api, load_fixtures};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let api = Arc::new(load_api(&cli.spec)?);
    let fixtures = Arc::new(load_fixtures(&cli.fixtures)?);

    let service = StubServer::new(api, fixtures, cli.verbose, env!("CARGO_PKG_VERSION"));
    let handle = HttpServer(service).start(&cli.addr)?;
    info!(addr = %cli.addr, "listening");

    handle
        .join()
        .map_err(|err| anyhow::anyhow!("server terminated abnormally: {err:?}"))?;
    Ok(())
}
