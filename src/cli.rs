use clap::Parser;
use std::path::PathBuf;

/// Command-line surface of the stub server.
#[derive(Debug, Parser)]
#[command(name = "apistub", version)]
#[command(about = "Serve schema-valid stub responses for an OpenAPI-described REST API")]
pub struct Cli {
    /// OpenAPI 3.0 description to serve (JSON or YAML)
    #[arg(long)]
    pub spec: PathBuf,

    /// Fixtures document with one sample object per resource (JSON or YAML)
    #[arg(long)]
    pub fixtures: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:12111")]
    pub addr: String,

    /// Log request/response diagnostics
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
