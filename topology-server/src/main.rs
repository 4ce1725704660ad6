use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// JSON store for flow-chart topologies.
#[derive(Parser)]
#[command(name = "topology-server", version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "TOPOLOGY_ADDR", default_value = "127.0.0.1:5000")]
    addr: SocketAddr,

    /// JSON array file holding saved topologies
    #[arg(long, env = "TOPOLOGY_FILE", default_value = "topologies.json")]
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    topology_server::run(args.addr, args.file).await
}
