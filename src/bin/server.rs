//! `bloomlist-server`: serves one shared blacklist over TCP.

use anyhow::{bail, Context};
use bloomlist::{FilterConfig, Options, Server, ServerConfig};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bloomlist-server", about = "Bloom filter URL blacklist server", version)]
struct Args {
    /// Port to listen on
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Initial filter configuration, "<size> <depth>...". Without it the
    /// server waits for a client to send one.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    init: Vec<String>,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Connections served at the same time
    #[arg(long, default_value_t = 16)]
    max_clients: usize,

    /// Journal file backing the filter
    #[arg(long, default_value = "filter_data.bin")]
    data: PathBuf,

    /// Do not fsync the journal after every change
    #[arg(long)]
    no_sync: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let initial_config = initial_config(&args.init)?;

    let config = ServerConfig {
        bind_addr: SocketAddr::new(args.bind, args.port),
        max_clients: args.max_clients,
        data_path: args.data,
        initial_config,
        options: Options::default().sync_journal(!args.no_sync),
        ..Default::default()
    };

    let server = Server::bind(config).context("failed to start server")?;
    server.run()?;
    Ok(())
}

fn initial_config(init: &[String]) -> anyhow::Result<Option<FilterConfig>> {
    if init.is_empty() {
        return Ok(None);
    }

    let line = init.join(" ");
    match FilterConfig::parse(&line) {
        Some(config) => Ok(Some(config)),
        None => bail!("invalid filter configuration {:?}", line),
    }
}
