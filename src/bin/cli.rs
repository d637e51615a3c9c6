//! `bloomlist-cli`: the blacklist driven from standard input.
//!
//! The first valid `<size> <depth>...` line configures the filter; after that
//! `1 <url>` adds a url and `2 <url>` prints `false`, `true true` or
//! `true false`. Anything else is ignored.

use bloomlist::validator::{parse_command_line, parse_initial_config, CliCommand};
use bloomlist::{Blacklist, Options, Verdict};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bloomlist-cli", about = "Bloom filter URL blacklist on stdin", version)]
struct Args {
    /// Journal file backing the filter
    #[arg(long, default_value = "filter_data.bin")]
    data: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let config = loop {
        let Some(line) = lines.next() else {
            return Ok(());
        };
        if let Some(config) = parse_initial_config(&line?) {
            break config;
        }
    };

    let blacklist = Blacklist::open(&args.data, config, Options::default());

    for line in lines {
        let Some((command, url)) = parse_command_line(&line?) else {
            continue;
        };

        match command {
            CliCommand::Add => blacklist.add(&url),
            CliCommand::Check => {
                let answer = match blacklist.lookup(&url) {
                    Verdict::Absent => "false",
                    Verdict::Present => "true true",
                    Verdict::FalsePositive => "true false",
                };
                writeln!(out, "{}", answer)?;
                out.flush()?;
            }
        }
    }

    Ok(())
}
