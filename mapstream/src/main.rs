use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use maptools::de;
use maptools::replay::ReplayLibrary;
use mapstream::native::NativeLibrary;
use mapstream::{controller, timer, CliArgs};

const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");

fn main() -> Result<()> {
    let args: CliArgs = argh::from_env();

    if args.version {
        println!(
            concat!(
                env!("CARGO_BIN_NAME"),
                " ",
                "{}",
            ),
            GIT_VERSION,
        );
        return Ok(())
    }

    // Logs go to stderr, stdout carries only samples
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cfg = args.stream_config()?;

    let record = match &args.record {
        Some(path) => Some(File::create(path).with_context(|| format!("creating {}", path))?),
        None => None,
    };

    let replay = match &args.replay {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("opening {}", path))?;
            let mut rdr = csv::ReaderBuilder::new()
                .has_headers(false)
                .delimiter(b'\t')
                .flexible(true)
                .from_reader(BufReader::new(f));
            Some(de::records_tsv(&mut rdr)?)
        }
        None => None,
    };
    let polls = match &replay {
        Some(batches) => {
            let available = batches.len() as u64;
            Some(args.polls.map_or(available, |n| n.min(available)))
        }
        None => args.polls,
    };

    let (tx_tick, rx_tick) = flume::bounded(1);
    info!(interval = ?cfg.interval, ?polls, "starting timer");
    timer::main(cfg.interval, polls, tx_tick)?;

    info!("starting controller");
    let handle = match replay {
        Some(batches) => {
            let library = ReplayLibrary::new(batches);
            std::thread::spawn(move || {
                controller::main(library, &cfg, polls, rx_tick, std::io::stdout(), record)
            })
        }
        None => {
            let library = NativeLibrary::new();
            std::thread::spawn(move || {
                controller::main(library, &cfg, polls, rx_tick, std::io::stdout(), record)
            })
        }
    };

    let polls = handle
        .join()
        .map_err(|_| anyhow!("controller thread panicked"))??;
    info!(polls, "done");

    Ok(())
}
