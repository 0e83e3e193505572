pub mod controller;
pub mod native;
pub mod timer;

use argh::FromArgs;
use maptools::cfg::StreamConfig;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, FromArgs, Clone)]
/// Poll a MAP Server and stream continuous channel samples as tab-separated
/// (channel, seconds, value) rows on stdout
pub struct CliArgs {
    /// print version information
    #[argh(switch, short = 'v')]
    pub version: bool,
    /// config file path (TOML)
    #[argh(option, short = 'c')]
    pub config: Option<String>,
    /// poll interval in ms, overrides the config file
    #[argh(option, short = 'i')]
    pub interval: Option<u64>,
    /// channel to stream, repeatable; overrides the config file
    #[argh(option)]
    pub channel: Vec<u16>,
    /// stop after this many polls
    #[argh(option, short = 'n')]
    pub polls: Option<u64>,
    /// collect all polls and write them once at the end
    #[argh(switch, short = 'a')]
    pub accumulate: bool,
    /// replay recorded events from a .tsv file instead of a live server
    #[argh(option)]
    pub replay: Option<String>,
    /// record drained events to a .tsv file
    #[argh(option)]
    pub record: Option<String>,
}

impl CliArgs {
    /// Load the config file, if any, and apply command line overrides.
    pub fn stream_config(&self) -> maptools::Result<StreamConfig> {
        let mut cfg = match &self.config {
            Some(path) => StreamConfig::load(Path::new(path))?,
            None => StreamConfig::default(),
        };
        if let Some(ms) = self.interval {
            cfg.interval = Duration::from_millis(ms);
        }
        if !self.channel.is_empty() {
            cfg.bucket.processed = self.channel.clone();
        }
        if self.accumulate {
            cfg.bucket.accumulate = true;
        }
        cfg.validate()?;
        // Accumulated samples are only written once the polls run out
        if cfg.bucket.accumulate && self.polls.is_none() && self.replay.is_none() {
            return Err(maptools::Error::Config(String::from(
                "accumulating a live stream needs --polls",
            )));
        }
        Ok(cfg)
    }
}

pub enum Event {
    Tick,
}
