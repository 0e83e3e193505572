//! Configuration of a streaming client
//!
//! A [TOML](https://toml.io) file sets up the session, the bucketing and
//! the polling interval. Every field is optional; anything left out keeps
//! its default. For example:
//!
//! ```toml
//! interval = "500ms"
//!
//! [session]
//! capacity = 4000
//!
//! [bucket]
//! processed = [64, 65]
//! accumulate = false
//! ```
//!
//! The interval is parsed as in [humantime](https://docs.rs/humantime/),
//! e.g. `1s` or `250ms`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::bucket::BucketConfig;
use crate::error::{Error, Result};
use crate::session::SessionConfig;

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct StreamConfig {
    /// Time between drains
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    pub session: SessionConfig,
    pub bucket: BucketConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            interval: Duration::from_secs(1),
            session: SessionConfig::default(),
            bucket: BucketConfig::default(),
        }
    }
}

impl StreamConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: StreamConfig = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        StreamConfig::from_toml(&s)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::Config(String::from("interval must be nonzero")));
        }
        self.session.validate()?;
        self.bucket.validate()
    }
}
