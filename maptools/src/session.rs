//! An open client connection to the MAP server.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::library::{AcquisitionLibrary, DrainStats};
use crate::tick::Tick;
use crate::{EventRecord, MAX_MAP_EVENTS_PER_READ};

/// Settings used when registering with the server.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Client type passed to the library at registration
    pub client_type: i32,
    /// Event slots read from the server at once
    pub capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            client_type: 0,
            capacity: MAX_MAP_EVENTS_PER_READ,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::Config(String::from("capacity must be nonzero")));
        }
        Ok(())
    }
}

/// Fixed-capacity event buffer, reused across drains.
struct EventBatch {
    slots: Box<[EventRecord]>,
    valid: usize,
}

impl EventBatch {
    fn with_capacity(capacity: usize) -> Self {
        EventBatch {
            slots: vec![EventRecord::default(); capacity].into_boxed_slice(),
            valid: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn valid(&self) -> &[EventRecord] {
        &self.slots[..self.valid]
    }
}

/// Records from one drain. Borrows the session's buffer, so it must be
/// consumed before the next drain.
#[derive(Debug)]
pub struct Drain<'a> {
    pub records: &'a [EventRecord],
    pub stats: DrainStats,
}

/// An open connection to the server.
///
/// The library is closed exactly once: by [`Session::close`], or on drop.
pub struct Session<L: AcquisitionLibrary> {
    library: L,
    tick: Tick,
    slow_rate: i32,
    batch: EventBatch,
    open: bool,
}

impl<L: AcquisitionLibrary> Session<L> {
    /// Register with the server and validate its timestamp tick.
    ///
    /// No retries: after a failed registration the server-side state is
    /// unknown.
    pub fn open(mut library: L, config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        library.open(config)?;

        let raw_tick = library.timestamp_tick();
        let tick = match Tick::try_from(raw_tick) {
            Ok(tick) => tick,
            Err(e) => {
                library.close();
                return Err(e);
            }
        };
        let slow_rate = library.slow_sample_rate();
        info!(
            tick_us = tick.micros(),
            map_rate = tick.map_sample_rate(),
            slow_rate,
            capacity = config.capacity,
            "client session open"
        );
        if !library.is_sort_client_running() {
            warn!("sort client is not running");
        }
        if !library.is_long_wave_mode() {
            debug!("server is not in long wave mode");
        }

        Ok(Session {
            library,
            tick,
            slow_rate,
            batch: EventBatch::with_capacity(config.capacity),
            open: true,
        })
    }

    /// Like [`Session::open`], but an unavailable library is logged and
    /// reported as `None` so the caller can carry on without acquisition.
    pub fn open_or_disabled(library: L, config: &SessionConfig) -> Result<Option<Self>> {
        match Session::open(library, config) {
            Ok(session) => Ok(Some(session)),
            Err(Error::LibraryUnavailable(why)) => {
                warn!(%why, "failed to load client library, acquisition disabled");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn map_sample_rate(&self) -> u32 {
        self.tick.map_sample_rate()
    }

    /// Continuous channel sampling rate, if the server reported one
    pub fn slow_sample_rate(&self) -> Option<u32> {
        if self.slow_rate > 0 {
            Some(self.slow_rate as u32)
        } else {
            None
        }
    }

    pub fn ticks_per_sample(&self) -> u64 {
        self.tick.ticks_per_sample(self.slow_rate)
    }

    pub fn capacity(&self) -> usize {
        self.batch.capacity()
    }

    pub fn is_sort_client_running(&self) -> bool {
        self.library.is_sort_client_running()
    }

    pub fn is_long_wave_mode(&self) -> bool {
        self.library.is_long_wave_mode()
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    /// Read the events queued since the last drain into the session buffer.
    pub fn drain(&mut self) -> Result<Drain<'_>> {
        let capacity = self.batch.capacity();
        self.batch.valid = 0;
        let (count, stats) = self.library.drain(&mut self.batch.slots)?;
        if count > capacity {
            return Err(Error::BatchOverrun { count, capacity });
        }
        self.batch.valid = count;
        Ok(Drain {
            records: self.batch.valid(),
            stats,
        })
    }

    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.open {
            self.open = false;
            self.library.close();
            info!("client session closed");
        }
    }
}

impl<L: AcquisitionLibrary> Drop for Session<L> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
