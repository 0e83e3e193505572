//! The client library seam.
//!
//! [`AcquisitionLibrary`] is everything a [`Session`](crate::Session) needs
//! from the vendor's client library. The native binding implements it over
//! the C ABI; [`ReplayLibrary`](crate::replay::ReplayLibrary) implements it
//! over recorded batches.

use crate::error::Result;
use crate::session::SessionConfig;
use crate::EventRecord;

pub trait AcquisitionLibrary {
    /// Register with the server.
    fn open(&mut self, config: &SessionConfig) -> Result<()>;

    /// Release the client. Must tolerate being called after a failed or
    /// partial `open`.
    fn close(&mut self);

    /// Timestamp resolution in microseconds, unvalidated
    fn timestamp_tick(&self) -> i32;

    /// Continuous channel sampling rate in Hz, non-positive if unknown
    fn slow_sample_rate(&self) -> i32;

    fn is_sort_client_running(&self) -> bool;

    fn is_long_wave_mode(&self) -> bool;

    /// Fill `slots` with the events queued since the last drain. Returns
    /// how many leading slots are valid; the rest keep stale contents.
    fn drain(&mut self, slots: &mut [EventRecord]) -> Result<(usize, DrainStats)>;
}

/// Auxiliary counters reported with each drain
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DrainStats {
    pub server_dropped: i32,
    pub mmf_dropped: i32,
    pub poll_high: i32,
    pub poll_low: i32,
}

impl DrainStats {
    /// True if the server or the memory-mapped transport lost data
    pub fn dropped(&self) -> bool {
        self.server_dropped != 0 || self.mmf_dropped != 0
    }

    /// Polling time as one 64-bit counter
    pub fn poll_time(&self) -> u64 {
        ((self.poll_high as u32 as u64) << 32) | self.poll_low as u32 as u64
    }
}
