//! Replaying recorded events in place of a live server

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::library::{AcquisitionLibrary, DrainStats};
use crate::session::SessionConfig;
use crate::EventRecord;

/// An [`AcquisitionLibrary`] that serves prerecorded batches, one per
/// drain, then empty drains once they run out.
///
/// A batch larger than the caller's buffer is cut to fit and the cut is
/// reported through `server_dropped`, as the server does when a client
/// falls behind.
#[derive(Debug, Clone)]
pub struct ReplayLibrary {
    batches: VecDeque<Vec<EventRecord>>,
    tick: i32,
    slow_rate: i32,
    polls: u64,
    open: bool,
}

impl ReplayLibrary {
    /// Replay at the server's default 25 us tick with an unknown slow rate.
    pub fn new(batches: Vec<Vec<EventRecord>>) -> Self {
        ReplayLibrary {
            batches: batches.into(),
            tick: 25,
            slow_rate: 0,
            polls: 0,
            open: false,
        }
    }

    pub fn with_tick(self, tick: i32) -> Self {
        ReplayLibrary { tick, ..self }
    }

    pub fn with_slow_rate(self, slow_rate: i32) -> Self {
        ReplayLibrary { slow_rate, ..self }
    }

    /// Batches not yet drained
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.batches.is_empty()
    }
}

impl AcquisitionLibrary for ReplayLibrary {
    fn open(&mut self, _config: &SessionConfig) -> Result<()> {
        if self.open {
            return Err(Error::Init(String::from("replay already open")));
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn timestamp_tick(&self) -> i32 {
        self.tick
    }

    fn slow_sample_rate(&self) -> i32 {
        self.slow_rate
    }

    fn is_sort_client_running(&self) -> bool {
        true
    }

    fn is_long_wave_mode(&self) -> bool {
        true
    }

    fn drain(&mut self, slots: &mut [EventRecord]) -> Result<(usize, DrainStats)> {
        self.polls += 1;
        let mut stats = DrainStats {
            poll_high: (self.polls >> 32) as i32,
            poll_low: self.polls as u32 as i32,
            ..Default::default()
        };
        let batch = match self.batches.pop_front() {
            Some(b) => b,
            None => return Ok((0, stats)),
        };
        let n = batch.len().min(slots.len());
        slots[..n].copy_from_slice(&batch[..n]);
        stats.server_dropped = (batch.len() - n) as i32;
        Ok((n, stats))
    }
}
