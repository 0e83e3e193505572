#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use maptools::{AcquisitionLibrary, DrainStats, Error, EventRecord, Result, SessionConfig};

/// What one drain writes into the caller's slots
pub struct FakeDrain {
    pub records: Vec<EventRecord>,
    /// Count reported to the caller, may differ from `records.len()`
    pub count: usize,
    pub stats: DrainStats,
}

impl FakeDrain {
    pub fn new(records: Vec<EventRecord>) -> Self {
        let count = records.len();
        FakeDrain { records, count, stats: DrainStats::default() }
    }
}

/// Scriptable stand-in for the vendor library
pub struct FakeLibrary {
    pub tick: i32,
    pub slow_rate: i32,
    pub open_error: Option<Error>,
    pub drains: VecDeque<FakeDrain>,
    /// Written into every slot past the written records
    pub stale: EventRecord,
    pub opens: Rc<Cell<usize>>,
    pub closes: Rc<Cell<usize>>,
}

impl FakeLibrary {
    pub fn new(drains: Vec<FakeDrain>) -> Self {
        FakeLibrary {
            tick: 25,
            slow_rate: 0,
            open_error: None,
            drains: drains.into(),
            stale: EventRecord::default(),
            opens: Rc::new(Cell::new(0)),
            closes: Rc::new(Cell::new(0)),
        }
    }
}

impl AcquisitionLibrary for FakeLibrary {
    fn open(&mut self, _config: &SessionConfig) -> Result<()> {
        self.opens.set(self.opens.get() + 1);
        match self.open_error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
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
        let d = self
            .drains
            .pop_front()
            .unwrap_or_else(|| FakeDrain::new(Vec::new()));
        let n = d.records.len().min(slots.len());
        slots[..n].copy_from_slice(&d.records[..n]);
        for slot in slots[n..].iter_mut() {
            *slot = self.stale;
        }
        Ok((d.count, d.stats))
    }
}

pub fn rec(kind: u8, channel: u16, timestamp: u64, samples: &[i16]) -> EventRecord {
    EventRecord::new(kind, channel, timestamp, samples)
}

pub fn small_session_config(capacity: usize) -> SessionConfig {
    SessionConfig { capacity, ..Default::default() }
}
