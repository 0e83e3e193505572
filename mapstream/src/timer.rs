use anyhow::Result;
use std::time::{Duration, Instant};

use crate::Event;

/// Send a tick every `period`, at most `limit` of them, until the
/// receiver goes away. The sender is dropped when the ticks run out, which
/// ends the controller loop.
pub fn main(period: Duration, limit: Option<u64>, tx: flume::Sender<Event>) -> Result<()> {
    let _ = std::thread::spawn(move || {
        let mut sent = 0u64;
        let mut next = Instant::now() + period;
        while limit.map_or(true, |n| sent < n) {
            std::thread::sleep(next.saturating_duration_since(Instant::now()));
            if tx.send(Event::Tick).is_err() {
                break;
            }
            sent += 1;
            // Late ticks are not made up for
            next = (next + period).max(Instant::now());
        }
    });
    Ok(())
}
