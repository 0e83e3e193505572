//! Timestamp tick calibration

use crate::error::Error;

/// Timestamp resolution of the MAP server.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Tick {
    /// 25 us, 40 kHz (server default)
    Us25,
    /// 40 us, 25 kHz
    Us40,
    /// 50 us, 20 kHz
    Us50,
}

impl Tick {
    pub fn micros(self) -> u32 {
        match self {
            Tick::Us25 => 25,
            Tick::Us40 => 40,
            Tick::Us50 => 50,
        }
    }

    /// Samples per second of the MAP (spike timestamp) channels
    pub fn map_sample_rate(self) -> u32 {
        1000 / self.micros() * 1000
    }

    /// Ticks between consecutive samples of a continuous channel sampled
    /// at `slow_rate` Hz. The ratio is an integer on real hardware; an
    /// unknown (non-positive) rate falls back to one tick.
    pub fn ticks_per_sample(self, slow_rate: i32) -> u64 {
        if slow_rate <= 0 {
            return 1;
        }
        (self.map_sample_rate() as u64 / slow_rate as u64).max(1)
    }
}

impl TryFrom<i32> for Tick {
    type Error = Error;

    fn try_from(tick: i32) -> Result<Self, Self::Error> {
        match tick {
            25 => Ok(Tick::Us25),
            40 => Ok(Tick::Us40),
            50 => Ok(Tick::Us50),
            _ => Err(Error::Calibration { tick }),
        }
    }
}
