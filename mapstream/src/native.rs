//! [`AcquisitionLibrary`] over the vendor's `PlexClient` library

use maptools::{AcquisitionLibrary, DrainStats, Error, EventRecord, Result, SessionConfig};
use plexclient::{ClientError, PL_WaveLong};

/// The live MAP Server, reached through `plexclient`.
///
/// Events are read into a `PL_WaveLong` buffer sized to the caller's batch
/// and then copied out, since `EventRecord` does not share the C layout.
#[derive(Default)]
pub struct NativeLibrary {
    waves: Vec<PL_WaveLong>,
}

impl NativeLibrary {
    pub fn new() -> Self {
        NativeLibrary::default()
    }
}

impl AcquisitionLibrary for NativeLibrary {
    fn open(&mut self, config: &SessionConfig) -> Result<()> {
        plexclient::init_client(config.client_type).map_err(|e| match e {
            ClientError::Unavailable => Error::LibraryUnavailable(e.to_string()),
            ClientError::Refused => Error::Init(e.to_string()),
        })
    }

    fn close(&mut self) {
        plexclient::close_client();
    }

    fn timestamp_tick(&self) -> i32 {
        plexclient::timestamp_tick()
    }

    fn slow_sample_rate(&self) -> i32 {
        plexclient::slow_sample_rate()
    }

    fn is_sort_client_running(&self) -> bool {
        plexclient::is_sort_client_running()
    }

    fn is_long_wave_mode(&self) -> bool {
        plexclient::is_long_wave_mode()
    }

    fn drain(&mut self, slots: &mut [EventRecord]) -> Result<(usize, DrainStats)> {
        if self.waves.len() != slots.len() {
            self.waves = vec![PL_WaveLong::default(); slots.len()];
        }
        let (count, c) = plexclient::get_long_wave_form_structures(&mut self.waves);
        let valid = count.min(self.waves.len());
        for (slot, wave) in slots.iter_mut().zip(&self.waves[..valid]) {
            *slot = to_record(wave);
        }
        let stats = DrainStats {
            server_dropped: c.server_dropped,
            mmf_dropped: c.mmf_dropped,
            poll_high: c.poll_high,
            poll_low: c.poll_low,
        };
        Ok((count, stats))
    }
}

fn to_record(wave: &PL_WaveLong) -> EventRecord {
    EventRecord::new(
        wave.Type as u8,
        wave.Channel as u16,
        wave.timestamp(),
        wave.samples(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_to_record() {
        let mut wave = PL_WaveLong {
            Type: plexclient::ffi::PL_ADDataType,
            Channel: 64,
            UpperTS: 1,
            TimeStamp: 10,
            NumberOfDataWords: 2,
            ..Default::default()
        };
        wave.WaveForm[..3].copy_from_slice(&[5, -6, 7]);
        let r = to_record(&wave);
        assert_eq!(r.kind, maptools::AD_DATA_TYPE);
        assert_eq!(r.channel, 64);
        assert_eq!(r.timestamp, (1 << 32) + 10);
        assert_eq!(r.samples(), &[5, -6]);
    }

    #[cfg(not(feature = "sdk"))]
    #[test]
    fn unlinked_library_is_unavailable() {
        let mut lib = NativeLibrary::new();
        assert!(matches!(
            lib.open(&SessionConfig::default()),
            Err(Error::LibraryUnavailable(_))
        ));
        assert!(matches!(
            maptools::Session::open_or_disabled(NativeLibrary::new(), &SessionConfig::default()),
            Ok(None)
        ));
    }
}
