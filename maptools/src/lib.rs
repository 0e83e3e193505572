pub mod bucket;
pub mod cfg;
pub mod de;
pub mod error;
pub mod library;
pub mod replay;
pub mod ser;
pub mod session;
pub mod tick;

pub use bucket::{bucket_records, BucketConfig, Bucketer, ChannelBucket, ChannelBucketMap};
pub use error::{Error, Result};
pub use library::{AcquisitionLibrary, DrainStats};
pub use session::{Drain, Session, SessionConfig};
pub use tick::Tick;

/// Samples held by one long waveform event
pub const MAX_WF_LENGTH_LONG: usize = 120;
/// Default number of event slots read from the server at once
pub const MAX_MAP_EVENTS_PER_READ: usize = 8000;
/// `Type` tag of continuous A/D data blocks
pub const AD_DATA_TYPE: u8 = 5;
/// Continuous A/D channels on the MAP server
pub const AD_CHANNELS: [u16; 10] = [64, 65, 66, 67, 68, 69, 70, 71, 72, 73];

/// One MAP event as read from the server
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct EventRecord {
    /// Event type tag, e.g. [`AD_DATA_TYPE`]
    pub kind: u8,
    /// Channel the event was recorded on
    pub channel: u16,
    /// Timestamp in server ticks
    pub timestamp: u64,
    /// Sample payload; only the first `data_words` entries are valid
    pub waveform: [i16; MAX_WF_LENGTH_LONG],
    pub data_words: u16,
}

impl EventRecord {
    /// Build a record from a sample slice, truncating past [`MAX_WF_LENGTH_LONG`].
    pub fn new(kind: u8, channel: u16, timestamp: u64, samples: &[i16]) -> Self {
        let n = samples.len().min(MAX_WF_LENGTH_LONG);
        let mut waveform = [0; MAX_WF_LENGTH_LONG];
        waveform[..n].copy_from_slice(&samples[..n]);
        EventRecord {
            kind,
            channel,
            timestamp,
            waveform,
            data_words: n as u16,
        }
    }

    /// Valid samples of the waveform
    pub fn samples(&self) -> &[i16] {
        &self.waveform[..(self.data_words as usize).min(MAX_WF_LENGTH_LONG)]
    }
}

impl Default for EventRecord {
    fn default() -> Self {
        EventRecord {
            kind: 0,
            channel: 0,
            timestamp: 0,
            waveform: [0; MAX_WF_LENGTH_LONG],
            data_words: 0,
        }
    }
}
