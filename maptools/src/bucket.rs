//! Sorting drained events into per-channel sample buckets

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::library::AcquisitionLibrary;
use crate::session::{Drain, Session};
use crate::{EventRecord, AD_CHANNELS, AD_DATA_TYPE};

/// Which events are bucketed, and how.
///
/// Every channel in `channels` gets a bucket, but only the `processed`
/// channels are filled.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct BucketConfig {
    /// Known channel set; one bucket each
    pub channels: Vec<u16>,
    /// Channels whose samples are collected, a subset of `channels`
    pub processed: Vec<u16>,
    /// Event `Type` carrying waveform data
    pub waveform_type: u8,
    /// Keep appending to the same buckets across drains
    pub accumulate: bool,
}

impl Default for BucketConfig {
    fn default() -> Self {
        BucketConfig {
            channels: AD_CHANNELS.to_vec(),
            processed: vec![AD_CHANNELS[0]],
            waveform_type: AD_DATA_TYPE,
            accumulate: false,
        }
    }
}

impl BucketConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(ch) = self.processed.iter().find(|ch| !self.channels.contains(ch)) {
            return Err(Error::Config(format!(
                "processed channel {} is not in the channel set",
                ch
            )));
        }
        Ok(())
    }
}

/// Samples of one channel, each with its time in server ticks
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelBucket {
    pub values: Vec<i16>,
    pub ticks: Vec<u64>,
}

impl ChannelBucket {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn push_record(&mut self, record: &EventRecord, ticks_per_sample: u64) {
        let samples = record.samples();
        self.values.extend_from_slice(samples);
        self.ticks.extend(
            (0..samples.len() as u64).map(|i| record.timestamp + i * ticks_per_sample),
        );
    }

    fn append(&mut self, other: &mut ChannelBucket) {
        self.values.append(&mut other.values);
        self.ticks.append(&mut other.ticks);
    }
}

/// Per-channel sample sequences, keyed by channel
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelBucketMap {
    buckets: BTreeMap<u16, ChannelBucket>,
}

impl ChannelBucketMap {
    /// One empty bucket per channel
    pub fn new(channels: &[u16]) -> Self {
        ChannelBucketMap {
            buckets: channels.iter().map(|&ch| (ch, ChannelBucket::default())).collect(),
        }
    }

    pub fn get(&self, channel: u16) -> Option<&ChannelBucket> {
        self.buckets.get(&channel)
    }

    /// Sample values of a channel; empty if the channel has no bucket
    pub fn samples(&self, channel: u16) -> &[i16] {
        self.buckets
            .get(&channel)
            .map(|b| b.values.as_slice())
            .unwrap_or(&[])
    }

    pub fn channels(&self) -> impl Iterator<Item = u16> + '_ {
        self.buckets.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &ChannelBucket)> {
        self.buckets.iter().map(|(&ch, b)| (ch, b))
    }

    /// Total samples over all channels
    pub fn len(&self) -> usize {
        self.buckets.values().map(ChannelBucket::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(seconds, value)` pairs of a channel in chronological order, with
    /// ticks converted at `map_sample_rate`.
    pub fn points(&self, channel: u16, map_sample_rate: u32) -> impl Iterator<Item = (f64, i16)> + '_ {
        let rate = map_sample_rate.max(1) as f64;
        self.buckets
            .get(&channel)
            .into_iter()
            .flat_map(move |b| {
                b.ticks
                    .iter()
                    .zip(b.values.iter())
                    .map(move |(&t, &v)| (t as f64 / rate, v))
            })
    }

    fn bucket_mut(&mut self, channel: u16) -> Option<&mut ChannelBucket> {
        self.buckets.get_mut(&channel)
    }

    fn append(&mut self, other: ChannelBucketMap) {
        for (ch, mut b) in other.buckets {
            self.buckets.entry(ch).or_default().append(&mut b);
        }
    }
}

/// Drains a session and sorts its waveform events into channel buckets.
pub struct Bucketer {
    config: BucketConfig,
    accumulated: Option<ChannelBucketMap>,
    cursors: HashMap<u16, u64>,
}

impl Bucketer {
    pub fn new(config: BucketConfig) -> Result<Self> {
        config.validate()?;
        Ok(Bucketer {
            config,
            accumulated: None,
            cursors: HashMap::new(),
        })
    }

    pub fn config(&self) -> &BucketConfig {
        &self.config
    }

    /// Drain `session` once and bucket the result.
    ///
    /// Returns the samples of this drain only. With accumulation they are
    /// also kept until [`Bucketer::take`], and timestamp order is enforced
    /// across drains.
    pub fn bucket<L: AcquisitionLibrary>(&mut self, session: &mut Session<L>) -> Result<ChannelBucketMap> {
        let ticks_per_sample = session.ticks_per_sample();
        let drain = session.drain()?;
        self.bucket_drain(&drain, ticks_per_sample)
    }

    /// Bucket an already drained batch, for callers that also need the
    /// raw records.
    pub fn bucket_drain(&mut self, drain: &Drain<'_>, ticks_per_sample: u64) -> Result<ChannelBucketMap> {
        if drain.stats.dropped() {
            warn!(
                server_dropped = drain.stats.server_dropped,
                mmf_dropped = drain.stats.mmf_dropped,
                "server reported dropped data"
            );
        }
        debug!(events = drain.records.len(), poll_time = drain.stats.poll_time(), "drained");

        if !self.config.accumulate {
            return bucket_records(drain.records, &self.config, ticks_per_sample);
        }

        // A failed drain must leave the accumulated state untouched
        let mut cursors = self.cursors.clone();
        let mut fresh = ChannelBucketMap::new(&self.config.channels);
        scan(&sorted(drain.records), &self.config, ticks_per_sample, &mut cursors, &mut fresh)?;
        self.cursors = cursors;
        self.accumulated
            .get_or_insert_with(|| ChannelBucketMap::new(&self.config.channels))
            .append(fresh.clone());
        Ok(fresh)
    }

    /// Hand back the accumulated buckets and start over with empty ones.
    /// Timestamp order is checked afresh from here on.
    pub fn take(&mut self) -> Option<ChannelBucketMap> {
        self.cursors.clear();
        self.accumulated.take()
    }
}

/// Sort `records` by timestamp and bucket their waveform samples.
///
/// `records` must be only the valid part of a drain.
pub fn bucket_records(
    records: &[EventRecord],
    config: &BucketConfig,
    ticks_per_sample: u64,
) -> Result<ChannelBucketMap> {
    let mut map = ChannelBucketMap::new(&config.channels);
    let mut cursors = HashMap::new();
    scan(&sorted(records), config, ticks_per_sample, &mut cursors, &mut map)?;
    Ok(map)
}

// Stable, so equal timestamps keep drain order
fn sorted(records: &[EventRecord]) -> Vec<&EventRecord> {
    records.iter().sorted_by_key(|r| r.timestamp).collect()
}

fn scan(
    records: &[&EventRecord],
    config: &BucketConfig,
    ticks_per_sample: u64,
    cursors: &mut HashMap<u16, u64>,
    map: &mut ChannelBucketMap,
) -> Result<()> {
    for record in records {
        if record.kind != config.waveform_type || !config.processed.contains(&record.channel) {
            continue;
        }
        let last = cursors.entry(record.channel).or_insert(0);
        if record.timestamp < *last {
            return Err(Error::OrderingViolation {
                channel: record.channel,
                previous: *last,
                timestamp: record.timestamp,
            });
        }
        *last = record.timestamp;
        if let Some(bucket) = map.bucket_mut(record.channel) {
            bucket.push_record(record, ticks_per_sample);
        }
    }
    Ok(())
}
