//! Serialization of bucketed samples and raw events to `.tsv`

use crate::bucket::ChannelBucketMap;
use crate::EventRecord;
use anyhow::Result;
use std::io::Write;

/// Write every sample as tab-separated values (channel, seconds, value),
/// channel by channel, each channel in chronological order.
pub fn points_tsv(
    wtr: &mut csv::Writer<impl Write>,
    map: &ChannelBucketMap,
    map_sample_rate: u32,
) -> Result<()> {
    for channel in map.channels() {
        for (secs, value) in map.points(channel, map_sample_rate) {
            wtr.write_record(&[channel.to_string(), secs.to_string(), value.to_string()])?;
        }
    }
    Ok(())
}

/// Write the events of one drain as tab-separated values
/// (poll, type, channel, timestamp, samples...), readable by
/// [`de::records_tsv`](crate::de::records_tsv). An empty drain is written
/// as a row holding only the poll index. The writer must be built with
/// `flexible(true)`, since rows differ in length.
pub fn records_tsv(
    wtr: &mut csv::Writer<impl Write>,
    poll: usize,
    records: &[EventRecord],
) -> Result<()> {
    if records.is_empty() {
        wtr.write_record(&[poll.to_string()])?;
        return Ok(());
    }
    for r in records {
        let mut row = vec![
            poll.to_string(),
            r.kind.to_string(),
            r.channel.to_string(),
            r.timestamp.to_string(),
        ];
        row.extend(r.samples().iter().map(|s| s.to_string()));
        wtr.write_record(&row)?;
    }
    Ok(())
}
