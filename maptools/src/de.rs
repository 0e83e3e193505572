//! Deserialization of recorded events from `.tsv`

use crate::EventRecord;
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::io::Read;

/// Deserialize events from tab-separated values
/// (poll, type, channel, timestamp, samples...), grouped into one batch
/// per poll index in ascending order. A row holding only a poll index
/// stands for an empty drain and yields an empty batch. The reader must be
/// built with `flexible(true)`.
pub fn records_tsv(rdr: &mut csv::Reader<impl Read>) -> Result<Vec<Vec<EventRecord>>> {
    let mut polls: BTreeMap<usize, Vec<EventRecord>> = BTreeMap::new();
    for result in rdr.records() {
        let record = result?;
        if record.len() == 1 {
            polls.entry(record[0].parse::<usize>()?).or_default();
            continue;
        }
        if record.len() < 4 {
            bail!("short event row: {:?}", record);
        }
        let samples = record
            .iter()
            .skip(4)
            .map(|s| s.parse::<i16>())
            .collect::<Result<Vec<_>, _>>()?;
        polls
            .entry(record[0].parse::<usize>()?)
            .or_default()
            .push(EventRecord::new(
                record[1].parse::<u8>()?,
                record[2].parse::<u16>()?,
                record[3].parse::<u64>()?,
                &samples,
            ));
    }
    Ok(polls.into_values().collect())
}
