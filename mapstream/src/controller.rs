use anyhow::Result;
use maptools::cfg::StreamConfig;
use maptools::{ser, AcquisitionLibrary, Bucketer, Session};
use std::io::Write;
use tracing::{error, info};

use crate::Event;

fn tsv_writer<W: Write>(w: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(w)
}

/// Open a session on `library` and drain it once per tick, writing
/// bucketed samples to `out` and, optionally, raw events to `record`.
///
/// Runs until `polls` drains are done or the tick sender goes away, and
/// returns the number of drains. An unavailable library is not an error:
/// nothing is streamed and zero is returned.
pub fn main<L, O, R>(
    library: L,
    cfg: &StreamConfig,
    polls: Option<u64>,
    rx: flume::Receiver<Event>,
    out: O,
    record: Option<R>,
) -> Result<u64>
where
    L: AcquisitionLibrary,
    O: Write,
    R: Write,
{
    let mut session = match Session::open_or_disabled(library, &cfg.session)? {
        Some(session) => session,
        None => return Ok(0),
    };
    let mut bucketer = Bucketer::new(cfg.bucket.clone())?;
    let map_rate = session.map_sample_rate();
    let mut out = tsv_writer(out);
    let mut record = record.map(tsv_writer);

    let mut done = 0u64;
    while polls.map_or(true, |n| done < n) {
        match rx.recv() {
            Ok(Event::Tick) => {}
            Err(_) => break,
        }

        let ticks_per_sample = session.ticks_per_sample();
        let drain = session.drain()?;
        if let Some(wtr) = record.as_mut() {
            ser::records_tsv(wtr, done as usize, drain.records)?;
            wtr.flush()?;
        }
        let map = match bucketer.bucket_drain(&drain, ticks_per_sample) {
            Ok(map) => map,
            Err(e) => {
                // Dropping the session on the way out closes it
                error!(%e, poll = done, "bucketing failed");
                return Err(e.into());
            }
        };
        done += 1;

        if !cfg.bucket.accumulate {
            ser::points_tsv(&mut out, &map, map_rate)?;
            out.flush()?;
        }
    }

    if let Some(map) = bucketer.take() {
        ser::points_tsv(&mut out, &map, map_rate)?;
        out.flush()?;
    }
    session.close();
    info!(polls = done, "stream finished");
    Ok(done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use maptools::replay::ReplayLibrary;
    use maptools::{BucketConfig, EventRecord};

    fn ticks(n: usize) -> flume::Receiver<Event> {
        let (tx, rx) = flume::unbounded();
        for _ in 0..n {
            tx.send(Event::Tick).unwrap();
        }
        rx
    }

    fn batches() -> Vec<Vec<EventRecord>> {
        vec![
            vec![
                EventRecord::new(5, 64, 80, &[3]),
                EventRecord::new(5, 64, 40, &[1, 2]),
                EventRecord::new(9, 64, 0, &[9]),
            ],
            vec![EventRecord::new(5, 64, 120, &[4])],
        ]
    }

    #[test]
    fn streams_each_poll() {
        let mut out = Vec::new();
        let n = main(
            ReplayLibrary::new(batches()),
            &StreamConfig::default(),
            Some(2),
            ticks(5),
            &mut out,
            None::<Vec<u8>>,
        )
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "64\t0.001\t1\n64\t0.001025\t2\n64\t0.002\t3\n64\t0.003\t4\n"
        );
    }

    #[test]
    fn stops_when_ticks_end() {
        let mut out = Vec::new();
        let n = main(
            ReplayLibrary::new(batches()),
            &StreamConfig::default(),
            None,
            ticks(1),
            &mut out,
            None::<Vec<u8>>,
        )
        .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn accumulate_writes_once() {
        let mut cfg = StreamConfig::default();
        cfg.bucket = BucketConfig { accumulate: true, ..Default::default() };
        let mut out = Vec::new();
        let mut rec = Vec::new();
        main(
            ReplayLibrary::new(batches()),
            &cfg,
            Some(2),
            ticks(2),
            &mut out,
            Some(&mut rec),
        )
        .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 4);
        let rec = String::from_utf8(rec).unwrap();
        assert_eq!(rec.lines().count(), 4);
        assert!(rec.starts_with("0\t5\t64\t80\t3\n"));
    }

    #[test]
    fn ordering_violation_stops_stream() {
        let mut cfg = StreamConfig::default();
        cfg.bucket.accumulate = true;
        let replay = ReplayLibrary::new(vec![
            vec![EventRecord::new(5, 64, 100, &[1])],
            vec![EventRecord::new(5, 64, 50, &[2])],
        ]);
        let err = main(replay, &cfg, None, ticks(2), Vec::new(), None::<Vec<u8>>).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<maptools::Error>(),
            Some(maptools::Error::OrderingViolation { channel: 64, .. })
        ));
    }
}
