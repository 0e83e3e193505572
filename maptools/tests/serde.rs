use maptools::replay::ReplayLibrary;
use maptools::{bucket_records, de, ser, BucketConfig, Bucketer, Session, SessionConfig};

mod common;
use common::rec;

fn tsv_reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(data)
}

fn tsv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true)
        .from_writer(Vec::new())
}

#[test]
fn de_records_groups_by_poll() {
    let data = b"0\t5\t64\t10\t1\t2\n1\t5\t64\t20\n0\t9\t64\t5\t-3\n";
    let batches = de::records_tsv(&mut tsv_reader(data)).unwrap();
    assert_eq!(
        batches,
        vec![
            vec![rec(5, 64, 10, &[1, 2]), rec(9, 64, 5, &[-3])],
            vec![rec(5, 64, 20, &[])],
        ]
    );
}

#[test]
fn de_records_rejects_short_rows() {
    assert!(de::records_tsv(&mut tsv_reader(b"0\t5\t64\n")).is_err());
    assert!(de::records_tsv(&mut tsv_reader(b"x\n")).is_err());
    assert!(de::records_tsv(&mut tsv_reader(b"0\t5\t64\tx\n")).is_err());
}

#[test]
fn recorded_events_read_back() {
    let batch = vec![rec(5, 64, 10, &[1, 2]), rec(5, 65, 11, &[-7])];
    let mut wtr = tsv_writer();
    ser::records_tsv(&mut wtr, 3, &batch).unwrap();
    let bytes = wtr.into_inner().unwrap();
    assert_eq!(de::records_tsv(&mut tsv_reader(&bytes)).unwrap(), vec![batch]);
}

#[test]
fn empty_polls_survive_recording() {
    let polls = vec![
        vec![rec(5, 64, 10, &[1])],
        vec![],
        vec![rec(5, 64, 30, &[3])],
        vec![],
    ];
    let mut wtr = tsv_writer();
    for (i, batch) in polls.iter().enumerate() {
        ser::records_tsv(&mut wtr, i, batch).unwrap();
    }
    let bytes = wtr.into_inner().unwrap();
    assert_eq!(de::records_tsv(&mut tsv_reader(&bytes)).unwrap(), polls);
}

#[test]
fn points_in_seconds() {
    let batch = vec![rec(5, 64, 40_000, &[3]), rec(5, 64, 20_000, &[1, 2])];
    let map = bucket_records(&batch, &BucketConfig::default(), 40).unwrap();
    let mut wtr = tsv_writer();
    ser::points_tsv(&mut wtr, &map, 40_000).unwrap();
    let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!(out, "64\t0.5\t1\n64\t0.501\t2\n64\t1\t3\n");
}

#[test]
fn replay_through_session() {
    let data = b"0\t5\t64\t10\t1\t2\n0\t5\t64\t5\t3\t4\n0\t9\t64\t1\t9\n";
    let batches = de::records_tsv(&mut tsv_reader(data)).unwrap();
    let lib = ReplayLibrary::new(batches).with_tick(40);
    let mut session = Session::open(lib, &SessionConfig::default()).unwrap();
    assert_eq!(session.map_sample_rate(), 25_000);
    let mut bucketer = Bucketer::new(BucketConfig::default()).unwrap();
    assert_eq!(bucketer.bucket(&mut session).unwrap().samples(64), &[3, 4, 1, 2]);
    assert!(session.library().is_exhausted());
    assert!(bucketer.bucket(&mut session).unwrap().is_empty());
}
