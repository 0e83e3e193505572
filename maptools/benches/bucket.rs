#[allow(unused_imports)]
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use maptools::{bucket_records, BucketConfig, EventRecord, AD_CHANNELS, MAX_MAP_EVENTS_PER_READ};

/// A full batch of A/D blocks spread over all channels, newest first
fn full_batch() -> Vec<EventRecord> {
    let samples: Vec<i16> = (0..100).collect();
    (0..MAX_MAP_EVENTS_PER_READ)
        .rev()
        .map(|i| {
            let ch = AD_CHANNELS[i % AD_CHANNELS.len()];
            EventRecord::new(5, ch, (i as u64) * 4000, &samples)
        })
        .collect()
}

fn one_channel(c: &mut Criterion) {
    let batch = full_batch();
    let config = BucketConfig::default();

    c.bench_function("bucket one channel", |b| { b.iter( || {
        bucket_records(black_box(&batch), &config, 40).unwrap();
    })});
}

fn all_channels(c: &mut Criterion) {
    let batch = full_batch();
    let config = BucketConfig {
        processed: AD_CHANNELS.to_vec(),
        ..Default::default()
    };

    c.bench_function("bucket all channels", |b| { b.iter( || {
        bucket_records(black_box(&batch), &config, 40).unwrap();
    })});
}

criterion_group!(benches, one_channel, all_channels);
criterion_main!(benches);
