//! Performance benchmarks for classification and dispatch.

use alert_dispatch::{
    classify_all, AlertRule, ChannelPublisher, Device, Dispatcher, DispatcherConfig, Image,
    MemoryDirectory, StreamRecord,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

const ACCOUNT: &str = "acct1";
const DEVICES: usize = 50;

fn motion_record(i: usize) -> StreamRecord {
    let device = format!("dev{}", i % DEVICES);
    StreamRecord::insert(
        Image::new()
            .with_string("PK", format!("MotionVideos:{ACCOUNT}:{device}"))
            .with_string("thingName", device)
            .with_string("trigger", if i % 4 == 0 { "none" } else { "motion" })
            .with_number("duration", 10)
            .with_string("motionVideo", format!("clip{i}.mp4"))
            .with_number("updateTime", 1_700_000_000 + i as i64),
    )
}

fn directory() -> MemoryDirectory {
    let directory = MemoryDirectory::new();
    for i in 0..DEVICES {
        directory.put_device(ACCOUNT, Device::new(format!("dev{i}"), format!("Camera {i}")));
        directory.add_membership(ACCOUNT, &format!("dev{i}"), "all");
    }
    directory
}

/// Benchmark running the full rule table against one record
fn bench_classify(c: &mut Criterion) {
    let records: Vec<StreamRecord> = (0..100).map(motion_record).collect();

    c.bench_function("classify_all", |b| {
        b.iter(|| {
            for record in &records {
                black_box(classify_all(&AlertRule::ALL, record, ACCOUNT));
            }
        });
    });
}

/// Benchmark batch dispatch with varying worker counts
fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_batch");
    let records: Vec<StreamRecord> = (0..500).map(motion_record).collect();

    for workers in [1, 2, 4, 8] {
        group.bench_with_input(BenchmarkId::new("workers", workers), &workers, |b, &workers| {
            let (publisher, feed) = ChannelPublisher::with_buffer_size(records.len());
            let dispatcher = Dispatcher::new(
                DispatcherConfig::new(ACCOUNT, "https://cams.example.com").with_workers(workers),
                Arc::new(directory()),
                Arc::new(publisher),
            )
            .unwrap();

            b.iter(|| {
                black_box(dispatcher.dispatch_batch(&records));
                feed.drain();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classify, bench_dispatch);
criterion_main!(benches);
