//! Criterion benchmarks for the session aggregator

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use chrono::NaiveDate;
use studiopulse::services::{Aggregator, SessionFilter};
use studiopulse::types::{GroupBy, Metric, SessionRecord};

const FORMATS: [&str; 8] = [
    "Yoga",
    "Barre",
    "Cycle",
    "Mat Pilates",
    "Reformer",
    "HIIT",
    "Strength",
    "Recovery",
];
const TRAINERS: [&str; 6] = ["Anisha", "Rohan", "Mira", "Kabir", "Tara", "Dev"];

/// Deterministic synthetic dataset spanning several months
fn make_records(count: usize) -> Vec<SessionRecord> {
    (0..count)
        .map(|i| {
            let day = (i % 28) as u32 + 1;
            let month = (i / 28 % 12) as u32 + 1;
            SessionRecord {
                date: NaiveDate::from_ymd_opt(2024, month, day).unwrap(),
                cleaned_class: Some(FORMATS[i % FORMATS.len()].to_string()),
                class_type: None,
                trainer_name: Some(TRAINERS[i % TRAINERS.len()].to_string()),
                location: Some("Supreme HQ, Bandra".to_string()),
                checked_in_count: (i % 21) as u32,
                capacity: 20,
                total_paid: (i % 30) as f64 * 50.0,
                booked_count: (i % 24) as u32,
                late_cancelled_count: (i % 4) as u32,
                new_client_count: (i % 5) as u32,
                time: None,
                day_of_week: None,
            }
        })
        .collect()
}

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregator");

    for &size in &[1_000usize, 10_000, 50_000] {
        let records = make_records(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(
            BenchmarkId::new("compare_by_format", size),
            &records,
            |b, records| {
                b.iter(|| {
                    Aggregator::compare(
                        black_box(records),
                        GroupBy::ClassFormat,
                        Metric::Attendance,
                    )
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("compare_by_format_and_trainer", size),
            &records,
            |b, records| {
                b.iter(|| {
                    Aggregator::compare(
                        black_box(records),
                        GroupBy::FormatAndTrainer,
                        Metric::FillRate,
                    )
                });
            },
        );
    }

    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let records = make_records(50_000);
    let filter = SessionFilter {
        location: Some("bandra".to_string()),
        class_formats: vec!["Yoga".to_string(), "Barre".to_string()],
        ..SessionFilter::default()
    };

    c.bench_function("filter_50k", |b| {
        b.iter(|| filter.apply(black_box(&records)));
    });
}

criterion_group!(benches, bench_compare, bench_filter);
criterion_main!(benches);
