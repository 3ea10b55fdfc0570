//! This bench test simulates a busy stores office: appending to, and toggling
//! the status of, records in a log that already holds a few hundred entries.

#![allow(missing_docs)]

use chrono::Local;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use non_empty_string::NonEmptyString;
use nonempty::NonEmpty;
use requisition::{Item, Requisition, RequisitionStore};
use tempfile::TempDir;

fn requisition(i: usize) -> Requisition {
    Requisition::new(
        NonEmptyString::new(format!("Requester {i}")).unwrap(),
        "Stores".to_string(),
        NonEmpty::from((
            Item::new("Gloves", i.to_string()),
            vec![Item::new("Boots", "1"), Item::new("Tape", "3")],
        )),
        &Local::now(),
    )
}

/// Fills a log with `count` requisitions
fn preseed_store(count: usize) -> (TempDir, RequisitionStore) {
    let tmp_dir = TempDir::new().unwrap();
    let store = RequisitionStore::new(tmp_dir.path().join("log_data.xml"));
    for i in 0..count {
        store.append(&requisition(i)).unwrap();
    }
    (tmp_dir, store)
}

fn append(c: &mut Criterion) {
    c.bench_function("append to 500 records", |b| {
        b.iter_batched(
            || preseed_store(500),
            |(_tmp_dir, store)| {
                store.append(&requisition(500)).unwrap();
            },
            BatchSize::LargeInput,
        );
    });
}

fn load_and_toggle(c: &mut Criterion) {
    let (_tmp_dir, store) = preseed_store(500);

    c.bench_function("load and toggle in 500 records", |b| {
        b.iter(|| {
            let mut last = store.load().pop().unwrap();
            last.toggle_status();
            store.update_status(&last).unwrap();
        });
    });
}

criterion_group!(benches, append, load_and_toggle);
criterion_main!(benches);
