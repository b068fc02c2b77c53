use std::{
    sync::{Arc, Barrier, mpsc::channel},
    thread,
    time::Duration,
};

use ntest::timeout;
use parking_lot::Mutex;
use pararun_pool::{Backoff, Delivery, FallbackEntry, FallbackSink, SharedLogWriter};

const THREADS: usize = 8;
const BATCHES: usize = 25;
const LINES: usize = 20;

fn body_of(line: &str) -> &str {
    line.rsplit(' ').next().unwrap_or_default()
}

#[test]
#[timeout(60000)]
fn concurrent_batches_are_never_interleaved() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(FallbackSink::new());
    let writer = Arc::new(SharedLogWriter::new(
        dir.path().join("shared.log"),
        Arc::new(Mutex::new(())),
        Arc::clone(&sink),
        3,
        Backoff::new(Duration::from_millis(2)),
    ));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let writer = Arc::clone(&writer);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut delayed = 0;
                for b in 0..BATCHES {
                    let lines: Vec<String> =
                        (0..LINES).map(|l| format!("t{t}-b{b}-l{l}")).collect();
                    if let Delivery::Delayed { .. } = writer.write_lines(&lines, &format!("w{t}")) {
                        delayed += LINES;
                    }
                }
                delayed
            })
        })
        .collect();
    let delayed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    let content = std::fs::read_to_string(writer.path()).unwrap_or_default();
    let written: Vec<&str> = content.lines().collect();
    assert_eq!(written.len() + delayed, THREADS * BATCHES * LINES);
    assert_eq!(sink.len(), delayed);

    // Each batch starts at a multiple of LINES and runs contiguously.
    for chunk in written.chunks(LINES) {
        let first = body_of(chunk[0]);
        let prefix = first.strip_suffix("-l0").expect("batch starts with line 0");
        for (l, line) in chunk.iter().enumerate() {
            assert_eq!(body_of(line), format!("{prefix}-l{l}"));
        }
    }
}

#[test]
#[timeout(10000)]
fn lock_held_by_other_thread_exhausts_exactly_lock_retry_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let lock = Arc::new(Mutex::new(()));
    let sink = Arc::new(FallbackSink::new());
    let writer = SharedLogWriter::new(
        dir.path().join("shared.log"),
        Arc::clone(&lock),
        Arc::clone(&sink),
        5,
        Backoff::new(Duration::from_millis(3)),
    );

    let (locked_tx, locked_rx) = channel();
    let (release_tx, release_rx) = channel::<()>();
    let holder = {
        let lock = Arc::clone(&lock);
        thread::spawn(move || {
            let _guard = lock.lock();
            locked_tx.send(()).unwrap();
            let _ = release_rx.recv();
        })
    };
    locked_rx.recv().unwrap();

    let delivery = writer.write_lines(&["one", "two", "three"], "job");
    assert_eq!(delivery, Delivery::Delayed { failed_attempts: 5 });

    release_tx.send(()).unwrap();
    holder.join().unwrap();

    let entries = sink.drain_all();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|entry| matches!(
        entry,
        FallbackEntry::Delayed(line) if line.contains(" [job]* ")
    )));

    // The lock is free again, so the next batch goes straight to the file.
    assert_eq!(
        writer.write_lines(&["four"], "job"),
        Delivery::Written { failed_attempts: 0 }
    );
}
