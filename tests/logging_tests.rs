//! Tests for the diagnostic events emitted under the `comparable_sets` target.

use comparable_sets::prelude::*;
use rstest::rstest;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Default)]
struct CapturedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    fn contents(&self) -> String {
        String::from_utf8(self.buffer.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for CapturedOutput {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture<R>(filter: &str, action: impl FnOnce() -> R) -> (R, String) {
    let output = CapturedOutput::default();
    let writer = output.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, action);
    (result, output.contents())
}

#[rstest]
fn test_construction_reports_discarded_elements() {
    let (set, logs) = capture("comparable_sets=trace", || set_from([1, 1, 2, 2, 3], Intrinsic));

    assert_eq!(set.len(), 3);
    assert!(logs.contains("discarded equivalent elements during construction"));
    assert!(logs.contains("discarded=2"));
}

#[rstest]
fn test_unique_construction_is_silent() {
    let (_, logs) = capture("comparable_sets=trace", || set_from([1, 2, 3], Intrinsic));
    assert!(logs.is_empty());
}

#[rstest]
fn test_borrowed_construction_is_reported_at_debug() {
    let source = set_from([1, 2], Intrinsic);
    let (alias, logs) = capture("comparable_sets=debug", || {
        ComparableSet::from_set(&source, Construction::Borrow)
    });

    assert!(alias.shares_store_with(&source));
    assert!(logs.contains("sharing backing store between set handles"));
}

#[rstest]
fn test_filter_level_hides_trace_events() {
    let (_, logs) = capture("comparable_sets=info", || set_from([1, 1], Intrinsic).materialize());
    assert!(logs.is_empty());
}
