use std::sync::{Arc, Mutex};

use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Item(usize),
    Yield,
    Other,
}

/// Records every yield into a shared event log instead of suspending.
#[derive(Clone)]
struct RecordingYield {
    log: Arc<Mutex<Vec<Event>>>,
}

impl YieldPoint for RecordingYield {
    async fn yield_now(&self) {
        self.log.lock().unwrap().push(Event::Yield);
    }
}

fn recording(batch_size: usize) -> (BatchDispatcher<RecordingYield>, Arc<Mutex<Vec<Event>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = BatchDispatcher::with_yield_point(
        batch_size,
        RecordingYield {
            log: Arc::clone(&log),
        },
    );
    (dispatcher, log)
}

#[tokio::test]
async fn worker_runs_once_per_item_with_yields_between_batches() {
    let (dispatcher, log) = recording(3);
    let items: Vec<usize> = (0..7).collect();

    let worker_log = Arc::clone(&log);
    let summary = dispatcher
        .process_all(&items, |i| {
            worker_log.lock().unwrap().push(Event::Item(*i));
            Ok::<_, String>(PinGroup::Open)
        })
        .await;

    assert_eq!(summary.open, 7);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            Event::Item(0),
            Event::Item(1),
            Event::Item(2),
            Event::Yield,
            Event::Item(3),
            Event::Item(4),
            Event::Item(5),
            Event::Yield,
            Event::Item(6),
        ]
    );
}

#[tokio::test]
async fn summary_equals_sum_of_item_results() {
    let (dispatcher, _log) = recording(2);
    let items = vec![
        PinGroup::Open,
        PinGroup::Storm,
        PinGroup::Closed,
        PinGroup::Open,
        PinGroup::Unknown,
    ];

    let summary = dispatcher
        .process_all(&items, |g| Ok::<_, String>(*g))
        .await;

    assert_eq!(
        summary,
        Summary {
            open: 2,
            closed: 1,
            storm: 1,
            unknown: 1,
            failed: 0,
        }
    );
    assert_eq!(summary.total(), items.len());
}

#[tokio::test]
async fn item_failure_is_counted_and_run_continues() {
    let (dispatcher, _log) = recording(2);
    let items: Vec<i32> = vec![1, -1, 2, -2, 3];

    let mut calls = 0;
    let summary = dispatcher
        .process_all(&items, |n| {
            calls += 1;
            if *n < 0 {
                Err(format!("bad item {n}"))
            } else {
                Ok(PinGroup::Closed)
            }
        })
        .await;

    assert_eq!(calls, 5);
    assert_eq!(summary.closed, 3);
    assert_eq!(summary.failed, 2);
}

#[tokio::test]
async fn zero_batch_size_is_clamped_to_one() {
    let (dispatcher, log) = recording(0);
    assert_eq!(dispatcher.batch_size(), 1);

    let summary = dispatcher
        .process_all(&[1, 2, 3], |_| Ok::<_, String>(PinGroup::Open))
        .await;

    assert_eq!(summary.open, 3);
    let yields = log.lock().unwrap().iter().filter(|e| **e == Event::Yield).count();
    assert_eq!(yields, 2);
}

#[tokio::test]
async fn empty_input_yields_empty_summary() {
    let (dispatcher, log) = recording(5);
    let items: Vec<u8> = Vec::new();
    let summary = dispatcher
        .process_all(&items, |_| Ok::<_, String>(PinGroup::Open))
        .await;
    assert_eq!(summary, Summary::default());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn tokio_yield_lets_other_tasks_run_between_batches() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let other_log = Arc::clone(&log);
    let other = tokio::spawn(async move {
        other_log.lock().unwrap().push(Event::Other);
    });

    let dispatcher = BatchDispatcher::new(2);
    let items: Vec<usize> = (0..6).collect();
    let worker_log = Arc::clone(&log);
    dispatcher
        .process_all(&items, |i| {
            worker_log.lock().unwrap().push(Event::Item(*i));
            Ok::<_, String>(PinGroup::Open)
        })
        .await;
    other.await.unwrap();

    let log = log.lock().unwrap();
    let other_at = log.iter().position(|e| *e == Event::Other).unwrap();
    assert!(
        other_at < items.len(),
        "spawned task should run before the last batch, log: {log:?}"
    );
}
