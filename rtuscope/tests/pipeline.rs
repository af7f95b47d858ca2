//! End-to-end pipeline: scripted session -> poll worker -> notification
//! channel -> frontend log and chart series.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use rtuscope::history::{EntryKind, ReadingLog};
use rtuscope::series::ChartSeries;
use rtuscope_common::PollEvent;
use rtuscope_poller::{ConnectError, PollPlan, PollWorker, ReadError, RegisterSession};

struct ScriptedSession {
    script: Arc<Mutex<VecDeque<Result<Vec<u16>, ReadError>>>>,
}

#[async_trait]
impl RegisterSession for ScriptedSession {
    async fn open(&mut self) -> Result<(), ConnectError> {
        Ok(())
    }

    async fn read_registers(&mut self, _start: u16, quantity: u16) -> Result<Vec<u16>, ReadError> {
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        Ok((0..quantity).collect())
    }

    async fn close(&mut self) {}
}

fn scripted_worker(
    quantity: u16,
    script: Vec<Result<Vec<u16>, ReadError>>,
) -> PollWorker<ScriptedSession> {
    let plan = PollPlan {
        start_address: 301,
        quantity,
        interval: Duration::from_millis(5),
    };
    let script = Arc::new(Mutex::new(VecDeque::from(script)));
    PollWorker::with_sessions(plan, move || ScriptedSession {
        script: script.clone(),
    })
}

#[tokio::test]
async fn readings_and_errors_reach_the_log_in_cycle_order() {
    let script = vec![
        Ok(vec![10, 20, 30]),
        Err(ReadError::ShortRead {
            expected: 3,
            actual: 1,
        }),
        Ok(vec![40, 50, 60]),
    ];
    let mut worker = scripted_worker(3, script);

    let mut events = worker.start().expect("first start must be accepted");
    let mut log = ReadingLog::new();
    let mut series = ChartSeries::new(3);

    for _ in 0..3 {
        let event = events.recv().await.expect("worker is still running");
        if let PollEvent::DataReceived(text) = &event {
            series.append_line(text);
        }
        log.push(&event);
    }

    worker.stop().await;

    let kinds: Vec<EntryKind> = log.entries().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EntryKind::Reading, EntryKind::Error, EntryKind::Reading]
    );
    assert_eq!(log.entries()[0].text, "10 20 30");
    assert!(!log.entries()[1].text.is_empty());

    // only the two successful cycles were charted
    assert_eq!(series.points(), &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
}

#[tokio::test]
async fn channel_closes_after_stop_and_log_stops_growing() {
    let mut worker = scripted_worker(2, vec![]);

    let mut events = worker.start().unwrap();
    let mut log = ReadingLog::new();

    let event = events.recv().await.unwrap();
    log.push(&event);

    worker.stop().await;

    // drain buffered events; the channel must then report closed
    while let Some(event) = events.recv().await {
        log.push(&event);
    }
    let final_len = log.len();

    assert!(events.recv().await.is_none());
    assert_eq!(log.len(), final_len);
    assert_eq!(log.error_count(), 0);
}
