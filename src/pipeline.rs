use crate::app::ports::{BrowserSession, EventSink, SessionLauncher};
use crate::prober::{InactiveReason, ProbeOutcome, Prober};
use crate::types::PremintEvent;
use metrics::{counter, histogram};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};

/// What happened to one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventResult {
    Saved,
    SaveFailed,
    Inactive,
    Failed,
}

#[derive(Debug, Default)]
struct Tally {
    saved: AtomicUsize,
    save_failed: AtomicUsize,
    inactive: AtomicUsize,
    failed: AtomicUsize,
}

impl Tally {
    fn add(&self, result: EventResult) {
        let slot = match result {
            EventResult::Saved => &self.saved,
            EventResult::SaveFailed => &self.save_failed,
            EventResult::Inactive => &self.inactive,
            EventResult::Failed => &self.failed,
        };
        slot.fetch_add(1, Ordering::Relaxed);
    }
}

/// Fans events out over a fixed pool of workers. Each worker pulls the next
/// event from a shared queue, probes it in a fresh browser session and hands
/// active events to the sink. One event failing never affects the others.
pub struct Coordinator<L, S> {
    launcher: Arc<L>,
    sink: Arc<S>,
    prober: Arc<Prober>,
}

impl<L: SessionLauncher, S: EventSink> Coordinator<L, S> {
    pub fn new(launcher: Arc<L>, sink: Arc<S>, prober: Prober) -> Self {
        Self {
            launcher,
            sink,
            prober: Arc::new(prober),
        }
    }

    /// Returns once every event has been evaluated.
    pub async fn run(&self, events: Vec<PremintEvent>, worker_count: usize) {
        let total = events.len();
        let worker_count = worker_count.clamp(1, total.max(1));
        info!("Scraping {} events with {} workers", total, worker_count);

        let queue = Arc::new(Mutex::new(VecDeque::from(events)));
        let tally = Arc::new(Tally::default());
        let mut workers = JoinSet::new();

        for worker_id in 0..worker_count {
            let queue = Arc::clone(&queue);
            let tally = Arc::clone(&tally);
            let launcher = Arc::clone(&self.launcher);
            let sink = Arc::clone(&self.sink);
            let prober = Arc::clone(&self.prober);

            workers.spawn(
                async move {
                    loop {
                        let next = queue.lock().await.pop_front();
                        let Some(event) = next else { break };
                        let result = evaluate(&*launcher, &prober, &*sink, event).await;
                        tally.add(result);
                    }
                }
                .instrument(info_span!("worker", id = worker_id)),
            );
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Worker task ended abnormally: {}", e);
            }
        }

        info!(
            total,
            saved = tally.saved.load(Ordering::Relaxed),
            save_failed = tally.save_failed.load(Ordering::Relaxed),
            inactive = tally.inactive.load(Ordering::Relaxed),
            failed = tally.failed.load(Ordering::Relaxed),
            "Scrape run finished"
        );
    }
}

async fn evaluate<L: SessionLauncher, S: EventSink>(
    launcher: &L,
    prober: &Prober,
    sink: &S,
    mut event: PremintEvent,
) -> EventResult {
    let started = std::time::Instant::now();
    let outcome = match launcher.launch().await {
        Ok(mut session) => {
            let outcome = prober.probe(&mut session, &mut event).await;
            if let Err(e) = session.close().await {
                warn!(link = %event.link(), "Failed to close browser session: {}", e);
            }
            outcome
        }
        Err(e) => {
            event.mark_inactive();
            ProbeOutcome::Inactive(InactiveReason::Session(e.to_string()))
        }
    };
    histogram!("premint_probe_duration_seconds").record(started.elapsed().as_secs_f64());

    match outcome {
        ProbeOutcome::Inactive(reason) => {
            counter!("premint_probes_total", "outcome" => reason_label(&reason)).increment(1);
            info!(link = %event.link(), "Skipping inactive event: {}", reason);
            EventResult::Inactive
        }
        ProbeOutcome::Failed(reason) => {
            counter!("premint_probes_total", "outcome" => reason_label(&reason)).increment(1);
            warn!(link = %event.link(), "Open event could not be read, not saving: {}", reason);
            EventResult::Failed
        }
        ProbeOutcome::Active => {
            counter!("premint_probes_total", "outcome" => "active").increment(1);
            match sink.record(&event).await {
                Ok(()) => {
                    info!(link = %event.link(), "Saved data about active premint event");
                    EventResult::Saved
                }
                Err(e) => {
                    counter!("premint_sink_errors_total").increment(1);
                    error!(link = %event.link(), "Failed to save active premint event: {}", e);
                    EventResult::SaveFailed
                }
            }
        }
    }
}

fn reason_label(reason: &InactiveReason) -> &'static str {
    match reason {
        InactiveReason::HeadingTimeout => "timeout",
        InactiveReason::NotOpen(_) => "closed",
        InactiveReason::RequirementsTimeout => "requirements_timeout",
        InactiveReason::Session(_) => "session_error",
    }
}
