mod common;

use common::{probe_config, FakeLauncher, FakePage, RecordingSink};
use premint_scraper::sink::FileSink;
use premint_scraper::{CandidateLink, Coordinator, PremintEvent, Prober};
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::tempdir;

const OPEN_A: &str = "https://www.premint.xyz/open-a";
const OPEN_B: &str = "https://www.premint.xyz/open-b";
const ENDED: &str = "https://www.premint.xyz/ended";

fn events(links: &[&str]) -> Vec<PremintEvent> {
    links
        .iter()
        .map(|link| PremintEvent::new(CandidateLink::new(*link)))
        .collect()
}

fn two_open_one_ended() -> FakeLauncher {
    FakeLauncher::new([
        (OPEN_A, FakePage::open(r#"<a href="https://twitter.com/a">t</a>"#)),
        (OPEN_B, FakePage::open(r#"<a href="https://discord.gg/b">d</a>"#)),
        (ENDED, FakePage::with_status("Ended")),
    ])
}

#[tokio::test(start_paused = true)]
async fn test_single_worker_records_only_active_events() {
    let launcher = Arc::new(two_open_one_ended());
    let sink = Arc::new(RecordingSink::default());
    let coordinator = Coordinator::new(Arc::clone(&launcher), Arc::clone(&sink), Prober::new(&probe_config()));

    coordinator.run(events(&[OPEN_A, ENDED, OPEN_B]), 1).await;

    assert_eq!(sink.links(), vec![OPEN_A.to_string(), OPEN_B.to_string()]);
    assert_eq!(launcher.counters().launches.load(Ordering::SeqCst), 3);
    assert_eq!(launcher.counters().closes.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_timeouts_do_not_block_other_events() {
    let launcher = Arc::new(FakeLauncher::new([
        (OPEN_A, FakePage::open(r#"<a href="https://twitter.com/a">t</a>"#)),
        (ENDED, FakePage::never_renders()),
    ]));
    let sink = Arc::new(RecordingSink::default());
    let coordinator = Coordinator::new(Arc::clone(&launcher), Arc::clone(&sink), Prober::new(&probe_config()));

    coordinator.run(events(&[ENDED, OPEN_A]), 2).await;

    assert_eq!(sink.links(), vec![OPEN_A.to_string()]);
    // The timed-out session is still torn down.
    assert_eq!(launcher.counters().closes.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_open_event_without_requirements_is_not_recorded() {
    let mut no_requirements = FakePage::with_status("Register");
    no_requirements.requirements = None;
    let launcher = Arc::new(FakeLauncher::new([
        (OPEN_A, no_requirements),
        (OPEN_B, FakePage::open(r#"<a href="https://discord.gg/b">d</a>"#)),
    ]));
    let sink = Arc::new(RecordingSink::default());
    let coordinator = Coordinator::new(Arc::clone(&launcher), Arc::clone(&sink), Prober::new(&probe_config()));

    coordinator.run(events(&[OPEN_A, OPEN_B]), 1).await;

    assert_eq!(sink.links(), vec![OPEN_B.to_string()]);
    assert_eq!(launcher.counters().closes.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_launch_failure_only_affects_its_event() {
    let launcher = Arc::new(two_open_one_ended().fail_next_launches(1));
    let sink = Arc::new(RecordingSink::default());
    let coordinator = Coordinator::new(Arc::clone(&launcher), Arc::clone(&sink), Prober::new(&probe_config()));

    coordinator.run(events(&[OPEN_A, OPEN_B, ENDED]), 1).await;

    // With one worker the queue is drained in order, so the first event is the one lost.
    assert_eq!(sink.links(), vec![OPEN_B.to_string()]);
    assert_eq!(launcher.counters().launches.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_sink_failure_does_not_stop_the_run() {
    let launcher = Arc::new(two_open_one_ended());
    let sink = Arc::new(RecordingSink::failing_for(&[OPEN_A]));
    let coordinator = Coordinator::new(launcher, Arc::clone(&sink), Prober::new(&probe_config()));

    coordinator.run(events(&[OPEN_A, OPEN_B, ENDED]), 3).await;

    assert_eq!(sink.links(), vec![OPEN_A.to_string(), OPEN_B.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_more_workers_than_events_and_empty_runs() {
    let launcher = Arc::new(two_open_one_ended());
    let sink = Arc::new(RecordingSink::default());
    let coordinator = Coordinator::new(Arc::clone(&launcher), Arc::clone(&sink), Prober::new(&probe_config()));

    coordinator.run(Vec::new(), 4).await;
    assert!(sink.links().is_empty());

    coordinator.run(events(&[OPEN_A]), 16).await;
    assert_eq!(sink.links(), vec![OPEN_A.to_string()]);
    assert_eq!(launcher.counters().launches.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_sink_writes_never_mix_events() {
    let dir = tempdir().unwrap();
    let sink = Arc::new(FileSink::open(dir.path()).await.unwrap());

    let mut expected = HashSet::new();
    let mut writers = Vec::new();
    for i in 0..64 {
        let mut event = PremintEvent::new(CandidateLink::new(format!("https://www.premint.xyz/p{i}")));
        event.mark_active();
        for j in 0..20 {
            event.push_requirement(&format!("https://twitter.com/p{i}_{j}_{}", "x".repeat(200)));
        }
        expected.insert(event.summary_line());

        let sink = Arc::clone(&sink);
        writers.push(tokio::spawn(async move {
            premint_scraper::app::ports::EventSink::record(&*sink, &event).await
        }));
    }
    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    let summary = std::fs::read_to_string(dir.path().join("final_summary_data.txt")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 64);
    for line in lines {
        assert!(expected.contains(line), "corrupted line: {line}");
    }

    let twitters = std::fs::read_to_string(dir.path().join("twitters_to_subscribe.txt")).unwrap();
    assert_eq!(twitters.lines().count(), 64 * 20);
    assert!(twitters.lines().all(|l| l.starts_with("https://twitter.com/p") && l.ends_with('x')));
}
