// tests/history_jsonl.rs
//
// JSON Lines history store against a real filesystem (tempfile).
//
// Covered:
// - one record per line, wire field names, append-only
// - persistence across tracker/engine instances
// - corrupt lines are skipped one by one; appends still work
// - a torn last line does not swallow the next record
// - unwritable path surfaces as EngineError::StoreWrite
// - concurrent check-ins do not lose records

use std::fs;
use std::sync::Arc;
use std::thread;

use ritmo_score::checkin::{CheckIn, Environment, Mood};
use ritmo_score::error::{EngineError, StoreError};
use ritmo_score::history::{HistoryStore, HistoryTracker, JsonlHistoryStore, Trend};
use ritmo_score::score::Level;
use ritmo_score::sentiment::SentimentClass;
use ritmo_score::RitmoEngine;

fn checkin(user: &str, focus: u8) -> CheckIn {
    CheckIn::new(user, Mood::Ok, focus, Environment::Home)
}

#[test]
fn appends_one_json_record_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("historico.jsonl");
    let tracker = HistoryTracker::jsonl(&path);

    tracker
        .record_and_get_trend("u1", 61.0, Level::Neutral, SentimentClass::Neutral)
        .unwrap();
    tracker
        .record_and_get_trend("u2", 30.0, Level::Critical, SentimentClass::Negative)
        .unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["usuario_id"], "u1");
    assert_eq!(first["score"], 61.0);
    assert_eq!(first["nivel"], "neutro");
    assert_eq!(first["sentimento"], "neutro");
    assert!(first["timestamp"].is_string());

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["nivel"], "critico");
    assert_eq!(second["sentimento"], "negativo");
}

#[test]
fn history_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h.jsonl");

    {
        let engine = RitmoEngine::with_store(Arc::new(JsonlHistoryStore::new(&path)));
        let o = engine.evaluate(&checkin("ana", 1)).unwrap();
        assert_eq!(o.trend, Trend::FirstMeasurement);
    }

    let engine = RitmoEngine::with_store(Arc::new(JsonlHistoryStore::new(&path)));
    let o = engine.evaluate(&checkin("ana", 5)).unwrap();
    assert_eq!((o.trend, o.total_checkins), (Trend::Rising, 2));
    assert_eq!(engine.history_for("ana").len(), 2);
}

#[test]
fn corrupt_only_file_reads_as_empty_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h.jsonl");
    fs::write(&path, "{\"usuario_id\":\"ana\"\nthis is not json\n").unwrap();

    let store = JsonlHistoryStore::new(&path);
    assert!(store.load_all().unwrap().is_empty());

    let engine = RitmoEngine::with_store(Arc::new(store));
    let o = engine.evaluate(&checkin("ana", 3)).unwrap();
    assert_eq!((o.trend, o.total_checkins), (Trend::FirstMeasurement, 1));

    // The append still landed after the corrupt lines.
    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), 3);
}

#[test]
fn corrupt_line_in_the_middle_keeps_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h.jsonl");
    let engine = RitmoEngine::with_store(Arc::new(JsonlHistoryStore::new(&path)));
    engine.evaluate(&checkin("ana", 1)).unwrap();

    let mut raw = fs::read_to_string(&path).unwrap();
    raw.push_str("garbage\n");
    fs::write(&path, raw).unwrap();

    let o = engine.evaluate(&checkin("ana", 5)).unwrap();
    assert_eq!((o.trend, o.total_checkins), (Trend::Rising, 2));
    assert_eq!(JsonlHistoryStore::new(&path).load_all().unwrap().len(), 2);
}

#[test]
fn torn_last_line_does_not_swallow_later_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h.jsonl");
    let engine = RitmoEngine::with_store(Arc::new(JsonlHistoryStore::new(&path)));
    engine.evaluate(&checkin("ana", 3)).unwrap();
    engine.evaluate(&checkin("ana", 3)).unwrap();

    // Simulate a crash mid-write: partial record, no trailing newline.
    let mut raw = fs::read_to_string(&path).unwrap();
    raw.push_str("{\"usuario_id\":\"bob\",\"tim");
    fs::write(&path, raw).unwrap();

    let third = engine.evaluate(&checkin("ana", 5)).unwrap();
    assert_ne!(third.trend, Trend::FirstMeasurement);
    assert_eq!((third.trend, third.total_checkins), (Trend::Rising, 3));

    let fourth = engine.evaluate(&checkin("ana", 5)).unwrap();
    assert_eq!((fourth.trend, fourth.total_checkins), (Trend::Stable, 4));
    assert_eq!(engine.history_for("ana").len(), 4);

    // The torn fragment stays on its own line.
    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), 5);
    assert!(raw.ends_with('\n'));
}

#[test]
fn blank_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h.jsonl");
    let tracker = HistoryTracker::jsonl(&path);
    tracker
        .record_and_get_trend("u", 40.0, Level::Alert, SentimentClass::Neutral)
        .unwrap();

    let mut raw = fs::read_to_string(&path).unwrap();
    raw.push_str("\n\n");
    fs::write(&path, raw).unwrap();

    let r = tracker
        .record_and_get_trend("u", 80.0, Level::Flow, SentimentClass::Positive)
        .unwrap();
    assert_eq!((r.trend, r.total), (Trend::Rising, 2));
}

#[test]
fn unwritable_path_is_a_store_write_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be: open(append) fails.
    let path = dir.path().join("taken");
    fs::create_dir(&path).unwrap();

    let engine = RitmoEngine::with_store(Arc::new(JsonlHistoryStore::new(&path)));
    let err = engine.evaluate(&checkin("ana", 3)).unwrap_err();
    assert!(matches!(err, EngineError::StoreWrite(StoreError::Io(_))));
}

#[test]
fn concurrent_checkins_lose_no_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("h.jsonl");
    let engine = Arc::new(RitmoEngine::with_store(Arc::new(JsonlHistoryStore::new(
        &path,
    ))));

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                for i in 0..5u8 {
                    let user = format!("user-{}", t % 2);
                    engine.evaluate(&checkin(&user, 1 + i % 5)).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let store = JsonlHistoryStore::new(&path);
    assert_eq!(store.load_all().unwrap().len(), 40);
    assert_eq!(engine.history_for("user-0").len(), 20);
    assert_eq!(engine.history_for("user-1").len(), 20);

    // Totals reported to the last writer match what is on disk.
    let last = engine.evaluate(&checkin("user-0", 3)).unwrap();
    assert_eq!(last.total_checkins, 21);
}
