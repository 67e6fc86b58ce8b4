use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use kztracker_types::TailerSettings;

use super::{LogTailer, TailerError};
use crate::phase::{PhaseClock, TriggerSink};

const SEED_ON_BOB: &str = "[21:04:11] Ethram-Fal afflicts Bob with Viscous Seed.\n";
const SEED_ON_YOU: &str = "[21:04:11] Ethram-Fal afflicts you with Viscous Seed.\n";
const FIXATION_ON_AL: &str = "[21:04:15] The Emerald Lotus afflicts Al with Lotus Fixation.\n";
const SYPHON: &str = "[21:05:02] Ethram-Fal's Syphon hits you for 812 points of damage.\n";
const NOISE: &str = "[21:04:09] You hit Ethram-Fal for 512 points of damage.\n";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Cycle(String),
    Fixation(String),
    Syphon,
}

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl TriggerSink for Recorder {
    fn start_cycle(&self, actor: String) {
        self.calls.lock().unwrap().push(Call::Cycle(actor));
    }

    fn update_fixation(&self, actor: String) {
        self.calls.lock().unwrap().push(Call::Fixation(actor));
    }

    fn start_syphon(&self) {
        self.calls.lock().unwrap().push(Call::Syphon);
    }
}

/// Records like [`Recorder`] but holds the worker inside `start_cycle`.
struct SlowRecorder {
    inner: Recorder,
    entered: AtomicBool,
    hold: Duration,
}

impl SlowRecorder {
    fn new(hold: Duration) -> Self {
        Self {
            inner: Recorder::default(),
            entered: AtomicBool::new(false),
            hold,
        }
    }
}

impl TriggerSink for SlowRecorder {
    fn start_cycle(&self, actor: String) {
        self.entered.store(true, Ordering::SeqCst);
        thread::sleep(self.hold);
        self.inner.start_cycle(actor);
    }

    fn update_fixation(&self, actor: String) {
        self.inner.update_fixation(actor);
    }

    fn start_syphon(&self) {
        self.inner.start_syphon();
    }
}

fn fast_settings() -> TailerSettings {
    TailerSettings {
        poll_interval_ms: 10,
        rescan_interval_secs: 1,
        stop_timeout_ms: 2000,
    }
}

fn append(path: &Path, text: &str) {
    let mut file = OpenOptions::new().append(true).create(true).open(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

/// Give the worker a few poll intervals to pick up anything it would.
fn settle() {
    thread::sleep(Duration::from_millis(150));
}

fn tailer_on(path: &Path) -> (LogTailer<Recorder>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let mut tailer = LogTailer::with_settings(Arc::clone(&recorder), fast_settings());
    tailer.set_log_path(path);
    (tailer, recorder)
}

// ─── Start / stop ───────────────────────────────────────────────────────────

#[test]
fn start_without_log_fails() {
    let mut tailer = LogTailer::new(Arc::new(Recorder::default()));
    assert!(matches!(tailer.start(), Err(TailerError::NoLogPath)));
    assert!(!tailer.is_running());
}

#[test]
fn start_with_missing_log_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-gone.txt");
    let (mut tailer, _) = tailer_on(&path);

    match tailer.start() {
        Err(TailerError::LogMissing { path: missing }) => assert_eq!(missing, path),
        other => panic!("expected LogMissing, got {other:?}"),
    }
    assert!(!tailer.is_running());
}

#[test]
fn stop_is_idempotent_and_ends_dispatch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    File::create(&path).unwrap();
    let (mut tailer, recorder) = tailer_on(&path);

    tailer.stop();
    tailer.start().unwrap();
    assert!(tailer.is_running());
    // Second start is a no-op
    tailer.start().unwrap();

    tailer.stop();
    assert!(!tailer.is_running());
    tailer.stop();

    append(&path, SEED_ON_BOB);
    settle();
    assert!(recorder.calls().is_empty());
}

#[test]
fn restart_resumes_from_last_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    File::create(&path).unwrap();
    let (mut tailer, recorder) = tailer_on(&path);

    tailer.start().unwrap();
    append(&path, SEED_ON_BOB);
    assert!(wait_until(Duration::from_secs(5), || recorder.calls().len() == 1));
    tailer.stop();
    assert_eq!(tailer.read_offset(), SEED_ON_BOB.len() as u64);

    tailer.start().unwrap();
    append(&path, SYPHON);
    assert!(wait_until(Duration::from_secs(5), || recorder.calls().len() == 2));
    settle();
    assert_eq!(
        recorder.calls(),
        vec![Call::Cycle("Bob".to_string()), Call::Syphon]
    );
}

#[test]
fn timed_out_stop_detaches_and_blocks_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    File::create(&path).unwrap();

    let recorder = Arc::new(SlowRecorder::new(Duration::from_millis(800)));
    let settings = TailerSettings {
        stop_timeout_ms: 100,
        ..fast_settings()
    };
    let mut tailer = LogTailer::with_settings(Arc::clone(&recorder), settings);
    tailer.set_log_path(&path);
    tailer.start().unwrap();

    append(&path, SEED_ON_BOB);
    assert!(wait_until(Duration::from_secs(5), || recorder.entered.load(Ordering::SeqCst)));

    // Worker is stuck in the sink longer than the stop timeout
    tailer.stop();
    assert!(!tailer.is_running());
    assert!(matches!(tailer.start(), Err(TailerError::WorkerBusy)));

    assert!(wait_until(Duration::from_secs(5), || tailer.start().is_ok()));
    assert_eq!(tailer.read_offset(), SEED_ON_BOB.len() as u64);

    append(&path, SYPHON);
    assert!(wait_until(Duration::from_secs(5), || recorder.inner.calls().len() == 2));
    settle();
    tailer.stop();

    assert_eq!(
        recorder.inner.calls(),
        vec![Call::Cycle("Bob".to_string()), Call::Syphon]
    );
}

#[test]
fn new_selection_wins_over_detached_worker() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("CombatLog-1.txt");
    let second = dir.path().join("CombatLog-2.txt");
    File::create(&first).unwrap();
    fs::write(&second, NOISE).unwrap();

    let recorder = Arc::new(SlowRecorder::new(Duration::from_millis(600)));
    let settings = TailerSettings {
        stop_timeout_ms: 100,
        ..fast_settings()
    };
    let mut tailer = LogTailer::with_settings(Arc::clone(&recorder), settings);
    tailer.set_log_path(&first);
    tailer.start().unwrap();

    append(&first, SEED_ON_BOB);
    assert!(wait_until(Duration::from_secs(5), || recorder.entered.load(Ordering::SeqCst)));
    tailer.stop();

    tailer.set_log_path(&second);
    assert!(wait_until(Duration::from_secs(5), || tailer.start().is_ok()));
    tailer.stop();

    assert_eq!(tailer.log_path(), Some(second.as_path()));
    assert_eq!(tailer.read_offset(), NOISE.len() as u64);
}

// ─── Reading ────────────────────────────────────────────────────────────────

#[test]
fn existing_content_is_not_replayed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    fs::write(&path, format!("{SEED_ON_BOB}{FIXATION_ON_AL}")).unwrap();

    let recorder = Arc::new(Recorder::default());
    let mut tailer = LogTailer::with_settings(Arc::clone(&recorder), fast_settings());
    assert_eq!(tailer.set_log_folder(dir.path()), Some(path.clone()));
    assert_eq!(tailer.log_folder(), Some(dir.path()));
    assert_eq!(tailer.log_path(), Some(path.as_path()));

    tailer.start().unwrap();
    settle();
    assert!(recorder.calls().is_empty());

    append(&path, SEED_ON_YOU);
    assert!(wait_until(Duration::from_secs(5), || !recorder.calls().is_empty()));
    tailer.stop();
    assert_eq!(recorder.calls(), vec![Call::Cycle("YOU".to_string())]);
}

#[test]
fn triggers_dispatch_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    File::create(&path).unwrap();
    let (mut tailer, recorder) = tailer_on(&path);
    tailer.start().unwrap();

    append(
        &path,
        &format!("{NOISE}{SEED_ON_BOB}{NOISE}{FIXATION_ON_AL}{SYPHON}"),
    );
    assert!(wait_until(Duration::from_secs(5), || recorder.calls().len() == 3));
    tailer.stop();

    assert_eq!(
        recorder.calls(),
        vec![
            Call::Cycle("Bob".to_string()),
            Call::Fixation("Al".to_string()),
            Call::Syphon,
        ]
    );
}

#[test]
fn crlf_lines_are_handled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    File::create(&path).unwrap();
    let (mut tailer, recorder) = tailer_on(&path);
    tailer.start().unwrap();

    append(&path, "Ethram-Fal afflicts Bob with Viscous Seed.\r\n");
    assert!(wait_until(Duration::from_secs(5), || !recorder.calls().is_empty()));
    tailer.stop();
    assert_eq!(recorder.calls(), vec![Call::Cycle("Bob".to_string())]);
}

#[test]
fn invalid_utf8_does_not_stop_the_worker() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    File::create(&path).unwrap();
    let (mut tailer, recorder) = tailer_on(&path);
    tailer.start().unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"[21:04:10] \xff\xfe garbage\n").unwrap();
    file.write_all(SEED_ON_BOB.as_bytes()).unwrap();
    drop(file);

    assert!(wait_until(Duration::from_secs(5), || !recorder.calls().is_empty()));
    assert!(tailer.is_running());
    tailer.stop();
    assert_eq!(recorder.calls(), vec![Call::Cycle("Bob".to_string())]);
}

#[test]
fn partial_line_waits_for_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    File::create(&path).unwrap();
    let (mut tailer, recorder) = tailer_on(&path);
    tailer.start().unwrap();

    append(&path, "[21:04:11] Ethram-Fal afflicts Bob");
    settle();
    assert!(recorder.calls().is_empty());

    append(&path, " with Viscous Seed.\n");
    assert!(wait_until(Duration::from_secs(5), || !recorder.calls().is_empty()));
    settle();
    tailer.stop();
    assert_eq!(recorder.calls(), vec![Call::Cycle("Bob".to_string())]);
}

#[test]
fn long_backlog_is_read_in_full() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    File::create(&path).unwrap();
    let (mut tailer, recorder) = tailer_on(&path);
    tailer.start().unwrap();

    // Several read chunks worth of noise around two triggers
    let filler = NOISE.repeat(4000);
    append(&path, &format!("{filler}{SEED_ON_BOB}{filler}{SYPHON}"));
    assert!(wait_until(Duration::from_secs(5), || recorder.calls().len() == 2));
    settle();
    tailer.stop();

    assert_eq!(
        recorder.calls(),
        vec![Call::Cycle("Bob".to_string()), Call::Syphon]
    );
    assert_eq!(tailer.read_offset(), fs::metadata(&path).unwrap().len());
}

// ─── Rotation ───────────────────────────────────────────────────────────────

#[test]
fn truncated_log_is_reread_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    File::create(&path).unwrap();
    let (mut tailer, recorder) = tailer_on(&path);
    tailer.start().unwrap();

    // Long first line so the rewritten file is shorter than the offset
    let padded = format!("{}{SEED_ON_BOB}", "x".repeat(200));
    append(&path, &padded);
    assert!(wait_until(Duration::from_secs(5), || recorder.calls().len() == 1));

    fs::write(&path, FIXATION_ON_AL).unwrap();
    assert!(wait_until(Duration::from_secs(5), || recorder.calls().len() == 2));
    settle();
    tailer.stop();

    assert_eq!(
        recorder.calls(),
        vec![Call::Cycle("Bob".to_string()), Call::Fixation("Al".to_string())]
    );
}

#[test]
fn vanished_log_is_picked_up_when_recreated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    fs::write(&path, NOISE.repeat(10)).unwrap();
    let (mut tailer, recorder) = tailer_on(&path);
    tailer.start().unwrap();

    fs::remove_file(&path).unwrap();
    settle();
    assert!(tailer.is_running());

    fs::write(&path, SEED_ON_BOB).unwrap();
    assert!(wait_until(Duration::from_secs(5), || !recorder.calls().is_empty()));
    tailer.stop();
    assert_eq!(recorder.calls(), vec![Call::Cycle("Bob".to_string())]);
}

#[test]
fn recreated_log_between_polls_is_reread() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    fs::write(&path, NOISE.repeat(2)).unwrap();

    let recorder = Arc::new(Recorder::default());
    let settings = TailerSettings {
        poll_interval_ms: 500,
        ..fast_settings()
    };
    let mut tailer = LogTailer::with_settings(Arc::clone(&recorder), settings);
    tailer.set_log_path(&path);
    tailer.start().unwrap();

    // First poll has opened the file; replace it before the next one with
    // something larger than the current offset
    thread::sleep(Duration::from_millis(100));
    fs::remove_file(&path).unwrap();
    fs::write(&path, format!("{}{SEED_ON_BOB}", NOISE.repeat(4))).unwrap();

    assert!(wait_until(Duration::from_secs(3), || !recorder.calls().is_empty()));
    tailer.stop();
    assert_eq!(recorder.calls(), vec![Call::Cycle("Bob".to_string())]);
}

#[test]
fn pinned_log_is_kept_until_first_rescan() {
    let dir = tempfile::tempdir().unwrap();
    let pinned = dir.path().join("CombatLog-1.txt");
    let newer = dir.path().join("CombatLog-2.txt");
    File::create(&pinned).unwrap();
    fs::write(&newer, SEED_ON_YOU).unwrap();
    File::options()
        .write(true)
        .open(&newer)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(10))
        .unwrap();

    let recorder = Arc::new(Recorder::default());
    let settings = TailerSettings {
        rescan_interval_secs: 30,
        ..fast_settings()
    };
    let mut tailer = LogTailer::with_settings(Arc::clone(&recorder), settings);
    tailer.set_log_path(&pinned);
    tailer.start().unwrap();

    append(&pinned, SEED_ON_BOB);
    assert!(wait_until(Duration::from_secs(5), || !recorder.calls().is_empty()));
    settle();
    tailer.stop();

    // The newer log was not switched to, so its seed never replayed
    assert_eq!(recorder.calls(), vec![Call::Cycle("Bob".to_string())]);
    assert_eq!(tailer.log_path(), Some(pinned.as_path()));
}

#[test]
fn switches_to_newer_log_in_folder() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("CombatLog-1.txt");
    fs::write(&first, NOISE).unwrap();

    let recorder = Arc::new(Recorder::default());
    let mut tailer = LogTailer::with_settings(Arc::clone(&recorder), fast_settings());
    assert_eq!(tailer.set_log_folder(dir.path()), Some(first.clone()));
    tailer.start().unwrap();

    // New session log, read from its beginning
    let second = dir.path().join("CombatLog-2.txt");
    fs::write(&second, SEED_ON_YOU).unwrap();
    File::options()
        .write(true)
        .open(&second)
        .unwrap()
        .set_modified(SystemTime::now() + Duration::from_secs(10))
        .unwrap();

    assert!(wait_until(Duration::from_secs(5), || !recorder.calls().is_empty()));
    tailer.stop();

    assert_eq!(recorder.calls(), vec![Call::Cycle("YOU".to_string())]);
    assert_eq!(tailer.log_path(), Some(second.as_path()));
}

#[test]
fn set_log_path_while_running_restarts_on_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("CombatLog-1.txt");
    let second = dir.path().join("CombatLog-2.txt");
    File::create(&first).unwrap();
    fs::write(&second, SEED_ON_BOB).unwrap();

    let (mut tailer, recorder) = tailer_on(&first);
    tailer.start().unwrap();
    tailer.set_log_path(&second);
    assert!(tailer.is_running());
    assert_eq!(tailer.read_offset(), SEED_ON_BOB.len() as u64);

    append(&second, SYPHON);
    assert!(wait_until(Duration::from_secs(5), || !recorder.calls().is_empty()));
    tailer.stop();
    assert_eq!(recorder.calls(), vec![Call::Syphon]);
}

// ─── End to end ─────────────────────────────────────────────────────────────

#[test]
fn drives_phase_clock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CombatLog-1.txt");
    File::create(&path).unwrap();

    let clock = Arc::new(PhaseClock::default());
    let mut tailer = LogTailer::with_settings(Arc::clone(&clock), fast_settings());
    tailer.set_log_path(&path);
    tailer.start().unwrap();

    append(&path, SEED_ON_YOU);
    assert!(wait_until(Duration::from_secs(5), || clock.is_active()));

    let display = clock.get_current_phase().unwrap();
    assert_eq!(display.row1.actor_name, "YOU");

    append(&path, SYPHON);
    assert!(wait_until(Duration::from_secs(5), || !clock.is_active()));
    tailer.stop();

    assert!(clock.snapshot().interrupt_active);
}
