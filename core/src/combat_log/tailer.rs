//! Background tailer for the game's combat log.
//!
//! One worker thread owns the open file handle and the read offset; nothing
//! else touches them, so the only cross-thread state is whatever the
//! [`TriggerSink`] guards itself.

use std::fs::{self, File, Metadata};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use encoding_rs::UTF_8;
use kztracker_types::TailerSettings;
use memchr::{memchr_iter, memrchr};

use super::log_files::{file_size, find_latest_log};
use super::triggers::{classify_line, mentions_trigger};
use super::TailerError;
use crate::phase::TriggerSink;

const WORKER_THREAD_NAME: &str = "combat-log-tailer";
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Tails the newest combat log and forwards encounter triggers.
pub struct LogTailer<S: TriggerSink + 'static> {
    sink: Arc<S>,
    settings: TailerSettings,
    log_folder: Option<PathBuf>,
    log_path: Option<PathBuf>,
    /// Where the next worker starts reading
    read_offset: u64,
    worker: Option<Worker>,
    /// Worker that missed the stop timeout and may still be dispatching
    detached: Option<Worker>,
}

struct Worker {
    stop_tx: Sender<()>,
    done_rx: Receiver<TailState>,
    handle: JoinHandle<()>,
    /// Adopt the worker's final path and offset when it is reaped
    resume: bool,
}

impl<S: TriggerSink + 'static> LogTailer<S> {
    pub fn new(sink: Arc<S>) -> Self {
        Self::with_settings(sink, TailerSettings::default())
    }

    pub fn with_settings(sink: Arc<S>, settings: TailerSettings) -> Self {
        Self {
            sink,
            settings: settings.validated(),
            log_folder: None,
            log_path: None,
            read_offset: 0,
            worker: None,
            detached: None,
        }
    }

    // ─── Log selection ──────────────────────────────────────────────────────

    /// Tail the newest `CombatLog*.txt` in `folder`, starting from its
    /// current end so old events are not replayed.
    ///
    /// Returns the chosen file, or `None` if the folder has no combat log.
    /// A running worker is restarted on the new file.
    pub fn set_log_folder(&mut self, folder: impl AsRef<Path>) -> Option<PathBuf> {
        let folder = folder.as_ref();
        let latest = match find_latest_log(folder) {
            Ok(latest) => latest,
            Err(e) => {
                tracing::debug!(error = %e, "Combat log folder scan failed");
                None
            }
        };

        self.restarting(|tailer| {
            tailer.log_folder = Some(folder.to_path_buf());
            if let Some(path) = &latest {
                tailer.read_offset = file_size(path);
                tailer.log_path = Some(path.clone());
            }
        });

        match &latest {
            Some(path) => tracing::info!(path = %path.display(), "Combat log selected"),
            None => tracing::info!(folder = %folder.display(), "No combat log found"),
        }
        latest
    }

    /// Tail a specific file from its current end. Its folder is still
    /// rescanned for newer logs.
    pub fn set_log_path(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.restarting(|tailer| {
            tailer.log_folder = path.parent().map(Path::to_path_buf);
            tailer.read_offset = file_size(&path);
            tailer.log_path = Some(path);
        });
    }

    fn restarting(&mut self, update: impl FnOnce(&mut Self)) {
        let was_running = self.is_running();
        if was_running {
            self.stop();
        }
        update(self);
        // The new selection wins over whatever a late worker hands back
        if let Some(detached) = &mut self.detached {
            detached.resume = false;
        }
        if was_running && let Err(e) = self.start() {
            tracing::warn!(error = %e, "Failed to restart combat log tailer");
        }
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Spawn the worker. Already running is not an error.
    ///
    /// Fails with [`TailerError::WorkerBusy`] while a worker detached by a
    /// timed-out [`stop`](Self::stop) is still alive, so two workers never
    /// dispatch the same lines.
    pub fn start(&mut self) -> Result<(), TailerError> {
        if self.is_running() {
            return Ok(());
        }
        // Reap a worker that exited on its own
        self.stop();
        self.reap_detached()?;

        let path = self.log_path.clone().ok_or(TailerError::NoLogPath)?;
        if !path.exists() {
            return Err(TailerError::LogMissing { path });
        }

        let state = TailState {
            log_folder: self.log_folder.clone(),
            log_path: path,
            read_offset: self.read_offset,
            last_rescan: Instant::now(),
            rescan_interval: Duration::from_secs(self.settings.rescan_interval_secs),
            file: None,
        };
        let poll_interval = Duration::from_millis(self.settings.poll_interval_ms);
        let sink = Arc::clone(&self.sink);
        let (stop_tx, stop_rx) = mpsc::channel();
        let (done_tx, done_rx) = mpsc::channel();

        tracing::info!(
            path = %state.log_path.display(),
            offset = state.read_offset,
            "Starting combat log tailer"
        );

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(state, sink, poll_interval, stop_rx, done_tx))
            .map_err(TailerError::Spawn)?;

        self.worker = Some(Worker {
            stop_tx,
            done_rx,
            handle,
            resume: true,
        });
        Ok(())
    }

    fn reap_detached(&mut self) -> Result<(), TailerError> {
        let Some(worker) = self.detached.take() else {
            return Ok(());
        };
        if !worker.handle.is_finished() {
            self.detached = Some(worker);
            return Err(TailerError::WorkerBusy);
        }

        if let Ok(state) = worker.done_rx.try_recv()
            && worker.resume
        {
            self.adopt(state);
        }
        if worker.handle.join().is_err() {
            tracing::warn!("Detached combat log worker panicked");
        }
        tracing::debug!("Detached combat log worker reaped");
        Ok(())
    }

    fn adopt(&mut self, state: TailState) {
        self.log_path = Some(state.log_path);
        self.read_offset = state.read_offset;
    }

    /// Stop the worker and wait (bounded) until it has released the file.
    ///
    /// Idempotent. The worker's final position is kept, so a later
    /// [`start`](Self::start) resumes where it left off. A worker that misses
    /// `stop_timeout_ms` is detached and hands its position back once it
    /// exits.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        let _ = worker.stop_tx.send(());
        let timeout = Duration::from_millis(self.settings.stop_timeout_ms);

        match worker.done_rx.recv_timeout(timeout) {
            Ok(state) => {
                if worker.handle.join().is_err() {
                    tracing::warn!("Combat log worker panicked during shutdown");
                }
                self.adopt(state);
                tracing::info!("Combat log tailer stopped");
            }
            Err(RecvTimeoutError::Disconnected) => {
                let _ = worker.handle.join();
                tracing::warn!("Combat log worker exited without reporting its state");
            }
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    timeout_ms = self.settings.stop_timeout_ms,
                    "Combat log worker did not stop in time, detaching"
                );
                self.detached = Some(worker);
            }
        }
    }

    // ─── Observers ──────────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|w| !w.handle.is_finished())
            .unwrap_or(false)
    }

    /// The configured log. While running, the worker may have moved on to a
    /// newer file; that is reflected here after [`stop`](Self::stop).
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn log_folder(&self) -> Option<&Path> {
        self.log_folder.as_deref()
    }

    pub fn read_offset(&self) -> u64 {
        self.read_offset
    }

    pub fn settings(&self) -> TailerSettings {
        self.settings
    }
}

impl<S: TriggerSink + 'static> Drop for LogTailer<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Worker
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the worker owns. Handed back to the tailer on exit.
struct TailState {
    log_folder: Option<PathBuf>,
    log_path: PathBuf,
    /// Bytes already consumed; never past the end of the file
    read_offset: u64,
    last_rescan: Instant,
    rescan_interval: Duration,
    file: Option<File>,
}

fn run_worker<S: TriggerSink>(
    mut state: TailState,
    sink: Arc<S>,
    poll_interval: Duration,
    stop_rx: Receiver<()>,
    done_tx: Sender<TailState>,
) {
    loop {
        if let Err(e) = state.tick(&*sink) {
            // The game may delete or rotate the log at any time
            tracing::debug!(path = %state.log_path.display(), error = %e, "Combat log read failed");
            state.file = None;
        }

        match stop_rx.recv_timeout(poll_interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    state.file = None;
    let _ = done_tx.send(state);
}

impl TailState {
    fn tick<S: TriggerSink + ?Sized>(&mut self, sink: &S) -> io::Result<()> {
        self.check_for_newer_log();

        let on_disk = fs::metadata(&self.log_path)?;
        if let Some(file) = &self.file
            && !same_file(&file.metadata()?, &on_disk)
        {
            // Deleted and recreated under the same name since the last tick
            tracing::info!(
                path = %self.log_path.display(),
                "Combat log replaced, rereading from start"
            );
            self.read_offset = 0;
            self.file = None;
        }

        if on_disk.len() < self.read_offset {
            tracing::info!(
                path = %self.log_path.display(),
                size = on_disk.len(),
                offset = self.read_offset,
                "Combat log truncated, rereading from start"
            );
            self.read_offset = 0;
            self.file = None;
        }

        let file = match &mut self.file {
            Some(file) => file,
            slot => slot.insert(File::open(&self.log_path)?),
        };
        file.seek(SeekFrom::Start(self.read_offset))?;

        // A trailing partial line stays unread until the game finishes it
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];
        let mut pending = Vec::new();
        loop {
            let n = file.read(&mut chunk)?;
            if n == 0 {
                return Ok(());
            }
            pending.extend_from_slice(&chunk[..n]);

            if let Some(last_newline) = memrchr(b'\n', &pending) {
                process_lines(&pending[..=last_newline], sink);
                self.read_offset += (last_newline + 1) as u64;
                pending.drain(..=last_newline);
            }
        }
    }

    /// Switch to a newer log in the folder, at most once per rescan interval.
    fn check_for_newer_log(&mut self) {
        if self.last_rescan.elapsed() < self.rescan_interval {
            return;
        }
        self.last_rescan = Instant::now();

        let Some(folder) = &self.log_folder else {
            return;
        };

        match find_latest_log(folder) {
            Ok(Some(newest)) if newest != self.log_path => {
                tracing::info!(
                    from = %self.log_path.display(),
                    to = %newest.display(),
                    "Switching to newer combat log"
                );
                self.file = None;
                self.log_path = newest;
                self.read_offset = 0;
            }
            Ok(_) => {}
            Err(e) => tracing::debug!(error = %e, "Combat log rescan failed"),
        }
    }
}

/// True when an open handle and a fresh stat of its path are the same file.
#[cfg(unix)]
fn same_file(open: &Metadata, on_disk: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    open.dev() == on_disk.dev() && open.ino() == on_disk.ino()
}

#[cfg(not(unix))]
fn same_file(open: &Metadata, on_disk: &Metadata) -> bool {
    match (open.created(), on_disk.created()) {
        (Ok(a), Ok(b)) => a == b,
        _ => true,
    }
}

/// Decode newline-terminated lines and dispatch any triggers they contain.
fn process_lines<S: TriggerSink + ?Sized>(bytes: &[u8], sink: &S) {
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        let raw = &bytes[start..end];
        start = end + 1;

        let (line, _) = UTF_8.decode_without_bom_handling(raw);
        let line = line.trim_end_matches('\r');
        if !mentions_trigger(line) {
            continue;
        }
        if let Some(trigger) = classify_line(line) {
            tracing::debug!(?trigger, "Combat log trigger");
            trigger.dispatch(sink);
        }
    }
}
