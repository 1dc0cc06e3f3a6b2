//! Recording session lifecycle and worker thread.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use grabkit_capture::{CaptureBackend, CaptureOptions, CaptureTarget};
use grabkit_encoder::VideoSink;

use crate::error::BridgeError;
use crate::recording::{RecordingConfig, SessionState};
use crate::BridgeResult;

type WorkerResult = Result<Box<dyn VideoSink>, BridgeError>;

/// A live or terminated recording.
///
/// Created by [`CaptureBridge::start_recording`](crate::CaptureBridge::start_recording);
/// the handle only exists once start has succeeded. Stop and abort are
/// each valid exactly once: the state lock serializes concurrent
/// terminations, and the loser observes an
/// [`InvalidState`](BridgeError::InvalidState) error.
#[derive(Debug)]
pub struct RecordingSession {
    output_path: PathBuf,
    state: Mutex<SessionState>,
    should_stop: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<WorkerResult>>>,
}

impl RecordingSession {
    /// Spawn the capture worker and wait for its first frame.
    ///
    /// Failures of the very first capture or write surface here, so a
    /// returned session is genuinely recording. On error the sink has
    /// already discarded any partial output.
    #[instrument(name = "recording_spawn", skip_all, fields(path = %config.output_path.display()))]
    pub(crate) fn spawn(
        backend: Arc<dyn CaptureBackend>,
        config: &RecordingConfig,
        sink: Box<dyn VideoSink>,
    ) -> BridgeResult<Self> {
        let target = if config.region.is_zero() {
            CaptureTarget::FullScreen
        } else {
            CaptureTarget::Region(config.region)
        };
        let options = CaptureOptions {
            include_cursor: config.show_cursor,
        };
        let fps = config.fps;
        let should_stop = Arc::new(AtomicBool::new(false));

        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<(), BridgeError>>(1);

        let worker_stop = Arc::clone(&should_stop);
        let handle = thread::Builder::new()
            .name("grabkit-recorder".into())
            .spawn(move || worker_loop(backend, target, options, sink, fps, worker_stop, ready_tx))
            .map_err(|e| BridgeError::Worker(format!("failed to spawn worker thread: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("recording started");
                Ok(Self {
                    output_path: config.output_path.clone(),
                    state: Mutex::new(SessionState::Active),
                    should_stop,
                    worker: Mutex::new(Some(handle)),
                })
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(BridgeError::Worker(
                    "worker exited before reporting readiness".into(),
                ))
            }
        }
    }

    /// Stop the recording and finalize the output file.
    #[instrument(name = "recording_stop", skip(self), fields(path = %self.output_path.display()))]
    pub fn stop(&self) -> BridgeResult<()> {
        let mut state = self.state.lock();
        if *state != SessionState::Active {
            return Err(BridgeError::InvalidState {
                operation: "stop",
                state: state.name(),
            });
        }

        self.should_stop.store(true, Ordering::SeqCst);
        match self.join_worker() {
            Ok(sink) => match sink.finalize() {
                Ok(()) => {
                    *state = SessionState::Finalized;
                    info!("recording finalized");
                    Ok(())
                }
                Err(e) => {
                    *state = SessionState::Failed;
                    Err(e.into())
                }
            },
            Err(e) => {
                *state = SessionState::Failed;
                Err(e)
            }
        }
    }

    /// Abort the recording, discarding and removing the output file.
    #[instrument(name = "recording_abort", skip(self), fields(path = %self.output_path.display()))]
    pub fn abort(&self) -> BridgeResult<()> {
        let mut state = self.state.lock();
        if *state != SessionState::Active {
            return Err(BridgeError::InvalidState {
                operation: "abort",
                state: state.name(),
            });
        }

        self.should_stop.store(true, Ordering::SeqCst);
        match self.join_worker() {
            Ok(sink) => {
                sink.discard()?;
                *state = SessionState::Aborted;
                info!("recording aborted");
                Ok(())
            }
            Err(e) => {
                // The worker discards its sink on failure, so the
                // partial file is already gone.
                *state = SessionState::Failed;
                Err(e)
            }
        }
    }

    /// Whether the session is still capturing frames.
    ///
    /// Pure query; safe to call in any state and after termination,
    /// where it returns `false`.
    pub fn is_recording(&self) -> bool {
        if *self.state.lock() != SessionState::Active {
            return false;
        }
        self.worker
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// The configured output path.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn join_worker(&self) -> WorkerResult {
        let handle = self
            .worker
            .lock()
            .take()
            .ok_or_else(|| BridgeError::Worker("worker already joined".into()))?;
        handle
            .join()
            .map_err(|_| BridgeError::Worker("recording worker panicked".into()))?
    }
}

impl Drop for RecordingSession {
    fn drop(&mut self) {
        let state = *self.state.lock();
        if state != SessionState::Active {
            return;
        }
        // An abandoned live session is torn down like an abort.
        self.should_stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.worker.lock().take() {
            if let Ok(Ok(sink)) = handle.join() {
                let _ = sink.discard();
            }
        }
    }
}

/// Paced capture loop run on the worker thread.
///
/// The first capture and write happen before readiness is reported so
/// start sees immediate failures. On any later failure the sink is
/// discarded (removing the partial file) and the error is handed back
/// through the join.
fn worker_loop(
    backend: Arc<dyn CaptureBackend>,
    target: CaptureTarget,
    options: CaptureOptions,
    mut sink: Box<dyn VideoSink>,
    fps: u32,
    should_stop: Arc<AtomicBool>,
    ready_tx: Sender<Result<(), BridgeError>>,
) -> WorkerResult {
    let frame_interval = Duration::from_nanos(1_000_000_000 / fps as u64);
    let start = Instant::now();
    let mut frames_written: u64 = 0;

    // First frame, reported through the readiness channel.
    match backend.capture(&target, &options) {
        Ok(frame) => {
            if let Err(e) = sink.write_frame(&frame, Duration::ZERO) {
                let _ = sink.discard();
                let _ = ready_tx.send(Err(e.into()));
                return Err(BridgeError::Worker("initial frame write failed".into()));
            }
            frames_written += 1;
        }
        Err(e) => {
            let _ = sink.discard();
            let _ = ready_tx.send(Err(e.into()));
            return Err(BridgeError::Worker("initial capture failed".into()));
        }
    }
    let _ = ready_tx.send(Ok(()));

    let mut next_tick = start + frame_interval;
    while !should_stop.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now < next_tick {
            thread::sleep(next_tick - now);
        }
        next_tick += frame_interval;

        if should_stop.load(Ordering::SeqCst) {
            break;
        }

        let frame = match backend.capture(&target, &options) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("capture failed mid-recording: {e}");
                let _ = sink.discard();
                return Err(e.into());
            }
        };
        if let Err(e) = sink.write_frame(&frame, start.elapsed()) {
            warn!("sink write failed mid-recording: {e}");
            let _ = sink.discard();
            return Err(e.into());
        }
        frames_written += 1;
    }

    debug!(frames = frames_written, "recording worker stopping");
    Ok(sink)
}
