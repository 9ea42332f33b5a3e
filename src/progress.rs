//! Progress event types for synchronization operations.
//!
//! Decouples the engine from presentation: operations push human-readable
//! status strings and busy-flag transitions into a [`ProgressSink`], and
//! never read anything back. Reporting is purely observational — it never
//! gates logic.

use std::sync::Mutex;

/// The three independent busy phases of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The remote tree is being read.
    Fetching,
    /// An uploaded archive is being normalized.
    LoadingArchive,
    /// Changes are being written back to the remote store.
    Pushing,
}

/// Progress events emitted during synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A human-readable status line. Last write wins.
    Status(String),
    /// A phase became busy.
    PhaseStarted(Phase),
    /// A phase finished (successfully or not).
    PhaseFinished(Phase),
}

/// Passive receiver for [`ProgressEvent`]s.
pub trait ProgressSink: Send + Sync {
    /// Receive one event. Implementations must not block.
    fn emit(&self, event: ProgressEvent);
}

/// Sink that discards every event, for callers that don't track progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

#[derive(Debug, Default)]
struct StatusState {
    status: String,
    fetching: bool,
    loading_archive: bool,
    pushing: bool,
}

/// Last-write-wins status display state.
///
/// Keeps the most recent status line and the current busy flags, suitable
/// for rendering a single evolving status message.
#[derive(Debug, Default)]
pub struct StatusLine {
    state: Mutex<StatusState>,
}

impl StatusLine {
    /// Create an idle status line with an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently emitted status message.
    pub fn status(&self) -> String {
        self.lock().status.clone()
    }

    /// Whether the given phase is currently busy.
    pub fn is_busy(&self, phase: Phase) -> bool {
        let state = self.lock();
        match phase {
            Phase::Fetching => state.fetching,
            Phase::LoadingArchive => state.loading_archive,
            Phase::Pushing => state.pushing,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StatusState> {
        // A poisoned status mutex only affects display state; recover it.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProgressSink for StatusLine {
    fn emit(&self, event: ProgressEvent) {
        let mut state = self.lock();
        match event {
            ProgressEvent::Status(message) => state.status = message,
            ProgressEvent::PhaseStarted(phase) => set_flag(&mut state, phase, true),
            ProgressEvent::PhaseFinished(phase) => set_flag(&mut state, phase, false),
        }
    }
}

fn set_flag(state: &mut StatusState, phase: Phase, value: bool) {
    match phase {
        Phase::Fetching => state.fetching = value,
        Phase::LoadingArchive => state.loading_archive = value,
        Phase::Pushing => state.pushing = value,
    }
}
