//! Upload lifecycle controller
//!
//! Owns the single `UploadState` of a session and drives it through
//! Idle → FileSelected → Uploading → Succeeded/Failed.
//!
//! `submit` releases the state lock while the transport call is pending, so
//! `state`, `view`, `reset` and `select_file` stay usable and can observe
//! `Uploading`. Every submission carries a generation number; `reset` and
//! `select_file` bump it, and a response whose generation is no longer current
//! is dropped on arrival.
//!
//! At most one transport call is outstanding per controller. The in-flight
//! flag outlives a reset or reselection, so a new `submit` is refused until
//! the pending call has returned or been dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::config::DisplayConfig;
use crate::error::{Error, Result, UPLOAD_FAILED_MESSAGE};
use crate::models::{ReceiptFile, UploadPhase, UploadState};
use crate::projector::{project, ViewModel};
use crate::transport::{AnalysisTransport, TransportClient};

/// How a submission that reached the transport ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The analysis was stored
    Succeeded,
    /// The error message was stored
    Failed,
    /// A reset or reselection happened meanwhile; the response was dropped
    Discarded,
}

struct Inner {
    state: UploadState,
    generation: u64,
    /// A transport call is pending, whatever its generation
    in_flight: bool,
}

impl Inner {
    /// Invalidate any in-flight submission
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// Upload state controller
pub struct UploadController<T = TransportClient> {
    transport: T,
    display: DisplayConfig,
    inner: Mutex<Inner>,
}

impl<T: AnalysisTransport> UploadController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            display: DisplayConfig::default(),
            inner: Mutex::new(Inner {
                state: UploadState::default(),
                generation: 0,
                in_flight: false,
            }),
        }
    }

    /// Use custom display settings for `view`
    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.display = display;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current state
    pub fn state(&self) -> UploadState {
        self.lock().state.clone()
    }

    pub fn phase(&self) -> UploadPhase {
        self.lock().state.phase
    }

    /// Whether a transport call is still pending
    pub fn is_in_flight(&self) -> bool {
        self.lock().in_flight
    }

    /// Hold `candidate` if it is an image
    ///
    /// A rejected candidate only sets the error message: the previously held
    /// file, result and phase stay as they were.
    pub fn select_file(&self, candidate: ReceiptFile) -> Result<()> {
        let mut inner = self.lock();

        if !candidate.is_image() {
            let err = Error::InvalidFileType(candidate.mime_type.clone());
            debug!(file = %candidate.name, mime = %candidate.mime_type, "Rejected non-image file");
            inner.state.error_message = Some(err.user_message());
            return Err(err);
        }

        let generation = inner.bump();
        debug!(
            file = %candidate.name,
            mime = %candidate.mime_type,
            generation,
            "Receipt selected"
        );
        inner.state.file = Some(candidate);
        inner.state.result = None;
        inner.state.error_message = None;
        inner.state.phase = UploadPhase::FileSelected;
        Ok(())
    }

    /// Select the first of a list of files (picker or drop)
    ///
    /// Returns `Ok(false)` without touching state when the list is empty.
    pub fn select_first<I>(&self, files: I) -> Result<bool>
    where
        I: IntoIterator<Item = ReceiptFile>,
    {
        match files.into_iter().next() {
            Some(file) => self.select_file(file).map(|_| true),
            None => Ok(false),
        }
    }

    /// Send the held file to the analysis service
    ///
    /// Fails with `MissingFile` when nothing is held and with
    /// `UploadInProgress` while another submission is pending; neither calls
    /// the transport. Once the transport is called, every failure is recorded
    /// in the state and the call returns `Ok`.
    pub async fn submit(&self) -> Result<SubmitOutcome> {
        let (file, generation) = {
            let mut inner = self.lock();

            if inner.in_flight || inner.state.is_uploading() {
                warn!("Submit ignored: upload already in progress");
                return Err(Error::UploadInProgress);
            }

            let Some(file) = inner.state.file.clone() else {
                let err = Error::MissingFile;
                inner.state.error_message = Some(err.user_message());
                return Err(err);
            };

            let generation = inner.bump();
            inner.in_flight = true;
            inner.state.error_message = None;
            inner.state.result = None;
            inner.state.phase = UploadPhase::Uploading;
            (file, generation)
        };

        info!(
            file = %file.name,
            size = file.size(),
            content_hash = %file.content_hash(),
            generation,
            endpoint = %self.transport.endpoint(),
            "Submitting receipt"
        );

        let mut guard = InFlight {
            inner: &self.inner,
            generation,
            armed: true,
        };

        let outcome = self.transport.send(&file).await.and_then(|result| {
            if result.success {
                Ok(result)
            } else {
                Err(Error::ServiceRejected(result.error_message))
            }
        });

        guard.armed = false;
        let mut inner = self.lock();
        inner.in_flight = false;

        if inner.generation != generation {
            warn!(
                generation,
                current = inner.generation,
                "Discarding stale analysis response"
            );
            return Ok(SubmitOutcome::Discarded);
        }

        match outcome {
            Ok(result) => {
                info!(
                    generation,
                    items = result.items().len(),
                    "Receipt analysis succeeded"
                );
                inner.state.result = Some(result);
                inner.state.error_message = None;
                inner.state.phase = UploadPhase::Succeeded;
                Ok(SubmitOutcome::Succeeded)
            }
            Err(e) => {
                warn!(generation, error = %e, "Receipt analysis failed");
                inner.state.error_message = Some(e.user_message());
                inner.state.phase = UploadPhase::Failed;
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    /// Clear file, result and error and return to Idle
    ///
    /// A pending submission keeps running; its response will be discarded.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let generation = inner.bump();
        debug!(generation, from = %inner.state.phase, "Upload state reset");
        inner.state = UploadState::default();
    }

    /// Aggregate and project the current state for rendering
    pub fn view(&self) -> ViewModel {
        let (state, in_flight) = {
            let inner = self.lock();
            (inner.state.clone(), inner.in_flight)
        };
        let categories = state.analysis().map(|a| aggregate(&a.items));
        let mut view = project(&state, categories.as_ref(), &self.display);
        // A discarded call still blocks new submissions until it returns
        view.can_submit &= !in_flight;
        view
    }
}

/// Moves a dropped (cancelled) submission out of `Uploading`
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    generation: u64,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.in_flight = false;
        if inner.generation == self.generation && inner.state.is_uploading() {
            warn!(generation = self.generation, "Submission dropped before completion");
            inner.state.phase = UploadPhase::Failed;
            inner.state.error_message = Some(UPLOAD_FAILED_MESSAGE.to_string());
        }
    }
}

/// Drag-hover flag for a drop area
///
/// Presentation only: toggling it never touches `UploadState`. Dropped files
/// go through the same `select_first` path as the file picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropZone {
    active: bool,
}

impl DropZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn drag_enter(&mut self) {
        self.active = true;
    }

    pub fn drag_over(&mut self) {
        self.active = true;
    }

    pub fn drag_leave(&mut self) {
        self.active = false;
    }

    /// Clear the hover flag and select the first dropped file
    pub fn drop_files<T, I>(&mut self, controller: &UploadController<T>, files: I) -> Result<bool>
    where
        T: AnalysisTransport,
        I: IntoIterator<Item = ReceiptFile>,
    {
        self.active = false;
        controller.select_first(files)
    }
}
