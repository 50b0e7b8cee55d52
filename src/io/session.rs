use crate::identification::IdentificationContext;
use crate::progress::{NoProgress, ProgressHandle};
use crate::settings::ExportSettings;

use super::registry::IdentifierRegistry;
use super::{ExportError, ExportResult, ExportSummary};

static NO_PROGRESS: NoProgress = NoProgress;

/// The state of a single export run: what it reads from, how it is configured,
/// the identifiers it has handed out and what it has written so far.
pub struct ExportSession<'a> {
    pub context: IdentificationContext<'a>,
    pub settings: &'a ExportSettings,
    pub progress: &'a dyn ProgressHandle,
    pub registry: IdentifierRegistry,
    pub summary: ExportSummary,
}

impl<'a> ExportSession<'a> {
    pub fn new(context: IdentificationContext<'a>, settings: &'a ExportSettings) -> Self {
        Self {
            context,
            settings,
            progress: &NO_PROGRESS,
            registry: IdentifierRegistry::new(),
            summary: ExportSummary::default(),
        }
    }

    pub fn set_progress(&mut self, progress: &'a dyn ProgressHandle) {
        self.progress = progress;
    }

    /// Stop with [`ExportError::Cancelled`] if cancellation was requested
    pub fn checkpoint(&self) -> ExportResult {
        if self.progress.is_cancelled() {
            Err(ExportError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Count one finished item
    pub fn tick(&self) {
        self.progress.increment();
    }

    pub fn begin_phase(&self, size: usize) {
        self.progress.set_maximum(size);
    }
}

impl std::fmt::Debug for ExportSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportSession")
            .field("context", &self.context)
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("summary", &self.summary)
            .finish_non_exhaustive()
    }
}
