//! The upload/analysis controller.
//!
//! [`Workflow`] is the single owner of everything that changes while the
//! interface runs: the two pending files, the submission state, the installed
//! result and the block selection. Renderers only ever see shared references.

use std::{fmt, sync::Arc};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{Error, MissingFile, Result},
    render::{BlockView, TranscriptSection, block_title, render_block_view, render_transcripts},
    selection::Selection,
    service::{AnalysisService, PendingFile, UploadRequest},
    types::{AnalysisResult, ContentBlock},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    InFlight {
        id: Uuid,
    },
    Succeeded,
    Failed {
        message: String,
    },
}

/// Which page layout the front end should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    UploadOnly,
    /// Upload form next to the results pane.
    Split,
}

/// An installed result together with its selection. Replaced as one value so
/// a new result can never be observed with a stale selection.
#[derive(Debug, Clone)]
pub struct ResultSession {
    result: Arc<AnalysisResult>,
    selection: Selection,
}

impl ResultSession {
    fn new(result: Arc<AnalysisResult>) -> Self {
        let selection = Selection::new(result.contents.len());
        Self { result, selection }
    }

    pub fn result(&self) -> &Arc<AnalysisResult> {
        &self.result
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_block(&self) -> Option<(usize, &ContentBlock)> {
        let index = self.selection.current()?;
        self.result.contents.get(index).map(|block| (index, block))
    }

    /// Field presentation of the focused block only.
    pub fn selected_view(&self) -> Option<BlockView> {
        self.selected_block()
            .map(|(index, block)| render_block_view(index, block))
    }

    /// Narrative of every block, regardless of selection.
    pub fn transcripts(&self) -> Vec<TranscriptSection> {
        render_transcripts(&self.result.contents)
    }

    pub fn block_titles(&self) -> Vec<String> {
        self.result
            .contents
            .iter()
            .enumerate()
            .map(|(index, block)| block_title(index, block))
            .collect()
    }
}

/// A started submission: the request to send and the id to complete it with.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: Uuid,
    pub request: UploadRequest,
}

#[derive(Debug, Default)]
pub struct Workflow {
    video: Option<PendingFile>,
    schema: Option<PendingFile>,
    state: SubmissionState,
    session: Option<ResultSession>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_video(&mut self, file: PendingFile) {
        self.video = Some(file);
    }

    pub fn select_schema(&mut self, file: PendingFile) {
        self.schema = Some(file);
    }

    pub fn video(&self) -> Option<&PendingFile> {
        self.video.as_ref()
    }

    pub fn schema(&self) -> Option<&PendingFile> {
        self.schema.as_ref()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, SubmissionState::InFlight { .. })
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.is_in_flight()
    }

    pub fn layout(&self) -> Layout {
        match self.session {
            Some(_) => Layout::Split,
            None => Layout::UploadOnly,
        }
    }

    pub fn session(&self) -> Option<&ResultSession> {
        self.session.as_ref()
    }

    /// Check preconditions and move to `InFlight`. On error nothing changes
    /// and no request may be sent.
    pub fn begin_submit(&mut self) -> Result<Submission> {
        if self.is_in_flight() {
            return Err(Error::SubmissionInFlight);
        }

        let (video, schema) = match (&self.video, &self.schema) {
            (Some(video), Some(schema)) => (video.clone(), schema.clone()),
            (None, Some(_)) => {
                return Err(Error::MissingInput {
                    missing: MissingFile::Video,
                });
            }
            (Some(_), None) => {
                return Err(Error::MissingInput {
                    missing: MissingFile::Schema,
                });
            }
            (None, None) => {
                return Err(Error::MissingInput {
                    missing: MissingFile::Both,
                });
            }
        };

        let id = Uuid::new_v4();
        info!(
            %id,
            video = %video.path().display(),
            schema = %schema.path().display(),
            "submitting for analysis"
        );
        self.state = SubmissionState::InFlight { id };

        Ok(Submission {
            id,
            request: UploadRequest { video, schema },
        })
    }

    /// Resolve the in-flight submission `id`. Returns `false` (and changes
    /// nothing) if `id` is not the submission currently in flight.
    pub fn complete<R, E>(&mut self, id: Uuid, outcome: std::result::Result<R, E>) -> bool
    where
        R: Into<Arc<AnalysisResult>>,
        E: fmt::Display,
    {
        if self.state != (SubmissionState::InFlight { id }) {
            warn!(
                %id,
                state = ?self.state,
                "ignoring completion of a submission that is not in flight"
            );
            return false;
        }

        match outcome {
            Ok(result) => {
                let result = result.into();
                info!(%id, blocks = result.contents.len(), "analysis result installed");
                self.session = Some(ResultSession::new(result));
                self.state = SubmissionState::Succeeded;
            }
            Err(e) => {
                warn!(%id, error = %e, "analysis failed");
                self.state = SubmissionState::Failed {
                    message: e.to_string(),
                };
            }
        }
        true
    }

    /// Submit the pending files and wait for the service. On failure the
    /// previous result, if any, stays installed.
    pub async fn submit<S: AnalysisService>(&mut self, service: &S) -> Result<&ResultSession> {
        let submission = self.begin_submit()?;

        match service.analyze(submission.request).await {
            Ok(result) => {
                self.complete(submission.id, Ok::<_, Error>(result));
                self.session.as_ref().ok_or(Error::NoResult)
            }
            Err(e) => {
                self.complete(submission.id, Err::<AnalysisResult, _>(&e));
                Err(e)
            }
        }
    }

    pub fn select(&mut self, index: usize) -> Result<()> {
        self.session
            .as_mut()
            .ok_or(Error::NoResult)?
            .selection
            .select(index)
    }

    pub fn select_next(&mut self) -> Option<usize> {
        self.session.as_mut()?.selection.next()
    }

    pub fn select_previous(&mut self) -> Option<usize> {
        self.session.as_mut()?.selection.previous()
    }

    /// Clear a failure message, back to `Idle`.
    pub fn dismiss_error(&mut self) {
        if matches!(self.state, SubmissionState::Failed { .. }) {
            self.state = SubmissionState::Idle;
        }
    }
}
