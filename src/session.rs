use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::catalog::{find_style, StyleOption};
use crate::config::PROCESSING_MESSAGE;
use crate::llm::gemini::{StyleTransfer, StyleTransferError};
use crate::llm::media::{InlineImage, InvalidDataUri};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Unknown hairstyle '{0}'")]
    UnknownStyle(String),
    #[error(transparent)]
    InvalidImage(#[from] InvalidDataUri),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProcessingStatus {
    #[default]
    Idle,
    Processing {
        message: String,
    },
    Success,
    Error {
        message: String,
    },
}

impl ProcessingStatus {
    pub fn is_processing(&self) -> bool {
        matches!(self, ProcessingStatus::Processing { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ProcessingStatus::Processing { message } | ProcessingStatus::Error { message } => {
                Some(message.as_str())
            }
            ProcessingStatus::Idle | ProcessingStatus::Success => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ProcessingStatus::Idle => "idle",
            ProcessingStatus::Processing { .. } => "processing",
            ProcessingStatus::Success => "success",
            ProcessingStatus::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageAsset {
    pub original: Option<InlineImage>,
    pub edited: Option<InlineImage>,
}

/// Everything needed to run one transfer outside the session borrow.
///
/// The generation ties the eventual result back to the session state it was
/// issued from; a reset or a new upload in between makes it stale.
#[derive(Debug, Clone)]
pub struct TransferTicket {
    generation: u64,
    source: InlineImage,
    style: &'static StyleOption,
}

impl TransferTicket {
    pub fn source(&self) -> &InlineImage {
        &self.source
    }

    pub fn style(&self) -> &'static StyleOption {
        self.style
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Guard rejected the trigger; nothing was sent.
    Ignored,
    /// Result arrived for a session state that no longer exists.
    Stale,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Default)]
pub struct Session {
    images: ImageAsset,
    selected_style: Option<&'static StyleOption>,
    status: ProcessingStatus,
    generation: u64,
    in_flight: Option<u64>,
}

pub type SharedSession = Arc<Mutex<Session>>;

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn images(&self) -> &ImageAsset {
        &self.images
    }

    pub fn selected_style(&self) -> Option<&'static StyleOption> {
        self.selected_style
    }

    pub fn status(&self) -> &ProcessingStatus {
        &self.status
    }

    pub fn select_image(&mut self, data_uri: &str) -> Result<(), SessionError> {
        let original = InlineImage::parse_data_uri(data_uri)?;
        self.replace_original(original);
        Ok(())
    }

    pub fn select_inline_image(&mut self, original: InlineImage) {
        self.replace_original(original);
    }

    fn replace_original(&mut self, original: InlineImage) {
        // The running request keeps the session in `Processing` until it settles,
        // so no second request can start; its result is dropped as stale.
        if self.status.is_processing() {
            info!("New portrait uploaded while a transfer was in flight; its result will be discarded");
        } else {
            self.status = ProcessingStatus::Idle;
        }
        debug!(
            mime_type = %original.mime_type,
            data_len = original.data.len(),
            "portrait selected"
        );
        self.images = ImageAsset {
            original: Some(original),
            edited: None,
        };
        self.generation += 1;
    }

    pub fn select_style(&mut self, style_id: &str) -> Result<&'static StyleOption, SessionError> {
        let style = find_style(style_id)
            .ok_or_else(|| SessionError::UnknownStyle(style_id.to_string()))?;
        debug!(style = style.id, "hairstyle selected");
        self.selected_style = Some(style);
        Ok(style)
    }

    /// Enters `Processing` and hands out a ticket, or returns `None` when there is
    /// no portrait, no style, or a transfer is already running.
    pub fn begin_apply(&mut self) -> Option<TransferTicket> {
        if self.status.is_processing() {
            debug!("apply ignored: transfer already in flight");
            return None;
        }
        let Some(source) = self.images.original.clone() else {
            debug!("apply ignored: no portrait selected");
            return None;
        };
        let Some(style) = self.selected_style else {
            debug!("apply ignored: no hairstyle selected");
            return None;
        };

        self.status = ProcessingStatus::Processing {
            message: PROCESSING_MESSAGE.to_string(),
        };
        info!(style = style.id, generation = self.generation, "style transfer started");
        self.in_flight = Some(self.generation);
        Some(TransferTicket {
            generation: self.generation,
            source,
            style,
        })
    }

    pub fn complete_apply(
        &mut self,
        ticket: TransferTicket,
        result: Result<InlineImage, StyleTransferError>,
    ) -> ApplyOutcome {
        let owns_status = self.in_flight == Some(ticket.generation);
        if owns_status {
            self.in_flight = None;
        }

        if ticket.generation != self.generation || !self.status.is_processing() {
            if owns_status && self.status.is_processing() {
                self.status = ProcessingStatus::Idle;
            }
            info!(
                ticket_generation = ticket.generation,
                generation = self.generation,
                status = self.status.label(),
                "discarding stale style transfer result"
            );
            return ApplyOutcome::Stale;
        }

        match result {
            Ok(edited) => {
                info!(style = ticket.style.id, mime_type = %edited.mime_type, "style transfer succeeded");
                self.images.edited = Some(edited);
                self.status = ProcessingStatus::Success;
                ApplyOutcome::Succeeded
            }
            Err(err) => {
                warn!(style = ticket.style.id, "AI processing error: {}", err);
                let message = err.user_message();
                self.status = ProcessingStatus::Error {
                    message: message.clone(),
                };
                ApplyOutcome::Failed(message)
            }
        }
    }

    /// Runs one transfer while holding the session exclusively.
    pub async fn apply_style<T>(&mut self, transfer: &T) -> ApplyOutcome
    where
        T: StyleTransfer + ?Sized,
    {
        let Some(ticket) = self.begin_apply() else {
            return ApplyOutcome::Ignored;
        };
        let result = transfer.transfer(ticket.source(), ticket.style().prompt).await;
        self.complete_apply(ticket, result)
    }

    pub fn reset(&mut self) {
        if self.status.is_processing() {
            info!("Session reset while a transfer was in flight; its result will be discarded");
        }
        self.images = ImageAsset::default();
        self.selected_style = None;
        self.status = ProcessingStatus::Idle;
        self.generation += 1;
        self.in_flight = None;
    }
}

/// Like [`Session::apply_style`], but releases the lock while the request is in
/// flight so the host can still reset or re-upload.
pub async fn apply_style_shared<T>(session: &SharedSession, transfer: &T) -> ApplyOutcome
where
    T: StyleTransfer + ?Sized,
{
    let Some(ticket) = session.lock().begin_apply() else {
        return ApplyOutcome::Ignored;
    };
    let result = transfer.transfer(ticket.source(), ticket.style().prompt).await;
    session.lock().complete_apply(ticket, result)
}
