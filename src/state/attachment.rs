/// Per-photo attachment state
///
/// Each attachment owns one photo reference, the status of its image load
/// and the description the user typed for it. Loads are guarded so that at
/// most one is in flight, and every completion carries the ticket it was
/// issued with so late or foreign completions can be told apart.

use crate::photo::error::LoadError;
use crate::photo::{DecodedImage, PhotoId, PhotoReference};

/// Where the image for an attachment is in its load cycle
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Unstarted,
    Loading,
    Finished(DecodedImage),
    Failed,
}

/// Identifies one load attempt of one attachment instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    instance: u64,
    attempt: u32,
}

/// A fetch the caller must perform on behalf of an attachment
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub id: PhotoId,
    pub ticket: LoadTicket,
    pub photo: PhotoReference,
}

#[derive(Debug, Clone)]
pub enum AttachmentAction {
    /// The attachment became visible / is ready to load
    Activate,
    DescriptionChanged(String),
    LoadCompleted {
        ticket: LoadTicket,
        result: Result<DecodedImage, LoadError>,
    },
}

#[derive(Debug, Clone)]
pub struct AttachmentState {
    photo: PhotoReference,
    status: LoadStatus,
    description: String,
    /// Unique per constructed attachment, assigned by the root
    instance: u64,
    attempts: u32,
    in_flight: Option<LoadTicket>,
}

impl AttachmentState {
    pub fn new(photo: PhotoReference, instance: u64) -> Self {
        Self {
            photo,
            status: LoadStatus::Unstarted,
            description: String::new(),
            instance,
            attempts: 0,
            in_flight: None,
        }
    }

    pub fn id(&self) -> &PhotoId {
        self.photo.id()
    }

    pub fn photo(&self) -> &PhotoReference {
        &self.photo
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    #[cfg(test)]
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Apply one action. Returns the load to issue, if the action started one.
    pub fn reduce(&mut self, action: AttachmentAction) -> Option<LoadRequest> {
        match action {
            AttachmentAction::Activate => self.activate(),
            AttachmentAction::DescriptionChanged(text) => {
                self.set_description(text);
                None
            }
            AttachmentAction::LoadCompleted { ticket, result } => {
                self.load_completed(ticket, result);
                None
            }
        }
    }

    /// Start a load unless one is running or the image is already there
    pub fn activate(&mut self) -> Option<LoadRequest> {
        match self.status {
            LoadStatus::Loading | LoadStatus::Finished(_) => None,
            LoadStatus::Unstarted | LoadStatus::Failed => {
                self.attempts += 1;
                let ticket = LoadTicket {
                    instance: self.instance,
                    attempt: self.attempts,
                };
                self.in_flight = Some(ticket);
                self.status = LoadStatus::Loading;

                tracing::debug!(photo = %self.id(), attempt = self.attempts, "load started");
                Some(LoadRequest {
                    id: self.id().clone(),
                    ticket,
                    photo: self.photo.clone(),
                })
            }
        }
    }

    /// Apply the outcome of a load. Completions for any ticket other than
    /// the one in flight are dropped.
    pub fn load_completed(&mut self, ticket: LoadTicket, result: Result<DecodedImage, LoadError>) {
        if self.in_flight != Some(ticket) {
            tracing::debug!(photo = %self.id(), "dropping stale load completion");
            return;
        }
        self.in_flight = None;

        self.status = match result {
            Ok(image) => {
                tracing::info!(
                    photo = %self.id(),
                    width = image.width,
                    height = image.height,
                    "photo loaded"
                );
                LoadStatus::Finished(image)
            }
            Err(e) => {
                tracing::warn!(photo = %self.id(), error = %e, "photo failed to load");
                LoadStatus::Failed
            }
        };
    }

    pub fn set_description(&mut self, text: String) {
        self.description = text;
    }
}
