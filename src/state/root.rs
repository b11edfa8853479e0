/// Root of the state tree
///
/// Owns the current photo selection and one attachment per selected photo.
/// Attachment actions are addressed by photo id and forwarded to the
/// matching child; actions for photos that are no longer selected are
/// dropped.

use super::attachment::{AttachmentAction, AttachmentState, LoadRequest, LoadStatus};
use super::identified::IdentifiedVec;
use crate::photo::{PhotoId, PhotoReference};

#[derive(Debug, Clone)]
pub enum RootAction {
    /// The picker produced a new selection
    SelectionChanged(Vec<PhotoReference>),
    RemovePhoto(PhotoId),
    Clear,
    Attachment(PhotoId, AttachmentAction),
}

impl RootAction {
    /// Whether this action rebuilds the attachment collection
    pub fn reconciles(&self) -> bool {
        match self {
            RootAction::SelectionChanged(_) | RootAction::RemovePhoto(_) | RootAction::Clear => true,
            RootAction::Attachment(..) => false,
        }
    }
}

/// Work the reducer asks its owner to perform
#[derive(Debug, Clone)]
pub enum Effect {
    None,
    Load(LoadRequest),
}

/// Counts shown in the status line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub loading: usize,
    pub finished: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct RootState {
    selection: Vec<PhotoReference>,
    attachments: IdentifiedVec<PhotoId, AttachmentState>,
    /// Last instance number handed to a new attachment
    last_instance: u64,
}

impl RootState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &[PhotoReference] {
        &self.selection
    }

    pub fn attachments(&self) -> impl Iterator<Item = &AttachmentState> {
        self.attachments.values()
    }

    pub fn attachment(&self, id: &PhotoId) -> Option<&AttachmentState> {
        self.attachments.get(id)
    }

    pub fn reduce(&mut self, action: RootAction) -> Effect {
        match action {
            RootAction::SelectionChanged(selection) => {
                self.selection_changed(selection);
                Effect::None
            }
            RootAction::RemovePhoto(id) => {
                self.remove_photo(&id);
                Effect::None
            }
            RootAction::Clear => {
                self.clear();
                Effect::None
            }
            RootAction::Attachment(id, action) => match self.attachments.get_mut(&id) {
                Some(attachment) => match attachment.reduce(action) {
                    Some(request) => Effect::Load(request),
                    None => Effect::None,
                },
                None => {
                    tracing::debug!(photo = %id, "dropping action for deselected photo");
                    Effect::None
                }
            },
        }
    }

    /// Rebuild the attachments to match `new_selection`.
    ///
    /// Attachments for photos that stay selected are moved over untouched,
    /// new photos get a fresh unstarted attachment, and the rest are
    /// dropped. A photo listed twice keeps its first position; the last
    /// listed reference wins.
    pub fn selection_changed(&mut self, new_selection: Vec<PhotoReference>) {
        let selection =
            IdentifiedVec::from_iter_last_wins(new_selection, |photo| photo.id().clone());

        // Old attachments are looked up by key only; the order is rebuilt below
        let mut previous = std::mem::take(&mut self.attachments).into_map();
        let mut attachments = IdentifiedVec::new();
        let mut created = 0;

        for (id, photo) in selection.iter() {
            let attachment = match previous.remove(id) {
                Some(existing) => existing,
                None => {
                    created += 1;
                    self.last_instance += 1;
                    AttachmentState::new(photo.clone(), self.last_instance)
                }
            };
            attachments.insert(id.clone(), attachment);
        }

        // Anything left in `previous` was deselected; its in-flight load,
        // if any, will be dead-lettered on delivery
        let orphaned = previous
            .values()
            .filter(|attachment| matches!(attachment.status(), LoadStatus::Loading))
            .count();

        tracing::info!(
            selected = attachments.len(),
            created,
            dropped = previous.len(),
            orphaned,
            "selection reconciled"
        );

        self.selection = selection.into_values();
        self.attachments = attachments;
    }

    pub fn remove_photo(&mut self, id: &PhotoId) {
        let remaining = self
            .selection
            .iter()
            .filter(|photo| photo.id() != id)
            .cloned()
            .collect();
        self.selection_changed(remaining);
    }

    pub fn clear(&mut self) {
        self.selection_changed(Vec::new());
    }

    /// Attachments that have not started loading yet
    pub fn pending_activation(&self) -> Vec<PhotoId> {
        self.attachments
            .iter()
            .filter(|(_, attachment)| matches!(attachment.status(), LoadStatus::Unstarted))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn summary(&self) -> Summary {
        self.attachments
            .values()
            .fold(Summary::default(), |mut summary, attachment| {
                summary.total += 1;
                match attachment.status() {
                    LoadStatus::Loading => summary.loading += 1,
                    LoadStatus::Finished(_) => summary.finished += 1,
                    LoadStatus::Failed => summary.failed += 1,
                    LoadStatus::Unstarted => {}
                }
                summary
            })
    }
}
