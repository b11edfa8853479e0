/// State management module
///
/// This module holds the application state tree:
/// - Ordered keyed collection used for attachments (identified.rs)
/// - Per-photo load state machine and description (attachment.rs)
/// - Selection reconciliation and action routing (root.rs)
/// - Single-writer store wiring reducers to the photo capabilities (store.rs)

pub mod attachment;
pub mod identified;
pub mod root;
pub mod store;
