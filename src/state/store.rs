/// The store: single owner of the state tree
///
/// Every mutation goes through `Store::send`. Loads run elsewhere (the
/// returned futures are handed to the executor) and come back as ordinary
/// actions through `send`, so state is only ever touched by one writer.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

use super::attachment::{AttachmentAction, LoadRequest};
use super::root::{Effect, RootAction, RootState};
use crate::config::AppConfig;
use crate::photo::decode::ThumbnailDecoder;
use crate::photo::error::LoadError;
use crate::photo::library::FsPhotoLibrary;
use crate::photo::{DecodedImage, ImageDecoder, PhotoLibrary, PhotoReference};

/// A load in progress; resolves to the completion action to send back
pub type PendingLoad = BoxFuture<'static, RootAction>;

/// Capabilities injected into the store
#[derive(Clone)]
pub struct Environment {
    library: Arc<dyn PhotoLibrary>,
    decoder: Arc<dyn ImageDecoder>,
}

impl Environment {
    pub fn new(
        library: impl PhotoLibrary + 'static,
        decoder: impl ImageDecoder + 'static,
    ) -> Self {
        Self {
            library: Arc::new(library),
            decoder: Arc::new(decoder),
        }
    }

    /// Filesystem library and image-crate decoder
    pub fn live(config: &AppConfig) -> Self {
        Self::new(FsPhotoLibrary, ThumbnailDecoder::new(config.thumbnail_size))
    }
}

/// Fetch the bytes of a photo, then decode them on a blocking worker
pub async fn load_photo(env: Environment, photo: PhotoReference) -> Result<DecodedImage, LoadError> {
    let bytes = env.library.fetch(&photo).await?;

    // Decoding is CPU-bound
    let decoder = Arc::clone(&env.decoder);
    let decoded = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
        .await
        .map_err(|e| LoadError::Worker(e.to_string()))??;

    Ok(decoded)
}

pub struct Store {
    state: RootState,
    env: Environment,
}

impl Store {
    pub fn new(env: Environment) -> Self {
        Self {
            state: RootState::new(),
            env,
        }
    }

    pub fn state(&self) -> &RootState {
        &self.state
    }

    /// Apply an action; returns the load it started, if any
    pub fn send(&mut self, action: RootAction) -> Option<PendingLoad> {
        match self.state.reduce(action) {
            Effect::None => None,
            Effect::Load(request) => Some(self.perform(request)),
        }
    }

    /// Apply an action the way the UI does: after a reconciliation every
    /// newly visible attachment is activated. Returns all loads started.
    pub fn dispatch(&mut self, action: RootAction) -> Vec<PendingLoad> {
        let reconciles = action.reconciles();

        let mut loads: Vec<PendingLoad> = self.send(action).into_iter().collect();
        if reconciles {
            loads.extend(self.activate_pending());
        }
        loads
    }

    /// Activate every attachment that has not started loading
    pub fn activate_pending(&mut self) -> Vec<PendingLoad> {
        self.state
            .pending_activation()
            .into_iter()
            .filter_map(|id| self.send(RootAction::Attachment(id, AttachmentAction::Activate)))
            .collect()
    }

    fn perform(&self, request: LoadRequest) -> PendingLoad {
        let env = self.env.clone();
        let LoadRequest { id, ticket, photo } = request;

        async move {
            let result = load_photo(env, photo).await;
            RootAction::Attachment(id, AttachmentAction::LoadCompleted { ticket, result })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::decode::png_fixture;
    use crate::photo::error::FetchError;
    use crate::photo::PhotoId;
    use crate::state::attachment::LoadStatus;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Library that replays scripted responses per photo and counts fetches
    #[derive(Default)]
    struct ScriptedLibrary {
        responses: Mutex<HashMap<PhotoId, VecDeque<Result<Vec<u8>, FetchError>>>>,
        fetches: Arc<AtomicUsize>,
    }

    impl ScriptedLibrary {
        fn respond(self, id: &str, response: Result<Vec<u8>, FetchError>) -> Self {
            self.responses
                .lock()
                .unwrap()
                .entry(PhotoId::new(id))
                .or_default()
                .push_back(response);
            self
        }
    }

    #[async_trait]
    impl PhotoLibrary for ScriptedLibrary {
        async fn fetch(&self, photo: &PhotoReference) -> Result<Vec<u8>, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .get_mut(photo.id())
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| Err(FetchError::NotFound(photo.path().to_path_buf())))
        }
    }

    fn photo(id: &str) -> PhotoReference {
        PhotoReference::new(PhotoId::new(id), format!("/photos/{id}.png"))
    }

    fn store(library: ScriptedLibrary) -> (Store, Arc<AtomicUsize>) {
        let fetches = Arc::clone(&library.fetches);
        let store = Store::new(Environment::new(library, ThumbnailDecoder::default()));
        (store, fetches)
    }

    fn status<'a>(store: &'a Store, id: &str) -> &'a LoadStatus {
        store.state().attachment(&PhotoId::new(id)).unwrap().status()
    }

    fn activate(id: &str) -> RootAction {
        RootAction::Attachment(PhotoId::new(id), AttachmentAction::Activate)
    }

    #[tokio::test]
    async fn loaded_photo_survives_reselection() {
        let library = ScriptedLibrary::default()
            .respond("a", Ok(png_fixture(3, 2)))
            .respond("b", Ok(png_fixture(2, 2)));
        let (mut store, _) = store(library);

        store.send(RootAction::SelectionChanged(vec![photo("a"), photo("b")]));
        assert_eq!(status(&store, "a"), &LoadStatus::Unstarted);
        assert_eq!(status(&store, "b"), &LoadStatus::Unstarted);

        let mut loads = store.activate_pending();
        assert_eq!(loads.len(), 2);
        let load_b = loads.pop().unwrap();
        let load_a = loads.pop().unwrap();

        let completion = load_a.await;
        store.send(completion);
        assert!(matches!(status(&store, "a"), LoadStatus::Finished(image) if image.width == 3));

        store.send(RootAction::SelectionChanged(vec![photo("b"), photo("c")]));
        assert!(store.state().attachment(&PhotoId::new("a")).is_none());
        assert_eq!(status(&store, "b"), &LoadStatus::Loading);
        assert_eq!(status(&store, "c"), &LoadStatus::Unstarted);

        let completion = load_b.await;
        store.send(completion);
        assert!(matches!(status(&store, "b"), LoadStatus::Finished(_)));
    }

    #[tokio::test]
    async fn failed_load_recovers_on_reactivation() {
        let library = ScriptedLibrary::default()
            .respond("d", Ok(b"plain text, not an image".to_vec()))
            .respond("d", Ok(png_fixture(4, 4)));
        let (mut store, fetches) = store(library);
        store.send(RootAction::SelectionChanged(vec![photo("d")]));

        let completion = store.send(activate("d")).unwrap().await;
        assert!(matches!(
            &completion,
            RootAction::Attachment(_, AttachmentAction::LoadCompleted { result: Err(_), .. })
        ));
        store.send(completion);
        assert_eq!(status(&store, "d"), &LoadStatus::Failed);

        let retry = store.send(activate("d")).unwrap();
        assert_eq!(status(&store, "d"), &LoadStatus::Loading);
        store.send(retry.await);

        assert!(matches!(status(&store, "d"), LoadStatus::Finished(_)));
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn repeated_activation_fetches_once() {
        let library = ScriptedLibrary::default().respond("a", Ok(png_fixture(1, 1)));
        let (mut store, fetches) = store(library);
        store.send(RootAction::SelectionChanged(vec![photo("a")]));

        let load = store.send(activate("a")).unwrap();
        assert!(store.send(activate("a")).is_none());
        assert!(store.activate_pending().is_empty());

        store.send(load.await);
        assert!(store.send(activate("a")).is_none());
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn completion_for_deselected_photo_is_discarded() {
        let library = ScriptedLibrary::default().respond("a", Ok(png_fixture(1, 1)));
        let (mut store, _) = store(library);
        store.send(RootAction::SelectionChanged(vec![photo("a"), photo("b")]));
        let load = store.send(activate("a")).unwrap();

        store.send(RootAction::RemovePhoto(PhotoId::new("a")));
        assert!(store.send(load.await).is_none());

        assert!(store.state().attachment(&PhotoId::new("a")).is_none());
        assert_eq!(store.state().selection().len(), 1);
    }

    #[tokio::test]
    async fn stale_completion_does_not_reach_a_reselected_photo() {
        let library = ScriptedLibrary::default().respond("a", Ok(png_fixture(1, 1)));
        let (mut store, _) = store(library);
        store.send(RootAction::SelectionChanged(vec![photo("a")]));
        let stale = store.send(activate("a")).unwrap();

        store.send(RootAction::Clear);
        store.send(RootAction::SelectionChanged(vec![photo("a")]));
        store.send(stale.await);

        assert_eq!(status(&store, "a"), &LoadStatus::Unstarted);
    }

    #[test]
    fn only_reconciling_actions_activate_new_attachments() {
        let (mut store, fetches) = store(ScriptedLibrary::default());

        // Reconciled without activation, so "a" and "b" stay pending
        store.send(RootAction::SelectionChanged(vec![photo("a"), photo("b")]));
        let edit = RootAction::Attachment(
            PhotoId::new("a"),
            AttachmentAction::DescriptionChanged("harbour".into()),
        );
        assert!(store.dispatch(edit).is_empty());
        assert_eq!(store.state().pending_activation().len(), 2);

        assert_eq!(store.dispatch(RootAction::RemovePhoto(PhotoId::new("b"))).len(), 1);
        assert_eq!(status(&store, "a"), &LoadStatus::Loading);

        assert_eq!(
            store
                .dispatch(RootAction::SelectionChanged(vec![photo("a"), photo("c")]))
                .len(),
            1
        );
        assert_eq!(status(&store, "c"), &LoadStatus::Loading);

        assert!(store.dispatch(RootAction::Clear).is_empty());
        // Loads were only created, never polled
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reconciling_actions_are_selection_changes() {
        assert!(RootAction::SelectionChanged(Vec::new()).reconciles());
        assert!(RootAction::RemovePhoto(PhotoId::new("a")).reconciles());
        assert!(RootAction::Clear.reconciles());
        assert!(!RootAction::Attachment(PhotoId::new("a"), AttachmentAction::Activate).reconciles());
    }

    #[tokio::test]
    async fn missing_photo_fails_with_fetch_error() {
        let env = Environment::new(ScriptedLibrary::default(), ThumbnailDecoder::default());

        let result = load_photo(env, photo("ghost")).await;
        assert!(matches!(result, Err(LoadError::Fetch(FetchError::NotFound(_)))));
    }
}
