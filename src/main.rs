use clap::Parser;
use iced::widget::{button, column, container, row, scrollable, text, text_input, Column};
use iced::{widget, Alignment, Element, Length, Task, Theme};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod photo;
mod state;

use config::AppConfig;
use photo::picker;
use photo::PhotoReference;
use state::attachment::{AttachmentAction, AttachmentState, LoadStatus};
use state::root::{RootAction, Summary};
use state::store::{Environment, Store};

/// Width of the preview column in each row
const PREVIEW_WIDTH: f32 = 160.0;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "photo-attachments", version, about = "Attach descriptions to photos")]
struct Args {
    /// Path to a JSON config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Photos to select on startup
    photos: Vec<PathBuf>,
}

/// Main application state
struct PhotoAttachments {
    /// Owner of the selection and the attachments
    store: Store,
    config: AppConfig,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Add Photos"
    AddPhotos,
    /// User clicked "Add Folder"
    AddFolder,
    /// The picker returned (empty when dismissed)
    Picked(Vec<PhotoReference>),
    /// Anything the state tree handles, including load completions
    Store(RootAction),
}

impl PhotoAttachments {
    /// Create a new instance of the application
    fn new(args: Args) -> (Self, Task<Message>) {
        let config = AppConfig::load(args.config.as_deref()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            AppConfig::default()
        });

        let store = Store::new(Environment::live(&config));
        let mut app = PhotoAttachments { store, config };

        let initial: Vec<PhotoReference> = args.photos.iter().map(PhotoReference::from_path).collect();
        tracing::info!(photos = initial.len(), "photo attachments started");

        let task = if initial.is_empty() {
            Task::none()
        } else {
            let selection = picker::merge_selection(&[], initial, app.config.selection_limit);
            app.dispatch(RootAction::SelectionChanged(selection))
        };

        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::AddPhotos => Task::perform(
                picker::pick_photos(self.config.extensions.clone()),
                Message::Picked,
            ),
            Message::AddFolder => {
                Task::perform(picker::pick_folder(self.config.clone()), Message::Picked)
            }
            Message::Picked(picked) => {
                if picked.is_empty() {
                    return Task::none();
                }
                let selection = picker::merge_selection(
                    self.store.state().selection(),
                    picked,
                    self.config.selection_limit,
                );
                self.dispatch(RootAction::SelectionChanged(selection))
            }
            Message::Store(action) => self.dispatch(action),
        }
    }

    /// Send an action to the store and run whatever loads it starts
    fn dispatch(&mut self, action: RootAction) -> Task<Message> {
        Task::batch(
            self.store
                .dispatch(action)
                .into_iter()
                .map(|load| Task::perform(load, Message::Store)),
        )
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let summary = self.store.state().summary();

        let toolbar = row![
            button("Add Photos").on_press(Message::AddPhotos).padding(10),
            button("Add Folder").on_press(Message::AddFolder).padding(10),
            button("Clear")
                .on_press_maybe((summary.total > 0).then_some(Message::Store(RootAction::Clear)))
                .padding(10),
        ]
        .spacing(10);

        let rows = Column::with_children(self.store.state().attachments().map(attachment_row))
            .spacing(16);

        let content = column![
            text("Photo Attachments").size(32),
            toolbar,
            text(status_line(summary)).size(16),
            scrollable(rows).height(Length::Fill),
        ]
        .spacing(20)
        .padding(24);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// One row: preview (or its status), file name, description, remove button
fn attachment_row(attachment: &AttachmentState) -> Element<'_, Message> {
    let id = attachment.id().clone();

    let preview: Element<Message> = match attachment.status() {
        LoadStatus::Unstarted | LoadStatus::Loading => text("Loading...").into(),
        LoadStatus::Finished(image) => widget::Image::<widget::image::Handle>::new(image.handle.clone())
            .width(Length::Fixed(PREVIEW_WIDTH))
            .into(),
        LoadStatus::Failed => column![
            text("Could not load photo").style(text::danger),
            button("Retry").on_press(Message::Store(RootAction::Attachment(
                id.clone(),
                AttachmentAction::Activate,
            ))),
        ]
        .spacing(6)
        .into(),
    };

    let edit_id = id.clone();
    let description = text_input("Add a description...", attachment.description())
        .on_input(move |value| {
            Message::Store(RootAction::Attachment(
                edit_id.clone(),
                AttachmentAction::DescriptionChanged(value),
            ))
        })
        .padding(8);

    let details = column![
        text(attachment.photo().display_name()).size(16),
        description,
        button("Remove").on_press(Message::Store(RootAction::RemovePhoto(id))),
    ]
    .spacing(8)
    .width(Length::Fill);

    row![
        container(preview).width(Length::Fixed(PREVIEW_WIDTH)),
        details
    ]
    .spacing(16)
    .align_y(Alignment::Center)
    .into()
}

fn status_line(summary: Summary) -> String {
    if summary.total == 0 {
        return "No photos selected. Click \"Add Photos\" to begin.".to_string();
    }

    let mut parts = vec![format!(
        "{} photo{}",
        summary.total,
        if summary.total == 1 { "" } else { "s" }
    )];
    if summary.loading > 0 {
        parts.push(format!("{} loading", summary.loading));
    }
    if summary.failed > 0 {
        parts.push(format!("{} failed", summary.failed));
    }
    parts.join(", ")
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    iced::application(
        "Photo Attachments",
        PhotoAttachments::update,
        PhotoAttachments::view,
    )
    .theme(PhotoAttachments::theme)
    .centered()
    .run_with(move || PhotoAttachments::new(args))
}
