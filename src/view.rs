//! Presentation-side state kept apart from the note store.
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use crate::{search, Note, NoteStore, StoreEvent};

/// Receives requests to bring a note into view
pub trait Presenter: Send {
    /// Show the note list and select `id`
    fn reveal_note(&mut self, id: &str);
}

/// What the user is looking at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Currently selected note
    pub selected: Option<String>,
    /// Text in the search box
    pub search_text: String,
    /// Whether the note list is visible
    pub show_notes: bool,
    /// Set once the stored collection has been read
    pub loaded: bool,
}

impl ViewState {
    /// Creates a view subscribed to `store` so deletions clear the selection
    pub fn attach(store: &mut NoteStore) -> Arc<Mutex<ViewState>> {
        let view = Arc::new(Mutex::new(ViewState {
            loaded: true,
            ..ViewState::default()
        }));

        let observer = Arc::clone(&view);
        store.subscribe(move |event, notes| match observer.lock() {
            Ok(mut view) => view.on_store_event(event, notes),
            Err(e) => warn!("View state lock poisoned: {}", e),
        });
        view
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    /// Drops a selection that no longer points at a note
    pub fn on_store_event(&mut self, event: &StoreEvent, notes: &[Note]) {
        let stale = match (event, self.selected.as_deref()) {
            (StoreEvent::Deleted(id), Some(selected)) => id == selected,
            (StoreEvent::Replaced(_), Some(selected)) => !notes.iter().any(|n| n.id == selected),
            _ => false,
        };
        if stale {
            debug!("Clearing selection of {:?}", self.selected);
            self.selected = None;
        }
    }

    /// Notes matching the current search text
    pub fn visible_notes<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        search::filter(notes, &self.search_text)
    }

    pub fn selected_note<'a>(&self, notes: &'a [Note]) -> Option<&'a Note> {
        let selected = self.selected.as_deref()?;
        notes.iter().find(|n| n.id == selected)
    }
}

impl Presenter for ViewState {
    fn reveal_note(&mut self, id: &str) {
        self.show_notes = true;
        self.selected = Some(id.to_string());
    }
}

impl Presenter for Arc<Mutex<ViewState>> {
    fn reveal_note(&mut self, id: &str) {
        match self.lock() {
            Ok(mut view) => view.reveal_note(id),
            Err(e) => warn!("View state lock poisoned: {}", e),
        }
    }
}
