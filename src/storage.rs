use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{debug, info, trace};

use crate::{now, parse_tags, tag_matches, Note, PersistenceAdapter, Result, ScribeError};

/// Identifies a registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What changed in the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A note was appended
    Created(String),
    /// A note was replaced (also sent for unknown ids, which change nothing)
    Updated(String),
    /// A note was removed, or the id was not present
    Deleted(String),
    /// The whole collection was swapped, e.g. by an import
    Replaced(usize),
}

type Subscriber = Box<dyn FnMut(&StoreEvent, &[Note]) + Send>;

/// Owns the note collection and persists it after every mutation.
pub struct NoteStore {
    /// Notes in insertion order
    notes: Vec<Note>,

    /// Where the collection is written
    persistence: PersistenceAdapter,

    /// Millisecond reading the last id was derived from
    last_id_millis: i64,

    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl NoteStore {
    /// Creates a store from whatever the adapter currently holds
    pub fn open(persistence: PersistenceAdapter) -> Self {
        let notes = persistence.load();
        info!("Note store opened with {} notes", notes.len());

        Self {
            notes,
            persistence,
            last_id_millis: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Current collection in insertion order
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Retrieves a note by its ID
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Like [`NoteStore::get`] but reports a missing note as an error
    pub fn require(&self, id: &str) -> Result<&Note> {
        self.get(id).ok_or_else(|| ScribeError::NoteNotFound { id: id.to_string() })
    }

    /// Appends a new empty note and returns its id
    pub fn create(&mut self) -> Result<String> {
        self.create_with(String::new(), String::new(), Vec::new())
    }

    /// Appends a note with the given fields in a single write.
    ///
    /// If the write fails nothing is added.
    pub fn create_with(
        &mut self,
        title: String,
        content: String,
        tags: Vec<String>,
    ) -> Result<String> {
        let created = now();
        let id = self.peek_id(created);
        debug!("Creating note {}", id);

        let mut note = Note::new(id.to_string(), created);
        note.title = title;
        note.content = content;
        note.tags = tags;

        let mut next = self.notes.clone();
        next.push(note);
        self.commit(next, StoreEvent::Created(id.to_string()))?;
        self.last_id_millis = id;

        info!("Note created: {}", id);
        Ok(id.to_string())
    }

    /// Replaces the stored note with the same id, refreshing `last_edited`.
    ///
    /// An unknown id changes nothing but the collection is still written.
    pub fn update(&mut self, note: Note) -> Result<()> {
        self.update_at(note, now())
    }

    fn update_at(&mut self, mut note: Note, at: DateTime<Utc>) -> Result<()> {
        let id = note.id.clone();
        let mut next = self.notes.clone();

        match next.iter_mut().find(|n| n.id == id) {
            Some(slot) => {
                note.created = slot.created;
                note.touch(at);
                *slot = note;
                trace!("Replacing note {}", id);
            }
            None => debug!("Update for unknown note {} ignored", id),
        }

        self.commit(next, StoreEvent::Updated(id))
    }

    /// Removes a note. Unknown ids are ignored, the collection is still written.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let mut next = self.notes.clone();
        let before = next.len();
        next.retain(|n| n.id != id);

        if next.len() == before {
            debug!("Delete for unknown note {} ignored", id);
        } else {
            info!("Note deleted: {}", id);
        }

        self.commit(next, StoreEvent::Deleted(id.to_string()))
    }

    /// Adds tags to a note. Returns false if the note does not exist.
    pub fn add_tags(&mut self, id: &str, tags: &str) -> Result<bool> {
        let Some(mut note) = self.get(id).cloned() else {
            return Ok(false);
        };
        note.tags.extend(parse_tags(Some(tags.to_string())));
        self.update(note)?;
        Ok(true)
    }

    /// Removes every tag matching one of `tags`, ignoring case.
    /// Returns false if the note does not exist.
    pub fn remove_tags(&mut self, id: &str, tags: &str) -> Result<bool> {
        let Some(mut note) = self.get(id).cloned() else {
            return Ok(false);
        };
        let doomed = parse_tags(Some(tags.to_string()));
        note.tags.retain(|t| !doomed.iter().any(|d| tag_matches(t, d)));
        self.update(note)?;
        Ok(true)
    }

    /// Swaps in a whole new collection and persists it
    pub fn replace_all(&mut self, notes: Vec<Note>) -> Result<()> {
        let count = notes.len();
        if let Some(max) = notes.iter().filter_map(|n| n.id.parse::<i64>().ok()).max() {
            self.last_id_millis = self.last_id_millis.max(max);
        }
        self.commit(notes, StoreEvent::Replaced(count))?;
        info!("Collection replaced with {} notes", count);
        Ok(())
    }

    /// Registers a callback run after every committed mutation
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreEvent, &[Note]) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    // Writes `next` first and only then makes it the live collection.
    fn commit(&mut self, next: Vec<Note>, event: StoreEvent) -> Result<()> {
        self.persistence.save(&next)?;
        self.notes = next;

        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&event, &self.notes);
        }
        Ok(())
    }

    // Ids come from the millisecond clock; a repeated reading is bumped so
    // ids stay unique and increasing.
    fn peek_id(&self, created: DateTime<Utc>) -> i64 {
        created.timestamp_millis().max(self.last_id_millis + 1)
    }
}

/// A note store shared between threads or tasks behind one mutex.
#[derive(Clone)]
pub struct SharedNoteStore {
    inner: Arc<Mutex<NoteStore>>,
}

impl SharedNoteStore {
    pub fn new(store: NoteStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Locks the store for exclusive access
    pub fn lock(&self) -> Result<MutexGuard<'_, NoteStore>> {
        self.inner
            .lock()
            .map_err(|_| ScribeError::LockAcquisitionFailed {
                message: "Failed to acquire lock on note store".to_string(),
            })
    }
}
