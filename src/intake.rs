//! Turns finished transcriptions into notes.
//!
//! Only the immediately preceding transcription is remembered, so a result
//! delivered twice in a row yields one note while the same text arriving
//! after a different one yields another.
use log::{debug, error, info};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{NoteStore, Presenter, Result, ScribeError, SharedNoteStore};

/// Title given to notes created from speech
pub const DEFAULT_TRANSCRIPTION_TITLE: &str = "Voice Note";

/// What a delivered transcription led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// A note was created with this id
    Created(String),
    /// Same text as the previous delivery, nothing done
    Duplicate,
}

/// Receives completed transcription text
#[derive(Debug, Clone)]
pub struct TranscriptionIntake {
    title: String,
    last_text: Option<String>,
}

impl Default for TranscriptionIntake {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSCRIPTION_TITLE)
    }
}

impl TranscriptionIntake {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            last_text: None,
        }
    }

    /// Creates a note from `text` unless it repeats the previous delivery.
    pub fn on_transcription_complete(
        &mut self,
        store: &mut NoteStore,
        presenter: &mut dyn Presenter,
        text: &str,
    ) -> Result<IntakeOutcome> {
        if self.last_text.as_deref() == Some(text) {
            debug!("Ignoring repeated transcription ({} chars)", text.len());
            return Ok(IntakeOutcome::Duplicate);
        }

        let id = store.create_with(self.title.clone(), text.to_string(), Vec::new())?;
        // Remembered only once stored, so a failed text can be delivered again
        self.last_text = Some(text.to_string());

        presenter.reveal_note(&id);
        info!("Transcription stored as note {}", id);
        Ok(IntakeOutcome::Created(id))
    }
}

/// Running intake task fed through a channel
pub struct IntakeHandle<P> {
    tx: mpsc::Sender<String>,
    task: JoinHandle<(usize, P)>,
}

impl<P: Send + 'static> IntakeHandle<P> {
    /// Hands a completed transcription to the task
    pub async fn deliver(&self, text: impl Into<String>) -> Result<()> {
        self.tx
            .send(text.into())
            .await
            .map_err(|_| ScribeError::TaskFailed {
                message: "Transcription intake has stopped".to_string(),
            })
    }

    /// Closes the channel, waits for queued texts, and returns the number of
    /// notes created along with the presenter
    pub async fn finish(self) -> Result<(usize, P)> {
        drop(self.tx);
        self.task.await.map_err(|e| ScribeError::TaskFailed {
            message: format!("Transcription intake task failed: {}", e),
        })
    }
}

/// Spawns a task that processes transcriptions one at a time
pub fn spawn_intake<P>(
    store: SharedNoteStore,
    mut intake: TranscriptionIntake,
    mut presenter: P,
) -> IntakeHandle<P>
where
    P: Presenter + 'static,
{
    let (tx, mut rx) = mpsc::channel::<String>(16);

    let task = tokio::spawn(async move {
        let mut created = 0;
        while let Some(text) = rx.recv().await {
            let outcome = match store.lock() {
                Ok(mut guard) => intake.on_transcription_complete(&mut guard, &mut presenter, &text),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(IntakeOutcome::Created(_)) => created += 1,
                Ok(IntakeOutcome::Duplicate) => {}
                Err(e) => error!("Failed to store transcription: {}", e),
            }
        }
        debug!("Transcription intake stopped after {} notes", created);
        (created, presenter)
    });

    IntakeHandle { tx, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::FlakyDocumentStore;
    use crate::{MemoryDocumentStore, PersistenceAdapter, DEFAULT_STORE_KEY};

    #[derive(Default)]
    struct Recorder {
        revealed: Vec<String>,
    }

    impl Presenter for Recorder {
        fn reveal_note(&mut self, id: &str) {
            self.revealed.push(id.to_string());
        }
    }

    fn store() -> NoteStore {
        NoteStore::open(PersistenceAdapter::new(
            Box::new(MemoryDocumentStore::new()),
            DEFAULT_STORE_KEY,
        ))
    }

    #[test]
    fn test_repeated_text_creates_one_note() {
        let mut store = store();
        let mut intake = TranscriptionIntake::default();
        let mut presenter = Recorder::default();

        let first = intake
            .on_transcription_complete(&mut store, &mut presenter, "hello")
            .unwrap();
        let second = intake
            .on_transcription_complete(&mut store, &mut presenter, "hello")
            .unwrap();

        assert!(matches!(first, IntakeOutcome::Created(_)));
        assert_eq!(second, IntakeOutcome::Duplicate);
        assert_eq!(store.len(), 1);
        assert_eq!(presenter.revealed.len(), 1);
    }

    #[test]
    fn test_only_previous_text_is_remembered() {
        let mut store = store();
        let mut intake = TranscriptionIntake::default();
        let mut presenter = Recorder::default();

        for text in ["hello", "world", "hello"] {
            intake
                .on_transcription_complete(&mut store, &mut presenter, text)
                .unwrap();
        }

        let contents: Vec<&str> = store.notes().iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, vec!["hello", "world", "hello"]);
    }

    #[test]
    fn test_created_note_uses_title_and_is_revealed() {
        let mut store = store();
        let mut intake = TranscriptionIntake::new("Dictation");
        let mut presenter = Recorder::default();

        let IntakeOutcome::Created(id) = intake
            .on_transcription_complete(&mut store, &mut presenter, "buy milk")
            .unwrap()
        else {
            panic!("expected a note to be created");
        };

        let note = store.get(&id).unwrap();
        assert_eq!(note.title, "Dictation");
        assert_eq!(note.content, "buy milk");
        assert_eq!(presenter.revealed, vec![id]);
    }

    #[test]
    fn test_failed_save_does_not_swallow_redelivery() {
        let mut store = NoteStore::open(PersistenceAdapter::new(
            Box::new(FlakyDocumentStore::new(vec![0])),
            DEFAULT_STORE_KEY,
        ));
        let mut intake = TranscriptionIntake::default();
        let mut presenter = Recorder::default();

        assert!(intake
            .on_transcription_complete(&mut store, &mut presenter, "hello")
            .is_err());
        assert!(store.is_empty());
        assert!(presenter.revealed.is_empty());

        let retry = intake
            .on_transcription_complete(&mut store, &mut presenter, "hello")
            .unwrap();
        assert!(matches!(retry, IntakeOutcome::Created(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.notes()[0].content, "hello");
    }

    #[test]
    fn test_note_is_written_titled_in_one_save() {
        let flaky = FlakyDocumentStore::new(vec![1]);
        let backing = flaky.inner.clone();
        let mut store =
            NoteStore::open(PersistenceAdapter::new(Box::new(flaky), DEFAULT_STORE_KEY));
        let mut intake = TranscriptionIntake::default();
        let mut presenter = Recorder::default();

        intake
            .on_transcription_complete(&mut store, &mut presenter, "hello")
            .unwrap();
        let stored: Vec<crate::Note> =
            serde_json::from_str(&backing.raw(DEFAULT_STORE_KEY).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, DEFAULT_TRANSCRIPTION_TITLE);
        assert_eq!(stored[0].content, "hello");
    }

    #[tokio::test]
    async fn test_intake_task_processes_in_order() {
        let shared = SharedNoteStore::new(store());
        let handle = spawn_intake(
            shared.clone(),
            TranscriptionIntake::default(),
            Recorder::default(),
        );

        for text in ["one", "one", "two"] {
            handle.deliver(text).await.unwrap();
        }
        let (created, presenter) = handle.finish().await.unwrap();

        assert_eq!(created, 2);
        assert_eq!(presenter.revealed.len(), 2);
        let store = shared.lock().unwrap();
        let contents: Vec<&str> = store.notes().iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two"]);
    }
}
