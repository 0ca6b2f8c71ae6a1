use std::fs;

use scribenotes::{
    export_to_dir, read_import_file, search, FileDocumentStore, IntakeOutcome, NoteStore,
    PersistenceAdapter, ScribeError, TranscriptionIntake, ViewState, DEFAULT_STORE_KEY,
};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> NoteStore {
    let documents = FileDocumentStore::open(dir.path().join("data")).unwrap();
    NoteStore::open(PersistenceAdapter::new(Box::new(documents), DEFAULT_STORE_KEY))
}

#[test]
fn notes_survive_reopening_the_store() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);

    let id = store.create().unwrap();
    let mut note = store.get(&id).unwrap().clone();
    note.title = "Meeting Notes".to_string();
    note.content = "discuss budget".to_string();
    store.update(note).unwrap();
    store.add_tags(&id, "work").unwrap();
    store.save_version(&id, "v1").unwrap();

    let reopened = open_store(&temp_dir);
    assert_eq!(reopened.notes(), store.notes());
    for query in ["budget", "MEETING", "Work"] {
        assert_eq!(search::filter(reopened.notes(), query).len(), 1);
    }
    assert!(search::filter(reopened.notes(), "xyz").is_empty());
}

#[test]
fn corrupt_document_loads_empty_and_is_kept() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    let path = data_dir.join(format!("{}.json", DEFAULT_STORE_KEY));
    fs::write(&path, "[{\"id\": ").unwrap();

    let store = open_store(&temp_dir);
    assert!(store.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "[{\"id\": ");
}

#[test]
fn dictation_flow_selects_new_note_and_delete_clears_it() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);
    let view = ViewState::attach(&mut store);
    let mut presenter = view.clone();
    let mut intake = TranscriptionIntake::default();

    let outcome = intake
        .on_transcription_complete(&mut store, &mut presenter, "hello")
        .unwrap();
    let IntakeOutcome::Created(id) = outcome else {
        panic!("expected a note");
    };
    assert_eq!(
        intake
            .on_transcription_complete(&mut store, &mut presenter, "hello")
            .unwrap(),
        IntakeOutcome::Duplicate
    );
    {
        let view = view.lock().unwrap();
        assert!(view.show_notes);
        assert_eq!(view.selected.as_deref(), Some(id.as_str()));
    }

    store.delete(&id).unwrap();
    assert!(view.lock().unwrap().selected.is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn backup_and_restore_through_export_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut store = open_store(&temp_dir);
    let id = store
        .create_with(String::new(), "first draft".to_string(), Vec::new())
        .unwrap();
    store.save_version(&id, "draft").unwrap();
    let before = store.notes().to_vec();

    let path = export_to_dir(store.notes(), &temp_dir.path().join("exports")).unwrap();
    let bad = temp_dir.path().join("bad.json");
    fs::write(&bad, r#"[{"id": "1", "title": "no content"}]"#).unwrap();
    let document = read_import_file(&bad).await.unwrap();
    let err = store.import_document(&document).unwrap_err();
    assert!(err.is_import_failure());
    assert!(matches!(err, ScribeError::ImportValidation { .. }));
    assert_eq!(store.notes(), before.as_slice());

    store.delete(&id).unwrap();
    let document = read_import_file(&path).await.unwrap();
    assert_eq!(store.import_document(&document).unwrap(), 1);
    assert_eq!(store.notes(), before.as_slice());
    assert_eq!(open_store(&temp_dir).notes(), before.as_slice());
}
