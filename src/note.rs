//! Core data structures for the scribenotes application.
//!
//! This module contains the note and version snapshot types together with
//! the tolerant record shape used to migrate older persisted documents.
use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Current instant at the millisecond precision the document format keeps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// An immutable snapshot of a note's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteVersion {
    /// Full note content at the time of capture
    pub content: String,
    /// When the snapshot was taken
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// User supplied label
    pub description: String,
}

/// Represents a single note in our system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier for the note
    pub id: String,
    /// Note title
    pub title: String,
    /// Current live text
    pub content: String,
    /// Tags for organization
    pub tags: Vec<String>,
    /// Saved snapshots, oldest first
    pub versions: Vec<NoteVersion>,
    /// When the note was created
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    /// Last modification time
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_edited: DateTime<Utc>,
}

impl Note {
    /// Creates an empty note stamped with `created`
    pub fn new(id: String, created: DateTime<Utc>) -> Self {
        Note {
            id,
            title: String::new(),
            content: String::new(),
            tags: Vec::new(),
            versions: Vec::new(),
            created,
            last_edited: created,
        }
    }

    /// Refreshes `last_edited`, never moving it before `created`.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_edited = at.max(self.created);
    }

    /// True if any tag equals `tag`, ignoring case and surrounding whitespace
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| tag_matches(t, tag))
    }
}

/// Tag equality used by every tag lookup: trimmed, Unicode case-insensitive
pub fn tag_matches(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// A persisted or imported note whose optional fields may be absent.
///
/// Older documents predate tags, version history and timestamps; those fields
/// are filled in by [`NoteRecord::migrate`] one at a time rather than
/// rejecting the record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub versions: Option<Vec<NoteVersion>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_edited: Option<DateTime<Utc>>,
}

impl NoteRecord {
    /// Reads one stored record field by field.
    ///
    /// An ill-typed optional field is logged and treated as absent. Returns
    /// `None` only when the record is not an object or has no usable id.
    pub fn from_value(value: &Value) -> Option<Self> {
        let Some(fields) = value.as_object() else {
            warn!("Skipping stored record that is not an object");
            return None;
        };

        let id = match fields.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                warn!("Skipping stored record without a usable id");
                return None;
            }
        };

        Some(NoteRecord {
            title: text_field(fields, &id, "title"),
            content: text_field(fields, &id, "content"),
            tags: typed_field(fields, &id, "tags"),
            versions: typed_field(fields, &id, "versions"),
            created: millis_field(fields, &id, "created"),
            last_edited: millis_field(fields, &id, "lastEdited"),
            id,
        })
    }

    /// Fills every absent field with its default, using `now` for timestamps.
    ///
    /// Present fields are kept as they are. A missing `created` never lands
    /// after a present `lastEdited`.
    pub fn migrate(self, now: DateTime<Utc>) -> Note {
        let created = match (self.created, self.last_edited) {
            (Some(created), _) => created,
            (None, Some(last_edited)) => last_edited.min(now),
            (None, None) => now,
        };
        let last_edited = self.last_edited.unwrap_or_else(|| now.max(created));

        Note {
            id: self.id,
            title: self.title,
            content: self.content,
            tags: self.tags.unwrap_or_default(),
            versions: self.versions.unwrap_or_default(),
            created,
            last_edited,
        }
    }
}

/// Migrates a full sequence of records with one shared `now`.
pub fn migrate_all(records: Vec<NoteRecord>, now: DateTime<Utc>) -> Vec<Note> {
    records.into_iter().map(|r| r.migrate(now)).collect()
}

fn text_field(fields: &Map<String, Value>, id: &str, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(text)) => text.clone(),
        None | Some(Value::Null) => String::new(),
        Some(_) => {
            warn!("Note {}: '{}' is not text, using empty", id, key);
            String::new()
        }
    }
}

fn typed_field<T>(fields: &Map<String, Value>, id: &str, key: &str) -> Option<T>
where
    T: for<'de> Deserialize<'de>,
{
    let value = fields.get(key).filter(|v| !v.is_null())?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Note {}: ignoring malformed '{}': {}", id, key, e);
            None
        }
    }
}

fn millis_field(fields: &Map<String, Value>, id: &str, key: &str) -> Option<DateTime<Utc>> {
    let value = fields.get(key).filter(|v| !v.is_null())?;
    let parsed = value
        .as_i64()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single());
    if parsed.is_none() {
        warn!("Note {}: ignoring malformed '{}'", id, key);
    }
    parsed
}

// Ids were written as numbers by some older exports.
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}
