use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Note, NoteDraft, Tag};

/// Storage capability the handlers depend on.
///
/// `insert_note` and `update_note` together form "save": each applies the
/// note row and its ordered tag references as one unit.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes, ascending by id.
    async fn find_all_notes(&self) -> Result<Vec<Note>, StoreError>;

    async fn find_note(&self, id: i64) -> Result<Option<Note>, StoreError>;

    async fn insert_note(&self, draft: NoteDraft) -> Result<Note, StoreError>;

    async fn update_note(&self, note: &Note) -> Result<(), StoreError>;

    /// Deleting an id that does not exist is not an error.
    async fn delete_note(&self, id: i64) -> Result<(), StoreError>;

    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, StoreError>;

    async fn find_all_tags(&self) -> Result<Vec<Tag>, StoreError>;

    async fn insert_tag(&self, name: String) -> Result<Tag, StoreError>;

    /// Notes referencing the tag, ascending by id.
    async fn find_notes_by_tag(&self, tag_id: i64) -> Result<Vec<Note>, StoreError>;
}

#[derive(Default)]
struct MemoryState {
    notes: BTreeMap<i64, Note>,
    tags: BTreeMap<i64, Tag>,
    last_note_id: i64,
    last_tag_id: i64,
}

/// In-process `NoteStore`, used by tests and for running without a database.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // Every mutation is a single map operation, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn find_all_notes(&self) -> Result<Vec<Note>, StoreError> {
        Ok(self.lock().notes.values().cloned().collect())
    }

    async fn find_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        Ok(self.lock().notes.get(&id).cloned())
    }

    async fn insert_note(&self, draft: NoteDraft) -> Result<Note, StoreError> {
        let mut state = self.lock();
        state.last_note_id += 1;
        let note = Note {
            id: state.last_note_id,
            title: draft.title,
            body: draft.body,
            tag_ids: draft.tag_ids,
        };
        state.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update_note(&self, note: &Note) -> Result<(), StoreError> {
        let mut state = self.lock();
        if let Some(existing) = state.notes.get_mut(&note.id) {
            *existing = note.clone();
        }
        Ok(())
    }

    async fn delete_note(&self, id: i64) -> Result<(), StoreError> {
        self.lock().notes.remove(&id);
        Ok(())
    }

    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, StoreError> {
        Ok(self.lock().tags.get(&id).cloned())
    }

    async fn find_all_tags(&self) -> Result<Vec<Tag>, StoreError> {
        Ok(self.lock().tags.values().cloned().collect())
    }

    async fn insert_tag(&self, name: String) -> Result<Tag, StoreError> {
        let mut state = self.lock();
        state.last_tag_id += 1;
        let tag = Tag {
            id: state.last_tag_id,
            name,
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn find_notes_by_tag(&self, tag_id: i64) -> Result<Vec<Note>, StoreError> {
        Ok(self
            .lock()
            .notes
            .values()
            .filter(|note| note.tag_ids.contains(&tag_id))
            .cloned()
            .collect())
    }
}
