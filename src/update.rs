//! Committing edits made on the update screen.
//!
//! An edit is compared against the displayed record; only a real change (or
//! one of the start/finish buttons) produces a write. The write always names
//! the same four fields and is sent at most once per call.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::error::{ReaderError, Result};
use crate::models::BookRecord;
use crate::store::{BookField, DocumentStore};

/// Values currently entered in the update form.
#[derive(Debug, Clone, PartialEq)]
pub struct BookEdit {
    pub notes: String,
    pub rating: i32,
    pub mark_started: bool,
    pub mark_finished: bool,
}

/// The four fields written by a commit.
#[derive(Debug, Clone, PartialEq)]
pub struct BookPatch {
    pub notes: String,
    pub rating: i32,
    pub started_reading: Option<DateTime<Utc>>,
    pub finished_reading: Option<DateTime<Utc>>,
}

impl BookPatch {
    pub fn fields(&self) -> Vec<BookField> {
        vec![
            BookField::FinishedReading(self.finished_reading),
            BookField::StartedReading(self.started_reading),
            BookField::Rating(f64::from(self.rating)),
            BookField::Notes(self.notes.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Unchanged,
    Updated(BookPatch),
}

/// Decides whether `edit` warrants a write and, if so, what to write.
///
/// A start or finish flag is enough on its own. Flags only ever set a
/// timestamp to `now`; nothing here clears one.
pub fn plan_update(book: &BookRecord, edit: &BookEdit, now: DateTime<Utc>) -> Option<BookPatch> {
    let changed_notes = book.notes.as_deref() != Some(edit.notes.as_str());
    let changed_rating = book.rating.map(|rating| rating.round() as i32) != Some(edit.rating);

    if !(changed_notes || changed_rating || edit.mark_started || edit.mark_finished) {
        return None;
    }

    Some(BookPatch {
        notes: edit.notes.clone(),
        rating: edit.rating,
        started_reading: if edit.mark_started {
            Some(now)
        } else {
            book.started_reading
        },
        finished_reading: if edit.mark_finished {
            Some(now)
        } else {
            book.finished_reading
        },
    })
}

pub struct UpdateFlow {
    store: Arc<dyn DocumentStore>,
}

impl UpdateFlow {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn commit(&self, book: &BookRecord, edit: &BookEdit) -> Result<CommitOutcome> {
        self.commit_at(book, edit, Utc::now())
    }

    pub fn commit_at(
        &self,
        book: &BookRecord,
        edit: &BookEdit,
        now: DateTime<Utc>,
    ) -> Result<CommitOutcome> {
        let patch = match plan_update(book, edit, now) {
            Some(patch) => patch,
            None => return Ok(CommitOutcome::Unchanged),
        };
        let id = book.id.as_deref().ok_or(ReaderError::MissingId)?;

        match self.store.update(id, &patch.fields()) {
            Ok(()) => {
                log::info!("updated book {}", id);
                Ok(CommitOutcome::Updated(patch))
            }
            Err(err) => {
                log::warn!("update of book {} failed: {}", id, err);
                Err(err)
            }
        }
    }

    pub fn delete(&self, book: &BookRecord) -> Result<()> {
        let id = book.id.as_deref().ok_or(ReaderError::MissingId)?;
        match self.store.delete(id) {
            Ok(()) => {
                log::info!("deleted book {}", id);
                Ok(())
            }
            Err(err) => {
                log::warn!("delete of book {} failed: {}", id, err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        updates: Mutex<Vec<(String, Vec<BookField>)>>,
        deletes: Mutex<Vec<String>>,
        fail: bool,
    }

    impl DocumentStore for RecordingStore {
        fn fetch_all(&self) -> Result<Vec<BookRecord>> {
            Ok(vec![])
        }
        fn insert(&self, _book: &BookRecord) -> Result<String> {
            Ok("new".to_string())
        }
        fn update(&self, id: &str, fields: &[BookField]) -> Result<()> {
            if self.fail {
                return Err(ReaderError::Message("offline".to_string()));
            }
            self.updates
                .lock()
                .unwrap()
                .push((id.to_string(), fields.to_vec()));
            Ok(())
        }
        fn delete(&self, id: &str) -> Result<()> {
            if self.fail {
                return Err(ReaderError::Message("offline".to_string()));
            }
            self.deletes.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 4, 12, 30, 0).unwrap()
    }

    fn book() -> BookRecord {
        BookRecord {
            id: Some("b1".to_string()),
            user_id: "u1".to_string(),
            notes: Some("A".to_string()),
            rating: Some(3.0),
            ..Default::default()
        }
    }

    fn edit(notes: &str, rating: i32, mark_started: bool, mark_finished: bool) -> BookEdit {
        BookEdit {
            notes: notes.to_string(),
            rating,
            mark_started,
            mark_finished,
        }
    }

    #[test]
    fn unchanged_edit_is_not_eligible() {
        assert_eq!(plan_update(&book(), &edit("A", 3, false, false), now()), None);
    }

    #[test]
    fn mark_finished_alone_is_eligible() {
        let patch = plan_update(&book(), &edit("A", 3, false, true), now()).unwrap();
        assert_eq!(patch.finished_reading, Some(now()));
        assert_eq!(patch.started_reading, None);
        assert_eq!(patch.notes, "A");
        assert_eq!(patch.rating, 3);
    }

    #[test]
    fn note_or_rating_change_is_eligible() {
        assert!(plan_update(&book(), &edit("B", 3, false, false), now()).is_some());
        assert!(plan_update(&book(), &edit("A", 5, false, false), now()).is_some());
    }

    #[test]
    fn rating_is_compared_after_rounding() {
        let mut record = book();
        record.rating = Some(3.4);
        assert_eq!(plan_update(&record, &edit("A", 3, false, false), now()), None);
    }

    #[test]
    fn unset_fields_always_count_as_changed() {
        let record = BookRecord {
            id: Some("b1".to_string()),
            ..Default::default()
        };
        assert!(plan_update(&record, &edit("", 0, false, false), now()).is_some());
    }

    #[test]
    fn existing_timestamps_pass_through() {
        let started = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let mut record = book();
        record.started_reading = Some(started);

        let patch = plan_update(&record, &edit("B", 3, false, false), now()).unwrap();
        assert_eq!(patch.started_reading, Some(started));
        assert_eq!(patch.finished_reading, None);

        let restarted = plan_update(&record, &edit("A", 3, true, false), now()).unwrap();
        assert_eq!(restarted.started_reading, Some(now()));
    }

    #[test]
    fn commit_sends_one_update_with_four_fields() {
        let store = Arc::new(RecordingStore::default());
        let flow = UpdateFlow::new(store.clone());

        let outcome = flow
            .commit_at(&book(), &edit("loved it", 5, true, true), now())
            .unwrap();
        assert!(matches!(outcome, CommitOutcome::Updated(_)));

        let updates = store.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        let (id, fields) = &updates[0];
        assert_eq!(id, "b1");
        assert_eq!(
            fields,
            &vec![
                BookField::FinishedReading(Some(now())),
                BookField::StartedReading(Some(now())),
                BookField::Rating(5.0),
                BookField::Notes("loved it".to_string()),
            ]
        );
    }

    #[test]
    fn unchanged_commit_sends_nothing() {
        let store = Arc::new(RecordingStore::default());
        let flow = UpdateFlow::new(store.clone());

        let outcome = flow.commit(&book(), &edit("A", 3, false, false)).unwrap();
        assert_eq!(outcome, CommitOutcome::Unchanged);
        assert!(store.updates.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_commit_is_reported() {
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });
        let flow = UpdateFlow::new(store);
        assert!(flow.commit(&book(), &edit("B", 3, false, false)).is_err());
        assert!(flow.delete(&book()).is_err());
    }

    #[test]
    fn delete_needs_store_id() {
        let store = Arc::new(RecordingStore::default());
        let flow = UpdateFlow::new(store.clone());

        let mut record = book();
        record.id = None;
        assert!(matches!(flow.delete(&record), Err(ReaderError::MissingId)));

        flow.delete(&book()).unwrap();
        assert_eq!(*store.deletes.lock().unwrap(), vec!["b1".to_string()]);
    }
}
