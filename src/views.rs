//! Per-user shelves derived from the loaded book list.
//!
//! Every record lands on exactly one shelf, decided only by its two reading
//! timestamps. The filters keep input order and never touch the records.

use crate::models::BookRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shelf {
    Unread,
    Reading,
    Finished,
}

impl Shelf {
    pub fn of(book: &BookRecord) -> Shelf {
        match (&book.started_reading, &book.finished_reading) {
            (_, Some(_)) => Shelf::Finished,
            (Some(_), None) => Shelf::Reading,
            (None, None) => Shelf::Unread,
        }
    }
}

pub fn owned_by<'a>(books: &'a [BookRecord], user_id: &str) -> Vec<&'a BookRecord> {
    books.iter().filter(|book| book.user_id == user_id).collect()
}

pub fn on_shelf<'a>(books: &'a [BookRecord], user_id: &str, shelf: Shelf) -> Vec<&'a BookRecord> {
    books
        .iter()
        .filter(|book| book.user_id == user_id && Shelf::of(book) == shelf)
        .collect()
}

pub fn unread<'a>(books: &'a [BookRecord], user_id: &str) -> Vec<&'a BookRecord> {
    on_shelf(books, user_id, Shelf::Unread)
}

pub fn reading_now<'a>(books: &'a [BookRecord], user_id: &str) -> Vec<&'a BookRecord> {
    on_shelf(books, user_id, Shelf::Reading)
}

pub fn finished<'a>(books: &'a [BookRecord], user_id: &str) -> Vec<&'a BookRecord> {
    on_shelf(books, user_id, Shelf::Finished)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn book(user_id: &str, started: bool, finished: bool) -> BookRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        BookRecord {
            user_id: user_id.to_string(),
            started_reading: started.then_some(at),
            finished_reading: finished.then_some(at),
            ..Default::default()
        }
    }

    #[test]
    fn shelf_follows_timestamps() {
        let mut record = book("u1", false, false);
        assert_eq!(Shelf::of(&record), Shelf::Unread);

        record.started_reading = Some(Utc::now());
        assert_eq!(Shelf::of(&record), Shelf::Reading);

        record.finished_reading = Some(Utc::now());
        assert_eq!(Shelf::of(&record), Shelf::Finished);
    }

    #[test]
    fn finished_without_start_is_finished() {
        assert_eq!(Shelf::of(&book("u1", false, true)), Shelf::Finished);
    }

    #[test]
    fn filters_skip_other_users() {
        let books = vec![
            book("u1", false, false),
            book("u2", false, false),
            book("u1", true, false),
            book("u2", true, true),
        ];
        assert_eq!(unread(&books, "u1").len(), 1);
        assert_eq!(reading_now(&books, "u1").len(), 1);
        assert!(finished(&books, "u1").is_empty());
        assert_eq!(finished(&books, "u2").len(), 1);
        assert!(owned_by(&books, "u3").is_empty());
    }

    #[test]
    fn filters_preserve_input_order() {
        let mut books = Vec::new();
        for index in 0..4 {
            let mut record = book("u1", false, false);
            record.google_book_id = format!("g{}", index);
            books.push(record);
        }
        let ids: Vec<&str> = unread(&books, "u1")
            .into_iter()
            .map(|book| book.google_book_id.as_str())
            .collect();
        assert_eq!(ids, vec!["g0", "g1", "g2", "g3"]);
    }

    fn arb_books() -> impl Strategy<Value = Vec<BookRecord>> {
        prop::collection::vec(
            (prop::sample::select(vec!["u1", "u2", "u3"]), any::<bool>(), any::<bool>()),
            0..40,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(index, (user, started, finished))| {
                    let mut record = book(user, started, finished);
                    record.google_book_id = format!("g{}", index);
                    record
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn shelves_partition_the_users_books(books in arb_books()) {
            let user = "u1";
            let unread_ids: Vec<&str> = unread(&books, user).iter().map(|b| b.google_book_id.as_str()).collect();
            let reading_ids: Vec<&str> = reading_now(&books, user).iter().map(|b| b.google_book_id.as_str()).collect();
            let finished_ids: Vec<&str> = finished(&books, user).iter().map(|b| b.google_book_id.as_str()).collect();

            for id in &unread_ids {
                prop_assert!(!reading_ids.contains(id));
                prop_assert!(!finished_ids.contains(id));
            }
            for id in &reading_ids {
                prop_assert!(!finished_ids.contains(id));
            }

            let mut union: Vec<&str> = unread_ids
                .iter()
                .chain(reading_ids.iter())
                .chain(finished_ids.iter())
                .copied()
                .collect();
            union.sort();
            let mut owned: Vec<&str> = owned_by(&books, user).iter().map(|b| b.google_book_id.as_str()).collect();
            owned.sort();
            prop_assert_eq!(union, owned);
        }

        #[test]
        fn filters_are_idempotent(books in arb_books()) {
            prop_assert_eq!(unread(&books, "u2"), unread(&books, "u2"));
            prop_assert_eq!(reading_now(&books, "u2"), reading_now(&books, "u2"));
            prop_assert_eq!(finished(&books, "u2"), finished(&books, "u2"));
        }
    }
}
