//! Helpers for writing tests against the `notes` table.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use nanoid::nanoid;

use crate::models::{NewNote, Note};
use crate::schema::notes;

/// A note name that will not collide with rows written by other tests.
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, nanoid!(10))
}

pub fn insert_note(conn: &mut PgConnection, note: &NewNote) -> QueryResult<Note> {
    diesel::insert_into(notes::table)
        .values(note)
        .get_result::<Note>(conn)
}

pub fn find_by_name(conn: &mut PgConnection, note_name: &str) -> QueryResult<Option<Note>> {
    notes::table
        .filter(notes::name.eq(note_name))
        .first::<Note>(conn)
        .optional()
}

pub fn count_notes(conn: &mut PgConnection) -> QueryResult<i64> {
    notes::table.count().get_result(conn)
}

/// Deletes every row; returns how many were removed.
pub fn truncate(conn: &mut PgConnection) -> QueryResult<usize> {
    let deleted = diesel::delete(notes::table).execute(conn)?;
    log::debug!("truncated notes ({} rows)", deleted);
    Ok(deleted)
}

/// Parses a JSON array of `{"name": .., "text": ..}` objects.
pub fn parse_seed(json: &str) -> serde_json::Result<Vec<NewNote>> {
    serde_json::from_str(json)
}

/// Inserts all rows in one transaction, so a bad row leaves nothing behind.
pub fn seed(conn: &mut PgConnection, rows: &[NewNote]) -> QueryResult<Vec<Note>> {
    conn.transaction(|conn| {
        diesel::insert_into(notes::table)
            .values(rows)
            .get_results::<Note>(conn)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_names_keep_prefix_and_differ() {
        let first = unique_name("note");
        let second = unique_name("note");
        assert!(first.starts_with("note-"));
        assert_eq!(first.len(), "note-".len() + 10);
        assert_ne!(first, second);
    }

    #[test]
    fn parses_seed_with_optional_text() {
        let rows = parse_seed(
            r#"[
                {"name": "shopping", "text": "milk"},
                {"name": "blank"}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            rows,
            vec![
                NewNote::new("shopping", Some("milk")),
                NewNote::named("blank"),
            ]
        );
    }

    #[test]
    fn seed_without_name_is_rejected() {
        assert!(parse_seed(r#"[{"text": "orphan"}]"#).is_err());
    }
}
