//! SQLite-backed note store.
//!
//! # Invariants
//! - Records live in the single `notes` table keyed by the derived key.
//! - `links`/`backlinks` are JSON arrays; SQL `NULL` means absent.
//! - `contains` filters use `instr`, which is case-sensitive.

use super::{FetchPage, FieldContains, NoteField, NoteStore, StoreError, StoreResult};
use crate::db::migrations::latest_version;
use crate::model::note::NoteRecord;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const NOTE_SELECT_SQL: &str = "SELECT
    key,
    name,
    content,
    links,
    backlinks,
    last_modified,
    is_public,
    recent_index
FROM notes";

/// Note store over a migrated SQLite connection.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<NoteRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("{NOTE_SELECT_SQL} WHERE key = ?1;"),
                [key],
                read_raw_row,
            )
            .optional()?;
        row.map(RawRow::into_record).transpose()
    }

    fn put(&self, record: &NoteRecord, key: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO notes (
                key,
                name,
                content,
                links,
                backlinks,
                last_modified,
                is_public,
                recent_index
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(key) DO UPDATE SET
                name = excluded.name,
                content = excluded.content,
                links = excluded.links,
                backlinks = excluded.backlinks,
                last_modified = excluded.last_modified,
                is_public = excluded.is_public,
                recent_index = excluded.recent_index;",
            params![
                key,
                record.name.as_str(),
                record.content.as_deref(),
                encode_names(record.links.as_deref())?,
                encode_names(record.backlinks.as_deref())?,
                record.last_modified.as_deref(),
                bool_to_int(record.is_public),
                record.recent_index,
            ],
        )?;
        Ok(())
    }

    fn delete(&self, key: &str) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE key = ?1;", [key])?;
        Ok(changed > 0)
    }

    fn fetch(
        &self,
        filters: &[FieldContains],
        cursor: Option<&str>,
        page_size: u32,
    ) -> StoreResult<FetchPage> {
        let page_size = page_size.max(1);
        let mut sql = format!("{NOTE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !filters.is_empty() {
            let clauses = filters
                .iter()
                .map(|filter| format!("instr({}, ?) > 0", field_column(filter.field)))
                .collect::<Vec<_>>();
            sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
            bind_values.extend(filters.iter().map(|f| Value::Text(f.value.clone())));
        }

        if let Some(cursor) = cursor {
            sql.push_str(" AND key > ?");
            bind_values.push(Value::Text(cursor.to_string()));
        }

        // One extra row tells whether another page follows.
        sql.push_str(" ORDER BY key ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(page_size) + 1));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let raw = read_raw_row(row)?;
            let key = raw.key.clone();
            items.push((key, raw.into_record()?));
        }

        let page_len = page_size as usize;
        let last = if items.len() > page_len {
            items.truncate(page_len);
            items.last().map(|(key, _)| key.clone())
        } else {
            None
        };

        Ok(FetchPage { items, last })
    }
}

struct RawRow {
    key: String,
    name: String,
    content: Option<String>,
    links: Option<String>,
    backlinks: Option<String>,
    last_modified: Option<String>,
    is_public: i64,
    recent_index: Option<f64>,
}

impl RawRow {
    fn into_record(self) -> StoreResult<NoteRecord> {
        let is_public = match self.is_public {
            0 => false,
            1 => true,
            other => {
                return Err(StoreError::InvalidData(format!(
                    "invalid is_public value `{other}` for key `{}`",
                    self.key
                )));
            }
        };
        Ok(NoteRecord {
            links: decode_names(self.links.as_deref(), "links", &self.key)?,
            backlinks: decode_names(self.backlinks.as_deref(), "backlinks", &self.key)?,
            name: self.name,
            content: self.content,
            last_modified: self.last_modified,
            is_public,
            recent_index: self.recent_index,
        })
    }
}

fn read_raw_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        key: row.get("key")?,
        name: row.get("name")?,
        content: row.get("content")?,
        links: row.get("links")?,
        backlinks: row.get("backlinks")?,
        last_modified: row.get("last_modified")?,
        is_public: row.get("is_public")?,
        recent_index: row.get("recent_index")?,
    })
}

fn encode_names(names: Option<&[String]>) -> StoreResult<Option<String>> {
    names
        .map(|names| {
            serde_json::to_string(names)
                .map_err(|err| StoreError::InvalidData(format!("cannot encode name list: {err}")))
        })
        .transpose()
}

fn decode_names(raw: Option<&str>, column: &str, key: &str) -> StoreResult<Option<Vec<String>>> {
    raw.map(|text| {
        serde_json::from_str::<Option<Vec<String>>>(text).map_err(|err| {
            StoreError::InvalidData(format!("invalid notes.{column} for key `{key}`: {err}"))
        })
    })
    .transpose()
    .map(Option::flatten)
}

fn field_column(field: NoteField) -> &'static str {
    match field {
        NoteField::Name => "name",
        NoteField::Content => "content",
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteNoteStore;
    use crate::db::open_db_in_memory;
    use crate::model::note::NoteRecord;
    use crate::store::{FieldContains, NoteField, NoteStore, StoreError};
    use rusqlite::Connection;

    fn record(name: &str, content: &str) -> NoteRecord {
        NoteRecord {
            name: name.to_string(),
            content: Some(content.to_string()),
            links: Some(vec!["x".to_string()]),
            backlinks: None,
            last_modified: Some("2024-01-01T00:00:00.000000Z".to_string()),
            is_public: true,
            recent_index: Some(1.5),
        }
    }

    #[test]
    fn put_then_get_preserves_absent_values() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteNoteStore::try_new(&conn).unwrap();
        let stored = record("a", "alpha");
        store.put(&stored, "k-a").unwrap();
        assert_eq!(store.get("k-a").unwrap(), Some(stored));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn json_null_list_reads_as_absent() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO notes (key, name, links, backlinks) VALUES ('k', 'n', 'null', '[]');",
            [],
        )
        .unwrap();
        let store = SqliteNoteStore::try_new(&conn).unwrap();
        let loaded = store.get("k").unwrap().unwrap();
        assert_eq!(loaded.links, None);
        assert_eq!(loaded.backlinks, Some(Vec::new()));
        assert_eq!(loaded.content, None);
    }

    #[test]
    fn delete_reports_whether_a_record_existed() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteNoteStore::try_new(&conn).unwrap();
        store.put(&record("a", "alpha"), "k-a").unwrap();
        assert!(store.delete("k-a").unwrap());
        assert!(!store.delete("k-a").unwrap());
    }

    #[test]
    fn fetch_pages_through_all_matches() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteNoteStore::try_new(&conn).unwrap();
        for idx in 0..5 {
            store
                .put(&record(&format!("n{idx}"), "body"), &format!("k{idx}"))
                .unwrap();
        }

        let first = store.fetch(&[], None, 2).unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.last.as_deref(), Some("k1"));

        let second = store.fetch(&[], first.last.as_deref(), 2).unwrap();
        assert_eq!(second.items[0].0, "k2");

        assert_eq!(store.fetch_all(&[]).unwrap().len(), 5);
    }

    #[test]
    fn fetch_filters_are_or_combined_and_case_sensitive() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteNoteStore::try_new(&conn).unwrap();
        store.put(&record("foo-title", "body"), "k1").unwrap();
        store.put(&record("other", "has foo inside"), "k2").unwrap();
        store.put(&record("Foo", "FOO"), "k3").unwrap();

        let filters = [
            FieldContains::new(NoteField::Name, "foo"),
            FieldContains::new(NoteField::Content, "foo"),
        ];
        let names: Vec<String> = store
            .fetch_all(&filters)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["foo-title".to_string(), "other".to_string()]);
    }

    #[test]
    fn unmigrated_connection_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteNoteStore::try_new(&conn).err().unwrap();
        assert!(matches!(
            err,
            StoreError::UninitializedConnection {
                actual_version: 0,
                ..
            }
        ));
    }
}
