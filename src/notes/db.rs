//! SQLite persistence for notes.
//!
//! Everything lives in a single `items` table. Databases written by older
//! revisions of the app (a combined `note_date_time` column, an `alarm_on`
//! flag) are rebuilt into the current layout when opened.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Result as SqliteResult, Row};

use super::note::{date_key, time_key, Note, NoteUpdate};

const SCHEMA_VERSION: i64 = 1;

const CANONICAL_COLUMNS: [&str; 5] = ["id", "note_date", "note_time", "description", "order_index"];

const SELECT_COLUMNS: &str = "SELECT id, note_date, note_time, description, order_index FROM items";

fn create_items_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            note_date TEXT NOT NULL,
            note_time TEXT,
            description TEXT NOT NULL,
            order_index INTEGER NOT NULL DEFAULT 0
        );"
    )
}

pub struct NotesDb {
    conn: Connection,
}

impl NotesDb {
    /// Open or create the database file, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let conn = Connection::open(path)?;
        Ok(Self::init(conn)?)
    }

    pub fn open_in_memory() -> SqliteResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> SqliteResult<Self> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn insert(
        &self,
        date: NaiveDate,
        time: Option<NaiveTime>,
        description: &str,
        order_index: i64,
    ) -> SqliteResult<i64> {
        self.conn.execute(
            "INSERT INTO items (note_date, note_time, description, order_index) VALUES (?1, ?2, ?3, ?4)",
            params![date_key(date), time.map(time_key), description, order_index],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn select_by_date(&self, date: NaiveDate) -> SqliteResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE note_date = ?1 ORDER BY order_index ASC, id DESC"
        ))?;
        let notes = stmt
            .query_map(params![date_key(date)], note_from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(notes)
    }

    /// All notes with `start <= date <= end`, grouped by date in ascending order.
    pub fn select_range(&self, start: NaiveDate, end: NaiveDate) -> SqliteResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS} WHERE note_date BETWEEN ?1 AND ?2
             ORDER BY note_date ASC, order_index ASC, id DESC"
        ))?;
        let notes = stmt
            .query_map(params![date_key(start), date_key(end)], note_from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(notes)
    }

    pub fn select_by_id(&self, id: i64) -> SqliteResult<Option<Note>> {
        self.conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id],
                note_from_row,
            )
            .optional()
    }

    /// Writes the supplied fields. Returns the number of rows changed, which is
    /// zero for an unknown id or an empty update.
    pub fn update(&self, id: i64, update: &NoteUpdate) -> SqliteResult<usize> {
        let mut assignments = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(ref description) = update.description {
            assignments.push("description = ?");
            values.push(Value::Text(description.clone()));
        }
        if let Some(time) = update.time {
            assignments.push("note_time = ?");
            values.push(time.map(time_key).map_or(Value::Null, Value::Text));
        }
        if let Some(order_index) = update.order_index {
            assignments.push("order_index = ?");
            values.push(Value::Integer(order_index));
        }

        if assignments.is_empty() {
            return Ok(0);
        }

        values.push(Value::Integer(id));
        let sql = format!("UPDATE items SET {} WHERE id = ?", assignments.join(", "));
        self.conn.execute(&sql, params_from_iter(values))
    }

    pub fn delete(&self, id: i64) -> SqliteResult<usize> {
        self.conn.execute("DELETE FROM items WHERE id = ?1", params![id])
    }

    pub fn update_date(&self, id: i64, new_date: NaiveDate) -> SqliteResult<usize> {
        self.conn.execute(
            "UPDATE items SET note_date = ?1 WHERE id = ?2",
            params![date_key(new_date), id],
        )
    }

    /// Rewrites `order_index` so the given ids take positions `0..n`, in one
    /// transaction.
    pub fn reorder(&self, ids: &[i64]) -> SqliteResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare("UPDATE items SET order_index = ?1 WHERE id = ?2")?;
            for (position, id) in ids.iter().enumerate() {
                stmt.execute(params![position as i64, id])?;
            }
        }
        tx.commit()
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn note_from_row(row: &Row<'_>) -> SqliteResult<Note> {
    let date_str: String = row.get(1)?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    // Older rows stored "" for "no time".
    let time_str: Option<String> = row.get(2)?;
    let time = match time_str.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(s) => Some(
            NaiveTime::parse_from_str(s, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                })?,
        ),
    };

    Ok(Note {
        id: row.get(0)?,
        date,
        time,
        description: row.get(3)?,
        order_index: row.get(4)?,
    })
}

fn ensure_schema(conn: &Connection) -> SqliteResult<()> {
    let columns = table_columns(conn, "items")?;

    if columns.is_empty() {
        conn.execute_batch(&create_items_sql("items"))?;
    } else if !is_canonical(&columns) {
        migrate_legacy(conn, &columns)?;
    }

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_items_note_date ON items (note_date, order_index);",
    )?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> SqliteResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<SqliteResult<Vec<_>>>()?;
    Ok(columns)
}

fn is_canonical(columns: &[String]) -> bool {
    columns.len() == CANONICAL_COLUMNS.len()
        && CANONICAL_COLUMNS
            .iter()
            .all(|name| columns.iter().any(|c| c == name))
}

fn migrate_legacy(conn: &Connection, columns: &[String]) -> SqliteResult<()> {
    let has = |name: &str| columns.iter().any(|c| c == name);

    if !has("description") {
        return Err(rusqlite::Error::InvalidColumnName("description".to_string()));
    }

    let date_expr = if has("note_date") {
        "note_date".to_string()
    } else if has("note_date_time") {
        "substr(note_date_time, 1, 10)".to_string()
    } else {
        return Err(rusqlite::Error::InvalidColumnName("note_date".to_string()));
    };

    let time_expr = if has("note_time") {
        "NULLIF(note_time, '')".to_string()
    } else if has("note_date_time") {
        let from_datetime = "NULLIF(substr(note_date_time, 12, 5), '')";
        if has("alarm_on") {
            format!("CASE WHEN alarm_on IN (1, '1', 'true') THEN {from_datetime} END")
        } else {
            from_datetime.to_string()
        }
    } else {
        "NULL".to_string()
    };

    let order_expr = if has("order_index") {
        "COALESCE(order_index, 0)"
    } else {
        "0"
    };

    log::info!("Migrating legacy items table (columns: {})", columns.join(", "));

    let previous_seq = autoincrement_seq(conn)?;

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(&create_items_sql("items_migrated"))?;
    let copied = tx.execute(
        &format!(
            "INSERT INTO items_migrated (id, note_date, note_time, description, order_index)
             SELECT id, {date_expr}, {time_expr}, description, {order_expr} FROM items"
        ),
        [],
    )?;
    tx.execute_batch("DROP TABLE items; ALTER TABLE items_migrated RENAME TO items;")?;

    if previous_seq > 0 {
        let updated = tx.execute(
            "UPDATE sqlite_sequence SET seq = MAX(seq, ?1) WHERE name = 'items'",
            params![previous_seq],
        )?;
        if updated == 0 {
            tx.execute(
                "INSERT INTO sqlite_sequence (name, seq) VALUES ('items', ?1)",
                params![previous_seq],
            )?;
        }
    }
    tx.commit()?;

    log::info!("Migrated {} legacy notes", copied);
    Ok(())
}

fn autoincrement_seq(conn: &Connection) -> SqliteResult<i64> {
    let has_sequence: bool = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
        [],
        |row| row.get::<_, i64>(0),
    )? > 0;

    if !has_sequence {
        return Ok(0);
    }

    conn.query_row(
        "SELECT COALESCE(MAX(seq), 0) FROM sqlite_sequence WHERE name = 'items'",
        [],
        |row| row.get(0),
    )
}
