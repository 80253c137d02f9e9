// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Key-value entry reads and writes.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::diesel_schema::kv_entries;
use crate::error::PersistenceError;

/// Reads the value stored under `key`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_entry(
    conn: &mut SqliteConnection,
    key: &str,
) -> Result<Option<String>, PersistenceError> {
    kv_entries::table
        .filter(kv_entries::entry_key.eq(key))
        .select(kv_entries::entry_value)
        .first::<String>(conn)
        .optional()
        .map_err(Into::into)
}

/// Stores `value` under `key`, replacing any previous value.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be formatted or the write fails.
pub fn put_entry(
    conn: &mut SqliteConnection,
    key: &str,
    value: &str,
) -> Result<(), PersistenceError> {
    let updated_at: String = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

    diesel::replace_into(kv_entries::table)
        .values((
            kv_entries::entry_key.eq(key),
            kv_entries::entry_value.eq(value),
            kv_entries::updated_at.eq(&updated_at),
        ))
        .execute(conn)?;

    debug!(key, bytes = value.len(), "Stored entry");
    Ok(())
}

/// Deletes the entry under `key`, returning whether one existed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_entry(conn: &mut SqliteConnection, key: &str) -> Result<bool, PersistenceError> {
    let rows_affected: usize =
        diesel::delete(kv_entries::table.filter(kv_entries::entry_key.eq(key))).execute(conn)?;
    Ok(rows_affected > 0)
}

/// Lists stored keys that start with `prefix`, in key order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_keys(conn: &mut SqliteConnection, prefix: &str) -> Result<Vec<String>, PersistenceError> {
    let pattern: String = format!("{}%", escape_like(prefix));
    kv_entries::table
        .filter(kv_entries::entry_key.like(pattern).escape('\\'))
        .select(kv_entries::entry_key)
        .order(kv_entries::entry_key.asc())
        .load::<String>(conn)
        .map_err(Into::into)
}

fn escape_like(value: &str) -> String {
    let mut escaped: String = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
