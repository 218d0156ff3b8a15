use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::Admin;

/// Insert the admin unless the username already exists. Returns true when a row was added.
pub fn seed_admin(conn: &Connection, username: &str, password: &str) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO admins (username, password) VALUES (?1, ?2)",
        params![username, password],
    )?;
    Ok(changed > 0)
}

pub fn get_admin_by_username(conn: &Connection, username: &str) -> Result<Option<Admin>, DatabaseError> {
    conn.query_row(
        "SELECT id, username, password FROM admins WHERE username = ?1",
        params![username],
        |row| {
            Ok(Admin {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(DatabaseError::from)
}
