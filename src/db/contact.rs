use rusqlite::{params, Connection};

use super::models::ContactMessage;
use super::new_id;

pub struct NewContactMessage<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub subject: &'a str,
    pub message: &'a str,
}

pub fn create(conn: &Connection, msg: &NewContactMessage<'_>) -> rusqlite::Result<String> {
    let id = new_id();
    conn.execute(
        "INSERT INTO contact_messages (id, name, email, subject, message)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, msg.name, msg.email, msg.subject, msg.message],
    )?;
    Ok(id)
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<ContactMessage>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, subject, message, created_at
         FROM contact_messages
         ORDER BY created_at, id",
    )?;
    let messages = stmt
        .query_map([], |row| {
            Ok(ContactMessage {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                subject: row.get(3)?,
                message: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(messages)
}
