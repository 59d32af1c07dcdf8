//! Client repository contract and SQLite implementation.
//!
//! # Invariants
//! - Phone format and uniqueness are checked before any write; a collision
//!   fails with `DuplicatePhone` and leaves the store unchanged.
//! - Updates are read-modify-merge-write: omitted patch fields persist.

use crate::model::client::{Client, ClientId, ClientPatch, NewClient};
use crate::model::normalize_optional;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const CLIENT_COLUMNS: &[&str] = &["id", "name", "phone", "email", "notes"];

const CLIENT_SELECT_SQL: &str = "SELECT id, name, phone, email, notes FROM clients";

/// Repository interface for client CRUD operations.
pub trait ClientRepository {
    fn add_client(&self, client: &NewClient) -> RepoResult<ClientId>;
    fn update_client(&self, id: ClientId, patch: &ClientPatch) -> RepoResult<Client>;
    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>>;
    fn list_clients(&self) -> RepoResult<Vec<Client>>;
    fn delete_client(&self, id: ClientId) -> RepoResult<()>;
}

/// SQLite-backed client repository.
pub struct SqliteClientRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClientRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "clients", CLIENT_COLUMNS)?;
        Ok(Self { conn })
    }

    /// Fails with `DuplicatePhone` when another client already owns the
    /// given non-empty phone. `exclude` skips the record being updated.
    fn check_phone_unique(&self, phone: &str, exclude: Option<ClientId>) -> RepoResult<()> {
        let taken: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM clients
                WHERE phone = ?1 AND id != ?2
            );",
            params![phone, exclude.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        if taken == 1 {
            return Err(RepoError::DuplicatePhone(phone.to_string()));
        }
        Ok(())
    }
}

impl ClientRepository for SqliteClientRepository<'_> {
    fn add_client(&self, client: &NewClient) -> RepoResult<ClientId> {
        let phone = client.phone.clone().and_then(normalize_optional);
        let normalized = NewClient {
            name: client.name.clone(),
            phone,
            email: client.email.clone().and_then(normalize_optional),
            notes: client.notes.clone().and_then(normalize_optional),
        };
        normalized.validate()?;

        if let Some(phone) = normalized.phone.as_deref() {
            self.check_phone_unique(phone, None)?;
        }

        self.conn.execute(
            "INSERT INTO clients (name, phone, email, notes) VALUES (?1, ?2, ?3, ?4);",
            params![
                normalized.name,
                normalized.phone,
                normalized.email,
                normalized.notes
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_client(&self, id: ClientId, patch: &ClientPatch) -> RepoResult<Client> {
        let mut client = self.get_client(id)?.ok_or(RepoError::NotFound {
            entity: "client",
            id,
        })?;

        client.apply_patch(patch);
        client.validate()?;

        if let Some(phone) = client.phone.as_deref() {
            self.check_phone_unique(phone, Some(id))?;
        }

        let changed = self.conn.execute(
            "UPDATE clients SET name = ?1, phone = ?2, email = ?3, notes = ?4 WHERE id = ?5;",
            params![client.name, client.phone, client.email, client.notes, id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "client",
                id,
            });
        }

        Ok(client)
    }

    fn get_client(&self, id: ClientId) -> RepoResult<Option<Client>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLIENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_client_row(row)?));
        }
        Ok(None)
    }

    fn list_clients(&self) -> RepoResult<Vec<Client>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLIENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut clients = Vec::new();
        while let Some(row) = rows.next()? {
            clients.push(parse_client_row(row)?);
        }
        Ok(clients)
    }

    fn delete_client(&self, id: ClientId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM clients WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "client",
                id,
            });
        }
        Ok(())
    }
}

fn parse_client_row(row: &Row<'_>) -> RepoResult<Client> {
    Ok(Client {
        id: row.get("id")?,
        name: row.get("name")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        notes: row.get("notes")?,
    })
}
