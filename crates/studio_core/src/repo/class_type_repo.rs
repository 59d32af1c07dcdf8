//! Class type repository contract and SQLite implementation.
//!
//! # Invariants
//! - Name uniqueness is enforced here before insert/update, in addition to
//!   the store-level unique index.
//! - `delete_class_type` performs no cascading; dependents must already be
//!   resolved via [`crate::cascade`].

use crate::model::class_type::{ClassType, ClassTypeId, ClassTypePatch, NewClassType};
use crate::model::normalize_optional;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const CLASS_TYPE_COLUMNS: &[&str] = &["id", "name", "duration", "max_participants", "description"];

const CLASS_TYPE_SELECT_SQL: &str =
    "SELECT id, name, duration, max_participants, description FROM class_types";

/// Repository interface for class type CRUD operations.
pub trait ClassTypeRepository {
    fn add_class_type(&self, class_type: &NewClassType) -> RepoResult<ClassTypeId>;
    fn update_class_type(&self, id: ClassTypeId, patch: &ClassTypePatch) -> RepoResult<ClassType>;
    fn get_class_type(&self, id: ClassTypeId) -> RepoResult<Option<ClassType>>;
    fn list_class_types(&self) -> RepoResult<Vec<ClassType>>;
    fn delete_class_type(&self, id: ClassTypeId) -> RepoResult<()>;
    /// Number of sessions currently referencing this class type.
    fn usage_count(&self, id: ClassTypeId) -> RepoResult<u32>;
}

/// SQLite-backed class type repository.
pub struct SqliteClassTypeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteClassTypeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "class_types", CLASS_TYPE_COLUMNS)?;
        Ok(Self { conn })
    }

    fn check_name_unique(&self, name: &str, exclude: Option<ClassTypeId>) -> RepoResult<()> {
        let taken: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM class_types
                WHERE name = ?1 AND id != ?2
            );",
            params![name, exclude.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        if taken == 1 {
            return Err(RepoError::DuplicateName(name.to_string()));
        }
        Ok(())
    }
}

impl ClassTypeRepository for SqliteClassTypeRepository<'_> {
    fn add_class_type(&self, class_type: &NewClassType) -> RepoResult<ClassTypeId> {
        class_type.validate()?;
        self.check_name_unique(&class_type.name, None)?;

        let description = class_type.description.clone().and_then(normalize_optional);
        self.conn.execute(
            "INSERT INTO class_types (name, duration, max_participants, description)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                class_type.name,
                class_type.duration,
                class_type.max_participants,
                description
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_class_type(&self, id: ClassTypeId, patch: &ClassTypePatch) -> RepoResult<ClassType> {
        let mut class_type = self.get_class_type(id)?.ok_or(RepoError::NotFound {
            entity: "class type",
            id,
        })?;

        class_type.apply_patch(patch);
        class_type.validate()?;
        self.check_name_unique(&class_type.name, Some(id))?;

        let changed = self.conn.execute(
            "UPDATE class_types
             SET name = ?1, duration = ?2, max_participants = ?3, description = ?4
             WHERE id = ?5;",
            params![
                class_type.name,
                class_type.duration,
                class_type.max_participants,
                class_type.description,
                id
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "class type",
                id,
            });
        }

        Ok(class_type)
    }

    fn get_class_type(&self, id: ClassTypeId) -> RepoResult<Option<ClassType>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLASS_TYPE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_class_type_row(row)?));
        }
        Ok(None)
    }

    fn list_class_types(&self) -> RepoResult<Vec<ClassType>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CLASS_TYPE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut class_types = Vec::new();
        while let Some(row) = rows.next()? {
            class_types.push(parse_class_type_row(row)?);
        }
        Ok(class_types)
    }

    fn delete_class_type(&self, id: ClassTypeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM class_types WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "class type",
                id,
            });
        }
        Ok(())
    }

    fn usage_count(&self, id: ClassTypeId) -> RepoResult<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE class_type = ?1;",
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn parse_class_type_row(row: &Row<'_>) -> RepoResult<ClassType> {
    Ok(ClassType {
        id: row.get("id")?,
        name: row.get("name")?,
        duration: row.get("duration")?,
        max_participants: row.get("max_participants")?,
        description: row.get("description")?,
    })
}
