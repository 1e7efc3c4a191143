//! Document repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist documents with their type, tags, links and backlinks.
//! - Manage the document type catalogue.
//!
//! # Invariants
//! - Deletes are soft: `deleted_at` is set and the row stays.
//! - Queries hide soft-deleted rows unless a filter names `deleted_at`.
//! - Adding a path that is tombstoned revives the row; adding an active path
//!   fails with `AlreadyExists`.
//! - Association order is preserved through a `position` column.
//! - Related documents are loaded one level deep.

use crate::context::OpContext;
use crate::model::document::{Document, DocumentId};
use crate::repo::filter::{
    assignments, names_field, push_filters, Filter, FilterValue, Updater,
};
use crate::repo::repository::{RepoError, RepoResult, Repository};
use crate::repo::tag_repo::{ensure_tag, parse_tag_row};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const NOW_MS_SQL: &str = "(strftime('%s', 'now') * 1000)";

const DOCUMENT_TYPE_SQL: &str =
    "(SELECT name FROM document_types WHERE document_types.id = documents.document_type_id)";

const DOCUMENT_COLUMNS: &[(&str, &str)] = &[
    ("id", "documents.id"),
    ("path", "documents.path"),
    ("document_type", DOCUMENT_TYPE_SQL),
    ("created_at", "documents.created_at"),
    ("updated_at", "documents.updated_at"),
    ("deleted_at", "documents.deleted_at"),
];

const DOCUMENT_ASSIGNMENTS: &[(&str, &str)] = &[
    ("path", "path = ?"),
    ("deleted_at", "deleted_at = ?"),
    ("document_type", "document_type_id = ?"),
];

/// Document persistence plus the document type catalogue.
pub trait DocumentRepository: Repository<Document> {
    /// Registers new type names. Existing names fail with `AlreadyExists`.
    fn add_type(&mut self, ctx: &OpContext, names: &[String]) -> RepoResult<()>;
    /// Removes type names; documents of a removed type become untyped.
    fn delete_type(&mut self, ctx: &OpContext, names: &[String]) -> RepoResult<()>;
    /// Renames a type, keeping its documents attached.
    fn update_type(&mut self, ctx: &OpContext, old: &str, new: &str) -> RepoResult<()>;
}

/// SQLite-backed document repository.
pub struct SqliteDocumentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentRepository<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn select(&self, filters: &[Filter], limit: Option<u32>) -> RepoResult<Vec<Document>> {
        let mut sql = format!(
            "SELECT
                documents.id,
                documents.path,
                {DOCUMENT_TYPE_SQL} AS document_type,
                documents.created_at,
                documents.updated_at,
                documents.deleted_at
             FROM documents
             WHERE 1 = 1"
        );
        let mut binds: Vec<Value> = Vec::new();
        push_document_filters(&mut sql, &mut binds, filters)?;
        sql.push_str(" ORDER BY documents.id ASC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            binds.push(Value::Integer(i64::from(limit)));
        }

        let mut documents = {
            let mut stmt = self.conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(binds), parse_document_row)?;
            rows.collect::<Result<Vec<_>, _>>()?
        };
        for document in &mut documents {
            self.load_associations(document)?;
        }
        Ok(documents)
    }

    fn count(&self, filters: &[Filter]) -> RepoResult<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM documents WHERE 1 = 1");
        let mut binds: Vec<Value> = Vec::new();
        push_document_filters(&mut sql, &mut binds, filters)?;
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        Ok(count as u64)
    }

    fn load_associations(&self, document: &mut Document) -> RepoResult<()> {
        let mut stmt = self.conn.prepare(
            "SELECT tags.id, tags.tag, tags.parent_path
             FROM document_tags
             JOIN tags ON tags.id = document_tags.tag_id
             WHERE document_tags.document_id = ?1
             ORDER BY document_tags.position ASC;",
        )?;
        let mut rows = stmt.query([document.id])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        document.tags = tags;

        document.linked_documents = self.related(
            "SELECT d.id, d.path,
                    (SELECT name FROM document_types WHERE document_types.id = d.document_type_id) AS document_type,
                    d.created_at, d.updated_at, d.deleted_at
             FROM document_links AS l
             JOIN documents AS d ON d.id = l.target_id
             WHERE l.source_id = ?1 AND d.deleted_at IS NULL
             ORDER BY l.position ASC;",
            document.id,
        )?;
        document.backlinked_documents = self.related(
            "SELECT d.id, d.path,
                    (SELECT name FROM document_types WHERE document_types.id = d.document_type_id) AS document_type,
                    d.created_at, d.updated_at, d.deleted_at
             FROM document_backlinks AS b
             JOIN documents AS d ON d.id = b.source_id
             WHERE b.target_id = ?1 AND d.deleted_at IS NULL
             ORDER BY b.position ASC;",
            document.id,
        )?;
        Ok(())
    }

    fn related(&self, sql: &str, id: DocumentId) -> RepoResult<Vec<Document>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map([id], parse_document_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl Repository<Document> for SqliteDocumentRepository<'_> {
    fn add(&mut self, ctx: &OpContext, documents: &[Document]) -> RepoResult<()> {
        ctx.check()?;
        let tx = self.conn.unchecked_transaction()?;
        for document in documents {
            let path = validate_path(&document.path)?;
            let type_id = ensure_type(&tx, document.document_type.as_deref())?;
            let changed = tx.execute(
                &format!(
                    "INSERT INTO documents (path, document_type_id)
                     VALUES (?1, ?2)
                     ON CONFLICT(path) DO UPDATE SET
                        document_type_id = excluded.document_type_id,
                        created_at = {NOW_MS_SQL},
                        updated_at = {NOW_MS_SQL},
                        deleted_at = NULL
                     WHERE documents.deleted_at IS NOT NULL;"
                ),
                params![path, type_id],
            )?;
            if changed == 0 {
                return Err(RepoError::AlreadyExists(format!("document `{path}`")));
            }
            let id: DocumentId =
                tx.query_row("SELECT id FROM documents WHERE path = ?1;", [path], |row| {
                    row.get(0)
                })?;
            write_associations(&tx, id, document)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn replace(&mut self, ctx: &OpContext, documents: &[Document]) -> RepoResult<()> {
        ctx.check()?;
        let tx = self.conn.unchecked_transaction()?;
        for document in documents {
            let path = validate_path(&document.path)?;
            let id: Option<DocumentId> = tx
                .query_row(
                    "SELECT id FROM documents
                     WHERE (id = ?1 OR (?1 = 0 AND path = ?2))
                       AND deleted_at IS NULL;",
                    params![document.id, path],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(id) = id else {
                return Err(RepoError::NotFound(document_key(document)));
            };

            let type_id = ensure_type(&tx, document.document_type.as_deref())?;
            tx.execute(
                &format!(
                    "UPDATE documents
                     SET path = ?2, document_type_id = ?3, updated_at = {NOW_MS_SQL}
                     WHERE id = ?1;"
                ),
                params![id, path, type_id],
            )?;
            write_associations(&tx, id, document)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn update_where(
        &mut self,
        ctx: &OpContext,
        filters: &[Filter],
        updaters: &[Updater],
    ) -> RepoResult<u64> {
        ctx.check()?;
        let tx = self.conn.unchecked_transaction()?;
        let updaters = resolve_type_updaters(&tx, updaters)?;
        let mut binds: Vec<Value> = Vec::new();
        let set = assignments(&updaters, DOCUMENT_ASSIGNMENTS, &mut binds)?;
        let mut sql = format!("UPDATE documents SET {set}, updated_at = {NOW_MS_SQL} WHERE 1 = 1");
        push_document_filters(&mut sql, &mut binds, filters)?;
        let changed = tx.execute(&sql, params_from_iter(binds))?;
        tx.commit()?;
        Ok(changed as u64)
    }

    fn delete(&mut self, ctx: &OpContext, documents: &[Document]) -> RepoResult<()> {
        ctx.check()?;
        let tx = self.conn.unchecked_transaction()?;
        for document in documents {
            let changed = tx.execute(
                &format!(
                    "UPDATE documents
                     SET deleted_at = {NOW_MS_SQL}, updated_at = {NOW_MS_SQL}
                     WHERE (id = ?1 OR (?1 = 0 AND path = ?2))
                       AND deleted_at IS NULL;"
                ),
                params![document.id, document.path],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(document_key(document)));
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_where(&mut self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<u64> {
        ctx.check()?;
        let mut sql = format!(
            "UPDATE documents
             SET deleted_at = {NOW_MS_SQL}, updated_at = {NOW_MS_SQL}
             WHERE documents.deleted_at IS NULL"
        );
        let mut binds: Vec<Value> = Vec::new();
        push_filters(&mut sql, &mut binds, filters, DOCUMENT_COLUMNS)?;
        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        Ok(changed as u64)
    }

    fn count_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<u64> {
        ctx.check()?;
        self.count(filters)
    }

    fn count_all(&self, ctx: &OpContext) -> RepoResult<u64> {
        ctx.check()?;
        self.count(&[])
    }

    fn does_exist(&self, ctx: &OpContext, document: &Document) -> RepoResult<bool> {
        ctx.check()?;
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM documents
                WHERE (id = ?1 OR (?1 = 0 AND path = ?2))
                  AND deleted_at IS NULL
             );",
            params![document.id, document.path],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn does_exist_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<bool> {
        ctx.check()?;
        Ok(self.count(filters)? > 0)
    }

    fn get_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<Vec<Document>> {
        ctx.check()?;
        self.select(filters, None)
    }

    fn get_first_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<Option<Document>> {
        ctx.check()?;
        Ok(self.select(filters, Some(1))?.into_iter().next())
    }

    fn get_all(&self, ctx: &OpContext) -> RepoResult<Vec<Document>> {
        ctx.check()?;
        self.select(&[], None)
    }
}

impl DocumentRepository for SqliteDocumentRepository<'_> {
    fn add_type(&mut self, ctx: &OpContext, names: &[String]) -> RepoResult<()> {
        ctx.check()?;
        let tx = self.conn.unchecked_transaction()?;
        for name in names {
            let name = validate_type_name(name)?;
            let changed = tx.execute(
                "INSERT OR IGNORE INTO document_types (name) VALUES (?1);",
                [name],
            )?;
            if changed == 0 {
                return Err(RepoError::AlreadyExists(format!("document type `{name}`")));
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_type(&mut self, ctx: &OpContext, names: &[String]) -> RepoResult<()> {
        ctx.check()?;
        let tx = self.conn.unchecked_transaction()?;
        for name in names {
            let changed = tx.execute("DELETE FROM document_types WHERE name = ?1;", [name])?;
            if changed == 0 {
                return Err(RepoError::NotFound(format!("document type `{name}`")));
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn update_type(&mut self, ctx: &OpContext, old: &str, new: &str) -> RepoResult<()> {
        ctx.check()?;
        let new = validate_type_name(new)?;
        let taken: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM document_types WHERE name = ?1);",
            [new],
            |row| row.get(0),
        )?;
        if taken == 1 && old != new {
            return Err(RepoError::AlreadyExists(format!("document type `{new}`")));
        }
        let changed = self.conn.execute(
            "UPDATE document_types SET name = ?2 WHERE name = ?1;",
            params![old, new],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(format!("document type `{old}`")));
        }
        Ok(())
    }
}

fn push_document_filters(
    sql: &mut String,
    binds: &mut Vec<Value>,
    filters: &[Filter],
) -> RepoResult<()> {
    if !names_field(filters, "deleted_at") {
        sql.push_str(" AND documents.deleted_at IS NULL");
    }
    push_filters(sql, binds, filters, DOCUMENT_COLUMNS)
}

/// Rewrites tag, link and backlink rows of `id` from `document`.
///
/// Unknown tags are created. Link targets must be active documents.
fn write_associations(conn: &Connection, id: DocumentId, document: &Document) -> RepoResult<()> {
    conn.execute("DELETE FROM document_tags WHERE document_id = ?1;", [id])?;
    conn.execute("DELETE FROM document_links WHERE source_id = ?1;", [id])?;
    conn.execute("DELETE FROM document_backlinks WHERE target_id = ?1;", [id])?;

    for (position, tag) in document.tags.iter().enumerate() {
        let tag_id = ensure_tag(conn, tag)?;
        conn.execute(
            "INSERT OR IGNORE INTO document_tags (document_id, tag_id, position)
             VALUES (?1, ?2, ?3);",
            params![id, tag_id, position as i64],
        )?;
    }
    for (position, linked) in document.linked_documents.iter().enumerate() {
        let target_id = resolve_active_id(conn, linked)?;
        conn.execute(
            "INSERT OR IGNORE INTO document_links (source_id, target_id, position)
             VALUES (?1, ?2, ?3);",
            params![id, target_id, position as i64],
        )?;
    }
    for (position, backlinked) in document.backlinked_documents.iter().enumerate() {
        let source_id = resolve_active_id(conn, backlinked)?;
        conn.execute(
            "INSERT OR IGNORE INTO document_backlinks (target_id, source_id, position)
             VALUES (?1, ?2, ?3);",
            params![id, source_id, position as i64],
        )?;
    }
    Ok(())
}

fn resolve_active_id(conn: &Connection, document: &Document) -> RepoResult<DocumentId> {
    conn.query_row(
        "SELECT id FROM documents
         WHERE (id = ?1 OR (?1 = 0 AND path = ?2))
           AND deleted_at IS NULL;",
        params![document.id, document.path],
        |row| row.get(0),
    )
    .optional()?
    .ok_or_else(|| RepoError::NotFound(document_key(document)))
}

/// Returns the id of `name`, creating the type on first use.
fn ensure_type(conn: &Connection, name: Option<&str>) -> RepoResult<Option<i64>> {
    let Some(name) = name else {
        return Ok(None);
    };
    let name = validate_type_name(name)?;
    conn.execute(
        "INSERT OR IGNORE INTO document_types (name) VALUES (?1);",
        [name],
    )?;
    let id = conn.query_row(
        "SELECT id FROM document_types WHERE name = ?1;",
        [name],
        |row| row.get(0),
    )?;
    Ok(Some(id))
}

/// Swaps `document_type` names for type ids, creating unknown types.
fn resolve_type_updaters(conn: &Connection, updaters: &[Updater]) -> RepoResult<Vec<Updater>> {
    updaters
        .iter()
        .map(|updater| {
            if updater.field != "document_type" {
                return Ok(updater.clone());
            }
            let type_id = match &updater.value {
                FilterValue::Null => None,
                FilterValue::Text(name) => ensure_type(conn, Some(name.as_str()))?,
                FilterValue::Integer(_) => {
                    return Err(RepoError::InvalidFilter(
                        "`document_type` expects a type name".to_string(),
                    ));
                }
            };
            Ok(Updater::set("document_type", type_id))
        })
        .collect()
}

fn parse_document_row(row: &Row<'_>) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get("id")?,
        path: row.get("path")?,
        document_type: row.get("document_type")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
        ..Document::default()
    })
}

fn validate_path(path: &str) -> RepoResult<&str> {
    if path.trim().is_empty() {
        return Err(RepoError::InvalidData(
            "document path must not be blank".to_string(),
        ));
    }
    Ok(path)
}

fn validate_type_name(name: &str) -> RepoResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidData(
            "document type must not be blank".to_string(),
        ));
    }
    Ok(trimmed)
}

fn document_key(document: &Document) -> String {
    if document.id != 0 {
        format!("document #{}", document.id)
    } else {
        format!("document `{}`", document.path)
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentRepository, SqliteDocumentRepository};
    use crate::context::OpContext;
    use crate::db::open_db_in_memory;
    use crate::model::document::Document;
    use crate::repo::{Filter, FilterOperator, RepoError, Repository, Updater};

    #[test]
    fn soft_delete_hides_rows_and_re_add_revives_them() {
        let conn = open_db_in_memory().expect("open db");
        let mut repo = SqliteDocumentRepository::new(&conn);
        let ctx = OpContext::background();

        repo.add(&ctx, &[Document::new("a.md")]).expect("add");
        repo.delete(&ctx, &[Document::new("a.md")]).expect("delete");
        assert_eq!(repo.count_all(&ctx).expect("count"), 0);

        let deleted = Filter::new("deleted_at", FilterOperator::IsNotNull, None::<i64>);
        let tombstoned = repo.get_where(&ctx, &[deleted]).expect("query tombstones");
        assert_eq!(tombstoned.len(), 1);
        assert!(!tombstoned[0].is_active());

        repo.add(&ctx, &[Document::new("a.md")]).expect("revive");
        let revived = repo
            .get_first_where(&ctx, &[Filter::eq("path", "a.md")])
            .expect("query")
            .expect("revived row");
        assert_eq!(revived.id, tombstoned[0].id);
        assert!(revived.is_active());

        assert!(matches!(
            repo.add(&ctx, &[Document::new("a.md")]),
            Err(RepoError::AlreadyExists(_))
        ));
    }

    #[test]
    fn associations_round_trip_in_order() {
        let conn = open_db_in_memory().expect("open db");
        let mut repo = SqliteDocumentRepository::new(&conn);
        let ctx = OpContext::background();

        repo.add(&ctx, &[Document::new("b.md"), Document::new("c.md")])
            .expect("add targets");
        repo.add(
            &ctx,
            &[Document::new("a.md")
                .with_type("note")
                .with_tags(["zeta", "alpha"])
                .with_links(["c.md", "b.md"])
                .with_backlinks(["b.md"])],
        )
        .expect("add source");

        let stored = repo
            .get_first_where(&ctx, &[Filter::eq("document_type", "note")])
            .expect("query")
            .expect("typed document");
        assert_eq!(stored.path, "a.md");
        assert_eq!(stored.tag_labels(), vec!["zeta", "alpha"]);
        assert_eq!(stored.linked_paths(), vec!["c.md", "b.md"]);
        assert_eq!(stored.backlinked_paths(), vec!["b.md"]);
        assert!(stored.created_at > 0);

        let mut changed = stored.clone();
        changed.tags.retain(|tag| tag.tag == "alpha");
        changed.linked_documents.clear();
        repo.replace(&ctx, &[changed]).expect("replace");
        let stored = repo
            .get_where(&ctx, &[Filter::eq("id", stored.id)])
            .expect("query")
            .remove(0);
        assert_eq!(stored.tag_labels(), vec!["alpha"]);
        assert!(stored.linked_documents.is_empty());
    }

    #[test]
    fn link_to_unknown_document_fails_without_partial_write() {
        let conn = open_db_in_memory().expect("open db");
        let mut repo = SqliteDocumentRepository::new(&conn);
        let ctx = OpContext::background();

        let err = repo
            .add(&ctx, &[Document::new("a.md").with_links(["ghost.md"])])
            .expect_err("unknown target");
        assert!(matches!(err, RepoError::NotFound(_)));
        assert_eq!(repo.count_all(&ctx).expect("count"), 0);
    }

    #[test]
    fn filtered_update_and_delete_report_affected_rows() {
        let conn = open_db_in_memory().expect("open db");
        let mut repo = SqliteDocumentRepository::new(&conn);
        let ctx = OpContext::background();

        repo.add(
            &ctx,
            &[
                Document::new("notes/a.md"),
                Document::new("notes/b.md"),
                Document::new("misc.md"),
            ],
        )
        .expect("add");

        let moved = repo
            .update_where(
                &ctx,
                &[Filter::eq("path", "misc.md")],
                &[Updater::set("path", "notes/misc.md")],
            )
            .expect("update where");
        assert_eq!(moved, 1);

        let notes = [Filter::new("path", FilterOperator::Like, "notes/%")];
        assert_eq!(repo.count_where(&ctx, &notes).expect("count"), 3);
        assert_eq!(repo.delete_where(&ctx, &notes).expect("delete where"), 3);
        assert!(!repo.does_exist_where(&ctx, &notes).expect("exists"));
        let unknown = [Filter::eq("color", "red")];
        assert!(matches!(
            repo.update_where(&ctx, &unknown, &[Updater::set("path", "x")]),
            Err(RepoError::InvalidFilter(_))
        ));
    }

    fn stored_type(repo: &SqliteDocumentRepository<'_>, path: &str) -> Option<String> {
        repo.get_first_where(&OpContext::background(), &[Filter::eq("path", path)])
            .expect("query")
            .expect("document")
            .document_type
    }

    #[test]
    fn filtered_type_update_creates_unknown_types() {
        let conn = open_db_in_memory().expect("open db");
        let mut repo = SqliteDocumentRepository::new(&conn);
        let ctx = OpContext::background();
        repo.add(&ctx, &[Document::new("a.md").with_type("bookmark")])
            .expect("add");
        let target = [Filter::eq("path", "a.md")];

        let changed = repo
            .update_where(&ctx, &target, &[Updater::set("document_type", "boookmark")])
            .expect("retype");
        assert_eq!(changed, 1);
        assert_eq!(stored_type(&repo, "a.md").as_deref(), Some("boookmark"));

        repo.update_where(&ctx, &target, &[Updater::set("document_type", None::<String>)])
            .expect("clear type");
        assert_eq!(stored_type(&repo, "a.md"), None);

        assert!(matches!(
            repo.update_where(&ctx, &target, &[Updater::set("document_type", 7_i64)]),
            Err(RepoError::InvalidFilter(_))
        ));
        assert!(matches!(
            repo.update_where(&ctx, &target, &[Updater::set("document_type", "  ")]),
            Err(RepoError::InvalidData(_))
        ));
    }

    #[test]
    fn document_types_can_be_added_renamed_and_deleted() {
        let conn = open_db_in_memory().expect("open db");
        let mut repo = SqliteDocumentRepository::new(&conn);
        let ctx = OpContext::background();

        repo.add_type(&ctx, &["bookmark".to_string()]).expect("add type");
        assert!(matches!(
            repo.add_type(&ctx, &["bookmark".to_string()]),
            Err(RepoError::AlreadyExists(_))
        ));
        repo.add(&ctx, &[Document::new("x.md").with_type("bookmark")])
            .expect("add typed");

        repo.update_type(&ctx, "bookmark", "link").expect("rename");
        let stored = repo
            .get_first_where(&ctx, &[Filter::eq("path", "x.md")])
            .expect("query")
            .expect("document");
        assert_eq!(stored.document_type.as_deref(), Some("link"));

        repo.delete_type(&ctx, &["link".to_string()]).expect("delete type");
        let stored = repo
            .get_first_where(&ctx, &[Filter::eq("path", "x.md")])
            .expect("query")
            .expect("document");
        assert_eq!(stored.document_type, None);
        assert!(matches!(
            repo.update_type(&ctx, "link", "other"),
            Err(RepoError::NotFound(_))
        ));
    }
}
