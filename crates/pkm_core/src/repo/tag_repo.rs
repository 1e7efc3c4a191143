//! SQLite tag repository.
//!
//! # Invariants
//! - Tag labels are unique and never blank.
//! - `parent_path` is stored as comma-separated ancestor ids, root first.
//! - Deleting a tag drops its document associations (FK cascade).

use crate::context::OpContext;
use crate::model::tag::{Tag, TagId};
use crate::repo::filter::{assignments, push_filters, Filter, FilterValue, Updater};
use crate::repo::repository::{RepoError, RepoResult, Repository};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TAG_SELECT_SQL: &str = "SELECT tags.id, tags.tag, tags.parent_path FROM tags WHERE 1 = 1";

const TAG_COLUMNS: &[(&str, &str)] = &[
    ("id", "tags.id"),
    ("tag", "tags.tag"),
    ("parent_path", "tags.parent_path"),
];

const TAG_ASSIGNMENTS: &[(&str, &str)] = &[("tag", "tag = ?"), ("parent_path", "parent_path = ?")];

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Wraps a connection returned by [`crate::db::open_db`].
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn select(&self, filters: &[Filter], limit: Option<u32>) -> RepoResult<Vec<Tag>> {
        let mut sql = String::from(TAG_SELECT_SQL);
        let mut binds: Vec<Value> = Vec::new();
        push_filters(&mut sql, &mut binds, filters, TAG_COLUMNS)?;
        sql.push_str(" ORDER BY tags.id ASC");
        if let Some(limit) = limit {
            sql.push_str(" LIMIT ?");
            binds.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn count(&self, filters: &[Filter]) -> RepoResult<u64> {
        let mut sql = String::from("SELECT COUNT(*) FROM tags WHERE 1 = 1");
        let mut binds: Vec<Value> = Vec::new();
        push_filters(&mut sql, &mut binds, filters, TAG_COLUMNS)?;
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Repository<Tag> for SqliteTagRepository<'_> {
    fn add(&mut self, ctx: &OpContext, tags: &[Tag]) -> RepoResult<()> {
        ctx.check()?;
        let tx = self.conn.unchecked_transaction()?;
        for tag in tags {
            let label = validate_label(&tag.tag)?;
            let changed = tx.execute(
                "INSERT OR IGNORE INTO tags (tag, parent_path) VALUES (?1, ?2);",
                params![label, encode_parent_path(&tag.parent_path)],
            )?;
            if changed == 0 {
                return Err(RepoError::AlreadyExists(format!("tag `{label}`")));
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn replace(&mut self, ctx: &OpContext, tags: &[Tag]) -> RepoResult<()> {
        ctx.check()?;
        let tx = self.conn.unchecked_transaction()?;
        for tag in tags {
            let label = validate_label(&tag.tag)?;
            let changed = tx.execute(
                "UPDATE tags
                 SET tag = ?2, parent_path = ?3
                 WHERE id = ?1 OR (?1 = 0 AND tag = ?2);",
                params![tag.id, label, encode_parent_path(&tag.parent_path)],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(tag_key(tag)));
            }
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
        let updaters = normalize_updaters(updaters)?;
        let mut binds: Vec<Value> = Vec::new();
        let set = assignments(&updaters, TAG_ASSIGNMENTS, &mut binds)?;
        let mut sql = format!("UPDATE tags SET {set} WHERE 1 = 1");
        push_filters(&mut sql, &mut binds, filters, TAG_COLUMNS)?;
        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        Ok(changed as u64)
    }

    fn delete(&mut self, ctx: &OpContext, tags: &[Tag]) -> RepoResult<()> {
        ctx.check()?;
        let tx = self.conn.unchecked_transaction()?;
        for tag in tags {
            let changed = tx.execute(
                "DELETE FROM tags WHERE id = ?1 OR (?1 = 0 AND tag = ?2);",
                params![tag.id, tag.tag],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(tag_key(tag)));
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_where(&mut self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<u64> {
        ctx.check()?;
        let mut sql = String::from("DELETE FROM tags WHERE 1 = 1");
        let mut binds: Vec<Value> = Vec::new();
        push_filters(&mut sql, &mut binds, filters, TAG_COLUMNS)?;
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

    fn does_exist(&self, ctx: &OpContext, tag: &Tag) -> RepoResult<bool> {
        ctx.check()?;
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?1 OR (?1 = 0 AND tag = ?2));",
            params![tag.id, tag.tag],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn does_exist_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<bool> {
        ctx.check()?;
        Ok(self.count(filters)? > 0)
    }

    fn get_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<Vec<Tag>> {
        ctx.check()?;
        self.select(filters, None)
    }

    fn get_first_where(&self, ctx: &OpContext, filters: &[Filter]) -> RepoResult<Option<Tag>> {
        ctx.check()?;
        Ok(self.select(filters, Some(1))?.into_iter().next())
    }

    fn get_all(&self, ctx: &OpContext) -> RepoResult<Vec<Tag>> {
        ctx.check()?;
        self.select(&[], None)
    }
}

/// Inserts `tag` when its label is unknown and returns the stored id.
pub(crate) fn ensure_tag(conn: &Connection, tag: &Tag) -> RepoResult<TagId> {
    let label = validate_label(&tag.tag)?;
    conn.execute(
        "INSERT OR IGNORE INTO tags (tag, parent_path) VALUES (?1, ?2);",
        params![label, encode_parent_path(&tag.parent_path)],
    )?;
    let id = conn.query_row("SELECT id FROM tags WHERE tag = ?1;", [label], |row| {
        row.get(0)
    })?;
    Ok(id)
}

pub(crate) fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let parent_path: String = row.get("parent_path")?;
    Ok(Tag {
        id: row.get("id")?,
        tag: row.get("tag")?,
        parent_path: decode_parent_path(&parent_path)?,
    })
}

pub(crate) fn encode_parent_path(parent_path: &[TagId]) -> String {
    parent_path
        .iter()
        .map(TagId::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn decode_parent_path(value: &str) -> RepoResult<Vec<TagId>> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|segment| {
            segment.parse::<TagId>().map_err(|_| {
                RepoError::InvalidData(format!("invalid tag id `{segment}` in tags.parent_path"))
            })
        })
        .collect()
}

/// Validates `tag` and `parent_path` assignments before they reach storage.
fn normalize_updaters(updaters: &[Updater]) -> RepoResult<Vec<Updater>> {
    updaters
        .iter()
        .map(|updater| {
            let value = match (updater.field.as_str(), &updater.value) {
                ("tag", FilterValue::Text(label)) => FilterValue::from(validate_label(label)?),
                ("parent_path", FilterValue::Text(path)) => {
                    let ids = decode_parent_path(path).map_err(|_| {
                        RepoError::InvalidFilter(format!("invalid `parent_path` value `{path}`"))
                    })?;
                    FilterValue::from(encode_parent_path(&ids))
                }
                ("parent_path", FilterValue::Integer(id)) => FilterValue::from(id.to_string()),
                ("tag" | "parent_path", FilterValue::Null) => {
                    return Err(RepoError::InvalidFilter(format!(
                        "`{}` must not be null",
                        updater.field
                    )));
                }
                _ => updater.value.clone(),
            };
            Ok(Updater::set(updater.field.clone(), value))
        })
        .collect()
}

fn validate_label(label: &str) -> RepoResult<&str> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidData("tag label must not be blank".to_string()));
    }
    Ok(trimmed)
}

fn tag_key(tag: &Tag) -> String {
    if tag.id != 0 {
        format!("tag #{}", tag.id)
    } else {
        format!("tag `{}`", tag.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_parent_path, encode_parent_path, SqliteTagRepository};
    use crate::context::OpContext;
    use crate::db::open_db_in_memory;
    use crate::model::tag::Tag;
    use crate::repo::{Filter, FilterOperator, RepoError, Repository, Updater};

    #[test]
    fn parent_path_encoding_round_trips() {
        assert_eq!(encode_parent_path(&[1, 22, 3]), "1,22,3");
        assert_eq!(decode_parent_path("1,22,3").expect("decode"), vec![1, 22, 3]);
        assert!(decode_parent_path("").expect("decode").is_empty());
        assert!(matches!(
            decode_parent_path("1,x"),
            Err(RepoError::InvalidData(_))
        ));
    }

    #[test]
    fn add_get_update_and_delete_tags() {
        let conn = open_db_in_memory().expect("open db");
        let mut repo = SqliteTagRepository::new(&conn);
        let ctx = OpContext::background();

        repo.add(&ctx, &[Tag::new("lang"), Tag::new("rust")])
            .expect("add tags");
        let lang = repo
            .get_first_where(&ctx, &[Filter::eq("tag", "lang")])
            .expect("query")
            .expect("lang exists");

        let mut rust = repo
            .get_first_where(&ctx, &[Filter::eq("tag", "rust")])
            .expect("query")
            .expect("rust exists");
        rust.parent_path = vec![lang.id];
        repo.replace(&ctx, &[rust.clone()]).expect("replace");
        assert_eq!(
            repo.get_where(&ctx, &[Filter::eq("id", rust.id)])
                .expect("query")[0]
                .parent_path,
            vec![lang.id]
        );

        let renamed = repo
            .update_where(
                &ctx,
                &[Filter::new("tag", FilterOperator::Like, "ru%")],
                &[Updater::set("tag", "rustlang")],
            )
            .expect("update where");
        assert_eq!(renamed, 1);
        assert!(repo.does_exist(&ctx, &Tag::new("rustlang")).expect("exists"));

        repo.delete(&ctx, &[lang]).expect("delete");
        assert_eq!(repo.count_all(&ctx).expect("count"), 1);
        assert_eq!(repo.delete_where(&ctx, &[]).expect("delete all"), 1);
        assert!(repo.get_all(&ctx).expect("all").is_empty());
    }

    #[test]
    fn filtered_update_rejects_malformed_values() {
        let conn = open_db_in_memory().expect("open db");
        let mut repo = SqliteTagRepository::new(&conn);
        let ctx = OpContext::background();
        repo.add(&ctx, &[Tag::new("lang"), Tag::new("rust")])
            .expect("add tags");

        for updater in [
            Updater::set("parent_path", "oops"),
            Updater::set("parent_path", "1,,2"),
            Updater::set("parent_path", None::<String>),
        ] {
            assert!(matches!(
                repo.update_where(&ctx, &[], &[updater]),
                Err(RepoError::InvalidFilter(_))
            ));
        }
        assert!(matches!(
            repo.update_where(&ctx, &[], &[Updater::set("tag", " ")]),
            Err(RepoError::InvalidData(_))
        ));
        assert_eq!(repo.get_all(&ctx).expect("all").len(), 2);

        let lang = repo
            .get_first_where(&ctx, &[Filter::eq("tag", "lang")])
            .expect("query")
            .expect("lang exists");
        let rust = [Filter::eq("tag", "rust")];
        repo.update_where(&ctx, &rust, &[Updater::set("parent_path", lang.id)])
            .expect("set parent");
        let stored = repo.get_where(&ctx, &rust).expect("query");
        assert_eq!(stored[0].parent_path, vec![lang.id]);
    }

    #[test]
    fn duplicate_and_blank_labels_are_rejected() {
        let conn = open_db_in_memory().expect("open db");
        let mut repo = SqliteTagRepository::new(&conn);
        let ctx = OpContext::background();

        repo.add(&ctx, &[Tag::new("dup")]).expect("first add");
        assert!(matches!(
            repo.add(&ctx, &[Tag::new("dup")]),
            Err(RepoError::AlreadyExists(_))
        ));
        assert!(matches!(
            repo.add(&ctx, &[Tag::new("  ")]),
            Err(RepoError::InvalidData(_))
        ));
        assert!(matches!(
            repo.delete(&ctx, &[Tag::new("missing")]),
            Err(RepoError::NotFound(_))
        ));
    }

    #[test]
    fn cancelled_context_interrupts_before_storage() {
        let conn = open_db_in_memory().expect("open db");
        let mut repo = SqliteTagRepository::new(&conn);
        let ctx = OpContext::background();
        ctx.cancel_handle().cancel();

        assert!(matches!(
            repo.add(&ctx, &[Tag::new("never")]),
            Err(RepoError::Interrupted(_))
        ));
        assert_eq!(repo.count_all(&OpContext::background()).expect("count"), 0);
    }
}
