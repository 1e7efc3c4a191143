//! Document content repository contract and filesystem implementation.
//!
//! # Responsibility
//! - Store the raw text of documents keyed by content path.
//!
//! # Invariants
//! - Content paths are relative and only contain normal components; absolute
//!   paths and `..`/`.` segments fail with `InvalidData`.
//! - A batch is validated completely before the first file is touched.

use crate::config::CoreConfig;
use crate::context::OpContext;
use crate::model::content::{ContentEntry, PathMove};
use crate::repo::repository::{RepoError, RepoResult};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Raw content storage keyed by path.
pub trait DocumentContentRepository {
    /// Stores new entries. Existing paths fail with `AlreadyExists`.
    fn add(&mut self, ctx: &OpContext, entries: &[ContentEntry]) -> RepoResult<()>;
    /// Overwrites existing entries. Unknown paths fail with `NotFound`.
    fn update(&mut self, ctx: &OpContext, entries: &[ContentEntry]) -> RepoResult<()>;
    /// Reads entries in the order of `paths`.
    fn get(&self, ctx: &OpContext, paths: &[String]) -> RepoResult<Vec<ContentEntry>>;
    fn delete(&mut self, ctx: &OpContext, paths: &[String]) -> RepoResult<()>;
    /// Relocates content. Targets must not exist yet.
    fn move_paths(&mut self, ctx: &OpContext, moves: &[PathMove]) -> RepoResult<()>;
}

/// Stores each document as one UTF-8 file below `root`.
#[derive(Debug, Clone)]
pub struct FsDocumentContentRepository {
    root: PathBuf,
}

impl FsDocumentContentRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Opens the configured content root, creating it when missing.
    pub fn from_config(config: &CoreConfig) -> RepoResult<Self> {
        fs::create_dir_all(&config.content_root)
            .map_err(|err| io_error(&config.content_root.display().to_string(), err))?;
        Ok(Self::new(config.content_root.clone()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> RepoResult<PathBuf> {
        let relative = Path::new(path);
        let only_normal = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if path.is_empty() || !only_normal {
            return Err(RepoError::InvalidData(format!(
                "content path `{path}` must be relative without `.` or `..` segments"
            )));
        }
        Ok(self.root.join(relative))
    }

    fn resolve_existing(&self, path: &str) -> RepoResult<PathBuf> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(RepoError::NotFound(format!("content `{path}`")));
        }
        Ok(full)
    }

    fn resolve_vacant(&self, path: &str) -> RepoResult<PathBuf> {
        let full = self.resolve(path)?;
        if full.exists() {
            return Err(RepoError::AlreadyExists(format!("content `{path}`")));
        }
        Ok(full)
    }
}

impl DocumentContentRepository for FsDocumentContentRepository {
    fn add(&mut self, ctx: &OpContext, entries: &[ContentEntry]) -> RepoResult<()> {
        ctx.check()?;
        reject_duplicates(entries.iter().map(|entry| entry.path.as_str()))?;
        let targets = entries
            .iter()
            .map(|entry| self.resolve_vacant(&entry.path))
            .collect::<RepoResult<Vec<_>>>()?;

        for (entry, target) in entries.iter().zip(targets) {
            write_file(&entry.path, &target, &entry.content)?;
        }
        Ok(())
    }

    fn update(&mut self, ctx: &OpContext, entries: &[ContentEntry]) -> RepoResult<()> {
        ctx.check()?;
        let targets = entries
            .iter()
            .map(|entry| self.resolve_existing(&entry.path))
            .collect::<RepoResult<Vec<_>>>()?;

        for (entry, target) in entries.iter().zip(targets) {
            write_file(&entry.path, &target, &entry.content)?;
        }
        Ok(())
    }

    fn get(&self, ctx: &OpContext, paths: &[String]) -> RepoResult<Vec<ContentEntry>> {
        ctx.check()?;
        paths
            .iter()
            .map(|path| {
                let full = self.resolve(path)?;
                let content = fs::read_to_string(&full).map_err(|err| io_error(path, err))?;
                Ok(ContentEntry::new(path.clone(), content))
            })
            .collect()
    }

    fn delete(&mut self, ctx: &OpContext, paths: &[String]) -> RepoResult<()> {
        ctx.check()?;
        let targets = paths
            .iter()
            .map(|path| self.resolve_existing(path))
            .collect::<RepoResult<Vec<_>>>()?;

        for (path, target) in paths.iter().zip(targets) {
            fs::remove_file(&target).map_err(|err| io_error(path, err))?;
        }
        Ok(())
    }

    fn move_paths(&mut self, ctx: &OpContext, moves: &[PathMove]) -> RepoResult<()> {
        ctx.check()?;
        reject_duplicates(moves.iter().map(|path_move| path_move.to.as_str()))?;
        let mut planned = Vec::with_capacity(moves.len());
        for path_move in moves {
            let from = self.resolve_existing(&path_move.from)?;
            let to = self.resolve_vacant(&path_move.to)?;
            planned.push((from, to));
        }

        for (path_move, (from, to)) in moves.iter().zip(planned) {
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent).map_err(|err| io_error(&path_move.to, err))?;
            }
            fs::rename(&from, &to).map_err(|err| io_error(&path_move.from, err))?;
        }
        Ok(())
    }
}

fn write_file(path: &str, target: &Path, content: &str) -> RepoResult<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error(path, err))?;
    }
    fs::write(target, content).map_err(|err| io_error(path, err))
}

fn reject_duplicates<'a>(paths: impl Iterator<Item = &'a str>) -> RepoResult<()> {
    let mut seen = HashSet::new();
    for path in paths {
        if !seen.insert(path) {
            return Err(RepoError::InvalidData(format!(
                "content path `{path}` appears twice in one batch"
            )));
        }
    }
    Ok(())
}

fn io_error(path: &str, err: io::Error) -> RepoError {
    if err.kind() == io::ErrorKind::NotFound {
        RepoError::NotFound(format!("content `{path}`"))
    } else {
        RepoError::Io {
            path: path.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentContentRepository, FsDocumentContentRepository};
    use crate::context::OpContext;
    use crate::model::content::{ContentEntry, PathMove};
    use crate::repo::RepoError;

    #[test]
    fn add_get_update_move_and_delete() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut repo = FsDocumentContentRepository::new(dir.path());
        let ctx = OpContext::background();

        repo.add(&ctx, &[ContentEntry::new("notes/a.md", "# Tags\n")])
            .expect("add");
        repo.update(&ctx, &[ContentEntry::new("notes/a.md", "# Tags\nrust")])
            .expect("update");
        repo.move_paths(&ctx, &[PathMove::new("notes/a.md", "archive/a.md")])
            .expect("move");

        let entries = repo.get(&ctx, &["archive/a.md".to_string()]).expect("get");
        assert_eq!(entries, vec![ContentEntry::new("archive/a.md", "# Tags\nrust")]);
        assert!(matches!(
            repo.get(&ctx, &["notes/a.md".to_string()]),
            Err(RepoError::NotFound(_))
        ));

        repo.delete(&ctx, &["archive/a.md".to_string()])
            .expect("delete");
        assert!(!dir.path().join("archive/a.md").exists());
    }

    #[test]
    fn escaping_paths_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut repo = FsDocumentContentRepository::new(dir.path());
        let ctx = OpContext::background();

        for path in ["../outside.md", "/etc/passwd", "./a.md", "notes/../a.md", ""] {
            assert!(
                matches!(
                    repo.add(&ctx, &[ContentEntry::new(path, "x")]),
                    Err(RepoError::InvalidData(_))
                ),
                "path {path:?} should be rejected"
            );
        }
    }

    #[test]
    fn batch_is_validated_before_writing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut repo = FsDocumentContentRepository::new(dir.path());
        let ctx = OpContext::background();
        repo.add(&ctx, &[ContentEntry::new("taken.md", "old")])
            .expect("seed");

        let err = repo
            .add(
                &ctx,
                &[
                    ContentEntry::new("fresh.md", "new"),
                    ContentEntry::new("taken.md", "new"),
                ],
            )
            .expect_err("second entry exists");
        assert!(matches!(err, RepoError::AlreadyExists(_)));
        assert!(!dir.path().join("fresh.md").exists());

        assert!(matches!(
            repo.update(&ctx, &[ContentEntry::new("missing.md", "x")]),
            Err(RepoError::NotFound(_))
        ));
    }
}
