//! Document content manager.
//!
//! # Responsibility
//! - Run lifecycle hooks around raw content storage calls.
//! - Apply tag/link/backlink edits through [`crate::content`] in one
//!   read-modify-write cycle per batch.
//!
//! # Invariants
//! - Hooks are keyed by content path.
//! - Edit operations use `Update` hook points.
//! - If any edit of a batch fails, nothing of the batch is written.

use crate::content::{self, ContentError, ContentResult};
use crate::context::OpContext;
use crate::hooks::{HookPoint, HookRegistry};
use crate::model::content::{ContentEdit, ContentEntry, PathMove};
use crate::repo::{DocumentContentRepository, RepoError};
use crate::service::error::{ManagerError, ManagerResult};
use crate::service::pipeline::{after, before, settle};
use log::debug;

pub(crate) type TextEdit = fn(&str, &[String]) -> ContentResult<String>;

/// One text rewrite applied to a list of edits.
pub(crate) struct EditStep<'a> {
    pub(crate) apply: TextEdit,
    pub(crate) edits: &'a [ContentEdit],
    /// Skip edits that fail with `IneffectiveOperation` instead of aborting.
    pub(crate) skip_ineffective: bool,
}

impl<'a> EditStep<'a> {
    pub(crate) fn strict(apply: TextEdit, edits: &'a [ContentEdit]) -> Self {
        Self {
            apply,
            edits,
            skip_ineffective: false,
        }
    }
}

pub struct DocumentContentManager<R> {
    repo: R,
    hooks: HookRegistry<String>,
}

impl<R: DocumentContentRepository> DocumentContentManager<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            hooks: HookRegistry::new(),
        }
    }

    pub fn hooks(&self) -> &HookRegistry<String> {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry<String> {
        &mut self.hooks
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn add(&mut self, ctx: &OpContext, entries: &[ContentEntry]) -> ManagerResult<()> {
        let paths = entry_paths(entries);
        before(&self.hooks, ctx, HookPoint::BeforeAdd, &paths)?;
        let result = self.repo.add(ctx, entries);
        settle(&self.hooks, ctx, "content_add", result, &paths)?;
        after(&self.hooks, ctx, HookPoint::AfterAdd, &paths)
    }

    pub fn update(&mut self, ctx: &OpContext, entries: &[ContentEntry]) -> ManagerResult<()> {
        let paths = entry_paths(entries);
        before(&self.hooks, ctx, HookPoint::BeforeUpdate, &paths)?;
        let result = self.repo.update(ctx, entries);
        settle(&self.hooks, ctx, "content_update", result, &paths)?;
        after(&self.hooks, ctx, HookPoint::AfterUpdate, &paths)
    }

    pub fn get(&self, ctx: &OpContext, paths: &[String]) -> ManagerResult<Vec<ContentEntry>> {
        before(&self.hooks, ctx, HookPoint::BeforeSelect, paths)?;
        let result = self.repo.get(ctx, paths);
        let entries = settle(&self.hooks, ctx, "content_get", result, paths)?;
        after(&self.hooks, ctx, HookPoint::AfterSelect, paths)?;
        Ok(entries)
    }

    pub fn delete(&mut self, ctx: &OpContext, paths: &[String]) -> ManagerResult<()> {
        before(&self.hooks, ctx, HookPoint::BeforeDelete, paths)?;
        let result = self.repo.delete(ctx, paths);
        settle(&self.hooks, ctx, "content_delete", result, paths)?;
        after(&self.hooks, ctx, HookPoint::AfterDelete, paths)
    }

    /// Relocates content. Before hooks see source paths, after hooks see
    /// target paths.
    pub fn move_paths(&mut self, ctx: &OpContext, moves: &[PathMove]) -> ManagerResult<()> {
        let sources: Vec<String> = moves.iter().map(|m| m.from.clone()).collect();
        let targets: Vec<String> = moves.iter().map(|m| m.to.clone()).collect();
        before(&self.hooks, ctx, HookPoint::BeforeUpdate, &sources)?;
        let result = self.repo.move_paths(ctx, moves);
        settle(&self.hooks, ctx, "content_move", result, &sources)?;
        after(&self.hooks, ctx, HookPoint::AfterUpdate, &targets)
    }

    pub fn add_tags(&mut self, ctx: &OpContext, edits: &[ContentEdit]) -> ManagerResult<()> {
        self.edit(ctx, "add_tags", edits, content::add_tags::<String>)
    }

    pub fn remove_tags(&mut self, ctx: &OpContext, edits: &[ContentEdit]) -> ManagerResult<()> {
        self.edit(ctx, "remove_tags", edits, content::remove_tags::<String>)
    }

    pub fn add_links(&mut self, ctx: &OpContext, edits: &[ContentEdit]) -> ManagerResult<()> {
        self.edit(ctx, "add_links", edits, content::add_links::<String>)
    }

    pub fn remove_links(&mut self, ctx: &OpContext, edits: &[ContentEdit]) -> ManagerResult<()> {
        self.edit(ctx, "remove_links", edits, content::remove_links::<String>)
    }

    pub fn add_backlinks(&mut self, ctx: &OpContext, edits: &[ContentEdit]) -> ManagerResult<()> {
        self.edit(ctx, "add_backlinks", edits, content::add_backlinks::<String>)
    }

    pub fn remove_backlinks(
        &mut self,
        ctx: &OpContext,
        edits: &[ContentEdit],
    ) -> ManagerResult<()> {
        let remove = content::remove_backlinks::<String>;
        self.edit(ctx, "remove_backlinks", edits, remove)
    }

    fn edit(
        &mut self,
        ctx: &OpContext,
        op: &'static str,
        edits: &[ContentEdit],
        apply: TextEdit,
    ) -> ManagerResult<()> {
        self.apply_steps(ctx, op, &[EditStep::strict(apply, edits)])
    }

    /// Reads every edited path once, runs the steps in order and writes the
    /// results back in one batch. Several edits of one path compose.
    pub(crate) fn apply_steps(
        &mut self,
        ctx: &OpContext,
        op: &'static str,
        steps: &[EditStep<'_>],
    ) -> ManagerResult<()> {
        let paths = unique_paths(steps.iter().flat_map(|step| step.edits));
        before(&self.hooks, ctx, HookPoint::BeforeUpdate, &paths)?;

        let fetched = self.repo.get(ctx, &paths);
        let mut entries = settle(&self.hooks, ctx, op, fetched, &paths)?;

        for step in steps {
            for edit in step.edits {
                let found = entries.iter_mut().find(|entry| entry.path == edit.path);
                let Some(entry) = found else {
                    let missing = Err(RepoError::InvalidData(format!(
                        "content `{}` missing from batch read",
                        edit.path
                    )));
                    return settle(&self.hooks, ctx, op, missing, &paths);
                };
                match (step.apply)(&entry.content, &edit.values) {
                    Ok(updated) => entry.content = updated,
                    Err(ContentError::IneffectiveOperation(_)) if step.skip_ineffective => {}
                    Err(source) => {
                        return Err(ManagerError::Content {
                            path: edit.path.clone(),
                            source,
                        });
                    }
                }
            }
        }

        let written = self.repo.update(ctx, &entries);
        settle(&self.hooks, ctx, op, written, &paths)?;
        debug!(
            "event=content_edit module=service status=ok op={op} paths={}",
            paths.len()
        );
        after(&self.hooks, ctx, HookPoint::AfterUpdate, &paths)
    }
}

fn entry_paths(entries: &[ContentEntry]) -> Vec<String> {
    entries.iter().map(|entry| entry.path.clone()).collect()
}

fn unique_paths<'a>(edits: impl IntoIterator<Item = &'a ContentEdit>) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for edit in edits {
        if !paths.contains(&edit.path) {
            paths.push(edit.path.clone());
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::{unique_paths, DocumentContentManager};
    use crate::context::OpContext;
    use crate::hooks::HookPoint;
    use crate::model::content::{ContentEdit, ContentEntry, PathMove};
    use crate::repo::{DocumentContentRepository, RepoError, RepoResult};
    use crate::service::error::ManagerError;
    use std::sync::{Arc, Mutex};

    /// Answers reads with entries stored under different paths.
    #[derive(Default)]
    struct MisroutedRepository {
        updates: usize,
    }

    impl DocumentContentRepository for MisroutedRepository {
        fn add(&mut self, _ctx: &OpContext, _entries: &[ContentEntry]) -> RepoResult<()> {
            Ok(())
        }

        fn update(&mut self, _ctx: &OpContext, _entries: &[ContentEntry]) -> RepoResult<()> {
            self.updates += 1;
            Ok(())
        }

        fn get(&self, _ctx: &OpContext, paths: &[String]) -> RepoResult<Vec<ContentEntry>> {
            Ok(paths
                .iter()
                .map(|path| ContentEntry::new(format!("other/{path}"), "# Tags\n"))
                .collect())
        }

        fn delete(&mut self, _ctx: &OpContext, _paths: &[String]) -> RepoResult<()> {
            Ok(())
        }

        fn move_paths(&mut self, _ctx: &OpContext, _moves: &[PathMove]) -> RepoResult<()> {
            Ok(())
        }
    }

    #[test]
    fn edit_fails_when_read_returns_foreign_paths() {
        let mut manager = DocumentContentManager::new(MisroutedRepository::default());
        let failed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&failed);
        manager
            .hooks_mut()
            .add_hook(HookPoint::AfterError, move |_, path: &String| {
                sink.lock().expect("lock").push(path.clone());
                Ok(())
            });

        let err = manager
            .add_tags(&OpContext::background(), &[ContentEdit::new("a.md", ["x"])])
            .expect_err("misrouted read");

        assert!(matches!(err, ManagerError::Repo(RepoError::InvalidData(_))));
        assert_eq!(manager.repository().updates, 0);
        assert_eq!(*failed.lock().expect("lock"), vec!["a.md"]);
    }

    #[test]
    fn unique_paths_keep_first_seen_order() {
        let edits = [
            ContentEdit::new("b.md", ["x"]),
            ContentEdit::new("a.md", ["y"]),
            ContentEdit::new("b.md", ["z"]),
        ];
        assert_eq!(unique_paths(&edits), vec!["b.md", "a.md"]);
    }
}
