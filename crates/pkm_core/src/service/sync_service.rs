//! Republishes document association changes into document content.
//!
//! # Responsibility
//! - Turn old/new document snapshots into tag/link/backlink content edits.
//!
//! # Invariants
//! - Edits target the new snapshot's path.
//! - Removals are applied before additions, per association kind.
//! - A removal the stored content no longer holds counts as already applied.
//! - All edits of one call are written in a single content batch; if any
//!   edit fails, no content is written.

use crate::content;
use crate::context::OpContext;
use crate::diff::{diff_backlinks, diff_links, diff_tags, EntityDiff};
use crate::model::content::ContentEdit;
use crate::model::document::Document;
use crate::repo::DocumentContentRepository;
use crate::service::content_manager::{DocumentContentManager, EditStep, TextEdit};
use crate::service::error::ManagerResult;
use log::info;

/// Counts of association differences found by one [`DocumentSync::sync`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Documents with at least one change.
    pub documents: usize,
    pub tags_added: usize,
    pub tags_removed: usize,
    pub links_added: usize,
    pub links_removed: usize,
    pub backlinks_added: usize,
    pub backlinks_removed: usize,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.documents == 0
    }
}

#[derive(Default)]
struct EditPlan {
    added: Vec<ContentEdit>,
    removed: Vec<ContentEdit>,
}

impl EditPlan {
    fn push(&mut self, path: &str, diff: EntityDiff) -> (usize, usize) {
        let counts = (diff.added.len(), diff.removed.len());
        if !diff.added.is_empty() {
            self.added.push(ContentEdit::new(path, diff.added));
        }
        if !diff.removed.is_empty() {
            self.removed.push(ContentEdit::new(path, diff.removed));
        }
        counts
    }

    /// Appends the removal step, then the addition step, skipping empty sides.
    fn push_steps<'a>(&'a self, remove: TextEdit, add: TextEdit, steps: &mut Vec<EditStep<'a>>) {
        if !self.removed.is_empty() {
            steps.push(EditStep {
                apply: remove,
                edits: &self.removed,
                skip_ineffective: true,
            });
        }
        if !self.added.is_empty() {
            steps.push(EditStep::strict(add, &self.added));
        }
    }
}

/// Drives a [`DocumentContentManager`] from document snapshots.
pub struct DocumentSync<'m, R> {
    content: &'m mut DocumentContentManager<R>,
}

impl<'m, R: DocumentContentRepository> DocumentSync<'m, R> {
    pub fn new(content: &'m mut DocumentContentManager<R>) -> Self {
        Self { content }
    }

    /// Applies the differences of each `(old, new)` pair to the content of
    /// `new.path`.
    pub fn sync(
        &mut self,
        ctx: &OpContext,
        pairs: &[(Document, Document)],
    ) -> ManagerResult<SyncReport> {
        let mut report = SyncReport::default();
        let mut tags = EditPlan::default();
        let mut links = EditPlan::default();
        let mut backlinks = EditPlan::default();

        for (old, new) in pairs {
            let tag_diff = diff_tags(old, new);
            let link_diff = diff_links(old, new);
            let backlink_diff = diff_backlinks(old, new);
            if tag_diff.is_empty() && link_diff.is_empty() && backlink_diff.is_empty() {
                continue;
            }
            report.documents += 1;

            let (added, removed) = tags.push(&new.path, tag_diff);
            report.tags_added += added;
            report.tags_removed += removed;
            let (added, removed) = links.push(&new.path, link_diff);
            report.links_added += added;
            report.links_removed += removed;
            let (added, removed) = backlinks.push(&new.path, backlink_diff);
            report.backlinks_added += added;
            report.backlinks_removed += removed;
        }

        if report.is_empty() {
            return Ok(report);
        }
        let mut steps = Vec::with_capacity(6);
        tags.push_steps(
            content::remove_tags::<String>,
            content::add_tags::<String>,
            &mut steps,
        );
        links.push_steps(
            content::remove_links::<String>,
            content::add_links::<String>,
            &mut steps,
        );
        backlinks.push_steps(
            content::remove_backlinks::<String>,
            content::add_backlinks::<String>,
            &mut steps,
        );
        self.content.apply_steps(ctx, "document_sync", &steps)?;

        info!(
            "event=document_sync module=service status=ok documents={}",
            report.documents
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::{EditPlan, SyncReport};
    use crate::diff::EntityDiff;

    #[test]
    fn edit_plan_skips_empty_sides() {
        let mut plan = EditPlan::default();
        let counts = plan.push(
            "a.md",
            EntityDiff {
                added: vec!["x".to_string(), "y".to_string()],
                removed: Vec::new(),
            },
        );
        assert_eq!(counts, (2, 0));
        assert_eq!(plan.added.len(), 1);
        assert!(plan.removed.is_empty());
        assert!(SyncReport::default().is_empty());
    }
}
