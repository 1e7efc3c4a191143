//! Document manager: entity operations plus document type management.
//!
//! Entity operations delegate to [`EntityManager`] and share its hook
//! registry. Type operations run a separate registry keyed by type name.

use crate::context::OpContext;
use crate::hooks::{HookPoint, HookRegistry};
use crate::model::document::Document;
use crate::repo::{DocumentRepository, Filter, Updater};
use crate::service::entity_manager::EntityManager;
use crate::service::error::ManagerResult;
use crate::service::pipeline::{after, before, settle};
use std::slice;

pub struct DocumentManager<R> {
    entities: EntityManager<Document, R>,
    type_hooks: HookRegistry<String>,
}

impl<R: DocumentRepository> DocumentManager<R> {
    pub fn new(repo: R) -> Self {
        Self {
            entities: EntityManager::new(repo),
            type_hooks: HookRegistry::new(),
        }
    }

    pub fn hooks(&self) -> &HookRegistry<Document> {
        self.entities.hooks()
    }

    pub fn hooks_mut(&mut self) -> &mut HookRegistry<Document> {
        self.entities.hooks_mut()
    }

    /// Hooks for `add_type`/`delete_type`/`update_type`, keyed by type name.
    pub fn type_hooks(&self) -> &HookRegistry<String> {
        &self.type_hooks
    }

    pub fn type_hooks_mut(&mut self) -> &mut HookRegistry<String> {
        &mut self.type_hooks
    }

    pub fn repository(&self) -> &R {
        self.entities.repository()
    }

    pub fn add(&mut self, ctx: &OpContext, documents: &[Document]) -> ManagerResult<()> {
        self.entities.add(ctx, documents)
    }

    pub fn replace(&mut self, ctx: &OpContext, documents: &[Document]) -> ManagerResult<()> {
        self.entities.replace(ctx, documents)
    }

    pub fn update_where(
        &mut self,
        ctx: &OpContext,
        filters: &[Filter],
        updaters: &[Updater],
    ) -> ManagerResult<u64> {
        self.entities.update_where(ctx, filters, updaters)
    }

    pub fn delete(&mut self, ctx: &OpContext, documents: &[Document]) -> ManagerResult<()> {
        self.entities.delete(ctx, documents)
    }

    pub fn delete_where(&mut self, ctx: &OpContext, filters: &[Filter]) -> ManagerResult<u64> {
        self.entities.delete_where(ctx, filters)
    }

    pub fn count_where(&self, ctx: &OpContext, filters: &[Filter]) -> ManagerResult<u64> {
        self.entities.count_where(ctx, filters)
    }

    pub fn count_all(&self, ctx: &OpContext) -> ManagerResult<u64> {
        self.entities.count_all(ctx)
    }

    pub fn does_exist(&self, ctx: &OpContext, document: &Document) -> ManagerResult<bool> {
        self.entities.does_exist(ctx, document)
    }

    pub fn does_exist_where(&self, ctx: &OpContext, filters: &[Filter]) -> ManagerResult<bool> {
        self.entities.does_exist_where(ctx, filters)
    }

    pub fn get_where(&self, ctx: &OpContext, filters: &[Filter]) -> ManagerResult<Vec<Document>> {
        self.entities.get_where(ctx, filters)
    }

    pub fn get_first_where(
        &self,
        ctx: &OpContext,
        filters: &[Filter],
    ) -> ManagerResult<Option<Document>> {
        self.entities.get_first_where(ctx, filters)
    }

    pub fn get_all(&self, ctx: &OpContext) -> ManagerResult<Vec<Document>> {
        self.entities.get_all(ctx)
    }

    pub fn add_type(&mut self, ctx: &OpContext, names: &[String]) -> ManagerResult<()> {
        before(&self.type_hooks, ctx, HookPoint::BeforeAdd, names)?;
        let result = self.entities.repository_mut().add_type(ctx, names);
        settle(&self.type_hooks, ctx, "add_type", result, names)?;
        after(&self.type_hooks, ctx, HookPoint::AfterAdd, names)
    }

    pub fn delete_type(&mut self, ctx: &OpContext, names: &[String]) -> ManagerResult<()> {
        before(&self.type_hooks, ctx, HookPoint::BeforeDelete, names)?;
        let result = self.entities.repository_mut().delete_type(ctx, names);
        settle(&self.type_hooks, ctx, "delete_type", result, names)?;
        after(&self.type_hooks, ctx, HookPoint::AfterDelete, names)
    }

    /// Renames type `old` to `new`. Hooks see the old name before the call
    /// and the new name after it.
    pub fn update_type(&mut self, ctx: &OpContext, old: &str, new: &str) -> ManagerResult<()> {
        let old_name = old.to_string();
        let new_name = new.to_string();
        before(
            &self.type_hooks,
            ctx,
            HookPoint::BeforeUpdate,
            slice::from_ref(&old_name),
        )?;
        let result = self.entities.repository_mut().update_type(ctx, old, new);
        settle(
            &self.type_hooks,
            ctx,
            "update_type",
            result,
            slice::from_ref(&old_name),
        )?;
        after(
            &self.type_hooks,
            ctx,
            HookPoint::AfterUpdate,
            slice::from_ref(&new_name),
        )
    }
}
