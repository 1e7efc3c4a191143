//! Generic hook-mediated manager over one [`Repository`].
//!
//! # Invariants
//! - Entity operations run hooks over each entity in input order.
//! - Filter operations run hooks once over `T::default()`.
//! - Get operations run after hooks over every returned entity.

use crate::context::OpContext;
use crate::hooks::{HookPoint, HookRegistry};
use crate::model::tag::{join_tag_path, Tag};
use crate::repo::{Filter, RepoError, RepoResult, Repository, Updater};
use crate::service::error::ManagerResult;
use crate::service::pipeline::{after, before, settle};
use std::slice;

/// Manager for tags.
pub type TagManager<R> = EntityManager<Tag, R>;

/// Wraps a repository and runs lifecycle hooks around each call.
pub struct EntityManager<T, R> {
    repo: R,
    hooks: HookRegistry<T>,
}

impl<T, R> EntityManager<T, R>
where
    T: Default,
    R: Repository<T>,
{
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            hooks: HookRegistry::new(),
        }
    }

    pub fn hooks(&self) -> &HookRegistry<T> {
        &self.hooks
    }

    /// Registration access. Hooks cannot change while an operation runs.
    pub fn hooks_mut(&mut self) -> &mut HookRegistry<T> {
        &mut self.hooks
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Direct repository access for operations outside the entity contract.
    pub(crate) fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn into_repository(self) -> R {
        self.repo
    }

    pub fn add(&mut self, ctx: &OpContext, entities: &[T]) -> ManagerResult<()> {
        before(&self.hooks, ctx, HookPoint::BeforeAdd, entities)?;
        let result = self.repo.add(ctx, entities);
        settle(&self.hooks, ctx, "add", result, entities)?;
        after(&self.hooks, ctx, HookPoint::AfterAdd, entities)
    }

    pub fn replace(&mut self, ctx: &OpContext, entities: &[T]) -> ManagerResult<()> {
        before(&self.hooks, ctx, HookPoint::BeforeUpdate, entities)?;
        let result = self.repo.replace(ctx, entities);
        settle(&self.hooks, ctx, "replace", result, entities)?;
        after(&self.hooks, ctx, HookPoint::AfterUpdate, entities)
    }

    pub fn update_where(
        &mut self,
        ctx: &OpContext,
        filters: &[Filter],
        updaters: &[Updater],
    ) -> ManagerResult<u64> {
        let placeholder = T::default();
        let placeholder = slice::from_ref(&placeholder);
        before(&self.hooks, ctx, HookPoint::BeforeUpdate, placeholder)?;
        let result = self.repo.update_where(ctx, filters, updaters);
        let changed = settle(&self.hooks, ctx, "update_where", result, placeholder)?;
        after(&self.hooks, ctx, HookPoint::AfterUpdate, placeholder)?;
        Ok(changed)
    }

    pub fn delete(&mut self, ctx: &OpContext, entities: &[T]) -> ManagerResult<()> {
        before(&self.hooks, ctx, HookPoint::BeforeDelete, entities)?;
        let result = self.repo.delete(ctx, entities);
        settle(&self.hooks, ctx, "delete", result, entities)?;
        after(&self.hooks, ctx, HookPoint::AfterDelete, entities)
    }

    pub fn delete_where(&mut self, ctx: &OpContext, filters: &[Filter]) -> ManagerResult<u64> {
        let placeholder = T::default();
        let placeholder = slice::from_ref(&placeholder);
        before(&self.hooks, ctx, HookPoint::BeforeDelete, placeholder)?;
        let result = self.repo.delete_where(ctx, filters);
        let deleted = settle(&self.hooks, ctx, "delete_where", result, placeholder)?;
        after(&self.hooks, ctx, HookPoint::AfterDelete, placeholder)?;
        Ok(deleted)
    }

    pub fn count_where(&self, ctx: &OpContext, filters: &[Filter]) -> ManagerResult<u64> {
        self.select_probe(ctx, "count_where", |repo| repo.count_where(ctx, filters))
    }

    pub fn count_all(&self, ctx: &OpContext) -> ManagerResult<u64> {
        self.select_probe(ctx, "count_all", |repo| repo.count_all(ctx))
    }

    pub fn does_exist(&self, ctx: &OpContext, entity: &T) -> ManagerResult<bool> {
        let keys = slice::from_ref(entity);
        before(&self.hooks, ctx, HookPoint::BeforeSelect, keys)?;
        let result = self.repo.does_exist(ctx, entity);
        let exists = settle(&self.hooks, ctx, "does_exist", result, keys)?;
        after(&self.hooks, ctx, HookPoint::AfterSelect, keys)?;
        Ok(exists)
    }

    pub fn does_exist_where(&self, ctx: &OpContext, filters: &[Filter]) -> ManagerResult<bool> {
        self.select_probe(ctx, "does_exist_where", |repo| {
            repo.does_exist_where(ctx, filters)
        })
    }

    pub fn get_where(&self, ctx: &OpContext, filters: &[Filter]) -> ManagerResult<Vec<T>> {
        self.select_entities(ctx, "get_where", |repo| repo.get_where(ctx, filters))
    }

    pub fn get_first_where(&self, ctx: &OpContext, filters: &[Filter]) -> ManagerResult<Option<T>> {
        let placeholder = T::default();
        let placeholder = slice::from_ref(&placeholder);
        before(&self.hooks, ctx, HookPoint::BeforeSelect, placeholder)?;
        let result = self.repo.get_first_where(ctx, filters);
        let found = settle(&self.hooks, ctx, "get_first_where", result, placeholder)?;
        if let Some(entity) = &found {
            after(
                &self.hooks,
                ctx,
                HookPoint::AfterSelect,
                slice::from_ref(entity),
            )?;
        }
        Ok(found)
    }

    pub fn get_all(&self, ctx: &OpContext) -> ManagerResult<Vec<T>> {
        self.select_entities(ctx, "get_all", |repo| repo.get_all(ctx))
    }

    fn select_probe<V>(
        &self,
        ctx: &OpContext,
        op: &'static str,
        call: impl FnOnce(&R) -> RepoResult<V>,
    ) -> ManagerResult<V> {
        let placeholder = T::default();
        let placeholder = slice::from_ref(&placeholder);
        before(&self.hooks, ctx, HookPoint::BeforeSelect, placeholder)?;
        let value = settle(&self.hooks, ctx, op, call(&self.repo), placeholder)?;
        after(&self.hooks, ctx, HookPoint::AfterSelect, placeholder)?;
        Ok(value)
    }

    fn select_entities(
        &self,
        ctx: &OpContext,
        op: &'static str,
        call: impl FnOnce(&R) -> RepoResult<Vec<T>>,
    ) -> ManagerResult<Vec<T>> {
        let placeholder = T::default();
        before(
            &self.hooks,
            ctx,
            HookPoint::BeforeSelect,
            slice::from_ref(&placeholder),
        )?;
        let entities = settle(
            &self.hooks,
            ctx,
            op,
            call(&self.repo),
            slice::from_ref(&placeholder),
        )?;
        after(&self.hooks, ctx, HookPoint::AfterSelect, &entities)?;
        Ok(entities)
    }
}

impl<R: Repository<Tag>> EntityManager<Tag, R> {
    /// Renders `tag` with its ancestors as a `::`-joined path.
    ///
    /// Ancestors are looked up through the manager, so select hooks run for
    /// each of them. A missing ancestor fails with `NotFound`.
    pub fn path_of(&self, ctx: &OpContext, tag: &Tag) -> ManagerResult<String> {
        let mut labels = Vec::with_capacity(tag.parent_path.len() + 1);
        for parent_id in &tag.parent_path {
            let parent = self
                .get_first_where(ctx, &[Filter::eq("id", *parent_id)])?
                .ok_or_else(|| RepoError::NotFound(format!("parent tag #{parent_id}")))?;
            labels.push(parent.tag);
        }
        labels.push(tag.tag.clone());
        Ok(join_tag_path(&labels))
    }
}
