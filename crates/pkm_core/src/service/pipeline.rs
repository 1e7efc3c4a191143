//! Shared before/repository/after plumbing for managers.

use crate::context::{ContextError, OpContext};
use crate::hooks::{HookPoint, HookPoints, HookRegistry};
use crate::repo::{RepoError, RepoResult};
use crate::service::error::ManagerResult;
use log::{error, warn};

/// Runs `BeforeAny | point` hooks over each key in order.
pub(crate) fn before<K>(
    hooks: &HookRegistry<K>,
    ctx: &OpContext,
    point: HookPoint,
    keys: &[K],
) -> ManagerResult<()> {
    run(hooks, ctx, HookPoint::BeforeAny | point, keys)
}

/// Runs `AfterAny | point` hooks over each key in order.
pub(crate) fn after<K>(
    hooks: &HookRegistry<K>,
    ctx: &OpContext,
    point: HookPoint,
    keys: &[K],
) -> ManagerResult<()> {
    run(hooks, ctx, HookPoint::AfterAny | point, keys)
}

/// Passes a repository result through, notifying failure hooks on error.
pub(crate) fn settle<V, K>(
    hooks: &HookRegistry<K>,
    ctx: &OpContext,
    op: &'static str,
    result: RepoResult<V>,
    keys: &[K],
) -> ManagerResult<V> {
    result.map_err(|err| {
        error!("event=repo_call module=service status=error op={op} error={err}");
        let points = failure_points(&err);
        for key in keys {
            if let Err(hook_err) = hooks.execute_hooks_for(ctx, points, key) {
                warn!(
                    "event=failure_hook module=service status=ignored op={op} error={hook_err}"
                );
            }
        }
        err.into()
    })
}

fn run<K>(
    hooks: &HookRegistry<K>,
    ctx: &OpContext,
    points: HookPoints,
    keys: &[K],
) -> ManagerResult<()> {
    for key in keys {
        hooks.execute_hooks_for(ctx, points, key)?;
    }
    Ok(())
}

fn failure_points(err: &RepoError) -> HookPoints {
    match err {
        RepoError::Interrupted(ContextError::Cancelled) => {
            HookPoint::AfterError | HookPoint::AfterCancel
        }
        RepoError::Interrupted(ContextError::DeadlineExceeded) => {
            HookPoint::AfterError | HookPoint::AfterDeadline
        }
        RepoError::Interrupted(ContextError::TimedOut) => {
            HookPoint::AfterError | HookPoint::AfterTimeout
        }
        _ => HookPoints::only(HookPoint::AfterError),
    }
}

#[cfg(test)]
mod tests {
    use super::failure_points;
    use crate::context::ContextError;
    use crate::hooks::HookPoint;
    use crate::repo::RepoError;

    #[test]
    fn interruptions_add_their_specific_point() {
        assert_eq!(
            failure_points(&RepoError::Interrupted(ContextError::TimedOut)),
            HookPoint::AfterError | HookPoint::AfterTimeout
        );
        assert_eq!(
            failure_points(&RepoError::Interrupted(ContextError::Cancelled)),
            HookPoint::AfterError | HookPoint::AfterCancel
        );
        let plain = failure_points(&RepoError::NotFound("x".to_string()));
        assert_eq!(plain.len(), 1);
        assert!(plain.contains(HookPoint::AfterError));
    }
}
