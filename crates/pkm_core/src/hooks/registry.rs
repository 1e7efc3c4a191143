//! Generic hook registry.

use crate::context::OpContext;
use crate::hooks::point::{HookPoint, HookPoints, HOOK_POINT_COUNT};
use log::error;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Error type hooks return.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Return type of one hook call.
pub type HookResult = Result<(), BoxError>;

/// Boxed hook callback over entity values of type `T`.
pub type HookFn<T> = Box<dyn Fn(&OpContext, &T) -> HookResult + Send + Sync>;

/// Hook registration or execution failure.
#[derive(Debug)]
pub enum HookError {
    /// Ordinal or bitmask outside the lifecycle point enumeration.
    BadHookPoint { value: u32 },
    /// A registered hook returned an error; later hooks did not run.
    Execution { point: HookPoint, source: BoxError },
}

impl Display for HookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadHookPoint { value } => write!(f, "invalid hook point: {value}"),
            Self::Execution { point, source } => {
                write!(f, "hook execution failed at {}: {source}", point.as_str())
            }
        }
    }
}

impl Error for HookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BadHookPoint { .. } => None,
            Self::Execution { source, .. } => Some(source.as_ref()),
        }
    }
}

struct RegisteredHook<T> {
    sequence: u64,
    hook: HookFn<T>,
}

/// Ordered hook slots, one per [`HookPoint`].
pub struct HookRegistry<T> {
    slots: [Vec<RegisteredHook<T>>; HOOK_POINT_COUNT],
    next_sequence: u64,
}

impl<T> Default for HookRegistry<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| Vec::new()),
            next_sequence: 0,
        }
    }
}

impl<T> Debug for HookRegistry<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<(&str, usize)> = HookPoints::all()
            .iter()
            .map(|point| (point.as_str(), self.slots[point as usize].len()))
            .filter(|(_, count)| *count > 0)
            .collect();
        f.debug_struct("HookRegistry")
            .field("hooks", &counts)
            .finish()
    }
}

impl<T> HookRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `hook` to the slot of `point`.
    pub fn add_hook<F>(&mut self, point: HookPoint, hook: F)
    where
        F: Fn(&OpContext, &T) -> HookResult + Send + Sync + 'static,
    {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.slots[point as usize].push(RegisteredHook {
            sequence,
            hook: Box::new(hook),
        });
    }

    /// Appends `hook` to the slot with the given ordinal.
    pub fn add_hook_at<F>(&mut self, ordinal: u32, hook: F) -> Result<(), HookError>
    where
        F: Fn(&OpContext, &T) -> HookResult + Send + Sync + 'static,
    {
        let point = HookPoint::try_from(ordinal)?;
        self.add_hook(point, hook);
        Ok(())
    }

    /// Removes every hook registered under `point`.
    pub fn clear_hooks(&mut self, point: HookPoint) {
        self.slots[point as usize].clear();
    }

    /// Removes every hook registered under the slot with the given ordinal.
    pub fn clear_hooks_at(&mut self, ordinal: u32) -> Result<(), HookError> {
        let point = HookPoint::try_from(ordinal)?;
        self.clear_hooks(point);
        Ok(())
    }

    /// Counts hooks registered under any of `points`.
    pub fn hook_count(&self, points: impl Into<HookPoints>) -> usize {
        points
            .into()
            .iter()
            .map(|point| self.slots[point as usize].len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    /// Runs every hook registered under any of `points`, in registration order.
    ///
    /// The first failing hook stops execution; its error is returned as
    /// [`HookError::Execution`].
    pub fn execute_hooks_for(
        &self,
        ctx: &OpContext,
        points: impl Into<HookPoints>,
        entity: &T,
    ) -> Result<(), HookError> {
        let mut selected: Vec<(HookPoint, &RegisteredHook<T>)> = points
            .into()
            .iter()
            .flat_map(|point| {
                self.slots[point as usize]
                    .iter()
                    .map(move |registered| (point, registered))
            })
            .collect();
        selected.sort_by_key(|(_, registered)| registered.sequence);

        for (point, registered) in selected {
            if let Err(source) = (registered.hook)(ctx, entity) {
                error!(
                    "event=hook_execute module=hooks status=error point={} error={}",
                    point.as_str(),
                    source
                );
                return Err(HookError::Execution { point, source });
            }
        }

        Ok(())
    }

    /// Same as [`Self::execute_hooks_for`] with points given as a raw bitmask.
    pub fn execute_hooks_for_bits(
        &self,
        ctx: &OpContext,
        bits: u32,
        entity: &T,
    ) -> Result<(), HookError> {
        let points = crate::hooks::point::hook_points_from_bits(bits)?;
        self.execute_hooks_for(ctx, points, entity)
    }
}

#[cfg(test)]
mod tests {
    use super::{HookError, HookRegistry};
    use crate::context::OpContext;
    use crate::hooks::HookPoint;
    use std::sync::{Arc, Mutex};

    type CallLog = Arc<Mutex<Vec<String>>>;

    fn recorder(
        log: &CallLog,
        name: &'static str,
    ) -> impl Fn(&OpContext, &String) -> super::HookResult {
        let log = Arc::clone(log);
        move |_, entity| {
            log.lock().expect("log lock").push(format!("{name}:{entity}"));
            Ok(())
        }
    }

    #[test]
    fn before_add_hook_runs_once_for_combined_points() {
        let log = CallLog::default();
        let mut registry = HookRegistry::<String>::new();
        registry.add_hook(HookPoint::BeforeAdd, recorder(&log, "h"));

        registry
            .execute_hooks_for(
                &OpContext::background(),
                HookPoint::BeforeAny | HookPoint::BeforeAdd,
                &"doc".to_string(),
            )
            .expect("hooks succeed");

        assert_eq!(*log.lock().expect("log lock"), vec!["h:doc"]);
    }

    #[test]
    fn hooks_run_in_registration_order_across_points() {
        let log = CallLog::default();
        let mut registry = HookRegistry::<String>::new();
        registry.add_hook(HookPoint::BeforeAdd, recorder(&log, "specific-1"));
        registry.add_hook(HookPoint::BeforeAny, recorder(&log, "any"));
        registry.add_hook(HookPoint::BeforeAdd, recorder(&log, "specific-2"));
        registry.add_hook(HookPoint::AfterAdd, recorder(&log, "unselected"));

        registry
            .execute_hooks_for(
                &OpContext::background(),
                HookPoint::BeforeAny | HookPoint::BeforeAdd,
                &"x".to_string(),
            )
            .expect("hooks succeed");

        assert_eq!(
            *log.lock().expect("log lock"),
            vec!["specific-1:x", "any:x", "specific-2:x"]
        );
    }

    #[test]
    fn first_error_stops_remaining_hooks() {
        let log = CallLog::default();
        let mut registry = HookRegistry::<String>::new();
        registry.add_hook(HookPoint::BeforeAdd, |_, _| Err("rejected".into()));
        registry.add_hook(HookPoint::BeforeAdd, recorder(&log, "later"));
        registry.add_hook(HookPoint::BeforeAny, recorder(&log, "wildcard"));

        let err = registry
            .execute_hooks_for(
                &OpContext::background(),
                HookPoint::BeforeAny | HookPoint::BeforeAdd,
                &"x".to_string(),
            )
            .expect_err("first hook fails");

        match err {
            HookError::Execution { point, source } => {
                assert_eq!(point, HookPoint::BeforeAdd);
                assert_eq!(source.to_string(), "rejected");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(log.lock().expect("log lock").is_empty());
    }

    #[test]
    fn clear_hooks_empties_only_that_slot() {
        let log = CallLog::default();
        let mut registry = HookRegistry::<String>::new();
        registry.add_hook(HookPoint::AfterUpdate, recorder(&log, "update"));
        registry.add_hook(HookPoint::AfterAny, recorder(&log, "any"));

        registry.clear_hooks(HookPoint::AfterUpdate);
        assert_eq!(registry.hook_count(HookPoint::AfterUpdate), 0);
        assert_eq!(
            registry.hook_count(HookPoint::AfterAny | HookPoint::AfterUpdate),
            1
        );

        registry
            .clear_hooks_at(HookPoint::AfterAny.ordinal())
            .expect("valid ordinal");
        assert!(registry.is_empty());
    }

    #[test]
    fn raw_ordinals_and_bits_are_validated() {
        let mut registry = HookRegistry::<String>::new();
        assert!(matches!(
            registry.add_hook_at(99, |_, _| Ok(())),
            Err(HookError::BadHookPoint { value: 99 })
        ));
        assert!(matches!(
            registry.clear_hooks_at(16),
            Err(HookError::BadHookPoint { value: 16 })
        ));

        registry
            .add_hook_at(HookPoint::BeforeDelete.ordinal(), |_, _| Ok(()))
            .expect("valid ordinal");
        assert_eq!(registry.hook_count(HookPoint::BeforeDelete), 1);

        let ctx = OpContext::background();
        assert!(registry
            .execute_hooks_for_bits(&ctx, 1 << HookPoint::BeforeDelete.ordinal(), &String::new())
            .is_ok());
        assert!(matches!(
            registry.execute_hooks_for_bits(&ctx, u32::MAX, &String::new()),
            Err(HookError::BadHookPoint { .. })
        ));
    }
}
