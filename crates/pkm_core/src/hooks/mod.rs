//! Lifecycle hook registry shared by every manager.
//!
//! # Responsibility
//! - Hold ordered callbacks per lifecycle point.
//! - Run callbacks for a set of points, stopping at the first failure.
//!
//! # Invariants
//! - Hooks run synchronously on the calling thread, in registration order.
//! - Registration requires `&mut`, so it cannot race with execution.

mod point;
mod registry;

pub use point::{hook_points_from_bits, HookPoint, HookPoints, HOOK_POINT_COUNT};
pub use registry::{BoxError, HookError, HookFn, HookRegistry, HookResult};
