//! Lifecycle point enumeration.

use crate::hooks::registry::HookError;
use enumset::{EnumSet, EnumSetType};

/// Number of lifecycle points, i.e. registry slots.
pub const HOOK_POINT_COUNT: usize = 16;

/// Closed set of lifecycle points a hook can be attached to.
///
/// Ordinals follow declaration order. Combine points with `|`, e.g.
/// `HookPoint::BeforeAny | HookPoint::BeforeAdd`.
#[derive(EnumSetType, Debug, Hash, PartialOrd, Ord)]
pub enum HookPoint {
    BeforeAdd,
    AfterAdd,
    BeforeSelect,
    AfterSelect,
    BeforeUpdate,
    AfterUpdate,
    BeforeDelete,
    AfterDelete,
    BeforeUpsert,
    AfterUpsert,
    /// Runs before every operation kind.
    BeforeAny,
    /// Runs after every successful operation kind.
    AfterAny,
    /// Runs when the repository call failed.
    AfterError,
    AfterDeadline,
    AfterTimeout,
    AfterCancel,
}

/// Set of lifecycle points.
pub type HookPoints = EnumSet<HookPoint>;

impl HookPoint {
    /// Stable ordinal of this point.
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeAdd => "before_add",
            Self::AfterAdd => "after_add",
            Self::BeforeSelect => "before_select",
            Self::AfterSelect => "after_select",
            Self::BeforeUpdate => "before_update",
            Self::AfterUpdate => "after_update",
            Self::BeforeDelete => "before_delete",
            Self::AfterDelete => "after_delete",
            Self::BeforeUpsert => "before_upsert",
            Self::AfterUpsert => "after_upsert",
            Self::BeforeAny => "before_any",
            Self::AfterAny => "after_any",
            Self::AfterError => "after_error",
            Self::AfterDeadline => "after_deadline",
            Self::AfterTimeout => "after_timeout",
            Self::AfterCancel => "after_cancel",
        }
    }
}

impl TryFrom<u32> for HookPoint {
    type Error = HookError;

    fn try_from(ordinal: u32) -> Result<Self, Self::Error> {
        HookPoints::all()
            .iter()
            .nth(ordinal as usize)
            .ok_or(HookError::BadHookPoint { value: ordinal })
    }
}

/// Decodes a bitmask where bit `n` selects the point with ordinal `n`.
pub fn hook_points_from_bits(bits: u32) -> Result<HookPoints, HookError> {
    HookPoints::try_from_u32(bits).ok_or(HookError::BadHookPoint { value: bits })
}
