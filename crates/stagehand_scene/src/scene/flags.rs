//! Node hide flags

use serde::{Deserialize, Serialize};

/// Bit set controlling how tooling treats a node
///
/// The flags carry no runtime behavior of their own; they are stored on the
/// node and copied onto clones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HideFlags(pub u32);

impl HideFlags {
    /// Normal, visible node
    pub const NONE: HideFlags = HideFlags(0);
    /// Not shown in hierarchy views
    pub const HIDE_IN_HIERARCHY: HideFlags = HideFlags(1);
    /// Not shown in inspectors
    pub const HIDE_IN_INSPECTOR: HideFlags = HideFlags(1 << 1);
    /// Not saved with the scene
    pub const DONT_SAVE: HideFlags = HideFlags(1 << 2);
    /// Not editable in inspectors
    pub const NOT_EDITABLE: HideFlags = HideFlags(1 << 3);
    /// Hidden and never saved
    pub const HIDE_AND_DONT_SAVE: HideFlags =
        HideFlags(Self::HIDE_IN_HIERARCHY.0 | Self::DONT_SAVE.0 | Self::NOT_EDITABLE.0);

    /// Check if all flags in `other` are set
    pub fn contains(&self, other: HideFlags) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Set the flags in `other`
    pub fn insert(&mut self, other: HideFlags) {
        self.0 |= other.0;
    }

    /// Clear the flags in `other`
    pub fn remove(&mut self, other: HideFlags) {
        self.0 &= !other.0;
    }

    /// Whether no flag is set
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for HideFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        HideFlags(self.0 | rhs.0)
    }
}
