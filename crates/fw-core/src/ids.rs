use core::fmt;
use core::num::NonZeroU32;

/// Compact, stable identifier for beam nodes, elements and aero surfaces.
///
/// - `u32` keeps mapping tables small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        match NonZeroU32::new(index.saturating_add(1)) {
            Some(v) => Self(v),
            None => Self(NonZeroU32::MAX),
        }
    }

    /// Create an Id from a 0-based `usize` index.
    pub fn from_usize(index: usize) -> Self {
        Self::from_index(u32::try_from(index).unwrap_or(u32::MAX - 1))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// Recover the 0-based index for slice addressing.
    pub fn idx(self) -> usize {
        self.index() as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Domain-specific ID aliases for clarity (no runtime cost).
pub type NodeId = Id;
pub type ElemId = Id;
pub type SurfId = Id;
