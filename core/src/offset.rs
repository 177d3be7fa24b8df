// Typed byte positions
// Volume-relative and block-relative offsets are distinct types so they cannot be mixed up

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Absolute byte position on the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct VolumeOffset(u64);

/// Byte position relative to the start of one block or directory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct BlockOffset(u32);

impl VolumeOffset {
    pub const fn new(offset: u64) -> Self {
        Self(offset)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// Position `within` bytes past this one, where this offset is the start of a block.
    pub fn at(self, within: BlockOffset) -> VolumeOffset {
        VolumeOffset(self.0 + within.get() as u64)
    }

    /// Offset of `count` units of `unit_size` bytes, e.g. block number * block size.
    pub fn from_units(count: u64, unit_size: u64) -> Option<Self> {
        count.checked_mul(unit_size).map(Self)
    }

    pub fn checked_sub(self, bytes: u64) -> Option<Self> {
        self.0.checked_sub(bytes).map(Self)
    }
}

impl Add<u64> for VolumeOffset {
    type Output = VolumeOffset;

    fn add(self, bytes: u64) -> VolumeOffset {
        VolumeOffset(self.0 + bytes)
    }
}

impl fmt::Display for VolumeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl BlockOffset {
    pub const ZERO: BlockOffset = BlockOffset(0);

    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub fn is_start(self) -> bool {
        self.0 == 0
    }

    /// Advance by a record length; `None` on overflow.
    pub fn advance(self, bytes: u32) -> Option<Self> {
        self.0.checked_add(bytes).map(Self)
    }

    pub fn checked_sub(self, bytes: u32) -> Option<Self> {
        self.0.checked_sub(bytes).map(Self)
    }
}

impl fmt::Display for BlockOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{:#x}", self.0)
    }
}
