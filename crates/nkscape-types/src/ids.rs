//! Configuration identifiers.
//!
//! A configuration ("location") assigns a binary value to each of N elements
//! and is stored as an N-bit unsigned integer. Element 0 is the most
//! significant of the N bits, element `N - 1` the least significant, so the
//! configuration `[1, 1, 0, 1]` of a 4-element landscape has id 13.
//!
//! Every helper takes the element count `n` explicitly and returns `None`
//! instead of panicking when an element index or `n` is out of range.

use serde::{Deserialize, Serialize};

use crate::structs::ElementSet;

/// Exclusive upper bound on the element count N.
///
/// `2^N` configurations must fit in a `u32` id and an in-memory table.
pub const MAX_ELEMENTS: usize = 32;

/// Identifier of one configuration of an N-element landscape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocId(pub u32);

impl LocId {
    /// Wrap a raw configuration id.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Return the raw configuration id.
    pub const fn into_inner(self) -> u32 {
        self.0
    }

    /// Return the raw id as a table index.
    pub fn index(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }

    /// Number of configurations of an `n`-element landscape (`2^n`).
    ///
    /// Returns `None` when `n` is zero or not below [`MAX_ELEMENTS`].
    pub fn count(n: usize) -> Option<u32> {
        if n == 0 || n >= MAX_ELEMENTS {
            return None;
        }
        let shift = u32::try_from(n).ok()?;
        1_u32.checked_shl(shift)
    }

    /// Value (0 or 1) of `element` in this configuration.
    pub fn bit(self, element: usize, n: usize) -> Option<u8> {
        let shift = bit_shift(element, n)?;
        let value = self.0.checked_shr(shift)? & 1;
        u8::try_from(value).ok()
    }

    /// Return the configuration with the value of `element` flipped.
    ///
    /// Toggling the same element twice returns the original configuration.
    pub fn toggled(self, element: usize, n: usize) -> Option<Self> {
        let mask = 1_u32.checked_shl(bit_shift(element, n)?)?;
        Some(Self(self.0 ^ mask))
    }

    /// Decode into per-element values, element 0 first.
    pub fn to_location(self, n: usize) -> Option<Vec<u8>> {
        (0..n).map(|element| self.bit(element, n)).collect()
    }

    /// Encode per-element values (element 0 first) into a configuration id.
    ///
    /// Returns `None` if a value is not 0 or 1, or the slice is too long.
    pub fn from_location(location: &[u8]) -> Option<Self> {
        if location.len() >= MAX_ELEMENTS {
            return None;
        }
        let mut raw: u32 = 0;
        for &value in location {
            if value > 1 {
                return None;
            }
            raw = raw.checked_shl(1)? | u32::from(value);
        }
        Some(Self(raw))
    }

    /// Return this configuration with the values of every element in
    /// `elements` copied from `mask`.
    ///
    /// Elements outside `elements` keep their value from `self`.
    pub fn merged_with(self, mask: Self, elements: &ElementSet, n: usize) -> Option<Self> {
        let mut selector: u32 = 0;
        for &element in elements {
            selector |= 1_u32.checked_shl(bit_shift(element, n)?)?;
        }
        Some(Self((self.0 & !selector) | (mask.0 & selector)))
    }

    /// Hamming distance to `other` counted only over the elements in `elements`.
    pub fn distance_within(self, other: Self, elements: &ElementSet, n: usize) -> Option<usize> {
        let mut distance: usize = 0;
        for &element in elements {
            if self.bit(element, n)? != other.bit(element, n)? {
                distance = distance.checked_add(1)?;
            }
        }
        Some(distance)
    }
}

impl core::fmt::Display for LocId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LocId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Right-shift that brings `element`'s bit to position 0.
fn bit_shift(element: usize, n: usize) -> Option<u32> {
    if n >= MAX_ELEMENTS || element >= n {
        return None;
    }
    let offset = n.checked_sub(1)?.checked_sub(element)?;
    u32::try_from(offset).ok()
}
