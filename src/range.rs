use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("address ${address:X} outside of ${start:X}..=${end:X}")]
    AddressOutOfRange { address: u64, start: u64, end: u64 },
    #[error("line {line} outside of a range with {line_count} lines")]
    LineOutOfRange { line: u64, line_count: u64 },
    #[error("${start:X}..=${end:X} can't be combined with a range starting at ${other_start:X}")]
    NotMergeable { start: u64, end: u64, other_start: u64 },
}

/// An inclusive address span that can be stored in a
/// [`RangeCollection`](crate::range_collection::RangeCollection).
pub trait Range: Sized {
    fn address_start(&self) -> u64;

    /// Inclusive.
    fn address_end(&self) -> u64;

    fn line_count(&self) -> u64;

    /// Whether `other` carries the same content, so adjacent copies may merge.
    fn is_same(&self, other: &Self) -> bool;

    /// Truncates `self` to `start..=position` and returns the rest, or `None`
    /// if `position` is not strictly inside the range.
    fn split_after(&mut self, position: u64) -> Option<Self>;

    /// Truncates `self` to `position..=end` and returns the part before it,
    /// or `None` if `position` is not strictly inside the range.
    fn split_before(&mut self, position: u64) -> Option<Self>;

    /// Appends `other`, which must be the same and start right after `self`.
    fn combine_adjacent(&mut self, other: &Self) -> Result<(), RangeError>;

    /// Called with each piece a newly inserted range replaces.
    fn overwrite(&mut self, _previous: &Self) {}

    fn line_offset_for_address(&self, address: u64) -> Result<u64, RangeError>;

    fn address_for_line(&self, line: u64) -> Result<u64, RangeError>;

    fn contains(&self, address: u64) -> bool {
        (self.address_start()..=self.address_end()).contains(&address)
    }

    /// Byte count. The whole 64-bit space saturates to `u64::MAX`.
    fn len(&self) -> u64 {
        (self.address_end() - self.address_start()).saturating_add(1)
    }

    /// The error `combine_adjacent` reports when `other` can't be appended.
    fn check_adjacent(&self, other: &Self) -> Result<(), RangeError> {
        if self.is_same(other) && self.address_end().checked_add(1) == Some(other.address_start()) {
            Ok(())
        } else {
            Err(RangeError::NotMergeable {
                start: self.address_start(),
                end: self.address_end(),
                other_start: other.address_start(),
            })
        }
    }

    fn check_address(&self, address: u64) -> Result<(), RangeError> {
        if self.contains(address) {
            Ok(())
        } else {
            Err(RangeError::AddressOutOfRange {
                address,
                start: self.address_start(),
                end: self.address_end(),
            })
        }
    }

    fn check_line(&self, line: u64) -> Result<(), RangeError> {
        if line < self.line_count() {
            Ok(())
        } else {
            Err(RangeError::LineOutOfRange {
                line,
                line_count: self.line_count(),
            })
        }
    }
}
