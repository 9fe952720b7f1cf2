use crate::range::Range;

/// Non-overlapping ranges sorted by address. Adjacent ranges with the same
/// content are always merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeCollection<T> {
    items: Vec<T>,
    line_count: u64,
}

impl<T> RangeCollection<T> {
    pub const fn new() -> Self {
        Self {
            items: vec![],
            line_count: 0,
        }
    }

    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn ranges(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the line counts of all ranges, saturating at `u64::MAX`.
    pub const fn line_count(&self) -> u64 {
        self.line_count
    }

    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }
}

impl<T: Range> RangeCollection<T> {
    /// Index of the first range ending at or after `address`.
    fn lower_bound(&self, address: u64) -> usize {
        self.items.partition_point(|r| r.address_end() < address)
    }

    /// Index of the first range starting after `address`.
    fn upper_bound(&self, address: u64) -> usize {
        self.items.partition_point(|r| r.address_start() <= address)
    }

    pub fn add_range(&mut self, mut range: T) {
        let (start, end) = (range.address_start(), range.address_end());
        debug_assert!(start <= end, "malformed range ${start:X}..=${end:X}");

        let lo = self.lower_bound(start);
        let hi = self.upper_bound(end).max(lo);
        let mut before = None;
        let mut after = None;
        for mut old in self.items.drain(lo..hi).collect::<Vec<_>>() {
            self.line_count = self.line_count.saturating_sub(old.line_count());
            if old.address_start() < start {
                before = old.split_before(start);
            }
            if old.address_end() > end {
                after = old.split_after(end);
            }
            range.overwrite(&old);
        }

        let inserted: Vec<_> = before.into_iter().chain([range]).chain(after).collect();
        let count = inserted.len();
        self.line_count = inserted
            .iter()
            .map(Range::line_count)
            .fold(self.line_count, u64::saturating_add);
        self.items.splice(lo..lo, inserted);
        self.merge_around(lo, count);
    }

    /// Merges the `count` ranges placed at `lo` with each other and with
    /// their outer neighbours. Split pieces can change kind, so the
    /// neighbours of a piece are checked too.
    fn merge_around(&mut self, lo: usize, count: usize) {
        let mut index = lo.saturating_sub(1);
        let mut end = lo + count;
        while index < end {
            if self.try_merge(index) {
                end -= 1;
            } else {
                index += 1;
            }
        }
    }

    /// Folds the range after `index` into the one at `index` if they are
    /// adjacent and the same.
    fn try_merge(&mut self, index: usize) -> bool {
        let Some([left, right]) = self.items.get_mut(index..index + 2) else {
            return false;
        };
        if left.address_end().checked_add(1) != Some(right.address_start()) || !left.is_same(right)
        {
            return false;
        }
        let before = left.line_count().saturating_add(right.line_count());
        if let Err(err) = left.combine_adjacent(right) {
            log::warn!("{err}");
            return false;
        }
        self.line_count = self
            .line_count
            .saturating_sub(before)
            .saturating_add(left.line_count());
        log::debug!(
            "merged ranges into ${:X}..=${:X}",
            left.address_start(),
            left.address_end()
        );
        self.items.remove(index + 1);
        true
    }

    /// Removes all coverage of `start..=end`, cutting ranges that stick out.
    pub fn remove_range(&mut self, start: u64, end: u64) {
        debug_assert!(start <= end, "malformed span ${start:X}..=${end:X}");
        let lo = self.lower_bound(start);
        let hi = self.upper_bound(end).max(lo);
        let mut keep = Vec::new();
        for mut old in self.items.drain(lo..hi).collect::<Vec<_>>() {
            self.line_count = self.line_count.saturating_sub(old.line_count());
            if old.address_start() < start {
                keep.extend(old.split_before(start));
            }
            if old.address_end() > end {
                keep.extend(old.split_after(end));
            }
        }
        self.line_count = keep
            .iter()
            .map(Range::line_count)
            .fold(self.line_count, u64::saturating_add);
        let count = keep.len();
        self.items.splice(lo..lo, keep);
        self.merge_around(lo, count);
    }

    pub fn range_containing_address(&self, address: u64) -> Option<&T> {
        self.items
            .get(self.lower_bound(address))
            .filter(|r| r.address_start() <= address)
    }

    /// Line index of `address` counted over the whole collection.
    pub fn line_for_address(&self, address: u64) -> Option<u64> {
        let index = self.lower_bound(address);
        let range = self.items.get(index).filter(|r| r.contains(address))?;
        let preceding = self.items[..index]
            .iter()
            .map(Range::line_count)
            .fold(0, u64::saturating_add);
        Some(preceding.saturating_add(range.line_offset_for_address(address).ok()?))
    }

    /// Range holding the global line `line`, and the line's offset inside it.
    pub fn range_for_line(&self, mut line: u64) -> Option<(&T, u64)> {
        for range in &self.items {
            if line < range.line_count() {
                return Some((range, line));
            }
            line -= range.line_count();
        }
        None
    }
}

impl<T> Default for RangeCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a RangeCollection<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
