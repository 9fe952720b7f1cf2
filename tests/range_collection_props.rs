//! Property tests for the range collection invariants.

use proptest::prelude::*;
use rom_disasm::{
    Range, RangeCollection,
    region::{Region, RegionKind},
};

const SPACE: u64 = 256;

fn region(start: u64, len: u64, kind: u8) -> Region {
    let end = (start + len - 1).min(SPACE - 1);
    match kind {
        0 => Region::unknown(start, end),
        1 => Region::data(start, end),
        _ => Region::string(start, end),
    }
}

fn check_invariants(c: &RangeCollection<Region>) -> Result<(), TestCaseError> {
    for pair in c.ranges().windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        prop_assert!(a.address_start() <= a.address_end());
        prop_assert!(a.address_end() < b.address_start(), "overlap or unsorted");
        if a.address_end() + 1 == b.address_start() {
            prop_assert!(!a.is_same(b), "unmerged neighbours at ${:X}", b.address_start());
        }
    }
    let sum: u64 = c.iter().map(Range::line_count).sum();
    prop_assert_eq!(c.line_count(), sum);
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_after_every_insert(
        ops in prop::collection::vec((0..SPACE, 1..48u64, 0..3u8), 1..40)
    ) {
        let mut c = RangeCollection::new();
        let mut model: Vec<Option<RegionKind>> = vec![None; SPACE as usize];
        for (start, len, kind) in ops {
            let r = region(start, len, kind);
            for a in r.address_start()..=r.address_end() {
                model[a as usize] = Some(r.kind());
            }
            c.add_range(r);
            check_invariants(&c)?;
        }
        for (a, kind) in model.iter().enumerate() {
            let found = c.range_containing_address(a as u64).map(Region::kind);
            prop_assert_eq!(found, *kind, "address ${:X}", a);
        }
    }

    #[test]
    fn removal_keeps_invariants(
        ops in prop::collection::vec((0..SPACE, 1..48u64, 0..3u8), 1..20),
        cut in (0..SPACE, 1..64u64)
    ) {
        let mut c = RangeCollection::new();
        for (start, len, kind) in ops {
            c.add_range(region(start, len, kind));
        }
        let covered_before: u64 = c.iter().map(Range::len).sum();
        let (start, end) = (cut.0, (cut.0 + cut.1 - 1).min(SPACE - 1));
        let removed = (start..=end)
            .filter(|&a| c.range_containing_address(a).is_some())
            .count() as u64;
        c.remove_range(start, end);
        check_invariants(&c)?;
        for a in start..=end {
            prop_assert!(c.range_containing_address(a).is_none());
        }
        let covered_after: u64 = c.iter().map(Range::len).sum();
        prop_assert_eq!(covered_after, covered_before - removed);
    }
}
