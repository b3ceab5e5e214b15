use std::ops::{Range, RangeInclusive};

use crate::model::Hour;

/// Earliest hour offered by the time pickers.
pub const OPENING_HOUR: Hour = 7;
/// Latest hour offered by the time pickers.
pub const CLOSING_HOUR: Hour = 20;

/// Hours offered by the start/end pickers, in grid order.
pub fn bookable_hours() -> RangeInclusive<Hour> {
    OPENING_HOUR..=CLOSING_HOUR
}

/// The hours a class from `start` to `end` occupies: `[start, end)`.
///
/// Callers guarantee `start < end` (the scheduler rejects inverted
/// ranges before this is reached); otherwise the range is simply empty.
pub fn occupied_slots(start: Hour, end: Hour) -> Range<Hour> {
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupied_slots_are_half_open() {
        let slots: Vec<Hour> = occupied_slots(9, 11).collect();
        assert_eq!(slots, vec![9, 10]); // end hour is not occupied
    }

    #[test]
    fn occupied_slots_length_matches_duration() {
        for start in bookable_hours() {
            for end in (start + 1)..=CLOSING_HOUR {
                assert_eq!(occupied_slots(start, end).len(), (end - start) as usize);
            }
        }
    }

    #[test]
    fn single_hour_class() {
        let slots: Vec<Hour> = occupied_slots(7, 8).collect();
        assert_eq!(slots, vec![7]);
    }

    #[test]
    fn inverted_or_empty_range_occupies_nothing() {
        assert_eq!(occupied_slots(10, 9).count(), 0);
        assert_eq!(occupied_slots(10, 10).count(), 0);
    }

    #[test]
    fn picker_range_bounds() {
        let hours: Vec<Hour> = bookable_hours().collect();
        assert_eq!(hours.first(), Some(&7));
        assert_eq!(hours.last(), Some(&20));
        assert_eq!(hours.len(), 14);
    }
}
