use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Hour of day on the booking grid — the only time type.
pub type Hour = u8;

/// Day of the week, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// The full week, in picker order. Deployments may restrict to a
    /// subset via `SchedulerOptions::days`.
    pub const WEEK: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scheduled class occupying the half-open hour range
/// `[start_time, end_time)` on one day: a class from 9 to 11 occupies
/// hours 9 and 10, not 11.
///
/// Serialized field names follow the store wire shape (`courseName`,
/// `startTime`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub course_name: String,
    pub section: String,
    /// Optional by deployment; the default configuration requires it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor_name: Option<String>,
    pub day: Day,
    pub start_time: Hour,
    pub end_time: Hour,
}

impl Booking {
    /// The slot key this booking is stored under within its room.
    pub fn slot_key(&self) -> String {
        slot_key(self.day, self.start_time)
    }

    /// Number of grid rows the booking spans when rendered.
    pub fn row_span(&self) -> Hour {
        self.end_time.saturating_sub(self.start_time)
    }
}

/// String identity of a booking within a room: `"{day}-{startHour}"`,
/// e.g. `Monday-7`. Day + start hour is the whole identity — two
/// bookings in one room can never share it.
pub fn slot_key(day: Day, start: Hour) -> String {
    format!("{day}-{start}")
}

/// One room's weekly bookings, keyed by slot key. Occupied-slot
/// disjointness between entries is enforced by the conflict check at
/// write time, not by the map itself.
pub type RoomSchedule = BTreeMap<String, Booking>;

/// Room identifier → schedule. Room ids are opaque strings composed by
/// the room picker; rooms with no bookings are pruned rather than kept
/// as empty entries.
pub type ScheduleCollection = BTreeMap<String, RoomSchedule>;

// ── Query result types ───────────────────────────────────────────

/// An existing booking blocking a proposal, reported for the
/// replace/cancel prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub slot_key: String,
    pub booking: Booking,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.booking;
        write!(f, "{} {}", b.course_name, b.section)?;
        if let Some(prof) = &b.professor_name {
            write!(f, " ({prof})")?;
        }
        write!(f, ", {} {}:00-{}:00", b.day, b.start_time, b.end_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math(day: Day, start: Hour, end: Hour) -> Booking {
        Booking {
            course_name: "Math".into(),
            section: "CpE 3-1".into(),
            professor_name: Some("Engr. Dela Cruz".into()),
            day,
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn slot_key_format() {
        assert_eq!(slot_key(Day::Monday, 7), "Monday-7");
        assert_eq!(slot_key(Day::Sunday, 20), "Sunday-20");
        assert_eq!(math(Day::Wednesday, 9, 11).slot_key(), "Wednesday-9");
    }

    #[test]
    fn row_span_is_hour_count() {
        assert_eq!(math(Day::Monday, 9, 11).row_span(), 2);
        assert_eq!(math(Day::Monday, 7, 8).row_span(), 1);
    }

    #[test]
    fn week_is_ordered_and_complete() {
        assert_eq!(Day::WEEK.len(), 7);
        assert_eq!(Day::WEEK[0], Day::Monday);
        assert_eq!(Day::WEEK[6], Day::Sunday);
        for pair in Day::WEEK.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn booking_serde_uses_wire_field_names() {
        let json = serde_json::to_string(&math(Day::Monday, 7, 9)).unwrap();
        assert!(json.contains("\"courseName\":\"Math\""));
        assert!(json.contains("\"professorName\""));
        assert!(json.contains("\"day\":\"Monday\""));
        assert!(json.contains("\"startTime\":7"));
        assert!(json.contains("\"endTime\":9"));
    }

    #[test]
    fn booking_serde_roundtrip_without_professor() {
        let mut b = math(Day::Friday, 13, 15);
        b.professor_name = None;
        let json = serde_json::to_string(&b).unwrap();
        assert!(!json.contains("professorName"));
        let back: Booking = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn conflict_display_names_the_booking() {
        let c = Conflict {
            slot_key: "Monday-7".into(),
            booking: math(Day::Monday, 7, 9),
        };
        let text = c.to_string();
        assert!(text.contains("Math"));
        assert!(text.contains("CpE 3-1"));
        assert!(text.contains("Engr. Dela Cruz"));
        assert!(text.contains("Monday 7:00-9:00"));
    }
}
