use tracing::debug;

use crate::grid;
use crate::model::{Booking, Conflict, Day, Hour, RoomSchedule};

use super::error::ScheduleError;
use super::{BookingDraft, SchedulerOptions};

/// Reject a draft before it reaches conflict detection or the store.
/// Builds the booking on success.
pub(super) fn validate(
    draft: &BookingDraft,
    options: &SchedulerOptions,
) -> Result<Booking, ScheduleError> {
    if draft.room_id.is_empty() {
        return Err(ScheduleError::MissingField("roomId"));
    }
    if draft.course_name.is_empty() {
        return Err(ScheduleError::MissingField("courseName"));
    }
    if draft.section.is_empty() {
        return Err(ScheduleError::MissingField("section"));
    }
    if options.require_professor && draft.professor_name.is_empty() {
        return Err(ScheduleError::MissingField("professorName"));
    }
    let day = draft.day.ok_or(ScheduleError::MissingField("day"))?;
    let start = draft
        .start_time
        .ok_or(ScheduleError::MissingField("startTime"))?;
    let end = draft
        .end_time
        .ok_or(ScheduleError::MissingField("endTime"))?;

    if !options.days.contains(&day) {
        return Err(ScheduleError::DayNotBookable(day));
    }
    for hour in [start, end] {
        if !grid::bookable_hours().contains(&hour) {
            return Err(ScheduleError::HourOutOfRange(hour));
        }
    }
    if start >= end {
        return Err(ScheduleError::InvalidTimeRange { start, end });
    }

    Ok(Booking {
        course_name: draft.course_name.clone(),
        section: draft.section.clone(),
        professor_name: (!draft.professor_name.is_empty()).then(|| draft.professor_name.clone()),
        day,
        start_time: start,
        end_time: end,
    })
}

/// Find the first existing booking whose occupied slots intersect the
/// proposal's on the same day.
///
/// `exclude_slot_key` skips the booking currently being edited — without
/// it an in-place edit would always conflict with its own original
/// record. While the disjointness invariant holds, at most one booking
/// can intersect, so iteration order only decides which record is
/// reported after an out-of-band write has violated it.
pub fn find_conflict(
    schedule: &RoomSchedule,
    day: Day,
    start: Hour,
    end: Hour,
    exclude_slot_key: Option<&str>,
) -> Option<Conflict> {
    let proposed = grid::occupied_slots(start, end);
    for (slot_key, booking) in schedule {
        if exclude_slot_key == Some(slot_key.as_str()) {
            continue;
        }
        if booking.day != day {
            continue;
        }
        let existing = grid::occupied_slots(booking.start_time, booking.end_time);
        if proposed.clone().any(|hour| existing.contains(&hour)) {
            debug!("proposed {day} {start}:00-{end}:00 overlaps {slot_key}");
            return Some(Conflict {
                slot_key: slot_key.clone(),
                booking: booking.clone(),
            });
        }
    }
    None
}
