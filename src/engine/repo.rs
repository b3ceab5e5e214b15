use crate::grid;
use crate::model::{Booking, Day, Hour, RoomSchedule, ScheduleCollection};

/// Read result for one grid cell: the booking occupying it and the slot
/// key it is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupied<'a> {
    pub slot_key: &'a str,
    pub booking: &'a Booking,
}

/// In-memory weekly schedules, one slot-key → booking map per room.
///
/// Mutations must go through the scheduler: this structure does not
/// check slot disjointness itself.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScheduleMap {
    rooms: ScheduleCollection,
}

impl ScheduleMap {
    pub fn new() -> Self {
        Self {
            rooms: ScheduleCollection::new(),
        }
    }

    /// The booking occupying `(day, hour)` in a room, if any.
    ///
    /// A linear scan over the room's bookings — bounded by the weekly
    /// grid, so there is nothing worth indexing. Unknown rooms and free
    /// cells are simply unoccupied; this never fails.
    pub fn occupant(&self, room_id: &str, day: Day, hour: Hour) -> Option<Occupied<'_>> {
        let schedule = self.rooms.get(room_id)?;
        for (slot_key, booking) in schedule {
            if booking.day == day
                && grid::occupied_slots(booking.start_time, booking.end_time).contains(&hour)
            {
                return Some(Occupied { slot_key, booking });
            }
        }
        None
    }

    /// True iff a booking occupies the cell and starts there — the
    /// anchor row for a multi-hour rendering.
    pub fn is_first_occupied_slot(&self, room_id: &str, day: Day, hour: Hour) -> bool {
        self.occupant(room_id, day, hour)
            .is_some_and(|o| o.booking.start_time == hour)
    }

    /// Insert or overwrite at the booking's slot key, creating the room
    /// entry on demand.
    pub fn put(&mut self, room_id: &str, booking: Booking) {
        self.rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(booking.slot_key(), booking);
    }

    /// Delete a slot. A room whose last booking is removed is pruned
    /// from the collection entirely — no empty-room residue.
    pub fn remove_slot(&mut self, room_id: &str, slot_key: &str) -> Option<Booking> {
        let schedule = self.rooms.get_mut(room_id)?;
        let removed = schedule.remove(slot_key);
        if schedule.is_empty() {
            self.rooms.remove(room_id);
        }
        removed
    }

    pub fn room(&self, room_id: &str) -> Option<&RoomSchedule> {
        self.rooms.get(room_id)
    }

    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Clone of the whole collection, for persistence and assertions.
    pub fn snapshot(&self) -> ScheduleCollection {
        self.rooms.clone()
    }

    /// Replace everything with a store snapshot.
    pub fn replace_all(&mut self, collection: ScheduleCollection) {
        self.rooms = collection;
    }
}
