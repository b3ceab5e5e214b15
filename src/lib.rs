//! Weekly room-booking engine: an hourly time grid, per-room slot maps,
//! overlap detection, and the edit/replace state machine that decides
//! whether a proposed class booking is stored, rejected, or overwrites a
//! conflicting one. Persistence is delegated to an injected
//! [`store::BookingStore`]; identity and rendering stay outside.

pub mod engine;
pub mod grid;
pub mod model;
pub mod store;

pub use engine::{
    BookingDraft, Capability, EditingRef, Occupied, Phase, ScheduleError, ScheduleMap, Scheduler,
    SchedulerOptions, SubmitOutcome, find_conflict,
};
pub use model::{Booking, Conflict, Day, Hour, RoomSchedule, ScheduleCollection, slot_key};
pub use store::{BookingStore, MemoryStore, RoomRecord, StoreError};
