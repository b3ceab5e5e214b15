use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

use crate::model::{RoomSchedule, ScheduleCollection};

const SNAPSHOT_CHANNEL_CAPACITY: usize = 256;

/// Failure reported by the system of record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// The system of record for weekly room schedules.
///
/// The scheduler mutates its in-memory collection first and then pushes
/// the affected room here; implementations decide durability and
/// transport. Remote changes arrive as full-collection snapshots on the
/// subscription channel.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Fetch the full room → schedule collection.
    async fn load_all(&self) -> Result<ScheduleCollection, StoreError>;

    /// Persist one room's schedule, replacing whatever was stored for it.
    async fn save_room(&self, room_id: &str, schedule: &RoomSchedule) -> Result<(), StoreError>;

    /// Remove a room entirely (its last booking was deleted).
    async fn delete_room(&self, room_id: &str) -> Result<(), StoreError>;

    /// Subscribe to remote-change snapshots. Dropping the receiver
    /// unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<ScheduleCollection>;
}

/// On-the-wire shape of one room: an id plus its slot-key → booking map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    pub id: String,
    pub room_id: String,
    pub bookings: RoomSchedule,
}

impl RoomRecord {
    pub fn new(room_id: impl Into<String>, bookings: RoomSchedule) -> Self {
        let room_id = room_id.into();
        Self {
            id: room_id.clone(),
            room_id,
            bookings,
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self).map_err(|e| StoreError(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        serde_json::from_str(json).map_err(|e| StoreError(e.to_string()))
    }
}

/// In-memory store: the reference implementation used in tests and
/// single-process deployments. Every successful write broadcasts the
/// full collection, the way a remote-change listener would see it.
pub struct MemoryStore {
    rooms: RwLock<ScheduleCollection>,
    snapshots: broadcast::Sender<ScheduleCollection>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(ScheduleCollection::new()),
            snapshots: broadcast::channel(SNAPSHOT_CHANNEL_CAPACITY).0,
        }
    }

    /// Replace the stored collection without notifying subscribers.
    /// Test setup only.
    pub async fn seed(&self, collection: ScheduleCollection) {
        *self.rooms.write().await = collection;
    }

    async fn publish(&self) {
        let snapshot = self.rooms.read().await.clone();
        // No-op if nobody is listening.
        let _ = self.snapshots.send(snapshot);
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn load_all(&self) -> Result<ScheduleCollection, StoreError> {
        Ok(self.rooms.read().await.clone())
    }

    async fn save_room(&self, room_id: &str, schedule: &RoomSchedule) -> Result<(), StoreError> {
        self.rooms
            .write()
            .await
            .insert(room_id.to_string(), schedule.clone());
        self.publish().await;
        Ok(())
    }

    async fn delete_room(&self, room_id: &str) -> Result<(), StoreError> {
        self.rooms.write().await.remove(room_id);
        self.publish().await;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ScheduleCollection> {
        self.snapshots.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Booking, Day, Hour, slot_key};

    fn schedule_with(day: Day, start: Hour, end: Hour) -> RoomSchedule {
        let mut bookings = RoomSchedule::new();
        bookings.insert(
            slot_key(day, start),
            Booking {
                course_name: "Math".into(),
                section: "CpE 3-1".into(),
                professor_name: Some("Engr. Dela Cruz".into()),
                day,
                start_time: start,
                end_time: end,
            },
        );
        bookings
    }

    #[test]
    fn room_record_wire_field_names() {
        let record = RoomRecord::new("A101", schedule_with(Day::Monday, 7, 9));
        let json = record.to_json().unwrap();
        assert!(json.contains("\"id\":\"A101\""));
        assert!(json.contains("\"roomId\":\"A101\""));
        assert!(json.contains("\"bookings\""));
        assert!(json.contains("\"Monday-7\""));
        assert_eq!(RoomRecord::from_json(&json).unwrap(), record);
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let store = MemoryStore::new();
        let schedule = schedule_with(Day::Monday, 7, 9);
        store.save_room("A101", &schedule).await.unwrap();

        let all = store.load_all().await.unwrap();
        assert_eq!(all.get("A101"), Some(&schedule));
    }

    #[tokio::test]
    async fn subscriber_sees_each_write() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();

        let schedule = schedule_with(Day::Tuesday, 9, 11);
        store.save_room("D203", &schedule).await.unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.get("D203"), Some(&schedule));

        store.delete_room("D203").await.unwrap();
        let snapshot = rx.recv().await.unwrap();
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn write_without_subscribers_is_noop() {
        let store = MemoryStore::new();
        // No subscriber — must not fail
        store
            .save_room("E101", &schedule_with(Day::Friday, 13, 14))
            .await
            .unwrap();
        store.delete_room("E101").await.unwrap();
    }
}
