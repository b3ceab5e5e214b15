use std::sync::Arc;
use std::time::Duration;

use roomsched::{
    BookingDraft, BookingStore, Capability, Day, MemoryStore, Scheduler, SubmitOutcome,
};

// ── Test infrastructure ──────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn draft(room: &str, course: &str, day: Day, start: u8, end: u8) -> BookingDraft {
    BookingDraft {
        room_id: room.into(),
        course_name: course.into(),
        section: "CpE 3-1".into(),
        professor_name: "Engr. Dela Cruz".into(),
        day: Some(day),
        start_time: Some(start),
        end_time: Some(end),
    }
}

/// One scheduler writes; a second read-only session follows along via
/// the store's snapshot channel, the way a second browser tab would.
#[tokio::test]
async fn second_session_follows_store_snapshots() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let mut rx = store.subscribe();

    let mut head = Scheduler::new(store.clone(), Capability::scheduler("dept head"));
    let mut viewer = Scheduler::new(store.clone(), Capability::read_only("student"));
    viewer.load().await.unwrap();
    assert!(viewer.schedules().is_empty());

    head.submit(&draft("A101", "Math", Day::Monday, 9, 11))
        .await
        .unwrap();

    let snapshot = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("snapshot within a second")
        .unwrap();
    viewer.apply_snapshot(snapshot);

    assert!(viewer.schedules().is_first_occupied_slot("A101", Day::Monday, 9));
    assert!(!viewer.schedules().is_first_occupied_slot("A101", Day::Monday, 10));

    // The viewer cannot write, only watch
    assert!(
        viewer
            .submit(&draft("A101", "Physics", Day::Tuesday, 9, 10))
            .await
            .is_err()
    );
}

/// The full scheduling session: create, collide, replace, edit, delete.
#[tokio::test]
async fn create_replace_edit_delete_round_trip() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let mut sched = Scheduler::new(store.clone(), Capability::scheduler("dept head"));
    sched.load().await.unwrap();

    // Create
    let outcome = sched
        .submit(&draft("A101", "Math", Day::Monday, 7, 8))
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Committed);

    // Collide and replace
    let outcome = sched
        .submit(&draft("A101", "Programming", Day::Monday, 7, 9))
        .await
        .unwrap();
    assert!(matches!(outcome, SubmitOutcome::Conflict(_)));
    sched.resolve_replace().await.unwrap();

    let persisted = store.load_all().await.unwrap();
    assert_eq!(persisted["A101"].len(), 1);
    assert_eq!(persisted["A101"]["Monday-7"].course_name, "Programming");

    // Edit the survivor into a new slot
    let mut form = sched.begin_edit("A101", Day::Monday, 8).unwrap().unwrap();
    assert_eq!(form.course_name, "Programming");
    form.day = Some(Day::Wednesday);
    sched.submit(&form).await.unwrap();

    let persisted = store.load_all().await.unwrap();
    assert!(persisted["A101"].contains_key("Wednesday-7"));
    assert!(!persisted["A101"].contains_key("Monday-7"));

    // Delete it; the emptied room disappears from the store
    sched.begin_edit("A101", Day::Wednesday, 7).unwrap().unwrap();
    sched.delete().await.unwrap();
    assert!(store.load_all().await.unwrap().is_empty());
}
