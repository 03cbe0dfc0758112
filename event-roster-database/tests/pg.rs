//! Runs against a real PostgreSQL when `DATABASE_URL` is set, otherwise returns early.

use chrono::Utc;
use event_roster_assignment::model::{DepartmentAssignment, NewBooking, NewEvent};
use event_roster_assignment::roster::Assignment;
use event_roster_assignment::{BookingId, Store, VolunteerId};
use event_roster_database::PgStore;

async fn store() -> Option<PgStore> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let store = PgStore::connect(&url).unwrap();
    store.migrate().await.unwrap();
    Some(store)
}

#[tokio::test]
async fn roster_round_trip() {
    let Some(store) = store().await else {
        return;
    };
    // high enough to not collide with hand-entered rows
    let volunteer =
        VolunteerId(900_000 + i32::try_from(Utc::now().timestamp() % 10_000).unwrap());

    let mut event = NewEvent::new("Gala", Utc::now());
    event.department_assignments = vec![DepartmentAssignment {
        department: "Media".to_owned(),
        assigned_volunteers: Vec::new(),
    }];
    let event = store.insert_event(event).await.unwrap();

    let (updated, change) = store
        .modify_event(event.id, |event| event.assign_volunteer("Media", volunteer))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(change, Assignment::Added);
    assert!(updated.is_assigned(volunteer));

    let found = store.events_for_volunteer(volunteer).await.unwrap();
    assert!(found.iter().any(|found| found.id == event.id));
    assert!(store
        .get_event(event.id)
        .await
        .unwrap()
        .unwrap()
        .is_assigned(volunteer));

    assert!(store.delete_event(event.id).await.unwrap());
    assert!(store.events_for_volunteer(volunteer).await.unwrap().is_empty());
}

#[tokio::test]
async fn bookings_and_subscribers_round_trip() {
    let Some(store) = store().await else {
        return;
    };
    let booking = store
        .insert_booking(NewBooking {
            user_id: None,
            name: "Mira".to_owned(),
            email: "mira@example.org".to_owned(),
            event_type: "Wedding".to_owned(),
            event_date: None,
            message: None,
        })
        .await
        .unwrap();
    let noted = store
        .set_booking_note(booking.id, Some("call back".to_owned()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(noted.admin_note.as_deref(), Some("call back"));
    let cleared = store.set_booking_note(booking.id, None).await.unwrap().unwrap();
    assert_eq!(cleared.admin_note, None);
    assert!(store
        .set_booking_note(BookingId(-1), None)
        .await
        .unwrap()
        .is_none());

    let email = format!(
        "fan-{}@example.org",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    );
    let (first, created) = store.subscribe(&email).await.unwrap();
    assert!(created);
    let (second, created) = store.subscribe(&email).await.unwrap();
    assert!(!created);
    assert_eq!(first.id, second.id);
    assert!(store.unsubscribe(first.id).await.unwrap());
    assert!(!store.unsubscribe(first.id).await.unwrap());
}
