use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::model::{
    Booking, BookingId, Event, EventChanges, EventId, NewBooking, NewEvent, NewProfile,
    NewsletterSubscriber, ProfileChanges, SubscriberId, VolunteerId, VolunteerProfile,
};
use crate::roster::RosterChange;
use crate::store::{Store, StoreError};

#[derive(Default)]
struct Tables {
    events: BTreeMap<EventId, Event>,
    profiles: BTreeMap<VolunteerId, VolunteerProfile>,
    bookings: BTreeMap<BookingId, Booking>,
    subscribers: BTreeMap<SubscriberId, NewsletterSubscriber>,
    last_event_id: i32,
    last_profile_id: i32,
    last_booking_id: i32,
    last_subscriber_id: i32,
}

/// Hands out the next id like a `SERIAL` column, failing instead of wrapping.
fn next_id(last: &mut i32, table: &str) -> Result<i32, StoreError> {
    let next = last
        .checked_add(1)
        .ok_or_else(|| StoreError::Backend(format!("{table} ids exhausted").into()))?;
    *last = next;
    Ok(next)
}

/// Process-local store. One lock guards everything, so every mutation is atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(profiles: impl Iterator<Item = VolunteerProfile>) -> Vec<VolunteerProfile> {
    let mut profiles: Vec<VolunteerProfile> = profiles.collect();
    profiles.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    profiles
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.tables.lock().await.events.values().cloned().collect())
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.tables.lock().await.events.get(&id).cloned())
    }

    async fn insert_event(&self, event: NewEvent) -> Result<Event, StoreError> {
        let mut tables = self.tables.lock().await;
        let id = next_id(&mut tables.last_event_id, "event")?;
        let event = event.into_event(EventId(id));
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update_event(
        &self,
        id: EventId,
        changes: EventChanges,
    ) -> Result<Option<Event>, StoreError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.events.get_mut(&id).map(|event| {
            changes.apply(event);
            event.clone()
        }))
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, StoreError> {
        Ok(self.tables.lock().await.events.remove(&id).is_some())
    }

    async fn modify_event<C, F>(
        &self,
        id: EventId,
        mutation: F,
    ) -> Result<Option<(Event, C)>, StoreError>
    where
        C: RosterChange + Send,
        F: FnOnce(&mut Event) -> C + Send,
    {
        let mut tables = self.tables.lock().await;
        let Some(stored) = tables.events.get_mut(&id) else {
            return Ok(None);
        };
        let mut event = stored.clone();
        let change = mutation(&mut event);
        if change.changed() {
            stored.clone_from(&event);
        }
        Ok(Some((event, change)))
    }

    async fn events_for_volunteer(&self, volunteer: VolunteerId) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .events
            .values()
            .filter(|event| event.is_assigned(volunteer))
            .cloned()
            .collect())
    }

    async fn list_profiles(&self) -> Result<Vec<VolunteerProfile>, StoreError> {
        Ok(newest_first(
            self.tables.lock().await.profiles.values().cloned(),
        ))
    }

    async fn powerhouse_profiles(&self) -> Result<Vec<VolunteerProfile>, StoreError> {
        Ok(newest_first(
            self.tables
                .lock()
                .await
                .profiles
                .values()
                .filter(|profile| profile.powerhouse)
                .cloned(),
        ))
    }

    async fn get_profile(&self, id: VolunteerId) -> Result<Option<VolunteerProfile>, StoreError> {
        Ok(self.tables.lock().await.profiles.get(&id).cloned())
    }

    async fn profiles_by_ids(
        &self,
        ids: &[VolunteerId],
    ) -> Result<Vec<VolunteerProfile>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.profiles.get(id).cloned())
            .collect())
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<VolunteerProfile, StoreError> {
        let mut tables = self.tables.lock().await;
        let id = next_id(&mut tables.last_profile_id, "profile")?;
        let profile = profile.into_profile(VolunteerId(id), Utc::now());
        tables.profiles.insert(profile.id, profile.clone());
        Ok(profile)
    }

    async fn update_profile(
        &self,
        id: VolunteerId,
        changes: ProfileChanges,
    ) -> Result<Option<VolunteerProfile>, StoreError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.profiles.get_mut(&id).map(|profile| {
            changes.apply(profile);
            profile.clone()
        }))
    }

    async fn delete_profile(&self, id: VolunteerId) -> Result<bool, StoreError> {
        Ok(self.tables.lock().await.profiles.remove(&id).is_some())
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let mut bookings: Vec<Booking> =
            self.tables.lock().await.bookings.values().cloned().collect();
        bookings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(bookings)
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        let mut tables = self.tables.lock().await;
        let id = next_id(&mut tables.last_booking_id, "booking")?;
        let booking = booking.into_booking(BookingId(id), Utc::now());
        tables.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn set_booking_note(
        &self,
        id: BookingId,
        note: Option<String>,
    ) -> Result<Option<Booking>, StoreError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.bookings.get_mut(&id).map(|booking| {
            booking.admin_note = note;
            booking.clone()
        }))
    }

    async fn list_subscribers(&self) -> Result<Vec<NewsletterSubscriber>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .subscribers
            .values()
            .cloned()
            .collect())
    }

    async fn subscribe(&self, email: &str) -> Result<(NewsletterSubscriber, bool), StoreError> {
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables
            .subscribers
            .values()
            .find(|subscriber| subscriber.email == email)
        {
            return Ok((existing.clone(), false));
        }
        let id = SubscriberId(next_id(&mut tables.last_subscriber_id, "subscriber")?);
        let subscriber = NewsletterSubscriber {
            id,
            email: email.to_owned(),
            subscribed_at: Utc::now(),
        };
        tables.subscribers.insert(id, subscriber.clone());
        Ok((subscriber, true))
    }

    async fn unsubscribe(&self, id: SubscriberId) -> Result<bool, StoreError> {
        Ok(self.tables.lock().await.subscribers.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    #[tokio::test]
    async fn exhausted_ids_fail_instead_of_wrapping() {
        let store = MemoryStore::new();
        store.tables.lock().await.last_event_id = i32::MAX;

        let result = store
            .insert_event(NewEvent::new("Gala", DateTime::<Utc>::UNIX_EPOCH))
            .await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
        assert_eq!(store.tables.lock().await.last_event_id, i32::MAX);
        assert!(store.list_events().await.unwrap().is_empty());

        store.tables.lock().await.last_profile_id = i32::MAX;
        let result = store
            .insert_profile(NewProfile {
                full_name: "Asha".to_owned(),
                gender: None,
                department: "Media".to_owned(),
                best_department: None,
                powerhouse: false,
                user_id: None,
            })
            .await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn subscribing_twice_keeps_one_entry() {
        let store = MemoryStore::new();
        let (first, created) = store.subscribe("a@example.org").await.unwrap();
        assert!(created);
        let (second, created) = store.subscribe("a@example.org").await.unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(store.list_subscribers().await.unwrap().len(), 1);
    }
}
