use core::time::Duration;

use async_trait::async_trait;

use crate::model::{
    Booking, BookingId, Event, EventChanges, EventId, NewBooking, NewEvent, NewProfile,
    NewsletterSubscriber, ProfileChanges, SubscriberId, VolunteerId, VolunteerProfile,
};
use crate::roster::RosterChange;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store did not answer within {0:?}")]
    Timeout(Duration),
    #[error("store backend failed: {0}")]
    Backend(#[source] BoxError),
}

/// Persistence of events and volunteer profiles.
///
/// Events own their rosters, so a roster mutation is a single-record
/// read-modify-write. Implementations must run [`Store::modify_event`]
/// atomically with respect to other writers of the same event.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError>;

    async fn insert_event(&self, event: NewEvent) -> Result<Event, StoreError>;

    async fn update_event(
        &self,
        id: EventId,
        changes: EventChanges,
    ) -> Result<Option<Event>, StoreError>;

    /// Returns `false` if there was no such event.
    async fn delete_event(&self, id: EventId) -> Result<bool, StoreError>;

    /// Loads the event, applies `mutation` and persists the result if it reports
    /// a change. `None` if the event does not exist.
    async fn modify_event<C, F>(
        &self,
        id: EventId,
        mutation: F,
    ) -> Result<Option<(Event, C)>, StoreError>
    where
        C: RosterChange + Send,
        F: FnOnce(&mut Event) -> C + Send;

    /// Events whose department rosters list the volunteer, in any order.
    async fn events_for_volunteer(&self, volunteer: VolunteerId) -> Result<Vec<Event>, StoreError>;

    /// Newest first.
    async fn list_profiles(&self) -> Result<Vec<VolunteerProfile>, StoreError>;

    /// Profiles flagged powerhouse, newest first.
    async fn powerhouse_profiles(&self) -> Result<Vec<VolunteerProfile>, StoreError>;

    async fn get_profile(&self, id: VolunteerId) -> Result<Option<VolunteerProfile>, StoreError>;

    /// Missing ids are skipped.
    async fn profiles_by_ids(
        &self,
        ids: &[VolunteerId],
    ) -> Result<Vec<VolunteerProfile>, StoreError>;

    async fn insert_profile(&self, profile: NewProfile) -> Result<VolunteerProfile, StoreError>;

    async fn update_profile(
        &self,
        id: VolunteerId,
        changes: ProfileChanges,
    ) -> Result<Option<VolunteerProfile>, StoreError>;

    /// Returns `false` if there was no such profile. Events keep their references.
    async fn delete_profile(&self, id: VolunteerId) -> Result<bool, StoreError>;

    /// Newest first.
    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError>;

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError>;

    /// `None` clears the note. `None` is returned if there was no such booking.
    async fn set_booking_note(
        &self,
        id: BookingId,
        note: Option<String>,
    ) -> Result<Option<Booking>, StoreError>;

    /// In subscription order.
    async fn list_subscribers(&self) -> Result<Vec<NewsletterSubscriber>, StoreError>;

    /// Adds the address unless it is already subscribed. The flag tells whether
    /// a new subscriber was created.
    async fn subscribe(&self, email: &str) -> Result<(NewsletterSubscriber, bool), StoreError>;

    /// Returns `false` if there was no such subscriber.
    async fn unsubscribe(&self, id: SubscriberId) -> Result<bool, StoreError>;
}
