use core::fmt::{self, Display};
use core::future::Future;
use core::time::Duration;
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::display::{rank_profiles_for_display, referenced_volunteers, sort_events_by_date, EventView};
use crate::model::{
    Booking, BookingId, Event, EventChanges, EventId, Gender, NewBooking, NewEvent, NewProfile,
    NewsletterSubscriber, ProfileChanges, SubscriberId, VolunteerId, VolunteerProfile,
};
use crate::roster::{Assignment, Removal, RemovalPolicy};
use crate::store::{Store, StoreError};

/// The record a failed lookup was looking for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Missing {
    Event(EventId),
    /// Kept as text since unparsable ids are reported too.
    Volunteer(String),
    Profile(VolunteerId),
    Booking(BookingId),
    Subscriber(SubscriberId),
}

impl Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(id) => write!(f, "event {id}"),
            Self::Volunteer(id) => write!(f, "volunteer {id:?}"),
            Self::Profile(id) => write!(f, "volunteer profile {id}"),
            Self::Booking(id) => write!(f, "booking {id}"),
            Self::Subscriber(id) => write!(f, "newsletter subscriber {id}"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AssignmentError {
    #[error("{0} not found")]
    NotFound(Missing),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned(Event),
    AlreadyAssigned(Event),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed(Event),
    Unchanged(Event),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Updated(Event),
    /// Every field was blank; nothing was written.
    Unchanged(Event),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed(NewsletterSubscriber),
    AlreadySubscribed(NewsletterSubscriber),
}

/// A profile as offered in the assignment picker of an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChoice {
    pub id: VolunteerId,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub department: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventDetails {
    pub event: EventView,
    pub profiles: Vec<ProfileChoice>,
}

/// The only writer of event rosters.
///
/// Every roster operation is a single read-modify-write on one event, executed
/// by [`Store::modify_event`]. Every store call is bounded by `timeout`.
#[derive(Clone, Debug)]
pub struct AssignmentManager<S> {
    store: S,
    policy: RemovalPolicy,
    timeout: Duration,
}

impl<S: Store> AssignmentManager<S> {
    pub const fn new(store: S, policy: RemovalPolicy, timeout: Duration) -> Self {
        Self {
            store,
            policy,
            timeout,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn removal_policy(&self) -> RemovalPolicy {
        self.policy
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>> + Send,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_elapsed| StoreError::Timeout(self.timeout))?
    }

    async fn profiles_for(
        &self,
        events: &[Event],
    ) -> Result<HashMap<VolunteerId, VolunteerProfile>, StoreError> {
        let ids = referenced_volunteers(events);
        let profiles = self.bounded(self.store.profiles_by_ids(&ids)).await?;
        Ok(profiles
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect())
    }

    pub async fn assign_volunteer(
        &self,
        event: EventId,
        department: &str,
        volunteer: &str,
    ) -> Result<AssignOutcome, AssignmentError> {
        if department.trim().is_empty() || volunteer.trim().is_empty() {
            return Err(AssignmentError::InvalidInput(
                "please select both volunteer and department".to_owned(),
            ));
        }
        let volunteer_id: VolunteerId = volunteer
            .parse()
            .map_err(|_| AssignmentError::NotFound(Missing::Volunteer(volunteer.to_owned())))?;
        if self
            .bounded(self.store.get_profile(volunteer_id))
            .await?
            .is_none()
        {
            return Err(AssignmentError::NotFound(Missing::Volunteer(
                volunteer.to_owned(),
            )));
        }

        let (updated, assignment) = self
            .bounded(self.store.modify_event(event, |stored: &mut Event| {
                stored.assign_volunteer(department, volunteer_id)
            }))
            .await?
            .ok_or(AssignmentError::NotFound(Missing::Event(event)))?;

        Ok(match assignment {
            Assignment::Added => {
                info!(%event, %volunteer_id, department, "assigned volunteer");
                AssignOutcome::Assigned(updated)
            }
            Assignment::AlreadyAssigned => {
                debug!(%event, %volunteer_id, department, "volunteer already assigned");
                AssignOutcome::AlreadyAssigned(updated)
            }
        })
    }

    pub async fn remove_volunteer(
        &self,
        event: EventId,
        department: &str,
        volunteer: &str,
    ) -> Result<RemoveOutcome, AssignmentError> {
        if department.trim().is_empty() {
            return Err(AssignmentError::InvalidInput(
                "department is required".to_owned(),
            ));
        }
        let policy = self.policy;
        let (updated, removal) = self
            .bounded(self.store.modify_event(event, |stored: &mut Event| {
                stored.remove_volunteer(department, volunteer, policy)
            }))
            .await?
            .ok_or(AssignmentError::NotFound(Missing::Event(event)))?;

        Ok(match removal {
            Removal::Removed => {
                info!(%event, volunteer, department, ?policy, "removed volunteer");
                RemoveOutcome::Removed(updated)
            }
            Removal::Unchanged => {
                debug!(%event, volunteer, department, "volunteer not on roster");
                RemoveOutcome::Unchanged(updated)
            }
        })
    }

    /// Events listing the volunteer in any department, oldest first.
    pub async fn list_events_for_volunteer(
        &self,
        volunteer: VolunteerId,
    ) -> Result<Vec<EventView>, AssignmentError> {
        let mut events = self
            .bounded(self.store.events_for_volunteer(volunteer))
            .await?;
        sort_events_by_date(&mut events);
        let profiles = self.profiles_for(&events).await?;
        Ok(events
            .into_iter()
            .map(|event| EventView::populate(event, &profiles))
            .collect())
    }

    /// Powerhouse volunteers ranked for the home page.
    pub async fn home_roster<T: AsRef<str> + Sync>(
        &self,
        sequence: &[T],
    ) -> Result<Vec<VolunteerProfile>, AssignmentError> {
        let profiles = self.bounded(self.store.powerhouse_profiles()).await?;
        Ok(rank_profiles_for_display(profiles, sequence))
    }

    pub async fn create_event(&self, event: NewEvent) -> Result<Event, AssignmentError> {
        if event.name.trim().is_empty() {
            return Err(AssignmentError::InvalidInput("name is required".to_owned()));
        }
        let event = self.bounded(self.store.insert_event(event)).await?;
        info!(event = %event.id, name = %event.name, "created event");
        Ok(event)
    }

    /// Rosters are never touched by an edit.
    pub async fn update_event(
        &self,
        id: EventId,
        changes: EventChanges,
    ) -> Result<EditOutcome, AssignmentError> {
        if changes.is_empty() {
            let event = self
                .bounded(self.store.get_event(id))
                .await?
                .ok_or(AssignmentError::NotFound(Missing::Event(id)))?;
            debug!(event = %id, "empty edit, skipping write");
            return Ok(EditOutcome::Unchanged(event));
        }
        let event = self
            .bounded(self.store.update_event(id, changes))
            .await?
            .ok_or(AssignmentError::NotFound(Missing::Event(id)))?;
        info!(event = %id, "updated event");
        Ok(EditOutcome::Updated(event))
    }

    pub async fn delete_event(&self, id: EventId) -> Result<(), AssignmentError> {
        if !self.bounded(self.store.delete_event(id)).await? {
            return Err(AssignmentError::NotFound(Missing::Event(id)));
        }
        info!(event = %id, "deleted event");
        Ok(())
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, AssignmentError> {
        let mut events = self.bounded(self.store.list_events()).await?;
        sort_events_by_date(&mut events);
        Ok(events)
    }

    pub async fn event_details(&self, id: EventId) -> Result<EventDetails, AssignmentError> {
        let event = self
            .bounded(self.store.get_event(id))
            .await?
            .ok_or(AssignmentError::NotFound(Missing::Event(id)))?;
        let all_profiles = self.bounded(self.store.list_profiles()).await?;

        let by_id: HashMap<VolunteerId, VolunteerProfile> = all_profiles
            .iter()
            .map(|profile| (profile.id, profile.clone()))
            .collect();
        let mut profiles: Vec<ProfileChoice> = all_profiles
            .into_iter()
            .map(|profile| ProfileChoice {
                id: profile.id,
                full_name: profile.full_name,
                gender: profile.gender,
                department: profile.department,
            })
            .collect();
        profiles.sort_by(|a, b| a.full_name.cmp(&b.full_name));

        Ok(EventDetails {
            event: EventView::populate(event, &by_id),
            profiles,
        })
    }

    pub async fn list_profiles(&self) -> Result<Vec<VolunteerProfile>, AssignmentError> {
        Ok(self.bounded(self.store.list_profiles()).await?)
    }

    pub async fn create_profile(
        &self,
        profile: NewProfile,
    ) -> Result<VolunteerProfile, AssignmentError> {
        let profile = self.bounded(self.store.insert_profile(profile)).await?;
        info!(volunteer = %profile.id, "created volunteer profile");
        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        id: VolunteerId,
        changes: ProfileChanges,
    ) -> Result<VolunteerProfile, AssignmentError> {
        let profile = self
            .bounded(self.store.update_profile(id, changes))
            .await?
            .ok_or(AssignmentError::NotFound(Missing::Profile(id)))?;
        info!(volunteer = %id, "updated volunteer profile");
        Ok(profile)
    }

    pub async fn set_powerhouse(
        &self,
        id: VolunteerId,
        powerhouse: bool,
    ) -> Result<VolunteerProfile, AssignmentError> {
        let changes = ProfileChanges {
            powerhouse: Some(powerhouse),
            ..ProfileChanges::default()
        };
        let profile = self
            .bounded(self.store.update_profile(id, changes))
            .await?
            .ok_or(AssignmentError::NotFound(Missing::Profile(id)))?;
        info!(volunteer = %id, powerhouse, "set powerhouse flag");
        Ok(profile)
    }

    /// Events keep referring to the deleted id.
    pub async fn delete_profile(&self, id: VolunteerId) -> Result<(), AssignmentError> {
        if !self.bounded(self.store.delete_profile(id)).await? {
            return Err(AssignmentError::NotFound(Missing::Profile(id)));
        }
        info!(volunteer = %id, "deleted volunteer profile");
        Ok(())
    }

    /// Newest first.
    pub async fn list_bookings(&self) -> Result<Vec<Booking>, AssignmentError> {
        Ok(self.bounded(self.store.list_bookings()).await?)
    }

    pub async fn create_booking(&self, booking: NewBooking) -> Result<Booking, AssignmentError> {
        if booking.name.trim().is_empty() || !booking.email.contains('@') {
            return Err(AssignmentError::InvalidInput(
                "name and a valid email are required".to_owned(),
            ));
        }
        let booking = self.bounded(self.store.insert_booking(booking)).await?;
        info!(booking = %booking.id, "received booking");
        Ok(booking)
    }

    /// A blank note clears it.
    pub async fn set_booking_note(
        &self,
        id: BookingId,
        note: Option<String>,
    ) -> Result<Booking, AssignmentError> {
        let booking = self
            .bounded(self.store.set_booking_note(id, note))
            .await?
            .ok_or(AssignmentError::NotFound(Missing::Booking(id)))?;
        info!(booking = %id, "updated admin note");
        Ok(booking)
    }

    pub async fn list_subscribers(&self) -> Result<Vec<NewsletterSubscriber>, AssignmentError> {
        Ok(self.bounded(self.store.list_subscribers()).await?)
    }

    pub async fn subscribe(&self, email: &str) -> Result<SubscribeOutcome, AssignmentError> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AssignmentError::InvalidInput(format!(
                "invalid email address {email:?}"
            )));
        }
        let (subscriber, created) = self.bounded(self.store.subscribe(email)).await?;
        Ok(if created {
            info!(subscriber = %subscriber.id, "new newsletter subscriber");
            SubscribeOutcome::Subscribed(subscriber)
        } else {
            debug!(subscriber = %subscriber.id, "already subscribed");
            SubscribeOutcome::AlreadySubscribed(subscriber)
        })
    }

    pub async fn unsubscribe(&self, id: SubscriberId) -> Result<(), AssignmentError> {
        if !self.bounded(self.store.unsubscribe(id)).await? {
            return Err(AssignmentError::NotFound(Missing::Subscriber(id)));
        }
        info!(subscriber = %id, "removed newsletter subscriber");
        Ok(())
    }
}
