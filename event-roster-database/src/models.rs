use chrono::{DateTime, Utc};
use diesel::prelude::*;
use event_roster_assignment::model::{
    DepartmentAssignment, EventChanges, EventStatus, Gender, NewBooking, NewEvent, NewProfile,
    ProfileChanges,
};
use event_roster_assignment::{
    Booking, BookingId, Event, EventId, NewsletterSubscriber, SubscriberId, VolunteerId,
    VolunteerProfile,
};
use serde_json::Value as JsonValue;

use crate::error::DatabaseError;
use crate::schema::{bookings, events, newsletter_subscribers, volunteer_profiles};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRow {
    pub id: i32,
    pub name: String,
    pub date: Option<DateTime<Utc>>,
    pub location: String,
    pub description: Option<String>,
    pub total_volunteers: i32,
    pub male_req: i32,
    pub female_req: i32,
    pub status: String,
    pub department_assignments: JsonValue,
    pub assigned_volunteers: Vec<i32>,
}

fn volunteer_ids(ids: Vec<i32>) -> Vec<VolunteerId> {
    ids.into_iter().map(VolunteerId).collect()
}

fn raw_ids(ids: &[VolunteerId]) -> Vec<i32> {
    ids.iter().map(|id| id.0).collect()
}

impl TryFrom<EventRow> for Event {
    type Error = DatabaseError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| DatabaseError::CorruptRow {
            table: "events",
            id: row.id,
            reason,
        };
        let status = row
            .status
            .parse::<EventStatus>()
            .map_err(|error| corrupt(format!("{error}")))?;
        let department_assignments: Vec<DepartmentAssignment> =
            serde_json::from_value(row.department_assignments.clone())
                .map_err(|error| corrupt(format!("department assignments: {error}")))?;
        Ok(Self {
            id: EventId(row.id),
            name: row.name,
            date: row.date,
            location: row.location,
            description: row.description,
            total_volunteers: row.total_volunteers,
            male_req: row.male_req,
            female_req: row.female_req,
            status,
            department_assignments,
            assigned_volunteers: volunteer_ids(row.assigned_volunteers),
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub struct NewEventRow {
    pub name: String,
    pub date: Option<DateTime<Utc>>,
    pub location: String,
    pub description: Option<String>,
    pub total_volunteers: i32,
    pub male_req: i32,
    pub female_req: i32,
    pub status: String,
    pub department_assignments: JsonValue,
    pub assigned_volunteers: Vec<i32>,
}

impl TryFrom<NewEvent> for NewEventRow {
    type Error = DatabaseError;

    fn try_from(event: NewEvent) -> Result<Self, Self::Error> {
        Ok(Self {
            department_assignments: serde_json::to_value(&event.department_assignments)?,
            assigned_volunteers: raw_ids(&event.assigned_volunteers),
            name: event.name,
            date: Some(event.date),
            location: event.location,
            description: event.description,
            total_volunteers: event.total_volunteers,
            male_req: event.male_req,
            female_req: event.female_req,
            status: event.status.as_str().to_owned(),
        })
    }
}

/// `None` fields are left out of the `UPDATE`.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = events)]
pub struct EventChangeset {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl EventChangeset {
    /// Diesel refuses an `UPDATE` without columns.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.status.is_none()
    }
}

impl From<EventChanges> for EventChangeset {
    fn from(changes: EventChanges) -> Self {
        Self {
            name: changes.name,
            date: changes.date,
            location: changes.location,
            description: changes.description,
            status: changes.status.map(|status| status.as_str().to_owned()),
        }
    }
}

/// Both rosters, always written together.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = events)]
pub struct RosterChangeset {
    pub department_assignments: JsonValue,
    pub assigned_volunteers: Vec<i32>,
}

impl TryFrom<&Event> for RosterChangeset {
    type Error = DatabaseError;

    fn try_from(event: &Event) -> Result<Self, Self::Error> {
        Ok(Self {
            department_assignments: serde_json::to_value(&event.department_assignments)?,
            assigned_volunteers: raw_ids(&event.assigned_volunteers),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = volunteer_profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    pub id: i32,
    pub full_name: String,
    pub gender: Option<String>,
    pub department: String,
    pub best_department: Option<String>,
    pub powerhouse: bool,
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for VolunteerProfile {
    type Error = DatabaseError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let gender = row
            .gender
            .as_deref()
            .map(str::parse::<Gender>)
            .transpose()
            .map_err(|error| DatabaseError::CorruptRow {
                table: "volunteer_profiles",
                id: row.id,
                reason: format!("{error}"),
            })?;
        Ok(Self {
            id: VolunteerId(row.id),
            full_name: row.full_name,
            gender,
            department: row.department,
            best_department: row.best_department,
            powerhouse: row.powerhouse,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = volunteer_profiles)]
pub struct NewProfileRow {
    pub full_name: String,
    pub gender: Option<String>,
    pub department: String,
    pub best_department: Option<String>,
    pub powerhouse: bool,
    pub user_id: Option<i32>,
}

impl From<NewProfile> for NewProfileRow {
    fn from(profile: NewProfile) -> Self {
        Self {
            full_name: profile.full_name,
            gender: profile.gender.map(|gender| gender.as_str().to_owned()),
            department: profile.department,
            best_department: profile.best_department,
            powerhouse: profile.powerhouse,
            user_id: profile.user_id,
        }
    }
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = volunteer_profiles)]
pub struct ProfileChangeset {
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub department: Option<String>,
    pub best_department: Option<String>,
    pub powerhouse: Option<bool>,
}

impl ProfileChangeset {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.gender.is_none()
            && self.department.is_none()
            && self.best_department.is_none()
            && self.powerhouse.is_none()
    }
}

impl From<ProfileChanges> for ProfileChangeset {
    fn from(changes: ProfileChanges) -> Self {
        Self {
            full_name: changes.full_name,
            gender: changes.gender.map(|gender| gender.as_str().to_owned()),
            department: changes.department,
            best_department: changes.best_department,
            powerhouse: changes.powerhouse,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BookingRow {
    pub id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub event_type: String,
    pub event_date: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: BookingId(row.id),
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            event_type: row.event_type,
            event_date: row.event_date,
            message: row.message,
            admin_note: row.admin_note,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub struct NewBookingRow {
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub event_type: String,
    pub event_date: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl From<NewBooking> for NewBookingRow {
    fn from(booking: NewBooking) -> Self {
        Self {
            user_id: booking.user_id,
            name: booking.name,
            email: booking.email,
            event_type: booking.event_type,
            event_date: booking.event_date,
            message: booking.message,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = newsletter_subscribers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubscriberRow {
    pub id: i32,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

impl From<SubscriberRow> for NewsletterSubscriber {
    fn from(row: SubscriberRow) -> Self {
        Self {
            id: SubscriberId(row.id),
            email: row.email,
            subscribed_at: row.subscribed_at,
        }
    }
}
