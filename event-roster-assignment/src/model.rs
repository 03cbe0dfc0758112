use core::fmt::{self, Display};
use core::num::ParseIntError;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i32);

/// Weak reference to a [`VolunteerProfile`]. Holding one does not keep the profile alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VolunteerId(pub i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub i32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(pub i32);

macro_rules! id_text {
    ($name:ident) => {
        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

id_text!(EventId);
id_text!(VolunteerId);
id_text!(BookingId);
id_text!(SubscriberId);

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Self::Male),
            "Female" => Ok(Self::Female),
            "Other" => Ok(Self::Other),
            other => Err(UnknownVariant {
                kind: "gender",
                value: other.to_owned(),
            }),
        }
    }
}

/// A label set by operators. Any transition is allowed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    #[default]
    Pending,
    Upcoming,
    Ongoing,
    Completed,
}

impl EventStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Upcoming => "Upcoming",
            Self::Ongoing => "Ongoing",
            Self::Completed => "Completed",
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Upcoming" => Ok(Self::Upcoming),
            "Ongoing" => Ok(Self::Ongoing),
            "Completed" => Ok(Self::Completed),
            other => Err(UnknownVariant {
                kind: "event status",
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentAssignment {
    pub department: String,
    pub assigned_volunteers: Vec<VolunteerId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Required on creation. Legacy rows may lack it.
    pub date: Option<DateTime<Utc>>,
    pub location: String,
    pub description: Option<String>,
    pub total_volunteers: i32,
    pub male_req: i32,
    pub female_req: i32,
    pub status: EventStatus,
    pub department_assignments: Vec<DepartmentAssignment>,
    /// Flattened roster: cache of the union of all department rosters.
    pub assigned_volunteers: Vec<VolunteerId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEvent {
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub description: Option<String>,
    pub total_volunteers: i32,
    pub male_req: i32,
    pub female_req: i32,
    pub status: EventStatus,
    pub department_assignments: Vec<DepartmentAssignment>,
    pub assigned_volunteers: Vec<VolunteerId>,
}

impl NewEvent {
    pub fn new(name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            date,
            location: String::new(),
            description: None,
            total_volunteers: 0,
            male_req: 0,
            female_req: 0,
            status: EventStatus::default(),
            department_assignments: Vec::new(),
            assigned_volunteers: Vec::new(),
        }
    }

    #[must_use]
    pub fn into_event(self, id: EventId) -> Event {
        Event {
            id,
            name: self.name,
            date: Some(self.date),
            location: self.location,
            description: self.description,
            total_volunteers: self.total_volunteers,
            male_req: self.male_req,
            female_req: self.female_req,
            status: self.status,
            department_assignments: self.department_assignments,
            assigned_volunteers: self.assigned_volunteers,
        }
    }
}

/// Direct edits of event fields. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<EventStatus>,
}

impl EventChanges {
    /// An edit form where every field was left blank.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.description.is_none()
            && self.status.is_none()
    }

    pub fn apply(self, event: &mut Event) {
        if let Some(name) = self.name {
            event.name = name;
        }
        if let Some(date) = self.date {
            event.date = Some(date);
        }
        if let Some(location) = self.location {
            event.location = location;
        }
        if let Some(description) = self.description {
            event.description = Some(description);
        }
        if let Some(status) = self.status {
            event.status = status;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerProfile {
    pub id: VolunteerId,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub department: String,
    pub best_department: Option<String>,
    pub powerhouse: bool,
    /// Linked login account, if any.
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProfile {
    pub full_name: String,
    pub gender: Option<Gender>,
    pub department: String,
    pub best_department: Option<String>,
    pub powerhouse: bool,
    pub user_id: Option<i32>,
}

impl NewProfile {
    #[must_use]
    pub fn into_profile(self, id: VolunteerId, created_at: DateTime<Utc>) -> VolunteerProfile {
        VolunteerProfile {
            id,
            full_name: self.full_name,
            gender: self.gender,
            department: self.department,
            best_department: self.best_department,
            powerhouse: self.powerhouse,
            user_id: self.user_id,
            created_at,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub full_name: Option<String>,
    pub gender: Option<Gender>,
    pub department: Option<String>,
    pub best_department: Option<String>,
    pub powerhouse: Option<bool>,
}

impl ProfileChanges {
    pub fn apply(self, profile: &mut VolunteerProfile) {
        if let Some(full_name) = self.full_name {
            profile.full_name = full_name;
        }
        if let Some(gender) = self.gender {
            profile.gender = Some(gender);
        }
        if let Some(department) = self.department {
            profile.department = department;
        }
        if let Some(best_department) = self.best_department {
            profile.best_department = Some(best_department);
        }
        if let Some(powerhouse) = self.powerhouse {
            profile.powerhouse = powerhouse;
        }
    }
}

/// A customer's booking request. Operators only annotate it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    /// Login account that placed the booking, if any.
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub event_type: String,
    pub event_date: Option<DateTime<Utc>>,
    pub message: Option<String>,
    pub admin_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBooking {
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub event_type: String,
    pub event_date: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl NewBooking {
    #[must_use]
    pub fn into_booking(self, id: BookingId, created_at: DateTime<Utc>) -> Booking {
        Booking {
            id,
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            event_type: self.event_type,
            event_date: self.event_date,
            message: self.message,
            admin_note: None,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    pub id: SubscriberId,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_use_their_decimal_text() {
        assert_eq!(VolunteerId(42).to_string(), "42");
        assert_eq!("42".parse::<VolunteerId>(), Ok(VolunteerId(42)));
        assert!(" 42".parse::<VolunteerId>().is_err());
        assert!("abc".parse::<EventId>().is_err());
    }

    #[test]
    fn status_defaults_to_pending_and_round_trips_text() {
        assert_eq!(EventStatus::default(), EventStatus::Pending);
        for status in [
            EventStatus::Pending,
            EventStatus::Upcoming,
            EventStatus::Ongoing,
            EventStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<EventStatus>(), Ok(status));
        }
        assert!("pending".parse::<EventStatus>().is_err());
    }

    #[test]
    fn event_serializes_in_the_persisted_shape() {
        let event = NewEvent::new("Gala", DateTime::<Utc>::UNIX_EPOCH).into_event(EventId(1));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["totalVolunteers"], 0);
        assert_eq!(json["status"], "Pending");
        assert!(json["departmentAssignments"].as_array().unwrap().is_empty());
        assert!(json["assignedVolunteers"].as_array().unwrap().is_empty());
    }

    #[test]
    fn changes_only_touch_given_fields() {
        let mut event = NewEvent::new("Gala", DateTime::<Utc>::UNIX_EPOCH).into_event(EventId(1));
        EventChanges {
            location: Some("Hall".to_owned()),
            status: Some(EventStatus::Ongoing),
            ..EventChanges::default()
        }
        .apply(&mut event);
        assert_eq!(event.name, "Gala");
        assert_eq!(event.location, "Hall");
        assert_eq!(event.status, EventStatus::Ongoing);
    }

    #[test]
    fn blank_edit_is_empty() {
        assert!(EventChanges::default().is_empty());
        assert!(!EventChanges {
            description: Some("Dress code".to_owned()),
            ..EventChanges::default()
        }
        .is_empty());
    }
}
