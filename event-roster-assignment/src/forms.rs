//! Operator form submissions and their conversion into store inputs.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::manager::AssignmentError;
use crate::model::{
    EventChanges, EventStatus, Gender, NewBooking, NewEvent, NewProfile, ProfileChanges,
};
use crate::payload::{
    non_blank, parse_count, parse_date, parse_department_assignments, parse_flag,
    parse_volunteer_list,
};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EventForm {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "totalVolunteers")]
    pub total_volunteers: Option<String>,
    #[serde(alias = "maleReq")]
    pub male_req: Option<String>,
    #[serde(alias = "femaleReq")]
    pub female_req: Option<String>,
    pub status: Option<String>,
    /// JSON text: `[{"department": "...", "assignedVolunteers": [...]}]`.
    #[serde(alias = "departmentAssignments")]
    pub department_assignments: Option<String>,
    /// Comma separated ids.
    #[serde(alias = "assignedVolunteers")]
    pub assigned_volunteers: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EventEditForm {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(alias = "fullName")]
    pub full_name: Option<String>,
    pub gender: Option<String>,
    pub department: Option<String>,
    #[serde(alias = "bestDepartment")]
    pub best_department: Option<String>,
    pub powerhouse: Option<String>,
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PowerhouseForm {
    pub powerhouse: Option<String>,
}

/// Public booking request.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BookingForm {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(alias = "eventType")]
    pub event_type: Option<String>,
    #[serde(alias = "eventDate")]
    pub event_date: Option<String>,
    pub message: Option<String>,
}

/// A blank note clears the stored one.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NoteForm {
    #[serde(alias = "adminNote")]
    pub admin_note: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubscribeForm {
    pub email: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, AssignmentError> {
    non_blank(value).ok_or_else(|| AssignmentError::InvalidInput(format!("{field} is required")))
}

fn date_field(value: Option<String>) -> Result<Option<DateTime<Utc>>, AssignmentError> {
    non_blank(value)
        .map(|text| {
            parse_date(&text)
                .ok_or_else(|| AssignmentError::InvalidInput(format!("invalid date {text:?}")))
        })
        .transpose()
}

fn status_field(value: Option<String>) -> Result<Option<EventStatus>, AssignmentError> {
    non_blank(value)
        .map(|text| {
            text.parse()
                .map_err(|error| AssignmentError::InvalidInput(format!("{error}")))
        })
        .transpose()
}

fn gender_field(value: Option<String>) -> Result<Option<Gender>, AssignmentError> {
    non_blank(value)
        .map(|text| {
            text.parse()
                .map_err(|error| AssignmentError::InvalidInput(format!("{error}")))
        })
        .transpose()
}

impl TryFrom<EventForm> for NewEvent {
    type Error = AssignmentError;

    fn try_from(form: EventForm) -> Result<Self, Self::Error> {
        let name = required(form.name, "name")?;
        let date = date_field(form.date)?
            .ok_or_else(|| AssignmentError::InvalidInput("date is required".to_owned()))?;

        let department_assignments = form
            .department_assignments
            .as_deref()
            .map(parse_department_assignments)
            .unwrap_or_default();
        let mut assigned_volunteers = form
            .assigned_volunteers
            .as_deref()
            .map(parse_volunteer_list)
            .unwrap_or_default();
        for volunteer in department_assignments
            .iter()
            .flat_map(|entry| entry.assigned_volunteers.iter())
        {
            if !assigned_volunteers.contains(volunteer) {
                assigned_volunteers.push(*volunteer);
            }
        }

        Ok(Self {
            name,
            date,
            location: non_blank(form.location).unwrap_or_default(),
            description: non_blank(form.description),
            total_volunteers: parse_count(form.total_volunteers.as_deref()),
            male_req: parse_count(form.male_req.as_deref()),
            female_req: parse_count(form.female_req.as_deref()),
            status: status_field(form.status)?.unwrap_or_default(),
            department_assignments,
            assigned_volunteers,
        })
    }
}

impl TryFrom<EventEditForm> for EventChanges {
    type Error = AssignmentError;

    fn try_from(form: EventEditForm) -> Result<Self, Self::Error> {
        Ok(Self {
            name: non_blank(form.name),
            date: date_field(form.date)?,
            location: non_blank(form.location),
            description: non_blank(form.description),
            status: status_field(form.status)?,
        })
    }
}

impl TryFrom<ProfileForm> for NewProfile {
    type Error = AssignmentError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        Ok(Self {
            full_name: required(form.full_name, "full name")?,
            gender: gender_field(form.gender)?,
            department: required(form.department, "department")?,
            best_department: non_blank(form.best_department),
            powerhouse: parse_flag(form.powerhouse.as_deref()),
            user_id: non_blank(form.user_id)
                .map(|text| {
                    text.parse().map_err(|_| {
                        AssignmentError::InvalidInput(format!("invalid user id {text:?}"))
                    })
                })
                .transpose()?,
        })
    }
}

/// The powerhouse flag has its own toggle and is not part of an edit.
impl TryFrom<ProfileForm> for ProfileChanges {
    type Error = AssignmentError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        Ok(Self {
            full_name: non_blank(form.full_name),
            gender: gender_field(form.gender)?,
            department: non_blank(form.department),
            best_department: non_blank(form.best_department),
            powerhouse: None,
        })
    }
}

impl TryFrom<BookingForm> for NewBooking {
    type Error = AssignmentError;

    fn try_from(form: BookingForm) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: None,
            name: required(form.name, "name")?,
            email: required(form.email, "email")?,
            event_type: required(form.event_type, "event type")?,
            event_date: date_field(form.event_date)?,
            message: non_blank(form.message),
        })
    }
}

impl NoteForm {
    #[must_use]
    pub fn into_note(self) -> Option<String> {
        non_blank(self.admin_note)
    }
}

impl SubscribeForm {
    #[must_use]
    pub fn into_email(self) -> String {
        self.email.unwrap_or_default()
    }
}

impl PowerhouseForm {
    /// Checkbox semantics: an unchecked box is not submitted at all.
    #[must_use]
    pub fn powerhouse(&self) -> bool {
        parse_flag(self.powerhouse.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};

    use super::*;
    use crate::model::VolunteerId;

    fn gala_form() -> EventForm {
        EventForm {
            name: Some("Gala".to_owned()),
            date: Some("2025-12-01".to_owned()),
            ..EventForm::default()
        }
    }

    #[test]
    fn minimal_event_form_uses_defaults() {
        let event = NewEvent::try_from(gala_form()).unwrap();
        assert_eq!(event.date, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(event.status, EventStatus::Pending);
        assert_eq!(event.total_volunteers, 0);
        assert!(event.department_assignments.is_empty());
        assert!(event.assigned_volunteers.is_empty());
    }

    #[test]
    fn name_and_date_are_required() {
        let no_name = EventForm {
            name: Some("  ".to_owned()),
            ..gala_form()
        };
        assert!(matches!(
            NewEvent::try_from(no_name),
            Err(AssignmentError::InvalidInput(_))
        ));
        let no_date = EventForm {
            date: None,
            ..gala_form()
        };
        assert!(matches!(
            NewEvent::try_from(no_date),
            Err(AssignmentError::InvalidInput(_))
        ));
        let bad_date = EventForm {
            date: Some("soon".to_owned()),
            ..gala_form()
        };
        assert!(matches!(
            NewEvent::try_from(bad_date),
            Err(AssignmentError::InvalidInput(_))
        ));
    }

    #[test]
    fn malformed_departments_do_not_fail_the_form() {
        let form = EventForm {
            department_assignments: Some("[{oops".to_owned()),
            male_req: Some("two".to_owned()),
            female_req: Some("3".to_owned()),
            ..gala_form()
        };
        let event = NewEvent::try_from(form).unwrap();
        assert!(event.department_assignments.is_empty());
        assert_eq!(event.male_req, 0);
        assert_eq!(event.female_req, 3);
    }

    #[test]
    fn flattened_list_covers_every_roster() {
        let form = EventForm {
            department_assignments: Some(
                r#"[{"department":"Media","assignedVolunteers":[2,3]}]"#.to_owned(),
            ),
            assigned_volunteers: Some("5,2".to_owned()),
            ..gala_form()
        };
        let event = NewEvent::try_from(form).unwrap();
        assert_eq!(
            event.assigned_volunteers,
            vec![VolunteerId(5), VolunteerId(2), VolunteerId(3)]
        );
    }

    #[test]
    fn unknown_status_or_gender_is_rejected() {
        let form = EventForm {
            status: Some("Cancelled".to_owned()),
            ..gala_form()
        };
        assert!(NewEvent::try_from(form).is_err());

        let profile = ProfileForm {
            full_name: Some("Asha".to_owned()),
            department: Some("Media".to_owned()),
            gender: Some("robot".to_owned()),
            ..ProfileForm::default()
        };
        assert!(NewProfile::try_from(profile).is_err());
    }

    #[test]
    fn powerhouse_checkbox_semantics() {
        let on = PowerhouseForm {
            powerhouse: Some("on".to_owned()),
        };
        assert!(on.powerhouse());
        assert!(!PowerhouseForm::default().powerhouse());
    }

    #[test]
    fn edits_ignore_blank_fields() {
        let changes = EventChanges::try_from(EventEditForm {
            name: Some(String::new()),
            status: Some("Completed".to_owned()),
            ..EventEditForm::default()
        })
        .unwrap();
        assert_eq!(changes.name, None);
        assert_eq!(changes.status, Some(EventStatus::Completed));
    }

    #[test]
    fn camel_case_field_names_are_accepted() {
        let form: EventForm = serde_json::from_value(serde_json::json!({
            "name": "Gala",
            "date": "2025-12-01",
            "totalVolunteers": "12",
            "maleReq": "4",
            "femaleReq": "5",
            "departmentAssignments": r#"[{"department":"Media","assignedVolunteers":[7]}]"#,
        }))
        .unwrap();
        let event = NewEvent::try_from(form).unwrap();
        assert_eq!(event.total_volunteers, 12);
        assert_eq!(event.male_req, 4);
        assert_eq!(event.female_req, 5);
        assert_eq!(event.assigned_volunteers, vec![VolunteerId(7)]);

        let profile: ProfileForm = serde_json::from_value(serde_json::json!({
            "fullName": "Asha",
            "department": "Media",
            "bestDepartment": "Logistics",
        }))
        .unwrap();
        let profile = NewProfile::try_from(profile).unwrap();
        assert_eq!(profile.full_name, "Asha");
        assert_eq!(profile.best_department.as_deref(), Some("Logistics"));

        let note: NoteForm =
            serde_json::from_value(serde_json::json!({ "adminNote": "  " })).unwrap();
        assert_eq!(note.into_note(), None);
    }

    #[test]
    fn booking_needs_contact_details() {
        let form = BookingForm {
            name: Some("Mira".to_owned()),
            email: Some("mira@example.org".to_owned()),
            event_type: Some("Wedding".to_owned()),
            event_date: Some("2025-06-01".to_owned()),
            message: Some(String::new()),
        };
        let booking = NewBooking::try_from(form.clone()).unwrap();
        assert_eq!(booking.event_type, "Wedding");
        assert_eq!(booking.message, None);
        assert!(booking.event_date.is_some());

        assert!(NewBooking::try_from(BookingForm {
            email: None,
            ..form
        })
        .is_err());
    }
}
