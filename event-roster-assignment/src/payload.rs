//! Lenient decoding of values that arrive from operator forms.
//!
//! Forms are filled in by hand, so malformed optional input degrades to an
//! empty value instead of failing the whole submission.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::model::{DepartmentAssignment, VolunteerId};
use crate::roster::merge_into;

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn volunteer_id(&self) -> Option<VolunteerId> {
        match self {
            Self::Number(number) => i32::try_from(*number).ok().map(VolunteerId),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDepartment {
    #[serde(default)]
    department: Option<String>,
    #[serde(default)]
    assigned_volunteers: Option<OneOrMany<RawId>>,
}

/// Decodes the JSON-encoded department list of the event form.
///
/// Returns an empty list if the text is not a JSON array of departments.
/// Entries without a department name and ids that are not ids are skipped;
/// repeated department names are merged.
#[must_use]
pub fn parse_department_assignments(input: &str) -> Vec<DepartmentAssignment> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    let raw: Vec<RawDepartment> = match serde_json::from_str(input) {
        Ok(raw) => raw,
        Err(error) => {
            warn!(%error, "invalid department assignments, ignoring departments");
            return Vec::new();
        }
    };

    let mut departments = Vec::new();
    for entry in raw {
        let Some(department) = entry.department.filter(|name| !name.trim().is_empty()) else {
            warn!("skipping department assignment without a department name");
            continue;
        };
        let ids = match entry.assigned_volunteers {
            None => Vec::new(),
            Some(OneOrMany::One(id)) => vec![id],
            Some(OneOrMany::Many(ids)) => ids,
        };
        if !departments
            .iter()
            .any(|existing: &DepartmentAssignment| existing.department == department)
        {
            departments.push(DepartmentAssignment {
                department: department.clone(),
                assigned_volunteers: Vec::new(),
            });
        }
        for raw_id in ids {
            match raw_id.volunteer_id() {
                Some(volunteer) => {
                    merge_into(&mut departments, &department, volunteer);
                }
                None => warn!(%department, "skipping malformed volunteer id"),
            }
        }
    }
    departments
}

/// Comma separated volunteer ids, malformed entries skipped.
#[must_use]
pub fn parse_volunteer_list(input: &str) -> Vec<VolunteerId> {
    let mut volunteers = Vec::new();
    for part in input.split(',').map(str::trim).filter(|part| !part.is_empty()) {
        match part.parse::<VolunteerId>() {
            Ok(volunteer) if !volunteers.contains(&volunteer) => volunteers.push(volunteer),
            Ok(_) => {}
            Err(_) => warn!(part, "skipping malformed volunteer id"),
        }
    }
    volunteers
}

/// Blank, negative or unparsable counts become 0.
#[must_use]
pub fn parse_count(input: Option<&str>) -> i32 {
    input
        .and_then(|value| value.trim().parse::<i32>().ok())
        .filter(|count| *count >= 0)
        .unwrap_or(0)
}

/// Checkbox semantics: a missing field is `false`.
#[must_use]
pub fn parse_flag(input: Option<&str>) -> bool {
    matches!(
        input.map(str::trim),
        Some("on" | "true" | "1" | "yes")
    )
}

/// Accepts RFC 3339 timestamps, `datetime-local` values (`2025-12-01T18:30`,
/// taken as UTC) and plain dates (`2025-12-01`, midnight UTC).
#[must_use]
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Some(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(input, format) {
            return Some(date.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}

/// Trimmed text, `None` when blank.
#[must_use]
pub fn non_blank(input: Option<String>) -> Option<String> {
    input
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
