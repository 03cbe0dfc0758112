//! Read-side shaping: home page ranking, date ordering and volunteer name lookup.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use itertools::Itertools as _;
use serde::Serialize;

use crate::model::{Event, EventId, EventStatus, Gender, VolunteerId, VolunteerProfile};

pub const UNKNOWN_VOLUNTEER: &str = "Unknown volunteer";

/// Home page department order.
pub const DEFAULT_DEPARTMENT_SEQUENCE: &[&str] = &[
    "Show Flow",
    "Shadow",
    "Production",
    "Logistics",
    "Hospitality",
    "F&B",
    "Ritual",
    "Artist Coordination",
];

/// Buckets profiles by `best_department` following `sequence` and puts men
/// first inside each bucket, otherwise keeping input order. Profiles whose best
/// department is not in `sequence` are left out.
#[must_use]
pub fn rank_profiles_for_display<S: AsRef<str>>(
    profiles: Vec<VolunteerProfile>,
    sequence: &[S],
) -> Vec<VolunteerProfile> {
    let mut buckets = profiles
        .into_iter()
        .filter_map(|profile| {
            profile
                .best_department
                .clone()
                .map(|department| (department, profile))
        })
        .into_group_map();

    sequence
        .iter()
        .map(AsRef::as_ref)
        .unique()
        .filter_map(|department| buckets.remove(department))
        .flat_map(|mut bucket| {
            bucket.sort_by_key(|profile| profile.gender != Some(Gender::Male));
            bucket
        })
        .collect()
}

/// Ascending by date. Events without a date count as the Unix epoch.
pub fn sort_events_by_date(events: &mut [Event]) {
    events.sort_by_key(|event| event.date.unwrap_or(DateTime::<Utc>::UNIX_EPOCH));
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerRef {
    pub id: VolunteerId,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub department: Option<String>,
    /// `false` when the profile was deleted after being assigned.
    pub known: bool,
}

impl VolunteerRef {
    fn resolve(id: VolunteerId, profiles: &HashMap<VolunteerId, VolunteerProfile>) -> Self {
        profiles.get(&id).map_or_else(
            || Self {
                id,
                full_name: UNKNOWN_VOLUNTEER.to_owned(),
                gender: None,
                department: None,
                known: false,
            },
            |profile| Self {
                id,
                full_name: profile.full_name.clone(),
                gender: profile.gender,
                department: Some(profile.department.clone()),
                known: true,
            },
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentView {
    pub department: String,
    pub assigned_volunteers: Vec<VolunteerRef>,
}

/// An event with its rosters resolved to display names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: EventId,
    pub name: String,
    pub date: Option<DateTime<Utc>>,
    pub location: String,
    pub description: Option<String>,
    pub total_volunteers: i32,
    pub male_req: i32,
    pub female_req: i32,
    pub volunteer_requirement: i32,
    pub status: EventStatus,
    pub department_assignments: Vec<DepartmentView>,
    pub assigned_volunteers: Vec<VolunteerRef>,
}

impl EventView {
    #[must_use]
    pub fn populate(event: Event, profiles: &HashMap<VolunteerId, VolunteerProfile>) -> Self {
        Self {
            id: event.id,
            volunteer_requirement: event.male_req.saturating_add(event.female_req),
            name: event.name,
            date: event.date,
            location: event.location,
            description: event.description,
            total_volunteers: event.total_volunteers,
            male_req: event.male_req,
            female_req: event.female_req,
            status: event.status,
            department_assignments: event
                .department_assignments
                .into_iter()
                .map(|entry| DepartmentView {
                    department: entry.department,
                    assigned_volunteers: entry
                        .assigned_volunteers
                        .into_iter()
                        .map(|id| VolunteerRef::resolve(id, profiles))
                        .collect(),
                })
                .collect(),
            assigned_volunteers: event
                .assigned_volunteers
                .into_iter()
                .map(|id| VolunteerRef::resolve(id, profiles))
                .collect(),
        }
    }
}

/// Every volunteer id an event mentions, rosters and flattened list alike.
#[must_use]
pub fn referenced_volunteers<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<VolunteerId> {
    events
        .into_iter()
        .flat_map(|event| {
            event
                .department_assignments
                .iter()
                .flat_map(|entry| entry.assigned_volunteers.iter())
                .chain(event.assigned_volunteers.iter())
                .copied()
        })
        .unique()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;
    use crate::model::NewEvent;

    fn profile(id: i32, best_department: Option<&str>, gender: Option<Gender>) -> VolunteerProfile {
        VolunteerProfile {
            id: VolunteerId(id),
            full_name: format!("Volunteer {id}"),
            gender,
            department: "General".to_owned(),
            best_department: best_department.map(str::to_owned),
            powerhouse: true,
            user_id: None,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn ids(profiles: &[VolunteerProfile]) -> Vec<i32> {
        profiles.iter().map(|profile| profile.id.0).collect()
    }

    #[test]
    fn ranks_by_sequence_then_men_first() {
        let ranked = rank_profiles_for_display(
            vec![
                profile(1, Some("Media"), Some(Gender::Female)),
                profile(2, Some("Media"), Some(Gender::Male)),
                profile(3, Some("Logistics"), Some(Gender::Male)),
            ],
            &["Logistics", "Media"],
        );
        assert_eq!(ids(&ranked), vec![3, 2, 1]);
    }

    #[test]
    fn ranking_is_stable_and_drops_unknown_departments() {
        let ranked = rank_profiles_for_display(
            vec![
                profile(1, Some("Media"), None),
                profile(2, Some("Media"), Some(Gender::Other)),
                profile(3, Some("Media"), Some(Gender::Male)),
                profile(4, Some("Media"), Some(Gender::Female)),
                profile(5, Some("Media"), Some(Gender::Male)),
                profile(6, Some("Catering"), Some(Gender::Male)),
                profile(7, None, Some(Gender::Male)),
            ],
            &["Media"],
        );
        assert_eq!(ids(&ranked), vec![3, 5, 1, 2, 4]);
    }

    #[test]
    fn repeated_sequence_names_do_not_duplicate_profiles() {
        let ranked = rank_profiles_for_display(
            vec![profile(1, Some("Media"), Some(Gender::Male))],
            &["Media", "Media"],
        );
        assert_eq!(ids(&ranked), vec![1]);
    }

    #[test]
    fn default_sequence_is_the_home_page_order() {
        let ranked = rank_profiles_for_display(
            vec![
                profile(1, Some("Hospitality"), Some(Gender::Male)),
                profile(2, Some("Show Flow"), Some(Gender::Female)),
            ],
            DEFAULT_DEPARTMENT_SEQUENCE,
        );
        assert_eq!(ids(&ranked), vec![2, 1]);
    }

    #[test]
    fn missing_dates_sort_first() {
        let date = |day| Utc.with_ymd_and_hms(2025, 11, day, 0, 0, 0).unwrap();
        let mut events = vec![
            NewEvent::new("b", date(25)).into_event(EventId(1)),
            NewEvent::new("a", date(10)).into_event(EventId(2)),
            NewEvent::new("c", date(15)).into_event(EventId(3)),
        ];
        events[2].date = None;
        sort_events_by_date(&mut events);
        let order: Vec<i32> = events.iter().map(|event| event.id.0).collect();
        assert_eq!(order, vec![3, 2, 1]);
    }

    #[test]
    fn populate_resolves_names_and_tolerates_deleted_profiles() {
        let mut event =
            NewEvent::new("Gala", DateTime::<Utc>::UNIX_EPOCH).into_event(EventId(1));
        event.male_req = 3;
        event.female_req = 4;
        event.assign_volunteer("Media", VolunteerId(1));
        event.assign_volunteer("Media", VolunteerId(9));

        let profiles = HashMap::from([(VolunteerId(1), profile(1, None, Some(Gender::Male)))]);
        let view = EventView::populate(event, &profiles);

        assert_eq!(view.volunteer_requirement, 7);
        let names: Vec<&str> = view.department_assignments[0]
            .assigned_volunteers
            .iter()
            .map(|volunteer| volunteer.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["Volunteer 1", UNKNOWN_VOLUNTEER]);
        assert!(!view.assigned_volunteers[1].known);
    }

    #[test]
    fn referenced_volunteers_are_unique() {
        let mut event = NewEvent::new("Gala", DateTime::<Utc>::UNIX_EPOCH).into_event(EventId(1));
        event.assign_volunteer("Media", VolunteerId(1));
        event.assign_volunteer("Logistics", VolunteerId(1));
        event.assigned_volunteers.push(VolunteerId(5));
        assert_eq!(
            referenced_volunteers([&event]),
            vec![VolunteerId(1), VolunteerId(5)]
        );
    }
}
