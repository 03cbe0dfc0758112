//! Mutations of an event's department rosters and its flattened roster.

use serde::{Deserialize, Serialize};

use crate::model::{DepartmentAssignment, Event, VolunteerId};

/// What happens to the flattened roster when a volunteer leaves one department.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Always drop the volunteer from the flattened roster, even if another
    /// department of the same event still lists them.
    #[default]
    Unconditional,
    /// Rebuild the flattened roster from the remaining department rosters.
    Recompute,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Assignment {
    Added,
    AlreadyAssigned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    Removed,
    Unchanged,
}

/// Result of a roster mutation. Stores skip the write when nothing changed.
pub trait RosterChange {
    fn changed(&self) -> bool;
}

impl RosterChange for Assignment {
    fn changed(&self) -> bool {
        *self == Self::Added
    }
}

impl RosterChange for Removal {
    fn changed(&self) -> bool {
        *self == Self::Removed
    }
}

/// Adds `volunteer` to the department named exactly `department`, creating the
/// department at the end if it does not exist yet. Returns `false` if the
/// volunteer was already on that roster.
pub fn merge_into(
    departments: &mut Vec<DepartmentAssignment>,
    department: &str,
    volunteer: VolunteerId,
) -> bool {
    match departments
        .iter_mut()
        .find(|entry| entry.department == department)
    {
        Some(entry) if entry.assigned_volunteers.contains(&volunteer) => false,
        Some(entry) => {
            entry.assigned_volunteers.push(volunteer);
            true
        }
        None => {
            departments.push(DepartmentAssignment {
                department: department.to_owned(),
                assigned_volunteers: vec![volunteer],
            });
            true
        }
    }
}

impl Event {
    #[must_use]
    pub fn department(&self, department: &str) -> Option<&DepartmentAssignment> {
        self.department_assignments
            .iter()
            .find(|entry| entry.department == department)
    }

    /// Whether any department roster lists the volunteer.
    #[must_use]
    pub fn is_assigned(&self, volunteer: VolunteerId) -> bool {
        self.department_assignments
            .iter()
            .any(|entry| entry.assigned_volunteers.contains(&volunteer))
    }

    /// Union of all department rosters in order of first appearance.
    #[must_use]
    pub fn flattened_roster(&self) -> Vec<VolunteerId> {
        let mut flattened: Vec<VolunteerId> = Vec::new();
        for volunteer in self
            .department_assignments
            .iter()
            .flat_map(|entry| entry.assigned_volunteers.iter())
        {
            if !flattened.contains(volunteer) {
                flattened.push(*volunteer);
            }
        }
        flattened
    }

    /// Department matching is exact and case-sensitive: `"Media "` and `"Media"`
    /// are different departments.
    pub fn assign_volunteer(&mut self, department: &str, volunteer: VolunteerId) -> Assignment {
        if !merge_into(&mut self.department_assignments, department, volunteer) {
            return Assignment::AlreadyAssigned;
        }
        if !self.assigned_volunteers.contains(&volunteer) {
            self.assigned_volunteers.push(volunteer);
        }
        Assignment::Added
    }

    /// Ids are compared by their textual form since they arrive from a form.
    /// An unknown department or a volunteer missing from it leaves the event untouched.
    pub fn remove_volunteer(
        &mut self,
        department: &str,
        volunteer: &str,
        policy: RemovalPolicy,
    ) -> Removal {
        let Some(entry) = self
            .department_assignments
            .iter_mut()
            .find(|entry| entry.department == department)
        else {
            return Removal::Unchanged;
        };
        let before = entry.assigned_volunteers.len();
        entry
            .assigned_volunteers
            .retain(|assigned| assigned.to_string() != volunteer);
        if entry.assigned_volunteers.len() == before {
            return Removal::Unchanged;
        }

        match policy {
            RemovalPolicy::Unconditional => self
                .assigned_volunteers
                .retain(|assigned| assigned.to_string() != volunteer),
            RemovalPolicy::Recompute => self.assigned_volunteers = self.flattened_roster(),
        }
        Removal::Removed
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone as _, Utc};

    use super::*;
    use crate::model::{EventId, NewEvent};

    const V1: VolunteerId = VolunteerId(1);
    const V2: VolunteerId = VolunteerId(2);

    fn gala() -> Event {
        NewEvent::new("Gala", Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap())
            .into_event(EventId(1))
    }

    #[test]
    fn assigning_twice_keeps_a_single_entry() {
        let mut event = gala();
        assert_eq!(event.assign_volunteer("Hospitality", V1), Assignment::Added);
        let snapshot = event.clone();
        assert_eq!(
            event.assign_volunteer("Hospitality", V1),
            Assignment::AlreadyAssigned
        );
        assert_eq!(event, snapshot);
        assert_eq!(
            event.department("Hospitality").unwrap().assigned_volunteers,
            vec![V1]
        );
    }

    #[test]
    fn assignment_lands_in_department_and_flattened_roster() {
        let mut event = gala();
        event.assign_volunteer("Media", V1);
        event.assign_volunteer("Logistics", V1);
        event.assign_volunteer("Logistics", V2);
        assert!(event.department("Media").unwrap().assigned_volunteers.contains(&V1));
        assert_eq!(event.assigned_volunteers, vec![V1, V2]);
        assert_eq!(event.flattened_roster(), vec![V1, V2]);
    }

    #[test]
    fn same_department_name_is_merged_in_insertion_order() {
        let mut event = gala();
        event.assign_volunteer("Media", V1);
        event.assign_volunteer("Logistics", V2);
        event.assign_volunteer("Media", V2);
        let names: Vec<&str> = event
            .department_assignments
            .iter()
            .map(|entry| entry.department.as_str())
            .collect();
        assert_eq!(names, vec!["Media", "Logistics"]);
        assert_eq!(
            event.department("Media").unwrap().assigned_volunteers,
            vec![V1, V2]
        );
    }

    #[test]
    fn trailing_space_makes_a_distinct_department() {
        let mut event = gala();
        event.assign_volunteer("Media ", V1);
        event.assign_volunteer("Media", V1);
        assert_eq!(event.department_assignments.len(), 2);
        assert_eq!(event.assigned_volunteers, vec![V1]);
    }

    #[test]
    fn removing_an_absent_volunteer_changes_nothing() {
        let mut event = gala();
        event.assign_volunteer("Media", V1);
        event.assign_volunteer("Logistics", V2);
        let snapshot = event.clone();

        for policy in [RemovalPolicy::Unconditional, RemovalPolicy::Recompute] {
            assert_eq!(event.remove_volunteer("Media", "2", policy), Removal::Unchanged);
            assert_eq!(event.remove_volunteer("Catering", "1", policy), Removal::Unchanged);
            assert_eq!(event.remove_volunteer("Media", "not-an-id", policy), Removal::Unchanged);
            assert_eq!(event, snapshot);
        }
    }

    #[test]
    fn removal_from_only_department_clears_flattened_roster() {
        let mut event = gala();
        event.assign_volunteer("Hospitality", V1);
        event.assign_volunteer("Hospitality", V2);
        assert_eq!(
            event.remove_volunteer("Hospitality", "1", RemovalPolicy::Unconditional),
            Removal::Removed
        );
        assert_eq!(
            event.department("Hospitality").unwrap().assigned_volunteers,
            vec![V2]
        );
        assert_eq!(event.assigned_volunteers, vec![V2]);
    }

    #[test]
    fn unconditional_removal_drops_volunteer_still_in_another_department() {
        let mut event = gala();
        event.assign_volunteer("Media", V1);
        event.assign_volunteer("Logistics", V1);
        event.remove_volunteer("Media", "1", RemovalPolicy::Unconditional);
        assert!(event.is_assigned(V1));
        assert!(event.assigned_volunteers.is_empty());
    }

    #[test]
    fn recompute_removal_keeps_volunteer_still_in_another_department() {
        let mut event = gala();
        event.assign_volunteer("Media", V1);
        event.assign_volunteer("Logistics", V1);
        event.assign_volunteer("Logistics", V2);
        event.remove_volunteer("Media", "1", RemovalPolicy::Recompute);
        assert_eq!(event.assigned_volunteers, vec![V1, V2]);
        event.remove_volunteer("Logistics", "1", RemovalPolicy::Recompute);
        assert_eq!(event.assigned_volunteers, vec![V2]);
    }
}
