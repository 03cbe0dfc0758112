use event_roster_assignment::{AssignOutcome, EventId, RemoveOutcome, Store};
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::{Form, Id};
use crate::notice::{self, Notice};
use crate::routes::{AppStateRef, RouteResponse};

#[derive(Deserialize)]
pub struct AssignForm {
    #[serde(default, alias = "volunteerId")]
    volunteer: String,
    #[serde(default)]
    department: String,
}

#[derive(Deserialize)]
pub struct RemoveForm {
    #[serde(default, alias = "volunteerId")]
    volunteer_id: String,
    #[serde(default)]
    department: String,
}

pub async fn assign<S: Store>(
    state: AppStateRef<S>,
    Id(event): Id<EventId>,
    Form(form): Form<AssignForm>,
) -> Result<RouteResponse, AppError> {
    let department = form.department.as_str();
    let outcome = state
        .manager
        .assign_volunteer(event, department, form.volunteer.trim())
        .await?;
    let (notice, event) = match outcome {
        AssignOutcome::Assigned(event) => (
            Notice::success(format!("Volunteer assigned to {department}")),
            event,
        ),
        AssignOutcome::AlreadyAssigned(event) => (
            Notice::no_op(format!("Volunteer is already assigned to {department}")),
            event,
        ),
    };
    Ok(notice::noticed(&notice, &event)?)
}

pub async fn remove<S: Store>(
    state: AppStateRef<S>,
    Id(event): Id<EventId>,
    Form(form): Form<RemoveForm>,
) -> Result<RouteResponse, AppError> {
    let department = form.department.as_str();
    let outcome = state
        .manager
        .remove_volunteer(event, department, form.volunteer_id.trim())
        .await?;
    let (notice, event) = match outcome {
        RemoveOutcome::Removed(event) => (
            Notice::success(format!("Volunteer removed from {department}")),
            event,
        ),
        RemoveOutcome::Unchanged(event) => (
            Notice::no_op(format!("Volunteer was not assigned to {department}")),
            event,
        ),
    };
    Ok(notice::noticed(&notice, &event)?)
}
