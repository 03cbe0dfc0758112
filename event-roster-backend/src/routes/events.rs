use event_roster_assignment::forms::{EventEditForm, EventForm};
use event_roster_assignment::model::{EventChanges, NewEvent};
use event_roster_assignment::{EditOutcome, EventId, Store};

use crate::error::AppError;
use crate::extract::{Form, Id};
use crate::notice::{self, Notice};
use crate::routes::{AppStateRef, RouteResponse};

pub async fn list<S: Store>(state: AppStateRef<S>) -> Result<RouteResponse, AppError> {
    let events = state.manager.list_events().await?;
    Ok(notice::data(&events)?)
}

pub async fn create<S: Store>(
    state: AppStateRef<S>,
    Form(form): Form<EventForm>,
) -> Result<RouteResponse, AppError> {
    let event = state
        .manager
        .create_event(NewEvent::try_from(form)?)
        .await?;
    Ok(notice::noticed(
        &Notice::success(format!("Event \"{}\" created", event.name)),
        &event,
    )?)
}

pub async fn details<S: Store>(
    state: AppStateRef<S>,
    Id(id): Id<EventId>,
) -> Result<RouteResponse, AppError> {
    let details = state.manager.event_details(id).await?;
    Ok(notice::data(&details)?)
}

pub async fn update<S: Store>(
    state: AppStateRef<S>,
    Id(id): Id<EventId>,
    Form(form): Form<EventEditForm>,
) -> Result<RouteResponse, AppError> {
    let outcome = state
        .manager
        .update_event(id, EventChanges::try_from(form)?)
        .await?;
    let (notice, event) = match outcome {
        EditOutcome::Updated(event) => (Notice::success("Event updated"), event),
        EditOutcome::Unchanged(event) => (Notice::no_op("Nothing to update"), event),
    };
    Ok(notice::noticed(&notice, &event)?)
}

pub async fn delete<S: Store>(
    state: AppStateRef<S>,
    Id(id): Id<EventId>,
) -> Result<RouteResponse, AppError> {
    state.manager.delete_event(id).await?;
    Ok(notice::noticed(&Notice::success("Event deleted"), &id)?)
}
