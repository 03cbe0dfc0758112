use event_roster_assignment::{Store, VolunteerId};

use crate::error::AppError;
use crate::extract::Id;
use crate::notice;
use crate::routes::{AppStateRef, RouteResponse};

/// The events shown on a volunteer's profile page.
pub async fn events<S: Store>(
    state: AppStateRef<S>,
    Id(volunteer): Id<VolunteerId>,
) -> Result<RouteResponse, AppError> {
    let events = state.manager.list_events_for_volunteer(volunteer).await?;
    Ok(notice::data(&events)?)
}
