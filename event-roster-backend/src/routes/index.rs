use event_roster_assignment::Store;

use crate::error::AppError;
use crate::notice;
use crate::routes::{AppStateRef, RouteResponse};

/// Powerhouse volunteers in home page order.
pub async fn index<S: Store>(state: AppStateRef<S>) -> Result<RouteResponse, AppError> {
    let profiles = state
        .manager
        .home_roster(state.config.department_sequence.as_slice())
        .await?;
    Ok(notice::data(&profiles)?)
}
