use event_roster_assignment::forms::{PowerhouseForm, ProfileForm};
use event_roster_assignment::model::{NewProfile, ProfileChanges};
use event_roster_assignment::{Store, VolunteerId};

use crate::error::AppError;
use crate::extract::{Form, Id};
use crate::notice::{self, Notice};
use crate::routes::{AppStateRef, RouteResponse};

pub async fn list<S: Store>(state: AppStateRef<S>) -> Result<RouteResponse, AppError> {
    let profiles = state.manager.list_profiles().await?;
    Ok(notice::data(&profiles)?)
}

pub async fn create<S: Store>(
    state: AppStateRef<S>,
    Form(form): Form<ProfileForm>,
) -> Result<RouteResponse, AppError> {
    let profile = state
        .manager
        .create_profile(NewProfile::try_from(form)?)
        .await?;
    Ok(notice::noticed(
        &Notice::success(format!("Profile for {} created", profile.full_name)),
        &profile,
    )?)
}

pub async fn update<S: Store>(
    state: AppStateRef<S>,
    Id(id): Id<VolunteerId>,
    Form(form): Form<ProfileForm>,
) -> Result<RouteResponse, AppError> {
    let profile = state
        .manager
        .update_profile(id, ProfileChanges::try_from(form)?)
        .await?;
    Ok(notice::noticed(&Notice::success("Profile updated"), &profile)?)
}

/// Events keep the id and show the volunteer as unknown.
pub async fn delete<S: Store>(
    state: AppStateRef<S>,
    Id(id): Id<VolunteerId>,
) -> Result<RouteResponse, AppError> {
    state.manager.delete_profile(id).await?;
    Ok(notice::noticed(&Notice::success("Profile deleted"), &id)?)
}

pub async fn powerhouse<S: Store>(
    state: AppStateRef<S>,
    Id(id): Id<VolunteerId>,
    Form(form): Form<PowerhouseForm>,
) -> Result<RouteResponse, AppError> {
    let profile = state.manager.set_powerhouse(id, form.powerhouse()).await?;
    let message = if profile.powerhouse {
        "Profile marked as powerhouse"
    } else {
        "Profile no longer marked as powerhouse"
    };
    Ok(notice::noticed(&Notice::success(message), &profile)?)
}
