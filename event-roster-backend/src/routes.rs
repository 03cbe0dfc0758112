pub mod bookings;
pub mod events;
pub mod index;
pub mod newsletter;
pub mod profiles;
pub mod roster;
pub mod volunteers;

use std::sync::Arc;

use axum::extract::State;

use crate::AppState;

pub type RouteResponse = axum::response::Response;

pub type AppStateRef<S> = State<Arc<AppState<S>>>;
