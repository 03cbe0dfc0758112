use event_roster_assignment::forms::{BookingForm, NoteForm};
use event_roster_assignment::model::NewBooking;
use event_roster_assignment::{BookingId, Store};

use crate::error::AppError;
use crate::extract::{Form, Id};
use crate::notice::{self, Notice};
use crate::routes::{AppStateRef, RouteResponse};

/// Newest request first.
pub async fn list<S: Store>(state: AppStateRef<S>) -> Result<RouteResponse, AppError> {
    let bookings = state.manager.list_bookings().await?;
    Ok(notice::data(&bookings)?)
}

pub async fn create<S: Store>(
    state: AppStateRef<S>,
    Form(form): Form<BookingForm>,
) -> Result<RouteResponse, AppError> {
    let booking = state
        .manager
        .create_booking(NewBooking::try_from(form)?)
        .await?;
    Ok(notice::noticed(
        &Notice::success("Booking request received"),
        &booking,
    )?)
}

pub async fn note<S: Store>(
    state: AppStateRef<S>,
    Id(id): Id<BookingId>,
    Form(form): Form<NoteForm>,
) -> Result<RouteResponse, AppError> {
    let note = form.into_note();
    let message = if note.is_some() {
        "Note saved"
    } else {
        "Note cleared"
    };
    let booking = state.manager.set_booking_note(id, note).await?;
    Ok(notice::noticed(&Notice::success(message), &booking)?)
}
