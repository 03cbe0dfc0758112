use event_roster_assignment::forms::SubscribeForm;
use event_roster_assignment::{Store, SubscribeOutcome, SubscriberId};

use crate::error::AppError;
use crate::extract::{Form, Id};
use crate::notice::{self, Notice};
use crate::routes::{AppStateRef, RouteResponse};

pub async fn list<S: Store>(state: AppStateRef<S>) -> Result<RouteResponse, AppError> {
    let subscribers = state.manager.list_subscribers().await?;
    Ok(notice::data(&subscribers)?)
}

/// Subscribing an address twice keeps the first subscription.
pub async fn subscribe<S: Store>(
    state: AppStateRef<S>,
    Form(form): Form<SubscribeForm>,
) -> Result<RouteResponse, AppError> {
    let outcome = state.manager.subscribe(&form.into_email()).await?;
    let (notice, subscriber) = match outcome {
        SubscribeOutcome::Subscribed(subscriber) => {
            (Notice::success("Subscribed to the newsletter"), subscriber)
        }
        SubscribeOutcome::AlreadySubscribed(subscriber) => {
            (Notice::no_op("Already subscribed"), subscriber)
        }
    };
    Ok(notice::noticed(&notice, &subscriber)?)
}

pub async fn unsubscribe<S: Store>(
    state: AppStateRef<S>,
    Id(id): Id<SubscriberId>,
) -> Result<RouteResponse, AppError> {
    state.manager.unsubscribe(id).await?;
    Ok(notice::noticed(&Notice::success("Subscriber removed"), &id)?)
}
