//! Events, their department rosters and the volunteers assigned to them.
//!
//! [`AssignmentManager`] is the only component that changes a roster. It talks
//! to persistence through the [`Store`] trait; [`MemoryStore`] is the
//! process-local implementation.

pub mod display;
pub mod forms;
pub mod manager;
pub mod memory;
pub mod model;
pub mod payload;
pub mod roster;
pub mod store;

pub use display::{rank_profiles_for_display, EventView, DEFAULT_DEPARTMENT_SEQUENCE};
pub use manager::{
    AssignOutcome, AssignmentError, AssignmentManager, EditOutcome, EventDetails, Missing,
    RemoveOutcome, SubscribeOutcome,
};
pub use memory::MemoryStore;
pub use model::{
    Booking, BookingId, Event, EventId, NewsletterSubscriber, SubscriberId, VolunteerId,
    VolunteerProfile,
};
pub use roster::RemovalPolicy;
pub use store::{BoxError, Store, StoreError};
