pub mod error;
pub mod models;
pub mod schema;

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl, SimpleAsyncConnection as _};
use error::DatabaseError;
use event_roster_assignment::model::{
    EventChanges, NewBooking, NewEvent, NewProfile, ProfileChanges,
};
use event_roster_assignment::roster::RosterChange;
use event_roster_assignment::{
    Booking, BookingId, Event, EventId, NewsletterSubscriber, Store, StoreError, SubscriberId,
    VolunteerId, VolunteerProfile,
};
use schema::{bookings, events, newsletter_subscribers, volunteer_profiles};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};

use crate::models::{
    BookingRow, EventChangeset, EventRow, NewBookingRow, NewEventRow, NewProfileRow,
    ProfileChangeset, ProfileRow, RosterChangeset, SubscriberRow,
};

// https://github.com/tokio-rs/axum/tree/main/examples/diesel-async-postgres

const MIGRATIONS: [(&str, &str); 2] = [
    (
        "create_roster",
        include_str!("../migrations/2024-01-01-000000_create_roster/up.sql"),
    ),
    (
        "create_bookings",
        include_str!("../migrations/2024-02-01-000000_create_bookings/up.sql"),
    ),
];

type LockedEvent = diesel::dsl::ForUpdate<
    diesel::dsl::Select<diesel::dsl::Find<events::table, i32>, diesel::dsl::AsSelect<EventRow, Pg>>,
>;

/// The event row, locked until the surrounding transaction ends.
fn locked_event(id: EventId) -> LockedEvent {
    events::table
        .find(id.0)
        .select(EventRow::as_select())
        .for_update()
}

/// Matches any department roster that lists the volunteer.
fn volunteer_roster_filter(volunteer: VolunteerId) -> JsonValue {
    json!([{ "assignedVolunteers": [volunteer.0] }])
}

fn events_for_volunteer_query(volunteer: VolunteerId) -> events::BoxedQuery<'static, Pg> {
    events::table
        .filter(events::department_assignments.contains(volunteer_roster_filter(volunteer)))
        .order(events::id)
        .into_boxed()
}

pub fn get_database_connection(
    database_url: &str,
) -> Result<Pool<AsyncPgConnection>, DatabaseError> {
    let config = AsyncDieselConnectionManager::<diesel_async::AsyncPgConnection>::new(database_url);
    Ok(Pool::builder(config).build()?)
}

/// Events and profiles in PostgreSQL.
///
/// Roster mutations lock the event row for the whole read-modify-write, so
/// concurrent assignments to the same event are applied one after another.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<AsyncPgConnection>,
}

impl PgStore {
    pub fn connect(database_url: &str) -> Result<Self, DatabaseError> {
        Ok(Self {
            pool: get_database_connection(database_url)?,
        })
    }

    /// Creates the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        let mut connection = self.connection().await?;
        for (name, sql) in MIGRATIONS {
            connection.batch_execute(sql).await?;
            debug!(migration = name, "applied migration");
        }
        info!("database schema is up to date");
        Ok(())
    }

    async fn connection(&self) -> Result<Object<AsyncPgConnection>, DatabaseError> {
        Ok(self.pool.get().await?)
    }

    async fn load_event(&self, id: EventId) -> Result<Option<Event>, DatabaseError> {
        let mut connection = self.connection().await?;
        events::table
            .find(id.0)
            .select(EventRow::as_select())
            .first(&mut connection)
            .await
            .optional()?
            .map(Event::try_from)
            .transpose()
    }

    async fn load_profile(&self, id: VolunteerId) -> Result<Option<VolunteerProfile>, DatabaseError> {
        let mut connection = self.connection().await?;
        volunteer_profiles::table
            .find(id.0)
            .select(ProfileRow::as_select())
            .first(&mut connection)
            .await
            .optional()?
            .map(VolunteerProfile::try_from)
            .transpose()
    }
}

fn events_from(rows: Vec<EventRow>) -> Result<Vec<Event>, DatabaseError> {
    rows.into_iter().map(Event::try_from).collect()
}

fn profiles_from(rows: Vec<ProfileRow>) -> Result<Vec<VolunteerProfile>, DatabaseError> {
    rows.into_iter().map(VolunteerProfile::try_from).collect()
}

#[async_trait]
impl Store for PgStore {
    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let mut connection = self.connection().await?;
        let rows = events::table
            .select(EventRow::as_select())
            .order(events::id)
            .load(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(events_from(rows)?)
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.load_event(id).await?)
    }

    async fn insert_event(&self, event: NewEvent) -> Result<Event, StoreError> {
        let row = NewEventRow::try_from(event)?;
        let mut connection = self.connection().await?;
        let inserted = diesel::insert_into(events::table)
            .values(&row)
            .returning(EventRow::as_returning())
            .get_result(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(Event::try_from(inserted)?)
    }

    async fn update_event(
        &self,
        id: EventId,
        changes: EventChanges,
    ) -> Result<Option<Event>, StoreError> {
        let changeset = EventChangeset::from(changes);
        if changeset.is_empty() {
            return self.get_event(id).await;
        }
        let mut connection = self.connection().await?;
        let updated = diesel::update(events::table.find(id.0))
            .set(&changeset)
            .returning(EventRow::as_returning())
            .get_result(&mut connection)
            .await
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(updated.map(Event::try_from).transpose()?)
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, StoreError> {
        let mut connection = self.connection().await?;
        let deleted = diesel::delete(events::table.find(id.0))
            .execute(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(deleted > 0)
    }

    async fn modify_event<C, F>(
        &self,
        id: EventId,
        mutation: F,
    ) -> Result<Option<(Event, C)>, StoreError>
    where
        C: RosterChange + Send,
        F: FnOnce(&mut Event) -> C + Send,
    {
        let mut connection = self.connection().await?;
        let result = connection
            .transaction::<_, DatabaseError, _>(|connection| {
                async move {
                    let Some(row) = locked_event(id)
                        .first(connection)
                        .await
                        .optional()?
                    else {
                        return Ok(None);
                    };
                    let mut event = Event::try_from(row)?;
                    let change = mutation(&mut event);
                    if change.changed() {
                        diesel::update(events::table.find(id.0))
                            .set(RosterChangeset::try_from(&event)?)
                            .execute(connection)
                            .await?;
                    } else {
                        debug!(event = %id, "roster unchanged, skipping write");
                    }
                    Ok(Some((event, change)))
                }
                .scope_boxed()
            })
            .await?;
        Ok(result)
    }

    async fn events_for_volunteer(&self, volunteer: VolunteerId) -> Result<Vec<Event>, StoreError> {
        let mut connection = self.connection().await?;
        let rows = events_for_volunteer_query(volunteer)
            .select(EventRow::as_select())
            .load(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(events_from(rows)?)
    }

    async fn list_profiles(&self) -> Result<Vec<VolunteerProfile>, StoreError> {
        let mut connection = self.connection().await?;
        let rows = volunteer_profiles::table
            .select(ProfileRow::as_select())
            .order((
                volunteer_profiles::created_at.desc(),
                volunteer_profiles::id.desc(),
            ))
            .load(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(profiles_from(rows)?)
    }

    async fn powerhouse_profiles(&self) -> Result<Vec<VolunteerProfile>, StoreError> {
        let mut connection = self.connection().await?;
        let rows = volunteer_profiles::table
            .filter(volunteer_profiles::powerhouse.eq(true))
            .select(ProfileRow::as_select())
            .order((
                volunteer_profiles::created_at.desc(),
                volunteer_profiles::id.desc(),
            ))
            .load(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(profiles_from(rows)?)
    }

    async fn get_profile(&self, id: VolunteerId) -> Result<Option<VolunteerProfile>, StoreError> {
        Ok(self.load_profile(id).await?)
    }

    async fn profiles_by_ids(
        &self,
        ids: &[VolunteerId],
    ) -> Result<Vec<VolunteerProfile>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let raw: Vec<i32> = ids.iter().map(|id| id.0).collect();
        let mut connection = self.connection().await?;
        let rows = volunteer_profiles::table
            .filter(volunteer_profiles::id.eq_any(raw))
            .select(ProfileRow::as_select())
            .load(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(profiles_from(rows)?)
    }

    async fn insert_profile(&self, profile: NewProfile) -> Result<VolunteerProfile, StoreError> {
        let row = NewProfileRow::from(profile);
        let mut connection = self.connection().await?;
        let inserted = diesel::insert_into(volunteer_profiles::table)
            .values(&row)
            .returning(ProfileRow::as_returning())
            .get_result(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(VolunteerProfile::try_from(inserted)?)
    }

    async fn update_profile(
        &self,
        id: VolunteerId,
        changes: ProfileChanges,
    ) -> Result<Option<VolunteerProfile>, StoreError> {
        let changeset = ProfileChangeset::from(changes);
        if changeset.is_empty() {
            return self.get_profile(id).await;
        }
        let mut connection = self.connection().await?;
        let updated = diesel::update(volunteer_profiles::table.find(id.0))
            .set(&changeset)
            .returning(ProfileRow::as_returning())
            .get_result(&mut connection)
            .await
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(updated.map(VolunteerProfile::try_from).transpose()?)
    }

    async fn delete_profile(&self, id: VolunteerId) -> Result<bool, StoreError> {
        let mut connection = self.connection().await?;
        let deleted = diesel::delete(volunteer_profiles::table.find(id.0))
            .execute(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(deleted > 0)
    }

    async fn list_bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let mut connection = self.connection().await?;
        let rows = bookings::table
            .select(BookingRow::as_select())
            .order((bookings::created_at.desc(), bookings::id.desc()))
            .load(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn insert_booking(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        let row = NewBookingRow::from(booking);
        let mut connection = self.connection().await?;
        let inserted = diesel::insert_into(bookings::table)
            .values(&row)
            .returning(BookingRow::as_returning())
            .get_result(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(Booking::from(inserted))
    }

    async fn set_booking_note(
        &self,
        id: BookingId,
        note: Option<String>,
    ) -> Result<Option<Booking>, StoreError> {
        let mut connection = self.connection().await?;
        let updated = diesel::update(bookings::table.find(id.0))
            .set(bookings::admin_note.eq(note))
            .returning(BookingRow::as_returning())
            .get_result(&mut connection)
            .await
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(updated.map(Booking::from))
    }

    async fn list_subscribers(&self) -> Result<Vec<NewsletterSubscriber>, StoreError> {
        let mut connection = self.connection().await?;
        let rows = newsletter_subscribers::table
            .select(SubscriberRow::as_select())
            .order((
                newsletter_subscribers::subscribed_at,
                newsletter_subscribers::id,
            ))
            .load(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(rows.into_iter().map(NewsletterSubscriber::from).collect())
    }

    async fn subscribe(&self, email: &str) -> Result<(NewsletterSubscriber, bool), StoreError> {
        let mut connection = self.connection().await?;
        let inserted = diesel::insert_into(newsletter_subscribers::table)
            .values(newsletter_subscribers::email.eq(email))
            .on_conflict(newsletter_subscribers::email)
            .do_nothing()
            .returning(SubscriberRow::as_returning())
            .get_result(&mut connection)
            .await
            .optional()
            .map_err(DatabaseError::from)?;
        if let Some(row) = inserted {
            return Ok((NewsletterSubscriber::from(row), true));
        }
        let existing = newsletter_subscribers::table
            .filter(newsletter_subscribers::email.eq(email))
            .select(SubscriberRow::as_select())
            .first(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok((NewsletterSubscriber::from(existing), false))
    }

    async fn unsubscribe(&self, id: SubscriberId) -> Result<bool, StoreError> {
        let mut connection = self.connection().await?;
        let deleted = diesel::delete(newsletter_subscribers::table.find(id.0))
            .execute(&mut connection)
            .await
            .map_err(DatabaseError::from)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use diesel::debug_query;

    use super::*;

    #[test]
    fn roster_reads_lock_the_event_row() {
        let sql = debug_query::<Pg, _>(&locked_event(EventId(3))).to_string();
        assert!(sql.contains(r#"FROM "events""#), "{sql}");
        assert!(sql.contains(r#""events"."id" = $1"#), "{sql}");
        assert!(sql.trim_end().contains("FOR UPDATE"), "{sql}");
    }

    #[test]
    fn volunteer_lookup_uses_jsonb_containment() {
        assert_eq!(
            volunteer_roster_filter(VolunteerId(7)),
            json!([{ "assignedVolunteers": [7] }])
        );
        let query = events_for_volunteer_query(VolunteerId(7)).select(EventRow::as_select());
        let sql = debug_query::<Pg, _>(&query).to_string();
        assert!(
            sql.contains(r#""events"."department_assignments" @> $1"#),
            "{sql}"
        );
        assert!(sql.contains("assignedVolunteers"), "{sql}");
        assert!(!sql.contains("FOR UPDATE"), "{sql}");
    }

    #[test]
    fn every_migration_is_bundled() {
        let names: Vec<&str> = MIGRATIONS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["create_roster", "create_bookings"]);
        assert!(MIGRATIONS[1].1.contains("newsletter_subscribers"));
    }
}
