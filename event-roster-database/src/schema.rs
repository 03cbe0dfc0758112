diesel::table! {
    events (id) {
        id -> Int4,
        #[max_length = 255]
        name -> Varchar,
        date -> Nullable<Timestamptz>,
        location -> Text,
        description -> Nullable<Text>,
        total_volunteers -> Int4,
        male_req -> Int4,
        female_req -> Int4,
        #[max_length = 32]
        status -> Varchar,
        department_assignments -> Jsonb,
        assigned_volunteers -> Array<Int4>,
    }
}

diesel::table! {
    volunteer_profiles (id) {
        id -> Int4,
        #[max_length = 255]
        full_name -> Varchar,
        #[max_length = 16]
        gender -> Nullable<Varchar>,
        #[max_length = 255]
        department -> Varchar,
        #[max_length = 255]
        best_department -> Nullable<Varchar>,
        powerhouse -> Bool,
        user_id -> Nullable<Int4>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    bookings (id) {
        id -> Int4,
        user_id -> Nullable<Int4>,
        #[max_length = 255]
        name -> Varchar,
        #[max_length = 255]
        email -> Varchar,
        #[max_length = 255]
        event_type -> Varchar,
        event_date -> Nullable<Timestamptz>,
        message -> Nullable<Text>,
        admin_note -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    newsletter_subscribers (id) {
        id -> Int4,
        #[max_length = 255]
        email -> Varchar,
        subscribed_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    bookings,
    events,
    newsletter_subscribers,
    volunteer_profiles,
);
