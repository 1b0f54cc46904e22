table! {
    deliveries (id) {
        id -> Int4,
        user_id -> Int4,
        date -> Date,
        liters -> Float8,
    }
}

table! {
    productions (id) {
        id -> Int4,
        date -> Date,
        total_liters -> Float8,
    }
}

table! {
    users (id) {
        id -> Int4,
        name -> Varchar,
        email -> Varchar,
        password_hash -> Varchar,
        last_password_change -> Timestamp,
        role -> Varchar,
    }
}

joinable!(deliveries -> users (user_id));

allow_tables_to_appear_in_same_query!(
    deliveries,
    productions,
    users,
);
