//! Diesel table definitions mirroring `backend/migrations`.

diesel::table! {
    accounts (id) {
        id -> Uuid,
        username -> Text,
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    daily_records (id) {
        id -> Uuid,
        account_id -> Uuid,
        day_key -> Date,
        goal_liters -> Float8,
        total_milliliters -> Int8,
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    ledger_entries (id) {
        id -> Uuid,
        record_id -> Uuid,
        position -> Int4,
        amount_milliliters -> Int8,
        recorded_at -> Timestamptz,
        note -> Text,
    }
}

diesel::joinable!(daily_records -> accounts (account_id));
diesel::joinable!(ledger_entries -> daily_records (record_id));

diesel::allow_tables_to_appear_in_same_query!(accounts, daily_records, ledger_entries);
