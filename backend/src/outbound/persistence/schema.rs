//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When the
//! migrations change, regenerate them with `diesel print-schema` or update
//! them by hand.

diesel::table! {
    /// Customers.
    ///
    /// `version` is bumped by every successful conditional update.
    kunde (id) {
        id -> Uuid,
        version -> Int4,
        nachname -> Varchar,
        email -> Varchar,
        kategorie -> Int4,
        has_newsletter -> Bool,
        geburtsdatum -> Nullable<Date>,
        homepage -> Nullable<Varchar>,
        /// Single letter code, see `GeschlechtType`.
        geschlecht -> Nullable<Varchar>,
        familienstand -> Nullable<Varchar>,
        /// Comma joined interest names; NULL when the set is empty.
        interessen -> Nullable<Varchar>,
        username -> Nullable<Varchar>,
        erzeugt -> Timestamptz,
        aktualisiert -> Timestamptz,
    }
}

diesel::table! {
    /// Postal address, exactly one per customer.
    adresse (id) {
        id -> Uuid,
        plz -> Varchar,
        ort -> Varchar,
        kunde_id -> Uuid,
    }
}

diesel::table! {
    /// Turnover rows; `idx` keeps the insertion order.
    umsatz (id) {
        id -> Uuid,
        betrag -> Numeric,
        waehrung -> Varchar,
        kunde_id -> Uuid,
        idx -> Int4,
    }
}

diesel::table! {
    /// Stored logins.
    login (id) {
        id -> Uuid,
        /// Lower-cased, unique.
        username -> Varchar,
        /// Encoded bcrypt hash.
        password -> Varchar,
        /// Comma joined role names.
        rollen -> Varchar,
    }
}

diesel::joinable!(adresse -> kunde (kunde_id));
diesel::joinable!(umsatz -> kunde (kunde_id));

diesel::allow_tables_to_appear_in_same_query!(adresse, kunde, login, umsatz);
