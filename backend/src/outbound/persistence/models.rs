//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{adresse, kunde, login, umsatz};

// ---------------------------------------------------------------------------
// Kunde models
// ---------------------------------------------------------------------------

/// Row struct for reading from the kunde table.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = kunde)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct KundeRow {
    pub id: Uuid,
    pub version: i32,
    pub nachname: String,
    pub email: String,
    pub kategorie: i32,
    pub has_newsletter: bool,
    pub geburtsdatum: Option<NaiveDate>,
    pub homepage: Option<String>,
    pub geschlecht: Option<String>,
    pub familienstand: Option<String>,
    pub interessen: Option<String>,
    pub username: Option<String>,
    pub erzeugt: DateTime<Utc>,
    pub aktualisiert: DateTime<Utc>,
}

/// Insertable struct for creating new customers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = kunde)]
pub(crate) struct NewKundeRow<'a> {
    pub id: Uuid,
    pub version: i32,
    pub nachname: &'a str,
    pub email: &'a str,
    pub kategorie: i32,
    pub has_newsletter: bool,
    pub geburtsdatum: Option<NaiveDate>,
    pub homepage: Option<&'a str>,
    pub geschlecht: Option<&'a str>,
    pub familienstand: Option<&'a str>,
    pub interessen: Option<String>,
    pub username: Option<&'a str>,
    pub erzeugt: DateTime<Utc>,
    pub aktualisiert: DateTime<Utc>,
}

/// Changeset for the mutable customer columns.
///
/// `None` clears the column, so a replacement can remove a homepage or
/// birth date.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = kunde)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct KundeUpdate<'a> {
    pub nachname: &'a str,
    pub email: &'a str,
    pub kategorie: i32,
    pub has_newsletter: bool,
    pub geburtsdatum: Option<NaiveDate>,
    pub homepage: Option<&'a str>,
    pub geschlecht: Option<&'a str>,
    pub familienstand: Option<&'a str>,
    pub interessen: Option<String>,
    pub aktualisiert: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Adresse and Umsatz models
// ---------------------------------------------------------------------------

/// Row struct for reading from the adresse table.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = adresse)]
#[diesel(belongs_to(KundeRow, foreign_key = kunde_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AdresseRow {
    pub id: Uuid,
    pub plz: String,
    pub ort: String,
    pub kunde_id: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = adresse)]
pub(crate) struct NewAdresseRow<'a> {
    pub id: Uuid,
    pub plz: &'a str,
    pub ort: &'a str,
    pub kunde_id: Uuid,
}

/// Row struct for reading from the umsatz table.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = umsatz)]
#[diesel(belongs_to(KundeRow, foreign_key = kunde_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UmsatzRow {
    pub id: Uuid,
    pub betrag: Decimal,
    pub waehrung: String,
    pub kunde_id: Uuid,
    pub idx: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = umsatz)]
pub(crate) struct NewUmsatzRow<'a> {
    pub id: Uuid,
    pub betrag: Decimal,
    pub waehrung: &'a str,
    pub kunde_id: Uuid,
    pub idx: i32,
}

// ---------------------------------------------------------------------------
// Login models
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = login)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoginRow {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub rollen: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = login)]
pub(crate) struct NewLoginRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password: &'a str,
    pub rollen: String,
}
