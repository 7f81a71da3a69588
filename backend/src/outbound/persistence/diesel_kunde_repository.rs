//! PostgreSQL-backed `KundeRepository` implementation using Diesel ORM.
//!
//! A customer spans three tables: `kunde` holds the scalars, `adresse` the
//! single postal address and `umsatz` the ordered turnover rows. Reads load
//! the parent rows first and attach children with `belonging_to`, so every
//! search costs three queries regardless of the result size.
//!
//! Search predicates are translated into one boxed Diesel expression.
//! Address filters become `id = ANY(SELECT kunde_id FROM adresse WHERE ...)`
//! sub-selects so the parent query stays a single-table select.

use async_trait::async_trait;
use chrono::Utc;
use diesel::dsl::{exists, sql};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::domain::ports::{KundeRepository, KundeRepositoryError};
use crate::domain::{
    Adresse, EnumFilter, FamilienstandType, GeschlechtType, Kunde, KundeFilter, KundeId,
    KundePredicate, Umsatz, Waehrung, join_interessen, split_interessen,
};

use super::diesel_helpers::{
    DieselFailure, cast_version, cast_version_for_db, classify_diesel_error, contains_pattern,
    map_pool_error, prefix_pattern,
};
use super::models::{
    AdresseRow, KundeRow, KundeUpdate, NewAdresseRow, NewKundeRow, NewUmsatzRow, UmsatzRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{adresse, kunde, umsatz};

/// Boolean SQL condition over the `kunde` table.
type KundeCondition = Box<dyn BoxableExpression<kunde::table, Pg, SqlType = Bool>>;

/// Diesel-backed implementation of the `KundeRepository` port.
#[derive(Clone)]
pub struct DieselKundeRepository {
    pool: DbPool,
}

impl DieselKundeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn load_where(
        &self,
        condition: Option<KundeCondition>,
    ) -> Result<Vec<Kunde>, KundeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = kunde::table
            .select(KundeRow::as_select())
            .order(kunde::id.asc())
            .into_boxed();
        if let Some(condition) = condition {
            query = query.filter(condition);
        }
        let rows = query
            .load::<KundeRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        load_graph(&mut conn, rows).await
    }
}

fn pool_error(error: PoolError) -> KundeRepositoryError {
    map_pool_error(error, KundeRepositoryError::connection)
}

/// Unique constraint PostgreSQL names for `kunde.email`.
const EMAIL_CONSTRAINT: &str = "kunde_email_key";

fn map_diesel_error(error: diesel::result::Error) -> KundeRepositoryError {
    map_write_error(error, "")
}

/// Map Diesel errors of a write; `email` is the address a violation of
/// [`EMAIL_CONSTRAINT`] refers to.
fn map_write_error(error: diesel::result::Error, email: &str) -> KundeRepositoryError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => KundeRepositoryError::connection(message),
        DieselFailure::Query(message) => KundeRepositoryError::query(message),
        DieselFailure::UniqueViolation(constraint) => unique_violation(constraint, email),
    }
}

fn unique_violation(constraint: Option<String>, email: &str) -> KundeRepositoryError {
    match constraint.as_deref() {
        Some(EMAIL_CONSTRAINT) => KundeRepositoryError::duplicate_email(email),
        other => KundeRepositoryError::query(format!(
            "unique constraint violated: {}",
            other.unwrap_or_default()
        )),
    }
}

fn matches_nothing() -> KundeCondition {
    Box::new(sql::<Bool>("FALSE"))
}

fn enum_condition<T>(
    filter: &EnumFilter<T>,
    column_eq: impl FnOnce(&'static str) -> KundeCondition,
    code: impl FnOnce(T) -> &'static str,
) -> KundeCondition
where
    T: Copy,
{
    match filter {
        EnumFilter::Resolved(value) => column_eq(code(*value)),
        EnumFilter::Unresolved(raw) => {
            debug!(raw, "unknown enum code in search; matching nothing");
            matches_nothing()
        }
    }
}

fn filter_condition(filter: &KundeFilter) -> KundeCondition {
    match filter {
        KundeFilter::NachnameContains(teil) => {
            Box::new(kunde::nachname.ilike(contains_pattern(teil)))
        }
        KundeFilter::EmailContains(teil) => Box::new(kunde::email.ilike(contains_pattern(teil))),
        KundeFilter::Kategorie(kategorie) => Box::new(kunde::kategorie.eq(*kategorie)),
        KundeFilter::Newsletter(flag) => Box::new(kunde::has_newsletter.eq(*flag)),
        KundeFilter::Geschlecht(filter) => enum_condition(
            filter,
            |code| -> KundeCondition { Box::new(kunde::geschlecht.assume_not_null().eq(code)) },
            GeschlechtType::code,
        ),
        KundeFilter::Familienstand(filter) => enum_condition(
            filter,
            |code| -> KundeCondition {
                Box::new(kunde::familienstand.assume_not_null().eq(code))
            },
            FamilienstandType::code,
        ),
        KundeFilter::Interesse(tag) => Box::new(
            kunde::interessen
                .assume_not_null()
                .like(contains_pattern(tag.name())),
        ),
        KundeFilter::PlzPrefix(prefix) => Box::new(
            kunde::id.eq_any(
                adresse::table
                    .filter(adresse::plz.like(prefix_pattern(prefix)))
                    .select(adresse::kunde_id),
            ),
        ),
        KundeFilter::OrtContains(teil) => Box::new(
            kunde::id.eq_any(
                adresse::table
                    .filter(adresse::ort.ilike(contains_pattern(teil)))
                    .select(adresse::kunde_id),
            ),
        ),
    }
}

/// Translate a predicate tree into one SQL condition.
fn predicate_condition(predicate: &KundePredicate) -> KundeCondition {
    match predicate {
        KundePredicate::Filter(filter) => filter_condition(filter),
        KundePredicate::And(left, right) => {
            Box::new(predicate_condition(left).and(predicate_condition(right)))
        }
    }
}

/// Attach addresses and turnover rows to loaded customer rows.
async fn load_graph(
    conn: &mut AsyncPgConnection,
    rows: Vec<KundeRow>,
) -> Result<Vec<Kunde>, KundeRepositoryError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let adressen = AdresseRow::belonging_to(&rows)
        .select(AdresseRow::as_select())
        .load::<AdresseRow>(conn)
        .await
        .map_err(map_diesel_error)?
        .grouped_by(&rows);
    let umsaetze = UmsatzRow::belonging_to(&rows)
        .select(UmsatzRow::as_select())
        .order(umsatz::idx.asc())
        .load::<UmsatzRow>(conn)
        .await
        .map_err(map_diesel_error)?
        .grouped_by(&rows);

    rows.into_iter()
        .zip(adressen)
        .zip(umsaetze)
        .map(|((row, adressen), umsaetze)| row_to_kunde(row, adressen.into_iter().next(), umsaetze))
        .collect()
}

fn stored_value_error(column: &str, error: impl std::fmt::Display) -> KundeRepositoryError {
    KundeRepositoryError::query(format!("invalid stored {column}: {error}"))
}

/// Convert database rows to a domain customer.
fn row_to_kunde(
    row: KundeRow,
    adresse: Option<AdresseRow>,
    umsaetze: Vec<UmsatzRow>,
) -> Result<Kunde, KundeRepositoryError> {
    let homepage = row
        .homepage
        .as_deref()
        .map(Url::parse)
        .transpose()
        .map_err(|err| stored_value_error("homepage", err))?;
    let geschlecht = row
        .geschlecht
        .as_deref()
        .map(str::parse::<GeschlechtType>)
        .transpose()
        .map_err(|err| stored_value_error("geschlecht", err))?;
    let familienstand = row
        .familienstand
        .as_deref()
        .map(str::parse::<FamilienstandType>)
        .transpose()
        .map_err(|err| stored_value_error("familienstand", err))?;
    let interessen = split_interessen(row.interessen.as_deref())
        .map_err(|err| stored_value_error("interessen", err))?;
    let umsaetze = umsaetze
        .into_iter()
        .map(|umsatz| {
            Waehrung::new(&umsatz.waehrung)
                .map(|waehrung| Umsatz {
                    betrag: umsatz.betrag,
                    waehrung,
                })
                .map_err(|err| stored_value_error("waehrung", err))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Kunde {
        id: Some(KundeId::from(row.id)),
        version: cast_version(row.version),
        nachname: row.nachname,
        email: row.email,
        kategorie: row.kategorie,
        has_newsletter: row.has_newsletter,
        geburtsdatum: row.geburtsdatum,
        homepage,
        geschlecht,
        familienstand,
        interessen: Some(interessen),
        adresse: adresse.map(|row| Adresse {
            plz: row.plz,
            ort: row.ort,
        }),
        umsaetze,
        username: row.username,
        erzeugt: Some(row.erzeugt),
        aktualisiert: Some(row.aktualisiert),
    })
}

/// Tell a stale version from a deleted row after a conditional update hit
/// nothing.
async fn classify_update_miss(
    conn: &mut AsyncPgConnection,
    id: Uuid,
    expected_version: u32,
) -> KundeRepositoryError {
    let current = kunde::table
        .filter(kunde::id.eq(id))
        .select(kunde::version)
        .first::<i32>(conn)
        .await
        .optional()
        .map_err(map_diesel_error);

    match current {
        Ok(Some(actual)) => {
            KundeRepositoryError::version_mismatch(expected_version, cast_version(actual))
        }
        Ok(None) => KundeRepositoryError::missing(id.to_string()),
        Err(err) => err,
    }
}

#[async_trait]
impl KundeRepository for DieselKundeRepository {
    async fn find_all(&self) -> Result<Vec<Kunde>, KundeRepositoryError> {
        self.load_where(None).await
    }

    async fn find_matching(
        &self,
        predicate: &KundePredicate,
    ) -> Result<Vec<Kunde>, KundeRepositoryError> {
        self.load_where(Some(predicate_condition(predicate))).await
    }

    async fn find_by_id(&self, id: &KundeId) -> Result<Option<Kunde>, KundeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = kunde::table
            .filter(kunde::id.eq(id.as_uuid()))
            .select(KundeRow::as_select())
            .first::<KundeRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(load_graph(&mut conn, vec![row]).await?.pop())
    }

    async fn find_by_nachname(&self, teil: &str) -> Result<Vec<Kunde>, KundeRepositoryError> {
        let condition: KundeCondition = Box::new(kunde::nachname.ilike(contains_pattern(teil)));
        self.load_where(Some(condition)).await
    }

    async fn find_by_email(&self, prefix: &str) -> Result<Vec<Kunde>, KundeRepositoryError> {
        let condition: KundeCondition = Box::new(kunde::email.ilike(prefix_pattern(prefix)));
        self.load_where(Some(condition)).await
    }

    async fn find_nachnamen_by_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<String>, KundeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        kunde::table
            .filter(kunde::nachname.ilike(prefix_pattern(prefix)))
            .select(kunde::nachname)
            .distinct()
            .order(kunde::nachname.asc())
            .load::<String>(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, KundeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::select(exists(kunde::table.filter(kunde::email.eq(email))))
            .get_result::<bool>(&mut conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn insert(&self, record: &Kunde) -> Result<Kunde, KundeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let id = Uuid::new_v4();
        let erzeugt = record.erzeugt.unwrap_or_else(Utc::now);
        let aktualisiert = record.aktualisiert.unwrap_or(erzeugt);

        let new_row = NewKundeRow {
            id,
            version: 0,
            nachname: &record.nachname,
            email: &record.email,
            kategorie: record.kategorie,
            has_newsletter: record.has_newsletter,
            geburtsdatum: record.geburtsdatum,
            homepage: record.homepage.as_ref().map(Url::as_str),
            geschlecht: record.geschlecht.map(GeschlechtType::code),
            familienstand: record.familienstand.map(FamilienstandType::code),
            interessen: join_interessen(record.interessen_or_empty()),
            username: record.username.as_deref(),
            erzeugt,
            aktualisiert,
        };
        let adresse_row = record.adresse.as_ref().map(|adresse| NewAdresseRow {
            id: Uuid::new_v4(),
            plz: &adresse.plz,
            ort: &adresse.ort,
            kunde_id: id,
        });
        let umsatz_rows = record
            .umsaetze
            .iter()
            .zip(0_i32..)
            .map(|(umsatz, idx)| NewUmsatzRow {
                id: Uuid::new_v4(),
                betrag: umsatz.betrag,
                waehrung: umsatz.waehrung.as_ref(),
                kunde_id: id,
                idx,
            })
            .collect::<Vec<_>>();

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(kunde::table)
                    .values(&new_row)
                    .execute(conn)
                    .await?;
                if let Some(adresse_row) = &adresse_row {
                    diesel::insert_into(adresse::table)
                        .values(adresse_row)
                        .execute(conn)
                        .await?;
                }
                if !umsatz_rows.is_empty() {
                    diesel::insert_into(umsatz::table)
                        .values(&umsatz_rows)
                        .execute(conn)
                        .await?;
                }
                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_write_error(err, &record.email))?;

        debug!(%id, "kunde inserted");
        let mut saved = record.clone();
        saved.id = Some(KundeId::from(id));
        saved.version = 0;
        saved.interessen = Some(record.interessen_or_empty().to_vec());
        saved.erzeugt = Some(erzeugt);
        saved.aktualisiert = Some(aktualisiert);
        Ok(saved)
    }

    async fn update(
        &self,
        record: &Kunde,
        expected_version: u32,
    ) -> Result<Kunde, KundeRepositoryError> {
        let Some(id) = record.id else {
            return Err(KundeRepositoryError::query("cannot update a kunde without id"));
        };
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let uuid = *id.as_uuid();

        let changes = KundeUpdate {
            nachname: &record.nachname,
            email: &record.email,
            kategorie: record.kategorie,
            has_newsletter: record.has_newsletter,
            geburtsdatum: record.geburtsdatum,
            homepage: record.homepage.as_ref().map(Url::as_str),
            geschlecht: record.geschlecht.map(GeschlechtType::code),
            familienstand: record.familienstand.map(FamilienstandType::code),
            interessen: join_interessen(record.interessen_or_empty()),
            aktualisiert: record.aktualisiert.unwrap_or_else(Utc::now),
        };

        let updated = diesel::update(
            kunde::table.filter(
                kunde::id
                    .eq(uuid)
                    .and(kunde::version.eq(cast_version_for_db(expected_version))),
            ),
        )
        .set((&changes, kunde::version.eq(kunde::version + 1)))
        .returning(KundeRow::as_returning())
        .get_result::<KundeRow>(&mut conn)
        .await
        .optional()
        .map_err(|err| map_write_error(err, &record.email))?;

        let Some(row) = updated else {
            return Err(classify_update_miss(&mut conn, uuid, expected_version).await);
        };
        debug!(%id, version = row.version, "kunde updated");
        load_graph(&mut conn, vec![row])
            .await?
            .pop()
            .ok_or_else(|| KundeRepositoryError::missing(id.to_string()))
    }

    async fn delete(&self, id: &KundeId) -> Result<bool, KundeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        // adresse and umsatz rows go with the parent through ON DELETE CASCADE.
        let deleted = diesel::delete(kunde::table.filter(kunde::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! SQL shape and row conversion checks; they need no database.
    use super::*;
    use crate::domain::{InteresseType, PredicateBuilder, Suchkriterien};
    use chrono::{DateTime, TimeZone};
    use rstest::rstest;

    fn sql_for(condition: KundeCondition) -> String {
        let query = kunde::table.select(kunde::id).filter(condition);
        diesel::debug_query::<Pg, _>(&query).to_string()
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .single()
            .expect("valid timestamp")
    }

    fn kunde_row() -> KundeRow {
        KundeRow {
            id: Uuid::new_v4(),
            version: 3,
            nachname: "Alpha".to_owned(),
            email: "alpha@acme.de".to_owned(),
            kategorie: 1,
            has_newsletter: true,
            geburtsdatum: None,
            homepage: Some("https://acme.de/".to_owned()),
            geschlecht: Some("W".to_owned()),
            familienstand: None,
            interessen: Some("SPORT,LESEN".to_owned()),
            username: Some("alpha".to_owned()),
            erzeugt: timestamp(),
            aktualisiert: timestamp(),
        }
    }

    #[rstest]
    fn address_filters_become_sub_selects() {
        let predicate = PredicateBuilder
            .build(&Suchkriterien::from_pairs([("plz", "7"), ("nachname", "al")]))
            .expect("predicate");
        let sql = sql_for(predicate_condition(&predicate));
        assert!(sql.contains("ILIKE"), "{sql}");
        assert!(sql.contains("= ANY(SELECT"), "{sql}");
        assert!(sql.contains("\"adresse\".\"plz\" LIKE"), "{sql}");
    }

    #[rstest]
    #[case(Some("kunde_email_key"), KundeRepositoryError::duplicate_email("a@acme.de"))]
    #[case(
        Some("kunde_username_key"),
        KundeRepositoryError::query("unique constraint violated: kunde_username_key")
    )]
    #[case(None, KundeRepositoryError::query("unique constraint violated: "))]
    fn unique_violations_name_the_taken_email(
        #[case] constraint: Option<&str>,
        #[case] expected: KundeRepositoryError,
    ) {
        let err = unique_violation(constraint.map(str::to_owned), "a@acme.de");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn unknown_enum_code_matches_nothing() {
        let sql = sql_for(filter_condition(&KundeFilter::Geschlecht(
            EnumFilter::Unresolved("X".to_owned()),
        )));
        assert!(sql.contains("FALSE"), "{sql}");
    }

    #[rstest]
    fn interest_filter_uses_the_stored_name() {
        let sql = sql_for(filter_condition(&KundeFilter::Interesse(
            InteresseType::Reisen,
        )));
        assert!(sql.contains("\"kunde\".\"interessen\" LIKE"), "{sql}");
        assert!(sql.contains("%REISEN%"), "{sql}");
    }

    #[rstest]
    fn rows_convert_with_children_in_order() {
        let row = kunde_row();
        let kunde_id = row.id;
        let umsaetze = vec![
            UmsatzRow {
                id: Uuid::new_v4(),
                betrag: "1.00".parse().expect("decimal"),
                waehrung: "EUR".to_owned(),
                kunde_id,
                idx: 0,
            },
            UmsatzRow {
                id: Uuid::new_v4(),
                betrag: "2.00".parse().expect("decimal"),
                waehrung: "CHF".to_owned(),
                kunde_id,
                idx: 1,
            },
        ];
        let adresse = AdresseRow {
            id: Uuid::new_v4(),
            plz: "76133".to_owned(),
            ort: "Karlsruhe".to_owned(),
            kunde_id,
        };

        let kunde = row_to_kunde(row, Some(adresse), umsaetze).expect("convert");
        assert_eq!(kunde.version, 3);
        assert_eq!(kunde.geschlecht, Some(GeschlechtType::Weiblich));
        assert_eq!(
            kunde.interessen,
            Some(vec![InteresseType::Sport, InteresseType::Lesen])
        );
        assert_eq!(kunde.umsaetze[1].waehrung.as_ref(), "CHF");
        assert_eq!(kunde.adresse.map(|a| a.ort).as_deref(), Some("Karlsruhe"));
    }

    #[rstest]
    fn null_interests_load_as_empty_set() {
        let mut row = kunde_row();
        row.interessen = None;
        let kunde = row_to_kunde(row, None, Vec::new()).expect("convert");
        assert_eq!(kunde.interessen, Some(Vec::new()));
    }

    #[rstest]
    fn corrupt_codes_are_query_errors() {
        let mut row = kunde_row();
        row.geschlecht = Some("Q".to_owned());
        let err = row_to_kunde(row, None, Vec::new()).expect_err("corrupt code");
        assert!(matches!(err, KundeRepositoryError::Query { .. }));
    }
}
