//! Request and response bodies for the customer endpoints.
//!
//! ```text
//! POST /rest {"kunde":{"nachname":"Alpha","email":"alpha@acme.de",...},"user":{"username":"alpha","password":"Pass1234!"}}
//! GET /rest/{id} -> {"nachname":"Alpha",...,"_links":{"self":{"href":"http://host/rest/<id>"}}}
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::domain::{
    Adresse, FamilienstandType, GeschlechtType, InteresseType, Kunde, Umsatz, Waehrung,
};

/// Postal address payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdresseDto {
    #[schema(example = "76133")]
    pub plz: String,
    #[schema(example = "Karlsruhe")]
    pub ort: String,
}

impl From<AdresseDto> for Adresse {
    fn from(value: AdresseDto) -> Self {
        Self {
            plz: value.plz,
            ort: value.ort,
        }
    }
}

impl From<&Adresse> for AdresseDto {
    fn from(value: &Adresse) -> Self {
        Self {
            plz: value.plz.clone(),
            ort: value.ort.clone(),
        }
    }
}

/// Turnover payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UmsatzDto {
    #[schema(value_type = String, example = "12.50")]
    pub betrag: Decimal,
    #[schema(value_type = String, example = "EUR")]
    pub waehrung: Waehrung,
}

impl From<UmsatzDto> for Umsatz {
    fn from(value: UmsatzDto) -> Self {
        Self {
            betrag: value.betrag,
            waehrung: value.waehrung,
        }
    }
}

impl From<&Umsatz> for UmsatzDto {
    fn from(value: &Umsatz) -> Self {
        Self {
            betrag: value.betrag,
            waehrung: value.waehrung.clone(),
        }
    }
}

/// Customer fields accepted by `POST` and `PUT`.
///
/// Missing surname or email deserialise as blank strings so validation
/// reports them as constraint violations rather than syntax errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KundeDto {
    #[serde(default)]
    #[schema(example = "Alpha")]
    pub nachname: String,
    #[serde(default)]
    #[schema(example = "alpha@acme.de")]
    pub email: String,
    #[serde(default)]
    #[schema(example = 1)]
    pub kategorie: i32,
    #[serde(default)]
    pub has_newsletter: bool,
    pub geburtsdatum: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "https://www.acme.de")]
    pub homepage: Option<Url>,
    #[schema(value_type = Option<String>, example = "W")]
    pub geschlecht: Option<GeschlechtType>,
    #[schema(value_type = Option<String>, example = "L")]
    pub familienstand: Option<FamilienstandType>,
    pub adresse: Option<AdresseDto>,
    #[serde(default)]
    pub umsaetze: Vec<UmsatzDto>,
    #[schema(value_type = Option<Vec<String>>, example = json!(["S", "L"]))]
    pub interessen: Option<Vec<InteresseType>>,
}

impl KundeDto {
    /// Convert into an unsaved customer owned by `username`.
    pub fn into_kunde(self, username: Option<String>) -> Kunde {
        let mut kunde = Kunde::new(self.nachname, self.email);
        kunde.kategorie = self.kategorie;
        kunde.has_newsletter = self.has_newsletter;
        kunde.geburtsdatum = self.geburtsdatum;
        kunde.homepage = self.homepage;
        kunde.geschlecht = self.geschlecht;
        kunde.familienstand = self.familienstand;
        kunde.interessen = self.interessen;
        kunde.adresse = self.adresse.map(Adresse::from);
        kunde.umsaetze = self.umsaetze.into_iter().map(Umsatz::from).collect();
        kunde.username = username;
        kunde
    }
}

/// Login part of a registration.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    #[schema(example = "alpha")]
    pub username: String,
    #[schema(example = "Pass1234!")]
    pub password: String,
}

/// Registration body: the customer and its login.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct KundeUserDto {
    pub kunde: Option<KundeDto>,
    pub user: Option<UserDto>,
}

/// Hypermedia link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    pub href: String,
}

/// Links attached to a customer representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KundeLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
}

/// Customer representation returned by the read endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KundeModel {
    pub nachname: String,
    pub email: String,
    pub kategorie: i32,
    pub has_newsletter: bool,
    pub geburtsdatum: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub homepage: Option<Url>,
    #[schema(value_type = Option<String>)]
    pub geschlecht: Option<GeschlechtType>,
    #[schema(value_type = Option<String>)]
    pub familienstand: Option<FamilienstandType>,
    #[schema(value_type = Vec<String>)]
    pub interessen: Vec<InteresseType>,
    pub adresse: Option<AdresseDto>,
    pub umsaetze: Vec<UmsatzDto>,
    #[serde(rename = "_links")]
    pub links: KundeLinks,
}

impl KundeModel {
    /// Represent `kunde` with a self link below `base_uri`.
    pub fn new(kunde: &Kunde, base_uri: &str) -> Self {
        let href = match kunde.id {
            Some(id) => format!("{base_uri}/{id}"),
            None => base_uri.to_owned(),
        };
        Self {
            nachname: kunde.nachname.clone(),
            email: kunde.email.clone(),
            kategorie: kunde.kategorie,
            has_newsletter: kunde.has_newsletter,
            geburtsdatum: kunde.geburtsdatum,
            homepage: kunde.homepage.clone(),
            geschlecht: kunde.geschlecht,
            familienstand: kunde.familienstand,
            interessen: kunde.interessen_or_empty().to_vec(),
            adresse: kunde.adresse.as_ref().map(AdresseDto::from),
            umsaetze: kunde.umsaetze.iter().map(UmsatzDto::from).collect(),
            links: KundeLinks {
                self_link: Link { href },
            },
        }
    }
}

/// Embedded customer list of a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmbeddedKunden {
    pub kunden: Vec<KundeModel>,
}

/// Search result: `{"_embedded":{"kunden":[...]}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct KundenModel {
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedKunden,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KundeId;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn kunde_dto_accepts_external_codes() {
        let dto: KundeDto = serde_json::from_value(json!({
            "nachname": "Alpha",
            "email": "alpha@acme.de",
            "kategorie": 1,
            "hasNewsletter": true,
            "geburtsdatum": "2000-01-31",
            "geschlecht": "w",
            "familienstand": "VH",
            "adresse": {"plz": "76133", "ort": "Karlsruhe"},
            "umsaetze": [{"betrag": "12.50", "waehrung": "eur"}],
            "interessen": ["S", "R"]
        }))
        .expect("valid payload");

        let kunde = dto.into_kunde(Some("alpha".to_owned()));
        assert_eq!(kunde.geschlecht, Some(GeschlechtType::Weiblich));
        assert_eq!(kunde.familienstand, Some(FamilienstandType::Verheiratet));
        assert_eq!(
            kunde.interessen,
            Some(vec![InteresseType::Sport, InteresseType::Reisen])
        );
        assert_eq!(kunde.umsaetze[0].waehrung.as_ref(), "EUR");
        assert_eq!(kunde.username.as_deref(), Some("alpha"));
        assert_eq!(kunde.version, 0);
    }

    #[rstest]
    fn missing_fields_become_blank_or_absent() {
        let dto: KundeDto = serde_json::from_value(json!({})).expect("empty object");
        let kunde = dto.into_kunde(None);
        assert!(kunde.nachname.is_empty());
        assert!(kunde.interessen.is_none());
        assert!(kunde.umsaetze.is_empty());
    }

    #[rstest]
    fn unknown_codes_are_rejected() {
        let result = serde_json::from_value::<KundeDto>(json!({"geschlecht": "X"}));
        assert!(result.is_err());
    }

    #[rstest]
    fn model_is_camel_case_with_a_self_link() {
        let id = KundeId::random();
        let mut kunde = Kunde::new("Alpha", "alpha@acme.de");
        kunde.id = Some(id);
        kunde.has_newsletter = true;

        let value = serde_json::to_value(KundeModel::new(&kunde, "http://localhost/rest"))
            .expect("serialises");
        assert_eq!(value["hasNewsletter"], json!(true));
        assert_eq!(value["interessen"], json!([]));
        assert_eq!(
            value["_links"]["self"]["href"],
            json!(format!("http://localhost/rest/{id}"))
        );
    }
}
