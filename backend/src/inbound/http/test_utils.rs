//! Test helpers for inbound HTTP components.
//!
//! [`TestContext`] wires the real services to the in-memory adapters, seeded
//! with an admin, one customer login and two customers.

use std::sync::Arc;

use actix_web::{App, web};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use mockable::DefaultClock;
use uuid::Uuid;

use crate::Trace;
use crate::domain::ports::PasswordHasher;
use crate::domain::{
    Adresse, AuthService, InteresseType, Kunde, KundeId, KundeReadService, KundeWriteService,
    Login, Rolle,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{kunden, login};
use crate::outbound::mail::{MailConfig, TracingMailer};
use crate::outbound::memory::{InMemoryKundeRepository, InMemoryLoginRepository};
use crate::outbound::security::BcryptPasswordHasher;

/// `Authorization` header value for HTTP Basic credentials.
pub fn basic_auth(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{username}:{password}"))
    )
}

/// A valid customer owned by `username`.
pub fn kunde_fixture(nachname: &str, email: &str, username: Option<&str>) -> Kunde {
    let mut kunde = Kunde::new(nachname, email);
    kunde.kategorie = 1;
    kunde.adresse = Some(Adresse {
        plz: "76133".to_owned(),
        ort: "Karlsruhe".to_owned(),
    });
    kunde.interessen = Some(vec![InteresseType::Sport]);
    kunde.username = username.map(str::to_owned);
    kunde
}

/// In-memory application under test.
pub struct TestContext {
    pub kunden: Arc<InMemoryKundeRepository>,
    pub logins: Arc<InMemoryLoginRepository>,
    pub alpha_id: KundeId,
    pub beta_id: KundeId,
}

impl TestContext {
    pub const ADMIN_USERNAME: &'static str = "admin";
    pub const ADMIN_PASSWORD: &'static str = "Admin123!";
    pub const KUNDE_USERNAME: &'static str = "alpha";
    pub const KUNDE_PASSWORD: &'static str = "Alpha123!";

    pub fn new() -> Self {
        let hasher = Self::hasher();
        let login = |username: &str, password: &str, rollen: Vec<Rolle>| Login {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            password_hash: hasher.encode(password).expect("fixture password hashes"),
            rollen,
        };
        let logins = InMemoryLoginRepository::seeded([
            login(
                Self::ADMIN_USERNAME,
                Self::ADMIN_PASSWORD,
                vec![Rolle::Admin, Rolle::Kunde, Rolle::Actuator],
            ),
            login(Self::KUNDE_USERNAME, Self::KUNDE_PASSWORD, vec![Rolle::Kunde]),
        ]);

        let alpha_id = KundeId::random();
        let beta_id = KundeId::random();
        let mut alpha = kunde_fixture("Alpha", "alpha@acme.de", Some(Self::KUNDE_USERNAME));
        alpha.id = Some(alpha_id);
        let mut beta = kunde_fixture("Beta", "beta@acme.edu", Some("beta"));
        beta.id = Some(beta_id);
        beta.adresse = Some(Adresse {
            plz: "12345".to_owned(),
            ort: "Berlin".to_owned(),
        });

        Self {
            kunden: Arc::new(InMemoryKundeRepository::seeded([alpha, beta])),
            logins: Arc::new(logins),
            alpha_id,
            beta_id,
        }
    }

    // Minimum bcrypt cost keeps the handler tests fast.
    fn hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::new(Some(4))
    }

    pub fn state(&self) -> HttpState {
        let hasher = Arc::new(Self::hasher());
        let mailer = Arc::new(TracingMailer::new(
            MailConfig::new("theke@acme.com", "sales@acme.com").deactivated(true),
        ));
        HttpState::new(
            Arc::new(KundeReadService::new(self.kunden.clone())),
            Arc::new(KundeWriteService::new(
                self.kunden.clone(),
                self.logins.clone(),
                hasher.clone(),
                mailer,
                Arc::new(DefaultClock),
            )),
            Arc::new(AuthService::new(self.logins.clone(), hasher)),
        )
    }

    pub fn app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state()))
            .wrap(Trace)
            .configure(kunden::configure)
            .configure(login::configure)
    }
}
