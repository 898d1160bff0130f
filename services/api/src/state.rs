use auth::SessionKeys;
use db::{Db, SlotBlocking};
use serde::Deserialize;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub keys: SessionKeys,
    pub access_ttl: i64,
    pub refresh_ttl: i64,
    pub cookie_domain: String,
    pub cookie_secure: bool,
    pub slot_blocking: SlotBlocking,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub access_ttl_seconds: Option<i64>,
    pub refresh_ttl_seconds: Option<i64>,
    pub cookie_domain: Option<String>,
    pub cookie_secure: Option<bool>,
    /// When true, rejected/completed appointments stop blocking their slot.
    pub conflict_ignore_closed: Option<bool>,
}

impl Settings {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()
            .expect("config");

        cfg.try_deserialize::<Settings>()
            .expect("deserialize settings")
    }

    pub fn slot_blocking(&self) -> SlotBlocking {
        if self.conflict_ignore_closed.unwrap_or(false) {
            SlotBlocking::ActiveOnly
        } else {
            SlotBlocking::AllStatuses
        }
    }
}
