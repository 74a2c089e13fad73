//! PostgreSQL-backed collaborators for the receipting flow.
//!
//! This module is split into submodules:
//! - `contribution` - contribution lookup and receipt eligibility
//! - `receipt` - issued receipt history and receipt loading
//! - `contact` - delivery method resolution

mod contact;
mod contribution;
mod receipt;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

#[derive(Clone)]
pub struct PgReceiptStore {
    pool: PgPool,
}

impl PgReceiptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(900))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;
        log::info!("Connected to receipt database");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
