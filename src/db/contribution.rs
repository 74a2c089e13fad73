//! Contribution lookup and eligibility

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::PgReceiptStore;
use crate::receipt::ports::{ContributionRepository, EligibilityPolicy};
use crate::receipt::{ContactId, Contribution, ContributionId, ReceiptError};

const COMPLETED_STATUS: &str = "Completed";

#[derive(sqlx::FromRow)]
struct ContributionRow {
    id: i64,
    contact_id: i64,
    total_amount: i64,
    currency: String,
    receive_date: DateTime<Utc>,
    status: String,
    financial_type: String,
}

impl From<ContributionRow> for Contribution {
    fn from(row: ContributionRow) -> Self {
        Self {
            id: ContributionId(row.id),
            contact_id: ContactId(row.contact_id),
            total_amount: row.total_amount,
            currency: row.currency,
            receive_date: row.receive_date,
            status: row.status,
            financial_type: row.financial_type,
        }
    }
}

#[async_trait]
impl ContributionRepository for PgReceiptStore {
    async fn find_by_id(&self, id: ContributionId) -> Result<Option<Contribution>, ReceiptError> {
        let row = sqlx::query_as::<_, ContributionRow>(
            r#"
            SELECT c.id, c.contact_id, c.total_amount, c.currency, c.receive_date,
                   c.status, ft.name AS financial_type
            FROM contributions c
            JOIN financial_types ft ON ft.id = c.financial_type_id
            WHERE c.id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Contribution::from))
    }
}

#[async_trait]
impl EligibilityPolicy for PgReceiptStore {
    /// Completed, tax deductible and for a positive amount.
    async fn is_eligible(&self, contribution_id: ContributionId) -> Result<bool, ReceiptError> {
        let eligible = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM contributions c
                JOIN financial_types ft ON ft.id = c.financial_type_id
                WHERE c.id = $1
                  AND c.status = $2
                  AND ft.is_deductible
                  AND c.total_amount > 0
            )
            "#,
        )
        .bind(contribution_id.0)
        .bind(COMPLETED_STATUS)
        .fetch_one(self.pool())
        .await?;

        log::debug!(
            "Contribution {} eligible for receipt: {}",
            contribution_id,
            eligible
        );
        Ok(eligible)
    }
}
