//! Issued receipt history

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::PgReceiptStore;
use crate::receipt::ports::{ReceiptHistory, ReceiptLoader};
use crate::receipt::{
    ContactId, ContributionId, DeliveryMethodKind, Receipt, ReceiptContribution, ReceiptError,
    ReceiptId,
};

#[derive(sqlx::FromRow)]
struct ReceiptRow {
    id: i64,
    receipt_no: String,
    issued_on: DateTime<Utc>,
    contact_id: i64,
    issue_type: String,
    issue_method: String,
    receipt_amount: i64,
}

#[derive(sqlx::FromRow)]
struct ReceiptContributionRow {
    contribution_id: i64,
    receipt_amount: i64,
    receive_date: DateTime<Utc>,
}

fn parse_issue_method(value: &str) -> DeliveryMethodKind {
    match value {
        "email" => DeliveryMethodKind::Email,
        _ => DeliveryMethodKind::Print,
    }
}

#[async_trait]
impl ReceiptHistory for PgReceiptStore {
    async fn issued_receipt_for(
        &self,
        contribution_id: ContributionId,
    ) -> Result<Option<(DateTime<Utc>, ReceiptId)>, ReceiptError> {
        let row = sqlx::query_as::<_, (DateTime<Utc>, i64)>(
            r#"
            SELECT r.issued_on, r.id
            FROM tax_receipts r
            JOIN tax_receipt_contributions rc ON rc.receipt_id = r.id
            WHERE rc.contribution_id = $1
            ORDER BY r.issued_on DESC, r.id DESC
            LIMIT 1
            "#,
        )
        .bind(contribution_id.0)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(|(issued_on, id)| (issued_on, ReceiptId(id))))
    }
}

#[async_trait]
impl ReceiptLoader for PgReceiptStore {
    async fn load(&self, receipt_id: ReceiptId) -> Result<Receipt, ReceiptError> {
        let row = sqlx::query_as::<_, ReceiptRow>(
            r#"
            SELECT id, receipt_no, issued_on, contact_id, issue_type, issue_method, receipt_amount
            FROM tax_receipts
            WHERE id = $1
            "#,
        )
        .bind(receipt_id.0)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| ReceiptError::Collaborator(format!("receipt {} not found", receipt_id)))?;

        let lines = sqlx::query_as::<_, ReceiptContributionRow>(
            r#"
            SELECT contribution_id, receipt_amount, receive_date
            FROM tax_receipt_contributions
            WHERE receipt_id = $1
            ORDER BY contribution_id
            "#,
        )
        .bind(receipt_id.0)
        .fetch_all(self.pool())
        .await?;

        Ok(Receipt {
            id: ReceiptId(row.id),
            receipt_no: row.receipt_no,
            issued_on: row.issued_on,
            contact_id: ContactId(row.contact_id),
            issue_type: row.issue_type,
            issue_method: parse_issue_method(&row.issue_method),
            receipt_amount: row.receipt_amount,
            contributions: lines
                .into_iter()
                .map(|line| ReceiptContribution {
                    contribution_id: ContributionId(line.contribution_id),
                    receipt_amount: line.receipt_amount,
                    receive_date: line.receive_date,
                })
                .collect(),
        })
    }
}
