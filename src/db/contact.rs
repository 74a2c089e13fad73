//! Delivery method resolution

use async_trait::async_trait;

use super::PgReceiptStore;
use crate::receipt::ports::DeliveryMethodResolver;
use crate::receipt::{ContactId, DeliveryMethod, ReceiptError};

/// Email when the contact has a usable primary address, print otherwise.
fn delivery_for(email: Option<String>) -> DeliveryMethod {
    match email.map(|e| e.trim().to_string()) {
        Some(address) if !address.is_empty() => DeliveryMethod::Email { address },
        _ => DeliveryMethod::Print,
    }
}

#[async_trait]
impl DeliveryMethodResolver for PgReceiptStore {
    async fn resolve(&self, contact_id: ContactId) -> Result<DeliveryMethod, ReceiptError> {
        let email = sqlx::query_scalar::<_, Option<String>>(
            r#"
            SELECT e.email
            FROM contacts c
            LEFT JOIN contact_emails e ON e.contact_id = c.id AND e.is_primary
            WHERE c.id = $1
              AND NOT c.do_not_email
              AND NOT c.is_deceased
            "#,
        )
        .bind(contact_id.0)
        .fetch_optional(self.pool())
        .await?
        .flatten();

        let method = delivery_for(email);
        log::debug!("Contact {} receives receipts by {}", contact_id, method.kind());
        Ok(method)
    }
}
