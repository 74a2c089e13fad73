//! Boundary collaborators consumed by the receipting flow.
//!
//! The flow never talks to the database, the generator service, or the
//! permission system directly; everything goes through these traits so it can
//! be exercised with in-memory doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::{GeneratorError, ReceiptError};
use super::model::{
    ContactId, Contribution, ContributionId, DeliveryMethod, GeneratedReceipt, Receipt, ReceiptId,
};
use crate::auth::{Actor, Capability};

pub trait PermissionAuthority: Send + Sync {
    fn check(&self, capability: Capability, actor: &Actor) -> bool;
}

#[async_trait]
pub trait ContributionRepository: Send + Sync {
    async fn find_by_id(&self, id: ContributionId) -> Result<Option<Contribution>, ReceiptError>;
}

#[async_trait]
pub trait ReceiptHistory: Send + Sync {
    /// Most recent receipt covering the contribution, if any.
    async fn issued_receipt_for(
        &self,
        contribution_id: ContributionId,
    ) -> Result<Option<(DateTime<Utc>, ReceiptId)>, ReceiptError>;
}

#[async_trait]
pub trait ReceiptLoader: Send + Sync {
    async fn load(&self, receipt_id: ReceiptId) -> Result<Receipt, ReceiptError>;
}

#[async_trait]
pub trait DeliveryMethodResolver: Send + Sync {
    async fn resolve(&self, contact_id: ContactId) -> Result<DeliveryMethod, ReceiptError>;
}

#[async_trait]
pub trait EligibilityPolicy: Send + Sync {
    async fn is_eligible(&self, contribution_id: ContributionId) -> Result<bool, ReceiptError>;
}

#[async_trait]
pub trait ReceiptGenerator: Send + Sync {
    /// Issue a new receipt for the contribution and deliver it by the contact's method.
    async fn issue(&self, contribution: &Contribution) -> Result<GeneratedReceipt, GeneratorError>;
}
