//! Receipt issuance flow.
//!
//! Loads prior issuance state for a contribution, confirms issuance or
//! re-issuance, and hands out the print document generated by the last
//! issuance in this session.

use std::path::PathBuf;
use std::sync::Arc;

use super::error::ReceiptError;
use super::model::{
    button_label, ContactId, ContributionContext, ContributionId, DeliveryMethodKind, Download,
    IssuanceOutcome, PendingDocument, ReceiptView, RECEIPT_TITLE,
};
use super::ports::{
    ContributionRepository, DeliveryMethodResolver, EligibilityPolicy, PermissionAuthority,
    ReceiptGenerator, ReceiptHistory, ReceiptLoader,
};
use crate::auth::{Actor, Capability};
use crate::pending::PendingFileStore;
use crate::session::SessionScope;

/// Session namespace remembering which contribution the form is showing.
pub const FORM_NAMESPACE: &str = "tax_receipt_form";
const FORM_CONTEXT_KEY: &str = "context";
/// Session namespace holding pending print documents.
pub const FILE_NAMESPACE: &str = "cdntaxreceipts";

/// External services the flow depends on.
pub struct Collaborators {
    pub permissions: Arc<dyn PermissionAuthority>,
    pub contributions: Arc<dyn ContributionRepository>,
    pub history: Arc<dyn ReceiptHistory>,
    pub receipts: Arc<dyn ReceiptLoader>,
    pub delivery: Arc<dyn DeliveryMethodResolver>,
    pub eligibility: Arc<dyn EligibilityPolicy>,
    pub generator: Arc<dyn ReceiptGenerator>,
}

pub struct ReceiptIssuanceFlow {
    services: Collaborators,
    files: Arc<PendingFileStore>,
}

impl ReceiptIssuanceFlow {
    pub fn new(services: Collaborators, files: Arc<PendingFileStore>) -> Self {
        Self { services, files }
    }

    fn require(&self, capability: Capability, actor: &Actor) -> Result<(), ReceiptError> {
        if self.services.permissions.check(capability, actor) {
            Ok(())
        } else {
            log::warn!("User {} denied: missing '{}'", actor.id, capability);
            Err(ReceiptError::Forbidden)
        }
    }

    /// Work out which contribution/contact the request is about.
    ///
    /// Freshly supplied ids win and are remembered for later requests in the
    /// session; otherwise the remembered pair is used.
    pub async fn resolve_context(
        &self,
        actor: &Actor,
        session: &SessionScope,
        contribution_id: Option<ContributionId>,
        contact_id: Option<ContactId>,
    ) -> Result<ContributionContext, ReceiptError> {
        self.require(Capability::ViewContribution, actor)?;

        if let (Some(contribution_id), Some(contact_id)) = (contribution_id, contact_id) {
            let context = ContributionContext::new(contribution_id, contact_id);
            match serde_json::to_string(&context) {
                Ok(value) => session.set(FORM_NAMESPACE, FORM_CONTEXT_KEY, value).await,
                Err(e) => log::error!("Failed to remember form context: {}", e),
            }
            return Ok(context);
        }

        session
            .get(FORM_NAMESPACE, FORM_CONTEXT_KEY)
            .await
            .and_then(|value| serde_json::from_str(&value).ok())
            .ok_or(ReceiptError::MissingContext)
    }

    /// Build the receipt page for a contribution. Read-only.
    pub async fn prepare(
        &self,
        actor: &Actor,
        context: &ContributionContext,
        offer_download: bool,
    ) -> Result<ReceiptView, ReceiptError> {
        self.require(Capability::ViewContribution, actor)?;
        log::info!(
            "Preparing tax receipt page for contribution {} (contact {})",
            context.contribution_id,
            context.contact_id
        );

        let existing = match self
            .services
            .history
            .issued_receipt_for(context.contribution_id)
            .await?
        {
            Some((issued_on, receipt_id)) => {
                log::debug!(
                    "Contribution {} already receipted by {} on {}",
                    context.contribution_id,
                    receipt_id,
                    issued_on
                );
                Some(self.services.receipts.load(receipt_id).await?)
            }
            None => None,
        };

        let method = self.services.delivery.resolve(context.contact_id).await?;
        let reissue = existing.is_some();

        Ok(ReceiptView {
            title: RECEIPT_TITLE.to_string(),
            contribution_id: context.contribution_id,
            contact_id: existing
                .as_ref()
                .map(|r| r.contact_id)
                .unwrap_or(context.contact_id),
            reissue,
            receipt_contributions: existing
                .as_ref()
                .map(|r| r.contribution_ids())
                .unwrap_or_default(),
            receipt: existing,
            button_label: button_label(reissue).to_string(),
            can_issue: self
                .services
                .permissions
                .check(Capability::EditContribution, actor),
            method: method.kind(),
            receipt_email: method.email_address().map(str::to_string),
            pdf_file: offer_download,
            download_url: None,
            status: None,
        })
    }

    /// Issue (or re-issue) a receipt for the contribution.
    ///
    /// Every call that passes the eligibility check asks the generator for a
    /// new receipt; callers must only invoke this on an explicit confirmation.
    pub async fn confirm_issuance(
        &self,
        actor: &Actor,
        session: &SessionScope,
        context: &ContributionContext,
    ) -> Result<IssuanceOutcome, ReceiptError> {
        self.require(Capability::EditContribution, actor)?;
        log::info!(
            "User {} confirming tax receipt for contribution {}",
            actor.id,
            context.contribution_id
        );

        let contribution = self
            .services
            .contributions
            .find_by_id(context.contribution_id)
            .await?
            .ok_or(ReceiptError::NotFound(context.contribution_id))?;

        if !self.services.eligibility.is_eligible(contribution.id).await? {
            log::warn!("Contribution {} is not eligible for a receipt", contribution.id);
            return Ok(IssuanceOutcome::Rejected);
        }

        let generated = match self.services.generator.issue(&contribution).await {
            Ok(generated) => generated,
            Err(e) => {
                log::error!(
                    "Receipt generation for contribution {} failed: {}",
                    contribution.id,
                    e
                );
                return Ok(IssuanceOutcome::Failed);
            }
        };

        if !generated.success {
            log::warn!("Generator reported failure for contribution {}", contribution.id);
            return Ok(IssuanceOutcome::Failed);
        }

        match generated.method {
            DeliveryMethodKind::Email => {
                log::info!("Receipt for contribution {} emailed", contribution.id);
                Ok(IssuanceOutcome::IssuedByEmail)
            }
            DeliveryMethodKind::Print => {
                if let Some(document) = &generated.document {
                    self.hold_for_download(session, context, document).await;
                }
                log::info!("Receipt for contribution {} generated for printing", contribution.id);
                Ok(IssuanceOutcome::IssuedForPrint {
                    document: generated.document,
                })
            }
        }
    }

    async fn hold_for_download(
        &self,
        session: &SessionScope,
        context: &ContributionContext,
        document: &[u8],
    ) {
        // A lost file surfaces later as an expired download, not as a failed issuance.
        let key = context.pending_file_key();
        match self.files.write(context, document).await {
            Ok(path) => {
                session
                    .set(FILE_NAMESPACE, &key, path.to_string_lossy().into_owned())
                    .await
            }
            Err(e) => {
                log::error!(
                    "Could not hold receipt for contribution {}: {}",
                    context.contribution_id,
                    e
                );
                // Never let the handle keep pointing at a superseded receipt.
                session.remove(FILE_NAMESPACE, &key).await;
            }
        }
    }

    /// Fetch the print document held for this session, if it is still around.
    ///
    /// The file stays in place after a successful read so repeated requests
    /// for the same download keep working until the purge worker removes it.
    pub async fn download_pending_file(
        &self,
        actor: &Actor,
        session: &SessionScope,
        context: &ContributionContext,
    ) -> Result<Download, ReceiptError> {
        self.require(Capability::ViewContribution, actor)?;

        let Some(path) = session
            .get(FILE_NAMESPACE, &context.pending_file_key())
            .await
            .map(PathBuf::from)
        else {
            log::info!(
                "No pending receipt for contribution {} in session {}",
                context.contribution_id,
                session.id()
            );
            return Ok(Download::Expired);
        };

        let bytes = match self.files.read(&path).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                log::info!("Pending receipt {} has been purged", path.display());
                return Ok(Download::Expired);
            }
            Err(e) => {
                log::error!("Failed to read pending receipt {}: {}", path.display(), e);
                return Ok(Download::Expired);
            }
        };

        let filename = path
            .file_name()
            .map(|name| sanitize_filename::sanitize(name.to_string_lossy()))
            .unwrap_or_else(|| format!("receipt-{}.pdf", context.contribution_id));

        log::info!("Serving pending receipt {} ({} bytes)", filename, bytes.len());
        Ok(Download::Ready(PendingDocument { filename, bytes }))
    }
}
