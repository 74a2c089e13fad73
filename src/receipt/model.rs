use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub const ISSUE_BUTTON_LABEL: &str = "Issue Tax Receipt";
pub const REISSUE_BUTTON_LABEL: &str = "Re-Issue Tax Receipt";
pub const RECEIPT_TITLE: &str = "Tax Receipt";

pub const REJECTED_MESSAGE: &str =
    "This contribution is not tax deductible and/or not completed. No receipt has been issued.";
pub const EMAILED_MESSAGE: &str = "Tax Receipt has been emailed to the contributor.";
pub const PRINTED_MESSAGE: &str = "Tax Receipt has been generated for printing.";
pub const FAILED_MESSAGE: &str = "Encountered an error. Tax receipt has not been issued.";
pub const EXPIRED_MESSAGE: &str =
    "File has expired. Please retrieve receipt from the email archive.";

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(ContributionId);
id_type!(ContactId);
id_type!(ReceiptId);

/// The contribution/contact pair a form request operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributionContext {
    pub contribution_id: ContributionId,
    pub contact_id: ContactId,
}

impl ContributionContext {
    pub fn new(contribution_id: ContributionId, contact_id: ContactId) -> Self {
        Self {
            contribution_id,
            contact_id,
        }
    }

    /// Session key under which the pending print document for this pair is recorded.
    pub fn pending_file_key(&self) -> String {
        format!("pdf_file_{}_{}", self.contribution_id, self.contact_id)
    }
}

/// Contribution record as seen by the receipting flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Contribution {
    pub id: ContributionId,
    pub contact_id: ContactId,
    /// Amount in minor currency units.
    pub total_amount: i64,
    pub currency: String,
    pub receive_date: DateTime<Utc>,
    pub status: String,
    pub financial_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReceiptContribution {
    pub contribution_id: ContributionId,
    pub receipt_amount: i64,
    pub receive_date: DateTime<Utc>,
}

/// An issued tax receipt. A receipt may cover several contributions of one contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Receipt {
    pub id: ReceiptId,
    pub receipt_no: String,
    pub issued_on: DateTime<Utc>,
    pub contact_id: ContactId,
    pub issue_type: String,
    pub issue_method: DeliveryMethodKind,
    pub receipt_amount: i64,
    pub contributions: Vec<ReceiptContribution>,
}

impl Receipt {
    pub fn contribution_ids(&self) -> Vec<ContributionId> {
        self.contributions.iter().map(|c| c.contribution_id).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethodKind {
    Email,
    Print,
}

impl fmt::Display for DeliveryMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMethodKind::Email => write!(f, "email"),
            DeliveryMethodKind::Print => write!(f, "print"),
        }
    }
}

/// How a contact receives receipts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMethod {
    Email { address: String },
    Print,
}

impl DeliveryMethod {
    pub fn kind(&self) -> DeliveryMethodKind {
        match self {
            DeliveryMethod::Email { .. } => DeliveryMethodKind::Email,
            DeliveryMethod::Print => DeliveryMethodKind::Print,
        }
    }

    pub fn email_address(&self) -> Option<&str> {
        match self {
            DeliveryMethod::Email { address } => Some(address),
            DeliveryMethod::Print => None,
        }
    }
}

/// What the external generator reported for one issuance attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReceipt {
    pub success: bool,
    pub method: DeliveryMethodKind,
    pub document: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssuanceOutcome {
    Rejected,
    IssuedByEmail,
    /// `document` is what the generator returned; it is also held as a pending file when present.
    IssuedForPrint { document: Option<Vec<u8>> },
    Failed,
}

impl IssuanceOutcome {
    pub fn status_message(&self) -> &'static str {
        match self {
            IssuanceOutcome::Rejected => REJECTED_MESSAGE,
            IssuanceOutcome::IssuedByEmail => EMAILED_MESSAGE,
            IssuanceOutcome::IssuedForPrint { .. } => PRINTED_MESSAGE,
            IssuanceOutcome::Failed => FAILED_MESSAGE,
        }
    }

    /// True when a print document is waiting to be downloaded.
    pub fn has_pending_document(&self) -> bool {
        matches!(
            self,
            IssuanceOutcome::IssuedForPrint {
                document: Some(_)
            }
        )
    }
}

/// A pending print document ready to be streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl PendingDocument {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    Ready(PendingDocument),
    /// No document is held for the key any more; the caller should point the user at the email archive.
    Expired,
}

impl Download {
    pub fn status_message(&self) -> Option<&'static str> {
        match self {
            Download::Ready(_) => None,
            Download::Expired => Some(EXPIRED_MESSAGE),
        }
    }
}

/// Everything the receipt page needs to render.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReceiptView {
    pub title: String,
    pub contribution_id: ContributionId,
    pub contact_id: ContactId,
    pub reissue: bool,
    pub receipt: Option<Receipt>,
    pub receipt_contributions: Vec<ContributionId>,
    pub button_label: String,
    /// Whether the actor may press the issue button.
    pub can_issue: bool,
    pub method: DeliveryMethodKind,
    pub receipt_email: Option<String>,
    pub pdf_file: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

pub fn button_label(reissue: bool) -> &'static str {
    if reissue {
        REISSUE_BUTTON_LABEL
    } else {
        ISSUE_BUTTON_LABEL
    }
}
