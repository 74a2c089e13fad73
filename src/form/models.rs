use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::receipt::{ContactId, ContributionId};

/// Query parameters of the tax receipt page.
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReceiptPageQuery {
    /// Contribution id
    pub id: Option<i64>,
    /// Contact id
    pub cid: Option<i64>,
    /// `1` streams the pending print receipt
    pub download: Option<u8>,
    /// `1` renders the page with a pointer to the download
    pub file: Option<u8>,
    pub reset: Option<u8>,
}

impl ReceiptPageQuery {
    pub fn contribution_id(&self) -> Option<ContributionId> {
        self.id.map(ContributionId)
    }

    pub fn contact_id(&self) -> Option<ContactId> {
        self.cid.map(ContactId)
    }

    pub fn wants_download(&self) -> bool {
        self.download == Some(1)
    }

    pub fn offers_file(&self) -> bool {
        self.file == Some(1)
    }
}

/// Body of the confirm button submission.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ConfirmIssuanceForm {
    pub id: Option<i64>,
    pub cid: Option<i64>,
}
