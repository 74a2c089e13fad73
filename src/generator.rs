//! Client for the external receipt generator service.
//!
//! The service allocates the receipt number, renders the PDF, records the
//! receipt, and emails it when the contact accepts email. It answers with the
//! delivery method it used and, for print receipts, the document itself.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::receipt::ports::ReceiptGenerator;
use crate::receipt::{Contribution, DeliveryMethodKind, GeneratedReceipt, GeneratorError};

#[derive(Serialize)]
struct IssueRequest<'a> {
    contribution: &'a Contribution,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    success: bool,
    method: DeliveryMethodKind,
    /// Base64-encoded PDF, only present for print receipts.
    #[serde(default)]
    document: Option<String>,
}

impl IssueResponse {
    fn into_generated(self) -> Result<GeneratedReceipt, GeneratorError> {
        let document = match self.document {
            Some(encoded) if !encoded.is_empty() => Some(BASE64.decode(encoded)?),
            _ => None,
        };
        Ok(GeneratedReceipt {
            success: self.success,
            method: self.method,
            document,
        })
    }
}

pub struct HttpReceiptGenerator {
    client: reqwest::Client,
    issue_url: String,
}

impl HttpReceiptGenerator {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            issue_url: format!("{}/issue", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl ReceiptGenerator for HttpReceiptGenerator {
    async fn issue(&self, contribution: &Contribution) -> Result<GeneratedReceipt, GeneratorError> {
        log::debug!(
            "Requesting receipt for contribution {} from {}",
            contribution.id,
            self.issue_url
        );

        let response: IssueResponse = self
            .client
            .post(&self.issue_url)
            .json(&IssueRequest { contribution })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_generated()
    }
}
