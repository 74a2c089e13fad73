#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use tax_receipt_server::auth::{Actor, Capability, ClaimsPermissionAuthority};
use tax_receipt_server::pending::PendingFileStore;
use tax_receipt_server::receipt::ports::{
    ContributionRepository, DeliveryMethodResolver, EligibilityPolicy, ReceiptGenerator,
    ReceiptHistory, ReceiptLoader,
};
use tax_receipt_server::receipt::{
    Collaborators, ContactId, Contribution, ContributionId, DeliveryMethod, DeliveryMethodKind,
    GeneratedReceipt, GeneratorError, Receipt, ReceiptContribution, ReceiptError, ReceiptId,
    ReceiptIssuanceFlow,
};
use tax_receipt_server::session::{MemorySessionStore, SessionId, SessionScope, SessionStore};
use tax_receipt_server::AppState;

pub const CONTACT: ContactId = ContactId(42);

pub fn received_on() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 10, 0, 0).unwrap()
}

pub fn contribution(id: i64) -> Contribution {
    Contribution {
        id: ContributionId(id),
        contact_id: CONTACT,
        total_amount: 10_000,
        currency: "CAD".to_string(),
        receive_date: received_on(),
        status: "Completed".to_string(),
        financial_type: "Donation".to_string(),
    }
}

pub fn receipt(id: i64, contribution_ids: &[i64]) -> Receipt {
    Receipt {
        id: ReceiptId(id),
        receipt_no: format!("WEB-{:08}", id),
        issued_on: received_on(),
        contact_id: CONTACT,
        issue_type: "single".to_string(),
        issue_method: DeliveryMethodKind::Print,
        receipt_amount: 10_000 * contribution_ids.len() as i64,
        contributions: contribution_ids
            .iter()
            .map(|&c| ReceiptContribution {
                contribution_id: ContributionId(c),
                receipt_amount: 10_000,
                receive_date: received_on(),
            })
            .collect(),
    }
}

pub fn actor(session: &str, capabilities: &[Capability]) -> Actor {
    Actor::new("staff-1", SessionId::from(session), capabilities.to_vec())
}

pub fn viewer(session: &str) -> Actor {
    actor(session, &[Capability::ViewContribution])
}

pub fn editor(session: &str) -> Actor {
    actor(
        session,
        &[Capability::ViewContribution, Capability::EditContribution],
    )
}

#[derive(Default)]
pub struct FakeContributions {
    pub records: Mutex<HashMap<ContributionId, Contribution>>,
    pub lookups: AtomicUsize,
}

#[async_trait]
impl ContributionRepository for FakeContributions {
    async fn find_by_id(&self, id: ContributionId) -> Result<Option<Contribution>, ReceiptError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.lock().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct FakeReceipts {
    pub by_contribution: Mutex<HashMap<ContributionId, Receipt>>,
    pub lookups: AtomicUsize,
    pub unavailable: AtomicBool,
}

#[async_trait]
impl ReceiptHistory for FakeReceipts {
    async fn issued_receipt_for(
        &self,
        contribution_id: ContributionId,
    ) -> Result<Option<(DateTime<Utc>, ReceiptId)>, ReceiptError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ReceiptError::Collaborator(
                "receipt log query failed: connection refused".to_string(),
            ));
        }
        Ok(self
            .by_contribution
            .lock()
            .get(&contribution_id)
            .map(|r| (r.issued_on, r.id)))
    }
}

#[async_trait]
impl ReceiptLoader for FakeReceipts {
    async fn load(&self, receipt_id: ReceiptId) -> Result<Receipt, ReceiptError> {
        self.by_contribution
            .lock()
            .values()
            .find(|r| r.id == receipt_id)
            .cloned()
            .ok_or_else(|| ReceiptError::Collaborator(format!("receipt {} not found", receipt_id)))
    }
}

#[derive(Default)]
pub struct FakeDelivery {
    pub methods: Mutex<HashMap<ContactId, DeliveryMethod>>,
}

#[async_trait]
impl DeliveryMethodResolver for FakeDelivery {
    async fn resolve(&self, contact_id: ContactId) -> Result<DeliveryMethod, ReceiptError> {
        Ok(self
            .methods
            .lock()
            .get(&contact_id)
            .cloned()
            .unwrap_or(DeliveryMethod::Print))
    }
}

#[derive(Default)]
pub struct FakeEligibility {
    pub eligible: Mutex<HashSet<ContributionId>>,
    pub checks: AtomicUsize,
}

#[async_trait]
impl EligibilityPolicy for FakeEligibility {
    async fn is_eligible(&self, contribution_id: ContributionId) -> Result<bool, ReceiptError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.eligible.lock().contains(&contribution_id))
    }
}

/// Generator double answering every call with the configured result.
pub struct FakeGenerator {
    pub response: Mutex<Option<GeneratedReceipt>>,
    pub calls: AtomicUsize,
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self {
            response: Mutex::new(Some(GeneratedReceipt {
                success: true,
                method: DeliveryMethodKind::Email,
                document: None,
            })),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ReceiptGenerator for FakeGenerator {
    async fn issue(&self, _contribution: &Contribution) -> Result<GeneratedReceipt, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .lock()
            .clone()
            .ok_or_else(|| GeneratorError::Other("generator offline".to_string()))
    }
}

/// A flow wired to in-memory doubles and a temporary pending-file directory.
pub struct Harness {
    pub contributions: Arc<FakeContributions>,
    pub receipts: Arc<FakeReceipts>,
    pub delivery: Arc<FakeDelivery>,
    pub eligibility: Arc<FakeEligibility>,
    pub generator: Arc<FakeGenerator>,
    pub files: Arc<PendingFileStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub flow: Arc<ReceiptIssuanceFlow>,
    pub dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let files = Arc::new(
            PendingFileStore::open(dir.path())
                .await
                .expect("Failed to open pending file store"),
        );
        let contributions = Arc::new(FakeContributions::default());
        let receipts = Arc::new(FakeReceipts::default());
        let delivery = Arc::new(FakeDelivery::default());
        let eligibility = Arc::new(FakeEligibility::default());
        let generator = Arc::new(FakeGenerator::default());

        let flow = ReceiptIssuanceFlow::new(
            Collaborators {
                permissions: Arc::new(ClaimsPermissionAuthority),
                contributions: contributions.clone(),
                history: receipts.clone(),
                receipts: receipts.clone(),
                delivery: delivery.clone(),
                eligibility: eligibility.clone(),
                generator: generator.clone(),
            },
            files.clone(),
        );

        Self {
            contributions,
            receipts,
            delivery,
            eligibility,
            generator,
            files,
            sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(600))),
            flow: Arc::new(flow),
            dir,
        }
    }

    pub fn session(&self, id: &str) -> SessionScope {
        SessionScope::new(SessionId::from(id), self.sessions.clone())
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            flow: self.flow.clone(),
            sessions: self.sessions.clone(),
        }
    }

    /// Register an eligible, completed contribution.
    pub fn add_eligible(&self, id: i64) {
        self.contributions
            .records
            .lock()
            .insert(ContributionId(id), contribution(id));
        self.eligibility.eligible.lock().insert(ContributionId(id));
    }

    pub fn add_ineligible(&self, id: i64) {
        self.contributions
            .records
            .lock()
            .insert(ContributionId(id), contribution(id));
    }

    pub fn add_receipt(&self, receipt: Receipt) {
        let mut by_contribution = self.receipts.by_contribution.lock();
        for line in &receipt.contributions {
            by_contribution.insert(line.contribution_id, receipt.clone());
        }
    }

    pub fn receipt_history_unavailable(&self) {
        self.receipts.unavailable.store(true, Ordering::SeqCst);
    }

    pub fn prefer_email(&self, contact: ContactId, address: &str) {
        self.delivery.methods.lock().insert(
            contact,
            DeliveryMethod::Email {
                address: address.to_string(),
            },
        );
    }

    pub fn generator_returns(&self, response: Option<GeneratedReceipt>) {
        *self.generator.response.lock() = response;
    }

    pub fn print_document(&self, document: &[u8]) {
        self.generator_returns(Some(GeneratedReceipt {
            success: true,
            method: DeliveryMethodKind::Print,
            document: Some(document.to_vec()),
        }));
    }

    pub fn pending_file_count(&self) -> usize {
        std::fs::read_dir(self.dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
