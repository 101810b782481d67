//! End-to-end donation flow tests against fake capabilities.
//!
//! Every network-bound step is replaced by a counting fake, so each
//! scenario can assert not just the terminal outcome but exactly which
//! calls were (and were not) made.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, Semaphore};

use async_trait::async_trait;
use stellar_xdr::curr::{
    LedgerFootprint, OperationBody, ScVal, SorobanResources, SorobanTransactionData,
    SorobanTransactionDataExt, TransactionEnvelope, TransactionExt, VecM,
};

use novafund_app::{
    CallSimulator, CampaignState, DonationOrchestrator, EnvelopeSigner, FailureKind,
    GatewayError, LedgerGateway, SignerError, WatcherCommand,
};
use novafund_app::config::{CampaignSettings, DonationSettings};
use novafund_app::watcher::fetch_campaign_state;
use novafund_common::NetworkId;
use novafund_crypto::strkey::{encode_account_id, encode_contract_id};
use novafund_horizon::Account;
use novafund_rpc::{SimulationResult, SimulationSuccess, SubmissionOutcome};
use novafund_tx::attach_signature;
use novafund_tx::operations::i128_parts;

fn donor() -> String {
    encode_account_id(&[1u8; 32])
}

fn campaign_settings() -> CampaignSettings {
    CampaignSettings {
        contract_id: encode_contract_id(&[2u8; 32]),
        recipient: encode_account_id(&[3u8; 32]),
        fallback_source: encode_account_id(&[3u8; 32]),
        poll_interval_secs: 3600,
    }
}

fn donation_settings() -> DonationSettings {
    DonationSettings {
        base_fee: 100,
        tx_timeout_secs: 30,
        // No settling wait in tests.
        settle_delay_ms: 0,
    }
}

fn sample_tx_data() -> SorobanTransactionData {
    SorobanTransactionData {
        ext: SorobanTransactionDataExt::V0,
        resources: SorobanResources {
            footprint: LedgerFootprint {
                read_only: VecM::default(),
                read_write: VecM::default(),
            },
            instructions: 1_000,
            disk_read_bytes: 100,
            write_bytes: 50,
        },
        resource_fee: 500,
    }
}

fn envelope_sequence(envelope: &TransactionEnvelope) -> i64 {
    let TransactionEnvelope::Tx(v1) = envelope else {
        panic!("expected v1 envelope");
    };
    v1.tx.seq_num.0
}

/// Ledger fake: hands out the current sequence number and, on submit,
/// advances it to the submitted envelope's sequence (as inclusion would).
struct FakeLedger {
    sequence: Mutex<i64>,
    load_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    submitted: Mutex<Vec<TransactionEnvelope>>,
    reject_submissions: bool,
}

impl FakeLedger {
    fn new(sequence: i64) -> Self {
        Self {
            sequence: Mutex::new(sequence),
            load_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
            reject_submissions: false,
        }
    }

    fn rejecting(sequence: i64) -> Self {
        Self {
            reject_submissions: true,
            ..Self::new(sequence)
        }
    }
}

#[async_trait]
impl LedgerGateway for FakeLedger {
    async fn load_account(&self, address: &str) -> Result<Account, GatewayError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Account {
            account_id: address.to_string(),
            sequence: *self.sequence.lock(),
            balances: Vec::new(),
        })
    }

    async fn submit(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SubmissionOutcome, GatewayError> {
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_submissions {
            return Ok(SubmissionOutcome::Rejected {
                reason: "ERROR".to_string(),
                diagnostic: None,
            });
        }
        *self.sequence.lock() = envelope_sequence(envelope);
        self.submitted.lock().push(envelope.clone());
        Ok(SubmissionOutcome::Pending {
            hash: format!("hash-{n}"),
        })
    }
}

/// Simulator fake with a switchable response.
struct FakeSimulator {
    calls: AtomicUsize,
    response: Mutex<SimResponse>,
}

#[derive(Clone)]
enum SimResponse {
    Success(Option<ScVal>),
    Failure(String),
}

impl FakeSimulator {
    fn succeeding() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Mutex::new(SimResponse::Success(None)),
        }
    }

    fn failing(diagnostic: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: Mutex::new(SimResponse::Failure(diagnostic.to_string())),
        }
    }

    fn set_response(&self, response: SimResponse) {
        *self.response.lock() = response;
    }
}

#[async_trait]
impl CallSimulator for FakeSimulator {
    async fn simulate(
        &self,
        _envelope: &TransactionEnvelope,
    ) -> Result<SimulationResult, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.response.lock().clone() {
            SimResponse::Success(return_value) => {
                Ok(SimulationResult::Success(SimulationSuccess {
                    return_value,
                    transaction_data: sample_tx_data(),
                    min_resource_fee: 500,
                    auth: Vec::new(),
                    latest_ledger: 1,
                }))
            }
            SimResponse::Failure(diagnostic) => Ok(SimulationResult::Failure { diagnostic }),
        }
    }
}

/// Signer fake: appends a dummy signature, optionally refusing, and
/// optionally gated on a semaphore so tests can hold a session open.
struct FakeSigner {
    sign_calls: AtomicUsize,
    refuse: bool,
    gate: Option<Arc<Semaphore>>,
}

impl FakeSigner {
    fn signing() -> Self {
        Self {
            sign_calls: AtomicUsize::new(0),
            refuse: false,
            gate: None,
        }
    }

    fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::signing()
        }
    }

    fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::signing()
        }
    }
}

#[async_trait]
impl EnvelopeSigner for FakeSigner {
    fn address(&self) -> String {
        donor()
    }

    async fn sign(
        &self,
        envelope: &TransactionEnvelope,
        _network: &NetworkId,
    ) -> Result<TransactionEnvelope, SignerError> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.map_err(|_| {
                SignerError::Failed("gate closed".to_string())
            })?;
            permit.forget();
        }
        if self.refuse {
            return Err(SignerError::Refused("user dismissed the dialog".to_string()));
        }
        attach_signature(envelope, [0u8; 4], [0u8; 64])
            .map_err(|e| SignerError::Failed(e.to_string()))
    }
}

type Orchestrator = DonationOrchestrator<FakeLedger, FakeSimulator, FakeSigner>;

fn orchestrator(
    ledger: Arc<FakeLedger>,
    simulator: Arc<FakeSimulator>,
    signer: Arc<FakeSigner>,
) -> Orchestrator {
    DonationOrchestrator::new(
        ledger,
        simulator,
        signer,
        NetworkId::testnet(),
        campaign_settings(),
        donation_settings(),
    )
}

#[tokio::test]
async fn test_successful_donation_uses_fresh_sequences() {
    let ledger = Arc::new(FakeLedger::new(100));
    let simulator = Arc::new(FakeSimulator::succeeding());
    let signer = Arc::new(FakeSigner::signing());
    let orchestrator = orchestrator(ledger.clone(), simulator.clone(), signer.clone());

    let receipt = orchestrator.donate(&donor(), "10").await.unwrap();
    assert_eq!(receipt.payment_hash, "hash-0");
    assert_eq!(receipt.record_hash, "hash-1");

    // The account was reloaded between the legs, and each envelope
    // consumed its own sequence number.
    assert_eq!(ledger.load_calls.load(Ordering::SeqCst), 2);
    let submitted = ledger.submitted.lock();
    assert_eq!(submitted.len(), 2);
    assert_eq!(envelope_sequence(&submitted[0]), 101);
    assert_eq!(envelope_sequence(&submitted[1]), 102);

    assert_eq!(signer.sign_calls.load(Ordering::SeqCst), 2);
    assert_eq!(simulator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_successful_donation_submits_payment_then_assembled_record() {
    let ledger = Arc::new(FakeLedger::new(7));
    let simulator = Arc::new(FakeSimulator::succeeding());
    let signer = Arc::new(FakeSigner::signing());
    let orchestrator = orchestrator(ledger.clone(), simulator, signer);

    orchestrator.donate(&donor(), "10.5").await.unwrap();

    let submitted = ledger.submitted.lock();
    let TransactionEnvelope::Tx(payment) = &submitted[0] else {
        panic!("expected v1 envelope");
    };
    let TransactionEnvelope::Tx(record) = &submitted[1] else {
        panic!("expected v1 envelope");
    };

    // Leg one: a native payment of the full fractional amount.
    let OperationBody::Payment(payment_op) = &payment.tx.operations[0].body else {
        panic!("first submission must be the payment");
    };
    assert_eq!(payment_op.amount, 105_000_000);
    assert!(matches!(payment.tx.ext, TransactionExt::V0));

    // Leg two: the contract call, carrying the truncated whole-lumen
    // amount and the assembled resource data and fee.
    let OperationBody::InvokeHostFunction(_) = &record.tx.operations[0].body else {
        panic!("second submission must be the contract call");
    };
    assert!(matches!(record.tx.ext, TransactionExt::V1(_)));
    assert_eq!(record.tx.fee, 100 + 500);
    assert_eq!(record.signatures.len(), 1);
}

#[tokio::test]
async fn test_success_triggers_exactly_one_refresh() {
    let (refresh_tx, mut refresh_rx) = mpsc::channel(8);
    let ledger = Arc::new(FakeLedger::new(1));
    let simulator = Arc::new(FakeSimulator::succeeding());
    let signer = Arc::new(FakeSigner::signing());
    let orchestrator = DonationOrchestrator::new(
        ledger,
        simulator,
        signer,
        NetworkId::testnet(),
        campaign_settings(),
        donation_settings(),
    )
    .with_refresh(refresh_tx);

    orchestrator.donate(&donor(), "5").await.unwrap();
    drop(orchestrator);

    let mut refreshes = 0;
    while let Some(command) = refresh_rx.recv().await {
        assert!(matches!(command, WatcherCommand::Refresh));
        refreshes += 1;
    }
    assert_eq!(refreshes, 1);
}

#[tokio::test]
async fn test_invalid_amounts_fail_before_any_network_call() {
    for amount in ["0", "-5", "abc", "", "1.2.3"] {
        let ledger = Arc::new(FakeLedger::new(1));
        let simulator = Arc::new(FakeSimulator::succeeding());
        let signer = Arc::new(FakeSigner::signing());
        let orchestrator = orchestrator(ledger.clone(), simulator.clone(), signer.clone());

        let error = orchestrator.donate(&donor(), amount).await.unwrap_err();
        assert_eq!(error.kind, FailureKind::InvalidInput, "amount {amount:?}");
        assert!(!error.partial);

        assert_eq!(ledger.load_calls.load(Ordering::SeqCst), 0);
        assert_eq!(ledger.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(signer.sign_calls.load(Ordering::SeqCst), 0);
        assert_eq!(simulator.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_invalid_donor_address_fails_before_any_network_call() {
    let ledger = Arc::new(FakeLedger::new(1));
    let simulator = Arc::new(FakeSimulator::succeeding());
    let signer = Arc::new(FakeSigner::signing());
    let orchestrator = orchestrator(ledger.clone(), simulator.clone(), signer.clone());

    let error = orchestrator
        .donate("not-an-address", "10")
        .await
        .unwrap_err();
    assert_eq!(error.kind, FailureKind::InvalidInput);
    assert_eq!(ledger.load_calls.load(Ordering::SeqCst), 0);
    assert_eq!(signer.sign_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_payment_signature_refusal_means_no_submission() {
    let ledger = Arc::new(FakeLedger::new(1));
    let simulator = Arc::new(FakeSimulator::succeeding());
    let signer = Arc::new(FakeSigner::refusing());
    let orchestrator = orchestrator(ledger.clone(), simulator, signer);

    let error = orchestrator.donate(&donor(), "10").await.unwrap_err();
    assert_eq!(error.kind, FailureKind::SignatureDenied);
    assert!(!error.partial);
    assert_eq!(ledger.submit_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_payment_rejection_is_total_failure() {
    let ledger = Arc::new(FakeLedger::rejecting(1));
    let simulator = Arc::new(FakeSimulator::succeeding());
    let signer = Arc::new(FakeSigner::signing());
    let orchestrator = orchestrator(ledger.clone(), simulator, signer);

    let error = orchestrator.donate(&donor(), "10").await.unwrap_err();
    assert_eq!(error.kind, FailureKind::PaymentRejected);
    assert!(!error.partial);
    assert_eq!(ledger.submit_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_record_simulation_failure_is_partial_with_no_compensation() {
    let ledger = Arc::new(FakeLedger::new(50));
    let simulator = Arc::new(FakeSimulator::failing("contract panicked: Amount must be positive"));
    let signer = Arc::new(FakeSigner::signing());
    let orchestrator = orchestrator(ledger.clone(), simulator.clone(), signer.clone());

    let mut feed = orchestrator.status_feed();
    let error = orchestrator.donate(&donor(), "10").await.unwrap_err();

    assert_eq!(error.kind, FailureKind::SimulationFailed);
    assert!(error.partial, "payment already committed");
    assert!(error.message.contains("Amount must be positive"));
    assert!(error.to_string().starts_with("Payment sent, but"));

    // Funds moved: exactly the payment was submitted, and nothing was
    // submitted afterwards to reverse it.
    let submitted = ledger.submitted.lock();
    assert_eq!(submitted.len(), 1);
    let TransactionEnvelope::Tx(v1) = &submitted[0] else {
        panic!("expected v1 envelope");
    };
    assert!(matches!(
        v1.tx.operations[0].body,
        OperationBody::Payment(_)
    ));
    // Record leg never reached the signer a second time.
    assert_eq!(signer.sign_calls.load(Ordering::SeqCst), 1);

    // The status line carries the partial-failure wording.
    let line = feed.borrow_and_update().clone();
    assert!(line.starts_with("Payment sent, but"), "status: {line}");
}

#[tokio::test]
async fn test_second_donate_fails_session_in_flight() {
    let gate = Arc::new(Semaphore::new(0));
    let ledger = Arc::new(FakeLedger::new(10));
    let simulator = Arc::new(FakeSimulator::succeeding());
    let signer = Arc::new(FakeSigner::gated(gate.clone()));
    let orchestrator = Arc::new(orchestrator(ledger.clone(), simulator, signer));

    let first = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.donate(&donor(), "10").await })
    };

    // Wait until the first session is parked at the signer.
    let mut feed = orchestrator.status_feed();
    feed.wait_for(|line| line.contains("Process 1/2"))
        .await
        .unwrap();

    let error = orchestrator.donate(&donor(), "5").await.unwrap_err();
    assert_eq!(error.kind, FailureKind::SessionInFlight);

    // Release the gate; the in-flight session is unaffected and
    // completes normally.
    gate.add_permits(8);
    let receipt = first.await.unwrap().unwrap();
    assert_eq!(receipt.payment_hash, "hash-0");
    assert_eq!(ledger.submit_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_simulation_is_idempotent_across_calls() {
    let simulator = FakeSimulator::succeeding();
    let envelope_source = donor();
    let op = novafund_tx::operations::get_state_invocation(&campaign_settings().contract_id)
        .unwrap();
    let envelope =
        novafund_tx::build_envelope(&envelope_source, 1, op, 100, 30).unwrap();

    let first = simulator.simulate(&envelope).await.unwrap();
    let second = simulator.simulate(&envelope).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(simulator.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_fetch_campaign_state_decodes_snapshot() {
    let ledger = Arc::new(FakeLedger::new(5));
    let simulator = Arc::new(FakeSimulator::succeeding());
    let state_tuple = ScVal::Vec(Some(stellar_xdr::curr::ScVec(
        vec![
            ScVal::I128(i128_parts(1_000)),
            ScVal::I128(i128_parts(250)),
            ScVal::U64(1_900_000_000),
            ScVal::U32(0),
        ]
        .try_into()
        .unwrap(),
    )));
    simulator.set_response(SimResponse::Success(Some(state_tuple)));

    let state = fetch_campaign_state(
        ledger.as_ref(),
        simulator.as_ref(),
        &campaign_settings(),
        &donation_settings(),
        None,
    )
    .await
    .unwrap();

    assert_eq!(
        state,
        CampaignState {
            target: 1_000,
            raised: 250,
            deadline: 1_900_000_000,
            phase: novafund_app::CampaignPhase::Running,
        }
    );
    assert_eq!(state.progress(), 25.0);
    // The fallback source was used: no wallet was connected.
    assert_eq!(ledger.load_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_watcher_keeps_last_snapshot_on_failure_and_shuts_down() {
    use novafund_app::CampaignWatcher;

    let ledger = Arc::new(FakeLedger::new(5));
    let simulator = Arc::new(FakeSimulator::succeeding());
    let state_tuple = ScVal::Vec(Some(stellar_xdr::curr::ScVec(
        vec![ScVal::I128(i128_parts(100)), ScVal::I128(i128_parts(40))]
            .try_into()
            .unwrap(),
    )));
    simulator.set_response(SimResponse::Success(Some(state_tuple)));

    let watcher = CampaignWatcher::new(
        ledger,
        simulator.clone(),
        campaign_settings(),
        donation_settings(),
    );
    let (handle, mut state_rx, task) = watcher.spawn();

    // The first poll runs immediately on spawn.
    state_rx.wait_for(|state| state.is_some()).await.unwrap();
    let first = (*state_rx.borrow_and_update()).unwrap();
    assert_eq!(first.raised, 40);

    // Subsequent failures are soft: the published snapshot stands.
    simulator.set_response(SimResponse::Failure("rpc down".to_string()));
    handle.refresh().await;
    handle.shutdown().await;
    task.await.unwrap();

    assert_eq!((*state_rx.borrow()).unwrap().raised, 40);
    // The failed refresh did reach the simulator.
    assert!(simulator.calls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_fetch_campaign_state_fails_softly_on_simulation_failure() {
    let ledger = Arc::new(FakeLedger::new(5));
    let simulator = Arc::new(FakeSimulator::failing("boom"));

    let result = fetch_campaign_state(
        ledger.as_ref(),
        simulator.as_ref(),
        &campaign_settings(),
        &donation_settings(),
        None,
    )
    .await;
    assert!(result.is_err());
}
