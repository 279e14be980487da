use alloy::primitives::{address, Address, U256};
use async_trait::async_trait;
use batch_payout::{
    calls::{ContractCall, NativeCall},
    capabilities::{SponsorshipConfig, WalletCapabilities},
    chain::Session,
    error::{PayoutError, WalletError},
    orchestrator::PAYOUT_FAILED_MESSAGE,
    status::PayoutPhase,
    wallet::{SendCallsRequest, WriteContractsRequest},
    Asset, BatchId, BatchPayout, Notifier, PayoutConfig, PayoutOutcome, PayoutRow, PayoutStatus,
    Wallet,
};
use serde_json::json;
use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};
use tokio::sync::Notify;

const ACCOUNT: Address = address!("0x1111111111111111111111111111111111111111");
const ALICE: Address = address!("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa1");
const BOB: Address = address!("0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb2");
const USDC: Address = address!("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913");
const CHAIN_ID: u64 = 8453;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Native(Address),
    Token(Address, Address),
}

#[derive(Default)]
struct MockWallet {
    /// `None` makes `token_decimals` fail.
    decimals: Option<u8>,
    native_balance: U256,
    token_balance: U256,
    chain_id: Option<u64>,
    capabilities: Option<WalletCapabilities>,
    fail_submission: bool,
    /// Parks `send_calls` until notified.
    gate: Option<Arc<Notify>>,
    lookups: Mutex<Vec<Lookup>>,
    sent: Mutex<Vec<SendCallsRequest>>,
    written: Mutex<Vec<WriteContractsRequest>>,
}

impl MockWallet {
    fn new() -> Self {
        Self { decimals: Some(6), chain_id: Some(CHAIN_ID), ..Default::default() }
    }

    fn sponsored(mut self) -> Self {
        let advertised = json!({ "0x2105": { "paymasterService": { "supported": true } } });
        self.capabilities = Some(serde_json::from_value(advertised).unwrap());
        self
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn session(&self) -> Result<Session, WalletError> {
        Ok(Session::new(ACCOUNT, self.chain_id))
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, WalletError> {
        self.lookups.lock().unwrap().push(Lookup::Native(owner));
        Ok(self.native_balance)
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, WalletError> {
        self.lookups.lock().unwrap().push(Lookup::Token(token, owner));
        Ok(self.token_balance)
    }

    async fn token_decimals(&self, _token: Address) -> Result<u8, WalletError> {
        self.decimals.ok_or_else(|| WalletError::Rejected("decimals not loaded".into()))
    }

    async fn token_symbol(&self, _token: Address) -> Result<String, WalletError> {
        Ok("USDC".into())
    }

    async fn capabilities(&self, _account: Address) -> Result<WalletCapabilities, WalletError> {
        self.capabilities
            .clone()
            .ok_or_else(|| WalletError::Rejected("wallet_getCapabilities not supported".into()))
    }

    async fn send_calls(&self, request: SendCallsRequest) -> Result<BatchId, WalletError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let n = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(request);
            sent.len()
        };
        if self.fail_submission {
            return Err(WalletError::Rejected("user rejected".into()));
        }
        Ok(BatchId::new(format!("send-{n}")))
    }

    async fn write_contracts(
        &self,
        request: WriteContractsRequest,
    ) -> Result<BatchId, WalletError> {
        let n = {
            let mut written = self.written.lock().unwrap();
            written.push(request);
            written.len()
        };
        if self.fail_submission {
            return Err(WalletError::Rejected("user rejected".into()));
        }
        Ok(BatchId::new(format!("write-{n}")))
    }
}

#[derive(Default)]
struct CountingNotifier {
    failures: AtomicUsize,
    last: Mutex<Option<String>>,
}

impl Notifier for CountingNotifier {
    fn payout_failed(&self, message: &str) {
        self.failures.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(message.to_string());
    }
}

fn config() -> PayoutConfig {
    PayoutConfig::new("https://api.example.com".parse().unwrap())
}

fn paymaster() -> SponsorshipConfig {
    SponsorshipConfig::paymaster("https://api.example.com/paymaster".parse().unwrap())
}

fn setup(
    wallet: MockWallet,
) -> (BatchPayout<Arc<MockWallet>, Arc<CountingNotifier>>, Arc<MockWallet>, Arc<CountingNotifier>)
{
    let wallet = Arc::new(wallet);
    let notifier = Arc::new(CountingNotifier::default());
    (BatchPayout::with_notifier(wallet.clone(), &config(), notifier.clone()), wallet, notifier)
}

#[tokio::test]
async fn native_payout_goes_through_send_calls() {
    let (payout, wallet, notifier) = setup(MockWallet::new());
    let rows = [PayoutRow::new(ALICE.to_string(), "2.5"), PayoutRow::new(BOB.to_string(), "0.1")];

    let outcome = payout.payout(&rows, Asset::Native).await.unwrap();
    assert_eq!(outcome, PayoutOutcome::Submitted(BatchId::new("send-1")));

    let sent = wallet.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].calls,
        vec![
            NativeCall { to: ALICE, value: U256::from(2_500_000_000_000_000_000u128) },
            NativeCall { to: BOB, value: U256::from(100_000_000_000_000_000u128) },
        ]
    );
    assert!(sent[0].sponsorship.is_empty());
    assert!(wallet.written.lock().unwrap().is_empty());
    assert_eq!(notifier.failures.load(Ordering::SeqCst), 0);

    assert_eq!(
        payout.status(),
        PayoutStatus {
            phase: PayoutPhase::Resolved,
            is_pending: false,
            is_success: true,
            identifier: Some(BatchId::new("send-1")),
        }
    );
}

#[tokio::test]
async fn token_payout_goes_through_write_contracts() {
    let (payout, wallet, _) = setup(MockWallet::new());
    let rows = [PayoutRow::new(BOB.to_string(), "10")];

    let outcome = payout.payout(&rows, Asset::Token(USDC)).await.unwrap();
    assert_eq!(outcome.batch_id(), Some(&BatchId::new("write-1")));

    let written = wallet.written.lock().unwrap();
    assert_eq!(
        written[0].calls,
        vec![ContractCall { address: USDC, to: BOB, amount: U256::from(10_000_000) }]
    );
    assert_eq!(ContractCall::FUNCTION_NAME, "transfer");
    assert!(wallet.sent.lock().unwrap().is_empty());

    let status = payout.status();
    assert!(status.is_success && !status.is_pending);
}

#[tokio::test]
async fn supported_paymaster_is_attached_to_both_paths() {
    let (payout, wallet, _) = setup(MockWallet::new().sponsored());
    let rows = [PayoutRow::new(ALICE.to_string(), "1")];

    payout.payout(&rows, Asset::Native).await.unwrap();
    payout.payout(&rows, Asset::Token(USDC)).await.unwrap();

    assert_eq!(wallet.sent.lock().unwrap()[0].sponsorship, paymaster());
    assert_eq!(wallet.written.lock().unwrap()[0].sponsorship, paymaster());
}

#[tokio::test]
async fn capability_gaps_fail_open() {
    // no chain id
    let (payout, wallet, _) = setup(MockWallet { chain_id: None, ..MockWallet::new().sponsored() });
    payout.payout(&[PayoutRow::new(ALICE.to_string(), "1")], Asset::Native).await.unwrap();
    assert!(wallet.sent.lock().unwrap()[0].sponsorship.is_empty());

    // advertisement lookup fails
    let (payout, wallet, _) = setup(MockWallet::new());
    payout.payout(&[PayoutRow::new(ALICE.to_string(), "1")], Asset::Native).await.unwrap();
    assert!(wallet.sent.lock().unwrap()[0].sponsorship.is_empty());

    // active chain not advertised
    let (payout, wallet, _) =
        setup(MockWallet { chain_id: Some(1), ..MockWallet::new().sponsored() });
    payout.payout(&[PayoutRow::new(ALICE.to_string(), "1")], Asset::Native).await.unwrap();
    assert!(wallet.sent.lock().unwrap()[0].sponsorship.is_empty());
}

#[tokio::test]
async fn submission_failure_notifies_once() {
    for asset in [Asset::Native, Asset::Token(USDC)] {
        let (payout, wallet, notifier) =
            setup(MockWallet { fail_submission: true, ..MockWallet::new() });
        let rows = [PayoutRow::new(BOB.to_string(), "10")];

        let err = payout.payout(&rows, asset).await.unwrap_err();
        assert!(matches!(err, PayoutError::Submission(WalletError::Rejected(_))));

        // the rejection came from the path matching the asset
        let sent = wallet.sent.lock().unwrap().len();
        let written = wallet.written.lock().unwrap().len();
        assert_eq!((sent, written), if asset == Asset::Native { (1, 0) } else { (0, 1) });

        let status = payout.status();
        assert_eq!(status.phase, PayoutPhase::Failed);
        assert!(!status.is_success);
        assert!(!status.is_pending);
        assert_eq!(status.identifier, None);
        assert_eq!(notifier.failures.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.last.lock().unwrap().as_deref(), Some(PAYOUT_FAILED_MESSAGE));
    }
}

#[tokio::test]
async fn missing_decimals_is_not_ready() {
    let (payout, wallet, notifier) = setup(MockWallet { decimals: None, ..MockWallet::new() });
    let rows = [PayoutRow::new(BOB.to_string(), "10")];

    assert_eq!(payout.payout(&rows, Asset::Token(USDC)).await.unwrap(), PayoutOutcome::NotReady);
    assert!(wallet.written.lock().unwrap().is_empty());
    assert_eq!(notifier.failures.load(Ordering::SeqCst), 0);
    assert_eq!(payout.status(), PayoutStatus::default());

    // native precision never needs a lookup
    let outcome = payout.payout(&rows, Asset::Native).await.unwrap();
    assert!(matches!(outcome, PayoutOutcome::Submitted(_)));
}

#[tokio::test]
async fn invalid_rows_are_rejected_before_submission() {
    let (payout, wallet, notifier) = setup(MockWallet::new());
    let rows = [PayoutRow::new(ALICE.to_string(), "1"), PayoutRow::new(BOB.to_string(), "")];

    let err = payout.payout(&rows, Asset::Native).await.unwrap_err();
    assert!(matches!(err, PayoutError::InvalidRow { index: 1, .. }));
    assert!(matches!(payout.payout(&[], Asset::Native).await, Err(PayoutError::EmptyBatch)));

    assert!(wallet.sent.lock().unwrap().is_empty());
    assert_eq!(notifier.failures.load(Ordering::SeqCst), 0);
    assert_eq!(payout.status(), PayoutStatus::default());
}

#[tokio::test]
async fn large_amounts_are_scaled_exactly() {
    let (payout, wallet, _) = setup(MockWallet { decimals: Some(18), ..MockWallet::new() });
    let rows = [PayoutRow::new(BOB.to_string(), "123456789.123456789123456789")];

    payout.payout(&rows, Asset::Token(USDC)).await.unwrap();
    assert_eq!(
        wallet.written.lock().unwrap()[0].calls[0].amount,
        U256::from_str("123456789123456789123456789").unwrap()
    );
}

#[tokio::test]
async fn new_payout_supersedes_in_flight_one() {
    let gate = Arc::new(Notify::new());
    let (payout, wallet, _) = setup(MockWallet { gate: Some(gate.clone()), ..MockWallet::new() });
    let payout = Arc::new(payout);
    let mut watcher = payout.watch();

    let first = tokio::spawn({
        let payout = payout.clone();
        async move {
            let rows = vec![PayoutRow::new(ALICE.to_string(), "1")];
            let outcome = payout.payout(&rows, Asset::Native).await;
            outcome
        }
    });
    let mut status = watcher.current();
    while !status.is_pending {
        status = watcher.changed().await.unwrap();
    }
    assert_eq!(status.phase, PayoutPhase::Submitting);

    let second = payout.payout(&[PayoutRow::new(BOB.to_string(), "5")], Asset::Token(USDC)).await;
    assert_eq!(second.unwrap(), PayoutOutcome::Submitted(BatchId::new("write-1")));

    gate.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first, PayoutOutcome::Submitted(BatchId::new("send-1")));
    assert_eq!(wallet.sent.lock().unwrap().len(), 1);

    // the older batch resolved last but no longer drives the observed status
    let status = payout.status();
    assert!(status.is_success && !status.is_pending);
    assert_eq!(status.identifier, Some(BatchId::new("write-1")));
}

#[tokio::test]
async fn balance_source_follows_asset_kind() {
    let wallet = MockWallet {
        native_balance: U256::from(1_500_000_000_000_000_000u128),
        token_balance: U256::from(2_250_000),
        ..MockWallet::new()
    };

    assert_eq!(Asset::Native.display_balance(&wallet, ACCOUNT).await, 1.5);
    assert_eq!(*wallet.lookups.lock().unwrap(), vec![Lookup::Native(ACCOUNT)]);

    wallet.lookups.lock().unwrap().clear();
    assert_eq!(Asset::Token(USDC).display_balance(&wallet, ACCOUNT).await, 2.25);
    assert_eq!(*wallet.lookups.lock().unwrap(), vec![Lookup::Token(USDC, ACCOUNT)]);

    assert_eq!(Asset::Native.symbol(&wallet).await, "ETH");
    assert_eq!(Asset::Token(USDC).symbol(&wallet).await, "USDC");
}

#[tokio::test]
async fn balance_is_zero_while_decimals_are_missing() {
    let wallet =
        MockWallet { decimals: None, token_balance: U256::from(2_250_000), ..MockWallet::new() };
    assert_eq!(Asset::Token(USDC).display_balance(&wallet, ACCOUNT).await, 0.0);
}
