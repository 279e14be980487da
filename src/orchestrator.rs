//! Batch payout orchestration.
use crate::{
    asset::Asset,
    calls::{scale_rows, CallBatch, PayoutRow},
    capabilities::SponsorshipConfig,
    config::PayoutConfig,
    error::PayoutError,
    status::{PayoutPhase, PayoutStatus, StatusTracker, StatusWatcher},
    wallet::{BatchId, LogNotifier, Notifier, SendCallsRequest, Wallet, WriteContractsRequest},
};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Message passed to the [`Notifier`] when a submission fails.
pub const PAYOUT_FAILED_MESSAGE: &str = "Payout failed!";

/// Result of a payout invocation that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutOutcome {
    /// The asset precision is not available yet; nothing was built or submitted.
    NotReady,
    /// The batch was accepted by the wallet.
    Submitted(BatchId),
}

impl PayoutOutcome {
    pub fn batch_id(&self) -> Option<&BatchId> {
        match self {
            Self::NotReady => None,
            Self::Submitted(id) => Some(id),
        }
    }
}

/// Pays a list of recipients in a single batch through a [`Wallet`].
///
/// One instance tracks one payout at a time. Starting a new payout while another is in flight
/// supersedes the tracking of the older one; the older submission itself is not cancelled.
#[derive(Debug)]
pub struct BatchPayout<W, N = LogNotifier> {
    wallet: W,
    notifier: N,
    paymaster_url: Url,
    tracker: StatusTracker,
}

impl<W: Wallet> BatchPayout<W> {
    pub fn new(wallet: W, config: &PayoutConfig) -> Self {
        Self::with_notifier(wallet, config, LogNotifier)
    }
}

impl<W: Wallet, N: Notifier> BatchPayout<W, N> {
    pub fn with_notifier(wallet: W, config: &PayoutConfig, notifier: N) -> Self {
        Self {
            wallet,
            notifier,
            paymaster_url: config.paymaster_url(),
            tracker: StatusTracker::new(),
        }
    }

    /// Merged pending/success/identifier view of the latest payout.
    pub fn status(&self) -> PayoutStatus {
        self.tracker.status()
    }

    /// Observer of status changes.
    pub fn watch(&self) -> StatusWatcher {
        self.tracker.subscribe()
    }

    /// Pays out `rows` in `asset`.
    ///
    /// Rows are validated before anything is submitted. A wallet rejection is logged, reported
    /// once to the notifier and returned as [`PayoutError::Submission`].
    #[instrument(skip_all, fields(asset = %asset, rows = rows.len()))]
    pub async fn payout(
        &self,
        rows: &[PayoutRow],
        asset: Asset,
    ) -> Result<PayoutOutcome, PayoutError> {
        let invocation = self.tracker.begin();

        let Some(decimals) = asset.decimals(&self.wallet).await else {
            debug!("asset decimals unavailable, not building calls");
            self.tracker.set_phase(invocation, PayoutPhase::Idle);
            return Ok(PayoutOutcome::NotReady);
        };

        let transfers = match scale_rows(rows, decimals) {
            Ok(transfers) => transfers,
            Err(err) => {
                self.tracker.set_phase(invocation, PayoutPhase::Idle);
                return Err(err);
            }
        };
        let batch = CallBatch::build(&asset, &transfers);
        debug!(calls = batch.len(), decimals, "built payout batch");

        self.tracker.set_phase(invocation, PayoutPhase::AwaitingCapability);
        let sponsorship = self.sponsorship().await;

        let mechanism = batch.mechanism();
        self.tracker.start(invocation, mechanism);
        let result = match batch {
            CallBatch::Native(calls) => {
                self.wallet.send_calls(SendCallsRequest { calls, sponsorship }).await
            }
            CallBatch::Token(calls) => {
                self.wallet.write_contracts(WriteContractsRequest { calls, sponsorship }).await
            }
        };

        match result {
            Ok(id) => {
                info!(%id, ?mechanism, "payout batch submitted");
                self.tracker.resolve(invocation, mechanism, id.clone());
                Ok(PayoutOutcome::Submitted(id))
            }
            Err(err) => {
                error!(%err, ?mechanism, "payout submission failed");
                self.tracker.fail(invocation, mechanism);
                self.notifier.payout_failed(PAYOUT_FAILED_MESSAGE);
                Err(PayoutError::Submission(err))
            }
        }
    }

    /// Sponsorship for the active chain. Any lookup failure means no sponsorship.
    async fn sponsorship(&self) -> SponsorshipConfig {
        let session = match self.wallet.session().await {
            Ok(session) => session,
            Err(err) => {
                warn!(%err, "no wallet session, submitting without sponsorship");
                return SponsorshipConfig::default();
            }
        };
        let capabilities = match self.wallet.capabilities(session.account).await {
            Ok(capabilities) => Some(capabilities),
            Err(err) => {
                warn!(%err, account = %session.account, "failed to fetch wallet capabilities");
                None
            }
        };

        let sponsorship = SponsorshipConfig::negotiate(
            capabilities.as_ref(),
            session.chain_id,
            &self.paymaster_url,
        );
        debug!(
            sponsored = !sponsorship.is_empty(),
            chain_id = ?session.chain_id,
            "negotiated sponsorship"
        );
        sponsorship
    }
}
