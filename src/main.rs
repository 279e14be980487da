use std::path::PathBuf;

use alloy::{
    network::EthereumWallet,
    primitives::Address,
    providers::ProviderBuilder,
    signers::local::PrivateKeySigner,
};
use batch_payout::{calls::PayoutRow, provider::ProviderWallet, Asset, BatchPayout, PayoutConfig};
use clap::Parser;
use eyre::{eyre, Context};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

/// Pays out a list of recipients in a single batch.
#[derive(Debug, Parser)]
#[command(author, about = "Batch payout", long_about = None)]
struct Args {
    /// The RPC endpoint of an EIP-5792 capable node or wallet.
    #[arg(long, value_name = "RPC_ENDPOINT")]
    rpc_url: Url,
    /// The secret key of the paying account.
    #[arg(long, value_name = "SECRET_KEY", env = "PAYOUT_PRIVATE_KEY")]
    private_key: String,
    /// The configuration file.
    #[arg(long, value_name = "CONFIG", env = "PAYOUT_CONFIG")]
    config: Option<PathBuf>,
    /// Backend base URL hosting the paymaster proxy. Overrides the configuration file.
    #[arg(long, value_name = "URL", env = "PAYOUT_BACKEND_URL")]
    backend_url: Option<Url>,
    /// Token to pay in, as a configured symbol or a contract address.
    #[arg(long, value_name = "TOKEN", default_value = "ETH")]
    token: String,
    /// A payout row, `ADDRESS:AMOUNT`. Can be repeated.
    #[arg(long = "row", value_name = "ADDRESS:AMOUNT")]
    rows: Vec<PayoutRow>,
    /// A file with one `ADDRESS,AMOUNT` row per line.
    #[arg(long, value_name = "FILE")]
    rows_file: Option<PathBuf>,
    /// Only print the account balance in the selected token.
    #[arg(long)]
    balance: bool,
}

impl Args {
    fn load_config(&self) -> eyre::Result<PayoutConfig> {
        let config = match &self.config {
            Some(path) => PayoutConfig::load_from_file(path)?,
            None => PayoutConfig::new(
                self.backend_url
                    .clone()
                    .ok_or_else(|| eyre!("either --config or --backend-url is required"))?,
            ),
        };
        Ok(match &self.backend_url {
            Some(url) => PayoutConfig { backend_url: url.clone(), ..config },
            None => config,
        })
    }

    fn asset(&self, config: &PayoutConfig) -> eyre::Result<Asset> {
        if let Some(asset) = config.asset_by_symbol(&self.token) {
            return Ok(asset);
        }
        let address = self
            .token
            .parse::<Address>()
            .wrap_err_with(|| format!("unknown token: {}", self.token))?;
        Ok(Asset::from(address))
    }

    fn load_rows(&self) -> eyre::Result<Vec<PayoutRow>> {
        let mut rows = self.rows.clone();
        if let Some(path) = &self.rows_file {
            let content = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read rows file: {}", path.display()))?;
            for (line_no, line) in content.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let row = line
                    .parse()
                    .wrap_err_with(|| format!("{}:{}", path.display(), line_no + 1))?;
                rows.push(row);
            }
        }
        Ok(rows)
    }

    async fn run(self) -> eyre::Result<()> {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .init();

        let config = self.load_config()?;
        let asset = self.asset(&config)?;

        let signer: PrivateKeySigner =
            self.private_key.parse().wrap_err("failed to parse private key")?;
        let account = signer.address();
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(EthereumWallet::from(signer))
            .on_http(self.rpc_url.clone());
        let wallet = ProviderWallet::new(provider, account);

        if self.balance {
            let balance = asset.display_balance(&wallet, account).await;
            let symbol = asset.symbol(&wallet).await;
            println!("{balance} {symbol}");
            return Ok(());
        }

        let rows = self.load_rows()?;
        info!(%account, %asset, rows = rows.len(), "submitting payout");

        let payout = BatchPayout::new(wallet, &config);
        let outcome = payout.payout(&rows, asset).await?;
        let id = outcome
            .batch_id()
            .ok_or_else(|| eyre!("token decimals unavailable for {asset}"))?;
        println!("{id}");

        Ok(())
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    Args::parse().run().await
}
