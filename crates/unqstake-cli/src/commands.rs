//! Subcommand implementations.
//!
//! The CLI only reads chain state. Staking calls are validated and shown,
//! never signed.

use std::path::PathBuf;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use unqstake_chain::{
    BalanceProvider, Endpoints, HttpIndexer, SdkClient, StakingCall, explorer_url, fetch_history,
};
use unqstake_core::config::{self, AppConfig};
use unqstake_core::prefs::RememberedWallet;
use unqstake_core::validation::{self, AmountAction, ValidationContext};
use unqstake_core::{
    AppState, Balance, HistoryKind, MemoryPreferenceStore, Network, PreferenceStore, Preferences,
    SqlitePreferenceStore, StakeTab, address, amount, export, normalize_address,
};

use crate::output;

/// How `format` prints an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatStyle {
    Display(u8),
    Full,
    Trimmed,
}

#[derive(Debug, Clone)]
pub struct HistoryOptions {
    pub kind: HistoryKind,
    pub page: usize,
    pub page_size: Option<usize>,
    pub links: bool,
    pub csv: Option<Option<PathBuf>>,
}

fn open_preferences() -> Preferences<Box<dyn PreferenceStore>> {
    let store: Box<dyn PreferenceStore> = match config::get_preferences_db_path()
        .map_err(|e| e.to_string())
        .and_then(|path| SqlitePreferenceStore::open(&path).map_err(|e| e.to_string()))
    {
        Ok(store) => {
            if let Err(e) = store.purge_expired() {
                tracing::debug!("Failed to purge expired preferences: {}", e);
            }
            Box::new(store)
        }
        Err(e) => {
            tracing::warn!("Preferences not persisted: {}", e);
            Box::new(MemoryPreferenceStore::new())
        }
    };
    Preferences::new(store)
}

/// Resolved network, endpoints, stored settings and session state.
pub struct Session {
    state: AppState,
    endpoints: Endpoints,
    config: AppConfig,
    prefs: Preferences<Box<dyn PreferenceStore>>,
}

impl Session {
    /// Resolve the network (flag, then remembered token, then config) and
    /// its endpoints (flag, then config when it names the same network).
    pub fn open(
        network: Option<Network>,
        sdk_url: Option<String>,
        indexer_url: Option<String>,
    ) -> Self {
        let config = config::load_config().unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        });
        let prefs = open_preferences();

        let remembered = prefs.network().unwrap_or_else(|e| {
            tracing::warn!("Failed to read remembered network: {}", e);
            None
        });
        let network = network.or(remembered).unwrap_or(config.network);

        let (config_sdk, config_indexer) = if config.network == network {
            (config.sdk_url.clone(), config.indexer_url.clone())
        } else {
            (None, None)
        };
        let endpoints = Endpoints::for_network(network)
            .with_sdk_url(sdk_url.or(config_sdk))
            .with_indexer_url(indexer_url.or(config_indexer));

        Self {
            state: AppState::new(network),
            endpoints,
            config,
            prefs,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn network(&self) -> Network {
        self.state.network()
    }

    fn decimals(&self, decimals: Option<u8>) -> u8 {
        decimals.unwrap_or(self.network().token_decimals())
    }

    /// Pick the account to work with and remember it for next time.
    fn select_account(&mut self, address: Option<String>) -> Result<String> {
        let remembered = self.prefs.wallet().unwrap_or_else(|e| {
            tracing::warn!("Failed to read remembered wallet: {}", e);
            None
        });

        let (address, wallet_name) = match (address, remembered) {
            (Some(address), Some(wallet)) if address::same_account(&address, &wallet.address) => {
                (address, wallet.wallet_name)
            }
            (Some(address), _) => (address, None),
            (None, Some(RememberedWallet {
                address,
                wallet_name,
            })) => (address, wallet_name),
            (None, None) => match self.config.last_account.clone() {
                Some(address) => (address, None),
                None => {
                    return Err(eyre!(
                        "No account given and none remembered. Pass an address."
                    ));
                }
            },
        };

        if normalize_address(&address).is_none() {
            return Err(eyre!("Invalid address format: {}", address));
        }

        self.state.select_account(address.clone(), wallet_name.clone());
        self.remember(&address, wallet_name.as_deref());
        Ok(address)
    }

    fn remember(&mut self, address: &str, wallet_name: Option<&str>) {
        let network = self.network();
        if let Err(e) = self
            .prefs
            .remember_wallet(address, wallet_name)
            .and_then(|()| self.prefs.remember_network(network))
        {
            tracing::warn!("Failed to remember account: {}", e);
        }

        if self.config.network != network || self.config.last_account.as_deref() != Some(address) {
            self.config.network = network;
            self.config.last_account = Some(address.to_string());
            if let Err(e) = config::save_config(&self.config) {
                tracing::warn!("Failed to save config: {}", e);
            }
        }
    }

    fn sdk(&self) -> Result<SdkClient> {
        Ok(SdkClient::new(
            self.endpoints.sdk_url.clone(),
            self.network(),
            self.endpoints.request_timeout,
        )?)
    }

    async fn load_balances(&mut self, address: &str) -> Result<()> {
        let sdk = self.sdk()?;
        let (balances, stakes) = tokio::join!(sdk.balances(address), sdk.stakes_per_account(address));
        self.state.set_balances(balances?);
        match stakes {
            Ok(count) => self.state.set_stakes_per_account(count),
            Err(e) => tracing::warn!("Failed to fetch stake count for {}: {}", address, e),
        }
        Ok(())
    }

    // ==================== Amounts ====================

    pub fn format(&self, raw: &str, decimals: Option<u8>, style: FormatStyle) {
        let decimals = self.decimals(decimals);
        let places = match style {
            FormatStyle::Display(places) => places,
            FormatStyle::Full | FormatStyle::Trimmed => decimals,
        };
        let formatted = amount::format_raw(raw, decimals, places).unwrap_or_else(|| {
            tracing::warn!("Unparseable raw amount {:?}, showing 0", raw);
            amount::format_display(Balance::zero(), decimals, places)
        });
        let text = match style {
            FormatStyle::Display(_) => formatted.label().to_string(),
            FormatStyle::Full => formatted.full_precision,
            FormatStyle::Trimmed => amount::trim_fraction(&formatted.full_precision),
        };
        println!("{}", text);
    }

    pub fn to_integer(&self, input: &str, decimals: Option<u8>) -> Result<()> {
        println!("{}", amount::to_integer(input, self.decimals(decimals))?);
        Ok(())
    }

    // ==================== Account ====================

    pub async fn balance(&mut self, address: Option<String>) -> Result<()> {
        let address = self.select_account(address)?;
        self.load_balances(&address).await?;

        let Some(balances) = self.state.balances() else {
            return Err(eyre!("No balances for {}", address));
        };
        print!(
            "{}",
            output::balance_report(&address, self.network(), balances, self.state.stakes_left())
        );
        Ok(())
    }

    pub fn forget(&mut self) -> Result<()> {
        self.prefs
            .forget_wallet()
            .map_err(|e| eyre!("Failed to forget wallet: {}", e))?;
        self.state.disconnect();
        if self.config.last_account.take().is_some() {
            config::save_config(&self.config)?;
        }
        println!("Forgot remembered account");
        Ok(())
    }

    // ==================== Staking ====================

    /// Validate an amount. Returns whether it is valid.
    pub async fn validate(
        &mut self,
        input: &str,
        unstake: bool,
        address: Option<String>,
        ceiling: Option<String>,
    ) -> Result<bool> {
        let tab = if unstake {
            StakeTab::Unstake
        } else {
            StakeTab::Stake
        };
        self.state.set_active_tab(tab);
        let network = self.network();

        let ctx = match ceiling {
            Some(ceiling) => {
                let ceiling = amount::parse_decimal(&ceiling, network.token_decimals())?;
                match tab {
                    StakeTab::Stake => ValidationContext::stake(ceiling, network),
                    StakeTab::Unstake => ValidationContext::unstake(ceiling, network),
                }
            }
            None => {
                let address = self.select_account(address)?;
                self.load_balances(&address).await?;
                self.state
                    .validation_context(tab)
                    .ok_or_else(|| eyre!("No balances for {}", address))?
            }
        };

        if matches!(ctx.action, AmountAction::Stake { .. }) && self.state.stakes_left() == Some(0) {
            println!(
                "No stakes left: an account can hold at most {} stakes",
                validation::TOTAL_STAKES
            );
            return Ok(false);
        }

        let result = validation::validate_amount(input, &ctx);
        println!("Maximum: {} {}", ctx.max_amount(), ctx.token_symbol);
        if !result.is_valid {
            if result.message.is_empty() {
                println!("Enter an amount");
            } else {
                println!("{}", result.message);
            }
            return Ok(false);
        }

        let call = match tab {
            StakeTab::Stake => StakingCall::stake(input, ctx.decimals)?,
            StakeTab::Unstake => StakingCall::unstake(input, ctx.decimals, result.is_max_amount)?,
        };
        println!("Valid: appPromotion.{} {:?}", call.method(), call.args());
        Ok(true)
    }

    // ==================== History ====================

    pub async fn history(&mut self, address: Option<String>, options: HistoryOptions) -> Result<()> {
        let address = self.select_account(address)?;
        let network = self.network();
        let decimals = network.token_decimals();

        let indexer = HttpIndexer::new(
            self.endpoints.indexer_url.clone(),
            self.endpoints.request_timeout,
        )?;
        let ticket = self.state.history_mut().begin_fetch();
        let buckets = fetch_history(&indexer, &address, decimals).await;
        self.state.history_mut().commit(ticket, buckets);

        let kind = options.kind;
        let page_size = options.page_size.unwrap_or(self.config.page_size);
        let view = self.state.history_mut();
        let pagination = view.pagination_mut(kind);
        pagination.set_page_size(page_size);
        if !pagination.go_to_page(options.page) && options.page != 1 {
            tracing::warn!(
                "Page {} out of range (1-{}), showing page 1",
                options.page,
                pagination.total_pages()
            );
        }

        let view = self.state.history();
        let pagination = *view.pagination(kind);
        let links = |hash: &str, block: u64| {
            options
                .links
                .then(|| explorer_url(network, hash, block))
        };
        print!(
            "{}",
            output::history_table(kind, view.buckets(), &pagination, decimals, network, &links)
        );

        if let Some(path) = options.csv {
            let path = path.unwrap_or_else(|| PathBuf::from(kind.csv_file_name()));
            let rows = export::bucket_rows(view.buckets(), kind, decimals);
            let mut writer = export::csv_writer(std::fs::File::create(&path)?);
            export::write_rows(&mut writer, &rows)?;
            println!("Wrote {} rows to {}", rows.len() - 1, path.display());
        }
        Ok(())
    }
}
