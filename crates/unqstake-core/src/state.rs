//! Application state shared by a frontend.
//!
//! Holds the connected account, the active form tab, the last balance
//! snapshot and the history view, plus two observer lists: callbacks fired
//! when a tab becomes active, and callbacks fired when transaction history
//! must be re-fetched.

use crate::history::{HistoryBuckets, HistoryKind};
use crate::pagination::Pagination;
use crate::types::{BalanceSnapshot, Network, StakeTab};
use crate::validation::{self, ValidationContext};

/// Handle returned by callback registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

type Callback = Box<dyn FnMut() + Send>;

struct TabCallback {
    id: CallbackId,
    tab: StakeTab,
    callback: Callback,
}

/// Proof that a history fetch was started against a particular view
/// generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket {
    generation: u64,
}

/// History buckets and per-table pagination.
#[derive(Debug, Clone)]
pub struct HistoryView {
    generation: u64,
    loading: bool,
    buckets: HistoryBuckets,
    pages: [Pagination; 4],
}

impl Default for HistoryView {
    fn default() -> Self {
        Self {
            generation: 0,
            loading: false,
            buckets: HistoryBuckets::default(),
            pages: [Pagination::default(); 4],
        }
    }
}

fn slot(kind: HistoryKind) -> usize {
    match kind {
        HistoryKind::Stake => 0,
        HistoryKind::Unstake => 1,
        HistoryKind::Rewards => 2,
        HistoryKind::Transfers => 3,
    }
}

impl HistoryView {
    /// Mark a fetch as started.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.loading = true;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Replace the buckets with a fetch result. Results from a fetch started
    /// before the last [`invalidate`](Self::invalidate) are discarded.
    pub fn commit(&mut self, ticket: FetchTicket, buckets: HistoryBuckets) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale history result (generation {} != {})",
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.buckets = buckets;
        for kind in HistoryKind::all() {
            let total = self.buckets.len(*kind);
            self.pages[slot(*kind)].set_total_items(total);
        }
        self.loading = false;
        true
    }

    /// Drop current data and orphan any in-flight fetch.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.buckets = HistoryBuckets::default();
        for page in &mut self.pages {
            page.set_total_items(0);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn buckets(&self) -> &HistoryBuckets {
        &self.buckets
    }

    pub fn pagination(&self, kind: HistoryKind) -> &Pagination {
        &self.pages[slot(kind)]
    }

    pub fn pagination_mut(&mut self, kind: HistoryKind) -> &mut Pagination {
        &mut self.pages[slot(kind)]
    }
}

/// Mutable state of one frontend session.
pub struct AppState {
    network: Network,
    account: Option<String>,
    wallet_name: Option<String>,
    active_tab: StakeTab,
    balances: Option<BalanceSnapshot>,
    stakes_left: Option<u32>,
    history: HistoryView,
    next_callback_id: u64,
    tab_callbacks: Vec<TabCallback>,
    refresh_callbacks: Vec<(CallbackId, Callback)>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("network", &self.network)
            .field("account", &self.account)
            .field("active_tab", &self.active_tab)
            .field("tab_callbacks", &self.tab_callbacks.len())
            .field("refresh_callbacks", &self.refresh_callbacks.len())
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            account: None,
            wallet_name: None,
            active_tab: StakeTab::default(),
            balances: None,
            stakes_left: None,
            history: HistoryView::default(),
            next_callback_id: 0,
            tab_callbacks: Vec::new(),
            refresh_callbacks: Vec::new(),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn wallet_name(&self) -> Option<&str> {
        self.wallet_name.as_deref()
    }

    fn clear_account_data(&mut self) {
        self.balances = None;
        self.stakes_left = None;
        self.history.invalidate();
    }

    pub fn set_network(&mut self, network: Network) {
        if self.network != network {
            self.network = network;
            self.clear_account_data();
        }
    }

    pub fn select_account(&mut self, address: impl Into<String>, wallet_name: Option<String>) {
        let address = address.into();
        if self.account.as_deref() != Some(address.as_str()) {
            self.account = Some(address);
            self.clear_account_data();
        }
        self.wallet_name = wallet_name;
    }

    pub fn disconnect(&mut self) {
        self.account = None;
        self.wallet_name = None;
        self.clear_account_data();
    }

    pub fn balances(&self) -> Option<&BalanceSnapshot> {
        self.balances.as_ref()
    }

    pub fn set_balances(&mut self, balances: BalanceSnapshot) {
        self.balances = Some(balances);
    }

    pub fn stakes_left(&self) -> Option<u32> {
        self.stakes_left
    }

    /// Record the pallet's `stakesPerAccount` for the current account.
    pub fn set_stakes_per_account(&mut self, stakes_per_account: u32) {
        self.stakes_left = Some(validation::stakes_left(stakes_per_account));
    }

    pub fn history(&self) -> &HistoryView {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryView {
        &mut self.history
    }

    /// Validation context for a tab, once balances are known.
    pub fn validation_context(&self, tab: StakeTab) -> Option<ValidationContext> {
        let balances = self.balances.as_ref()?;
        Some(match tab {
            StakeTab::Stake => ValidationContext::stake(balances.available.raw, self.network),
            StakeTab::Unstake => ValidationContext::unstake(balances.staked.raw, self.network),
        })
    }

    // ==================== Observers ====================

    fn next_id(&mut self) -> CallbackId {
        self.next_callback_id += 1;
        CallbackId(self.next_callback_id)
    }

    pub fn active_tab(&self) -> StakeTab {
        self.active_tab
    }

    /// Switch tabs and notify the callbacks registered for the new tab.
    pub fn set_active_tab(&mut self, tab: StakeTab) {
        self.active_tab = tab;
        for entry in self.tab_callbacks.iter_mut().filter(|e| e.tab == tab) {
            (entry.callback)();
        }
    }

    pub fn register_tab_change_callback<F>(&mut self, tab: StakeTab, callback: F) -> CallbackId
    where
        F: FnMut() + Send + 'static,
    {
        let id = self.next_id();
        self.tab_callbacks.push(TabCallback {
            id,
            tab,
            callback: Box::new(callback),
        });
        id
    }

    pub fn register_refresh_callback<F>(&mut self, callback: F) -> CallbackId
    where
        F: FnMut() + Send + 'static,
    {
        let id = self.next_id();
        self.refresh_callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback from whichever list holds it.
    pub fn unregister_callback(&mut self, id: CallbackId) -> bool {
        let before = self.tab_callbacks.len() + self.refresh_callbacks.len();
        self.tab_callbacks.retain(|e| e.id != id);
        self.refresh_callbacks.retain(|(cb_id, _)| *cb_id != id);
        self.tab_callbacks.len() + self.refresh_callbacks.len() < before
    }

    /// Ask every history consumer to re-fetch.
    pub fn refresh_transaction_history(&mut self) {
        for (_, callback) in &mut self.refresh_callbacks {
            callback();
        }
    }
}
