//! View models for each page of the front end.
//!
//! A view model owns the state a page renders and the rules for changing it.
//! Network results are applied through a [`FetchGuard`] so a response that
//! arrives after the page was unmounted, or after a newer request was issued,
//! is discarded.

pub mod account;
pub mod history;
pub mod holdings;
pub mod input;
pub mod poll;
pub mod price_table;
pub mod trade;

pub use account::AccountView;
pub use history::{ProfitLoss, TransactionColumn, TransactionHistory};
pub use holdings::{HoldingsView, Portfolio};
pub use input::QuantityInput;
pub use poll::{PollHandle, spawn_poller};
pub use price_table::{PriceColumn, PriceTable};
pub use trade::{
    BuyForm, BuyReceipt, PendingTrade, SellForm, SellReceipt, TradeRejection, TradeState,
};

/// Identifies one outstanding fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Tracks whether a view is mounted and which fetch is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchGuard {
    generation: u64,
    mounted: bool,
}

impl Default for FetchGuard {
    fn default() -> Self {
        Self {
            generation: 0,
            mounted: true,
        }
    }
}

impl FetchGuard {
    /// Starts a fetch, superseding any still in flight.
    pub fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket(self.generation)
    }

    /// Returns `true` if the result for `ticket` should be applied.
    pub fn accepts(&self, ticket: FetchTicket) -> bool {
        self.mounted && ticket.0 == self.generation
    }

    /// Marks the view visible again.
    pub fn mount(&mut self) {
        self.mounted = true;
    }

    /// Marks the view hidden; every outstanding ticket becomes stale.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.generation += 1;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_fetch_supersedes_older() {
        let mut guard = FetchGuard::default();
        let first = guard.begin();
        let second = guard.begin();
        assert!(!guard.accepts(first));
        assert!(guard.accepts(second));
    }

    #[test]
    fn unmount_invalidates_outstanding_ticket() {
        let mut guard = FetchGuard::default();
        let ticket = guard.begin();
        guard.unmount();
        assert!(!guard.accepts(ticket));

        guard.mount();
        assert!(!guard.accepts(ticket));
        let fresh = guard.begin();
        assert!(guard.accepts(fresh));
    }
}
