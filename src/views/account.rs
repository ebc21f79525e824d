//! Account reset.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::Result;
use crate::api::TradingApi;
use crate::format::format_currency;
use crate::models::ResetConfirmation;

/// Shown when the reset request fails for any reason.
pub const RESET_FAILED: &str = "Failed to reset account. Please try again later.";

/// State of the reset action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountView {
    resetting: bool,
    status: Option<String>,
}

impl AccountView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a reset as running. Returns `false` when one already is.
    pub fn begin_reset(&mut self) -> bool {
        if self.resetting {
            return false;
        }
        self.resetting = true;
        self.status = None;
        true
    }

    /// Applies the backend's answer to a reset request.
    ///
    /// Returns the balance reported by the backend. The caller is expected
    /// to re-fetch every view afterwards.
    ///
    /// # Errors
    ///
    /// Returns the request error; the status line then reads
    /// [`RESET_FAILED`].
    pub fn finish_reset(&mut self, result: Result<ResetConfirmation>) -> Result<Option<Decimal>> {
        self.resetting = false;
        match result {
            Ok(confirmation) => {
                info!(balance = ?confirmation.balance, "Account reset");
                self.status = Some(format!(
                    "Account reset successful! Your balance has been restored to {}.",
                    format_currency(confirmation.balance)
                ));
                Ok(confirmation.balance)
            }
            Err(e) => {
                warn!("Account reset failed: {e}");
                self.status = Some(RESET_FAILED.to_string());
                Err(e)
            }
        }
    }

    /// Resets the account to its starting cash balance.
    ///
    /// # Errors
    ///
    /// See [`finish_reset`](Self::finish_reset).
    pub async fn reset<A: TradingApi>(&mut self, api: &A) -> Result<Option<Decimal>> {
        self.begin_reset();
        let result = api.reset().await;
        self.finish_reset(result)
    }

    pub fn is_resetting(&self) -> bool {
        self.resetting
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Clears the status line.
    pub fn dismiss(&mut self) {
        self.status = None;
    }
}
