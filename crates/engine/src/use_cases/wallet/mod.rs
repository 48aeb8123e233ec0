//! Wallet use cases.
//!
//! Balance queries and currency grants. Debits only happen through pack openings.

use std::sync::Arc;

use mindspark_domain::{PlayerId, Wallet};

use crate::infrastructure::ports::{RepoError, WalletRepo};
use crate::infrastructure::settings::DEFAULT_STARTING_BALANCE;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("Grant amount must be positive")]
    InvalidAmount,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Container for wallet use cases.
pub struct WalletUseCases {
    pub ops: Arc<WalletOps>,
}

impl WalletUseCases {
    pub fn new(ops: Arc<WalletOps>) -> Self {
        Self { ops }
    }
}

/// Wallet operations.
pub struct WalletOps {
    wallets: Arc<dyn WalletRepo>,
    starting_balance: u64,
}

impl WalletOps {
    pub fn new(wallets: Arc<dyn WalletRepo>) -> Self {
        Self {
            wallets,
            starting_balance: DEFAULT_STARTING_BALANCE,
        }
    }

    pub fn with_starting_balance(mut self, starting_balance: u64) -> Self {
        self.starting_balance = starting_balance;
        self
    }

    /// The player's wallet, created with the starting balance on first sight.
    pub async fn get_wallet(&self, player_id: PlayerId) -> Result<Wallet, WalletError> {
        Ok(self.wallets.ensure(player_id, self.starting_balance).await?)
    }

    /// Add currency, e.g. a reward or an admin grant.
    pub async fn grant(&self, player_id: PlayerId, amount: u64) -> Result<Wallet, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount);
        }
        self.wallets.ensure(player_id, self.starting_balance).await?;
        let wallet = self.wallets.credit(player_id, amount).await?;

        tracing::info!(
            player_id = %player_id,
            amount,
            balance = wallet.balance(),
            "Currency granted"
        );
        Ok(wallet)
    }
}
