use crate::domain::ports::WorldState;
use crate::domain::record::{load, save};
use crate::domain::token::{Amount, TokenBalance};
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Per-account token balances and transfers between them.
///
/// Works on the world state of the current invocation only; it never holds a
/// balance across invocations.
pub struct TokenLedger<'a> {
    state: &'a mut dyn WorldState,
}

impl<'a> TokenLedger<'a> {
    pub fn new(state: &'a mut dyn WorldState) -> Self {
        Self { state }
    }

    /// Balance of an existing account. Unknown accounts are `NotFound`.
    pub async fn balance(&mut self, account: &str) -> Result<Decimal> {
        let record = self.require(account).await?;
        debug!(account, balance = %record.balance, "balance read");
        Ok(record.balance)
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// The debit side must exist and cover the amount; the credit side is created
    /// with a zero balance if it has never been seen. Both records are checked
    /// before either is written.
    pub async fn transfer(&mut self, from: &str, to: &str, amount: Amount) -> Result<()> {
        if from == to {
            return Err(LedgerError::InvalidArgument(format!(
                "cannot transfer from account {from} to itself"
            )));
        }

        let mut source = self.require(from).await?;
        source.debit(amount)?;

        let mut target = load::<TokenBalance>(&mut *self.state, to)
            .await?
            .unwrap_or_else(|| TokenBalance::empty(to));
        target.credit(amount)?;

        save(&mut *self.state, &source)?;
        save(&mut *self.state, &target)?;

        info!(
            tx_id = %self.state.tx_id(),
            from,
            to,
            amount = %amount,
            "tokens transferred"
        );
        Ok(())
    }

    /// Writes the genesis balances. Refuses to run twice.
    pub async fn seed(&mut self, accounts: &[TokenBalance]) -> Result<()> {
        for account in accounts {
            if load::<TokenBalance>(&mut *self.state, &account.account)
                .await?
                .is_some()
            {
                return Err(LedgerError::AlreadyExists(format!(
                    "account {}",
                    account.account
                )));
            }
        }
        for account in accounts {
            save(&mut *self.state, account)?;
        }
        info!(accounts = accounts.len(), "ledger initialized");
        Ok(())
    }

    async fn require(&mut self, account: &str) -> Result<TokenBalance> {
        load::<TokenBalance>(&mut *self.state, account)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("account {account}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::StateStore;
    use crate::domain::record::StateRecord;
    use crate::infrastructure::in_memory::InMemoryStateStore;
    use crate::infrastructure::tx_context::TxContext;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    async fn seeded() -> InMemoryStateStore {
        let store = InMemoryStateStore::new();
        let mut ctx = TxContext::new(&store, "genesis", Utc::now());
        TokenLedger::new(&mut ctx)
            .seed(&[
                TokenBalance::new("RBI", dec!(1000000)),
                TokenBalance::new("HDFC", dec!(500000)),
            ])
            .await
            .unwrap();
        ctx.commit().await.unwrap();
        store
    }

    async fn balance_of(store: &InMemoryStateStore, account: &str) -> Option<Decimal> {
        store
            .get(&TokenBalance::key_for(account))
            .await
            .unwrap()
            .map(|bytes| TokenBalance::from_bytes(&bytes).unwrap().balance)
    }

    fn amount(value: Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_balance_lookup() {
        let store = seeded().await;
        let mut ctx = TxContext::new(&store, "tx1", Utc::now());
        let mut ledger = TokenLedger::new(&mut ctx);

        assert_eq!(ledger.balance("HDFC").await.unwrap(), dec!(500000));
        assert!(matches!(
            ledger.balance("NOBODY").await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_transfer_creates_recipient() {
        let store = seeded().await;
        let mut ctx = TxContext::new(&store, "tx1", Utc::now());
        TokenLedger::new(&mut ctx)
            .transfer("HDFC", "B1", amount(dec!(1000)))
            .await
            .unwrap();
        ctx.commit().await.unwrap();

        assert_eq!(balance_of(&store, "HDFC").await, Some(dec!(499000)));
        assert_eq!(balance_of(&store, "B1").await, Some(dec!(1000)));
    }

    #[tokio::test]
    async fn test_transfer_insufficient_writes_nothing() {
        let store = seeded().await;
        let mut ctx = TxContext::new(&store, "tx1", Utc::now());
        let result = TokenLedger::new(&mut ctx)
            .transfer("HDFC", "B1", amount(dec!(500000.01)))
            .await;

        assert!(matches!(result, Err(LedgerError::InsufficientFunds(ref a)) if a == "HDFC"));
        assert!(ctx.rw_set().is_read_only());
    }

    #[tokio::test]
    async fn test_transfer_from_unknown_account_is_not_found() {
        let store = seeded().await;
        let mut ctx = TxContext::new(&store, "tx1", Utc::now());
        let result = TokenLedger::new(&mut ctx)
            .transfer("GHOST", "HDFC", amount(dec!(1)))
            .await;

        assert!(matches!(result, Err(LedgerError::NotFound(_))));
        assert!(ctx.rw_set().is_read_only());
        assert_eq!(balance_of(&store, "GHOST").await, None);
    }

    #[tokio::test]
    async fn test_self_transfer_rejected() {
        let store = seeded().await;
        let mut ctx = TxContext::new(&store, "tx1", Utc::now());
        let result = TokenLedger::new(&mut ctx)
            .transfer("RBI", "RBI", amount(dec!(1)))
            .await;
        assert!(matches!(result, Err(LedgerError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_seed_twice_rejected() {
        let store = seeded().await;
        let mut ctx = TxContext::new(&store, "tx1", Utc::now());
        let result = TokenLedger::new(&mut ctx)
            .seed(&[TokenBalance::new("RBI", dec!(1))])
            .await;

        assert!(matches!(result, Err(LedgerError::AlreadyExists(_))));
        assert_eq!(balance_of(&store, "RBI").await, Some(dec!(1000000)));
    }
}
