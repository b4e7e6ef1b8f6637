use thiserror::Error;

use crate::{
    account::{Account, AccountError, AccountId, Asset, PaymentPointer},
    command::{Amount, BalanceAction, CommandError},
};

pub mod in_memory_ledger;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Account `{0}` does not exist")]
    NotFound(AccountId),
    #[error("Account `{0}` already exists")]
    AlreadyExists(AccountId),
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    AccountErr(#[from] AccountError),
}

/// Account store with pending/posted balance tracking.
///
/// Lookups hand out clones, never references into the store.
pub trait Ledger {
    fn create(&self, id: AccountId, name: String, asset: Asset) -> Result<(), LedgerError>;

    fn get(&self, id: &str) -> Option<Account>;

    fn get_by_pointer(&self, pointer_id: &str) -> Option<Account>;

    /// Overwrites any previous binding of the account.
    fn bind_pointer(&self, id: &str, pointer: PaymentPointer) -> Result<(), LedgerError>;

    fn list_all(&self) -> Vec<Account>;

    /// Drops every account. Meant for resetting test fixtures.
    fn clear(&self);

    /// Applies a single balance mutation atomically: either every check passes
    /// and the account is updated, or the account is left untouched.
    fn execute(&self, id: &str, action: BalanceAction, amount: Amount) -> Result<(), LedgerError>;

    fn post_credit(&self, id: &str, amount: Amount, clear_pending: bool) -> Result<(), LedgerError> {
        self.execute(id, BalanceAction::PostCredit { clear_pending }, amount)
    }

    fn post_debit(&self, id: &str, amount: Amount, clear_pending: bool) -> Result<(), LedgerError> {
        self.execute(id, BalanceAction::PostDebit { clear_pending }, amount)
    }

    fn reserve_credit(&self, id: &str, amount: Amount) -> Result<(), LedgerError> {
        self.execute(id, BalanceAction::ReserveCredit, amount)
    }

    fn reserve_debit(&self, id: &str, amount: Amount) -> Result<(), LedgerError> {
        self.execute(id, BalanceAction::ReserveDebit, amount)
    }

    fn release_debit_reservation(&self, id: &str, amount: Amount) -> Result<(), LedgerError> {
        self.execute(id, BalanceAction::ReleaseDebitReservation, amount)
    }

    fn release_credit_reservation(&self, id: &str, amount: Amount) -> Result<(), LedgerError> {
        self.execute(id, BalanceAction::ReleaseCreditReservation, amount)
    }
}
