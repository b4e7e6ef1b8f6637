use std::collections::{HashMap, hash_map::Entry};

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    account::{Account, AccountId, Asset, PaymentPointer},
    command::{Amount, BalanceAction, BalanceCommand},
};

use super::{Ledger, LedgerError};

#[derive(Debug, Default)]
struct Store {
    accounts: HashMap<AccountId, Account>,
    // account ids in creation order
    order: Vec<AccountId>,
    // pointer id -> account id
    pointer_index: HashMap<String, AccountId>,
}

impl Store {
    fn execute(
        &mut self,
        id: &str,
        action: BalanceAction,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let acc = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_owned()))?;
        let command = BalanceCommand::parse(action, amount)?;
        let evt = acc.handle(command)?;
        acc.apply(&evt);
        debug!(account = id, event = ?evt.kind(), amount = %evt.amount(), "balance updated");
        Ok(())
    }

    /// Points `pointer_id` at the earliest created account still holding it, if any.
    fn reindex_pointer(&mut self, pointer_id: &str) {
        let holder = self
            .order
            .iter()
            .filter_map(|id| self.accounts.get(id))
            .find(|acc| acc.pointer().is_some_and(|pointer| pointer.id == pointer_id))
            .map(|acc| acc.id().to_owned());
        match holder {
            Some(holder) => {
                self.pointer_index.insert(pointer_id.to_owned(), holder);
            }
            None => {
                self.pointer_index.remove(pointer_id);
            }
        }
    }
}

/// Single-process ledger. One lock guards the whole store so that the
/// check and the update of every mutation happen as one step.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    store: RwLock<Store>,
}

impl Ledger for InMemoryLedger {
    fn create(&self, id: AccountId, name: String, asset: Asset) -> Result<(), LedgerError> {
        let mut guard = self.store.write();
        let store = &mut *guard;
        match store.accounts.entry(id) {
            Entry::Occupied(entry) => Err(LedgerError::AlreadyExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!(
                    account = %entry.key(),
                    asset_code = %asset.code,
                    asset_scale = asset.scale,
                    "account created"
                );
                store.order.push(entry.key().clone());
                let acc = Account::new(entry.key().clone(), name, asset);
                entry.insert(acc);
                Ok(())
            }
        }
    }

    fn get(&self, id: &str) -> Option<Account> {
        self.store.read().accounts.get(id).cloned()
    }

    /// When several accounts were bound to the same pointer id, the latest
    /// binding is returned.
    fn get_by_pointer(&self, pointer_id: &str) -> Option<Account> {
        let store = self.store.read();
        store
            .pointer_index
            .get(pointer_id)
            .and_then(|id| store.accounts.get(id))
            .cloned()
    }

    fn bind_pointer(&self, id: &str, pointer: PaymentPointer) -> Result<(), LedgerError> {
        let mut store = self.store.write();
        let acc = store
            .accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_owned()))?;
        let previous = acc.pointer().map(|pointer| pointer.id.clone());
        let pointer_id = pointer.id.clone();
        acc.bind_pointer(pointer);
        store
            .pointer_index
            .insert(pointer_id.clone(), id.to_owned());

        if let Some(previous) = previous.filter(|previous| *previous != pointer_id) {
            if store.pointer_index.get(&previous).is_some_and(|owner| owner == id) {
                store.reindex_pointer(&previous);
            }
        }
        debug!(account = id, pointer_id = %pointer_id, "pointer bound");
        Ok(())
    }

    /// Accounts in creation order.
    fn list_all(&self) -> Vec<Account> {
        let store = self.store.read();
        store
            .order
            .iter()
            .filter_map(|id| store.accounts.get(id))
            .cloned()
            .collect()
    }

    fn clear(&self) {
        let mut store = self.store.write();
        let removed = store.accounts.len();
        store.accounts.clear();
        store.order.clear();
        store.pointer_index.clear();
        info!(removed, "ledger cleared");
    }

    fn execute(&self, id: &str, action: BalanceAction, amount: Amount) -> Result<(), LedgerError> {
        let result = self.store.write().execute(id, action, amount);
        if let Err(err) = &result {
            warn!(account = id, ?action, %err, "balance update rejected");
        }
        result
    }
}
