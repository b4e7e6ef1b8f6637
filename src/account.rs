use num_bigint::Sign;
use thiserror::Error;

use crate::command::{Amount, BalanceAction, BalanceCommand};

pub type AccountId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub code: String,
    pub scale: u8,
}

impl Asset {
    pub fn new(code: impl Into<String>, scale: u8) -> Self {
        Self {
            code: code.into(),
            scale,
        }
    }
}

/// External identity an account can be reached by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPointer {
    pub id: String,
    pub reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceKind {
    DebitsPending,
    DebitsPosted,
    CreditsPending,
    CreditsPosted,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AccountEventKind {
    CreditPosted { cleared_pending: bool },
    DebitPosted { cleared_pending: bool },
    CreditReserved,
    DebitReserved,
    DebitReservationReleased,
    CreditReservationReleased,
}

#[derive(Debug)]
pub struct AccountEvent {
    amount: Amount,
    kind: AccountEventKind,
}

impl AccountEvent {
    pub fn amount(&self) -> &Amount {
        &self.amount
    }

    pub fn kind(&self) -> &AccountEventKind {
        &self.kind
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Insufficient funds: {available} available, {requested} requested")]
    InsufficientFunds { available: Amount, requested: Amount },
    #[error("Insufficient pending balance in {balance:?}: {pending} pending, {requested} requested")]
    InsufficientPending {
        balance: BalanceKind,
        pending: Amount,
        requested: Amount,
    },
    #[error("{balance:?} would become negative")]
    Overflow { balance: BalanceKind },
}

/// Ledger record. Balances only change through [`Account::handle`] followed
/// by [`Account::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    name: String,
    asset: Asset,
    pointer: Option<PaymentPointer>,
    debits_pending: Amount,
    debits_posted: Amount,
    credits_pending: Amount,
    credits_posted: Amount,
}

impl Account {
    pub(crate) fn new(id: AccountId, name: String, asset: Asset) -> Self {
        Self {
            id,
            name,
            asset,
            pointer: None,
            debits_pending: Amount::ZERO,
            debits_posted: Amount::ZERO,
            credits_pending: Amount::ZERO,
            credits_posted: Amount::ZERO,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn pointer(&self) -> Option<&PaymentPointer> {
        self.pointer.as_ref()
    }

    pub fn debits_pending(&self) -> &Amount {
        &self.debits_pending
    }

    pub fn debits_posted(&self) -> &Amount {
        &self.debits_posted
    }

    pub fn credits_pending(&self) -> &Amount {
        &self.credits_pending
    }

    pub fn credits_posted(&self) -> &Amount {
        &self.credits_posted
    }

    /// Funds a new unreserved debit or a debit reservation may still consume.
    pub fn available(&self) -> Amount {
        &self.credits_posted - &self.debits_posted - &self.debits_pending
    }

    /// Settled balance, ignoring everything still pending.
    pub fn balance(&self) -> Amount {
        &self.credits_posted - &self.debits_posted
    }

    pub(crate) fn bind_pointer(&mut self, pointer: PaymentPointer) {
        self.pointer = Some(pointer);
    }

    pub fn apply(&mut self, event: &AccountEvent) {
        let amount = &event.amount;
        match event.kind {
            AccountEventKind::CreditPosted { cleared_pending } => {
                self.credits_posted += amount;
                if cleared_pending {
                    self.credits_pending -= amount;
                }
            }
            AccountEventKind::DebitPosted { cleared_pending } => {
                self.debits_posted += amount;
                if cleared_pending {
                    self.debits_pending -= amount;
                }
            }
            AccountEventKind::CreditReserved => {
                self.credits_pending += amount;
            }
            AccountEventKind::DebitReserved => {
                self.debits_pending += amount;
            }
            AccountEventKind::DebitReservationReleased => {
                self.debits_pending -= amount;
            }
            AccountEventKind::CreditReservationReleased => {
                self.credits_pending -= amount;
            }
        }
    }

    /// Validates `command` against the current balances. Nothing is changed
    /// until the returned event is applied.
    pub fn handle(&self, command: BalanceCommand) -> Result<AccountEvent, AccountError> {
        let amount = command.amount;
        let kind = match command.action {
            BalanceAction::PostCredit { clear_pending } => {
                if clear_pending {
                    ensure_pending(BalanceKind::CreditsPending, &self.credits_pending, &amount)?;
                }
                AccountEventKind::CreditPosted {
                    cleared_pending: clear_pending,
                }
            }
            BalanceAction::PostDebit { clear_pending } => {
                // capturing more than was reserved is reported as an overflow
                if (clear_pending && self.debits_pending < amount)
                    || (&self.debits_posted + &amount).sign() == Sign::Minus
                {
                    return Err(AccountError::Overflow {
                        balance: if clear_pending {
                            BalanceKind::DebitsPending
                        } else {
                            BalanceKind::DebitsPosted
                        },
                    });
                }
                // a capture was already checked when it was reserved
                if !clear_pending {
                    self.ensure_funds(&amount)?;
                }
                AccountEventKind::DebitPosted {
                    cleared_pending: clear_pending,
                }
            }
            BalanceAction::ReserveCredit => AccountEventKind::CreditReserved,
            BalanceAction::ReserveDebit => {
                self.ensure_funds(&amount)?;
                AccountEventKind::DebitReserved
            }
            BalanceAction::ReleaseDebitReservation => {
                ensure_pending(BalanceKind::DebitsPending, &self.debits_pending, &amount)?;
                AccountEventKind::DebitReservationReleased
            }
            BalanceAction::ReleaseCreditReservation => {
                ensure_pending(BalanceKind::CreditsPending, &self.credits_pending, &amount)?;
                AccountEventKind::CreditReservationReleased
            }
        };
        Ok(AccountEvent { amount, kind })
    }

    /// Posted credits must cover posted debits, open reservations and `amount`.
    fn ensure_funds(&self, amount: &Amount) -> Result<(), AccountError> {
        if self.credits_posted < &self.debits_posted + &self.debits_pending + amount {
            return Err(AccountError::InsufficientFunds {
                available: self.available(),
                requested: amount.clone(),
            });
        }
        Ok(())
    }
}

fn ensure_pending(balance: BalanceKind, pending: &Amount, amount: &Amount) -> Result<(), AccountError> {
    if pending < amount {
        return Err(AccountError::InsufficientPending {
            balance,
            pending: pending.clone(),
            requested: amount.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd_account() -> Account {
        Account::new("a".to_string(), "Alice".to_string(), Asset::new("USD", 2))
    }

    fn amt(value: u32) -> Amount {
        Amount::from(value)
    }

    fn cmd(action: BalanceAction, amount: u32) -> BalanceCommand {
        BalanceCommand {
            action,
            amount: amt(amount),
        }
    }

    fn run(acc: &mut Account, action: BalanceAction, amount: u32) -> Result<(), AccountError> {
        let evt = acc.handle(cmd(action, amount))?;
        acc.apply(&evt);
        Ok(())
    }

    #[test]
    fn apply_events() {
        let mut acc = usd_account();
        acc.apply(&AccountEvent {
            amount: amt(100),
            kind: AccountEventKind::CreditPosted {
                cleared_pending: false,
            },
        });
        assert_eq!(acc.credits_posted, amt(100));
        assert_eq!(acc.credits_pending, Amount::ZERO);

        acc.apply(&AccountEvent {
            amount: amt(30),
            kind: AccountEventKind::DebitReserved,
        });
        assert_eq!(acc.debits_pending, amt(30));
        assert_eq!(acc.available(), amt(70));

        acc.apply(&AccountEvent {
            amount: amt(20),
            kind: AccountEventKind::DebitPosted {
                cleared_pending: true,
            },
        });
        assert_eq!(acc.debits_pending, amt(10));
        assert_eq!(acc.debits_posted, amt(20));
        assert_eq!(acc.balance(), amt(80));

        acc.apply(&AccountEvent {
            amount: amt(10),
            kind: AccountEventKind::DebitReservationReleased,
        });
        assert_eq!(acc.debits_pending, Amount::ZERO);

        acc.apply(&AccountEvent {
            amount: amt(5),
            kind: AccountEventKind::CreditReserved,
        });
        acc.apply(&AccountEvent {
            amount: amt(5),
            kind: AccountEventKind::CreditReservationReleased,
        });
        assert_eq!(acc.credits_pending, Amount::ZERO);
        assert_eq!(acc.available(), amt(80));
    }

    #[test]
    fn post_credit_clearing_pending() {
        let mut acc = usd_account();
        let clear = BalanceAction::PostCredit {
            clear_pending: true,
        };

        let err = run(&mut acc, clear, 1).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientPending {
                balance: BalanceKind::CreditsPending,
                pending: Amount::ZERO,
                requested: amt(1),
            }
        );

        run(&mut acc, BalanceAction::ReserveCredit, 25).unwrap();
        run(&mut acc, clear, 25).unwrap();
        assert_eq!(acc.credits_pending, Amount::ZERO);
        assert_eq!(acc.credits_posted, amt(25));
    }

    #[test]
    fn unreserved_debit_requires_funds() {
        let mut acc = usd_account();
        let debit = BalanceAction::PostDebit {
            clear_pending: false,
        };
        let err = run(&mut acc, debit, 1).unwrap_err();
        assert!(matches!(err, AccountError::InsufficientFunds { .. }));

        run(
            &mut acc,
            BalanceAction::PostCredit {
                clear_pending: false,
            },
            50,
        )
        .unwrap();
        run(&mut acc, BalanceAction::ReserveDebit, 20).unwrap();

        // 50 < 0 + 20 + 31
        let err = run(&mut acc, debit, 31).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                available: amt(30),
                requested: amt(31),
            }
        );
        assert_eq!(err.to_string(), "Insufficient funds: 30 available, 31 requested");

        run(&mut acc, debit, 30).unwrap();
        assert_eq!(acc.debits_posted, amt(30));
        assert_eq!(acc.available(), Amount::ZERO);
    }

    #[test]
    fn capture_skips_funds_check() {
        let mut acc = usd_account();
        run(
            &mut acc,
            BalanceAction::PostCredit {
                clear_pending: false,
            },
            10,
        )
        .unwrap();
        run(&mut acc, BalanceAction::ReserveDebit, 10).unwrap();
        assert_eq!(acc.available(), Amount::ZERO);

        run(
            &mut acc,
            BalanceAction::PostDebit {
                clear_pending: true,
            },
            10,
        )
        .unwrap();
        assert_eq!(acc.debits_pending, Amount::ZERO);
        assert_eq!(acc.debits_posted, amt(10));
    }

    #[test]
    fn capture_more_than_reserved_overflows() {
        let mut acc = usd_account();
        let err = run(
            &mut acc,
            BalanceAction::PostDebit {
                clear_pending: true,
            },
            1,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AccountError::Overflow {
                balance: BalanceKind::DebitsPending
            }
        );
        assert_eq!(err.to_string(), "DebitsPending would become negative");
        assert_eq!(acc, usd_account());
    }

    #[test]
    fn release_reservations() {
        let mut acc = usd_account();
        run(
            &mut acc,
            BalanceAction::PostCredit {
                clear_pending: false,
            },
            10,
        )
        .unwrap();
        run(&mut acc, BalanceAction::ReserveDebit, 3).unwrap();

        let before = acc.clone();
        let err = run(&mut acc, BalanceAction::ReleaseDebitReservation, 5).unwrap_err();
        assert!(matches!(
            err,
            AccountError::InsufficientPending {
                balance: BalanceKind::DebitsPending,
                ..
            }
        ));
        assert_eq!(acc, before);

        run(&mut acc, BalanceAction::ReleaseDebitReservation, 3).unwrap();
        assert_eq!(acc.debits_pending, Amount::ZERO);
    }

    #[test]
    fn release_credit_reservation_checks_credits_pending() {
        let mut acc = usd_account();
        run(
            &mut acc,
            BalanceAction::PostCredit {
                clear_pending: false,
            },
            10,
        )
        .unwrap();
        // plenty of pending debits must not allow releasing credits that were never reserved
        run(&mut acc, BalanceAction::ReserveDebit, 10).unwrap();
        let err = run(&mut acc, BalanceAction::ReleaseCreditReservation, 4).unwrap_err();
        assert_eq!(
            err,
            AccountError::InsufficientPending {
                balance: BalanceKind::CreditsPending,
                pending: Amount::ZERO,
                requested: amt(4),
            }
        );

        run(&mut acc, BalanceAction::ReserveCredit, 4).unwrap();
        run(&mut acc, BalanceAction::ReleaseCreditReservation, 4).unwrap();
        assert_eq!(acc.credits_pending, Amount::ZERO);
        assert_eq!(acc.debits_pending, amt(10));
    }

    #[test]
    fn balances_grow_past_fixed_width() {
        let mut acc = usd_account();
        // 2^128, beyond u128 and any 96-bit decimal mantissa
        let big = Amount::from(u128::MAX) + 1u32;
        for action in [
            BalanceAction::PostCredit {
                clear_pending: false,
            },
            BalanceAction::ReserveCredit,
        ] {
            for _ in 0..2 {
                let evt = acc
                    .handle(BalanceCommand {
                        action,
                        amount: big.clone(),
                    })
                    .unwrap();
                acc.apply(&evt);
            }
        }
        assert_eq!(acc.credits_posted, &big * 2u32);
        assert_eq!(acc.credits_pending, &big * 2u32);

        run(&mut acc, BalanceAction::ReserveDebit, 1).unwrap();
        assert_eq!(acc.available(), &big * 2u32 - 1u32);
        assert_eq!(
            acc.credits_posted.to_string(),
            "680564733841876926926749214863536422912"
        );
    }
}
