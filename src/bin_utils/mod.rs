//! Replays a CSV stream of ledger operations against an [`InMemoryLedger`]
//! and prints the resulting account table.

use std::io::{Read, Write};

use crate::{
    account::{Asset, PaymentPointer},
    command::{BalanceAction, OperationKind},
    ledger::{Ledger, LedgerError, in_memory_ledger::InMemoryLedger},
};
use anyhow::Result;
use csv_parser::{CsvOperationParser, OperationRow};
use csv_printer::{AccountRow, print_accounts};
use thiserror::Error;
use tracing::debug;

pub mod csv_parser;
pub mod csv_printer;

#[derive(Debug, Error)]
pub enum RowError {
    #[error("Column `{column}` is required for {op:?}")]
    MissingColumn {
        op: OperationKind,
        column: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Unreadable row: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Row(#[from] RowError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub error_printer: Box<dyn FnMut(u64, ReplayError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = CsvOperationParser::new(self.input);

        let ledger = InMemoryLedger::default();

        for (line, row) in parser {
            let result = row
                .map_err(ReplayError::from)
                .and_then(|row| apply_row(&ledger, row));
            if let Err(err) = result {
                (self.error_printer)(line, err);
            }
        }

        let mut accounts = ledger.list_all();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        debug!(accounts = accounts.len(), "replay finished");

        print_accounts(
            self.output,
            accounts.into_iter().map(|acc| AccountRow {
                account: acc.id().to_owned(),
                name: acc.name().to_owned(),
                asset_code: acc.asset().code.clone(),
                asset_scale: acc.asset().scale,
                debits_pending: acc.debits_pending().clone(),
                debits_posted: acc.debits_posted().clone(),
                credits_pending: acc.credits_pending().clone(),
                credits_posted: acc.credits_posted().clone(),
                available: acc.available(),
            }),
        )
    }
}

fn apply_row(ledger: &impl Ledger, row: OperationRow) -> Result<(), ReplayError> {
    let op = row.op;
    let action = match op {
        OperationKind::Create => {
            let asset = Asset::new(
                required(row.asset_code, op, "asset_code")?,
                required(row.asset_scale, op, "asset_scale")?,
            );
            ledger.create(row.account, row.name.unwrap_or_default(), asset)?;
            return Ok(());
        }
        OperationKind::BindPointer => {
            let pointer = PaymentPointer {
                id: required(row.pointer_id, op, "pointer_id")?,
                reference: row.pointer_ref.unwrap_or_default(),
            };
            ledger.bind_pointer(&row.account, pointer)?;
            return Ok(());
        }
        OperationKind::PostCredit => BalanceAction::PostCredit {
            clear_pending: row.clear_pending.unwrap_or(false),
        },
        OperationKind::PostDebit => BalanceAction::PostDebit {
            clear_pending: row.clear_pending.unwrap_or(false),
        },
        OperationKind::ReserveCredit => BalanceAction::ReserveCredit,
        OperationKind::ReserveDebit => BalanceAction::ReserveDebit,
        OperationKind::ReleaseDebit => BalanceAction::ReleaseDebitReservation,
        OperationKind::ReleaseCredit => BalanceAction::ReleaseCreditReservation,
    };
    let amount = required(row.amount, op, "amount")?;
    ledger.execute(&row.account, action, amount)?;
    Ok(())
}

fn required<T>(value: Option<T>, op: OperationKind, column: &'static str) -> Result<T, RowError> {
    value.ok_or(RowError::MissingColumn { op, column })
}
