use std::io::Write;

use crate::command::Amount;
use csv::Writer;
use serde::{Serialize, Serializer};

fn serialize_amount<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(amount)
}

#[derive(Debug, Serialize)]
pub struct AccountRow {
    pub account: String,
    pub name: String,
    pub asset_code: String,
    pub asset_scale: u8,
    #[serde(serialize_with = "serialize_amount")]
    pub debits_pending: Amount,
    #[serde(serialize_with = "serialize_amount")]
    pub debits_posted: Amount,
    #[serde(serialize_with = "serialize_amount")]
    pub credits_pending: Amount,
    #[serde(serialize_with = "serialize_amount")]
    pub credits_posted: Amount,
    #[serde(serialize_with = "serialize_amount")]
    pub available: Amount,
}

pub fn print_accounts<W>(
    output: &mut W,
    accounts: impl Iterator<Item = AccountRow>,
) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for acc in accounts {
        if let Err(err) = writer.serialize(acc) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // Ensure all data is flushed to the output
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
