use std::io::Read;

use crate::command::{Amount, OperationKind};
use csv::{DeserializeRecordsIntoIter, Trim};
use serde::{Deserialize, Deserializer, de::Error};

/// One replayed ledger operation. Which optional columns are required
/// depends on `op`.
#[derive(Debug, Deserialize)]
pub struct OperationRow {
    pub op: OperationKind,
    pub account: String,
    #[serde(default, deserialize_with = "deserialize_amount")]
    pub amount: Option<Amount>,
    pub clear_pending: Option<bool>,
    pub name: Option<String>,
    pub asset_code: Option<String>,
    pub asset_scale: Option<u8>,
    pub pointer_id: Option<String>,
    pub pointer_ref: Option<String>,
}

/// Amounts are read as decimal integer text of any length.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<Amount>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| {
            raw.parse::<Amount>()
                .map_err(|err| D::Error::custom(format!("invalid amount `{raw}`: {err}")))
        })
        .transpose()
}

/// Parses ledger operations in CSV format, yielding each row together with
/// the line it started on.
pub struct CsvOperationParser<R> {
    iter: DeserializeRecordsIntoIter<R, OperationRow>,
}

impl<R> CsvOperationParser<R>
where
    R: Read,
{
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        Self {
            iter: reader.into_deserialize(),
        }
    }
}

impl<R> Iterator for CsvOperationParser<R>
where
    R: Read,
{
    type Item = (u64, csv::Result<OperationRow>);

    fn next(&mut self) -> Option<Self::Item> {
        let curr_line = self.iter.reader().position().line();
        self.iter.next().map(|row| (curr_line, row))
    }
}
