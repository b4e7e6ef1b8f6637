use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

pub const CONDITION_LEN: usize = 32;

/// SHA-256 digest a fulfillment has to hash to.
pub type Condition = [u8; CONDITION_LEN];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConditionError {
    #[error("fulfillment did not match expected value")]
    WrongCondition,
}

pub fn condition_of(preimage: &[u8]) -> Condition {
    let hash = Sha256::digest(preimage);
    let mut condition = [0u8; CONDITION_LEN];
    condition.copy_from_slice(&hash);
    condition
}

/// Whether `preimage` hashes to `expected`. A digest of the wrong length never matches.
pub fn verify(expected: &[u8], preimage: &[u8]) -> bool {
    condition_of(preimage).as_slice() == expected
}

pub fn check_fulfillment(expected: &[u8], fulfillment: &[u8]) -> Result<(), ConditionError> {
    if verify(expected, fulfillment) {
        Ok(())
    } else {
        warn!(
            condition_len = expected.len(),
            fulfillment_len = fulfillment.len(),
            "invalid fulfillment"
        );
        Err(ConditionError::WrongCondition)
    }
}
