/// Account record and the balance rules every mutation is checked against.
/// State is modified using events, which are created by handling commands
pub mod account;

/// Balance commands and amount validation, executed by [`account`].
pub mod command;

/// Ledger interface, plus a thread-safe "in memory" implementation.
/// Owns every account and coordinates lookups and mutations.
pub mod ledger;

/// SHA-256 condition/fulfillment check. Independent of the ledger.
pub mod condition;

/// Access-grant request model and validation. Independent of the ledger.
pub mod access;

/// CSV replay driver used by the `mock-ledger` binary and the integration
/// tests.
pub mod bin_utils;
