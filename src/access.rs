use std::str::FromStr;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessKind {
    Account,
    IncomingPayment,
    OutgoingPayment,
    Quote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    List,
    Complete,
}

/// Fields shared by every kind of access request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub actions: Vec<Action>,
    pub locations: Option<Vec<String>>,
    pub identifier: Option<String>,
    pub interval: Option<String>,
}

/// `value` must be present but is otherwise passed through as given: senders
/// use both JSON strings and numbers for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAmount {
    pub value: Value,
    pub asset_code: String,
    pub asset_scale: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingPaymentLimit {
    pub receiver: String,
    pub send_amount: PaymentAmount,
    pub receive_amount: PaymentAmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequest {
    Account(Grant),
    IncomingPayment(Grant),
    OutgoingPayment {
        grant: Grant,
        limits: Option<OutgoingPaymentLimit>,
    },
    Quote(Grant),
}

#[derive(Debug, Error)]
pub enum AccessRequestError {
    #[error("Malformed access request: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Access request for {kind:?} names no actions")]
    NoActions { kind: AccessKind },
    #[error("Limits are only allowed on outgoing payment requests, not {kind:?}")]
    UnexpectedLimits { kind: AccessKind },
}

/// Shape of a request as it arrives, before the per-kind rules are applied.
#[derive(Debug, Deserialize)]
struct RawAccessRequest {
    #[serde(rename = "type")]
    kind: AccessKind,
    actions: Vec<Action>,
    #[serde(default)]
    locations: Option<Vec<String>>,
    #[serde(default)]
    identifier: Option<String>,
    #[serde(default)]
    interval: Option<String>,
    #[serde(default)]
    limits: Option<Value>,
}

impl AccessRequest {
    pub fn parse(value: &Value) -> Result<Self, AccessRequestError> {
        let raw = RawAccessRequest::deserialize(value)?;
        let kind = raw.kind;
        if raw.actions.is_empty() {
            return Err(AccessRequestError::NoActions { kind });
        }
        let grant = Grant {
            actions: raw.actions,
            locations: raw.locations,
            identifier: raw.identifier,
            interval: raw.interval,
        };
        match (kind, raw.limits) {
            (AccessKind::OutgoingPayment, limits) => Ok(Self::OutgoingPayment {
                grant,
                limits: limits
                    .map(OutgoingPaymentLimit::deserialize)
                    .transpose()?,
            }),
            (kind, Some(_)) => Err(AccessRequestError::UnexpectedLimits { kind }),
            (AccessKind::Account, None) => Ok(Self::Account(grant)),
            (AccessKind::IncomingPayment, None) => Ok(Self::IncomingPayment(grant)),
            (AccessKind::Quote, None) => Ok(Self::Quote(grant)),
        }
    }

    pub fn kind(&self) -> AccessKind {
        match self {
            Self::Account(_) => AccessKind::Account,
            Self::IncomingPayment(_) => AccessKind::IncomingPayment,
            Self::OutgoingPayment { .. } => AccessKind::OutgoingPayment,
            Self::Quote(_) => AccessKind::Quote,
        }
    }

    pub fn grant(&self) -> &Grant {
        match self {
            Self::Account(grant)
            | Self::IncomingPayment(grant)
            | Self::OutgoingPayment { grant, .. }
            | Self::Quote(grant) => grant,
        }
    }
}

impl FromStr for AccessRequest {
    type Err = AccessRequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;
        Self::parse(&value)
    }
}

pub fn is_valid(request: &Value) -> bool {
    AccessRequest::parse(request).is_ok()
}
