//! Transaction primitives.
//!
//! A `Transaction` is an immutable history record. What it did to the
//! balance depends on its [`TransactionKind`]: sends and gifts are debits,
//! receives are credits, requests and splits are pending records that do not
//! move money.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// How the money moved (or was asked for).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "P2P")]
    P2p,
    Transfer,
    Business,
    Bills,
    PayCode,
    #[serde(rename = "Red Envelope")]
    RedEnvelope,
    #[serde(rename = "Split Bill")]
    SplitBill,
    Request,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::P2p => "P2P",
            Self::Transfer => "Transfer",
            Self::Business => "Business",
            Self::Bills => "Bills",
            Self::PayCode => "PayCode",
            Self::RedEnvelope => "Red Envelope",
            Self::SplitBill => "Split Bill",
            Self::Request => "Request",
            Self::BankTransfer => "Bank Transfer",
        }
    }
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Completed,
    Pending,
    Requested,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Debit,
    Credit,
    /// Recorded only, no balance effect.
    Pending,
}

/// Kind-specific payload of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionKind {
    Send { to: String },
    Receive { from: String },
    Request { from: String },
    Split { with: String },
    Gift { to: String },
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Send { .. } => "send",
            Self::Receive { .. } => "receive",
            Self::Request { .. } => "request",
            Self::Split { .. } => "split",
            Self::Gift { .. } => "gift",
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::Send { .. } | Self::Gift { .. } => Direction::Debit,
            Self::Receive { .. } => Direction::Credit,
            Self::Request { .. } | Self::Split { .. } => Direction::Pending,
        }
    }

    /// Name of the other party.
    pub fn counterpart(&self) -> &str {
        match self {
            Self::Send { to } | Self::Gift { to } => to,
            Self::Receive { from } | Self::Request { from } => from,
            Self::Split { with } => with,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Time-ordered id (UUID v7).
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount: Money,
    pub method: Method,
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub message: Option<String>,
    pub status: Status,
}

impl Transaction {
    /// Builds a completed transaction.
    ///
    /// The amount must be strictly positive, the sign lives in the kind.
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        method: Method,
        message: Option<String>,
        date: NaiveDate,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::now_v7(),
            date,
            amount,
            method,
            kind,
            message,
            status: Status::Completed,
        })
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn direction(&self) -> Direction {
        self.kind.direction()
    }

    pub fn counterpart(&self) -> &str {
        self.kind.counterpart()
    }

    /// Balance effect of this record: negative for debits, positive for
    /// credits, zero for pending records.
    pub fn signed_amount(&self) -> Money {
        match self.direction() {
            Direction::Debit => -self.amount,
            Direction::Credit => self.amount,
            Direction::Pending => Money::ZERO,
        }
    }
}
