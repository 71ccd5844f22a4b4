//! Reference records used as transaction counterparts.
//!
//! None of these are mutated by the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Money;

/// A biller the user can pay from the bill pay screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payee {
    pub id: String,
    pub name: String,
    pub account_number: String,
}

/// A merchant reachable through its PayCode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
    /// Payload of the merchant-presented QR code.
    pub paycode: String,
    pub account_number: String,
}

impl Business {
    pub(crate) fn matches_paycode(&self, code: &str) -> bool {
        self.paycode.eq_ignore_ascii_case(code.trim())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Online,
    Offline,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub presence: Presence,
}

/// A red envelope someone sent to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedEnvelope {
    pub id: u32,
    pub amount: Money,
    pub from: String,
    pub message: String,
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paycode_match_ignores_case_and_whitespace() {
        let shop = Business {
            id: "coffee".into(),
            name: "Coffee Shop".into(),
            paycode: "PAY-COFFEE-001".into(),
            account_number: "889900112233".into(),
        };
        assert!(shop.matches_paycode("  pay-coffee-001 "));
        assert!(!shop.matches_paycode("PAY-COFFEE-002"));
    }
}
