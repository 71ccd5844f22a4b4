//! The module contains the `Account` struct and its implementation.

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
        }
    }
}

/// A bank account.
///
/// The balance is only ever changed by the ledger operations; everything
/// else reads it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub kind: AccountKind,
    pub name: String,
    pub balance: Money,
    /// Display form of the account number, e.g. `****4521`.
    pub masked_number: String,
}

impl Account {
    pub fn new(id: &str, kind: AccountKind, name: &str, balance: Money, number: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            name: name.to_string(),
            balance,
            masked_number: mask_account_number(number),
        }
    }

    /// Withdraws `amount` from the account.
    ///
    /// The balance never goes negative: the call fails with
    /// `InsufficientFunds` and leaves the balance untouched.
    pub(crate) fn debit(&mut self, amount: Money) -> ResultEngine<()> {
        if amount > self.balance {
            return Err(EngineError::InsufficientFunds(format!(
                "{} requested, {} available on {}",
                amount, self.balance, self.masked_number
            )));
        }
        self.balance -= amount;
        Ok(())
    }
}

/// Keeps only the last four digits of an account number.
pub fn mask_account_number(number: &str) -> String {
    let digits: Vec<char> = number.chars().filter(char::is_ascii_digit).collect();
    let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("****{tail}")
}
