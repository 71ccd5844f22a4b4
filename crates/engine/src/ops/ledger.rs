use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    Money, ResultEngine, Transaction,
    ledger::{HistoryFilter, P2pMode},
    state::Dashboard,
    transactions::Method,
};

use super::{Engine, Outcome, validate_amount};

impl Engine {
    /// Sends money from the primary account to `recipient`.
    pub async fn transfer(&mut self, recipient: &str, amount: Money, memo: Option<&str>) -> Outcome {
        if let Err(err) = validate_amount(amount) {
            return self.reject("transfer", err);
        }
        self.run("transfer", |state, today| {
            state.ledger.transfer(recipient, amount, memo, today)
        })
        .await
    }

    /// Peer-to-peer send, request or split. Only `Send` moves money.
    pub async fn p2p_transfer(
        &mut self,
        recipient: &str,
        amount: Money,
        message: Option<&str>,
        mode: P2pMode,
    ) -> Outcome {
        if let Err(err) = validate_amount(amount) {
            return self.reject("p2p_transfer", err);
        }
        self.run("p2p_transfer", |state, today| {
            state
                .ledger
                .p2p_transfer(recipient, amount, message, mode, today)
        })
        .await
    }

    pub async fn business_payment(&mut self, business_id: &str, amount: Money) -> Outcome {
        if let Err(err) = validate_amount(amount) {
            return self.reject("business_payment", err);
        }
        self.run("business_payment", |state, today| {
            state.ledger.business_payment(business_id, amount, today)
        })
        .await
    }

    /// Pays the merchant behind a scanned PayCode.
    pub async fn pay_paycode(&mut self, code: &str, amount: Money) -> Outcome {
        if let Err(err) = validate_amount(amount) {
            return self.reject("pay_paycode", err);
        }
        self.run("pay_paycode", |state, today| {
            state.ledger.pay_paycode(code, amount, today)
        })
        .await
    }

    pub async fn send_red_envelope(
        &mut self,
        recipients: &[String],
        amount_each: Money,
        message: Option<&str>,
    ) -> Outcome {
        if let Err(err) = validate_amount(amount_each) {
            return self.reject("send_red_envelope", err);
        }
        self.run("send_red_envelope", |state, today| {
            state
                .ledger
                .send_red_envelope(recipients, amount_each, message, today)
        })
        .await
    }

    pub async fn pay_bill(&mut self, payee_id: &str, amount: Money, due_date: NaiveDate) -> Outcome {
        if let Err(err) = validate_amount(amount) {
            return self.reject("pay_bill", err);
        }
        self.run("pay_bill", |state, today| {
            state.ledger.pay_bill(payee_id, amount, due_date, today)
        })
        .await
    }

    /// Requests an equal share of `total` from every participant.
    pub async fn split_bill(
        &mut self,
        participants: &[String],
        total: Money,
        description: Option<&str>,
    ) -> Outcome {
        if let Err(err) = validate_amount(total) {
            return self.reject("split_bill", err);
        }
        self.run("split_bill", |state, today| {
            state
                .ledger
                .split_bill(participants, total, description, today)
        })
        .await
    }

    pub fn balance(&self) -> ResultEngine<Money> {
        self.state.ledger.balance()
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.state.ledger.transactions()
    }

    pub fn history(&self, filter: HistoryFilter, search: Option<&str>) -> Vec<&Transaction> {
        self.state.ledger.history(filter, search)
    }

    pub fn spending_by_category(&self) -> BTreeMap<Method, Money> {
        self.state.ledger.spending_by_category()
    }

    pub fn dashboard(&self, recent: usize) -> ResultEngine<Dashboard> {
        self.state.dashboard(recent, self.today())
    }
}
