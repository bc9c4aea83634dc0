use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionFilter};

// Append-only sequence of executed orders. Entries are never edited or
// deleted; storage order is append order. Timestamps are assigned by the
// caller at execution time so they match the instant the balance and
// position mutation took effect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionLedger {
    entries: Vec<Transaction>,
}

impl TransactionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, transaction: Transaction) {
        self.entries.push(transaction);
    }

    /// Transactions matching every provided filter, in storage order.
    /// Callers needing chronological order must sort explicitly.
    pub fn query<'a>(
        &'a self,
        filter: &'a TransactionFilter,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.entries.iter().filter(move |tx| filter.matches(tx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
