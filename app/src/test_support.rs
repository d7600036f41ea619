//! In-memory record store double for orchestration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use kakeibo_client::{ClientError, NewFixedCost, NewTransaction, RecordStore};
use shared::{FixedCost, Transaction, TransactionType};

pub fn sample_transaction(date: &str, merchant: &str, amount: u64) -> Transaction {
    Transaction {
        id: Some(format!("tx-{}-{}", date, merchant)),
        date: date.to_string(),
        merchant: merchant.to_string(),
        amount,
        category: String::new(),
        transaction_type: TransactionType::Expense,
    }
}

/// Behaves like the upstream ledger: assigns ids, applies mutations to
/// its own state, and serves lists from it. Can be told to fail the
/// next listing to exercise transport-failure paths.
#[derive(Default)]
pub struct MockRecordStore {
    transactions: Mutex<Vec<Transaction>>,
    fixed_costs: Mutex<Vec<FixedCost>>,
    next_id: AtomicUsize,
    fail_next_listing: AtomicBool,
    list_calls: AtomicUsize,
}

impl MockRecordStore {
    pub fn push(&self, tx: Transaction) {
        self.transactions.lock().unwrap().push(tx);
    }

    pub fn fail_next_listing(&self) {
        self.fail_next_listing.store(true, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn mint_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn list_transactions(
        &self,
        _source: Option<&str>,
    ) -> Result<Vec<Transaction>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_listing.swap(false, Ordering::SeqCst) {
            return Err(ClientError::Http { status: 503 });
        }
        Ok(self.transactions.lock().unwrap().clone())
    }

    async fn list_fixed_costs(&self, _source: Option<&str>) -> Result<Vec<FixedCost>, ClientError> {
        Ok(self.fixed_costs.lock().unwrap().clone())
    }

    async fn create_transaction(
        &self,
        fields: NewTransaction,
        _source: Option<&str>,
    ) -> Result<(), ClientError> {
        let tx = Transaction {
            id: Some(self.mint_id("tx")),
            date: fields.date,
            merchant: fields.merchant,
            amount: fields.amount,
            category: fields.category,
            transaction_type: fields.transaction_type,
        };
        self.transactions.lock().unwrap().push(tx);
        Ok(())
    }

    async fn delete_transaction(
        &self,
        id: &str,
        _source: Option<&str>,
    ) -> Result<(), ClientError> {
        self.transactions
            .lock()
            .unwrap()
            .retain(|tx| tx.id.as_deref() != Some(id));
        Ok(())
    }

    async fn create_fixed_cost(
        &self,
        fields: NewFixedCost,
        _source: Option<&str>,
    ) -> Result<(), ClientError> {
        let fixed = FixedCost {
            id: Some(self.mint_id("fc")),
            name: fields.name,
            amount: fields.amount,
            category: fields.category,
            transaction_type: fields.transaction_type,
            day: fields.day,
        };
        self.fixed_costs.lock().unwrap().push(fixed);
        Ok(())
    }

    async fn delete_fixed_cost(&self, id: &str, _source: Option<&str>) -> Result<(), ClientError> {
        self.fixed_costs
            .lock()
            .unwrap()
            .retain(|fc| fc.id.as_deref() != Some(id));
        Ok(())
    }

    async fn recategorize(
        &self,
        merchant: &str,
        new_category: &str,
        _source: Option<&str>,
    ) -> Result<(), ClientError> {
        for tx in self.transactions.lock().unwrap().iter_mut() {
            if tx.merchant == merchant {
                tx.category = new_category.to_string();
            }
        }
        Ok(())
    }
}
