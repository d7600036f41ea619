//! Record-store client: the only component that talks to the ledger
//! endpoint. Pure I/O boundary — request shaping in, typed records
//! out, no business logic and no cache invalidation. Callers re-fetch
//! after a successful mutation instead of guessing the new state.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use serde::de::DeserializeOwned;
use shared::{FixedCost, MutationRequest, MutationResponse, Transaction, TransactionType};
use tracing::{debug, info};

use crate::error::ClientError;

/// Fields for a not-yet-persisted transaction. The server assigns the
/// id.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Canonical `YYYY/MM/DD`.
    pub date: String,
    pub merchant: String,
    pub amount: u64,
    pub category: String,
    pub transaction_type: TransactionType,
}

/// Fields for a new recurring-cost template.
#[derive(Debug, Clone)]
pub struct NewFixedCost {
    pub name: String,
    pub amount: u64,
    pub category: String,
    pub transaction_type: TransactionType,
    /// Day of month (1-31) the upstream materializes the entry on.
    pub day: u8,
}

/// The record-store contract. Abstracted behind a trait so the
/// orchestration layer can run against an in-memory double in tests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_transactions(&self, source: Option<&str>)
        -> Result<Vec<Transaction>, ClientError>;

    async fn list_fixed_costs(&self, source: Option<&str>) -> Result<Vec<FixedCost>, ClientError>;

    async fn create_transaction(
        &self,
        fields: NewTransaction,
        source: Option<&str>,
    ) -> Result<(), ClientError>;

    async fn delete_transaction(&self, id: &str, source: Option<&str>)
        -> Result<(), ClientError>;

    async fn create_fixed_cost(
        &self,
        fields: NewFixedCost,
        source: Option<&str>,
    ) -> Result<(), ClientError>;

    async fn delete_fixed_cost(&self, id: &str, source: Option<&str>) -> Result<(), ClientError>;

    /// Bulk recategorization: every transaction matching `merchant`,
    /// past and future, moves to `new_category`, and the upstream
    /// auto-classification rule is rewritten. Destructive in effect;
    /// the presentation layer confirms with the user before calling.
    async fn recategorize(
        &self,
        merchant: &str,
        new_category: &str,
        source: Option<&str>,
    ) -> Result<(), ClientError>;
}

/// HTTP implementation against the `/api/expenses` relay.
#[derive(Debug, Clone)]
pub struct RecordStoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecordStoreClient {
    /// `base_url` is the origin of the relay proxy, e.g.
    /// `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        // Every call must hit the network; an intermediate HTTP cache
        // would defeat the refresh semantics.
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn expenses_url(&self) -> String {
        format!("{}/api/expenses", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(self.expenses_url())
            .query(query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn post_mutation(&self, request: MutationRequest) -> Result<(), ClientError> {
        info!(?request, "submitting ledger mutation");
        let response = self
            .http
            .post(self.expenses_url())
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
            });
        }

        // The script endpoint replies with either {success, error?} or
        // an echo of the stored record. Only an explicit failure report
        // counts as a rejection.
        let body = response.text().await?;
        match serde_json::from_str::<MutationResponse>(&body) {
            Ok(MutationResponse { success: false, error }) => Err(ClientError::Rejected(
                error.unwrap_or_else(|| "unknown error".to_string()),
            )),
            Ok(MutationResponse { success: true, .. }) => Ok(()),
            Err(_) => {
                debug!("mutation response was not a status envelope; treating as echo");
                Ok(())
            }
        }
    }
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[async_trait]
impl RecordStore for RecordStoreClient {
    async fn list_transactions(
        &self,
        source: Option<&str>,
    ) -> Result<Vec<Transaction>, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(source) = source {
            query.push(("source", source.to_string()));
        }
        let transactions: Vec<Transaction> = self.get_json(&query).await?;
        debug!(count = transactions.len(), ?source, "fetched transaction list");
        Ok(transactions)
    }

    async fn list_fixed_costs(&self, source: Option<&str>) -> Result<Vec<FixedCost>, ClientError> {
        // The timestamp parameter busts any cache between us and the
        // script endpoint, matching the transaction list's no-store
        // policy.
        let mut query: Vec<(&str, String)> = vec![
            ("action", "getFixedCosts".to_string()),
            ("t", epoch_millis().to_string()),
        ];
        if let Some(source) = source {
            query.push(("source", source.to_string()));
        }
        self.get_json(&query).await
    }

    async fn create_transaction(
        &self,
        fields: NewTransaction,
        source: Option<&str>,
    ) -> Result<(), ClientError> {
        self.post_mutation(MutationRequest::AddTransaction {
            date: fields.date,
            merchant: fields.merchant,
            amount: fields.amount,
            category: fields.category,
            transaction_type: fields.transaction_type,
            source: source.map(str::to_string),
        })
        .await
    }

    async fn delete_transaction(
        &self,
        id: &str,
        source: Option<&str>,
    ) -> Result<(), ClientError> {
        self.post_mutation(MutationRequest::DeleteTransaction {
            id: id.to_string(),
            source: source.map(str::to_string),
        })
        .await
    }

    async fn create_fixed_cost(
        &self,
        fields: NewFixedCost,
        source: Option<&str>,
    ) -> Result<(), ClientError> {
        self.post_mutation(MutationRequest::AddFixedCost {
            name: fields.name,
            amount: fields.amount,
            category: fields.category,
            transaction_type: fields.transaction_type,
            day: fields.day,
            source: source.map(str::to_string),
        })
        .await
    }

    async fn delete_fixed_cost(&self, id: &str, source: Option<&str>) -> Result<(), ClientError> {
        self.post_mutation(MutationRequest::DeleteFixedCost {
            id: id.to_string(),
            source: source.map(str::to_string),
        })
        .await
    }

    async fn recategorize(
        &self,
        merchant: &str,
        new_category: &str,
        source: Option<&str>,
    ) -> Result<(), ClientError> {
        self.post_mutation(MutationRequest::UpdateCategory {
            merchant: merchant.to_string(),
            category: new_category.to_string(),
            source: source.map(str::to_string),
        })
        .await
    }
}
