//! Wire-level types shared between the record-store client, the relay
//! proxy and the application layer.
//!
//! The upstream ledger is a spreadsheet-backed script endpoint, so the
//! payloads it produces are loosely typed: amounts arrive as numbers or
//! numeric strings, ids as strings or row numbers, and optional fields
//! are simply absent. Deserialization here is deliberately lenient —
//! a single sloppy cell must never fail the whole list.

use serde::{Deserialize, Deserializer, Serialize};

/// Direction of a ledger entry. The sign of money movement lives here,
/// never in the amount itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TransactionType {
    /// Money received (salary, bonus, ...)
    Income,
    /// Money spent. Records without an explicit type are expenses.
    #[default]
    Expense,
}

/// A single ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Server-assigned opaque identifier. Absent until persisted.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub id: Option<String>,
    /// Calendar date in canonical `YYYY/MM/DD` form.
    pub date: String,
    /// Payee / description. Also the join key for bulk recategorization.
    pub merchant: String,
    /// Monetary magnitude in integer currency units, always >= 0.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: u64,
    /// Free-text category label. Empty means "not yet categorized";
    /// normalization to the uncategorized sentinel happens at
    /// aggregation time, never here.
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
}

/// A recurring-cost template. The upstream service materializes one
/// transaction from it on `day` of every month; the client only
/// creates and deletes these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedCost {
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: u64,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
    /// Day of month (1-31) on which the upstream generates the entry.
    #[serde(deserialize_with = "lenient_day")]
    pub day: u8,
}

/// The `POST /api/expenses` action envelope. Serializes with the
/// `action` tag the upstream script dispatches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum MutationRequest {
    #[serde(rename = "addTransaction")]
    AddTransaction {
        date: String,
        merchant: String,
        amount: u64,
        category: String,
        #[serde(rename = "type")]
        transaction_type: TransactionType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    #[serde(rename = "deleteTransaction")]
    DeleteTransaction {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    #[serde(rename = "addFixedCost")]
    AddFixedCost {
        name: String,
        amount: u64,
        category: String,
        #[serde(rename = "type")]
        transaction_type: TransactionType,
        day: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    #[serde(rename = "deleteFixedCost")]
    DeleteFixedCost {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
    /// Bulk recategorization: retroactively rewrites the category of
    /// every transaction matching `merchant` and updates the upstream
    /// auto-classification rule for future imports. Irreversible except
    /// by another recategorize call; callers confirm with the user
    /// before sending.
    #[serde(rename = "updateCategory")]
    UpdateCategory {
        merchant: String,
        category: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },
}

/// Upstream reply to a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Accepts a JSON number or a numeric string; anything else degrades
/// to zero rather than failing the payload. Negative values are
/// clamped — sign is carried by the transaction type.
fn lenient_amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => n,
        Some(Raw::Text(s)) => s.trim().replace(',', "").parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    };
    if value.is_finite() && value > 0.0 {
        Ok(value.round() as u64)
    } else {
        Ok(0)
    }
}

/// Day-of-month from a number or numeric string, clamped to 1-31.
fn lenient_day<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => s.trim().parse::<f64>().unwrap_or(1.0),
    };
    Ok((value.round() as i64).clamp(1, 31) as u8)
}

/// Ids come back as strings from some sheets and row numbers from
/// others; normalize both to an owned string.
fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_defaults_to_expense() {
        let tx: Transaction = serde_json::from_str(
            r#"{"date":"2024/03/01","merchant":"Starbucks","amount":500}"#,
        )
        .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Expense);
        assert_eq!(tx.category, "");
        assert_eq!(tx.id, None);
    }

    #[test]
    fn amount_accepts_numeric_strings_and_floats() {
        let tx: Transaction = serde_json::from_str(
            r#"{"date":"2024/03/01","merchant":"a","amount":"1,200"}"#,
        )
        .unwrap();
        assert_eq!(tx.amount, 1200);

        let tx: Transaction =
            serde_json::from_str(r#"{"date":"2024/03/01","merchant":"a","amount":999.6}"#).unwrap();
        assert_eq!(tx.amount, 1000);
    }

    #[test]
    fn non_numeric_amount_degrades_to_zero() {
        let tx: Transaction =
            serde_json::from_str(r#"{"date":"2024/03/01","merchant":"a","amount":"n/a"}"#).unwrap();
        assert_eq!(tx.amount, 0);
    }

    #[test]
    fn numeric_id_is_normalized_to_string() {
        let fixed: FixedCost = serde_json::from_str(
            r#"{"id":42,"name":"家賃","amount":80000,"category":"住居費","day":"27"}"#,
        )
        .unwrap();
        assert_eq!(fixed.id.as_deref(), Some("42"));
        assert_eq!(fixed.day, 27);
    }

    #[test]
    fn mutation_request_carries_action_tag() {
        let req = MutationRequest::UpdateCategory {
            merchant: "Starbucks".into(),
            category: "趣味".into(),
            source: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["action"], "updateCategory");
        assert_eq!(json["merchant"], "Starbucks");
        assert!(json.get("source").is_none());
    }

    #[test]
    fn delete_request_includes_source_when_set() {
        let req = MutationRequest::DeleteTransaction {
            id: "tx-1".into(),
            source: Some("yahoo".into()),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["action"], "deleteTransaction");
        assert_eq!(json["source"], "yahoo");
    }
}
