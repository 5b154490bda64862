//! Wire types for the provider API.
//!
//! Snapshot structs mirror the provider's JSON field names so responses
//! deserialize directly; the reconcilers copy them 1:1 into the local
//! mirror.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Response of a link-token creation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkToken {
    pub link_token: String,
    pub expiration: Option<String>,
    pub request_id: String,
}

/// Response of a public-token exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenExchange {
    pub access_token: String,
    pub item_id: String,
    pub request_id: String,
}

/// One account as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub account_id: String,
    pub mask: Option<String>,
    pub name: String,
    pub official_name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    pub subtype: Option<String>,
}

/// One transaction as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionSnapshot {
    pub transaction_id: String,
    pub account_id: String,
    pub account_owner: Option<String>,
    pub amount: Decimal,
    pub name: String,
    pub merchant_name: Option<String>,
    pub category_id: Option<String>,
    pub category: Option<JsonValue>,
    pub iso_currency_code: Option<String>,
    pub unofficial_currency_code: Option<String>,
    #[serde(default)]
    pub location: JsonValue,
    pub payment_channel: String,
    pub pending: bool,
    #[serde(default)]
    pub payment_meta: JsonValue,
    pub date: NaiveDate,
    pub authorized_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_snapshot_deserializes_provider_shape() {
        let json = r#"{
            "account_id": "vzeNDwK7KQIm4yEog683uElbp9GRLEFXGK98D",
            "mask": "0000",
            "name": "Checking",
            "official_name": "Plus Checking",
            "type": "depository",
            "subtype": "checking"
        }"#;
        let snapshot: AccountSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.account_type, "depository");
        assert_eq!(snapshot.subtype.as_deref(), Some("checking"));
    }

    #[test]
    fn test_transaction_snapshot_defaults_empty_objects() {
        let json = r#"{
            "transaction_id": "tx-1",
            "account_id": "acc-1",
            "amount": 12.5,
            "name": "Coffee",
            "payment_channel": "in store",
            "pending": false,
            "date": "2024-03-02"
        }"#;
        let snapshot: TransactionSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.transaction_id, "tx-1");
        assert!(snapshot.location.is_null());
        assert_eq!(snapshot.date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }
}
