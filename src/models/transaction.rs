//! Ledger entries shown in a user's activity feed

use crate::models::Item;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Id prefix of deposit entries synthesized from items
pub const DEPOSIT_ID_PREFIX: &str = "deposit-";

/// Transaction types for value movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Deposit,
    Payment,
    Withdrawal,
    Refund,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Payment => "payment",
            Self::Withdrawal => "withdrawal",
            Self::Refund => "refund",
            Self::Transfer => "transfer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(Self::Deposit),
            "payment" => Some(Self::Payment),
            "withdrawal" => Some(Self::Withdrawal),
            "refund" => Some(Self::Refund),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Snapshot of the item a transaction refers to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDetails {
    pub brand: Option<String>,
    pub subcategory: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
}

/// Part of an item spent in a payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpentItem {
    pub item_id: Uuid,
    #[serde(default)]
    pub label: Option<String>,
    pub amount: Decimal,
    pub fraction: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub item_id: Option<Uuid>,
    pub item_details: Option<ItemDetails>,
    pub merchant_name: Option<String>,
    pub website_name: Option<String>,
    pub status: TransactionStatus,
    pub description: Option<String>,
    pub spent_items: Option<Vec<SpentItem>>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCreate {
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub item_id: Option<Uuid>,
    #[serde(default)]
    pub item_details: Option<ItemDetails>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub website_name: Option<String>,
    #[serde(default)]
    pub status: Option<TransactionStatus>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub spent_items: Option<Vec<SpentItem>>,
}

impl TransactionCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.amount < Decimal::ZERO {
            return Err("amount must not be negative".to_string());
        }
        if let Some(spent) = &self.spent_items {
            for s in spent {
                if s.fraction < Decimal::ZERO || s.fraction > Decimal::ONE {
                    return Err(format!(
                        "spent item {}: fraction must be between 0 and 1",
                        s.item_id
                    ));
                }
                if s.amount < Decimal::ZERO {
                    return Err(format!("spent item {}: amount must not be negative", s.item_id));
                }
            }
        }
        Ok(())
    }
}

impl Transaction {
    pub fn new(req: TransactionCreate) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            transaction_id: Uuid::new_v4().to_string(),
            user_id: req.user_id,
            transaction_type: req.transaction_type,
            amount: req.amount,
            item_id: req.item_id,
            item_details: req.item_details,
            merchant_name: req.merchant_name,
            website_name: req.website_name,
            status: req.status.unwrap_or(TransactionStatus::Completed),
            description: req.description,
            spent_items: req.spent_items,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Deposit entry derived from an item the user holds. Never persisted.
    pub fn deposit_from_item(item: &Item) -> Self {
        Self {
            transaction_id: format!("{}{}", DEPOSIT_ID_PREFIX, item.item_id),
            user_id: item.owner_id,
            transaction_type: TransactionType::Deposit,
            amount: item.value,
            item_id: Some(item.item_id),
            item_details: Some(ItemDetails {
                brand: Some(item.brand.clone()),
                subcategory: Some(item.subcategory.clone()),
                category: Some(item.category.clone()),
                condition: Some(item.condition.clone()),
            }),
            merchant_name: None,
            website_name: None,
            status: TransactionStatus::Completed,
            description: Some(format!("Deposited {} {}", item.brand, item.subcategory)),
            spent_items: None,
            created_at: Some(item.created_at),
            updated_at: None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.transaction_id.starts_with(DEPOSIT_ID_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemCreate;

    #[test]
    fn test_deposit_from_item() {
        let item = Item::new(ItemCreate {
            owner_id: Uuid::new_v4(),
            category: "shoes".into(),
            subcategory: "sneakers".into(),
            brand: "Adidas".into(),
            condition: "good".into(),
            photo: String::new(),
            value: Decimal::new(8999, 2),
            is_fractional: false,
            share_percentage: Decimal::ONE,
            parent_item_id: None,
        });

        let tx = Transaction::deposit_from_item(&item);
        assert_eq!(tx.transaction_id, format!("deposit-{}", item.item_id));
        assert!(tx.is_synthetic());
        assert_eq!(tx.transaction_type, TransactionType::Deposit);
        assert_eq!(tx.amount, item.value);
        assert_eq!(tx.description.as_deref(), Some("Deposited Adidas sneakers"));
        assert_eq!(tx.created_at, Some(item.created_at));
        assert_eq!(
            tx.item_details.unwrap().category.as_deref(),
            Some("shoes")
        );
    }

    #[test]
    fn test_create_wire_format() {
        let req: TransactionCreate = serde_json::from_value(serde_json::json!({
            "user_id": Uuid::new_v4(),
            "type": "payment",
            "amount": 45.5,
            "merchant_name": "Coffee Shop",
            "spent_items": [{"item_id": Uuid::new_v4(), "amount": 45.5, "fraction": 0.5}]
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let tx = Transaction::new(req);
        assert_eq!(tx.status, TransactionStatus::Completed);
        assert!(!tx.is_synthetic());

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "payment");
        assert_eq!(json["status"], "completed");
    }

    #[test]
    fn test_rejects_bad_fraction() {
        let req: TransactionCreate = serde_json::from_value(serde_json::json!({
            "user_id": Uuid::new_v4(),
            "type": "payment",
            "amount": 10,
            "spent_items": [{"item_id": Uuid::new_v4(), "amount": 10, "fraction": 1.5}]
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
