use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A deposited physical item, or a fractional share split from one.
///
/// `share_percentage` is the fraction of the full value attributed to
/// `owner_id`, in [0, 1]. Zero means the item was fully traded away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Item {
    pub item_id: Uuid,
    pub owner_id: Uuid,
    pub category: String,
    pub subcategory: String,
    pub brand: String,
    pub condition: String,
    pub photo: String,
    pub value: Decimal,
    pub is_fractional: bool,
    pub share_percentage: Decimal,
    pub parent_item_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

fn full_share() -> Decimal {
    Decimal::ONE
}

/// Deposit payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub owner_id: Uuid,
    pub category: String,
    pub subcategory: String,
    pub brand: String,
    pub condition: String,
    pub photo: String,
    pub value: Decimal,
    #[serde(default)]
    pub is_fractional: bool,
    #[serde(default = "full_share")]
    pub share_percentage: Decimal,
    #[serde(default)]
    pub parent_item_id: Option<Uuid>,
}

/// Owner/share patch. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Uuid>,
}

/// Check that a stored share lies in [0, 1]
pub fn validate_share(share: Decimal) -> Result<(), String> {
    if share < Decimal::ZERO || share > Decimal::ONE {
        return Err(format!("share_percentage must be between 0 and 1, got {}", share));
    }
    Ok(())
}

impl Item {
    pub fn new(req: ItemCreate) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            item_id: Uuid::new_v4(),
            owner_id: req.owner_id,
            category: req.category,
            subcategory: req.subcategory,
            brand: req.brand,
            condition: req.condition,
            photo: req.photo,
            value: req.value,
            is_fractional: req.is_fractional,
            share_percentage: req.share_percentage,
            parent_item_id: req.parent_item_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fully transferred away; kept as a record only
    pub fn is_orphaned(&self) -> bool {
        self.share_percentage.is_zero()
    }
}

impl ItemCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.category.trim().is_empty() {
            return Err("category is required".to_string());
        }
        if self.subcategory.trim().is_empty() {
            return Err("subcategory is required".to_string());
        }
        if self.value < Decimal::ZERO {
            return Err("value must not be negative".to_string());
        }
        validate_share(self.share_percentage)
    }
}

impl ItemUpdate {
    pub fn validate(&self) -> Result<(), String> {
        match self.share_percentage {
            Some(share) => validate_share(share),
            None => Ok(()),
        }
    }

    /// Apply present fields and bump `updated_at`
    pub fn apply_to(&self, item: &mut Item, now: NaiveDateTime) {
        if let Some(share) = self.share_percentage {
            item.share_percentage = share;
        }
        if let Some(owner_id) = self.owner_id {
            item.owner_id = owner_id;
        }
        item.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> ItemCreate {
        serde_json::from_value(serde_json::json!({
            "owner_id": Uuid::new_v4(),
            "category": "clothing",
            "subcategory": "shirt",
            "brand": "Nike",
            "condition": "excellent",
            "photo": "ZmFrZQ==",
            "value": 45.99
        }))
        .unwrap()
    }

    #[test]
    fn test_create_defaults_to_full_share() {
        let req = create_request();
        assert_eq!(req.share_percentage, Decimal::ONE);
        assert!(!req.is_fractional);
        assert!(req.parent_item_id.is_none());

        let item = Item::new(req);
        assert!(!item.is_orphaned());
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn test_share_range() {
        assert!(validate_share(Decimal::ZERO).is_ok());
        assert!(validate_share(Decimal::ONE).is_ok());
        assert!(validate_share(Decimal::new(15, 1)).is_err());
        assert!(validate_share(Decimal::new(-1, 1)).is_err());
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut item = Item::new(create_request());
        let owner = item.owner_id;
        let update = ItemUpdate {
            share_percentage: Some(Decimal::new(25, 2)),
            owner_id: None,
        };
        let later = item.updated_at + chrono::Duration::seconds(5);
        update.apply_to(&mut item, later);

        assert_eq!(item.share_percentage, Decimal::new(25, 2));
        assert_eq!(item.owner_id, owner);
        assert_eq!(item.updated_at, later);
    }
}
