use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Trade status. Trades are written once as `completed`; the other
/// states exist for clients that track pending offline trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Completed,
    Failed,
}

impl TradeStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TradeStatus::Pending),
            "completed" => Ok(TradeStatus::Completed),
            "failed" => Ok(TradeStatus::Failed),
            _ => Err(format!("Invalid trade status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeStatus::Pending => "pending",
            TradeStatus::Completed => "completed",
            TradeStatus::Failed => "failed",
        }
    }
}

/// One item's share moving from `previous_owner` to `new_owner`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeItem {
    pub item_id: Uuid,
    /// Fraction of the item transferred, in (0, 1]
    pub share_percentage: Decimal,
    pub value: Decimal,
    pub previous_owner: Uuid,
    pub new_owner: Uuid,
}

impl TradeItem {
    /// Share written back to the item on single-trade settlement.
    ///
    /// Partial transfers store `1 - transferred`; a full transfer stores 0
    /// even though the item is reassigned to `new_owner`.
    pub fn remaining_share(&self) -> Decimal {
        if self.share_percentage < Decimal::ONE {
            Decimal::ONE - self.share_percentage
        } else {
            Decimal::ZERO
        }
    }

    /// Transferred share must lie in (0, 1].
    ///
    /// Stricter than [`remaining_share`](Self::remaining_share) alone: a zero
    /// share would store 1.0 and a share above 1 would store 0.0, so both are
    /// rejected instead of being written.
    pub fn validate(&self) -> Result<(), String> {
        if self.share_percentage <= Decimal::ZERO || self.share_percentage > Decimal::ONE {
            return Err(format!(
                "item {}: transferred share must be in (0, 1], got {}",
                self.item_id, self.share_percentage
            ));
        }
        if self.value < Decimal::ZERO {
            return Err(format!("item {}: value must not be negative", self.item_id));
        }
        Ok(())
    }
}

/// Immutable record of one ownership transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: Uuid,
    pub timestamp: NaiveDateTime,
    pub payer_id: Uuid,
    pub payee_id: Uuid,
    pub items: Vec<TradeItem>,
    pub total_value: Decimal,
    pub status: TradeStatus,
    pub payer_signature: String,
    pub payee_signature: String,
}

/// Trade submission, either live or replayed from an offline queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeCreate {
    pub payer_id: Uuid,
    pub payee_id: Uuid,
    pub items: Vec<TradeItem>,
    pub total_value: Decimal,
    pub payer_signature: String,
    pub payee_signature: String,
}

impl TradeCreate {
    /// Rejects empty item lists, missing signatures and out-of-range shares.
    ///
    /// Submissions are checked one at a time; there is no guard against the
    /// cumulative share of an item exceeding 1 across trades.
    pub fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err("trade must contain at least one item".to_string());
        }
        if self.payer_signature.trim().is_empty() || self.payee_signature.trim().is_empty() {
            return Err("trade must carry both payer and payee signatures".to_string());
        }
        if self.total_value < Decimal::ZERO {
            return Err("total_value must not be negative".to_string());
        }
        self.items.iter().try_for_each(TradeItem::validate)
    }
}

impl Trade {
    /// Build the persisted record for a submission, stamped `completed`
    pub fn new(req: TradeCreate) -> Self {
        Self {
            trade_id: Uuid::new_v4(),
            timestamp: chrono::Utc::now().naive_utc(),
            payer_id: req.payer_id,
            payee_id: req.payee_id,
            items: req.items,
            total_value: req.total_value,
            status: TradeStatus::Completed,
            payer_signature: req.payer_signature,
            payee_signature: req.payee_signature,
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.payer_id == user_id || self.payee_id == user_id
    }

    /// SHA-256 over the trade's identifying content, hex encoded
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(
            format!(
                "{}:{}:{}:{}:{}",
                self.trade_id,
                self.timestamp.and_utc().timestamp_millis(),
                self.payer_id,
                self.payee_id,
                self.total_value.normalize()
            )
            .as_bytes(),
        );
        for item in &self.items {
            hasher.update(
                format!(
                    "|{}:{}:{}:{}:{}",
                    item.item_id,
                    item.share_percentage.normalize(),
                    item.value.normalize(),
                    item.previous_owner,
                    item.new_owner
                )
                .as_bytes(),
            );
        }
        hasher.update(self.payer_signature.as_bytes());
        hasher.update(self.payee_signature.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Outcome of an offline batch sync. Failures never abort the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSummary {
    #[serde(rename = "synced")]
    pub synced_count: usize,
    #[serde(rename = "failed")]
    pub failed_count: usize,
    pub synced_ids: Vec<Uuid>,
    pub failures: Vec<SyncFailure>,
}

/// Position of a rejected submission in the batch and why it failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncFailure {
    pub index: usize,
    pub error: String,
}

impl SyncSummary {
    pub fn record_success(&mut self, trade_id: Uuid) {
        self.synced_count += 1;
        self.synced_ids.push(trade_id);
    }

    pub fn record_failure(&mut self, index: usize, error: String) {
        self.failed_count += 1;
        self.failures.push(SyncFailure { index, error });
    }

    pub fn is_partial(&self) -> bool {
        self.failed_count > 0 && self.synced_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade_item(share: Decimal) -> TradeItem {
        TradeItem {
            item_id: Uuid::new_v4(),
            share_percentage: share,
            value: Decimal::new(50, 0),
            previous_owner: Uuid::new_v4(),
            new_owner: Uuid::new_v4(),
        }
    }

    fn request(items: Vec<TradeItem>) -> TradeCreate {
        TradeCreate {
            payer_id: Uuid::new_v4(),
            payee_id: Uuid::new_v4(),
            items,
            total_value: Decimal::new(50, 0),
            payer_signature: "sig-a".into(),
            payee_signature: "sig-b".into(),
        }
    }

    #[test]
    fn test_remaining_share_partial_and_full() {
        assert_eq!(trade_item(Decimal::new(5, 1)).remaining_share(), Decimal::new(5, 1));
        assert_eq!(trade_item(Decimal::new(25, 2)).remaining_share(), Decimal::new(75, 2));
        assert_eq!(trade_item(Decimal::ONE).remaining_share(), Decimal::ZERO);
    }

    #[test]
    fn test_validation() {
        assert!(request(vec![trade_item(Decimal::new(5, 1))]).validate().is_ok());
        assert!(request(vec![]).validate().is_err());
        assert!(request(vec![trade_item(Decimal::ZERO)]).validate().is_err());
        assert!(request(vec![trade_item(Decimal::new(11, 1))]).validate().is_err());

        let mut unsigned = request(vec![trade_item(Decimal::ONE)]);
        unsigned.payee_signature = " ".into();
        assert!(unsigned.validate().is_err());
    }

    #[test]
    fn test_new_trade_is_completed() {
        let req = request(vec![trade_item(Decimal::ONE)]);
        let payer = req.payer_id;
        let trade = Trade::new(req);
        assert_eq!(trade.status, TradeStatus::Completed);
        assert!(trade.involves(payer));
        assert!(!trade.involves(Uuid::new_v4()));
    }

    #[test]
    fn test_fingerprint_is_stable_and_content_sensitive() {
        let trade = Trade::new(request(vec![trade_item(Decimal::new(5, 1))]));
        assert_eq!(trade.fingerprint(), trade.clone().fingerprint());
        assert_eq!(trade.fingerprint().len(), 64);

        let mut altered = trade.clone();
        altered.items[0].share_percentage = Decimal::new(4, 1);
        assert_ne!(trade.fingerprint(), altered.fingerprint());
    }

    #[test]
    fn test_status_round_trip_strings() {
        assert_eq!(TradeStatus::from_str("COMPLETED").unwrap(), TradeStatus::Completed);
        assert_eq!(TradeStatus::Pending.as_str(), "pending");
        assert!(TradeStatus::from_str("settled").is_err());
    }

    #[test]
    fn test_summary_wire_names() {
        let mut summary = SyncSummary::default();
        summary.record_success(Uuid::nil());
        summary.record_failure(1, "bad".into());
        assert!(summary.is_partial());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["synced"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["failures"][0]["index"], 1);
    }
}
