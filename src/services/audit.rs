use crate::error::{AppError, AppResult};
use crate::models::{SyncSummary, Trade};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub timestamp: i64,
    pub event_type: String, // "trade_settled", "trades_synced", "trade_sync_failed"
    pub trade_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub details: serde_json::Value,
}

/// Append-only JSON-lines record of ownership changes
pub struct AuditTrailService {
    log_file: PathBuf,
    file_handle: Arc<Mutex<std::fs::File>>,
}

impl AuditTrailService {
    /// Open (or create) today's audit file under `log_directory`
    pub fn new(log_directory: &Path) -> AppResult<Self> {
        std::fs::create_dir_all(log_directory)
            .map_err(|e| AppError::Message(format!("Failed to create log directory: {}", e)))?;

        let date = chrono::Utc::now().format("%Y-%m-%d");
        let log_file = log_directory.join(format!("audit_{}.log", date));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| AppError::Message(format!("Failed to open audit log file: {}", e)))?;

        info!("Audit trail initialized: {:?}", log_file);

        Ok(Self {
            log_file,
            file_handle: Arc::new(Mutex::new(file)),
        })
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Log an audit entry
    pub async fn log(&self, entry: AuditLogEntry) -> AppResult<()> {
        let json = serde_json::to_string(&entry)?;

        let mut file = self.file_handle.lock().await;
        writeln!(file, "{}", json)
            .map_err(|e| AppError::Message(format!("Failed to write audit log: {}", e)))?;

        file.flush()
            .map_err(|e| AppError::Message(format!("Failed to flush audit log: {}", e)))?;

        Ok(())
    }

    /// Log a settled trade with its content fingerprint
    pub async fn log_trade_settled(&self, trade: &Trade) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "trade_settled".to_string(),
            trade_id: Some(trade.trade_id),
            user_id: Some(trade.payer_id),
            details: serde_json::json!({
                "payee_id": trade.payee_id,
                "item_count": trade.items.len(),
                "total_value": trade.total_value.to_string(),
                "fingerprint": trade.fingerprint(),
            }),
        };

        self.log(entry).await
    }

    /// Log the outcome of an offline batch
    pub async fn log_trades_synced(&self, summary: &SyncSummary) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "trades_synced".to_string(),
            trade_id: None,
            user_id: None,
            details: serde_json::json!({
                "synced": summary.synced_count,
                "failed": summary.failed_count,
                "synced_ids": summary.synced_ids,
            }),
        };

        self.log(entry).await
    }

    /// Log one rejected submission from an offline batch
    pub async fn log_trade_sync_failed(&self, index: usize, error: &str) -> AppResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp(),
            event_type: "trade_sync_failed".to_string(),
            trade_id: None,
            user_id: None,
            details: serde_json::json!({
                "index": index,
                "error": error,
            }),
        };

        self.log(entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TradeCreate, TradeItem};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_entries_are_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let audit = AuditTrailService::new(dir.path()).unwrap();

        let trade = Trade::new(TradeCreate {
            payer_id: Uuid::new_v4(),
            payee_id: Uuid::new_v4(),
            items: vec![TradeItem {
                item_id: Uuid::new_v4(),
                share_percentage: Decimal::new(5, 1),
                value: Decimal::new(40, 0),
                previous_owner: Uuid::new_v4(),
                new_owner: Uuid::new_v4(),
            }],
            total_value: Decimal::new(40, 0),
            payer_signature: "a".into(),
            payee_signature: "b".into(),
        });

        audit.log_trade_settled(&trade).await.unwrap();
        audit.log_trade_sync_failed(2, "malformed trade").await.unwrap();

        let contents = std::fs::read_to_string(audit.log_file()).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event_type"], "trade_settled");
        assert_eq!(lines[0]["details"]["fingerprint"], trade.fingerprint());
        assert_eq!(lines[1]["details"]["index"], 2);
    }
}
