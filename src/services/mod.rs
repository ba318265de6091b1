pub mod audit;
pub mod deposit_analysis;
pub mod item_service;
pub mod settlement;
pub mod transaction_service;
pub mod user_service;

pub use audit::AuditTrailService;
pub use deposit_analysis::{AnalyzeDepositRequest, DepositAnalysis, DepositAnalysisService};
pub use item_service::ItemService;
pub use settlement::SettlementService;
pub use transaction_service::TransactionService;
pub use user_service::UserService;
