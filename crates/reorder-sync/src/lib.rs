//! # Reorder Sync
//!
//! 外部訂單與庫存資料的同步（重試、退避、去重）

pub mod error;
pub mod retry;
pub mod service;
pub mod source;

// Re-export 主要類型
pub use error::SyncError;
pub use retry::{RetryPolicy, RetryingSource, Sleeper, ThreadSleeper};
pub use service::{SyncKind, SyncReport, SyncService};
pub use source::{OrderSource, StockSource};
