//! # Reorder Store
//!
//! 訂單、庫存快照與 SKU 樣式的儲存（各自獨立上鎖）

pub mod order_store;
pub mod pattern_store;
pub mod snapshot_cache;

// Re-export 主要類型
pub use order_store::OrderStore;
pub use pattern_store::PatternStore;
pub use snapshot_cache::StockSnapshotCache;

/// 儲存層錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("檔案讀寫失敗: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Pattern(#[from] reorder_core::ReorderError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
