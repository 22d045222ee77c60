//! # Reorder Core
//!
//! 補貨建議引擎的核心資料模型與類型定義

pub mod config;
pub mod decision;
pub mod order;
pub mod pattern;
pub mod period;
pub mod stock;
pub mod velocity;

// Re-export 主要類型
pub use config::{
    AggregationMode, BufferSpec, ReorderConfig, ReorderParams, SkuOverride, DAYS_PER_MONTH,
};
pub use decision::{DataQualityNote, ReorderDecision, Urgency};
pub use order::{OrderLine, OrderStatus};
pub use pattern::{SkuPattern, SkuPatternSet};
pub use period::AnalysisPeriod;
pub use stock::{StockKey, StockSnapshot, ALL_WAREHOUSES, UNKNOWN_WAREHOUSE};
pub use velocity::{SalesHistory, VelocityRecord, VelocitySource};

/// 補貨計算錯誤類型
///
/// 只有輸入驗證失敗才會成為錯誤；缺少庫存、零銷量等單一 SKU 的資料品質問題
/// 以 [`DataQualityNote`] 標註在決策上，不會中斷整批計算。
#[derive(Debug, thiserror::Error)]
pub enum ReorderError {
    #[error("無效的分析期間: {0}")]
    InvalidPeriod(String),

    #[error("無效的補貨配置: {0}")]
    InvalidConfig(String),

    #[error("無效的 SKU 樣式: {0}")]
    InvalidPattern(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReorderError>;
