//! # Reorder Calculation Engine
//!
//! 核心補貨計算引擎：銷售速度 → 補貨決策 → 建議彙總

pub mod aggregator;
pub mod engine;
pub mod pipeline;
pub mod stock_index;
pub mod velocity;

// Re-export 主要類型
pub use aggregator::{RecommendationAggregator, RecommendationReport, UrgencySummary};
pub use engine::ReorderEngine;
pub use pipeline::{PipelineInput, ReorderPipeline};
pub use stock_index::StockIndex;
pub use velocity::{VelocityCalculator, ZeroSalesPolicy};
