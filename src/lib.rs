//! # Reorder
//!
//! 補貨建議引擎：依歷史銷量與現有庫存計算再訂購點、建議訂購量與緊急程度。
//!
//! - [`model`]：資料模型與配置
//! - [`calc`]：速度計算、補貨決策、建議彙總
//! - [`store`]：訂單、庫存快照、SKU 樣式儲存
//! - [`sync`]：外部資料同步

pub use reorder_calc as calc;
pub use reorder_core as model;
pub use reorder_store as store;
pub use reorder_sync as sync;

pub use reorder_calc::{PipelineInput, RecommendationReport, ReorderPipeline, ZeroSalesPolicy};
pub use reorder_core::{
    AggregationMode, AnalysisPeriod, BufferSpec, OrderLine, ReorderConfig, ReorderDecision,
    ReorderError, ReorderParams, SkuPatternSet, StockSnapshot, Urgency,
};
