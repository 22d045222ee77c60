//! 外部資料來源介面

use reorder_core::{AnalysisPeriod, OrderLine, StockSnapshot};

use crate::error::Result;

/// 訂單來源（例如庫存管理系統的銷售 API）
///
/// 回傳的每一筆訂單行都必須帶有訂單編號，用於去重。
pub trait OrderSource {
    fn fetch_orders(&self, window: &AnalysisPeriod) -> Result<Vec<OrderLine>>;
}

/// 庫存來源
pub trait StockSource {
    fn fetch_stock(&self) -> Result<Vec<StockSnapshot>>;
}

impl<T: OrderSource + ?Sized> OrderSource for &T {
    fn fetch_orders(&self, window: &AnalysisPeriod) -> Result<Vec<OrderLine>> {
        (**self).fetch_orders(window)
    }
}

impl<T: StockSource + ?Sized> StockSource for &T {
    fn fetch_stock(&self) -> Result<Vec<StockSnapshot>> {
        (**self).fetch_stock()
    }
}
