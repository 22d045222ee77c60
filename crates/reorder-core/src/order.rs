//! 訂單行模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::AggregationMode;
use crate::stock::{StockKey, UNKNOWN_WAREHOUSE};

/// 訂單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// 有效訂單
    #[default]
    Active,

    /// 已作廢或取消，不計入銷量
    Voided,
}

impl OrderStatus {
    /// 由外部系統的狀態代碼轉換（VOIDED / VOID / CANCELLED / CANCELED 視為作廢）
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        if ["VOIDED", "VOID", "CANCELLED", "CANCELED"]
            .iter()
            .any(|voided| code.eq_ignore_ascii_case(voided))
        {
            OrderStatus::Voided
        } else {
            OrderStatus::Active
        }
    }

    pub fn is_voided(&self) -> bool {
        matches!(self, OrderStatus::Voided)
    }
}

/// 銷售訂單行（同步後不可變）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// SKU
    pub sku: String,

    /// 出貨倉庫
    pub warehouse: Option<String>,

    /// 銷售數量
    pub quantity: u64,

    /// 下單日期
    pub order_date: NaiveDate,

    /// 來源訂單號（用於避免重複同步）
    pub order_ref: Option<String>,

    /// 訂單狀態
    #[serde(default)]
    pub status: OrderStatus,
}

impl OrderLine {
    /// 創建新的訂單行
    pub fn new(sku: String, quantity: u64, order_date: NaiveDate) -> Self {
        Self {
            sku,
            warehouse: None,
            quantity,
            order_date,
            order_ref: None,
            status: OrderStatus::Active,
        }
    }

    /// 建構器模式：設置倉庫
    pub fn with_warehouse(mut self, warehouse: String) -> Self {
        self.warehouse = Some(warehouse);
        self
    }

    /// 建構器模式：設置來源訂單號
    pub fn with_order_ref(mut self, order_ref: String) -> Self {
        self.order_ref = Some(order_ref);
        self
    }

    /// 建構器模式：設置訂單狀態
    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// 倉庫代碼，未知時為 "UNKNOWN"
    pub fn warehouse_or_unknown(&self) -> &str {
        self.warehouse.as_deref().unwrap_or(UNKNOWN_WAREHOUSE)
    }

    /// 依彙總模式取得分組鍵
    pub fn key(&self, mode: AggregationMode) -> StockKey {
        match mode {
            AggregationMode::Aggregated => StockKey::aggregated(self.sku.clone()),
            AggregationMode::PerWarehouse => {
                StockKey::new(self.sku.clone(), self.warehouse_or_unknown().to_string())
            }
        }
    }
}
