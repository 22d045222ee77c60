//! 補貨決策模型

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stock::StockKey;
use crate::velocity::VelocitySource;

/// 緊急程度
///
/// 宣告順序即排序順序：`StockoutRisk` 最緊急，`Healthy` 最不緊急。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    /// 即使今天下單，到貨前也會斷貨
    StockoutRisk,
    /// 低於再訂購點
    Critical,
    /// 接近再訂購點
    Warning,
    /// 庫存充足
    Healthy,
}

impl Urgency {
    /// 依緊急程度排序的所有等級
    pub const ALL: [Urgency; 4] = [
        Urgency::StockoutRisk,
        Urgency::Critical,
        Urgency::Warning,
        Urgency::Healthy,
    ];
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::StockoutRisk => write!(f, "STOCKOUT_RISK"),
            Urgency::Critical => write!(f, "CRITICAL"),
            Urgency::Warning => write!(f, "WARNING"),
            Urgency::Healthy => write!(f, "HEALTHY"),
        }
    }
}

/// 單一決策上的資料品質標註（不中斷整批計算）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityNote {
    /// 有銷售速度但找不到庫存快照，現有庫存以 0 計
    MissingStockData,
    /// 期間內無銷售，斷貨天數為無限
    NoSalesHistory,
    /// 銷售速度不是觀測值
    VelocityOverridden { source: VelocitySource },
}

/// 補貨決策（每次計算完整推導，除 SKU/倉庫鍵外不跨呼叫保留身分）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderDecision {
    pub sku: String,

    /// 倉庫代碼，或 "ALL"
    pub warehouse: String,

    /// 放大後日均銷量
    pub scaled_velocity: f64,

    /// 提前期需求 = 速度 × 提前期
    pub lead_time_demand: f64,

    /// 安全庫存 = 速度 × 緩衝天數
    pub safety_stock: f64,

    /// 再訂購點 = 提前期需求 + 安全庫存
    pub reorder_point: f64,

    /// 現有庫存
    pub current_stock: u64,

    /// 預計斷貨天數；無銷售時為 +∞（JSON 中為 null）
    #[serde(with = "horizon")]
    pub days_until_stockout: f64,

    /// 建議訂購量
    pub order_quantity: f64,

    pub urgency: Urgency,

    pub notes: Vec<DataQualityNote>,
}

impl ReorderDecision {
    pub fn key(&self) -> StockKey {
        StockKey::new(self.sku.clone(), self.warehouse.clone())
    }

    /// 是否建議下單
    pub fn needs_reorder(&self) -> bool {
        self.order_quantity > 0.0
    }

    /// 距再訂購點的缺口
    pub fn deficit_to_reorder_point(&self) -> f64 {
        (self.reorder_point - self.current_stock as f64).max(0.0)
    }

    /// 現有庫存相對再訂購點的差額（可為負）
    pub fn stock_vs_reorder_point(&self) -> f64 {
        self.current_stock as f64 - self.reorder_point
    }

    pub fn weekly_velocity(&self) -> f64 {
        self.scaled_velocity * 7.0
    }

    pub fn monthly_velocity(&self) -> f64 {
        self.scaled_velocity * 30.0
    }

    pub fn has_note(&self, note: DataQualityNote) -> bool {
        self.notes.contains(&note)
    }

    /// 是否以降級資料計算（缺少庫存快照）
    pub fn is_degraded(&self) -> bool {
        self.has_note(DataQualityNote::MissingStockData)
    }
}

/// 無限斷貨天數在 JSON 中以 null 表示
mod horizon {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(current_stock: u64, reorder_point: f64, days_until_stockout: f64) -> ReorderDecision {
        ReorderDecision {
            sku: "OB-ESS-S".to_string(),
            warehouse: "ALL".to_string(),
            scaled_velocity: 1.0,
            lead_time_demand: reorder_point / 2.0,
            safety_stock: reorder_point / 2.0,
            reorder_point,
            current_stock,
            days_until_stockout,
            order_quantity: 0.0,
            urgency: Urgency::Healthy,
            notes: Vec::new(),
        }
    }

    #[test]
    fn test_urgency_ordering() {
        let mut tiers = vec![Urgency::Healthy, Urgency::Critical, Urgency::StockoutRisk, Urgency::Warning];
        tiers.sort();
        assert_eq!(tiers, Urgency::ALL.to_vec());
        assert_eq!(Urgency::StockoutRisk.to_string(), "STOCKOUT_RISK");
    }

    #[test]
    fn test_deficit_to_reorder_point() {
        assert_eq!(decision(50, 216.0, 13.9).deficit_to_reorder_point(), 166.0);
        assert_eq!(decision(250, 216.0, 69.4).deficit_to_reorder_point(), 0.0);
        assert_eq!(decision(250, 216.0, 69.4).stock_vs_reorder_point(), 34.0);
    }

    #[test]
    fn test_infinite_horizon_serializes_as_null() {
        let value = serde_json::to_value(decision(10, 0.0, f64::INFINITY)).unwrap();
        assert!(value["days_until_stockout"].is_null());
        assert_eq!(value["urgency"], "HEALTHY");

        let back: ReorderDecision = serde_json::from_value(value).unwrap();
        assert!(back.days_until_stockout.is_infinite());
    }

    #[test]
    fn test_notes_serialization() {
        let note = DataQualityNote::VelocityOverridden {
            source: VelocitySource::CategoryAverage,
        };
        let value = serde_json::to_value(note).unwrap();
        assert_eq!(value["kind"], "velocity_overridden");
        assert_eq!(value["source"], "category_average");
    }
}
