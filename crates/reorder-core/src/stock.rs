//! 庫存快照模型

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 跨倉彙總時使用的倉庫代碼
pub const ALL_WAREHOUSES: &str = "ALL";

/// 訂單行未帶倉庫時歸入的倉庫代碼
pub const UNKNOWN_WAREHOUSE: &str = "UNKNOWN";

/// SKU + 倉庫 的計算鍵
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StockKey {
    pub sku: String,
    pub warehouse: String,
}

impl StockKey {
    pub fn new(sku: String, warehouse: String) -> Self {
        Self { sku, warehouse }
    }

    /// 跨倉彙總鍵（倉庫 = "ALL"）
    pub fn aggregated(sku: String) -> Self {
        Self::new(sku, ALL_WAREHOUSES.to_string())
    }

    pub fn is_aggregated(&self) -> bool {
        self.warehouse == ALL_WAREHOUSES
    }
}

impl fmt::Display for StockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.sku, self.warehouse)
    }
}

/// 庫存快照（由外部同步提供）
///
/// 代表某一時間點的現有庫存，下一次同步時被較新的快照取代。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// SKU
    pub sku: String,

    /// 倉庫代碼，或 "ALL"
    pub warehouse: String,

    /// 現有庫存
    pub quantity: u64,

    /// 觀測時間
    pub observed_at: DateTime<Utc>,
}

impl StockSnapshot {
    /// 創建單倉庫存快照
    pub fn new(sku: String, warehouse: String, quantity: u64, observed_at: DateTime<Utc>) -> Self {
        Self {
            sku,
            warehouse,
            quantity,
            observed_at,
        }
    }

    /// 創建跨倉彙總快照
    pub fn aggregated(sku: String, quantity: u64, observed_at: DateTime<Utc>) -> Self {
        Self::new(sku, ALL_WAREHOUSES.to_string(), quantity, observed_at)
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.sku.clone(), self.warehouse.clone())
    }

    pub fn is_aggregated(&self) -> bool {
        self.warehouse == ALL_WAREHOUSES
    }

    /// 同一鍵下，較新的觀測取代較舊的
    pub fn supersedes(&self, other: &StockSnapshot) -> bool {
        self.sku == other.sku
            && self.warehouse == other.warehouse
            && self.observed_at >= other.observed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_create_snapshot() {
        let at = Utc.with_ymd_and_hms(2025, 9, 24, 8, 0, 0).unwrap();
        let snapshot = StockSnapshot::new("OB-ESS-Q".to_string(), "VIC".to_string(), 267, at);

        assert_eq!(snapshot.key(), StockKey::new("OB-ESS-Q".to_string(), "VIC".to_string()));
        assert!(!snapshot.is_aggregated());
        assert_eq!(snapshot.key().to_string(), "OB-ESS-Q@VIC");
    }

    #[test]
    fn test_supersedes() {
        let earlier = Utc.with_ymd_and_hms(2025, 9, 24, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 9, 25, 8, 0, 0).unwrap();

        let old = StockSnapshot::new("OB-ESS-K".to_string(), "QLD".to_string(), 300, earlier);
        let new = StockSnapshot::new("OB-ESS-K".to_string(), "QLD".to_string(), 326, later);
        let other = StockSnapshot::new("OB-ESS-K".to_string(), "NSW".to_string(), 10, later);

        assert!(new.supersedes(&old));
        assert!(!old.supersedes(&new));
        assert!(!other.supersedes(&old));
    }

    #[test]
    fn test_aggregated_key() {
        let key = StockKey::aggregated("OB-ORG-S".to_string());
        assert!(key.is_aggregated());
        assert_eq!(key.warehouse, ALL_WAREHOUSES);
    }
}
