//! 庫存快照快取

use std::collections::BTreeMap;

use parking_lot::RwLock;

use reorder_core::{StockKey, StockSnapshot};

/// 庫存快照快取
///
/// 每個 (SKU, 倉庫) 只保留最新一筆快照；計算時透過 [`snapshot`](Self::snapshot)
/// 取得獨立副本，計算期間不持有鎖。
#[derive(Debug, Default)]
pub struct StockSnapshotCache {
    entries: RwLock<BTreeMap<StockKey, StockSnapshot>>,
}

impl StockSnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 寫入一批快照，回傳實際被採用的筆數
    ///
    /// 觀測時間早於現有快照的會被忽略。
    pub fn apply(&self, snapshots: Vec<StockSnapshot>) -> usize {
        let mut entries = self.entries.write();
        let mut applied = 0;

        for snapshot in snapshots {
            let key = snapshot.key();
            if let Some(current) = entries.get(&key) {
                if !snapshot.supersedes(current) {
                    continue;
                }
            }

            entries.insert(key, snapshot);
            applied += 1;
        }

        tracing::debug!("庫存快照寫入 {} 筆，目前共 {} 個鍵", applied, entries.len());
        applied
    }

    pub fn get(&self, key: &StockKey) -> Option<StockSnapshot> {
        self.entries.read().get(key).cloned()
    }

    /// 目前所有快照的副本（依鍵排序）
    pub fn snapshot(&self) -> Vec<StockSnapshot> {
        self.entries.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn snapshot(warehouse: &str, qty: u64, hour: u32) -> StockSnapshot {
        StockSnapshot::new(
            "OB-ESS-Q".to_string(),
            warehouse.to_string(),
            qty,
            Utc.with_ymd_and_hms(2025, 9, 24, hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_newest_wins() {
        let cache = StockSnapshotCache::new();
        assert_eq!(cache.apply(vec![snapshot("VIC", 100, 10)]), 1);

        // 較舊的快照被忽略
        assert_eq!(cache.apply(vec![snapshot("VIC", 40, 8)]), 0);
        let key = StockKey::new("OB-ESS-Q".to_string(), "VIC".to_string());
        assert_eq!(cache.get(&key).unwrap().quantity, 100);

        assert_eq!(cache.apply(vec![snapshot("VIC", 90, 12)]), 1);
        assert_eq!(cache.get(&key).unwrap().quantity, 90);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let cache = StockSnapshotCache::new();
        cache.apply(vec![snapshot("VIC", 100, 10), snapshot("QLD", 67, 10)]);

        let copy = cache.snapshot();
        cache.apply(vec![snapshot("VIC", 5, 11)]);

        assert_eq!(copy.len(), 2);
        let vic = copy.iter().find(|s| s.warehouse == "VIC").unwrap();
        assert_eq!(vic.quantity, 100);
    }
}
