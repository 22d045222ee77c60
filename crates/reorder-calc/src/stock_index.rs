//! 庫存快照索引

use std::collections::BTreeMap;

use reorder_core::{AggregationMode, StockKey, StockSnapshot};

/// 依彙總模式建立的庫存查詢索引
///
/// - 分倉模式：以 (SKU, 倉庫) 精確對應，忽略 "ALL" 快照
/// - 彙總模式：有 "ALL" 快照時直接使用，否則加總各倉快照，
///   觀測時間取各倉中最早者
#[derive(Debug, Clone, Default)]
pub struct StockIndex {
    entries: BTreeMap<StockKey, StockSnapshot>,
}

impl StockIndex {
    /// 建立索引；同一鍵有多筆快照時保留最新一筆
    pub fn build(snapshots: &[StockSnapshot], mode: AggregationMode) -> Self {
        let mut latest: BTreeMap<StockKey, &StockSnapshot> = BTreeMap::new();
        for snapshot in snapshots {
            let key = snapshot.key();
            match latest.get(&key) {
                Some(current) if !snapshot.supersedes(current) => {}
                _ => {
                    latest.insert(key, snapshot);
                }
            }
        }

        let entries = match mode {
            AggregationMode::PerWarehouse => latest
                .into_iter()
                .filter(|(key, _)| !key.is_aggregated())
                .map(|(key, snapshot)| (key, snapshot.clone()))
                .collect(),
            AggregationMode::Aggregated => Self::aggregate(latest),
        };

        Self { entries }
    }

    fn aggregate(latest: BTreeMap<StockKey, &StockSnapshot>) -> BTreeMap<StockKey, StockSnapshot> {
        let mut explicit: BTreeMap<StockKey, StockSnapshot> = BTreeMap::new();
        let mut summed: BTreeMap<StockKey, StockSnapshot> = BTreeMap::new();

        for (key, snapshot) in latest {
            if key.is_aggregated() {
                explicit.insert(key, snapshot.clone());
                continue;
            }

            let total_key = StockKey::aggregated(key.sku);
            match summed.get_mut(&total_key) {
                Some(total) => {
                    total.quantity = total.quantity.saturating_add(snapshot.quantity);
                    total.observed_at = total.observed_at.min(snapshot.observed_at);
                }
                None => {
                    let total = StockSnapshot::aggregated(
                        snapshot.sku.clone(),
                        snapshot.quantity,
                        snapshot.observed_at,
                    );
                    summed.insert(total_key, total);
                }
            }
        }

        // 明確的 "ALL" 快照優先於各倉加總
        summed.extend(explicit);
        summed
    }

    pub fn get(&self, key: &StockKey) -> Option<&StockSnapshot> {
        self.entries.get(key)
    }

    /// 所有鍵（已排序）
    pub fn keys(&self) -> Vec<StockKey> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
