//! 已同步訂單儲存

use std::collections::HashSet;

use parking_lot::RwLock;

use reorder_core::{AnalysisPeriod, OrderLine};

#[derive(Debug, Default)]
struct OrderState {
    /// 已寫入的訂單編號
    order_refs: HashSet<String>,
    lines: Vec<OrderLine>,
}

/// 訂單行儲存（記憶體內，讀寫鎖保護）
#[derive(Debug, Default)]
pub struct OrderStore {
    state: RwLock<OrderState>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 寫入一張訂單的所有訂單行
    ///
    /// 訂單編號已存在時略過並回傳 false。
    pub fn insert_order(&self, order_ref: &str, lines: Vec<OrderLine>) -> bool {
        let mut state = self.state.write();
        if state.order_refs.contains(order_ref) {
            tracing::debug!("訂單 {} 已同步，略過", order_ref);
            return false;
        }

        state.order_refs.insert(order_ref.to_string());
        state.lines.extend(
            lines
                .into_iter()
                .map(|line| line.with_order_ref(order_ref.to_string())),
        );
        true
    }

    pub fn contains_order(&self, order_ref: &str) -> bool {
        self.state.read().order_refs.contains(order_ref)
    }

    /// 期間內（含首尾）的訂單行副本
    pub fn lines_in(&self, period: &AnalysisPeriod) -> Vec<OrderLine> {
        self.state
            .read()
            .lines
            .iter()
            .filter(|line| period.contains(line.order_date))
            .cloned()
            .collect()
    }

    /// 所有訂單行副本
    pub fn all_lines(&self) -> Vec<OrderLine> {
        self.state.read().lines.clone()
    }

    /// 訂單數
    pub fn order_count(&self) -> usize {
        self.state.read().order_refs.len()
    }

    /// 訂單行數
    pub fn len(&self) -> usize {
        self.state.read().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    fn line(sku: &str, qty: u64, day: u32) -> OrderLine {
        OrderLine::new(sku.to_string(), qty, date(day)).with_warehouse("VIC".to_string())
    }

    #[test]
    fn test_duplicate_order_skipped() {
        let store = OrderStore::new();
        assert!(store.insert_order("SO-1001", vec![line("OB-ESS-Q", 2, 3), line("OB-ESS-K", 1, 3)]));
        assert!(!store.insert_order("SO-1001", vec![line("OB-ESS-Q", 2, 3)]));

        assert_eq!(store.order_count(), 1);
        assert_eq!(store.len(), 2);
        assert!(store.contains_order("SO-1001"));
        assert!(store
            .all_lines()
            .iter()
            .all(|l| l.order_ref.as_deref() == Some("SO-1001")));
    }

    #[test]
    fn test_lines_in_period() {
        let store = OrderStore::new();
        store.insert_order("SO-1", vec![line("OB-ESS-Q", 2, 1)]);
        store.insert_order("SO-2", vec![line("OB-ESS-Q", 3, 11)]);
        store.insert_order("SO-3", vec![line("OB-ESS-Q", 4, 12)]);

        let period = AnalysisPeriod::new(date(1), date(11)).unwrap();
        let lines = store.lines_in(&period);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.iter().map(|l| l.quantity).sum::<u64>(), 5);
    }
}
