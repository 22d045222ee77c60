//! 補貨建議彙總

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use reorder_core::{AggregationMode, AnalysisPeriod, ReorderConfig, ReorderDecision, Urgency};

/// 各緊急程度的統計
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrgencySummary {
    pub stockout_risk: usize,
    pub critical: usize,
    pub warning: usize,
    pub healthy: usize,

    /// 鍵總數
    pub total: usize,

    /// 建議下單的鍵數
    pub needs_reorder: usize,

    /// 缺少庫存快照的鍵數
    pub degraded: usize,

    /// 建議訂購總量
    pub total_order_quantity: f64,
}

impl UrgencySummary {
    fn from_decisions(decisions: &[ReorderDecision]) -> Self {
        let mut summary = Self::default();
        for decision in decisions {
            match decision.urgency {
                Urgency::StockoutRisk => summary.stockout_risk += 1,
                Urgency::Critical => summary.critical += 1,
                Urgency::Warning => summary.warning += 1,
                Urgency::Healthy => summary.healthy += 1,
            }
            if decision.needs_reorder() {
                summary.needs_reorder += 1;
            }
            if decision.is_degraded() {
                summary.degraded += 1;
            }
            summary.total_order_quantity += decision.order_quantity;
        }
        summary.total = decisions.len();
        summary
    }

    pub fn count(&self, urgency: Urgency) -> usize {
        match urgency {
            Urgency::StockoutRisk => self.stockout_risk,
            Urgency::Critical => self.critical,
            Urgency::Warning => self.warning,
            Urgency::Healthy => self.healthy,
        }
    }
}

/// 補貨建議報告
///
/// 不含產生時間等易變欄位，相同輸入序列化後完全相同。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub mode: AggregationMode,

    /// 分析期間
    pub period: Option<AnalysisPeriod>,

    /// 計算時使用的配置
    pub config: Option<ReorderConfig>,

    pub summary: UrgencySummary,

    /// 依緊急程度排序的決策
    pub decisions: Vec<ReorderDecision>,
}

impl RecommendationReport {
    /// 建構器模式：附上分析期間
    pub fn with_period(mut self, period: AnalysisPeriod) -> Self {
        self.period = Some(period);
        self
    }

    /// 建構器模式：附上配置
    pub fn with_config(mut self, config: ReorderConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 建議下單的決策（保持報告順序）
    pub fn needing_reorder(&self) -> Vec<&ReorderDecision> {
        self.decisions.iter().filter(|d| d.needs_reorder()).collect()
    }

    /// 按倉庫分組（彙總模式下只有 "ALL" 一組）
    pub fn by_warehouse(&self) -> BTreeMap<&str, Vec<&ReorderDecision>> {
        let mut groups: BTreeMap<&str, Vec<&ReorderDecision>> = BTreeMap::new();
        for decision in &self.decisions {
            groups.entry(decision.warehouse.as_str()).or_default().push(decision);
        }
        groups
    }

    pub fn get(&self, sku: &str, warehouse: &str) -> Option<&ReorderDecision> {
        self.decisions
            .iter()
            .find(|d| d.sku == sku && d.warehouse == warehouse)
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }
}

/// 補貨建議彙總器
pub struct RecommendationAggregator {
    mode: AggregationMode,
}

impl RecommendationAggregator {
    pub fn new(mode: AggregationMode) -> Self {
        Self { mode }
    }

    /// 排序並統計
    pub fn aggregate(&self, mut decisions: Vec<ReorderDecision>) -> RecommendationReport {
        decisions.sort_by(Self::compare);
        let summary = UrgencySummary::from_decisions(&decisions);

        tracing::debug!(
            "彙總完成：斷貨風險 {}，緊急 {}，預警 {}，健康 {}",
            summary.stockout_risk,
            summary.critical,
            summary.warning,
            summary.healthy
        );

        RecommendationReport {
            mode: self.mode,
            period: None,
            config: None,
            summary,
            decisions,
        }
    }

    /// 緊急程度 → 斷貨天數（無限排最後）→ SKU → 倉庫
    pub fn compare(a: &ReorderDecision, b: &ReorderDecision) -> Ordering {
        a.urgency
            .cmp(&b.urgency)
            .then_with(|| a.days_until_stockout.total_cmp(&b.days_until_stockout))
            .then_with(|| a.sku.cmp(&b.sku))
            .then_with(|| a.warehouse.cmp(&b.warehouse))
    }
}
