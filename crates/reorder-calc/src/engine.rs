//! 補貨決策引擎

use rayon::prelude::*;

use reorder_core::{
    DataQualityNote, ReorderConfig, ReorderDecision, StockSnapshot, Urgency, VelocityRecord,
    VelocitySource,
};

use crate::stock_index::StockIndex;

/// 預警區間：再訂購點之上 7 天銷量
const WARNING_WINDOW_DAYS: f64 = 7.0;

/// 健康門檻：再訂購點之上 30 天銷量
const HEALTHY_WINDOW_DAYS: f64 = 30.0;

/// 補貨決策引擎
///
/// 純計算：不做 I/O，不修改輸入，相同輸入得到位元相同的決策。
pub struct ReorderEngine {
    config: ReorderConfig,
}

impl ReorderEngine {
    /// 創建新的補貨引擎
    pub fn new(config: ReorderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    /// 單一鍵的補貨決策
    ///
    /// 缺少庫存快照時以 0 計算並標註 `MissingStockData`，
    /// 速度為 0 時斷貨天數為無限（不做除法）。
    /// 提前期與緩衝天數優先採用該 SKU 的覆寫值。
    pub fn decide(&self, velocity: &VelocityRecord, stock: Option<&StockSnapshot>) -> ReorderDecision {
        let mut notes = Vec::new();

        let current_stock = match stock {
            Some(snapshot) => snapshot.quantity,
            None => {
                notes.push(DataQualityNote::MissingStockData);
                0
            }
        };

        let scaled_velocity = velocity.scaled_velocity;
        let has_velocity = scaled_velocity > 0.0;
        if !has_velocity {
            notes.push(DataQualityNote::NoSalesHistory);
        }
        if matches!(
            velocity.source,
            VelocitySource::ManualOverride | VelocitySource::CategoryAverage
        ) {
            notes.push(DataQualityNote::VelocityOverridden {
                source: velocity.source,
            });
        }

        let lead_time_days = self.config.lead_time_for(&velocity.sku);
        let buffer_days = self.config.buffer_days_for(&velocity.sku);

        let lead_time_demand = scaled_velocity * f64::from(lead_time_days);
        let safety_stock = scaled_velocity * f64::from(buffer_days);
        let reorder_point = lead_time_demand + safety_stock;

        let stock = current_stock as f64;
        let days_until_stockout = if has_velocity {
            stock / scaled_velocity
        } else {
            f64::INFINITY
        };

        // 補足缺口，並覆蓋下一個提前期的需求
        let order_quantity = if stock <= reorder_point {
            (reorder_point - stock + lead_time_demand).max(0.0)
        } else {
            0.0
        };

        let urgency = classify_with_lead(
            f64::from(lead_time_days),
            stock,
            scaled_velocity,
            reorder_point,
            days_until_stockout,
        );

        ReorderDecision {
            sku: velocity.sku.clone(),
            warehouse: velocity.warehouse.clone(),
            scaled_velocity,
            lead_time_demand,
            safety_stock,
            reorder_point,
            current_stock,
            days_until_stockout,
            order_quantity,
            urgency,
            notes,
        }
    }

    /// 以全域提前期判定緊急程度
    pub fn classify(
        &self,
        current_stock: f64,
        scaled_velocity: f64,
        reorder_point: f64,
        days_until_stockout: f64,
    ) -> Urgency {
        classify_with_lead(
            f64::from(self.config.lead_time_days),
            current_stock,
            scaled_velocity,
            reorder_point,
            days_until_stockout,
        )
    }

    /// 批次計算所有鍵的決策（並行計算，保持輸入順序）
    pub fn evaluate(&self, velocities: &[VelocityRecord], stock: &StockIndex) -> Vec<ReorderDecision> {
        let decisions: Vec<ReorderDecision> = velocities
            .par_iter()
            .map(|velocity| self.decide(velocity, stock.get(&velocity.key())))
            .collect();

        let degraded = decisions.iter().filter(|d| d.is_degraded()).count();
        if degraded > 0 {
            tracing::warn!("{} 個鍵缺少庫存快照，現有庫存以 0 計算", degraded);
        }

        decisions
    }
}

/// 判定緊急程度（依序比對，先符合者為準）
fn classify_with_lead(
    lead_time_days: f64,
    current_stock: f64,
    scaled_velocity: f64,
    reorder_point: f64,
    days_until_stockout: f64,
) -> Urgency {
    if days_until_stockout < lead_time_days {
        Urgency::StockoutRisk
    } else if current_stock < reorder_point {
        Urgency::Critical
    } else if current_stock < reorder_point + WARNING_WINDOW_DAYS * scaled_velocity {
        Urgency::Warning
    } else if current_stock >= reorder_point + HEALTHY_WINDOW_DAYS * scaled_velocity {
        Urgency::Healthy
    } else {
        Urgency::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use reorder_core::{AggregationMode, AnalysisPeriod, SkuOverride, StockKey};
    use rstest::rstest;

    const EPS: f64 = 1e-9;

    fn period() -> AnalysisPeriod {
        AnalysisPeriod::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
        )
        .unwrap()
    }

    /// 30 天期間內銷售 `units` 件
    fn velocity(units: u64, scale_factor: f64) -> VelocityRecord {
        VelocityRecord::observed(StockKey::aggregated("OB-ESS-Q".to_string()), &period(), units, scale_factor)
    }

    fn stock(quantity: u64) -> StockSnapshot {
        StockSnapshot::aggregated(
            "OB-ESS-Q".to_string(),
            quantity,
            Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
        )
    }

    fn engine() -> ReorderEngine {
        ReorderEngine::new(ReorderConfig::new(30, 30).with_scale_factor(1.2))
    }

    #[test]
    fn test_stockout_risk_scenario() {
        // 日均 3.0，放大 1.2 → 3.6
        let decision = engine().decide(&velocity(90, 1.2), Some(&stock(50)));

        assert!((decision.scaled_velocity - 3.6).abs() < EPS);
        assert!((decision.lead_time_demand - 108.0).abs() < EPS);
        assert!((decision.safety_stock - 108.0).abs() < EPS);
        assert!((decision.reorder_point - 216.0).abs() < EPS);
        assert!((decision.order_quantity - 274.0).abs() < EPS);
        assert!((decision.days_until_stockout - 50.0 / 3.6).abs() < EPS);
        assert_eq!(decision.urgency, Urgency::StockoutRisk);
        assert!(decision.notes.is_empty());
    }

    #[test]
    fn test_catch_all_warning_scenario() {
        // 250 介於 ROP+7 天 (241.2) 與 ROP+30 天 (324) 之間
        let decision = engine().decide(&velocity(90, 1.2), Some(&stock(250)));

        assert_eq!(decision.order_quantity, 0.0);
        assert_eq!(decision.urgency, Urgency::Warning);
    }

    #[test]
    fn test_zero_velocity_scenario() {
        let decision = engine().decide(&velocity(0, 1.2), Some(&stock(40)));

        assert!(decision.days_until_stockout.is_infinite());
        assert_eq!(decision.lead_time_demand, 0.0);
        assert_eq!(decision.safety_stock, 0.0);
        assert_eq!(decision.reorder_point, 0.0);
        assert_eq!(decision.order_quantity, 0.0);
        assert_eq!(decision.urgency, Urgency::Healthy);
        assert!(decision.has_note(DataQualityNote::NoSalesHistory));
    }

    #[test]
    fn test_zero_velocity_zero_stock() {
        let decision = engine().decide(&velocity(0, 1.0), Some(&stock(0)));

        assert_eq!(decision.order_quantity, 0.0);
        assert_ne!(decision.urgency, Urgency::StockoutRisk);
    }

    #[test]
    fn test_missing_stock_is_annotated() {
        let decision = engine().decide(&velocity(90, 1.2), None);

        assert_eq!(decision.current_stock, 0);
        assert!(decision.is_degraded());
        assert_eq!(decision.days_until_stockout, 0.0);
        assert_eq!(decision.urgency, Urgency::StockoutRisk);
        assert!((decision.order_quantity - 324.0).abs() < EPS);
    }

    #[test]
    fn test_overridden_velocity_is_annotated() {
        let record = VelocityRecord::substituted(
            StockKey::aggregated("OB-ESS-Q".to_string()),
            &period(),
            1.0,
            1.0,
            VelocitySource::CategoryAverage,
        );
        let decision = engine().decide(&record, Some(&stock(100)));

        assert!(decision.has_note(DataQualityNote::VelocityOverridden {
            source: VelocitySource::CategoryAverage
        }));
        assert!(!decision.has_note(DataQualityNote::NoSalesHistory));
    }

    // 速度 1.0/日，提前期 30、緩衝 30 → ROP 60
    #[rstest]
    #[case(0, Urgency::StockoutRisk)]
    #[case(29, Urgency::StockoutRisk)]
    #[case(30, Urgency::Critical)]
    #[case(59, Urgency::Critical)]
    #[case(60, Urgency::Warning)]
    #[case(66, Urgency::Warning)]
    #[case(67, Urgency::Warning)]
    #[case(89, Urgency::Warning)]
    #[case(90, Urgency::Healthy)]
    #[case(500, Urgency::Healthy)]
    fn test_urgency_bands(#[case] quantity: u64, #[case] expected: Urgency) {
        let engine = ReorderEngine::new(ReorderConfig::new(30, 30));
        let decision = engine.decide(&velocity(30, 1.0), Some(&stock(quantity)));
        assert_eq!(decision.urgency, expected);
    }

    #[test]
    fn test_order_quantity_gate() {
        let engine = ReorderEngine::new(ReorderConfig::new(30, 30));

        // 恰好等於 ROP 仍下單
        let at_rop = engine.decide(&velocity(30, 1.0), Some(&stock(60)));
        assert_eq!(at_rop.order_quantity, 30.0);

        let above = engine.decide(&velocity(30, 1.0), Some(&stock(61)));
        assert_eq!(above.order_quantity, 0.0);
    }

    #[test]
    fn test_sku_override_changes_decision() {
        // 速度 1.0/日，全域 30/30；OB-ESS-Q 提前期覆寫為 60
        let config = ReorderConfig::new(30, 30)
            .with_sku_override("OB-ESS-Q", SkuOverride::default().with_lead_time_days(60));
        let engine = ReorderEngine::new(config);

        let decision = engine.decide(&velocity(30, 1.0), Some(&stock(50)));
        assert_eq!(decision.lead_time_demand, 60.0);
        assert_eq!(decision.safety_stock, 30.0);
        assert_eq!(decision.reorder_point, 90.0);
        assert_eq!(decision.order_quantity, 100.0);
        // 50 天 < 覆寫後提前期 60 天
        assert_eq!(decision.urgency, Urgency::StockoutRisk);

        // 全域提前期下 50 天不算斷貨風險
        assert_eq!(engine.classify(50.0, 1.0, 90.0, 50.0), Urgency::Critical);

        let other = VelocityRecord::observed(StockKey::aggregated("OB-ESS-K".to_string()), &period(), 30, 1.0);
        let decision = engine.decide(&other, Some(&stock(50)));
        assert_eq!(decision.reorder_point, 60.0);
        assert_eq!(decision.urgency, Urgency::Critical);
    }

    #[test]
    fn test_degenerate_config_does_not_panic() {
        let engine = ReorderEngine::new(ReorderConfig::new(0, 0));
        let decision = engine.decide(&velocity(30, 1.0), Some(&stock(10)));

        assert_eq!(decision.reorder_point, 0.0);
        assert_eq!(decision.order_quantity, 0.0);
    }

    #[test]
    fn test_evaluate_preserves_order() {
        let records: Vec<VelocityRecord> = (0..50u64)
            .map(|i| {
                VelocityRecord::observed(StockKey::aggregated(format!("SKU-{:03}", i)), &period(), i * 3, 1.0)
            })
            .collect();
        let snapshots: Vec<StockSnapshot> = (0..50u64)
            .map(|i| {
                StockSnapshot::aggregated(
                    format!("SKU-{:03}", i),
                    i * 2,
                    Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
                )
            })
            .collect();
        let index = StockIndex::build(&snapshots, AggregationMode::Aggregated);

        let decisions = engine().evaluate(&records, &index);

        assert_eq!(decisions.len(), 50);
        for (record, decision) in records.iter().zip(&decisions) {
            assert_eq!(record.sku, decision.sku);
        }
        assert_eq!(decisions, engine().evaluate(&records, &index));
    }
}
