//! 銷售速度模型

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::period::AnalysisPeriod;
use crate::stock::StockKey;

/// 銷售速度的來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocitySource {
    /// 期間內有實際銷售
    Observed,
    /// 期間內無銷售，速度為 0
    NoSales,
    /// 無銷售，改用手動設定的速度
    ManualOverride,
    /// 無銷售，改用同品類平均速度
    CategoryAverage,
}

/// 期間內的銷售歷史統計
///
/// 趨勢與變異係數以期間內每一天（含首尾，無銷售的日子記為 0）的銷量序列計算。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesHistory {
    /// 訂單行數
    pub order_count: u32,

    /// 首次銷售日
    pub first_sale: Option<NaiveDate>,

    /// 最後銷售日
    pub last_sale: Option<NaiveDate>,

    /// 日銷量線性迴歸斜率（件/日²），正值表示成長
    pub trend: f64,

    /// 日銷量變異係數（%），日均為 0 時為 0
    pub variability: f64,
}

impl SalesHistory {
    /// 由每日銷量彙總計算
    ///
    /// * `daily` - 期間內有銷售的日期與當日總量，期間外的日期會被忽略
    pub fn from_daily(period: &AnalysisPeriod, daily: &BTreeMap<NaiveDate, u64>, order_count: u32) -> Self {
        let in_period = daily.range(period.start()..=period.end());
        let first_sale = in_period.clone().next().map(|(date, _)| *date);
        let last_sale = in_period.clone().next_back().map(|(date, _)| *date);

        let series: Vec<f64> = period
            .start()
            .iter_days()
            .take(period.days() as usize + 1)
            .map(|date| daily.get(&date).copied().unwrap_or(0) as f64)
            .collect();

        Self {
            order_count,
            first_sale,
            last_sale,
            trend: linear_slope(&series),
            variability: coefficient_of_variation(&series),
        }
    }
}

/// 最小平方法斜率，x 為序列索引
fn linear_slope(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return 0.0;
    }

    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = series.iter().sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for (i, y) in series.iter().enumerate() {
        let dx = i as f64 - mean_x;
        covariance += dx * (y - mean_y);
        variance += dx * dx;
    }

    covariance / variance
}

/// 母體標準差 / 平均 × 100
fn coefficient_of_variation(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }

    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    if mean == 0.0 {
        return 0.0;
    }

    let variance = series.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() / mean * 100.0
}

/// 銷售速度記錄（每次請求重新計算，不作為權威狀態保存）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VelocityRecord {
    pub sku: String,

    /// 倉庫代碼，或 "ALL"
    pub warehouse: String,

    pub period_start: NaiveDate,
    pub period_end: NaiveDate,

    /// 期間銷售總量
    pub units_sold: u64,

    /// 期間天數（> 0）
    pub days_in_period: u32,

    /// 日均銷量 = units_sold / days_in_period
    pub daily_velocity: f64,

    /// 放大後日均銷量 = daily_velocity × scale_factor
    pub scaled_velocity: f64,

    pub source: VelocitySource,

    #[serde(flatten)]
    pub history: SalesHistory,
}

impl VelocityRecord {
    /// 由實際銷量建立記錄
    pub fn observed(key: StockKey, period: &AnalysisPeriod, units_sold: u64, scale_factor: f64) -> Self {
        let days_in_period = period.days();
        let daily_velocity = units_sold as f64 / f64::from(days_in_period);
        let source = if units_sold == 0 {
            VelocitySource::NoSales
        } else {
            VelocitySource::Observed
        };

        Self {
            sku: key.sku,
            warehouse: key.warehouse,
            period_start: period.start(),
            period_end: period.end(),
            units_sold,
            days_in_period,
            daily_velocity,
            scaled_velocity: daily_velocity * scale_factor,
            source,
            history: SalesHistory::default(),
        }
    }

    /// 建構器模式：附上銷售歷史統計
    pub fn with_history(mut self, history: SalesHistory) -> Self {
        self.history = history;
        self
    }

    /// 以替代速度建立零銷量記錄
    pub fn substituted(
        key: StockKey,
        period: &AnalysisPeriod,
        daily_velocity: f64,
        scale_factor: f64,
        source: VelocitySource,
    ) -> Self {
        Self {
            sku: key.sku,
            warehouse: key.warehouse,
            period_start: period.start(),
            period_end: period.end(),
            units_sold: 0,
            days_in_period: period.days(),
            daily_velocity,
            scaled_velocity: daily_velocity * scale_factor,
            source,
            history: SalesHistory::default(),
        }
    }

    pub fn key(&self) -> StockKey {
        StockKey::new(self.sku.clone(), self.warehouse.clone())
    }

    /// 週銷量（放大後）
    pub fn weekly_velocity(&self) -> f64 {
        self.scaled_velocity * 7.0
    }

    /// 月銷量（放大後，30 天）
    pub fn monthly_velocity(&self) -> f64 {
        self.scaled_velocity * 30.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> AnalysisPeriod {
        AnalysisPeriod::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 11).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_observed_record() {
        let record =
            VelocityRecord::observed(StockKey::aggregated("OB-ESS-Q".to_string()), &period(), 30, 1.2);

        assert_eq!(record.days_in_period, 10);
        assert_eq!(record.daily_velocity, 30.0 / 10.0);
        assert_eq!(record.scaled_velocity, (30.0 / 10.0) * 1.2);
        assert_eq!(record.source, VelocitySource::Observed);
        assert_eq!(record.weekly_velocity(), record.scaled_velocity * 7.0);
    }

    #[test]
    fn test_sales_history() {
        // 2025-09-01 ~ 2025-09-03：每日 1、2、3 件
        let period = AnalysisPeriod::new(
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 9, 3).unwrap(),
        )
        .unwrap();
        let daily: BTreeMap<NaiveDate, u64> = [(1, 1), (2, 2), (3, 3)]
            .into_iter()
            .map(|(d, q)| (NaiveDate::from_ymd_opt(2025, 9, d).unwrap(), q))
            .collect();

        let history = SalesHistory::from_daily(&period, &daily, 4);

        assert_eq!(history.order_count, 4);
        assert_eq!(history.first_sale, NaiveDate::from_ymd_opt(2025, 9, 1));
        assert_eq!(history.last_sale, NaiveDate::from_ymd_opt(2025, 9, 3));
        assert!((history.trend - 1.0).abs() < 1e-12);
        // 標準差 sqrt(2/3)，平均 2
        let expected = (2.0_f64 / 3.0).sqrt() / 2.0 * 100.0;
        assert!((history.variability - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sales_history_declining_and_flat() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 9, d).unwrap();
        let period = AnalysisPeriod::new(day(1), day(5)).unwrap();

        let declining: BTreeMap<NaiveDate, u64> = [(day(1), 8), (day(3), 4)].into_iter().collect();
        let history = SalesHistory::from_daily(&period, &declining, 2);
        assert!(history.trend < 0.0);
        assert_eq!(history.last_sale, Some(day(3)));

        let flat: BTreeMap<NaiveDate, u64> = (1..=5).map(|d| (day(d), 2)).collect();
        let history = SalesHistory::from_daily(&period, &flat, 5);
        assert_eq!(history.trend, 0.0);
        assert_eq!(history.variability, 0.0);

        let none = SalesHistory::from_daily(&period, &BTreeMap::new(), 0);
        assert_eq!(none, SalesHistory::default());
    }

    #[test]
    fn test_zero_sales_record() {
        let record =
            VelocityRecord::observed(StockKey::aggregated("OB-ORG-D".to_string()), &period(), 0, 1.0);

        assert_eq!(record.daily_velocity, 0.0);
        assert_eq!(record.source, VelocitySource::NoSales);
    }
}
