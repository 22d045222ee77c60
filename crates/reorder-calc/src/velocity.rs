//! 銷售速度計算

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use reorder_core::{
    AggregationMode, AnalysisPeriod, OrderLine, ReorderError, SalesHistory, SkuPatternSet,
    StockKey, VelocityRecord, VelocitySource, UNKNOWN_WAREHOUSE,
};

/// 期間內無銷售的 SKU 如何取得速度
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ZeroSalesPolicy {
    /// 明確輸出速度 0
    #[default]
    ExplicitZero,

    /// 手動指定日均銷量（SKU → 每日件數）
    ManualOverride(HashMap<String, f64>),

    /// 使用同品類（SKU 最後一個 `-` 之前的前綴）有銷售 SKU 的平均日均銷量
    CategoryAverage,
}

impl ZeroSalesPolicy {
    /// 取得替代速度；無可用替代時回傳 None（即速度 0）
    fn substitute(&self, key: &StockKey, observed: &[VelocityRecord]) -> Option<(f64, VelocitySource)> {
        match self {
            ZeroSalesPolicy::ExplicitZero => None,
            ZeroSalesPolicy::ManualOverride(overrides) => overrides
                .get(&key.sku)
                .copied()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(|v| (v, VelocitySource::ManualOverride)),
            ZeroSalesPolicy::CategoryAverage => {
                let category = category_of(&key.sku)?;
                let peers: Vec<f64> = observed
                    .iter()
                    .filter(|r| r.warehouse == key.warehouse)
                    .filter(|r| category_of(&r.sku) == Some(category))
                    .map(|r| r.daily_velocity)
                    .collect();

                if peers.is_empty() {
                    return None;
                }

                let average = peers.iter().sum::<f64>() / peers.len() as f64;
                Some((average, VelocitySource::CategoryAverage))
            }
        }
    }
}

/// SKU 品類前綴，例如 "OB-ESS-Q" → "OB-ESS"
fn category_of(sku: &str) -> Option<&str> {
    sku.rfind('-').map(|idx| &sku[..idx]).filter(|c| !c.is_empty())
}

/// 單一鍵在期間內的銷售累計
#[derive(Debug, Default)]
struct KeySales {
    units: u64,
    order_count: u32,
    daily: BTreeMap<NaiveDate, u64>,
}

impl KeySales {
    fn add(&mut self, line: &OrderLine) {
        self.units = self.units.saturating_add(line.quantity);
        self.order_count = self.order_count.saturating_add(1);
        let day = self.daily.entry(line.order_date).or_insert(0);
        *day = day.saturating_add(line.quantity);
    }

    fn record(&self, key: StockKey, period: &AnalysisPeriod, scale_factor: f64) -> VelocityRecord {
        VelocityRecord::observed(key, period, self.units, scale_factor)
            .with_history(SalesHistory::from_daily(period, &self.daily, self.order_count))
    }
}

/// 銷售速度計算器
pub struct VelocityCalculator {
    /// 放大係數
    scale_factor: f64,

    /// 分組方式
    mode: AggregationMode,

    /// 無銷售 SKU 的處理策略
    zero_sales_policy: ZeroSalesPolicy,
}

impl VelocityCalculator {
    /// 創建新的速度計算器（跨倉彙總、零銷量輸出 0）
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor,
            mode: AggregationMode::Aggregated,
            zero_sales_policy: ZeroSalesPolicy::ExplicitZero,
        }
    }

    /// 建構器模式：設置彙總模式
    pub fn with_mode(mut self, mode: AggregationMode) -> Self {
        self.mode = mode;
        self
    }

    /// 建構器模式：設置零銷量策略
    pub fn with_zero_sales_policy(mut self, policy: ZeroSalesPolicy) -> Self {
        self.zero_sales_policy = policy;
        self
    }

    /// 計算每個鍵的銷售速度
    ///
    /// * `lines` - 已同步的訂單行，期間外、作廢或不符合 SKU 樣式的會被略過
    /// * `catalog` - 已知的鍵（通常來自庫存快照），期間內無銷售時仍輸出零速度記錄
    ///
    /// 結果依鍵排序。
    pub fn calculate(
        &self,
        lines: &[OrderLine],
        period: &AnalysisPeriod,
        patterns: &SkuPatternSet,
        catalog: &[StockKey],
    ) -> reorder_core::Result<Vec<VelocityRecord>> {
        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(ReorderError::InvalidConfig(format!(
                "放大係數必須為正數，實際為 {}",
                self.scale_factor
            )));
        }

        // Step 1: 篩選並按鍵加總銷量
        let mut sales_by_key: BTreeMap<StockKey, KeySales> = BTreeMap::new();
        let mut included = 0usize;
        let mut voided = 0usize;
        for line in lines {
            if !period.contains(line.order_date) || !patterns.matches(&line.sku) {
                continue;
            }
            if line.status.is_voided() {
                voided += 1;
                continue;
            }
            included += 1;
            sales_by_key.entry(line.key(self.mode)).or_default().add(line);
        }

        // Step 2: 補上期間內無銷售但在範圍內的鍵
        for key in catalog.iter().filter(|k| patterns.matches(&k.sku)) {
            let key = match self.mode {
                AggregationMode::Aggregated => StockKey::aggregated(key.sku.clone()),
                AggregationMode::PerWarehouse if key.is_aggregated() => continue,
                AggregationMode::PerWarehouse => key.clone(),
            };
            sales_by_key.entry(key).or_default();
        }

        // 單一 SKU 樣式只在沒有任何同名鍵（不分大小寫）時補入；
        // 分倉模式下歸入 UNKNOWN 倉庫
        for sku in patterns.literal_skus() {
            if sales_by_key.keys().any(|k| k.sku.eq_ignore_ascii_case(sku)) {
                continue;
            }
            let key = match self.mode {
                AggregationMode::Aggregated => StockKey::aggregated(sku.to_string()),
                AggregationMode::PerWarehouse => {
                    StockKey::new(sku.to_string(), UNKNOWN_WAREHOUSE.to_string())
                }
            };
            sales_by_key.insert(key, KeySales::default());
        }

        tracing::debug!(
            "速度計算：訂單行 {} 筆，納入 {} 筆，作廢略過 {} 筆，鍵 {} 個",
            lines.len(),
            included,
            voided,
            sales_by_key.len()
        );

        // Step 3: 有銷售的鍵直接計算
        let observed: Vec<VelocityRecord> = sales_by_key
            .iter()
            .filter(|(_, sales)| sales.units > 0)
            .map(|(key, sales)| sales.record(key.clone(), period, self.scale_factor))
            .collect();

        // Step 4: 零銷量的鍵依策略處理
        let mut records = Vec::with_capacity(sales_by_key.len());
        for (key, sales) in &sales_by_key {
            let record = if sales.units > 0 {
                sales.record(key.clone(), period, self.scale_factor)
            } else {
                match self.zero_sales_policy.substitute(key, &observed) {
                    Some((velocity, source)) => {
                        tracing::debug!("{} 無銷售，改用 {:?} 速度 {:.3}", key, source, velocity);
                        VelocityRecord::substituted(key.clone(), period, velocity, self.scale_factor, source)
                    }
                    None => sales.record(key.clone(), period, self.scale_factor),
                }
            };
            records.push(record);
        }

        Ok(records)
    }

    /// 銷售最快的前 `limit` 筆（日均銷量由高到低）
    pub fn top_movers(records: &[VelocityRecord], limit: usize) -> Vec<&VelocityRecord> {
        let mut sorted: Vec<&VelocityRecord> = records.iter().collect();
        sorted.sort_by(|a, b| {
            b.daily_velocity
                .total_cmp(&a.daily_velocity)
                .then_with(|| a.key().cmp(&b.key()))
        });
        sorted.truncate(limit);
        sorted
    }

    /// 日均銷量低於門檻的滯銷品（由低到高）
    pub fn slow_movers(records: &[VelocityRecord], threshold: f64) -> Vec<&VelocityRecord> {
        let mut slow: Vec<&VelocityRecord> = records
            .iter()
            .filter(|r| r.daily_velocity.partial_cmp(&threshold) == Some(Ordering::Less))
            .collect();
        slow.sort_by(|a, b| {
            a.daily_velocity
                .total_cmp(&b.daily_velocity)
                .then_with(|| a.key().cmp(&b.key()))
        });
        slow
    }
}
