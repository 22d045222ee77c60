//! 補貨計算主流程

use reorder_core::{
    AggregationMode, AnalysisPeriod, OrderLine, ReorderConfig, SkuPatternSet, StockSnapshot,
};

use crate::aggregator::{RecommendationAggregator, RecommendationReport};
use crate::engine::ReorderEngine;
use crate::stock_index::StockIndex;
use crate::velocity::{VelocityCalculator, ZeroSalesPolicy};

/// 單次計算的輸入（呼叫端持有的不可變快照）
#[derive(Debug, Clone, Copy)]
pub struct PipelineInput<'a> {
    pub orders: &'a [OrderLine],
    pub stock: &'a [StockSnapshot],
    pub patterns: &'a SkuPatternSet,
    pub period: AnalysisPeriod,
}

impl<'a> PipelineInput<'a> {
    pub fn new(
        orders: &'a [OrderLine],
        stock: &'a [StockSnapshot],
        patterns: &'a SkuPatternSet,
        period: AnalysisPeriod,
    ) -> Self {
        Self {
            orders,
            stock,
            patterns,
            period,
        }
    }
}

/// 補貨計算流程：銷售速度 → 庫存對應 → 補貨決策 → 彙總
pub struct ReorderPipeline {
    config: ReorderConfig,
    mode: AggregationMode,
    zero_sales_policy: ZeroSalesPolicy,
}

impl ReorderPipeline {
    /// 創建新的計算流程（跨倉彙總、零銷量輸出 0）
    pub fn new(config: ReorderConfig) -> Self {
        Self {
            config,
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

    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    /// 主計算入口
    ///
    /// 配置在任何計算之前驗證；要嘛回傳完整報告，要嘛回傳驗證錯誤。
    pub fn run(&self, input: &PipelineInput<'_>) -> reorder_core::Result<RecommendationReport> {
        self.config.validate()?;

        tracing::info!(
            "開始補貨計算：訂單行 {} 筆，庫存快照 {} 筆，期間 {} 天，模式 {:?}",
            input.orders.len(),
            input.stock.len(),
            input.period.days(),
            self.mode
        );

        let start_time = std::time::Instant::now();

        // Step 1: 庫存對應
        tracing::debug!("Step 1: 建立庫存索引");
        let stock_index = StockIndex::build(input.stock, self.mode);
        let catalog = stock_index.keys();

        // Step 2: 銷售速度
        tracing::debug!("Step 2: 計算銷售速度");
        let velocities = VelocityCalculator::new(self.config.scale_factor)
            .with_mode(self.mode)
            .with_zero_sales_policy(self.zero_sales_policy.clone())
            .calculate(input.orders, &input.period, input.patterns, &catalog)?;

        // Step 3: 補貨決策
        tracing::debug!("Step 3: 計算補貨決策（{} 個鍵）", velocities.len());
        let decisions = ReorderEngine::new(self.config.clone()).evaluate(&velocities, &stock_index);

        // Step 4: 彙總
        tracing::debug!("Step 4: 彙總建議");
        let report = RecommendationAggregator::new(self.mode)
            .aggregate(decisions)
            .with_period(input.period)
            .with_config(self.config.clone());

        tracing::info!(
            "補貨計算完成：{} 個鍵，{} 個建議下單，耗時 {} ms",
            report.summary.total,
            report.summary.needs_reorder,
            start_time.elapsed().as_millis()
        );

        Ok(report)
    }
}
