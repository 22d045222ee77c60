//! 基本補貨計算示例

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use reorder::{
    AnalysisPeriod, BufferSpec, OrderLine, PipelineInput, ReorderParams, ReorderPipeline,
    SkuPatternSet, StockSnapshot,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== 基本補貨計算示例 ===\n");

    // 提前期 30 天、緩衝 1 個月、預期成長 20%
    let config = ReorderParams {
        lead_time_days: 30,
        buffer: BufferSpec::Months(1.0),
        scale_factor: 1.2,
    }
    .into_config()?;

    let end = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
    let period = AnalysisPeriod::trailing(end, 30)?;

    // 過去 30 天的銷售
    let mut orders = Vec::new();
    for day in 0..30 {
        let date = period.start() + Duration::days(day);
        orders.push(OrderLine::new("OB-ESS-Q".to_string(), 3, date).with_warehouse("VIC".to_string()));
        if day % 3 == 0 {
            orders.push(OrderLine::new("OB-ESS-K".to_string(), 2, date).with_warehouse("QLD".to_string()));
        }
    }

    let observed_at = Utc.with_ymd_and_hms(2025, 10, 1, 6, 0, 0).unwrap();
    let stock = vec![
        StockSnapshot::aggregated("OB-ESS-Q".to_string(), 50, observed_at),
        StockSnapshot::aggregated("OB-ESS-K".to_string(), 250, observed_at),
        StockSnapshot::aggregated("OB-ORG-D".to_string(), 40, observed_at),
    ];

    let patterns = SkuPatternSet::from_patterns(["OB-ESS-*", "OB-ORG-*"])?;
    let input = PipelineInput::new(&orders, &stock, &patterns, period);
    let report = ReorderPipeline::new(config).run(&input)?;

    println!(
        "\n{:<10} {:>8} {:>8} {:>8} {:>10} {:>8}  {}",
        "SKU", "速度/日", "庫存", "ROP", "斷貨天數", "建議量", "等級"
    );
    for d in &report.decisions {
        let horizon = if d.days_until_stockout.is_finite() {
            format!("{:.1}", d.days_until_stockout)
        } else {
            "∞".to_string()
        };
        println!(
            "{:<10} {:>8.2} {:>8} {:>8.1} {:>10} {:>8.0}  {}",
            d.sku, d.scaled_velocity, d.current_stock, d.reorder_point, horizon, d.order_quantity, d.urgency
        );
    }

    println!(
        "\n共 {} 個 SKU，{} 個建議下單，總量 {:.0}",
        report.summary.total, report.summary.needs_reorder, report.summary.total_order_quantity
    );

    Ok(())
}
