//! 分倉與彙總比較示例

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use reorder::{
    AggregationMode, AnalysisPeriod, OrderLine, PipelineInput, RecommendationReport, ReorderConfig,
    ReorderPipeline, SkuPatternSet, StockSnapshot,
};
use tracing_subscriber::EnvFilter;

fn print_report(title: &str, report: &RecommendationReport) {
    println!("\n--- {} ---", title);
    for (warehouse, decisions) in report.by_warehouse() {
        println!("[{}]", warehouse);
        for d in decisions {
            println!(
                "  {:<10} 庫存 {:>5}  ROP {:>7.1}  建議 {:>6.0}  {}",
                d.sku, d.current_stock, d.reorder_point, d.order_quantity, d.urgency
            );
        }
    }
    println!("建議總量: {:.0}", report.summary.total_order_quantity);
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("=== 分倉與彙總比較示例 ===");

    let period = AnalysisPeriod::trailing(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(), 30)?;

    // VIC 日銷 2、QLD 日銷 1
    let mut orders = Vec::new();
    for day in 0..30 {
        let date = period.start() + Duration::days(day);
        orders.push(OrderLine::new("OB-ESS-K".to_string(), 2, date).with_warehouse("VIC".to_string()));
        orders.push(OrderLine::new("OB-ESS-K".to_string(), 1, date).with_warehouse("QLD".to_string()));
    }

    // VIC 囤貨，QLD 缺貨
    let observed_at = Utc.with_ymd_and_hms(2025, 10, 1, 6, 0, 0).unwrap();
    let stock = vec![
        StockSnapshot::new("OB-ESS-K".to_string(), "VIC".to_string(), 500, observed_at),
        StockSnapshot::new("OB-ESS-K".to_string(), "QLD".to_string(), 10, observed_at),
    ];

    let patterns = SkuPatternSet::new();
    let input = PipelineInput::new(&orders, &stock, &patterns, period);
    let config = ReorderConfig::new(30, 30);

    let aggregated = ReorderPipeline::new(config.clone())
        .with_mode(AggregationMode::Aggregated)
        .run(&input)?;
    let per_warehouse = ReorderPipeline::new(config)
        .with_mode(AggregationMode::PerWarehouse)
        .run(&input)?;

    print_report("跨倉彙總", &aggregated);
    print_report("分倉計算", &per_warehouse);

    println!("\n註：彙總庫存會掩蓋單倉缺貨，兩種模式的建議量不必相等");

    Ok(())
}
