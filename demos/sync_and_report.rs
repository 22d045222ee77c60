//! 同步後輸出 JSON 報告示例

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reorder::calc::{PipelineInput, ReorderPipeline};
use reorder::model::{AnalysisPeriod, OrderLine, ReorderConfig, StockSnapshot};
use reorder::store::{OrderStore, PatternStore, StockSnapshotCache};
use reorder::sync::{
    OrderSource, RetryPolicy, RetryingSource, StockSource, SyncError, SyncService,
};
use tracing_subscriber::EnvFilter;

/// 模擬的銷售 API：第一次呼叫被限流
struct DemoApi {
    calls: std::sync::atomic::AtomicU32,
}

impl OrderSource for DemoApi {
    fn fetch_orders(&self, window: &AnalysisPeriod) -> Result<Vec<OrderLine>, SyncError> {
        if self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
            return Err(SyncError::RateLimited {
                retry_after: Some(Duration::from_millis(200)),
            });
        }

        let mut lines = Vec::new();
        for (i, date) in window.start().iter_days().take(window.days() as usize).enumerate() {
            let warehouse = if i % 2 == 0 { "VIC" } else { "NSW" };
            lines.push(
                OrderLine::new("OB-ESS-Q".to_string(), 3, date)
                    .with_warehouse(warehouse.to_string())
                    .with_order_ref(format!("SO-{:05}", i)),
            );
        }
        Ok(lines)
    }
}

impl StockSource for DemoApi {
    fn fetch_stock(&self) -> Result<Vec<StockSnapshot>, SyncError> {
        let observed_at = Utc::now();
        Ok(vec![
            StockSnapshot::new("OB-ESS-Q".to_string(), "VIC".to_string(), 30, observed_at),
            StockSnapshot::new("OB-ESS-Q".to_string(), "NSW".to_string(), 20, observed_at),
            StockSnapshot::new("OB-ORG-S".to_string(), "VIC".to_string(), 80, observed_at),
        ])
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let window = AnalysisPeriod::trailing(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(), 30)?;

    let api = RetryingSource::new(
        DemoApi {
            calls: std::sync::atomic::AtomicU32::new(0),
        },
        RetryPolicy::new(3, Duration::from_millis(100)),
    );
    let service = SyncService::new(
        &api,
        &api,
        Arc::new(OrderStore::new()),
        Arc::new(StockSnapshotCache::new()),
    );

    for report in service.sync_all(&window) {
        println!("{}", serde_json::to_string(&report)?);
    }

    let patterns_path = std::env::temp_dir().join("reorder-demo").join("selected_skus.json");
    let patterns = PatternStore::open(&patterns_path)?;
    patterns.add("OB-*")?;

    let orders = service.order_store().lines_in(&window);
    let stock = service.stock_cache().snapshot();
    let selected = patterns.current();
    let input = PipelineInput::new(&orders, &stock, &selected, window);

    let report = ReorderPipeline::new(ReorderConfig::default().with_scale_factor(1.2)).run(&input)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
