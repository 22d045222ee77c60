//! 同步服務

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use reorder_core::{AnalysisPeriod, OrderLine};
use reorder_store::{OrderStore, StockSnapshotCache};

use crate::error::SyncError;
use crate::source::{OrderSource, StockSource};

/// 同步種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    Orders,
    Stock,
}

/// 單次同步結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub kind: SyncKind,
    pub success: bool,

    /// 新寫入的訂單數（已同步過的不計）
    pub orders_processed: usize,

    /// 新寫入的訂單行數
    pub lines_processed: usize,

    /// 新寫入訂單行的銷售總量
    pub units_processed: u64,

    /// 作廢而略過的訂單數
    pub orders_voided: usize,

    /// 被採用的庫存快照數
    pub snapshots_applied: usize,

    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncReport {
    fn started(kind: SyncKind) -> Self {
        let now = Utc::now();
        Self {
            run_id: Uuid::new_v4(),
            kind,
            success: false,
            orders_processed: 0,
            lines_processed: 0,
            units_processed: 0,
            orders_voided: 0,
            snapshots_applied: 0,
            error: None,
            started_at: now,
            finished_at: now,
        }
    }

    fn succeed(mut self) -> Self {
        self.success = true;
        self.finished_at = Utc::now();
        self
    }

    fn fail(mut self, error: &SyncError) -> Self {
        self.success = false;
        self.error = Some(error.to_string());
        self.finished_at = Utc::now();
        self
    }
}

/// 把外部來源的資料寫入儲存層
///
/// 同步失敗時儲存層維持原狀，計算照常使用既有資料。
pub struct SyncService<O, S> {
    orders: O,
    stock: S,
    order_store: Arc<OrderStore>,
    stock_cache: Arc<StockSnapshotCache>,
}

impl<O: OrderSource, S: StockSource> SyncService<O, S> {
    /// 創建新的同步服務
    pub fn new(
        orders: O,
        stock: S,
        order_store: Arc<OrderStore>,
        stock_cache: Arc<StockSnapshotCache>,
    ) -> Self {
        Self {
            orders,
            stock,
            order_store,
            stock_cache,
        }
    }

    /// 同步期間內的訂單
    pub fn sync_orders(&self, window: &AnalysisPeriod) -> SyncReport {
        let report = SyncReport::started(SyncKind::Orders);
        tracing::info!(
            "開始同步訂單：{} ~ {}（{}）",
            window.start(),
            window.end(),
            report.run_id
        );

        let grouped = match self
            .orders
            .fetch_orders(window)
            .and_then(group_by_order)
        {
            Ok(grouped) => grouped,
            Err(err) => {
                tracing::error!("訂單同步失敗：{}", err);
                return report.fail(&err);
            }
        };

        let mut report = report;
        for (order_ref, lines) in grouped {
            if lines.iter().any(|l| l.status.is_voided()) {
                tracing::debug!("訂單 {} 已作廢，略過", order_ref);
                report.orders_voided += 1;
                continue;
            }

            let line_count = lines.len();
            let units: u64 = lines.iter().map(|l| l.quantity).sum();
            if self.order_store.insert_order(&order_ref, lines) {
                report.orders_processed += 1;
                report.lines_processed += line_count;
                report.units_processed += units;
            }
        }

        tracing::info!(
            "訂單同步完成：新訂單 {} 張，訂單行 {} 筆，銷量 {}，作廢略過 {} 張",
            report.orders_processed,
            report.lines_processed,
            report.units_processed,
            report.orders_voided
        );
        report.succeed()
    }

    /// 同步目前庫存
    pub fn sync_stock(&self) -> SyncReport {
        let mut report = SyncReport::started(SyncKind::Stock);
        tracing::info!("開始同步庫存（{}）", report.run_id);

        match self.stock.fetch_stock() {
            Ok(snapshots) => {
                report.snapshots_applied = self.stock_cache.apply(snapshots);
                tracing::info!("庫存同步完成：採用快照 {} 筆", report.snapshots_applied);
                report.succeed()
            }
            Err(err) => {
                tracing::error!("庫存同步失敗：{}", err);
                report.fail(&err)
            }
        }
    }

    /// 先同步庫存再同步訂單
    pub fn sync_all(&self, window: &AnalysisPeriod) -> Vec<SyncReport> {
        vec![self.sync_stock(), self.sync_orders(window)]
    }

    pub fn order_store(&self) -> &Arc<OrderStore> {
        &self.order_store
    }

    pub fn stock_cache(&self) -> &Arc<StockSnapshotCache> {
        &self.stock_cache
    }
}

/// 按訂單編號分組；任何一筆缺少編號即視為回應無效
fn group_by_order(lines: Vec<OrderLine>) -> crate::error::Result<BTreeMap<String, Vec<OrderLine>>> {
    let mut grouped: BTreeMap<String, Vec<OrderLine>> = BTreeMap::new();
    for line in lines {
        let order_ref = line.order_ref.clone().ok_or_else(|| {
            SyncError::InvalidResponse(format!("SKU {} 的訂單行缺少訂單編號", line.sku))
        })?;
        grouped.entry(order_ref).or_default().push(line);
    }
    Ok(grouped)
}
