//! 重試與退避

use std::time::Duration;

use reorder_core::{AnalysisPeriod, OrderLine, StockSnapshot};

use crate::error::{Result, SyncError};
use crate::source::{OrderSource, StockSource};

/// 等待的實作（測試時可替換為不實際等待的版本）
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// 以目前執行緒睡眠
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// 重試策略
///
/// 第 n 次失敗後等待 `base_delay × 2^(n-1)`；限流錯誤改用來源建議的等待時間，
/// 沒有建議時用 `rate_limit_delay`。
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// 最多嘗試次數（含第一次）
    pub max_attempts: u32,

    pub base_delay: Duration,

    pub rate_limit_delay: Duration,
}

impl RetryPolicy {
    /// 創建新的重試策略
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            rate_limit_delay: Duration::from_secs(5),
        }
    }

    /// 建構器模式：設置預設限流等待時間
    pub fn with_rate_limit_delay(mut self, delay: Duration) -> Self {
        self.rate_limit_delay = delay;
        self
    }

    /// 不重試
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// 第 `failures` 次失敗後的等待時間
    pub fn delay_for(&self, failures: u32, error: &SyncError) -> Duration {
        match error {
            SyncError::RateLimited { retry_after } => retry_after.unwrap_or(self.rate_limit_delay),
            _ => {
                let exponent = failures.saturating_sub(1);
                self.base_delay.saturating_mul(2u32.saturating_pow(exponent))
            }
        }
    }

    /// 執行操作，可重試的錯誤依策略重試
    pub fn run<T, F>(&self, operation: &str, sleeper: &dyn Sleeper, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut failures = 0;
        loop {
            match attempt() {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    failures += 1;
                    if failures >= self.max_attempts {
                        tracing::warn!("{} 失敗 {} 次，放棄：{}", operation, failures, err);
                        return Err(SyncError::Exhausted {
                            attempts: failures,
                            last: Box::new(err),
                        });
                    }

                    let delay = self.delay_for(failures, &err);
                    tracing::warn!(
                        "{} 第 {} 次失敗：{}，{:?} 後重試",
                        operation,
                        failures,
                        err,
                        delay
                    );
                    sleeper.sleep(delay);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// 為任意來源加上重試
pub struct RetryingSource<S, Z = ThreadSleeper> {
    inner: S,
    policy: RetryPolicy,
    sleeper: Z,
}

impl<S> RetryingSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            sleeper: ThreadSleeper,
        }
    }
}

impl<S, Z: Sleeper> RetryingSource<S, Z> {
    /// 建構器模式：替換等待實作
    pub fn with_sleeper<Y: Sleeper>(self, sleeper: Y) -> RetryingSource<S, Y> {
        RetryingSource {
            inner: self.inner,
            policy: self.policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: OrderSource, Z: Sleeper> OrderSource for RetryingSource<S, Z> {
    fn fetch_orders(&self, window: &AnalysisPeriod) -> Result<Vec<OrderLine>> {
        self.policy
            .run("訂單查詢", &self.sleeper, || self.inner.fetch_orders(window))
    }
}

impl<S: StockSource, Z: Sleeper> StockSource for RetryingSource<S, Z> {
    fn fetch_stock(&self) -> Result<Vec<StockSnapshot>> {
        self.policy
            .run("庫存查詢", &self.sleeper, || self.inner.fetch_stock())
    }
}
