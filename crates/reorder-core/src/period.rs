//! 分析期間模型

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{ReorderError, Result};

/// 銷售分析期間 `[start, end]`
///
/// 天數為 `end - start`，對所有 SKU 一致，不會依各 SKU 的首末銷售日調整。
/// 建構時保證天數大於 0。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct AnalysisPeriod {
    start: NaiveDate,
    end: NaiveDate,
    #[serde(skip_serializing)]
    days: u32,
}

#[derive(Deserialize)]
struct RawPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawPeriod> for AnalysisPeriod {
    type Error = ReorderError;

    fn try_from(raw: RawPeriod) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl AnalysisPeriod {
    /// 創建分析期間，`start` 必須早於 `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let span = (end - start).num_days();
        if span <= 0 {
            return Err(ReorderError::InvalidPeriod(format!(
                "{} 至 {}：期間天數必須大於 0（實際 {}）",
                start, end, span
            )));
        }

        let days = u32::try_from(span).map_err(|_| {
            ReorderError::InvalidPeriod(format!("{} 至 {}：期間過長", start, end))
        })?;

        Ok(Self { start, end, days })
    }

    /// 以結束日往前回推 `days` 天
    pub fn trailing(end: NaiveDate, days: u32) -> Result<Self> {
        let start = end
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(|| ReorderError::InvalidPeriod(format!("{} 往前 {} 天溢出", end, days)))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 期間天數（恆大於 0）
    pub fn days(&self) -> u32 {
        self.days
    }

    /// 檢查日期是否落在期間內（含首尾）
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_create_period() {
        let period = AnalysisPeriod::new(date(2025, 8, 1), date(2025, 9, 24)).unwrap();
        assert_eq!(period.days(), 54);
        assert!(period.contains(date(2025, 8, 1)));
        assert!(period.contains(date(2025, 9, 24)));
        assert!(!period.contains(date(2025, 9, 25)));
    }

    #[test]
    fn test_empty_period_rejected() {
        let day = date(2025, 9, 1);
        assert!(matches!(
            AnalysisPeriod::new(day, day),
            Err(ReorderError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_inverted_period_rejected() {
        let result = AnalysisPeriod::new(date(2025, 9, 24), date(2025, 8, 1));
        assert!(matches!(result, Err(ReorderError::InvalidPeriod(_))));
    }

    #[test]
    fn test_trailing_period() {
        let period = AnalysisPeriod::trailing(date(2025, 9, 30), 30).unwrap();
        assert_eq!(period.start(), date(2025, 8, 31));
        assert_eq!(period.days(), 30);

        assert!(AnalysisPeriod::trailing(date(2025, 9, 30), 0).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: AnalysisPeriod =
            serde_json::from_str(r#"{"start":"2025-08-01","end":"2025-08-31"}"#).unwrap();
        assert_eq!(ok.days(), 30);

        let bad = serde_json::from_str::<AnalysisPeriod>(r#"{"start":"2025-08-31","end":"2025-08-01"}"#);
        assert!(bad.is_err());
    }
}
