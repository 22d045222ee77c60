//! 補貨配置模型

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ReorderError, Result};

/// 「緩衝月數」換算天數時每月的天數
pub const DAYS_PER_MONTH: u32 = 30;

/// 補貨參數配置
///
/// 三個參數都必須嚴格大於 0。配置本身可以用建構器組出任意值，
/// 在進入計算前由 [`ReorderConfig::validate`] 統一檢查；
/// 反序列化時同樣經過驗證。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig")]
pub struct ReorderConfig {
    /// 提前期（天）：下單到收貨的天數
    pub lead_time_days: u32,

    /// 緩衝天數：安全庫存覆蓋的天數
    pub buffer_days: u32,

    /// 銷售速度放大係數（例如預期成長 20% 時為 1.2）
    pub scale_factor: f64,

    /// 個別 SKU 的提前期／緩衝覆寫
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sku_overrides: BTreeMap<String, SkuOverride>,
}

/// 單一 SKU 的參數覆寫，未設定的欄位沿用全域配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time_days: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_days: Option<u32>,
}

impl SkuOverride {
    /// 建構器模式：覆寫提前期
    pub fn with_lead_time_days(mut self, days: u32) -> Self {
        self.lead_time_days = Some(days);
        self
    }

    /// 建構器模式：覆寫緩衝天數
    pub fn with_buffer_days(mut self, days: u32) -> Self {
        self.buffer_days = Some(days);
        self
    }
}

#[derive(Deserialize)]
struct RawConfig {
    lead_time_days: u32,
    buffer_days: u32,
    scale_factor: f64,
    #[serde(default)]
    sku_overrides: BTreeMap<String, SkuOverride>,
}

impl TryFrom<RawConfig> for ReorderConfig {
    type Error = ReorderError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let config = Self {
            lead_time_days: raw.lead_time_days,
            buffer_days: raw.buffer_days,
            scale_factor: raw.scale_factor,
            sku_overrides: raw.sku_overrides,
        };
        config.validate()?;
        Ok(config)
    }
}

impl ReorderConfig {
    /// 創建新的補貨配置（放大係數預設 1.0）
    pub fn new(lead_time_days: u32, buffer_days: u32) -> Self {
        Self {
            lead_time_days,
            buffer_days,
            scale_factor: 1.0,
            sku_overrides: BTreeMap::new(),
        }
    }

    /// 建構器模式：設置放大係數
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// 建構器模式：設置緩衝天數
    pub fn with_buffer_days(mut self, buffer_days: u32) -> Self {
        self.buffer_days = buffer_days;
        self
    }

    /// 建構器模式：以月數設置緩衝（月數 × 30 天，四捨五入）
    ///
    /// 月數無效時緩衝天數設為 0，交由 [`validate`](Self::validate) 回報。
    pub fn with_buffer_months(mut self, months: f64) -> Self {
        self.buffer_days = BufferSpec::Months(months).to_days().unwrap_or(0);
        self
    }

    /// 建構器模式：設置單一 SKU 的參數覆寫
    pub fn with_sku_override(mut self, sku: &str, sku_override: SkuOverride) -> Self {
        self.sku_overrides.insert(sku.trim().to_string(), sku_override);
        self
    }

    fn override_for(&self, sku: &str) -> Option<&SkuOverride> {
        self.sku_overrides.get(sku).or_else(|| {
            self.sku_overrides
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(sku))
                .map(|(_, value)| value)
        })
    }

    /// 該 SKU 實際使用的提前期（SKU 比對不分大小寫）
    pub fn lead_time_for(&self, sku: &str) -> u32 {
        self.override_for(sku)
            .and_then(|o| o.lead_time_days)
            .unwrap_or(self.lead_time_days)
    }

    /// 該 SKU 實際使用的緩衝天數
    pub fn buffer_days_for(&self, sku: &str) -> u32 {
        self.override_for(sku)
            .and_then(|o| o.buffer_days)
            .unwrap_or(self.buffer_days)
    }

    /// 檢查配置是否可用於計算
    pub fn validate(&self) -> Result<()> {
        if self.lead_time_days == 0 {
            return Err(ReorderError::InvalidConfig("提前期必須大於 0 天".to_string()));
        }

        if self.buffer_days == 0 {
            return Err(ReorderError::InvalidConfig("緩衝天數必須大於 0 天".to_string()));
        }

        if !self.scale_factor.is_finite() || self.scale_factor <= 0.0 {
            return Err(ReorderError::InvalidConfig(format!(
                "放大係數必須為正數，實際為 {}",
                self.scale_factor
            )));
        }

        for (sku, sku_override) in &self.sku_overrides {
            if sku_override.lead_time_days == Some(0) {
                return Err(ReorderError::InvalidConfig(format!("{} 的提前期必須大於 0 天", sku)));
            }
            if sku_override.buffer_days == Some(0) {
                return Err(ReorderError::InvalidConfig(format!("{} 的緩衝天數必須大於 0 天", sku)));
            }
        }

        Ok(())
    }

    /// 從 JSON 讀取並驗證配置
    ///
    /// 驗證失敗回傳 `InvalidConfig`，格式錯誤回傳 `Serialization`。
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Self::try_from(raw)
    }
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self::new(30, DAYS_PER_MONTH)
    }
}

/// 緩衝量的輸入形式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferSpec {
    /// 以月為單位（可為小數，1 個月 = 30 天）
    Months(f64),
    /// 直接給定天數
    Days(u32),
}

impl BufferSpec {
    /// 換算為緩衝天數
    pub fn to_days(&self) -> Result<u32> {
        match *self {
            BufferSpec::Days(days) => Ok(days),
            BufferSpec::Months(months) => {
                if !months.is_finite() || months <= 0.0 {
                    return Err(ReorderError::InvalidConfig(format!(
                        "緩衝月數必須為正數，實際為 {}",
                        months
                    )));
                }

                let days = (months * f64::from(DAYS_PER_MONTH)).round();
                if days < 1.0 || days > f64::from(u32::MAX) {
                    return Err(ReorderError::InvalidConfig(format!(
                        "緩衝月數 {} 換算後天數無效",
                        months
                    )));
                }

                Ok(days as u32)
            }
        }
    }
}

/// 請求端傳入的原始參數（提前期、緩衝、放大係數）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderParams {
    pub lead_time_days: u32,
    pub buffer: BufferSpec,
    pub scale_factor: f64,
}

impl ReorderParams {
    /// 轉換並驗證為補貨配置
    pub fn into_config(self) -> Result<ReorderConfig> {
        let config = ReorderConfig::new(self.lead_time_days, self.buffer.to_days()?)
            .with_scale_factor(self.scale_factor);
        config.validate()?;
        Ok(config)
    }
}

impl Default for ReorderParams {
    fn default() -> Self {
        Self {
            lead_time_days: 30,
            buffer: BufferSpec::Months(1.0),
            scale_factor: 1.0,
        }
    }
}

/// 彙總模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// 跨倉彙總：每個 SKU 一筆決策
    #[default]
    Aggregated,

    /// 分倉：每個 SKU 每個倉庫一筆決策
    PerWarehouse,
}
