//! SKU 樣式（決定哪些 SKU 參與計算）

use serde::{Deserialize, Serialize};

use crate::{ReorderError, Result};

/// SKU 樣式
///
/// 支援簡單萬用字元：`*` 匹配任意長度字元，`?` 匹配單一字元，
/// 其餘字元逐字比對（ASCII 不分大小寫）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuPattern {
    pub pattern: String,
    pub active: bool,
}

impl SkuPattern {
    /// 創建啟用中的樣式
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(ReorderError::InvalidPattern("樣式不可為空".to_string()));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            active: true,
        })
    }

    /// 建構器模式：設置啟用狀態
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// 不含萬用字元的樣式即為單一 SKU
    pub fn is_literal(&self) -> bool {
        !self.pattern.contains(['*', '?'])
    }

    pub fn matches(&self, sku: &str) -> bool {
        glob_match(&self.pattern, sku)
    }
}

/// SKU 樣式集合
///
/// 作為明確參數傳入每次計算；沒有任何啟用樣式時視為不過濾。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkuPatternSet {
    patterns: Vec<SkuPattern>,
}

impl SkuPatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由樣式字串建立（全部啟用）
    pub fn from_patterns<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut set = Self::new();
        for pattern in patterns {
            set.add(pattern)?;
        }
        Ok(set)
    }

    /// 新增樣式；已存在時改為啟用並回傳 false
    pub fn add(&mut self, pattern: &str) -> Result<bool> {
        let candidate = SkuPattern::new(pattern)?;
        if let Some(existing) = self.find_mut(&candidate.pattern) {
            existing.active = true;
            return Ok(false);
        }
        self.patterns.push(candidate);
        Ok(true)
    }

    /// 設置啟用狀態；找不到樣式時回傳 false
    pub fn set_active(&mut self, pattern: &str, active: bool) -> bool {
        match self.find_mut(pattern.trim()) {
            Some(existing) => {
                existing.active = active;
                true
            }
            None => false,
        }
    }

    /// 移除樣式
    pub fn remove(&mut self, pattern: &str) -> bool {
        let pattern = pattern.trim();
        let before = self.patterns.len();
        self.patterns.retain(|p| p.pattern != pattern);
        self.patterns.len() != before
    }

    pub fn patterns(&self) -> &[SkuPattern] {
        &self.patterns
    }

    pub fn active(&self) -> impl Iterator<Item = &SkuPattern> {
        self.patterns.iter().filter(|p| p.active)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// 檢查 SKU 是否在計算範圍內
    pub fn matches(&self, sku: &str) -> bool {
        let mut active = self.active().peekable();
        if active.peek().is_none() {
            return true;
        }
        active.any(|p| p.matches(sku))
    }

    /// 啟用中的單一 SKU 樣式（即使期間內無銷售也要出現在結果中）
    pub fn literal_skus(&self) -> impl Iterator<Item = &str> {
        self.active()
            .filter(|p| p.is_literal())
            .map(|p| p.pattern.as_str())
    }

    fn find_mut(&mut self, pattern: &str) -> Option<&mut SkuPattern> {
        self.patterns.iter_mut().find(|p| p.pattern == pattern)
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    // 最近一次 `*` 的位置，以及它目前吞到的文字位置
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p].eq_ignore_ascii_case(&text[t])) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, consumed)) = backtrack {
            p = star + 1;
            t = consumed + 1;
            backtrack = Some((star, consumed + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
