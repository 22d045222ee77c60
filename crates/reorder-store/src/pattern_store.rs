//! SKU 樣式持久化（JSON 檔）

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use reorder_core::{SkuPattern, SkuPatternSet};

use crate::Result;

/// SKU 樣式儲存
///
/// 每次修改後立即寫回檔案；檔案不存在時視為空集合。
#[derive(Debug)]
pub struct PatternStore {
    path: PathBuf,
    patterns: RwLock<SkuPatternSet>,
}

impl PatternStore {
    /// 從檔案載入
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let patterns = Self::load(&path)?;
        tracing::debug!("載入 SKU 樣式 {} 筆：{}", patterns.len(), path.display());

        Ok(Self {
            path,
            patterns: RwLock::new(patterns),
        })
    }

    fn load(path: &Path) -> Result<SkuPatternSet> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(SkuPatternSet::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, patterns: &SkuPatternSet) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(patterns)?)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 目前樣式集合的副本（作為計算參數傳入）
    pub fn current(&self) -> SkuPatternSet {
        self.patterns.read().clone()
    }

    pub fn list(&self) -> Vec<SkuPattern> {
        self.patterns.read().patterns().to_vec()
    }

    /// 新增樣式；已存在時改為啟用並回傳 false
    pub fn add(&self, pattern: &str) -> Result<bool> {
        self.modify(|set| Ok(set.add(pattern)?))
    }

    pub fn activate(&self, pattern: &str) -> Result<bool> {
        self.modify(|set| Ok(set.set_active(pattern, true)))
    }

    pub fn deactivate(&self, pattern: &str) -> Result<bool> {
        self.modify(|set| Ok(set.set_active(pattern, false)))
    }

    pub fn remove(&self, pattern: &str) -> Result<bool> {
        self.modify(|set| Ok(set.remove(pattern)))
    }

    /// 在副本上修改，寫檔成功後才替換記憶體內容
    fn modify<F>(&self, f: F) -> Result<bool>
    where
        F: FnOnce(&mut SkuPatternSet) -> Result<bool>,
    {
        let mut patterns = self.patterns.write();
        let mut updated = patterns.clone();
        let changed = f(&mut updated)?;

        if updated != *patterns {
            self.save(&updated)?;
            *patterns = updated;
        }
        Ok(changed)
    }
}
