//! # MTO Calculation Engine
//!
//! 材料彙總（單線圖 → 版次 → 管段 → 材料明細 × 請購帳 × 物料目錄）與管材需求計算

pub mod catalog;
pub mod consolidator;
pub mod pipe_needs;
pub mod search;
pub mod summary;

// Re-export 主要類型
pub use catalog::Catalog;
pub use consolidator::Consolidator;
pub use pipe_needs::{PipeClassifier, PipeNeed, PipeNeedAggregator};
pub use search::SearchTerm;
pub use summary::{
    ConsolidatedItem, IsometricSummary, PhysicalSpool, ProcurementRollup, RollupStatus,
    SpoolGroup,
};

use serde::Serialize;

/// 彙總結果（一頁）
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationPage {
    /// 本頁單線圖
    pub isometrics: Vec<IsometricSummary>,

    /// 符合條件的單線圖總數（分頁前）
    pub total_isometrics: usize,

    pub offset: usize,
    pub limit: usize,

    /// 查詢降級等警告
    pub warnings: Vec<ConsolidationWarning>,
}

impl ConsolidationPage {
    /// 創建空的結果頁
    pub fn empty(offset: usize, limit: usize) -> Self {
        Self {
            isometrics: Vec::new(),
            total_isometrics: 0,
            offset,
            limit,
            warnings: Vec::new(),
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ConsolidationWarning) {
        self.warnings.push(warning);
    }

    /// 本頁管段總數
    pub fn spool_count(&self) -> usize {
        self.isometrics.iter().map(|iso| iso.spool_count).sum()
    }

    /// 本頁材料明細總數
    pub fn item_count(&self) -> usize {
        self.isometrics.iter().map(|iso| iso.item_count).sum()
    }
}

/// 彙總警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsolidationWarning {
    /// 受影響範圍（如 "catalog"、管段號）
    pub scope: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ConsolidationWarning {
    pub fn new(scope: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            scope,
            message,
            severity,
        }
    }

    pub fn info(scope: String, message: String) -> Self {
        Self::new(scope, message, WarningSeverity::Info)
    }

    pub fn warning(scope: String, message: String) -> Self {
        Self::new(scope, message, WarningSeverity::Warning)
    }

    /// 查詢降級（目錄或請購帳無法讀取）
    pub fn degraded(scope: &str, error: &mto_core::MtoError) -> Self {
        let degraded = mto_core::MtoError::DegradedLookup(error.to_string());
        Self::warning(scope.to_string(), degraded.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}
