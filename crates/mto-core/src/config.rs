//! MTO 配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MtoError, Result};

/// 彙總、切管與發料的參數配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MtoConfig {
    /// 標準管長（僅用於估算支數）
    pub standard_stick_length: Decimal,

    /// 管材數量下限（不含）
    pub pipe_quantity_lower: Decimal,

    /// 管材數量上限（不含）
    pub pipe_quantity_upper: Decimal,

    /// 視為管材的物料代碼前綴
    pub pipe_code_prefixes: Vec<String>,

    /// 視為管材的描述關鍵字
    pub pipe_keywords: Vec<String>,

    /// 剩餘長度低於此值視為耗盡
    pub exhausted_tolerance: Decimal,

    /// 發料遇到並行衝突時的重試次數
    pub max_issue_retries: u32,

    /// 預設分頁大小
    pub default_page_limit: usize,

    /// 分頁大小上限
    pub max_page_limit: usize,
}

impl Default for MtoConfig {
    fn default() -> Self {
        Self {
            standard_stick_length: Decimal::from(12),
            pipe_quantity_lower: Decimal::ONE,
            pipe_quantity_upper: Decimal::from(50),
            pipe_code_prefixes: vec!["PIPE".to_string(), "TUB".to_string()],
            pipe_keywords: vec![
                "PIPE".to_string(),
                "TUBE".to_string(),
                "TUBO".to_string(),
                "CAÑERIA".to_string(),
            ],
            exhausted_tolerance: Decimal::new(1, 2),
            max_issue_retries: 3,
            default_page_limit: 50,
            max_page_limit: 500,
        }
    }
}

impl MtoConfig {
    /// 從 JSON 載入配置（缺少的欄位使用預設值）
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| MtoError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置標準管長
    pub fn with_standard_stick_length(mut self, length: Decimal) -> Self {
        self.standard_stick_length = length;
        self
    }

    /// 建構器模式：設置管材數量區間（兩端不含）
    pub fn with_pipe_quantity_bounds(mut self, lower: Decimal, upper: Decimal) -> Self {
        self.pipe_quantity_lower = lower;
        self.pipe_quantity_upper = upper;
        self
    }

    /// 建構器模式：設置管材代碼前綴
    pub fn with_pipe_code_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.pipe_code_prefixes = prefixes;
        self
    }

    /// 建構器模式：設置管材描述關鍵字
    pub fn with_pipe_keywords(mut self, keywords: Vec<String>) -> Self {
        self.pipe_keywords = keywords;
        self
    }

    /// 建構器模式：設置耗盡容差
    pub fn with_exhausted_tolerance(mut self, tolerance: Decimal) -> Self {
        self.exhausted_tolerance = tolerance;
        self
    }

    /// 建構器模式：設置發料重試次數
    pub fn with_max_issue_retries(mut self, retries: u32) -> Self {
        self.max_issue_retries = retries;
        self
    }

    /// 建構器模式：設置分頁大小
    pub fn with_page_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.default_page_limit = default_limit;
        self.max_page_limit = max_limit;
        self
    }

    /// 檢查配置是否合理
    pub fn validate(&self) -> Result<()> {
        if self.standard_stick_length <= Decimal::ZERO {
            return Err(MtoError::InvalidConfig(format!(
                "標準管長必須為正數: {}",
                self.standard_stick_length
            )));
        }
        if self.pipe_quantity_lower >= self.pipe_quantity_upper {
            return Err(MtoError::InvalidConfig(format!(
                "管材數量區間無效: ({}, {})",
                self.pipe_quantity_lower, self.pipe_quantity_upper
            )));
        }
        if self.exhausted_tolerance < Decimal::ZERO {
            return Err(MtoError::InvalidConfig("耗盡容差不可為負".to_string()));
        }
        if self.default_page_limit == 0 || self.max_page_limit < self.default_page_limit {
            return Err(MtoError::InvalidConfig(format!(
                "分頁大小無效: 預設 {}, 上限 {}",
                self.default_page_limit, self.max_page_limit
            )));
        }
        Ok(())
    }

    /// 將呼叫端的分頁大小限制在允許範圍內
    pub fn clamp_page_limit(&self, limit: Option<usize>) -> usize {
        match limit {
            Some(0) | None => self.default_page_limit,
            Some(limit) => limit.min(self.max_page_limit),
        }
    }

    /// 依標準管長估算所需支數（無條件進位）
    pub fn estimate_sticks(&self, total_length: Decimal) -> u32 {
        use rust_decimal::prelude::ToPrimitive;

        if total_length <= Decimal::ZERO {
            return 0;
        }
        (total_length / self.standard_stick_length)
            .ceil()
            .to_u32()
            .unwrap_or(u32::MAX)
    }
}
