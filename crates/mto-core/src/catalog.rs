//! 物料目錄模型

use serde::{Deserialize, Serialize};

/// 自訂分類屬性數量
pub const CUSTOM_ATTRIBUTE_SLOTS: usize = 4;

/// 物料目錄項目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 物料代碼
    pub material_identifier: String,

    /// 描述
    pub description: String,

    /// 詳細描述
    pub long_description: Option<String>,

    /// 自訂分類屬性 1-4
    pub custom_attributes: [Option<String>; CUSTOM_ATTRIBUTE_SLOTS],
}

impl CatalogEntry {
    /// 創建新的目錄項目
    pub fn new(material_identifier: String, description: String) -> Self {
        Self {
            material_identifier,
            description,
            long_description: None,
            custom_attributes: Default::default(),
        }
    }

    /// 建構器模式：設置詳細描述
    pub fn with_long_description(mut self, long_description: String) -> Self {
        self.long_description = Some(long_description);
        self
    }

    /// 建構器模式：設置自訂屬性（slot 為 0-3，超出範圍忽略）
    pub fn with_attribute(mut self, slot: usize, value: String) -> Self {
        if let Some(attr) = self.custom_attributes.get_mut(slot) {
            *attr = Some(value);
        }
        self
    }
}

/// 物料描述（目錄查詢結果）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialDescription {
    pub description: String,
    pub long_description: String,
    pub custom_attributes: [Option<String>; CUSTOM_ATTRIBUTE_SLOTS],
    /// 是否來自目錄（false 表示以原始代碼代替）
    pub catalogued: bool,
}

impl MaterialDescription {
    /// 未建檔物料：以原始代碼作為描述
    pub fn fallback(raw_identifier: &str) -> Self {
        Self {
            description: raw_identifier.to_string(),
            long_description: raw_identifier.to_string(),
            custom_attributes: Default::default(),
            catalogued: false,
        }
    }
}

impl From<&CatalogEntry> for MaterialDescription {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            description: entry.description.clone(),
            long_description: entry
                .long_description
                .clone()
                .unwrap_or_else(|| entry.description.clone()),
            custom_attributes: entry.custom_attributes.clone(),
            catalogued: true,
        }
    }
}
