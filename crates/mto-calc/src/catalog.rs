//! 物料目錄查詢

use mto_core::{CatalogEntry, MaterialDescription, NormalizedKey};
use std::collections::HashMap;

/// 物料目錄（以正規化代碼為鍵）
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<NormalizedKey, CatalogEntry>,
}

impl Catalog {
    /// 創建空的目錄
    pub fn empty() -> Self {
        Self::default()
    }

    /// 依載入順序建立目錄；正規化後重複的代碼以第一筆為準
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut map = HashMap::new();
        let mut collisions = 0usize;

        for entry in entries {
            let key = NormalizedKey::new(&entry.material_identifier);
            if map.contains_key(&key) {
                collisions += 1;
                continue;
            }
            map.insert(key, entry);
        }

        if collisions > 0 {
            tracing::debug!("物料目錄有 {} 筆代碼重複，以先載入者為準", collisions);
        }

        Self { entries: map }
    }

    /// 查詢物料描述；未建檔時以原始代碼代替，不會失敗
    pub fn describe(&self, material_identifier: &str) -> MaterialDescription {
        self.entries
            .get(&NormalizedKey::new(material_identifier))
            .map(MaterialDescription::from)
            .unwrap_or_else(|| MaterialDescription::fallback(material_identifier))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
