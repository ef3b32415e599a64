//! 工程樹模型：專案 → 單線圖 → 版次 → 管段 → 材料明細

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::key::NormalizedKey;

/// 專案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
}

impl Project {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }
}

/// 單線圖（Isometric）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Isometric {
    /// 單線圖ID
    pub id: Uuid,

    /// 所屬專案
    pub project_id: Uuid,

    /// 圖號
    pub number: String,

    /// 目前版次（尚未匯入版次時為空）
    pub current_revision_id: Option<Uuid>,
}

impl Isometric {
    /// 創建新的單線圖
    pub fn new(project_id: Uuid, number: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            number,
            current_revision_id: None,
        }
    }

    /// 建構器模式：設置目前版次
    pub fn with_current_revision(mut self, revision_id: Uuid) -> Self {
        self.current_revision_id = Some(revision_id);
        self
    }
}

/// 版次：某一時點的材料清單快照，建立後不可變更
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub id: Uuid,
    pub isometric_id: Uuid,
    /// 版次編號（如 "0"、"A"）
    pub revision_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Revision {
    pub fn new(isometric_id: Uuid, revision_number: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            isometric_id,
            revision_number,
            created_at: Utc::now(),
        }
    }
}

/// 管段實體記錄（用於現場追蹤）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spool {
    /// 管段ID
    pub id: Uuid,

    /// 所屬專案
    pub project_id: Uuid,

    /// 所屬版次
    pub revision_id: Uuid,

    /// 管段號（版次內唯一）
    pub spool_number: String,

    /// 管理標籤
    pub management_tag: Option<String>,
}

impl Spool {
    /// 創建新的管段
    pub fn new(project_id: Uuid, revision_id: Uuid, spool_number: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            revision_id,
            spool_number,
            management_tag: None,
        }
    }

    /// 建構器模式：設置管理標籤
    pub fn with_management_tag(mut self, tag: String) -> Self {
        self.management_tag = Some(tag);
        self
    }

    /// 彙總時使用的關聯鍵
    pub fn join_key(&self) -> (Uuid, NormalizedKey) {
        (self.revision_id, NormalizedKey::new(&self.spool_number))
    }
}

/// 材料明細（MTO 項目）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomLine {
    /// 明細ID
    pub id: Uuid,

    /// 所屬版次
    pub revision_id: Uuid,

    /// 管段號（字串關聯，非外鍵）
    pub spool_number: String,

    /// 物料代碼（未正規化）
    pub material_identifier: String,

    /// 需求數量
    pub quantity: Decimal,

    /// 單位
    pub unit: String,

    /// 冗餘保存的管理標籤
    pub management_tag: Option<String>,
}

impl BomLine {
    /// 創建新的材料明細
    pub fn new(
        revision_id: Uuid,
        spool_number: String,
        material_identifier: String,
        quantity: Decimal,
        unit: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            revision_id,
            spool_number,
            material_identifier,
            quantity,
            unit,
            management_tag: None,
        }
    }

    /// 建構器模式：設置管理標籤
    pub fn with_management_tag(mut self, tag: String) -> Self {
        self.management_tag = Some(tag);
        self
    }

    pub fn spool_key(&self) -> (Uuid, NormalizedKey) {
        (self.revision_id, NormalizedKey::new(&self.spool_number))
    }

    pub fn material_key(&self) -> NormalizedKey {
        NormalizedKey::new(&self.material_identifier)
    }
}
