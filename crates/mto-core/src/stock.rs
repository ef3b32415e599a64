//! 管材庫存模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::key::NormalizedKey;
use crate::{MtoError, Result};

/// 管材所在位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockLocation {
    /// 倉庫（收料後）
    Warehouse,
    /// 加工廠（可切管）
    Workshop,
    /// 已安裝（現場，不再切管）
    Installed,
}

/// 管材狀態（由位置與長度推導）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockState {
    Received,
    Dispatched,
    PartiallyCut,
    Exhausted,
}

/// 管材（一支實體管）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    /// 管材ID
    pub id: Uuid,

    /// 所屬專案
    pub project_id: Uuid,

    /// 物料代碼（未正規化）
    pub material_identifier: String,

    /// 爐號/批號
    pub heat_number: Option<String>,

    /// 原始長度
    pub initial_length: Decimal,

    /// 剩餘長度
    pub current_length: Decimal,

    /// 位置
    pub location: StockLocation,

    /// 最近一次切管的管段（餘料追溯）
    pub last_cut_spool_id: Option<Uuid>,

    /// 樂觀鎖版本
    pub version: u64,
}

impl StockItem {
    /// 收料：創建新的整支管材（位於倉庫）
    pub fn new(project_id: Uuid, material_identifier: String, length: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            material_identifier,
            heat_number: None,
            initial_length: length,
            current_length: length,
            location: StockLocation::Warehouse,
            last_cut_spool_id: None,
            version: 0,
        }
    }

    /// 建構器模式：設置爐號
    pub fn with_heat_number(mut self, heat_number: String) -> Self {
        self.heat_number = Some(heat_number);
        self
    }

    /// 建構器模式：設置位置
    pub fn with_location(mut self, location: StockLocation) -> Self {
        self.location = location;
        self
    }

    /// 建構器模式：設置剩餘長度（不超過原始長度）
    pub fn with_current_length(mut self, length: Decimal) -> Self {
        self.current_length = length.min(self.initial_length).max(Decimal::ZERO);
        self
    }

    pub fn material_key(&self) -> NormalizedKey {
        NormalizedKey::new(&self.material_identifier)
    }

    /// 是否已開封（餘料）
    pub fn is_opened(&self) -> bool {
        self.current_length < self.initial_length
    }

    /// 推導目前狀態
    pub fn state(&self, exhausted_tolerance: Decimal) -> StockState {
        if self.current_length <= exhausted_tolerance {
            StockState::Exhausted
        } else if self.is_opened() {
            StockState::PartiallyCut
        } else if self.location == StockLocation::Workshop {
            StockState::Dispatched
        } else {
            StockState::Received
        }
    }

    /// 扣減長度（切管或發料）
    pub fn consume(&mut self, length: Decimal) -> Result<()> {
        if length <= Decimal::ZERO {
            return Err(MtoError::InvalidInput(format!("扣減長度必須為正數: {}", length)));
        }
        if length > self.current_length {
            return Err(MtoError::InsufficientStock {
                material: self.material_identifier.clone(),
                required: length,
                available: self.current_length,
            });
        }
        self.current_length -= length;
        Ok(())
    }

    /// 搬移位置（不經發料引擎）
    pub fn relocate(&mut self, location: StockLocation) -> Result<()> {
        if self.location == StockLocation::Installed && location != StockLocation::Installed {
            return Err(MtoError::InvalidInput(format!(
                "管材 {} 已安裝，不可搬回 {:?}",
                self.id, location
            )));
        }
        self.location = location;
        Ok(())
    }
}
