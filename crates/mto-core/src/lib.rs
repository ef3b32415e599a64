//! # MTO Core
//!
//! 核心資料模型與類型定義（工程樹、請購帳、管材庫存）

pub mod catalog;
pub mod config;
pub mod engineering;
pub mod key;
pub mod records;
pub mod request;
pub mod stock;

// Re-export 主要類型
pub use catalog::{CatalogEntry, MaterialDescription};
pub use config::MtoConfig;
pub use engineering::{BomLine, Isometric, Project, Revision, Spool};
pub use key::NormalizedKey;
pub use records::{CutRecord, IssuanceRecord};
pub use request::RequestLine;
pub use stock::{StockItem, StockLocation, StockState};

use rust_decimal::Decimal;
use uuid::Uuid;

/// MTO 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum MtoError {
    #[error("找不到{entity}: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("庫存不足：物料 {material} 需要 {required}, 可用 {available}")]
    InsufficientStock {
        material: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("發料數量超過待收數量：請購明細 {request_line_id} 發料 {requested}, 待收 {pending}")]
    QuantityExceedsPending {
        request_line_id: Uuid,
        requested: Decimal,
        pending: Decimal,
    },

    #[error("並行修改衝突: {entity} {id}")]
    ConcurrentModification { entity: &'static str, id: Uuid },

    #[error("查詢降級: {0}")]
    DegradedLookup(String),

    #[error("無效的輸入: {0}")]
    InvalidInput(String),

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("儲存層錯誤: {0}")]
    Storage(String),
}

impl MtoError {
    /// 建立 NotFound 錯誤
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// 是否應以新的讀取重試
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

pub type Result<T> = std::result::Result<T, MtoError>;
