//! # MTO Store
//!
//! 儲存層介面與發料引擎
//!
//! 讀取端（[`MaterialReader`]）提供彙總與切管建議所需的快照；
//! 寫入端只有 [`IssuanceLedger`] 一個入口，所有對管材與請購明細的
//! 讀-改-寫都必須經過它，並以單一交易提交。

pub mod issuance;
pub mod memory;

// Re-export 主要類型
pub use issuance::IssuanceEngine;
pub use memory::InMemoryStore;

use mto_core::{
    BomLine, CatalogEntry, CutRecord, IssuanceRecord, Isometric, NormalizedKey, Project,
    RequestLine, Result, Revision, Spool, StockItem,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 唯讀查詢介面
pub trait MaterialReader: Send + Sync {
    /// 查詢專案（不存在時回傳 NotFound）
    fn project(&self, project_id: Uuid) -> Result<Project>;

    /// 專案內所有單線圖
    fn isometrics(&self, project_id: Uuid) -> Result<Vec<Isometric>>;

    /// 指定單線圖的所有版次（含歷史版次）
    fn revisions(&self, isometric_ids: &[Uuid]) -> Result<Vec<Revision>>;

    /// 專案內所有管段實體
    fn spools(&self, project_id: Uuid) -> Result<Vec<Spool>>;

    /// 指定版次的材料明細
    fn bom_lines(&self, revision_ids: &[Uuid]) -> Result<Vec<BomLine>>;

    /// 物料目錄（依載入順序）
    fn catalog(&self) -> Result<Vec<CatalogEntry>>;

    /// 專案內所有請購明細
    fn request_lines(&self, project_id: Uuid) -> Result<Vec<RequestLine>>;

    /// 指定物料的所有管材
    fn stock_items(&self, material: &NormalizedKey) -> Result<Vec<StockItem>>;
}

/// 發料指令
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCommand {
    pub request_line_id: Uuid,
    pub quantity: Decimal,
    pub actor_id: Uuid,
}

/// 切管指令
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutCommand {
    pub project_id: Uuid,
    pub stock_item_id: Uuid,
    pub length: Decimal,
    pub spool_id: Uuid,
    pub actor_id: Uuid,
}

/// 發料結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceReceipt {
    pub record: IssuanceRecord,
    /// 提交後的已收數量
    pub quantity_received: Decimal,
    /// 提交後的待收數量
    pub pending: Decimal,
    /// 提交後管材剩餘長度（未扣管材時為空）
    pub remaining_length: Option<Decimal>,
}

/// 切管結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutReceipt {
    pub record: CutRecord,
    /// 提交後的管材（即餘料）
    pub stock_item: StockItem,
}

/// 唯一的寫入入口：每次呼叫都是一個完整交易
pub trait IssuanceLedger: Send + Sync {
    /// 發料：扣減管材（若有）並累加已收數量
    fn issue(&self, command: &IssueCommand) -> Result<IssuanceReceipt>;

    /// 切管：扣減管材、記錄追溯並沖銷對應請購明細
    fn cut(&self, command: &CutCommand) -> Result<CutReceipt>;
}
