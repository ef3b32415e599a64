//! 發料與切管的交易記錄

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 發料記錄
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceRecord {
    pub id: Uuid,
    pub request_line_id: Uuid,
    /// 扣減的管材（純沖銷待收時為空）
    pub stock_item_id: Option<Uuid>,
    pub quantity: Decimal,
    pub actor_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

/// 切管記錄：保存餘料到管段的追溯關係
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub stock_item_id: Uuid,
    pub spool_id: Uuid,
    /// 切下長度
    pub length: Decimal,
    /// 切後剩餘長度
    pub remaining_length: Decimal,
    /// 沖銷的請購明細 (明細ID, 數量)
    pub fulfilled: Vec<(Uuid, Decimal)>,
    pub actor_id: Uuid,
    pub cut_at: DateTime<Utc>,
}

impl CutRecord {
    /// 沖銷的總數量
    pub fn fulfilled_total(&self) -> Decimal {
        self.fulfilled.iter().map(|(_, qty)| *qty).sum()
    }
}
