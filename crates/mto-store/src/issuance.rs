//! 發料引擎
//!
//! 所有發料與切管都經過這裡。儲存層保證單一交易的原子性，
//! 引擎負責輸入檢查，並在並行衝突時以新的讀取重試。

use mto_core::{MtoError, Result};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::{CutCommand, CutReceipt, IssuanceLedger, IssuanceReceipt, IssueCommand};

/// 發料引擎
pub struct IssuanceEngine<L: IssuanceLedger> {
    ledger: Arc<L>,
    max_retries: u32,
}

impl<L: IssuanceLedger> IssuanceEngine<L> {
    /// 創建新的發料引擎
    pub fn new(ledger: Arc<L>, max_retries: u32) -> Self {
        Self {
            ledger,
            max_retries,
        }
    }

    /// 發料：扣減庫存並沖銷請購明細的待收數量
    pub fn issue(
        &self,
        request_line_id: Uuid,
        quantity: Decimal,
        actor_id: Uuid,
    ) -> Result<IssuanceReceipt> {
        if quantity <= Decimal::ZERO {
            return Err(MtoError::InvalidInput(format!("發料數量必須為正數: {}", quantity)));
        }

        let command = IssueCommand {
            request_line_id,
            quantity,
            actor_id,
        };

        let receipt = self.with_retry("發料", || self.ledger.issue(&command))?;

        tracing::info!(
            "發料完成: 請購明細 {} 數量 {}，待收 {}",
            request_line_id,
            quantity,
            receipt.pending
        );

        Ok(receipt)
    }

    /// 切管：發料的特例，另外記錄管材到管段的追溯
    pub fn process_cut(
        &self,
        project_id: Uuid,
        stock_item_id: Uuid,
        length: Decimal,
        spool_id: Uuid,
        actor_id: Uuid,
    ) -> Result<CutReceipt> {
        if length <= Decimal::ZERO {
            return Err(MtoError::InvalidInput(format!("切管長度必須為正數: {}", length)));
        }

        let command = CutCommand {
            project_id,
            stock_item_id,
            length,
            spool_id,
            actor_id,
        };

        let receipt = self.with_retry("切管", || self.ledger.cut(&command))?;

        tracing::info!(
            "切管完成: 管材 {} 切下 {}，剩餘 {}，管段 {}",
            stock_item_id,
            length,
            receipt.stock_item.current_length,
            spool_id
        );

        Ok(receipt)
    }

    /// 遇到並行衝突時重試，其他錯誤直接回傳
    fn with_retry<T>(&self, operation: &str, mut attempt: impl FnMut() -> Result<T>) -> Result<T> {
        let mut retries = 0;
        loop {
            match attempt() {
                Err(err) if err.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    tracing::warn!("{}發生並行衝突，第 {} 次重試: {}", operation, retries, err);
                }
                result => return result,
            }
        }
    }
}
