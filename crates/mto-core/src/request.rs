//! 請購明細模型（採購帳）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::key::NormalizedKey;
use crate::{MtoError, Result};

/// 請購明細：每筆對應 (管段, 物料) 的請購/核准/已收數量
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestLine {
    /// 明細ID
    pub id: Uuid,

    /// 所屬專案
    pub project_id: Uuid,

    /// 管段實體ID
    pub spool_id: Uuid,

    /// 物料代碼（未正規化）
    pub material_identifier: String,

    /// 請購數量
    pub quantity_requested: Decimal,

    /// 核准數量（未核准時以請購數量計）
    pub quantity_approved: Option<Decimal>,

    /// 已收/已發數量
    pub quantity_received: Decimal,

    /// 發料來源管材（為空時僅沖銷待收）
    pub stock_item_id: Option<Uuid>,

    /// 樂觀鎖版本
    pub version: u64,
}

impl RequestLine {
    /// 創建新的請購明細
    pub fn new(
        project_id: Uuid,
        spool_id: Uuid,
        material_identifier: String,
        quantity_requested: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            spool_id,
            material_identifier,
            quantity_requested,
            quantity_approved: None,
            quantity_received: Decimal::ZERO,
            stock_item_id: None,
            version: 0,
        }
    }

    /// 建構器模式：設置核准數量
    pub fn with_approved(mut self, quantity: Decimal) -> Self {
        self.quantity_approved = Some(quantity);
        self
    }

    /// 建構器模式：設置已收數量
    pub fn with_received(mut self, quantity: Decimal) -> Self {
        self.quantity_received = quantity;
        self
    }

    /// 建構器模式：設置發料來源管材
    pub fn with_stock_item(mut self, stock_item_id: Uuid) -> Self {
        self.stock_item_id = Some(stock_item_id);
        self
    }

    pub fn material_key(&self) -> NormalizedKey {
        NormalizedKey::new(&self.material_identifier)
    }

    /// 有效目標數量：核准優先，否則為請購數量
    pub fn effective_quantity(&self) -> Decimal {
        self.quantity_approved.unwrap_or(self.quantity_requested)
    }

    /// 待收數量（不為負）
    pub fn pending(&self) -> Decimal {
        (self.effective_quantity() - self.quantity_received).max(Decimal::ZERO)
    }

    /// 記錄收料/發料
    pub fn receive(&mut self, quantity: Decimal) -> Result<()> {
        if quantity <= Decimal::ZERO {
            return Err(MtoError::InvalidInput(format!("發料數量必須為正數: {}", quantity)));
        }
        let pending = self.pending();
        if quantity > pending {
            return Err(MtoError::QuantityExceedsPending {
                request_line_id: self.id,
                requested: quantity,
                pending,
            });
        }
        self.quantity_received += quantity;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(requested: i64) -> RequestLine {
        RequestLine::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "A106B".to_string(),
            Decimal::from(requested),
        )
    }

    #[test]
    fn test_pending_prefers_approved() {
        let rl = line(10).with_approved(Decimal::from(8)).with_received(Decimal::from(3));
        assert_eq!(rl.effective_quantity(), Decimal::from(8));
        assert_eq!(rl.pending(), Decimal::from(5));

        // 已收超過核准（歷史資料）時待收為 0
        let over = line(10).with_approved(Decimal::from(4)).with_received(Decimal::from(6));
        assert_eq!(over.pending(), Decimal::ZERO);
    }

    #[test]
    fn test_receive_within_pending() {
        let mut rl = line(10);
        assert!(rl.receive(Decimal::from(4)).is_ok());
        assert!(rl.receive(Decimal::from(6)).is_ok());
        assert_eq!(rl.quantity_received, Decimal::from(10));
        assert_eq!(rl.pending(), Decimal::ZERO);
    }

    #[test]
    fn test_receive_exceeding_pending_is_rejected() {
        let mut rl = line(10).with_received(Decimal::from(7));
        let err = rl.receive(Decimal::from(4)).unwrap_err();

        assert!(matches!(
            err,
            MtoError::QuantityExceedsPending { pending, .. } if pending == Decimal::from(3)
        ));
        // 失敗時不得部分套用
        assert_eq!(rl.quantity_received, Decimal::from(7));
    }

    #[test]
    fn test_receive_rejects_non_positive() {
        let mut rl = line(10);
        assert!(matches!(rl.receive(Decimal::ZERO), Err(MtoError::InvalidInput(_))));
    }
}
