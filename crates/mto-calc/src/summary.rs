//! 彙總結果的樹狀結構：單線圖 → 管段 → 材料明細

use mto_core::{MaterialDescription, NormalizedKey, RequestLine};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// 管段實體對應結果
///
/// 材料明細只以 (版次, 管段號) 參照管段，實體記錄可能尚未建立。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PhysicalSpool {
    Resolved {
        id: Uuid,
        management_tag: Option<String>,
    },
    Unresolved,
}

impl PhysicalSpool {
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Self::Resolved { id, .. } => Some(*id),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// 請購彙總的來源狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RollupStatus {
    /// 已依 (管段, 物料) 彙總
    Resolved,
    /// 管段實體無法對應，數量以 0 計
    SpoolUnresolved,
    /// 請購帳無法讀取，數量以 0 計
    LedgerUnavailable,
}

/// 請購/核准/已收彙總
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcurementRollup {
    pub requested: Decimal,
    /// 有效目標數量合計（核准優先）
    pub approved: Decimal,
    pub received: Decimal,
    pub pending: Decimal,
    pub line_count: usize,
}

impl ProcurementRollup {
    /// 累加一筆請購明細
    pub fn add(&mut self, line: &RequestLine) {
        self.requested += line.quantity_requested;
        self.approved += line.effective_quantity();
        self.received += line.quantity_received;
        self.pending += line.pending();
        self.line_count += 1;
    }
}

/// 材料明細列
#[derive(Debug, Clone, Serialize)]
pub struct ConsolidatedItem {
    pub bom_line_id: Uuid,
    /// 正規化物料代碼
    pub material_identifier: NormalizedKey,
    /// 材料明細上的原始代碼
    pub raw_material_identifier: String,
    pub description: MaterialDescription,
    pub quantity_required: Decimal,
    pub unit: String,
    pub procurement: ProcurementRollup,
    pub rollup_status: RollupStatus,
}

/// 管段分組
#[derive(Debug, Clone, Serialize)]
pub struct SpoolGroup {
    pub spool_number: String,
    pub display_name: String,
    pub physical: PhysicalSpool,
    pub management_tag: Option<String>,
    pub items: Vec<ConsolidatedItem>,
    pub total_required: Decimal,
}

impl SpoolGroup {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

/// 單線圖彙總
#[derive(Debug, Clone, Serialize)]
pub struct IsometricSummary {
    pub isometric_id: Uuid,
    pub number: String,
    pub revision_id: Uuid,
    pub revision_number: Option<String>,
    pub spools: Vec<SpoolGroup>,
    pub spool_count: usize,
    pub item_count: usize,
    pub total_required: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollup_sums_effective_and_pending() {
        let spool_id = Uuid::new_v4();
        let project_id = Uuid::new_v4();
        let mut rollup = ProcurementRollup::default();

        rollup.add(
            &RequestLine::new(project_id, spool_id, "A106B".to_string(), Decimal::from(10))
                .with_approved(Decimal::from(8))
                .with_received(Decimal::from(3)),
        );
        rollup.add(
            &RequestLine::new(project_id, spool_id, "A106B".to_string(), Decimal::from(4))
                .with_received(Decimal::from(4)),
        );

        assert_eq!(rollup.requested, Decimal::from(14));
        assert_eq!(rollup.approved, Decimal::from(12));
        assert_eq!(rollup.received, Decimal::from(7));
        assert_eq!(rollup.pending, Decimal::from(5));
        assert_eq!(rollup.line_count, 2);
    }

    #[test]
    fn test_physical_spool_identity() {
        let id = Uuid::new_v4();
        let resolved = PhysicalSpool::Resolved {
            id,
            management_tag: None,
        };
        assert_eq!(resolved.id(), Some(id));
        assert!(!PhysicalSpool::Unresolved.is_resolved());
    }
}
