//! 切管選料
//!
//! 對單一切管需求，從庫存快照中挑出一支管材：
//! 只考慮位於加工廠的同物料管材，已開封的餘料優先於整支新管，
//! 同一組內由短到長，取第一支長度足夠者。不做多支組合，也不跨需求最佳化。

use mto_core::{NormalizedKey, StockItem, StockLocation};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 選料策略
pub trait StockSelector: Send + Sync {
    /// 從快照中選出一支管材；沒有合適者時回傳 None（庫存不足）
    fn select<'a>(
        &self,
        required_length: Decimal,
        material: &NormalizedKey,
        snapshot: &'a [StockItem],
    ) -> Option<&'a StockItem>;
}

/// 餘料優先、最緊貼合的貪婪選料
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRemnantFirst;

impl StockSelector for GreedyRemnantFirst {
    fn select<'a>(
        &self,
        required_length: Decimal,
        material: &NormalizedKey,
        snapshot: &'a [StockItem],
    ) -> Option<&'a StockItem> {
        let mut candidates: Vec<&StockItem> = snapshot
            .iter()
            .filter(|item| {
                item.location == StockLocation::Workshop && &item.material_key() == material
            })
            .collect();

        candidates.sort_by(|a, b| candidate_order(a, b));

        tracing::debug!(
            "選料: 物料 {} 需求長度 {}，候選 {} 支",
            material,
            required_length,
            candidates.len()
        );

        candidates
            .into_iter()
            .find(|item| item.current_length >= required_length)
    }
}

/// 餘料在前；同組內剩餘長度由短到長；再以 ID 固定順序
fn candidate_order(a: &StockItem, b: &StockItem) -> Ordering {
    b.is_opened()
        .cmp(&a.is_opened())
        .then_with(|| a.current_length.cmp(&b.current_length))
        .then_with(|| a.id.cmp(&b.id))
}

/// 切管建議
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutRecommendation {
    pub stock_item: StockItem,
    /// 切後剩餘長度
    pub remnant_length: Decimal,
    /// 是否為已開封餘料
    pub opened: bool,
}

impl CutRecommendation {
    pub fn new(stock_item: &StockItem, required_length: Decimal) -> Self {
        Self {
            remnant_length: stock_item.current_length - required_length,
            opened: stock_item.is_opened(),
            stock_item: stock_item.clone(),
        }
    }
}

/// 以預設策略選料
pub fn recommend<'a>(
    required_length: Decimal,
    material_identifier: &str,
    snapshot: &'a [StockItem],
) -> Option<&'a StockItem> {
    GreedyRemnantFirst.select(
        required_length,
        &NormalizedKey::new(material_identifier),
        snapshot,
    )
}
