//! # MTO
//!
//! 材料彙總、切管選料與發料的程式庫介面
//!
//! 彙總與選料只讀取快照，可與發料並行；所有庫存與請購帳的變更都經過
//! [`IssuanceEngine`]，並由儲存層以單一交易提交。

use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

pub use mto_calc::{
    Catalog, ConsolidatedItem, ConsolidationPage, ConsolidationWarning, Consolidator,
    IsometricSummary, PhysicalSpool, PipeClassifier, PipeNeed, PipeNeedAggregator,
    ProcurementRollup, RollupStatus, SpoolGroup, WarningSeverity,
};
pub use mto_core::*;
pub use mto_optimizer::{CutRecommendation, GreedyRemnantFirst, StockSelector};
pub use mto_store::{
    CutReceipt, InMemoryStore, IssuanceEngine, IssuanceLedger, IssuanceReceipt, MaterialReader,
};

/// MTO 服務
pub struct MtoService<S: MaterialReader + IssuanceLedger> {
    store: Arc<S>,
    config: MtoConfig,
    selector: Box<dyn StockSelector>,
    engine: IssuanceEngine<S>,
}

impl<S: MaterialReader + IssuanceLedger> MtoService<S> {
    /// 創建新的服務（預設使用餘料優先選料）
    pub fn new(store: Arc<S>, config: MtoConfig) -> Result<Self> {
        config.validate()?;
        let engine = IssuanceEngine::new(store.clone(), config.max_issue_retries);
        Ok(Self {
            store,
            config,
            selector: Box::new(GreedyRemnantFirst),
            engine,
        })
    }

    /// 建構器模式：替換選料策略
    pub fn with_selector(mut self, selector: impl StockSelector + 'static) -> Self {
        self.selector = Box::new(selector);
        self
    }

    pub fn config(&self) -> &MtoConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// 材料彙總（分頁）
    pub fn consolidate(
        &self,
        project_id: Uuid,
        search: Option<&str>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<ConsolidationPage> {
        Consolidator::new(self.store.as_ref(), &self.config).consolidate(
            project_id,
            search,
            offset,
            limit,
        )
    }

    /// 管材需求彙總
    pub fn aggregate_pipe_needs(&self, project_id: Uuid, spool_ids: &[Uuid]) -> Result<Vec<PipeNeed>> {
        PipeNeedAggregator::new(self.store.as_ref(), &self.config).aggregate(project_id, spool_ids)
    }

    /// 切管選料：讀取即時庫存並挑選一支管材；庫存不足時回傳 None
    ///
    /// 快照涵蓋所有專案的同物料管材，選中的管材可能屬於其他專案，
    /// 此時 [`Self::process_cut`] 會以 NotFound 拒絕。要限定專案時改用
    /// [`Self::recommend_stock_in_project`]。
    pub fn recommend_stock(
        &self,
        required_length: Decimal,
        material_identifier: &str,
    ) -> Result<Option<CutRecommendation>> {
        self.recommend_from_snapshot(required_length, material_identifier, None)
    }

    /// 切管選料（只考慮指定專案的管材）
    pub fn recommend_stock_in_project(
        &self,
        project_id: Uuid,
        required_length: Decimal,
        material_identifier: &str,
    ) -> Result<Option<CutRecommendation>> {
        self.recommend_from_snapshot(required_length, material_identifier, Some(project_id))
    }

    fn recommend_from_snapshot(
        &self,
        required_length: Decimal,
        material_identifier: &str,
        project_id: Option<Uuid>,
    ) -> Result<Option<CutRecommendation>> {
        if required_length <= Decimal::ZERO {
            return Err(MtoError::InvalidInput(format!(
                "需求長度必須為正數: {}",
                required_length
            )));
        }

        let material = NormalizedKey::new(material_identifier);
        let mut snapshot = self.store.stock_items(&material)?;
        if let Some(project_id) = project_id {
            snapshot.retain(|item| item.project_id == project_id);
        }

        let recommendation = self
            .selector
            .select(required_length, &material, &snapshot)
            .map(|item| CutRecommendation::new(item, required_length));

        match &recommendation {
            Some(rec) => tracing::debug!(
                "選料建議: 管材 {}（剩餘 {}，切後 {}）",
                rec.stock_item.id,
                rec.stock_item.current_length,
                rec.remnant_length
            ),
            None => tracing::info!("物料 {} 無足夠長度 {} 的管材", material, required_length),
        }

        Ok(recommendation)
    }

    /// 發料
    pub fn issue(&self, request_line_id: Uuid, quantity: Decimal, actor_id: Uuid) -> Result<IssuanceReceipt> {
        self.engine.issue(request_line_id, quantity, actor_id)
    }

    /// 切管
    pub fn process_cut(
        &self,
        project_id: Uuid,
        stock_item_id: Uuid,
        length: Decimal,
        spool_id: Uuid,
        actor_id: Uuid,
    ) -> Result<CutReceipt> {
        self.engine
            .process_cut(project_id, stock_item_id, length, spool_id, actor_id)
    }

    /// 依配置的耗盡容差推導管材狀態
    pub fn stock_state(&self, item: &StockItem) -> StockState {
        item.state(self.config.exhausted_tolerance)
    }
}
