//! 管材需求彙總
//!
//! 跨管段加總管材（而非管件）的需求長度。是否為管材沒有型別旗標可依，
//! 以下判斷是經驗法則，可能誤判：
//! - 需求數量落在 (下限, 上限) 之間（兩端不含）
//! - 物料代碼以指定前綴開頭
//! - 目錄描述包含管材關鍵字

use mto_core::{MtoConfig, NormalizedKey, Result};
use mto_store::MaterialReader;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

use crate::catalog::Catalog;

/// 管材判斷規則
pub struct PipeClassifier<'a> {
    config: &'a MtoConfig,
}

impl<'a> PipeClassifier<'a> {
    pub fn new(config: &'a MtoConfig) -> Self {
        Self { config }
    }

    /// 任一條件成立即視為管材
    pub fn is_pipe(&self, quantity: Decimal, material: &NormalizedKey, description: &str) -> bool {
        self.quantity_in_range(quantity)
            || self
                .config
                .pipe_code_prefixes
                .iter()
                .any(|prefix| material.starts_with(prefix))
            || self.description_has_keyword(description)
    }

    fn quantity_in_range(&self, quantity: Decimal) -> bool {
        quantity > self.config.pipe_quantity_lower && quantity < self.config.pipe_quantity_upper
    }

    fn description_has_keyword(&self, description: &str) -> bool {
        let description = NormalizedKey::new(description);
        self.config
            .pipe_keywords
            .iter()
            .any(|keyword| description.contains(keyword))
    }
}

/// 單一物料的管材需求
#[derive(Debug, Clone, Serialize)]
pub struct PipeNeed {
    pub material_identifier: NormalizedKey,
    pub description: String,
    pub total_length_required: Decimal,
    /// 每筆符合的材料明細各記一次所屬管段
    pub spool_ids: Vec<Uuid>,
    /// 依標準管長估算的支數（僅供參考）
    pub estimated_sticks_needed: u32,
}

/// 管材需求彙總器
pub struct PipeNeedAggregator<'a, R: MaterialReader + ?Sized> {
    reader: &'a R,
    config: &'a MtoConfig,
}

impl<'a, R: MaterialReader + ?Sized> PipeNeedAggregator<'a, R> {
    pub fn new(reader: &'a R, config: &'a MtoConfig) -> Self {
        Self { reader, config }
    }

    /// 彙總指定管段的管材需求（依物料代碼排序）
    pub fn aggregate(&self, project_id: Uuid, spool_ids: &[Uuid]) -> Result<Vec<PipeNeed>> {
        self.reader.project(project_id)?;

        let spools: HashMap<Uuid, _> = self
            .reader
            .spools(project_id)?
            .into_iter()
            .map(|spool| (spool.id, spool))
            .collect();

        // 去除重複並保留輸入順序
        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        for id in spool_ids {
            if !seen.insert(*id) {
                continue;
            }
            match spools.get(id) {
                Some(spool) => selected.push(spool),
                None => tracing::warn!("管段 {} 不在專案 {} 中，略過", id, project_id),
            }
        }

        if selected.is_empty() {
            return Ok(Vec::new());
        }

        let mut revision_ids: Vec<Uuid> = selected.iter().map(|s| s.revision_id).collect();
        revision_ids.sort();
        revision_ids.dedup();
        let lines = self.reader.bom_lines(&revision_ids)?;

        let catalog = match self.reader.catalog() {
            Ok(entries) => Catalog::from_entries(entries),
            Err(err) => {
                tracing::warn!("物料目錄讀取失敗，僅以數量與代碼判斷管材: {}", err);
                Catalog::empty()
            }
        };
        if catalog.is_empty() {
            tracing::debug!("物料目錄為空，關鍵字規則不適用");
        }

        let classifier = PipeClassifier::new(self.config);
        let mut needs: BTreeMap<NormalizedKey, PipeNeed> = BTreeMap::new();

        for spool in &selected {
            let spool_key = spool.join_key();
            for line in lines.iter().filter(|line| line.spool_key() == spool_key) {
                let material = line.material_key();
                let description = catalog.describe(&line.material_identifier);
                if !classifier.is_pipe(line.quantity, &material, &description.description) {
                    continue;
                }

                let need = needs.entry(material.clone()).or_insert_with(|| PipeNeed {
                    material_identifier: material,
                    description: description.description.clone(),
                    total_length_required: Decimal::ZERO,
                    spool_ids: Vec::new(),
                    estimated_sticks_needed: 0,
                });
                need.total_length_required += line.quantity;
                need.spool_ids.push(spool.id);
            }
        }

        let needs: Vec<PipeNeed> = needs
            .into_values()
            .map(|mut need| {
                need.estimated_sticks_needed = self.config.estimate_sticks(need.total_length_required);
                need
            })
            .collect();

        tracing::debug!(
            "管材需求: 管段 {} 個，物料 {} 種",
            selected.len(),
            needs.len()
        );

        Ok(needs)
    }
}
