//! MTO 彙總器

use mto_core::{
    BomLine, Isometric, MtoConfig, NormalizedKey, RequestLine, Result, Revision, Spool,
};
use mto_store::MaterialReader;
use rayon::prelude::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::search::{self, SearchTerm};
use crate::summary::{
    ConsolidatedItem, IsometricSummary, PhysicalSpool, ProcurementRollup, RollupStatus,
    SpoolGroup,
};
use crate::{ConsolidationPage, ConsolidationWarning};

/// (管段實體ID, 正規化物料代碼) → 請購彙總
struct LedgerIndex {
    rollups: HashMap<(Uuid, NormalizedKey), ProcurementRollup>,
}

impl LedgerIndex {
    fn from_lines(lines: &[RequestLine]) -> Self {
        let mut rollups: HashMap<(Uuid, NormalizedKey), ProcurementRollup> = HashMap::new();
        for line in lines {
            rollups
                .entry((line.spool_id, line.material_key()))
                .or_default()
                .add(line);
        }
        Self { rollups }
    }

    fn rollup(&self, spool_id: Uuid, material: &NormalizedKey) -> ProcurementRollup {
        self.rollups
            .get(&(spool_id, material.clone()))
            .cloned()
            .unwrap_or_default()
    }
}

/// 每次彙總共用的查詢表
struct JoinContext<'a> {
    lines_by_revision: HashMap<Uuid, Vec<BomLine>>,
    spool_index: HashMap<(Uuid, NormalizedKey), &'a Spool>,
    catalog: Catalog,
    ledger: Option<LedgerIndex>,
}

/// MTO 彙總器
pub struct Consolidator<'a, R: MaterialReader + ?Sized> {
    reader: &'a R,
    config: &'a MtoConfig,
}

impl<'a, R: MaterialReader + ?Sized> Consolidator<'a, R> {
    /// 創建新的彙總器
    pub fn new(reader: &'a R, config: &'a MtoConfig) -> Self {
        Self { reader, config }
    }

    /// 主彙總入口
    pub fn consolidate(
        &self,
        project_id: Uuid,
        search: Option<&str>,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<ConsolidationPage> {
        let start_time = std::time::Instant::now();
        let limit = self.config.clamp_page_limit(limit);

        tracing::info!(
            "開始 MTO 彙總：專案 {}，搜尋 {:?}，分頁 {}+{}",
            project_id,
            search,
            offset,
            limit
        );

        self.reader.project(project_id)?;

        // Step 1: 範圍內的單線圖（依圖號排序）
        tracing::debug!("Step 1: 解析單線圖範圍");
        let mut isometrics = self.reader.isometrics(project_id)?;
        isometrics.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));

        if let Some(term) = SearchTerm::parse(search) {
            let scope = search::resolve_scope(self.reader, project_id, &isometrics, &term)?;
            if scope.is_empty() {
                tracing::info!("搜尋 '{}' 無符合的單線圖", term.as_str());
                return Ok(ConsolidationPage::empty(offset, limit));
            }
            isometrics.retain(|iso| scope.contains(&iso.id));
        }

        let total_isometrics = isometrics.len();
        let page: Vec<Isometric> = isometrics.into_iter().skip(offset).take(limit).collect();

        let mut result = ConsolidationPage::empty(offset, limit);
        result.total_isometrics = total_isometrics;

        // Step 2: 目前版次
        tracing::debug!("Step 2: 解析目前版次");
        let resolved = self.resolve_current_revisions(page)?;
        tracing::debug!("有目前版次的單線圖: {}", resolved.len());
        if resolved.is_empty() {
            return Ok(result);
        }

        // Step 3-5: 材料明細、管段實體、目錄與請購帳
        tracing::debug!("Step 3: 載入材料明細與對應表");
        let spools = self.reader.spools(project_id)?;
        let context = self.build_context(project_id, &resolved, &spools, &mut result)?;

        // Step 6-8: 逐張單線圖彙總（平行計算，保持原順序）
        tracing::debug!("Step 4: 逐張單線圖彙總");
        let summaries: Vec<(IsometricSummary, Vec<ConsolidationWarning>)> = resolved
            .par_iter()
            .map(|(iso, rev)| self.summarize(iso, rev, &context))
            .collect();

        for (summary, warnings) in summaries {
            result.isometrics.push(summary);
            result.warnings.extend(warnings);
        }

        tracing::info!(
            "MTO 彙總完成，耗時 {:?}：單線圖 {} 張，管段 {} 個，明細 {} 筆，警告 {} 筆",
            start_time.elapsed(),
            result.isometrics.len(),
            result.spool_count(),
            result.item_count(),
            result.warnings.len()
        );

        Ok(result)
    }

    /// 僅保留目前版次可解析的單線圖
    fn resolve_current_revisions(
        &self,
        page: Vec<Isometric>,
    ) -> Result<Vec<(Isometric, Revision)>> {
        let isometric_ids: Vec<Uuid> = page.iter().map(|iso| iso.id).collect();
        let revisions: HashMap<Uuid, Revision> = self
            .reader
            .revisions(&isometric_ids)?
            .into_iter()
            .map(|rev| (rev.id, rev))
            .collect();

        Ok(page
            .into_iter()
            .filter_map(|iso| {
                let revision = iso
                    .current_revision_id
                    .and_then(|id| revisions.get(&id))
                    .filter(|rev| rev.isometric_id == iso.id)
                    .cloned();
                if revision.is_none() {
                    tracing::debug!("單線圖 {} 尚無目前版次，略過", iso.number);
                }
                revision.map(|rev| (iso, rev))
            })
            .collect())
    }

    fn build_context<'s>(
        &self,
        project_id: Uuid,
        resolved: &[(Isometric, Revision)],
        spools: &'s [Spool],
        result: &mut ConsolidationPage,
    ) -> Result<JoinContext<'s>> {
        let revision_ids: Vec<Uuid> = resolved.iter().map(|(_, rev)| rev.id).collect();

        let mut lines_by_revision: HashMap<Uuid, Vec<BomLine>> = HashMap::new();
        for line in self.reader.bom_lines(&revision_ids)? {
            lines_by_revision
                .entry(line.revision_id)
                .or_default()
                .push(line);
        }

        let mut spool_index = HashMap::new();
        for spool in spools {
            spool_index.entry(spool.join_key()).or_insert(spool);
        }

        let catalog = match self.reader.catalog() {
            Ok(entries) => Catalog::from_entries(entries),
            Err(err) => {
                tracing::warn!("物料目錄讀取失敗，以原始代碼代替描述: {}", err);
                result.add_warning(ConsolidationWarning::degraded("catalog", &err));
                Catalog::empty()
            }
        };

        let ledger = match self.reader.request_lines(project_id) {
            Ok(lines) => Some(LedgerIndex::from_lines(&lines)),
            Err(err) => {
                tracing::warn!("請購帳讀取失敗，請購數量以 0 計: {}", err);
                result.add_warning(ConsolidationWarning::degraded("request_lines", &err));
                None
            }
        };

        tracing::debug!(
            "材料明細 {} 筆，管段實體 {} 個，目錄 {} 筆",
            lines_by_revision.values().map(Vec::len).sum::<usize>(),
            spool_index.len(),
            catalog.len()
        );

        Ok(JoinContext {
            lines_by_revision,
            spool_index,
            catalog,
            ledger,
        })
    }

    /// 單張單線圖彙總
    fn summarize(
        &self,
        iso: &Isometric,
        rev: &Revision,
        context: &JoinContext<'_>,
    ) -> (IsometricSummary, Vec<ConsolidationWarning>) {
        let mut groups: Vec<SpoolGroup> = Vec::new();
        let mut group_index: HashMap<NormalizedKey, usize> = HashMap::new();
        let mut warnings = Vec::new();

        let lines = context
            .lines_by_revision
            .get(&rev.id)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for line in lines {
            let spool_key = NormalizedKey::new(&line.spool_number);
            let index = match group_index.get(&spool_key) {
                Some(index) => *index,
                None => {
                    let group = Self::open_group(rev, line, &spool_key, context);
                    if !group.physical.is_resolved() {
                        warnings.push(ConsolidationWarning::info(
                            format!("{}/{}", iso.number, group.spool_number),
                            "管段實體無法對應，請購數量以 0 計".to_string(),
                        ));
                    }
                    groups.push(group);
                    group_index.insert(spool_key, groups.len() - 1);
                    groups.len() - 1
                }
            };

            let group = &mut groups[index];
            let item = Self::consolidate_item(line, &group.physical, context);
            group.total_required += item.quantity_required;
            group.items.push(item);
        }

        groups.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.spool_number.cmp(&b.spool_number))
        });

        let summary = IsometricSummary {
            isometric_id: iso.id,
            number: iso.number.clone(),
            revision_id: rev.id,
            revision_number: rev.revision_number.clone(),
            spool_count: groups.len(),
            item_count: groups.iter().map(SpoolGroup::item_count).sum(),
            total_required: groups.iter().map(|g| g.total_required).sum(),
            spools: groups,
        };

        (summary, warnings)
    }

    /// 以第一筆參照的材料明細建立管段分組
    fn open_group(
        rev: &Revision,
        line: &BomLine,
        spool_key: &NormalizedKey,
        context: &JoinContext<'_>,
    ) -> SpoolGroup {
        let spool_number = line.spool_number.trim().to_string();
        let display_name = match rev.revision_number.as_deref().map(str::trim) {
            Some(number) if !number.is_empty() => format!("{} / Rev {}", spool_number, number),
            _ => spool_number.clone(),
        };

        let (physical, management_tag) =
            match context.spool_index.get(&(rev.id, spool_key.clone())) {
                Some(spool) => (
                    PhysicalSpool::Resolved {
                        id: spool.id,
                        management_tag: spool.management_tag.clone(),
                    },
                    spool
                        .management_tag
                        .clone()
                        .or_else(|| line.management_tag.clone()),
                ),
                None => (PhysicalSpool::Unresolved, line.management_tag.clone()),
            };

        SpoolGroup {
            spool_number,
            display_name,
            physical,
            management_tag,
            items: Vec::new(),
            total_required: rust_decimal::Decimal::ZERO,
        }
    }

    fn consolidate_item(
        line: &BomLine,
        physical: &PhysicalSpool,
        context: &JoinContext<'_>,
    ) -> ConsolidatedItem {
        let material = line.material_key();
        let description = context.catalog.describe(&line.material_identifier);

        let (procurement, rollup_status) = match (physical.id(), context.ledger.as_ref()) {
            (None, _) => (ProcurementRollup::default(), RollupStatus::SpoolUnresolved),
            (Some(_), None) => (ProcurementRollup::default(), RollupStatus::LedgerUnavailable),
            (Some(spool_id), Some(ledger)) => {
                (ledger.rollup(spool_id, &material), RollupStatus::Resolved)
            }
        };

        ConsolidatedItem {
            bom_line_id: line.id,
            material_identifier: material,
            raw_material_identifier: line.material_identifier.clone(),
            description,
            quantity_required: line.quantity,
            unit: line.unit.clone(),
            procurement,
            rollup_status,
        }
    }
}
