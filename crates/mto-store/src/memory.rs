//! 記憶體交易儲存
//!
//! 每列可變資料（請購明細、管材）都帶有版本號。交易先在讀鎖下取得快照並驗證，
//! 再於寫鎖下比對版本後一次寫入；版本不符即回傳 `ConcurrentModification`，
//! 不會有部分寫入。

use chrono::Utc;
use mto_core::{
    BomLine, CatalogEntry, CutRecord, IssuanceRecord, Isometric, MtoError, NormalizedKey, Project,
    RequestLine, Result, Revision, Spool, StockItem, StockLocation,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    CutCommand, CutReceipt, IssuanceLedger, IssuanceReceipt, IssueCommand, MaterialReader,
};

#[derive(Debug, Default)]
struct Tables {
    projects: Vec<Project>,
    isometrics: Vec<Isometric>,
    revisions: Vec<Revision>,
    spools: Vec<Spool>,
    bom_lines: Vec<BomLine>,
    catalog: Vec<CatalogEntry>,
    request_lines: Vec<RequestLine>,
    stock_items: Vec<StockItem>,
    issuances: Vec<IssuanceRecord>,
    cuts: Vec<CutRecord>,
}

impl Tables {
    fn project(&self, id: Uuid) -> Result<&Project> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| MtoError::not_found("專案", id))
    }

    fn request_line(&self, id: Uuid) -> Result<&RequestLine> {
        self.request_lines
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| MtoError::not_found("請購明細", id))
    }

    fn request_line_mut(&mut self, id: Uuid) -> Result<&mut RequestLine> {
        self.request_lines
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| MtoError::not_found("請購明細", id))
    }

    fn stock_item(&self, id: Uuid) -> Result<&StockItem> {
        self.stock_items
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| MtoError::not_found("管材", id))
    }

    fn stock_item_mut(&mut self, id: Uuid) -> Result<&mut StockItem> {
        self.stock_items
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| MtoError::not_found("管材", id))
    }

    /// 比對快照版本與目前版本
    fn ensure_request_line_version(&self, snapshot: &RequestLine) -> Result<()> {
        if self.request_line(snapshot.id)?.version != snapshot.version {
            return Err(MtoError::ConcurrentModification {
                entity: "請購明細",
                id: snapshot.id,
            });
        }
        Ok(())
    }

    fn ensure_stock_version(&self, snapshot: &StockItem) -> Result<()> {
        if self.stock_item(snapshot.id)?.version != snapshot.version {
            return Err(MtoError::ConcurrentModification {
                entity: "管材",
                id: snapshot.id,
            });
        }
        Ok(())
    }

    /// 寫回並遞增版本（呼叫前必須已比對版本）
    fn write_request_line(&mut self, mut line: RequestLine) -> Result<RequestLine> {
        line.version += 1;
        let slot = self.request_line_mut(line.id)?;
        *slot = line.clone();
        Ok(line)
    }

    fn write_stock_item(&mut self, mut item: StockItem) -> Result<StockItem> {
        item.version += 1;
        let slot = self.stock_item_mut(item.id)?;
        *slot = item.clone();
        Ok(item)
    }
}

/// 已驗證、待提交的發料
#[derive(Debug, Clone)]
struct IssuePlan {
    line: RequestLine,
    stock_item: Option<StockItem>,
    record: IssuanceRecord,
}

/// 已驗證、待提交的切管
#[derive(Debug, Clone)]
struct CutPlan {
    stock_item: StockItem,
    lines: Vec<RequestLine>,
    record: CutRecord,
}

/// 記憶體儲存（參考實作，亦供測試使用）
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// 創建空的儲存
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&self, project: Project) -> Uuid {
        let id = project.id;
        self.tables.write().projects.push(project);
        id
    }

    pub fn add_isometric(&self, isometric: Isometric) -> Uuid {
        let id = isometric.id;
        self.tables.write().isometrics.push(isometric);
        id
    }

    /// 發布新版次並將單線圖的目前版次指向它（舊版次保留）
    pub fn announce_revision(&self, revision: Revision) -> Result<Uuid> {
        let mut tables = self.tables.write();
        let id = revision.id;
        let isometric = tables
            .isometrics
            .iter_mut()
            .find(|iso| iso.id == revision.isometric_id)
            .ok_or_else(|| MtoError::not_found("單線圖", revision.isometric_id))?;
        isometric.current_revision_id = Some(id);
        tables.revisions.push(revision);
        Ok(id)
    }

    pub fn add_spool(&self, spool: Spool) -> Uuid {
        let id = spool.id;
        self.tables.write().spools.push(spool);
        id
    }

    pub fn add_bom_lines(&self, lines: impl IntoIterator<Item = BomLine>) {
        self.tables.write().bom_lines.extend(lines);
    }

    pub fn add_catalog_entries(&self, entries: impl IntoIterator<Item = CatalogEntry>) {
        self.tables.write().catalog.extend(entries);
    }

    pub fn add_request_line(&self, line: RequestLine) -> Uuid {
        let id = line.id;
        self.tables.write().request_lines.push(line);
        id
    }

    /// 收料：登錄一支新管材（一律入倉庫，之後以 [`Self::move_stock`] 送加工廠）
    pub fn receive_stock(&self, item: StockItem) -> Result<Uuid> {
        if item.initial_length <= Decimal::ZERO
            || item.current_length < Decimal::ZERO
            || item.current_length > item.initial_length
        {
            return Err(MtoError::InvalidInput(format!(
                "管材長度無效: 原始 {}, 剩餘 {}",
                item.initial_length, item.current_length
            )));
        }
        if item.location != StockLocation::Warehouse {
            return Err(MtoError::InvalidInput(format!(
                "收料只能入倉庫，管材 {} 位置為 {:?}",
                item.id, item.location
            )));
        }
        let mut tables = self.tables.write();
        tables.project(item.project_id)?;
        let id = item.id;
        tracing::debug!("收料: 管材 {} ({}) 長度 {}", id, item.material_identifier, item.initial_length);
        tables.stock_items.push(item);
        Ok(id)
    }

    /// 搬移管材位置（倉庫 ↔ 加工廠 → 安裝），不經發料引擎
    pub fn move_stock(&self, stock_item_id: Uuid, location: StockLocation) -> Result<StockItem> {
        let mut tables = self.tables.write();
        let mut item = tables.stock_item(stock_item_id)?.clone();
        item.relocate(location)?;
        tracing::debug!("搬移管材 {} 至 {:?}", stock_item_id, location);
        tables.write_stock_item(item)
    }

    pub fn stock_item(&self, id: Uuid) -> Result<StockItem> {
        self.tables.read().stock_item(id).cloned()
    }

    pub fn request_line(&self, id: Uuid) -> Result<RequestLine> {
        self.tables.read().request_line(id).cloned()
    }

    pub fn issuance_records(&self) -> Vec<IssuanceRecord> {
        self.tables.read().issuances.clone()
    }

    pub fn cut_records(&self) -> Vec<CutRecord> {
        self.tables.read().cuts.clone()
    }

    /// 讀取快照並驗證發料
    fn prepare_issue(&self, command: &IssueCommand) -> Result<IssuePlan> {
        let (mut line, mut stock_item) = {
            let tables = self.tables.read();
            let line = tables.request_line(command.request_line_id)?.clone();
            let stock_item = match line.stock_item_id {
                Some(id) => Some(tables.stock_item(id)?.clone()),
                None => None,
            };
            (line, stock_item)
        };

        if let Some(item) = &stock_item {
            ensure_issuable(&line, item)?;
        }

        line.receive(command.quantity)?;
        if let Some(item) = stock_item.as_mut() {
            item.consume(command.quantity)?;
        }

        let record = IssuanceRecord {
            id: Uuid::new_v4(),
            request_line_id: line.id,
            stock_item_id: stock_item.as_ref().map(|s| s.id),
            quantity: command.quantity,
            actor_id: command.actor_id,
            issued_at: Utc::now(),
        };

        Ok(IssuePlan {
            line,
            stock_item,
            record,
        })
    }

    /// 比對版本後一次寫入
    fn commit_issue(&self, plan: IssuePlan) -> Result<IssuanceReceipt> {
        let mut tables = self.tables.write();

        tables.ensure_request_line_version(&plan.line)?;
        if let Some(item) = &plan.stock_item {
            tables.ensure_stock_version(item)?;
        }

        let line = tables.write_request_line(plan.line)?;
        let remaining_length = match plan.stock_item {
            Some(item) => Some(tables.write_stock_item(item)?.current_length),
            None => None,
        };
        tables.issuances.push(plan.record.clone());

        Ok(IssuanceReceipt {
            record: plan.record,
            quantity_received: line.quantity_received,
            pending: line.pending(),
            remaining_length,
        })
    }

    fn prepare_cut(&self, command: &CutCommand) -> Result<CutPlan> {
        if command.length <= Decimal::ZERO {
            return Err(MtoError::InvalidInput(format!("切管長度必須為正數: {}", command.length)));
        }

        let (mut stock_item, mut lines) = {
            let tables = self.tables.read();
            tables.project(command.project_id)?;

            let stock_item = tables.stock_item(command.stock_item_id)?.clone();
            if stock_item.project_id != command.project_id {
                return Err(MtoError::not_found("管材", command.stock_item_id));
            }
            let spool_in_project = tables
                .spools
                .iter()
                .any(|s| s.id == command.spool_id && s.project_id == command.project_id);
            if !spool_in_project {
                return Err(MtoError::not_found("管段", command.spool_id));
            }

            let material = stock_item.material_key();
            let lines: Vec<RequestLine> = tables
                .request_lines
                .iter()
                .filter(|l| {
                    l.spool_id == command.spool_id
                        && l.material_key() == material
                        && l.pending() > Decimal::ZERO
                })
                .cloned()
                .collect();
            (stock_item, lines)
        };

        if stock_item.location != StockLocation::Workshop {
            return Err(MtoError::InvalidInput(format!(
                "管材 {} 不在加工廠（目前: {:?}），不可切管",
                stock_item.id, stock_item.location
            )));
        }

        stock_item.consume(command.length)?;
        stock_item.last_cut_spool_id = Some(command.spool_id);

        // 依帳序沖銷，不超過各明細的待收數量
        let mut remaining = command.length;
        let mut fulfilled = Vec::new();
        lines.retain_mut(|line| {
            if remaining <= Decimal::ZERO {
                return false;
            }
            let take = line.pending().min(remaining);
            if line.receive(take).is_err() {
                return false;
            }
            remaining -= take;
            fulfilled.push((line.id, take));
            true
        });

        let record = CutRecord {
            id: Uuid::new_v4(),
            project_id: command.project_id,
            stock_item_id: stock_item.id,
            spool_id: command.spool_id,
            length: command.length,
            remaining_length: stock_item.current_length,
            fulfilled,
            actor_id: command.actor_id,
            cut_at: Utc::now(),
        };

        Ok(CutPlan {
            stock_item,
            lines,
            record,
        })
    }

    fn commit_cut(&self, plan: CutPlan) -> Result<CutReceipt> {
        let mut tables = self.tables.write();

        tables.ensure_stock_version(&plan.stock_item)?;
        for line in &plan.lines {
            tables.ensure_request_line_version(line)?;
        }

        let stock_item = tables.write_stock_item(plan.stock_item)?;
        for line in plan.lines {
            tables.write_request_line(line)?;
        }
        tables.cuts.push(plan.record.clone());

        Ok(CutReceipt {
            record: plan.record,
            stock_item,
        })
    }
}

/// 請購明細指向的管材必須同專案、同物料，且尚未安裝
fn ensure_issuable(line: &RequestLine, item: &StockItem) -> Result<()> {
    if item.project_id != line.project_id {
        return Err(MtoError::InvalidInput(format!(
            "管材 {} 不屬於請購明細 {} 的專案",
            item.id, line.id
        )));
    }
    if item.material_key() != line.material_key() {
        return Err(MtoError::InvalidInput(format!(
            "管材 {} 物料 {} 與請購明細 {} 物料 {} 不符",
            item.id,
            item.material_key(),
            line.id,
            line.material_key()
        )));
    }
    if item.location == StockLocation::Installed {
        return Err(MtoError::InvalidInput(format!("管材 {} 已安裝，不可發料", item.id)));
    }
    Ok(())
}

impl MaterialReader for InMemoryStore {
    fn project(&self, project_id: Uuid) -> Result<Project> {
        self.tables.read().project(project_id).cloned()
    }

    fn isometrics(&self, project_id: Uuid) -> Result<Vec<Isometric>> {
        Ok(self
            .tables
            .read()
            .isometrics
            .iter()
            .filter(|iso| iso.project_id == project_id)
            .cloned()
            .collect())
    }

    fn revisions(&self, isometric_ids: &[Uuid]) -> Result<Vec<Revision>> {
        Ok(self
            .tables
            .read()
            .revisions
            .iter()
            .filter(|rev| isometric_ids.contains(&rev.isometric_id))
            .cloned()
            .collect())
    }

    fn spools(&self, project_id: Uuid) -> Result<Vec<Spool>> {
        Ok(self
            .tables
            .read()
            .spools
            .iter()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect())
    }

    fn bom_lines(&self, revision_ids: &[Uuid]) -> Result<Vec<BomLine>> {
        Ok(self
            .tables
            .read()
            .bom_lines
            .iter()
            .filter(|line| revision_ids.contains(&line.revision_id))
            .cloned()
            .collect())
    }

    fn catalog(&self) -> Result<Vec<CatalogEntry>> {
        Ok(self.tables.read().catalog.clone())
    }

    fn request_lines(&self, project_id: Uuid) -> Result<Vec<RequestLine>> {
        Ok(self
            .tables
            .read()
            .request_lines
            .iter()
            .filter(|l| l.project_id == project_id)
            .cloned()
            .collect())
    }

    fn stock_items(&self, material: &NormalizedKey) -> Result<Vec<StockItem>> {
        Ok(self
            .tables
            .read()
            .stock_items
            .iter()
            .filter(|s| &s.material_key() == material)
            .cloned()
            .collect())
    }
}

impl IssuanceLedger for InMemoryStore {
    fn issue(&self, command: &IssueCommand) -> Result<IssuanceReceipt> {
        let plan = self.prepare_issue(command)?;
        self.commit_issue(plan)
    }

    fn cut(&self, command: &CutCommand) -> Result<CutReceipt> {
        let plan = self.prepare_cut(command)?;
        self.commit_cut(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    struct Fixture {
        store: InMemoryStore,
        project_id: Uuid,
        spool_id: Uuid,
        stick_id: Uuid,
        line_id: Uuid,
    }

    /// 一支收料後送到加工廠的管材，一筆指向該管材的請購
    fn fixture(stick_length: i64, requested: i64) -> Fixture {
        let store = InMemoryStore::new();
        let project_id = store.add_project(Project::new("P".to_string()));
        let spool_id = store.add_spool(Spool::new(project_id, Uuid::new_v4(), "SP-01".to_string()));
        let stick_id = store
            .receive_stock(StockItem::new(project_id, "A106B".to_string(), Decimal::from(stick_length)))
            .unwrap();
        store.move_stock(stick_id, StockLocation::Workshop).unwrap();
        let line_id = store.add_request_line(
            RequestLine::new(project_id, spool_id, "a106b".to_string(), Decimal::from(requested))
                .with_stock_item(stick_id),
        );
        Fixture {
            store,
            project_id,
            spool_id,
            stick_id,
            line_id,
        }
    }

    fn issue_cmd(line_id: Uuid, quantity: i64) -> IssueCommand {
        IssueCommand {
            request_line_id: line_id,
            quantity: Decimal::from(quantity),
            actor_id: Uuid::nil(),
        }
    }

    #[test]
    fn test_issue_decrements_stock_and_increments_ledger() {
        let f = fixture(10, 12);
        let before = f.store.stock_item(f.stick_id).unwrap().version;

        let receipt = f.store.issue(&issue_cmd(f.line_id, 4)).unwrap();

        assert_eq!(receipt.quantity_received, Decimal::from(4));
        assert_eq!(receipt.pending, Decimal::from(8));
        assert_eq!(receipt.remaining_length, Some(Decimal::from(6)));
        assert_eq!(f.store.stock_item(f.stick_id).unwrap().version, before + 1);
        assert_eq!(f.store.issuance_records().len(), 1);
    }

    #[test]
    fn test_issue_without_stock_only_fulfils_backlog() {
        let f = fixture(10, 12);
        let line_id = f.store.add_request_line(RequestLine::new(
            f.project_id,
            f.spool_id,
            "GASKET-4".to_string(),
            Decimal::from(5),
        ));

        let receipt = f.store.issue(&issue_cmd(line_id, 5)).unwrap();

        assert_eq!(receipt.remaining_length, None);
        assert_eq!(receipt.pending, Decimal::ZERO);
        assert_eq!(f.store.stock_item(f.stick_id).unwrap().current_length, Decimal::from(10));
    }

    fn assert_nothing_written(f: &Fixture, line_id: Uuid) {
        assert_eq!(f.store.request_line(line_id).unwrap().quantity_received, Decimal::ZERO);
        assert_eq!(f.store.stock_item(f.stick_id).unwrap().current_length, Decimal::from(10));
        assert!(f.store.issuance_records().is_empty());
    }

    #[rstest]
    #[case::exceeds_pending(13)]
    #[case::stick_too_short(11)]
    fn test_issue_failures_leave_no_trace(#[case] quantity: i64) {
        let f = fixture(10, 12);

        let err = f.store.issue(&issue_cmd(f.line_id, quantity)).unwrap_err();
        if quantity > 12 {
            assert!(matches!(err, MtoError::QuantityExceedsPending { .. }));
        } else {
            assert!(matches!(err, MtoError::InsufficientStock { .. }));
        }

        assert_nothing_written(&f, f.line_id);
    }

    #[rstest]
    #[case::other_material("GASKET-4", false)]
    #[case::other_project("A106B", true)]
    fn test_issue_rejects_mismatched_stick(#[case] material: &str, #[case] foreign_project: bool) {
        let f = fixture(10, 12);
        let project_id = if foreign_project {
            f.store.add_project(Project::new("Other".to_string()))
        } else {
            f.project_id
        };
        let line_id = f.store.add_request_line(
            RequestLine::new(project_id, f.spool_id, material.to_string(), Decimal::from(5))
                .with_stock_item(f.stick_id),
        );

        let err = f.store.issue(&issue_cmd(line_id, 5)).unwrap_err();

        assert!(matches!(err, MtoError::InvalidInput(_)));
        assert_nothing_written(&f, line_id);
    }

    #[test]
    fn test_issue_refuses_installed_stick() {
        let f = fixture(10, 12);
        f.store.move_stock(f.stick_id, StockLocation::Installed).unwrap();

        let err = f.store.issue(&issue_cmd(f.line_id, 5)).unwrap_err();

        assert!(matches!(err, MtoError::InvalidInput(_)));
        assert_nothing_written(&f, f.line_id);
    }

    #[test]
    fn test_issue_unknown_line() {
        let f = fixture(10, 12);
        let err = f.store.issue(&issue_cmd(Uuid::new_v4(), 1)).unwrap_err();
        assert!(matches!(err, MtoError::NotFound { .. }));
    }

    #[test]
    fn test_stale_snapshot_is_rejected() {
        let f = fixture(10, 12);

        // 兩筆交易讀到相同快照
        let first = f.store.prepare_issue(&issue_cmd(f.line_id, 6)).unwrap();
        let second = f.store.prepare_issue(&issue_cmd(f.line_id, 6)).unwrap();

        assert!(f.store.commit_issue(first).is_ok());
        let err = f.store.commit_issue(second).unwrap_err();

        assert!(matches!(err, MtoError::ConcurrentModification { .. }));
        assert_eq!(f.store.stock_item(f.stick_id).unwrap().current_length, Decimal::from(4));
        assert_eq!(f.store.request_line(f.line_id).unwrap().quantity_received, Decimal::from(6));
    }

    #[test]
    fn test_cut_records_traceability_and_fulfils_lines() {
        let f = fixture(12, 5);
        // 同管段同物料的第二筆請購
        let second = f.store.add_request_line(RequestLine::new(
            f.project_id,
            f.spool_id,
            "A106B".to_string(),
            Decimal::from(4),
        ));

        let receipt = f
            .store
            .cut(&CutCommand {
                project_id: f.project_id,
                stock_item_id: f.stick_id,
                length: Decimal::from(7),
                spool_id: f.spool_id,
                actor_id: Uuid::nil(),
            })
            .unwrap();

        assert_eq!(receipt.stock_item.current_length, Decimal::from(5));
        assert_eq!(receipt.stock_item.last_cut_spool_id, Some(f.spool_id));
        assert_eq!(
            receipt.record.fulfilled,
            vec![(f.line_id, Decimal::from(5)), (second, Decimal::from(2))]
        );
        assert_eq!(f.store.request_line(second).unwrap().pending(), Decimal::from(2));
        assert_eq!(f.store.cut_records().len(), 1);
    }

    #[test]
    fn test_cut_beyond_backlog_does_not_over_receive() {
        let f = fixture(12, 3);

        let receipt = f
            .store
            .cut(&CutCommand {
                project_id: f.project_id,
                stock_item_id: f.stick_id,
                length: Decimal::from(8),
                spool_id: f.spool_id,
                actor_id: Uuid::nil(),
            })
            .unwrap();

        assert_eq!(receipt.record.fulfilled_total(), Decimal::from(3));
        let line = f.store.request_line(f.line_id).unwrap();
        assert_eq!(line.quantity_received, Decimal::from(3));
        assert_eq!(receipt.stock_item.current_length, Decimal::from(4));
    }

    #[test]
    fn test_cut_requires_workshop_and_project() {
        let f = fixture(12, 3);
        f.store.move_stock(f.stick_id, StockLocation::Warehouse).unwrap();

        let cmd = CutCommand {
            project_id: f.project_id,
            stock_item_id: f.stick_id,
            length: Decimal::from(2),
            spool_id: f.spool_id,
            actor_id: Uuid::nil(),
        };
        assert!(matches!(f.store.cut(&cmd), Err(MtoError::InvalidInput(_))));

        let other_project = CutCommand {
            project_id: Uuid::new_v4(),
            ..cmd.clone()
        };
        assert!(matches!(f.store.cut(&other_project), Err(MtoError::NotFound { .. })));

        let unknown_spool = CutCommand {
            spool_id: Uuid::new_v4(),
            ..cmd
        };
        f.store.move_stock(f.stick_id, StockLocation::Workshop).unwrap();
        assert!(matches!(f.store.cut(&unknown_spool), Err(MtoError::NotFound { .. })));
    }

    #[test]
    fn test_announce_revision_supersedes_pointer() {
        let store = InMemoryStore::new();
        let project_id = store.add_project(Project::new("P".to_string()));
        let iso_id = store.add_isometric(Isometric::new(project_id, "ISO-1".to_string()));

        let rev0 = store.announce_revision(Revision::new(iso_id, Some("0".to_string()))).unwrap();
        let rev1 = store.announce_revision(Revision::new(iso_id, Some("1".to_string()))).unwrap();

        let iso = store.isometrics(project_id).unwrap().remove(0);
        assert_eq!(iso.current_revision_id, Some(rev1));
        // 舊版次仍保留
        let revisions = store.revisions(&[iso_id]).unwrap();
        assert!(revisions.iter().any(|r| r.id == rev0));
        assert_eq!(revisions.len(), 2);
    }

    #[test]
    fn test_receive_stock_validates_lengths() {
        let store = InMemoryStore::new();
        let project_id = store.add_project(Project::new("P".to_string()));

        let zero = StockItem::new(project_id, "A106B".to_string(), Decimal::ZERO);
        assert!(store.receive_stock(zero).is_err());

        let orphan = StockItem::new(Uuid::new_v4(), "A106B".to_string(), Decimal::from(6));
        assert!(matches!(store.receive_stock(orphan), Err(MtoError::NotFound { .. })));
    }

    #[rstest]
    #[case(StockLocation::Workshop)]
    #[case(StockLocation::Installed)]
    fn test_receive_stock_only_into_warehouse(#[case] location: StockLocation) {
        let store = InMemoryStore::new();
        let project_id = store.add_project(Project::new("P".to_string()));

        let item = StockItem::new(project_id, "A106B".to_string(), Decimal::from(6)).with_location(location);
        assert!(matches!(store.receive_stock(item), Err(MtoError::InvalidInput(_))));

        let id = store
            .receive_stock(StockItem::new(project_id, "A106B".to_string(), Decimal::from(6)))
            .unwrap();
        assert_eq!(store.stock_item(id).unwrap().location, StockLocation::Warehouse);
    }

    proptest! {
        #[test]
        fn prop_stock_monotonic_and_conserved(quantities in proptest::collection::vec(1i64..8, 1..24)) {
            let f = fixture(30, 40);
            let mut last = Decimal::from(30);

            for q in quantities {
                let _ = f.store.issue(&issue_cmd(f.line_id, q));

                let stick = f.store.stock_item(f.stick_id).unwrap();
                let line = f.store.request_line(f.line_id).unwrap();
                prop_assert!(stick.current_length <= last);
                prop_assert!(stick.current_length >= Decimal::ZERO);
                prop_assert!(line.quantity_received <= line.effective_quantity());
                prop_assert_eq!(Decimal::from(30) - stick.current_length, line.quantity_received);
                last = stick.current_length;
            }
        }
    }
}
