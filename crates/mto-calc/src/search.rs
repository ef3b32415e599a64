//! 搜尋範圍
//!
//! 搜尋字串可比對圖號、管段號、物料代碼或管理標籤，結果取各來源的聯集。
//! 管段與材料明細只看各單線圖的目前版次。

use mto_core::key::normalize;
use mto_core::{Isometric, Result};
use mto_store::MaterialReader;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// 正規化後的搜尋字串（不分大小寫的子字串比對）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// 空白或未提供時回傳 None
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let term = normalize(raw?);
        (!term.is_empty()).then_some(Self(term))
    }

    pub fn matches(&self, value: &str) -> bool {
        normalize(value).contains(&self.0)
    }

    fn matches_opt(&self, value: Option<&str>) -> bool {
        value.map_or(false, |v| self.matches(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 解析搜尋範圍內的單線圖ID
pub fn resolve_scope<R: MaterialReader + ?Sized>(
    reader: &R,
    project_id: Uuid,
    isometrics: &[Isometric],
    term: &SearchTerm,
) -> Result<HashSet<Uuid>> {
    // 圖號
    let mut scope: HashSet<Uuid> = isometrics
        .iter()
        .filter(|iso| term.matches(&iso.number))
        .map(|iso| iso.id)
        .collect();
    let by_number = scope.len();

    // 只比對目前版次；舊版次的管段與明細不會出現在彙總結果中
    let revision_owner: HashMap<Uuid, Uuid> = isometrics
        .iter()
        .filter_map(|iso| iso.current_revision_id.map(|rev_id| (rev_id, iso.id)))
        .collect();

    // 管段實體：管段號、管理標籤
    for spool in reader.spools(project_id)? {
        if term.matches(&spool.spool_number) || term.matches_opt(spool.management_tag.as_deref()) {
            if let Some(iso_id) = revision_owner.get(&spool.revision_id) {
                scope.insert(*iso_id);
            }
        }
    }

    // 材料明細：管段號、物料代碼、冗餘的管理標籤
    let revision_ids: Vec<Uuid> = revision_owner.keys().copied().collect();
    for line in reader.bom_lines(&revision_ids)? {
        if term.matches(&line.spool_number)
            || term.matches(&line.material_identifier)
            || term.matches_opt(line.management_tag.as_deref())
        {
            if let Some(iso_id) = revision_owner.get(&line.revision_id) {
                scope.insert(*iso_id);
            }
        }
    }

    tracing::debug!(
        "搜尋 '{}': 圖號符合 {} 張，聯集後 {} 張",
        term.as_str(),
        by_number,
        scope.len()
    );

    Ok(scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_is_none() {
        assert!(SearchTerm::parse(None).is_none());
        assert!(SearchTerm::parse(Some("   ")).is_none());
        assert_eq!(SearchTerm::parse(Some(" sp-01 ")).unwrap().as_str(), "SP-01");
    }

    #[test]
    fn test_superseded_revision_lines_do_not_match() {
        use mto_core::{BomLine, Project, Revision, Spool};
        use mto_store::InMemoryStore;
        use rust_decimal::Decimal;

        let store = InMemoryStore::new();
        let project_id = store.add_project(Project::new("P".to_string()));
        let iso_id = store.add_isometric(Isometric::new(project_id, "ISO-7".to_string()));
        let rev_0 = store.announce_revision(Revision::new(iso_id, None)).unwrap();
        store.add_spool(Spool::new(project_id, rev_0, "SP-OLD".to_string()));
        store.add_bom_lines(vec![BomLine::new(
            rev_0,
            "SP-OLD".to_string(),
            "OLD-VALVE".to_string(),
            Decimal::ONE,
            "EA".to_string(),
        )]);
        let rev_1 = store.announce_revision(Revision::new(iso_id, None)).unwrap();
        store.add_bom_lines(vec![BomLine::new(
            rev_1,
            "SP-NEW".to_string(),
            "A106B".to_string(),
            Decimal::from(6),
            "M".to_string(),
        )]);

        let isometrics = store.isometrics(project_id).unwrap();
        let scope_of = |raw: &str| {
            let term = SearchTerm::parse(Some(raw)).unwrap();
            resolve_scope(&store, project_id, &isometrics, &term).unwrap()
        };

        assert!(scope_of("old-valve").is_empty());
        assert!(scope_of("SP-OLD").is_empty());
        assert!(scope_of("a106b").contains(&iso_id));
        assert!(scope_of("sp-new").contains(&iso_id));
    }

    #[test]
    fn test_matches_substring_case_insensitive() {
        let term = SearchTerm::parse(Some("iso-1")).unwrap();
        assert!(term.matches("ISO-100"));
        assert!(term.matches("  iso-12"));
        assert!(!term.matches("ISO-200"));
        assert!(!term.matches_opt(None));
    }
}
