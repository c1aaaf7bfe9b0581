//! Full-text search through the backend's `search_all` procedure.

use crate::api::{CatalogError, CatalogSource};
use crate::domain::{ResultKind, SearchHit};

use super::ranking::{
    ordered_sections, ResultItem, ResultSection, SearchOutcome, SectionKind, DEFAULT_ORDER,
};

impl From<ResultKind> for SectionKind {
    fn from(kind: ResultKind) -> Self {
        match kind {
            ResultKind::Product => SectionKind::Products,
            ResultKind::Region => SectionKind::States,
            ResultKind::Collection => SectionKind::Collections,
        }
    }
}

impl From<SearchHit> for ResultItem {
    fn from(hit: SearchHit) -> Self {
        Self {
            id: hit.id,
            name: hit.name,
            image: hit.image,
            link: hit.link,
            price: None,
        }
    }
}

/// Group backend hits into sections, keeping the backend's order within each.
pub fn group_hits(hits: Vec<SearchHit>) -> SearchOutcome {
    let mut sections: Vec<ResultSection> = DEFAULT_ORDER
        .iter()
        .map(|kind| ResultSection {
            kind: *kind,
            items: Vec::new(),
        })
        .collect();

    for hit in hits {
        let kind = SectionKind::from(hit.kind);
        if let Some(section) = sections.iter_mut().find(|s| s.kind == kind) {
            section.items.push(ResultItem::from(hit));
        }
    }
    ordered_sections(DEFAULT_ORDER, sections)
}

/// Run a remote search. An empty query prompts without calling the backend.
pub async fn search_remote(
    source: &dyn CatalogSource,
    query: &str,
) -> Result<SearchOutcome, CatalogError> {
    if query.trim().is_empty() {
        return Ok(SearchOutcome::Prompt);
    }
    let hits = source.search_all(query.trim()).await?;
    Ok(group_hits(hits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::testing::FakeCatalog;

    fn hit(id: &str, kind: ResultKind) -> SearchHit {
        SearchHit {
            id: id.to_string(),
            name: id.to_uppercase(),
            kind,
            image: String::new(),
            link: format!("/x/{}", id),
        }
    }

    #[test]
    fn test_group_hits_by_kind() {
        let outcome = group_hits(vec![
            hit("goa", ResultKind::Region),
            hit("lamp", ResultKind::Product),
            hit("vase", ResultKind::Product),
        ]);
        let SearchOutcome::Sections(sections) = outcome else {
            panic!("expected sections");
        };
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].kind, SectionKind::Products);
        assert_eq!(sections[0].items[1].id, "vase");
        assert_eq!(sections[1].kind, SectionKind::States);
    }

    #[test]
    fn test_no_hits() {
        assert_eq!(group_hits(Vec::new()), SearchOutcome::NoResults);
    }

    #[tokio::test]
    async fn test_empty_query_skips_backend() {
        let catalog = FakeCatalog::new();
        assert_eq!(search_remote(&catalog, "  ").await.unwrap(), SearchOutcome::Prompt);
        assert!(catalog.search_calls().is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_is_an_error() {
        let catalog = FakeCatalog::new();
        catalog.fail_search(true);
        assert!(search_remote(&catalog, "lamp").await.is_err());

        catalog.fail_search(false);
        catalog.set_hits(vec![hit("lamp", ResultKind::Product)]);
        assert!(matches!(
            search_remote(&catalog, " lamp ").await.unwrap(),
            SearchOutcome::Sections(_)
        ));
        assert_eq!(catalog.search_calls(), vec!["lamp".to_string(), "lamp".to_string()]);
    }
}
