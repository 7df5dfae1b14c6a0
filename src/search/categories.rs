use crate::search::types::CategoryQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub label: &'static str,
}

/// Tag meaning "use the free-text custom category"
pub const CUSTOM: &str = "custom";

/// Queried when nothing is selected
pub const CATCH_ALL: &str = "establishment";

pub const CATEGORIES: &[Category] = &[
    Category { id: "startup", label: "Startup" },
    Category { id: "bakery", label: "Bakery" },
    Category { id: "restaurant", label: "Restaurant" },
    Category { id: "real_estate", label: "Real Estate" },
    Category { id: "retail", label: "Retail Store" },
    Category { id: "salon", label: "Beauty Salon" },
    Category { id: "gym", label: "Gym/Fitness" },
    Category { id: "cafe", label: "Cafe" },
    Category { id: "dentist", label: "Dental Office" },
    Category { id: "law_firm", label: "Law Firm" },
    Category { id: "accounting", label: "Accounting" },
    Category { id: "marketing", label: "Marketing Agency" },
    Category { id: CUSTOM, label: "Custom" },
];

pub fn find(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id.trim())
}

/// Turn the dashboard selection into nearby-search queries, in selection
/// order. `custom` expands to the trimmed free text and is dropped when that
/// text is blank.
pub fn build_queries(selected: &[String], custom_text: Option<&str>) -> Vec<CategoryQuery> {
    let mut tags: Vec<&str> = Vec::new();
    for tag in selected.iter().map(|t| t.trim()) {
        if tag.is_empty() || tag == CUSTOM || tags.contains(&tag) {
            continue;
        }
        tags.push(tag);
    }

    let mut queries: Vec<CategoryQuery> = tags.into_iter().map(typed).collect();

    let wants_custom = selected.iter().any(|t| t.trim() == CUSTOM);
    let custom = custom_text.map(str::trim).filter(|t| !t.is_empty());
    if let (true, Some(text)) = (wants_custom, custom) {
        queries.push(CategoryQuery {
            tag: text.to_string(),
            place_type: None,
            keyword: text.to_string(),
        });
    }

    if queries.is_empty() {
        queries.push(typed(CATCH_ALL));
    }
    queries
}

fn typed(tag: &str) -> CategoryQuery {
    match tag {
        "startup" => CategoryQuery {
            tag: tag.to_string(),
            place_type: Some(CATCH_ALL.to_string()),
            keyword: "startup tech company".to_string(),
        },
        _ => CategoryQuery {
            tag: tag.to_string(),
            place_type: Some(tag.to_string()),
            keyword: tag.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_every_listed_category_is_typed() {
        for category in CATEGORIES.iter().filter(|c| c.id != CUSTOM) {
            let queries = build_queries(&tags(&[category.id]), None);
            assert_eq!(queries.len(), 1, "{}", category.id);
            assert_eq!(queries[0].tag, category.id);
            assert!(queries[0].place_type.is_some(), "{}", category.id);
        }
    }

    #[test]
    fn test_find_by_id() {
        assert_eq!(find(" gym ").map(|c| c.label), Some("Gym/Fitness"));
        assert!(find("zoo").is_none());
    }

    #[test]
    fn test_empty_selection_uses_catch_all() {
        let queries = build_queries(&[], None);
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].place_type.as_deref(), Some("establishment"));
    }

    #[test]
    fn test_startup_is_keyword_search() {
        let queries = build_queries(&tags(&["startup"]), None);
        assert_eq!(queries[0].place_type.as_deref(), Some("establishment"));
        assert_eq!(queries[0].keyword, "startup tech company");
    }

    #[test]
    fn test_selection_order_kept_and_duplicates_dropped() {
        let queries = build_queries(&tags(&["cafe", "bakery", "cafe"]), None);
        let order: Vec<_> = queries.iter().map(|q| q.tag.as_str()).collect();
        assert_eq!(order, vec!["cafe", "bakery"]);
    }

    #[test]
    fn test_custom_text_appended() {
        let queries = build_queries(&tags(&["cafe", "custom"]), Some("  vinyl shop "));
        let order: Vec<_> = queries.iter().map(|q| q.tag.as_str()).collect();
        assert_eq!(order, vec!["cafe", "vinyl shop"]);
        assert!(queries[1].place_type.is_none());
    }

    #[test]
    fn test_custom_only_replaces_catch_all() {
        let queries = build_queries(&tags(&["custom"]), Some("vinyl shop"));
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].keyword, "vinyl shop");
    }

    #[test]
    fn test_blank_custom_text_is_dropped() {
        let queries = build_queries(&tags(&["custom"]), Some("   "));
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].tag, "establishment");
    }

    #[test]
    fn test_custom_text_ignored_without_custom_tag() {
        let queries = build_queries(&tags(&["gym"]), Some("vinyl shop"));
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].tag, "gym");
    }
}
