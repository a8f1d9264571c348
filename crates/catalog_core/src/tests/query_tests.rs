use super::*;

fn base() -> Url {
    Url::parse("https://dummyjson.com").expect("base url")
}

fn url_for(state: &QueryState) -> String {
    CatalogQuery::from_state(state)
        .to_url(&base())
        .expect("url")
        .to_string()
}

#[test]
fn filter_and_sort_intents_reset_page() {
    let mut state = QueryState {
        page: 4,
        ..QueryState::default()
    };
    state.set_search("phone");
    assert_eq!(state.page, 1);

    state.page = 3;
    state.set_category("laptops");
    assert_eq!(state.page, 1);

    state.page = 2;
    state.set_sort(SortKey::RatingDesc);
    assert_eq!(state.page, 1);
}

#[test]
fn search_and_category_are_mutually_exclusive() {
    let mut state = QueryState::default();
    state.set_category("beauty");
    state.set_search("lipstick");
    assert_eq!(state.category, ALL_CATEGORIES);
    assert_eq!(state.search_term, "lipstick");

    state.set_category("fragrances");
    assert!(state.search_term.is_empty());
    assert_eq!(state.active_category(), Some("fragrances"));
}

#[test]
fn set_page_keeps_filters() {
    let mut state = QueryState::default();
    state.set_category("groceries");
    state.set_sort(SortKey::PriceDesc);
    state.set_page(3, 5).expect("page in range");

    assert_eq!(state.page, 3);
    assert_eq!(state.category, "groceries");
    assert_eq!(state.sort, SortKey::PriceDesc);
    assert!(state.search_term.is_empty());
}

#[test]
fn set_page_rejects_out_of_range_pages() {
    let mut state = QueryState::default();
    let err = state.set_page(6, 5).expect_err("past the end");
    assert!(matches!(
        err,
        CatalogError::PageOutOfRange {
            requested: 6,
            total_pages: 5
        }
    ));
    assert!(state.set_page(0, 5).is_err());
    assert_eq!(state.page, 1);
}

#[test]
fn next_and_prev_clamp_to_bounds() {
    let mut state = QueryState::default();
    assert!(!state.prev_page());
    assert!(state.next_page(2));
    assert_eq!(state.page, 2);
    assert!(!state.next_page(2));
    assert!(state.prev_page());
    assert_eq!(state.page, 1);
    assert!(!state.next_page(0));
}

#[test]
fn clear_filters_restores_defaults_exactly() {
    let mut state = QueryState::default();
    state.set_search("watch");
    state.set_sort(SortKey::TitleAsc);
    state.page = 7;
    state.clear_filters();
    assert_eq!(state, QueryState::default());
}

#[test]
fn blank_search_and_category_fall_back_to_inactive() {
    let mut state = QueryState::default();
    state.set_search("   ");
    assert!(!state.is_searching());
    state.set_category("");
    assert_eq!(state.active_category(), None);
}

#[test]
fn search_wins_over_injected_category() {
    let state = QueryState {
        search_term: "phone".into(),
        category: "smartphones".into(),
        sort: SortKey::Default,
        page: 1,
    };
    let query = CatalogQuery::from_state(&state);
    assert_eq!(query.scope, QueryScope::Search("phone".into()));
    assert_eq!(
        url_for(&state),
        "https://dummyjson.com/products/search?q=phone&limit=12&skip=0"
    );
}

#[test]
fn unscoped_query_lists_all_products() {
    assert_eq!(
        url_for(&QueryState::default()),
        "https://dummyjson.com/products?limit=12&skip=0"
    );
}

#[test]
fn category_query_encodes_slug_as_path_segment() {
    let state = QueryState {
        category: "home decoration".into(),
        page: 3,
        ..QueryState::default()
    };
    assert_eq!(
        url_for(&state),
        "https://dummyjson.com/products/category/home%20decoration?limit=12&skip=24"
    );
}

#[test]
fn sort_appends_field_and_order() {
    let state = QueryState {
        search_term: "red lipstick".into(),
        sort: SortKey::PriceDesc,
        ..QueryState::default()
    };
    assert_eq!(
        url_for(&state),
        "https://dummyjson.com/products/search?q=red+lipstick&limit=12&skip=0&sortBy=price&order=desc"
    );
}

#[test]
fn base_path_prefix_is_preserved() {
    let base = Url::parse("http://127.0.0.1:8080/api/").expect("base");
    let url = CatalogQuery::from_state(&QueryState::default())
        .to_url(&base)
        .expect("url");
    assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/products?limit=12&skip=0");
    assert_eq!(
        categories_url(&base).expect("categories").as_str(),
        "http://127.0.0.1:8080/api/products/categories"
    );
}

#[test]
fn rejects_base_without_path() {
    let base = Url::parse("mailto:catalog@example.com").expect("base");
    assert!(matches!(
        categories_url(&base),
        Err(CatalogError::InvalidBaseUrl { .. })
    ));
}
