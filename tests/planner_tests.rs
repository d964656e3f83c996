//! Probe-or-split planning and full term sweeps.

mod common;

use common::{executor, mount_page, mount_probe, search_page, test_config};
use component_usage_search_lib::{
    fan_out, GitHubSearcher, PageCollector, QueryFlavor, QueryPlan, QueryPlanner, SearchTerm,
    DEFAULT_EXTENSIONS, RESULT_CEILING,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLASS_QUERY: &str = "class=\"moj-datepicker";
const IMPORT_QUERY: &str = "import mojDatePicker";

#[tokio::test]
async fn test_below_ceiling_plans_direct_search() {
    let server = MockServer::start().await;
    mount_probe(&server, CLASS_QUERY, 42).await;

    let config = test_config(&server, 2);
    let executor = executor(&config);
    let collector = PageCollector::new(&executor, config.search_url(), config.page_size);
    let planner = QueryPlanner::new(collector, &config.extensions, RESULT_CEILING);

    assert_eq!(
        planner.plan(CLASS_QUERY).await.unwrap(),
        QueryPlan::Direct(CLASS_QUERY.to_string())
    );
}

#[tokio::test]
async fn test_single_collection_below_ceiling() {
    let server = MockServer::start().await;
    mount_probe(&server, CLASS_QUERY, 999).await;
    mount_page(&server, CLASS_QUERY, 100, 1, search_page(999, 42, "direct"), 1).await;

    let config = test_config(&server, 2);
    let executor = executor(&config);
    let collector = PageCollector::new(&executor, config.search_url(), config.page_size);
    let planner = QueryPlanner::new(collector, &config.extensions, RESULT_CEILING);

    let results = planner
        .plan_and_collect(&SearchTerm::literal(CLASS_QUERY))
        .await;

    assert_eq!(results.len(), 42);
    assert_eq!(results.total_count, 999);
    // probe + one page
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_at_ceiling_fans_out_per_extension() {
    let server = MockServer::start().await;
    mount_probe(&server, CLASS_QUERY, 1000).await;

    let config = test_config(&server, 2);
    let sub_queries = fan_out(CLASS_QUERY, &config.extensions);
    for (i, query) in sub_queries.iter().enumerate() {
        mount_page(&server, query, 100, 1, search_page(i as u64 * 10, i, "ext"), 1).await;
    }
    mount_page(&server, CLASS_QUERY, 100, 1, search_page(1000, 100, "base"), 0).await;

    let executor = executor(&config);
    let collector = PageCollector::new(&executor, config.search_url(), config.page_size);
    let planner = QueryPlanner::new(collector, &config.extensions, RESULT_CEILING);

    let results = planner
        .plan_and_collect(&SearchTerm::literal(CLASS_QUERY))
        .await;

    let expected_items: usize = (0..DEFAULT_EXTENSIONS.len()).sum();
    let expected_total: u64 = (0..DEFAULT_EXTENSIONS.len() as u64).map(|i| i * 10).sum();
    assert_eq!(results.len(), expected_items);
    assert_eq!(results.total_count, expected_total);
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        1 + DEFAULT_EXTENSIONS.len()
    );
}

#[tokio::test]
async fn test_failed_probe_skips_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/code"))
        .and(query_param("per_page", "1"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, CLASS_QUERY, 100, 1, search_page(5, 5, "never"), 0).await;

    let config = test_config(&server, 2);
    let executor = executor(&config);
    let collector = PageCollector::new(&executor, config.search_url(), config.page_size);
    let planner = QueryPlanner::new(collector, &config.extensions, RESULT_CEILING);

    let results = planner
        .plan_and_collect(&SearchTerm::literal(CLASS_QUERY))
        .await;

    assert!(results.is_empty());
    assert_eq!(results.total_count, 0);
}

#[tokio::test]
async fn test_extension_pinned_query_is_not_split() {
    let server = MockServer::start().await;
    let pinned = "import mojDatePicker extension:njk";
    mount_probe(&server, pinned, 4000).await;

    let config = test_config(&server, 2);
    let executor = executor(&config);
    let collector = PageCollector::new(&executor, config.search_url(), config.page_size);
    let planner = QueryPlanner::new(collector, &config.extensions, RESULT_CEILING);

    assert_eq!(
        planner.plan(pinned).await.unwrap(),
        QueryPlan::Direct(pinned.to_string())
    );
}

#[tokio::test]
async fn test_component_flavors_are_planned_independently() {
    let server = MockServer::start().await;
    mount_probe(&server, CLASS_QUERY, 42).await;
    mount_page(&server, CLASS_QUERY, 100, 1, search_page(42, 42, "class"), 1).await;

    mount_probe(&server, IMPORT_QUERY, 1500).await;
    let config = test_config(&server, 2);
    let sub_queries = fan_out(IMPORT_QUERY, &config.extensions);
    assert_eq!(sub_queries.len(), 8);

    let mut sub_totals = 0;
    let mut sub_items = 0;
    for (i, query) in sub_queries.iter().enumerate() {
        let total = 100 + i as u64;
        let count = i + 1;
        sub_totals += total;
        sub_items += count;
        mount_page(&server, query, 100, 1, search_page(total, count, "import"), 1).await;
    }

    let term = SearchTerm::component(
        "moj-datepicker",
        vec![
            QueryFlavor::new("class_query", CLASS_QUERY),
            QueryFlavor::new("nunjucks_query", IMPORT_QUERY),
        ],
    );

    let searcher = GitHubSearcher::new(config, false).expect("Failed to create searcher");
    let report = searcher.run(&[term]).await;

    let results = report.get("moj-datepicker").expect("term should be reported");
    assert_eq!(results.total_count, 42 + sub_totals);
    assert_eq!(results.len(), 42 + sub_items);
    assert_eq!(results.items[0].path, "views/class-0.njk");
    assert_eq!(results.items[42].path, "views/import-0.njk");
    // two probes, one direct collection, eight fan-out collections
    assert_eq!(server.received_requests().await.unwrap().len(), 11);
}

#[tokio::test]
async fn test_terms_are_reported_separately() {
    let server = MockServer::start().await;
    mount_probe(&server, "class=\"moj-badge", 2).await;
    mount_page(&server, "class=\"moj-badge", 100, 1, search_page(2, 2, "badge"), 1).await;
    mount_probe(&server, "class=\"moj-banner", 1).await;
    mount_page(&server, "class=\"moj-banner", 100, 1, search_page(1, 1, "banner"), 1).await;

    let config = test_config(&server, 2);
    let searcher = GitHubSearcher::new(config, false).expect("Failed to create searcher");
    let report = searcher
        .run(&[
            SearchTerm::literal("class=\"moj-badge"),
            SearchTerm::literal("class=\"moj-banner"),
        ])
        .await;

    assert_eq!(report.len(), 2);
    assert_eq!(report.get("class=\"moj-badge").unwrap().len(), 2);
    assert_eq!(report.get("class=\"moj-banner").unwrap().len(), 1);
    assert_eq!(report.total_items(), 3);
}
