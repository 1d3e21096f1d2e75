//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run both crawl
//! topologies end-to-end through the production fetcher and stores.

use seller_sweep::config::{
    CardSelectors, Config, DetailConfig, DetailSelectors, FetcherConfig, ListingConfig,
    NotifyConfig, ScheduleConfig, StoreBackend, StoreConfig,
};
use seller_sweep::crawler::{Coordinator, CrawlMode, CrawlResult, PriceRule};
use seller_sweep::storage::{DelimitedFileStore, ListingStore};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, store_path: &Path, backend: StoreBackend) -> Config {
    Config {
        fetcher: FetcherConfig {
            timeout_secs: 5,
            connect_timeout_secs: 5,
            ..FetcherConfig::default()
        },
        detail: DetailConfig {
            merchant_url: format!("{}/merchant", base_url),
            price_rule: PriceRule::DecimalText,
            max_concurrent: None,
            selectors: DetailSelectors::default(),
        },
        listing: ListingConfig {
            seed_url: format!("{}/listas/{{category}}", base_url),
            default_limit: 50,
            selectors: CardSelectors::default(),
        },
        store: StoreConfig {
            backend,
            path: store_path.display().to_string(),
        },
        notify: NotifyConfig::default(),
        schedule: ScheduleConfig::default(),
    }
}

fn merchant_listing(links: &[&str]) -> String {
    let cards: String = links
        .iter()
        .map(|link| {
            format!(
                r#"<div class="c-product-card"><div class="c-product-card__title"><a href="{}">item</a></div></div>"#,
                link
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", cards)
}

fn detail_page(name: &str, price: &str, seller_link: Option<&str>) -> String {
    let seller = seller_link
        .map(|href| format!(r#"<div class="c-product__seller-info"><a href="{}">seller</a></div>"#, href))
        .unwrap_or_default();
    format!(
        r#"<html><body>
            <h1 class="c-product__name">{}</h1>
            <span class="c-price h-price--xx-large h-price--new">{}</span>
            {}
        </body></html>"#,
        name, price, seller
    )
}

/// A listing page; each card is (seller, title, price)
fn listing_page(cards: &[(&str, &str, &str)], next: Option<&str>) -> String {
    let items: String = cards
        .iter()
        .enumerate()
        .map(|(i, (seller, title, price))| {
            format!(
                r#"<li class="ui-search-layout__item">
                    <a class="poly-component__title" href="/item/{}">{}</a>
                    <span class="poly-component__seller">{}</span>
                    <div class="poly-price__current">{}</div>
                </li>"#,
                i, title, seller, price
            )
        })
        .collect();
    let paginator = next
        .map(|href| {
            format!(
                r#"<ul><li class="andes-pagination__button--next"><a href="{}" title="Seguinte">Seguinte</a></li></ul>"#,
                href
            )
        })
        .unwrap_or_default();
    format!(
        "<html><body><ol>{}</ol>{}</body></html>",
        items, paginator
    )
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

fn listings(result: CrawlResult) -> Vec<seller_sweep::ListingRecord> {
    match result {
        CrawlResult::Listings(listings) => listings,
        other => panic!("expected listings, got {:?}", other),
    }
}

fn products(result: CrawlResult) -> Vec<seller_sweep::ProductRecord> {
    match result {
        CrawlResult::Products(products) => products,
        other => panic!("expected products, got {:?}", other),
    }
}

#[tokio::test]
async fn test_detail_crawl_skips_failed_item() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/merchant", 200, merchant_listing(&["/p/1", "/p/2", "/p/3"])).await;
    mount_page(&mock_server, "/p/1", 200, detail_page("Lamp", "12,50 lei", None)).await;
    mount_page(&mock_server, "/p/2", 500, "Internal Server Error".to_string()).await;
    mount_page(&mock_server, "/p/3", 200, detail_page("Chair", "99.9 lei", None)).await;

    let config = create_test_config(
        &mock_server.uri(),
        &dir.path().join("sellers.csv"),
        StoreBackend::Delimited,
    );
    let mut coordinator = Coordinator::from_config(&config).expect("Failed to create coordinator");

    let mut found = products(coordinator.run(&CrawlMode::Detail).await.unwrap());
    found.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].name, "Chair");
    assert_eq!(found[0].price.as_str(), "99.90 lei");
    assert_eq!(found[1].name, "Lamp");
    assert_eq!(found[1].price.as_str(), "12.50 lei");
    assert_eq!(found[1].source_link, format!("{}/p/1", mock_server.uri()));
}

#[tokio::test]
async fn test_detail_crawl_excludes_merchant_sold_items() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let merchant_link = format!("{}/merchant/", mock_server.uri());

    mount_page(&mock_server, "/merchant", 200, merchant_listing(&["/p/1", "/p/2"])).await;
    mount_page(
        &mock_server,
        "/p/1",
        200,
        detail_page("Own brand", "5 lei", Some(&merchant_link)),
    )
    .await;
    mount_page(
        &mock_server,
        "/p/2",
        200,
        detail_page("Marketplace", "7 lei", Some("/sellers/acme")),
    )
    .await;

    let config = create_test_config(
        &mock_server.uri(),
        &dir.path().join("sellers.csv"),
        StoreBackend::Delimited,
    );
    let mut coordinator = Coordinator::from_config(&config).unwrap();

    let found = products(coordinator.run(&CrawlMode::Detail).await.unwrap());

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Marketplace");
}

#[tokio::test]
async fn test_detail_listing_failure_returns_empty() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/merchant", 503, "busy".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        &mock_server.uri(),
        &dir.path().join("sellers.csv"),
        StoreBackend::Delimited,
    );
    let mut coordinator = Coordinator::from_config(&config).unwrap();

    let result = coordinator.run_or_empty(&CrawlMode::Detail).await;
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_detail_report_lands_in_outbox() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let outbox = dir.path().join("outbox");

    mount_page(&mock_server, "/merchant", 200, merchant_listing(&["/p/1"])).await;
    mount_page(&mock_server, "/p/1", 200, detail_page("Lamp &amp; Shade", "12 lei", None)).await;

    let mut config = create_test_config(
        &mock_server.uri(),
        &dir.path().join("sellers.csv"),
        StoreBackend::Delimited,
    );
    config.notify = NotifyConfig {
        recipient: Some("ops@example.com".to_string()),
        outbox_dir: outbox.display().to_string(),
        ..NotifyConfig::default()
    };
    let mut coordinator = Coordinator::from_config(&config).unwrap();

    coordinator.run(&CrawlMode::Detail).await.unwrap();

    let messages: Vec<_> = std::fs::read_dir(&outbox)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].extension().and_then(|ext| ext.to_str()),
        Some("eml")
    );
    let message = std::fs::read_to_string(&messages[0]).unwrap();
    assert!(message.contains("Message-ID: <"));
    assert!(message.contains("To: ops@example.com"));
    assert!(message.contains("Subject: Scraping Results"));
    assert!(message.contains("Total items: 1"));
    assert!(message.contains("Lamp &amp; Shade"));
}

#[tokio::test]
async fn test_listing_walk_stops_at_limit() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/listas/fones",
        200,
        listing_page(
            &[("A", "Fone A", "$1"), ("B", "Fone B", "$2"), ("B", "Fone B2", "$3")],
            Some("/listas/fones/_Desde_49"),
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/listas/fones/_Desde_49"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(
        &mock_server.uri(),
        &dir.path().join("sellers.csv"),
        StoreBackend::Delimited,
    );
    let mut coordinator = Coordinator::from_config(&config).unwrap();

    let mode = CrawlMode::Listing {
        category: "fones".to_string(),
        limit: Some(2),
    };
    let found = listings(coordinator.run(&mode).await.unwrap());

    let sellers: Vec<&str> = found.iter().map(|r| r.seller.as_str()).collect();
    assert_eq!(sellers, vec!["A", "B"]);
}

#[tokio::test]
async fn test_listing_walk_follows_pagination_until_exhausted() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/listas/fones",
        200,
        listing_page(&[("A", "Fone A", "$1")], Some("/listas/fones/_Desde_49")),
    )
    .await;
    mount_page(
        &mock_server,
        "/listas/fones/_Desde_49",
        200,
        listing_page(&[("B", "Fone B", "$2")], None),
    )
    .await;

    let config = create_test_config(
        &mock_server.uri(),
        &dir.path().join("sellers.csv"),
        StoreBackend::Delimited,
    );
    let mut coordinator = Coordinator::from_config(&config).unwrap();

    let mode = CrawlMode::Listing {
        category: "fones".to_string(),
        limit: Some(10),
    };
    let found = listings(coordinator.run(&mode).await.unwrap());

    assert_eq!(found.len(), 2);
    assert_eq!(found[1].seller, "B");
}

#[tokio::test]
async fn test_end_to_end_listing_to_store() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("sellers.csv");

    mount_page(
        &mock_server,
        "/listas/fones",
        200,
        listing_page(
            &[("", "Orphan", "$0"), ("S1", "T1", "$10"), ("S1", "T1 again", "$12")],
            None,
        ),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &store_path, StoreBackend::Delimited);
    let mut coordinator = Coordinator::from_config(&config).unwrap();

    let mode = CrawlMode::Listing {
        category: "fones".to_string(),
        limit: Some(1),
    };
    let found = listings(coordinator.run(&mode).await.unwrap());

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].seller, "S1");
    assert_eq!(found[0].title, "T1");
    assert_eq!(found[0].price, "$10");

    let content = std::fs::read_to_string(&store_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Title;Price;Seller;Link");
    assert!(lines[1].starts_with("T1;$10;S1;"));
}

#[tokio::test]
async fn test_store_only_grows_by_new_sellers_across_runs() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("sellers.csv");

    mount_page(
        &mock_server,
        "/listas/fones",
        200,
        listing_page(&[("A", "Fone A", "$1"), ("B", "Fone B", "$2")], None),
    )
    .await;
    mount_page(
        &mock_server,
        "/listas/capas",
        200,
        listing_page(&[("B", "Capa B", "$3"), ("C", "Capa C", "$4")], None),
    )
    .await;

    let config = create_test_config(&mock_server.uri(), &store_path, StoreBackend::Delimited);

    for category in ["fones", "fones", "capas"] {
        let mut coordinator = Coordinator::from_config(&config).unwrap();
        let mode = CrawlMode::Listing {
            category: category.to_string(),
            limit: None,
        };
        coordinator.run(&mode).await.unwrap();
    }

    let stored = DelimitedFileStore::new(&store_path).load().unwrap();
    let sellers: Vec<&str> = stored.iter().map(|r| r.seller.as_str()).collect();
    assert_eq!(sellers, vec!["A", "B", "C"]);
    assert_eq!(stored[1].title, "Fone B");
}

#[tokio::test]
async fn test_sqlite_backend_persists_across_runs() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/listas/fones",
        200,
        listing_page(&[("A", "Fone A", "$1")], None),
    )
    .await;

    let config = create_test_config(
        &mock_server.uri(),
        &dir.path().join("sellers.db"),
        StoreBackend::Sqlite,
    );
    let mode = CrawlMode::Listing {
        category: "fones".to_string(),
        limit: None,
    };

    for _ in 0..2 {
        let mut coordinator = Coordinator::from_config(&config).unwrap();
        coordinator.run(&mode).await.unwrap();
    }

    let coordinator = Coordinator::from_config(&config).unwrap();
    assert_eq!(coordinator.store().load().unwrap().len(), 1);
}
