//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_mapper::config::Config;
use site_mapper::crawler::{crawl, Coordinator};
use site_mapper::output::{export_site_map, load_site_map, OutputFormat, SiteMapNode};
use site_mapper::state::DroppedLink;
use site_mapper::MapperError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config(max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = max_depth;
    config.crawler.workers = 4;
    config.crawler.request_timeout_secs = 5;
    config.crawler.connect_timeout_secs = 2;
    config
}

/// An HTML page whose body holds one anchor per href
fn html_page(hrefs: &[&str]) -> ResponseTemplate {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", anchors))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: &str, hrefs: &[&str]) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html_page(hrefs))
        .mount(server)
        .await;
}

/// A localhost port with nothing listening on it
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

fn count_nodes_with_url(node: &SiteMapNode, url: &str) -> usize {
    let own = usize::from(node.url == url);
    own + node
        .children
        .iter()
        .map(|child| count_nodes_with_url(child, url))
        .sum::<usize>()
}

#[tokio::test]
async fn test_duplicate_links_produce_one_child_each() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/a", "/b", "/a"]).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/b", &[]).await;

    let coordinator = Coordinator::new(&base, create_test_config(1)).unwrap();
    let outcome = coordinator.run().await.unwrap();
    let tree = outcome.site_tree().unwrap();

    assert_eq!(tree.url, format!("{}/", base));
    assert_eq!(tree.status_code, 200);
    assert_eq!(tree.children.len(), 2);

    let children: HashSet<&str> = tree.children.iter().map(|c| c.url.as_str()).collect();
    let expected_a = format!("{}/a", base);
    let expected_b = format!("{}/b", base);
    assert!(children.contains(expected_a.as_str()));
    assert!(children.contains(expected_b.as_str()));

    // The seed record keeps the duplicate link as found on the page
    let seed = outcome.store.at_depth(0);
    assert_eq!(seed.len(), 1);
    assert_eq!(seed[0].links.len(), 3);
    assert!(!outcome.cancelled);
}

#[tokio::test]
async fn test_seed_network_error_is_fatal() {
    let seed = format!("http://127.0.0.1:{}/", closed_port());
    let coordinator = Coordinator::new(&seed, create_test_config(2)).unwrap();

    match coordinator.run().await {
        Err(MapperError::SeedFetch { url, reason }) => {
            assert_eq!(url, seed);
            assert!(!reason.is_empty());
        }
        other => panic!("expected SeedFetch, got {:?}", other.map(|o| o.store.len())),
    }
}

#[tokio::test]
async fn test_invalid_seed_is_rejected_before_crawling() {
    for seed in ["not a url", "ftp://example.com/", "mailto:someone@example.com"] {
        let result = Coordinator::new(seed, create_test_config(1));
        assert!(
            matches!(result, Err(MapperError::InvalidSeed { .. })),
            "seed {:?} should be rejected",
            seed
        );
    }
}

#[tokio::test]
async fn test_not_found_page_is_a_leaf() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/missing"]).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"<a href="/never">never</a>"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/never"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = Coordinator::new(&base, create_test_config(3))
        .unwrap()
        .run()
        .await
        .unwrap();
    let tree = outcome.site_tree().unwrap();

    assert_eq!(tree.children.len(), 1);
    let missing = &tree.children[0];
    assert_eq!(missing.url, format!("{}/missing", base));
    assert_eq!(missing.status_code, 404);
    assert!(missing.children.is_empty());
    assert!(outcome.dropped.is_empty());
}

#[tokio::test]
async fn test_max_depth_zero_fetches_only_the_seed() {
    let server = MockServer::start().await;

    mount_page(&server, "/", &["/a", "/b"]).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page(&[]))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = Coordinator::new(&server.uri(), create_test_config(0))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.store.len(), 1);
    assert_eq!(outcome.visited.len(), 1);
    // Links on a page at the depth limit are kept but not followed
    assert_eq!(outcome.store.at_depth(0)[0].links.len(), 2);
    assert!(outcome.site_tree().unwrap().children.is_empty());
}

#[tokio::test]
async fn test_depth_and_visited_invariants() {
    let server = MockServer::start().await;

    mount_page(&server, "/", &["/a", "/b", "/c"]).await;
    mount_page(&server, "/a", &["/a/1", "/a/2", "/"]).await;
    mount_page(&server, "/b", &["/b/1", "/a"]).await;
    mount_page(&server, "/c", &["/c/1"]).await;
    mount_page(&server, "/a/1", &["/deep"]).await;
    mount_page(&server, "/a/2", &[]).await;
    mount_page(&server, "/b/1", &[]).await;
    mount_page(&server, "/c/1", &[]).await;

    let max_depth = 2;
    let outcome = Coordinator::new(&server.uri(), create_test_config(max_depth))
        .unwrap()
        .run()
        .await
        .unwrap();

    let mut seen = HashSet::new();
    for record in outcome.store.iter() {
        assert!(record.depth <= max_depth);
        assert!(seen.insert(record.url.clone()), "{} recorded twice", record.url);

        match &record.parent_url {
            None => assert_eq!(record.depth, 0),
            Some(parent_url) => {
                let parent = outcome.store.get(parent_url).expect("parent recorded");
                assert_eq!(record.depth, parent.depth + 1);
            }
        }
    }

    assert_eq!(outcome.store.at_depth(0).len(), 1);
    assert_eq!(outcome.store.len(), 8);
    assert_eq!(outcome.visited.len(), outcome.store.len() + outcome.dropped.len());
    assert!(outcome.store.get(&format!("{}/deep", server.uri())).is_none());
    assert_eq!(outcome.site_tree().unwrap().node_count(), 8);
}

#[tokio::test]
async fn test_shared_child_is_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", &["/a", "/b"]).await;
    mount_page(&server, "/a", &["/shared"]).await;
    mount_page(&server, "/b", &["/shared"]).await;
    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html_page(&[]))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = Coordinator::new(&base, create_test_config(2))
        .unwrap()
        .run()
        .await
        .unwrap();
    let tree = outcome.site_tree().unwrap();

    let shared = format!("{}/shared", base);
    assert_eq!(count_nodes_with_url(&tree, &shared), 1);
    assert_eq!(outcome.store.at_depth(2).len(), 1);
}

#[tokio::test]
async fn test_failed_same_host_link_is_dropped() {
    let server = MockServer::start().await;
    let base = server.uri();
    let unreachable = format!("http://127.0.0.1:{}/gone", closed_port());

    mount_page(&server, "/", &["/a", unreachable.as_str()]).await;
    mount_page(&server, "/a", &[]).await;

    let observed: Arc<Mutex<Vec<DroppedLink>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    let coordinator = Coordinator::new(&base, create_test_config(1))
        .unwrap()
        .with_dropped_link_callback(Arc::new(move |link: &DroppedLink| {
            sink.lock().unwrap().push(link.clone());
        }));

    let outcome = coordinator.run().await.unwrap();
    let tree = outcome.site_tree().unwrap();

    assert!(tree.find(&unreachable).is_none());
    assert_eq!(tree.children.len(), 1);

    assert_eq!(outcome.dropped.len(), 1);
    let dropped = &outcome.dropped[0];
    assert_eq!(dropped.url, unreachable);
    assert_eq!(dropped.parent_url.as_deref(), Some(tree.url.as_str()));
    assert_eq!(dropped.depth, 1);
    assert!(outcome.visited.contains(&unreachable));

    let observed = observed.lock().unwrap();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].url, unreachable);
}

#[tokio::test]
async fn test_off_host_links_are_ignored() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        &["http://other.invalid/x", "mailto:a@b.c", "#top", "/a"],
    )
    .await;
    mount_page(&server, "/a", &[]).await;

    let outcome = Coordinator::new(&server.uri(), create_test_config(1))
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(outcome.store.len(), 2);
    assert!(outcome.dropped.is_empty());
    assert_eq!(outcome.store.at_depth(0)[0].links, vec![format!("{}/a", server.uri())]);
}

#[tokio::test]
async fn test_pre_cancelled_crawl_returns_partial_outcome() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a"]).await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = Coordinator::new(&server.uri(), create_test_config(2))
        .unwrap()
        .run_with_cancellation(cancel)
        .await
        .unwrap();

    assert!(outcome.cancelled);
    assert!(outcome.store.is_empty());
    assert!(outcome.dropped.is_empty());
}

#[tokio::test]
async fn test_cancel_during_slow_fetch() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/slow"]).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html_page(&[]).set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let outcome = Coordinator::new(&server.uri(), create_test_config(2))
        .unwrap()
        .run_with_cancellation(cancel)
        .await
        .unwrap();

    assert!(outcome.cancelled);
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(outcome.store.len(), 1);
    // An abandoned fetch is not a failure
    assert!(outcome.dropped.is_empty());
}

#[tokio::test]
async fn test_cancel_during_seed_fetch_is_not_a_seed_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(&["/a"]).set_delay(Duration::from_secs(4)))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let outcome = Coordinator::new(&server.uri(), create_test_config(2))
        .unwrap()
        .run_with_cancellation(cancel)
        .await
        .expect("a cancelled crawl still returns its outcome");

    assert!(outcome.cancelled);
    assert!(outcome.store.is_empty());
    assert!(outcome.dropped.is_empty());
}

#[tokio::test]
async fn test_panicking_worker_fails_the_crawl() {
    let server = MockServer::start().await;
    let unreachable = format!("http://127.0.0.1:{}/gone", closed_port());
    mount_page(&server, "/", &[unreachable.as_str()]).await;

    let coordinator = Coordinator::new(&server.uri(), create_test_config(1))
        .unwrap()
        .with_dropped_link_callback(Arc::new(|_: &DroppedLink| panic!("callback failure")));

    let result = tokio::time::timeout(Duration::from_secs(10), coordinator.run())
        .await
        .expect("crawl returns after a worker panic");

    match result {
        Err(MapperError::TaskJoin(e)) => assert!(e.is_panic()),
        other => panic!("expected TaskJoin, got {:?}", other.map(|o| o.store.len())),
    }
}

#[tokio::test]
async fn test_exported_maps_decode_to_the_same_tree() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["/a", "/b?x=1&amp;y=2"]).await;
    mount_page(&server, "/a", &["/a/1"]).await;
    mount_page(&server, "/a/1", &[]).await;

    let outcome = crawl(&server.uri(), create_test_config(2)).await.unwrap();
    let mut tree = outcome.site_tree().unwrap();
    tree.sort_children();

    let dir = tempfile::TempDir::new().unwrap();
    let json_path = dir.path().join("map.json");
    let xml_path = dir.path().join("map.xml");
    export_site_map(&tree, OutputFormat::Json, &json_path).unwrap();
    export_site_map(&tree, OutputFormat::Xml, &xml_path).unwrap();

    let from_json = load_site_map(OutputFormat::Json, &json_path).unwrap();
    let from_xml = load_site_map(OutputFormat::Xml, &xml_path).unwrap();

    assert_eq!(from_json, from_xml);
    assert_eq!(from_json.node_count(), tree.node_count());
    assert_eq!(from_json.url, tree.url);

    // /b is served by the default 404 responder
    let b = from_xml
        .find(&format!("{}/b?x=1&y=2", server.uri()))
        .expect("query URL survives XML escaping");
    assert_eq!(b.status_code, 404);
}
