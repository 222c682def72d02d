mod common;

use common::{FakePage, RouteTable};
use std::time::Duration;
use vigil_common::{ElementRole, EndpointStatus, HttpMethod, SurfaceKind, TargetMetadata};
use vigil_engine::catalog::builtin::{LOGIN_EMAIL, LOGIN_ERROR, LOGIN_PASSWORD, LOGIN_SUBMIT};
use vigil_engine::catalog::{Catalog, CatalogEntry};
use vigil_engine::discovery::{DiscoveryError, Prober};
use vigil_engine::resolution::{AuthPolicy, Resolver};

const API: &str = "http://api.test";

fn prober() -> Prober {
    Prober::new(
        Resolver::new(Duration::from_millis(100)),
        vec![HttpMethod::Get, HttpMethod::Post],
        AuthPolicy::default(),
    )
}

fn login_form() -> FakePage {
    FakePage::new()
        .with("input[type=email]", "input", true)
        .with("#password", "input", true)
        .with("button[type=submit]", "button", true)
}

#[tokio::test]
async fn test_ui_discovery_records_every_entry() {
    let mut page = login_form();
    let record = prober()
        .discover_ui(&mut page, "http://app.test/", &Catalog::login_page())
        .await
        .unwrap();

    assert_eq!(page.navigations, vec!["http://app.test/login"]);
    assert_eq!(record.kind, SurfaceKind::Ui);
    assert_eq!(record.surface, "login");
    assert_eq!(record.entries.len(), 4);

    let email = record.entry(LOGIN_EMAIL).unwrap();
    assert_eq!(email.matched.as_deref(), Some("input[type=email]"));
    assert_eq!(email.ordered_candidates()[0], "input[type=email]");
    assert!(!email.fallbacks.contains(&"input[type=email]".to_string()));

    assert_eq!(
        record.entry(LOGIN_PASSWORD).unwrap().matched.as_deref(),
        Some("#password")
    );
    assert_eq!(
        record.entry(LOGIN_SUBMIT).unwrap().matched.as_deref(),
        Some("button[type=submit]")
    );

    let error = record.entry(LOGIN_ERROR).unwrap();
    assert!(error.matched.is_none());
    assert_eq!(error.fallbacks, error.candidates);
    assert_eq!(record.unmatched(), vec![LOGIN_ERROR]);
}

#[tokio::test]
async fn test_ui_discovery_infers_undeclared_roles() {
    let catalog = Catalog::new("search", SurfaceKind::Ui, None)
        .with_entry(CatalogEntry::new("query", None, &["#q"]))
        .with_entry(CatalogEntry::new("go", None, &["#go"]))
        .with_entry(CatalogEntry::new("hits", None, &["#hits"]));
    let mut page = FakePage::new()
        .with("#q", "input", true)
        .with("#go", "button", true)
        .with_text("#hits", "span", "3 results");

    let record = prober()
        .discover_ui(&mut page, "http://app.test/search", &catalog)
        .await
        .unwrap();

    assert_eq!(page.navigations, vec!["http://app.test/search"]);
    assert_eq!(record.entry("query").unwrap().role, ElementRole::Input);
    assert_eq!(record.entry("go").unwrap().role, ElementRole::Clickable);
    assert_eq!(record.entry("hits").unwrap().role, ElementRole::Text);
    assert!(record.is_complete());
}

#[tokio::test]
async fn test_ui_discovery_fails_when_page_cannot_open() {
    let mut page = login_form();
    page.fail_navigation = true;

    let err = prober()
        .discover_ui(&mut page, "http://app.test", &Catalog::login_page())
        .await
        .unwrap_err();
    assert!(matches!(err, DiscoveryError::Navigation { .. }));
    assert!(page.lookups.is_empty());
}

#[tokio::test]
async fn test_wrong_catalog_kind_is_rejected() {
    let mut page = FakePage::new();
    let err = prober()
        .discover_ui(&mut page, "http://app.test", &Catalog::auth_api())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DiscoveryError::WrongKind {
            expected: SurfaceKind::Ui,
            found: SurfaceKind::Api,
            ..
        }
    ));
}

#[tokio::test]
async fn test_api_discovery_sweeps_every_verb() {
    let transport = RouteTable::new(API)
        .route(HttpMethod::Get, "/health", 200, "ok")
        .route(HttpMethod::Post, "/health", 405, "")
        .route(HttpMethod::Get, "/auth/me", 401, "")
        .route(HttpMethod::Post, "/auth/me", 405, "")
        .route(HttpMethod::Get, "/users/1", 500, "");
    let catalog = Catalog::from_paths("auth api", &["/health", "/auth/me", "/users/{id}"]);

    let record = prober()
        .discover_api(&transport, API, &catalog, None)
        .await
        .unwrap();

    // 3 paths x 2 verbs, no short-circuit.
    assert_eq!(transport.calls().len(), 6);

    let health = record.entry("/health").unwrap();
    assert_eq!(health.attempts.len(), 2);
    match &health.metadata {
        Some(TargetMetadata::Endpoint(meta)) => {
            assert_eq!(meta.method, HttpMethod::Get);
            assert_eq!(meta.status, Some(200));
            assert!(!meta.requires_auth);
        }
        other => panic!("unexpected metadata: {:?}", other),
    }

    let me = record.entry("/auth/me").unwrap();
    match &me.metadata {
        Some(TargetMetadata::Endpoint(meta)) => {
            assert_eq!(meta.method, HttpMethod::Get);
            assert_eq!(meta.status_class, EndpointStatus::AuthRequired);
            assert!(meta.requires_auth);
        }
        other => panic!("unexpected metadata: {:?}", other),
    }

    let users = record.entry("/users/{id}").unwrap();
    assert!(users.matched.is_none());
    assert_eq!(users.attempts[0].path, "/users/{id}");
    assert_eq!(users.attempts[0].status_class, EndpointStatus::ServerError);
}

#[tokio::test]
async fn test_api_discovery_records_unreachable_paths() {
    let transport = RouteTable::new(API)
        .route(HttpMethod::Get, "/health", 200, "ok")
        .down("/metrics");
    let catalog = Catalog::from_paths("ops", &["/metrics", "/health"]);

    let record = prober()
        .discover_api(&transport, API, &catalog, None)
        .await
        .unwrap();

    let metrics = record.entry("/metrics").unwrap();
    assert!(metrics.matched.is_none());
    assert!(
        metrics
            .attempts
            .iter()
            .all(|a| a.status_class == EndpointStatus::Unreachable && a.status.is_none())
    );
    assert!(record.entry("/health").unwrap().is_found());
}

#[tokio::test]
async fn test_strict_policy_does_not_trust_401() {
    let transport = RouteTable::new(API).route(HttpMethod::Post, "/auth/login", 401, "");
    let catalog = Catalog::from_paths("auth api", &["/auth/login"]);
    let strict = Prober::new(
        Resolver::new(Duration::from_millis(100)),
        vec![HttpMethod::Get, HttpMethod::Post],
        AuthPolicy {
            auth_implies_existence: false,
            ..AuthPolicy::default()
        },
    );

    let record = strict
        .discover_api(&transport, API, &catalog, None)
        .await
        .unwrap();
    let login = record.entry("/auth/login").unwrap();
    assert!(login.matched.is_none());
    assert_eq!(login.attempts[1].status_class, EndpointStatus::AuthRequired);
}

#[tokio::test]
async fn test_api_entry_with_alternative_paths() {
    let transport = RouteTable::new(API).route(HttpMethod::Post, "/login", 200, "{}");
    let catalog = Catalog::new("auth api", SurfaceKind::Api, None).with_entry(CatalogEntry::new(
        "login",
        Some(ElementRole::Endpoint),
        &["/auth/login", "/login"],
    ));

    let record = prober()
        .discover_api(&transport, API, &catalog, Some("token-1"))
        .await
        .unwrap();

    let login = record.entry("login").unwrap();
    assert_eq!(login.matched.as_deref(), Some("/login"));
    assert_eq!(login.ordered_candidates(), vec!["/login", "/auth/login"]);
    assert_eq!(login.attempts.len(), 4);
    assert!(transport.calls().iter().all(|req| {
        req.headers
            .iter()
            .any(|(k, v)| k == "Authorization" && v == "Bearer token-1")
    }));
}
