//! Integration tests for dynamic directory resolution.

use std::sync::Arc;

use adaptive_router::fsdir::DynamicDirOptions;
use adaptive_router::routing::{text_handler, RouteSpec};
use adaptive_router::{DispatchOptions, Dispatcher};
use axum::http::Method;

mod common;
use common::{build_site, get, request, DenyAll, TokenCheck};

fn dispatcher() -> Dispatcher {
    Dispatcher::new(DispatchOptions::default())
}

#[tokio::test]
async fn test_serves_files_resolved_per_request() {
    let site = build_site(&[("a.txt", "alpha")]);
    let d = dispatcher();
    d.add_dynamic_dir(
        Method::GET,
        "/files",
        site.path(),
        DynamicDirOptions::default(),
    )
    .await;

    assert_eq!(get(&d, "/files/a.txt").await.2, "alpha");

    // Files created after registration are picked up.
    std::fs::write(site.path().join("late.txt"), "late").unwrap();
    assert_eq!(get(&d, "/files/late.txt").await.2, "late");

    // And deleted files stop resolving.
    std::fs::remove_file(site.path().join("late.txt")).unwrap();
    assert_eq!(get(&d, "/files/late.txt").await.0, 404);
}

#[tokio::test]
async fn test_directory_resolves_to_default_file() {
    let site = build_site(&[("docs/index.html", "docs home")]);
    let d = dispatcher();
    d.add_dynamic_dir(
        Method::GET,
        "/files",
        site.path(),
        DynamicDirOptions {
            default_file: Some("index.html".into()),
            ..DynamicDirOptions::default()
        },
    )
    .await;

    let (status, mime, body) = get(&d, "/files/docs").await;
    assert_eq!(status, 200);
    assert_eq!(mime.as_deref(), Some("text/html"));
    assert_eq!(body, "docs home");

    // The mount root itself resolves through the default file too.
    std::fs::write(site.path().join("index.html"), "top").unwrap();
    assert_eq!(get(&d, "/files").await.2, "top");
}

#[tokio::test]
async fn test_directory_without_default_file_is_a_miss() {
    let site = build_site(&[("docs/guide.html", "guide")]);
    let d = dispatcher();
    d.add_dynamic_dir(
        Method::GET,
        "/files",
        site.path(),
        DynamicDirOptions::default(),
    )
    .await;

    assert_eq!(get(&d, "/files/docs").await.0, 404);
}

#[tokio::test]
async fn test_miss_falls_through_to_wildcard_and_fallback() {
    let site = build_site(&[("real.txt", "real")]);
    let d = dispatcher();
    d.add_dynamic_dir(
        Method::GET,
        "/files",
        site.path(),
        DynamicDirOptions::default(),
    )
    .await;
    d.add_handler(
        Method::GET,
        "/files",
        text_handler("wild"),
        RouteSpec::Wildcard,
    )
    .await;

    // An existing file outranks the wildcard.
    assert_eq!(get(&d, "/files/real.txt").await.2, "real");
    // A missing one falls through to it.
    assert_eq!(get(&d, "/files/ghost.txt").await.2, "wild");

    // With only a fallback, a miss lands there instead.
    d.remove_handler(&Method::GET, "/files", RouteSpec::Wildcard)
        .await;
    d.add_handler(
        Method::GET,
        "/files",
        text_handler("fb"),
        RouteSpec::Fallback,
    )
    .await;
    assert_eq!(get(&d, "/files/ghost.txt").await.2, "fb");
}

#[tokio::test]
async fn test_method_must_match_descriptor() {
    let site = build_site(&[("a.txt", "alpha")]);
    let d = dispatcher();
    d.add_dynamic_dir(
        Method::GET,
        "/files",
        site.path(),
        DynamicDirOptions::default(),
    )
    .await;

    assert_eq!(
        request(&d, Method::POST, "/files/a.txt", "localhost").await.0,
        404
    );
}

#[tokio::test]
async fn test_parent_traversal_is_a_miss() {
    let outer = build_site(&[("outside.txt", "forbidden"), ("root/inside.txt", "ok")]);
    let d = dispatcher();
    d.add_dynamic_dir(
        Method::GET,
        "/files",
        outer.path().join("root"),
        DynamicDirOptions::default(),
    )
    .await;

    assert_eq!(get(&d, "/files/inside.txt").await.2, "ok");
    assert_eq!(get(&d, "/files/../outside.txt").await.0, 404);
}

#[tokio::test]
async fn test_access_check_gates_serving() {
    let site = build_site(&[("a.txt", "alpha")]);
    let d = dispatcher();
    d.add_dynamic_dir(
        Method::GET,
        "/files",
        site.path(),
        DynamicDirOptions {
            check_access: Some(Arc::new(TokenCheck)),
            ..DynamicDirOptions::default()
        },
    )
    .await;

    let (status, _, body) = get(&d, "/files/a.txt").await;
    assert_eq!(status, 403);
    assert_eq!(body, "Access denied");

    let (status, _, body) = get(&d, "/files/a.txt?token=yes").await;
    assert_eq!(status, 200);
    assert_eq!(body, "alpha");
}

#[tokio::test]
async fn test_denial_uses_custom_handler() {
    let site = build_site(&[("a.txt", "alpha")]);
    let d = dispatcher();
    d.add_dynamic_dir(
        Method::GET,
        "/files",
        site.path(),
        DynamicDirOptions {
            check_access: Some(Arc::new(DenyAll)),
            access_denied: Some(text_handler("custom denial")),
            ..DynamicDirOptions::default()
        },
    )
    .await;

    assert_eq!(get(&d, "/files/a.txt").await.2, "custom denial");
}
