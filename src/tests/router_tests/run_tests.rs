use super::{get, post_json};
use crate::errors::ServerError;
use crate::responses::error_to_response;
use crate::router::handle;
use crate::scraper::sites::{Acres99Adapter, SiteAdapter, ACRES99_SEARCH_URL};
use crate::tests::utils::{
    read_body, read_json, test_context, wait_until_idle, FixtureBuilder, ACRES99_PAGE,
};
use std::sync::atomic::Ordering;

const ACRES99_ONLY: &str =
    r#"{"pages": 1, "bhk": "2,3", "sites": {"99acres": true, "magicbricks": false, "housing": false}}"#;

fn acres99_first_page() -> String {
    Acres99Adapter::new(ACRES99_SEARCH_URL, vec!["2", "3"])
        .unwrap()
        .search_url(1)
        .unwrap()
        .to_string()
}

#[test]
fn home_page_renders_the_search_form() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);

    let resp = handle(get("/"), &ctx).unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let body = read_body(resp);
    assert!(body.contains("Start Property Search"));
    assert!(body.contains("Prestige"));
}

#[test]
fn fresh_server_offers_csv_import_on_the_home_page() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);
    assert!(ctx.runs.results().is_none());

    let body = read_body(handle(get("/"), &ctx).unwrap());

    assert!(body.contains("Load a previously exported CSV"));
    assert!(body.contains("fetch('/import_csv'"));
}

#[test]
fn idle_status_reports_nothing_yet() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);

    let status = read_json(handle(get("/status"), &ctx).unwrap());

    assert_eq!(status["running"], false);
    assert_eq!(status["phase"], "idle");
    assert_eq!(status["progress"], 0);
    assert_eq!(status["message"], "Ready");
    assert!(status["results"].is_null());
}

#[test]
fn second_start_is_refused_while_running() {
    let (builder, gate) = FixtureBuilder::default().gated();
    let (fetchers, _) = builder.factory();
    let ctx = test_context(fetchers);

    let first = handle(post_json("/start_scraping", ACRES99_ONLY), &ctx).unwrap();
    assert_eq!(read_json(first)["status"], "started");
    assert!(ctx.runs.is_running());

    let second = handle(post_json("/start_scraping", ACRES99_ONLY), &ctx).unwrap_err();
    assert!(matches!(second, ServerError::RunConflict));
    let resp = error_to_response(second);
    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(read_json(resp)["error"], "Scraping already in progress");

    let status = read_json(handle(get("/status"), &ctx).unwrap());
    assert_eq!(status["running"], true);

    gate.store(true, Ordering::SeqCst);
    wait_until_idle(&ctx.runs);
    assert_eq!(ctx.runs.status().message, "Completed! Found 0 properties");
}

#[test]
fn zero_pages_is_a_bad_request() {
    let (fetchers, log) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);

    let err = handle(post_json("/start_scraping", r#"{"pages": 0}"#), &ctx).unwrap_err();

    assert_eq!(err.status(), 400);
    assert!(!ctx.runs.is_running());
    assert!(log.urls().is_empty());
}

#[test]
fn unparseable_start_body_is_a_bad_request() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);

    let err = handle(post_json("/start_scraping", "{pages: three"), &ctx).unwrap_err();

    assert!(matches!(err, ServerError::BadRequest(_)));
}

#[test]
fn no_sites_selected_is_a_bad_request() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);
    let body = r#"{"sites": {"99acres": false, "magicbricks": false, "housing": false}}"#;

    let resp = error_to_response(handle(post_json("/start_scraping", body), &ctx).unwrap_err());

    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(read_json(resp)["error"], "select at least one site");
}

#[test]
fn stop_without_a_run_is_not_running() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);

    let resp = handle(post_json("/stop_scraping", ""), &ctx).unwrap();

    assert_eq!(read_json(resp)["status"], "not_running");
}

#[test]
fn stop_during_a_run_cancels_it() {
    let (builder, gate) = FixtureBuilder::default().gated();
    let (fetchers, _) = builder.factory();
    let ctx = test_context(fetchers);

    handle(post_json("/start_scraping", r#"{"pages": 2}"#), &ctx).unwrap();
    let resp = handle(post_json("/stop_scraping", ""), &ctx).unwrap();
    assert_eq!(read_json(resp)["status"], "stopped");
    assert_eq!(ctx.runs.status().message, "Stopping...");

    gate.store(true, Ordering::SeqCst);
    wait_until_idle(&ctx.runs);

    let status = read_json(handle(get("/status"), &ctx).unwrap());
    assert_eq!(status["phase"], "cancelled");
    assert_eq!(status["message"], "Search stopped by user");
}

#[test]
fn finished_run_is_served_on_results_and_history() {
    let (fetchers, _) = FixtureBuilder::default()
        .page(acres99_first_page(), ACRES99_PAGE)
        .factory();
    let ctx = test_context(fetchers);

    handle(post_json("/start_scraping", ACRES99_ONLY), &ctx).unwrap();
    wait_until_idle(&ctx.runs);

    let status = read_json(handle(get("/status"), &ctx).unwrap());
    assert_eq!(status["phase"], "completed");
    assert_eq!(status["progress"], 100);
    assert_eq!(status["properties_found"], 2);
    assert_eq!(status["results"][0]["source"], "99acres");

    let page = read_body(handle(get("/results"), &ctx).unwrap());
    assert!(page.contains("3 BHK Flat in Whitefield"));
    assert!(page.contains("2 BHK Apartment in Hebbal"));
    assert!(!page.contains("Sarjapur"));

    let history = handle(get("/runs"), &ctx).unwrap();
    assert_eq!(history.status().as_u16(), 200);
    let history = read_body(history);
    assert!(history.contains("99acres"));
    assert!(history.contains("completed"));
}

#[test]
fn results_without_a_run_redirect_home() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);

    let resp = handle(get("/results"), &ctx).unwrap();

    assert_eq!(resp.status().as_u16(), 302);
    assert_eq!(resp.headers().get("Location").unwrap(), "/");
}

#[test]
fn unknown_route_is_not_found() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);

    let err = handle(get("/admin"), &ctx).unwrap_err();
    assert!(matches!(err, ServerError::NotFound));

    let resp = error_to_response(err);
    assert_eq!(resp.status().as_u16(), 404);
    assert!(read_body(resp).contains("Not Found"));
}
