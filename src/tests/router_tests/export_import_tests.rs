use super::{get, post_csv_upload};
use crate::domain::{CanonicalListing, RawListing, Source};
use crate::errors::ServerError;
use crate::responses::error_to_response;
use crate::router::handle;
use crate::spreadsheets::listings_to_csv;
use crate::tests::utils::{read_body, read_json, test_context, FixtureBuilder};
use astra::Body;
use std::sync::atomic::Ordering;

fn listing(source: Source, title: &str, builder: &str, price: &str) -> CanonicalListing {
    CanonicalListing::from_raw(
        source,
        RawListing {
            title: Some(title.into()),
            builder: Some(builder.into()),
            price_text: Some(price.into()),
            area_text: Some("1,200 sq.ft".into()),
            property_url: Some("https://housing.com/in/buy/resale/page/1".into()),
            ..Default::default()
        },
    )
}

fn sample_csv() -> Vec<u8> {
    listings_to_csv(&[
        listing(Source::Housing, "2 BHK in Brigade Meadows", "Brigade Group", "₹72 Lac"),
        listing(Source::MagicBricks, "3 BHK in Hennur", "Urban Nest", "₹79 Lac"),
    ])
    .unwrap()
}

#[test]
fn export_without_results_is_refused() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);

    for path in ["/export", "/export.xlsx"] {
        let err = handle(get(path), &ctx).unwrap_err();
        assert!(matches!(err, ServerError::NoResults));

        let resp = error_to_response(err);
        assert_eq!(resp.status().as_u16(), 400);
        assert_eq!(read_json(resp)["error"], "No results to export");
    }
}

#[test]
fn uploaded_csv_replaces_results() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);

    let resp = handle(post_csv_upload("/import_csv", &sample_csv()), &ctx).unwrap();

    let body = read_json(resp);
    assert_eq!(body["status"], "success");
    assert_eq!(body["count"], 2);
    assert_eq!(body["results"][0]["title"], "2 BHK in Brigade Meadows");
    assert_eq!(body["results"][0]["is_preferred_builder"], true);

    assert_eq!(ctx.runs.status().message, "Imported 2 properties from CSV");
    let page = read_body(handle(get("/results"), &ctx).unwrap());
    assert!(page.contains("3 BHK in Hennur"));
}

#[test]
fn raw_csv_body_is_accepted() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);
    let req = http::Request::builder()
        .method("POST")
        .uri("/import_csv")
        .header("Content-Type", "text/csv")
        .body(Body::from(sample_csv()))
        .unwrap();

    let body = read_json(handle(req, &ctx).unwrap());

    assert_eq!(body["count"], 2);
}

#[test]
fn export_then_import_keeps_every_listing() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);
    handle(post_csv_upload("/import_csv", &sample_csv()), &ctx).unwrap();

    let resp = handle(get("/export"), &ctx).unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "text/csv; charset=utf-8"
    );
    let disposition = resp.headers().get("Content-Disposition").unwrap().to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"bangalore_properties_"));
    assert!(disposition.ends_with(".csv\""));

    let exported = read_body(resp);
    assert!(exported.starts_with('\u{feff}'));

    let ctx2 = test_context(FixtureBuilder::default().factory().0);
    let body = read_json(handle(post_csv_upload("/import_csv", exported.as_bytes()), &ctx2).unwrap());
    assert_eq!(body["count"], 2);
    assert_eq!(ctx.runs.results(), ctx2.runs.results());
}

#[test]
fn xlsx_export_is_a_workbook() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);
    handle(post_csv_upload("/import_csv", &sample_csv()), &ctx).unwrap();

    let resp = handle(get("/export.xlsx"), &ctx).unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    let disposition = resp.headers().get("Content-Disposition").unwrap().to_str().unwrap();
    assert!(disposition.ends_with(".xlsx\""));
}

#[test]
fn malformed_csv_leaves_previous_results() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);
    handle(post_csv_upload("/import_csv", &sample_csv()), &ctx).unwrap();

    let broken = format!("{}\nNowhere.in,title only\n", CanonicalListing::FIELD_NAMES.join(","));
    let err = handle(post_csv_upload("/import_csv", broken.as_bytes()), &ctx).unwrap_err();
    assert!(matches!(err, ServerError::Import(_)));

    let resp = error_to_response(err);
    assert_eq!(resp.status().as_u16(), 500);
    let message = read_json(resp)["error"].as_str().unwrap().to_string();
    assert!(message.starts_with("Failed to parse CSV"));

    assert_eq!(ctx.runs.results().map(|r| r.len()), Some(2));
}

#[test]
fn empty_upload_is_a_bad_request() {
    let (fetchers, _) = FixtureBuilder::default().factory();
    let ctx = test_context(fetchers);

    let err = handle(post_csv_upload("/import_csv", b""), &ctx).unwrap_err();

    assert_eq!(err.status(), 400);
    assert_eq!(err.to_string(), "No file provided");
}

#[test]
fn import_is_refused_during_a_run() {
    let (builder, gate) = FixtureBuilder::default().gated();
    let (fetchers, _) = builder.factory();
    let ctx = test_context(fetchers);
    handle(super::post_json("/start_scraping", r#"{"pages": 1}"#), &ctx).unwrap();

    let err = handle(post_csv_upload("/import_csv", &sample_csv()), &ctx).unwrap_err();
    assert!(matches!(err, ServerError::RunConflict));

    gate.store(true, Ordering::SeqCst);
    crate::tests::utils::wait_until_idle(&ctx.runs);
}
