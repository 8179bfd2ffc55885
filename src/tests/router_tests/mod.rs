mod export_import_tests;
mod run_tests;

use astra::{Body, Request};

pub fn get(path: &str) -> Request {
    http::Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(path: &str, json: &str) -> Request {
    http::Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "application/json")
        .body(Body::from(json.as_bytes().to_vec()))
        .unwrap()
}

/// A browser-style upload with the CSV in the `file` field.
pub fn post_csv_upload(path: &str, csv: &[u8]) -> Request {
    let mut body = Vec::new();
    body.extend_from_slice(
        b"--TestBoundary\r\n\
          Content-Disposition: form-data; name=\"file\"; filename=\"export.csv\"\r\n\
          Content-Type: text/csv\r\n\r\n",
    );
    body.extend_from_slice(csv);
    body.extend_from_slice(b"\r\n--TestBoundary--\r\n");

    http::Request::builder()
        .method("POST")
        .uri(path)
        .header("Content-Type", "multipart/form-data; boundary=TestBoundary")
        .body(Body::from(body))
        .unwrap()
}
