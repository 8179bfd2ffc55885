//! Request-body handling for `POST /import_csv`: either a browser
//! `multipart/form-data` upload with a `file` field, or the CSV as the raw body.

use crate::errors::ServerError;
use astra::Request;
use std::io::Read;

/// Reads at most `limit` bytes; anything larger is rejected.
pub fn read_body(req: &mut Request, limit: u64) -> Result<Vec<u8>, ServerError> {
    let mut buf = Vec::new();
    req.body_mut()
        .reader()
        .take(limit + 1)
        .read_to_end(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("Failed to read upload: {e}")))?;

    if buf.len() as u64 > limit {
        return Err(ServerError::BadRequest(format!("Upload exceeds {limit} bytes")));
    }
    Ok(buf)
}

/// The CSV bytes of an import request.
pub fn uploaded_file(req: &mut Request, limit: u64) -> Result<Vec<u8>, ServerError> {
    let boundary = req
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .and_then(multipart_boundary)
        .map(str::to_string);

    let body = read_body(req, limit)?;

    let file = match boundary {
        Some(boundary) => multipart_field(&body, &boundary, "file")
            .map(<[u8]>::to_vec)
            .unwrap_or_default(),
        None => body,
    };

    if file.iter().all(u8::is_ascii_whitespace) {
        return Err(ServerError::BadRequest("No file provided".into()));
    }
    Ok(file)
}

fn multipart_boundary(content_type: &str) -> Option<&str> {
    let (mime, params) = content_type.split_once(';')?;
    if !mime.trim().eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    params
        .split(';')
        .filter_map(|p| p.trim().split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, v)| v.trim().trim_matches('"'))
        .filter(|b| !b.is_empty())
}

/// Content of the form field called `name`, if present.
fn multipart_field<'a>(body: &'a [u8], boundary: &str, name: &str) -> Option<&'a [u8]> {
    let delimiter = format!("--{boundary}");
    let wanted = format!(" name=\"{name}\"");

    let mut rest = body;
    while let Some(start) = find(rest, delimiter.as_bytes()) {
        rest = &rest[start + delimiter.len()..];
        if rest.starts_with(b"--") {
            return None;
        }
        let part_end = find(rest, delimiter.as_bytes()).unwrap_or(rest.len());
        let part = &rest[..part_end];

        let Some(header_end) = find(part, b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&part[..header_end]);
        let names_field = headers.lines().any(|line| {
            line.to_ascii_lowercase().starts_with("content-disposition") && line.contains(&wanted)
        });
        if names_field {
            let content = &part[header_end + 4..];
            return Some(content.strip_suffix(b"\r\n").unwrap_or(content));
        }
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
