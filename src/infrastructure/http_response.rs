// HTTP response utilities for rendered images
use axum::{
    body::Body,
    http::{header, Response, StatusCode},
};
use bytes::Bytes;

/// Wrap encoded PNG bytes. Frames change every poll, so nothing is cached.
pub fn png_response(png: Bytes) -> Result<Response<Body>, StatusCode> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .header(header::CACHE_CONTROL, "no-store")
        .header(header::CONTENT_LENGTH, png.len())
        .body(Body::from(png))
        .map_err(|e| {
            tracing::error!("Response build error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_response_headers() {
        let response = png_response(Bytes::from_static(b"\x89PNG")).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "4");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    }
}
