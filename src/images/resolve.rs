// src/images/resolve.rs
//! Avatar URL resolution for review rendering
//!
//! Local paths and data URIs pass through unchanged; external URLs are
//! routed through the image proxy (external hosts block hotlinking and
//! trip CORB otherwise); anything unparseable falls back to the bundled
//! placeholder.

/// Static placeholder shown when a reviewer has no usable avatar
pub const PLACEHOLDER_IMAGE: &str = "/statics/user.svg";

pub fn resolve_image_url(image_url: &str) -> String {
    if image_url.is_empty() {
        return PLACEHOLDER_IMAGE.to_string();
    }

    // Already a local path or inline data
    if image_url.starts_with('/') || image_url.starts_with("data:") {
        return image_url.to_string();
    }

    match reqwest::Url::parse(image_url) {
        Ok(_) => format!(
            "/api/proxy-image?url={}",
            urlencoding::encode(image_url)
        ),
        Err(_) => PLACEHOLDER_IMAGE.to_string(),
    }
}

/// One-shot load-error fallback: swap a failing image to the placeholder,
/// but never "retry" the placeholder itself
pub fn fallback_after_error(current_src: &str) -> Option<&'static str> {
    if current_src.contains(PLACEHOLDER_IMAGE) {
        None
    } else {
        Some(PLACEHOLDER_IMAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_falls_back_to_placeholder() {
        assert_eq!(resolve_image_url(""), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_local_paths_and_data_uris_pass_through() {
        assert_eq!(resolve_image_url("/statics/user.svg"), "/statics/user.svg");
        assert_eq!(
            resolve_image_url("/api/avatars/u1-123.png"),
            "/api/avatars/u1-123.png"
        );
        assert_eq!(
            resolve_image_url("data:image/png;base64,AAAA"),
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn test_external_url_routes_through_proxy() {
        assert_eq!(
            resolve_image_url("https://host/img.png"),
            "/api/proxy-image?url=https%3A%2F%2Fhost%2Fimg.png"
        );
    }

    #[test]
    fn test_malformed_url_falls_back_to_placeholder() {
        assert_eq!(resolve_image_url("not a url"), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_error_fallback_is_one_shot() {
        assert_eq!(
            fallback_after_error("/api/proxy-image?url=x"),
            Some(PLACEHOLDER_IMAGE)
        );
        assert_eq!(fallback_after_error("/statics/user.svg"), None);
    }
}
