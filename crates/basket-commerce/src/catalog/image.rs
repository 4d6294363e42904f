//! Image reference resolution.
//!
//! The backend stores whatever the uploader sent: absolute URLs, data URIs,
//! bare file names, or the server-side path the file was saved under
//! (sometimes a Windows path). Everything is mapped onto something a client
//! can fetch.

/// Shown when a product has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "/assets/images/no_image.png";

/// Route the backend serves uploaded product images from.
pub const PRODUCT_IMAGE_ROUTE: &str = "/admin/products/images";

/// Resolve a stored image reference against the API base URL.
pub fn resolve_image_url(candidate: Option<&str>, base_url: &str) -> String {
    let Some(candidate) = candidate.map(str::trim).filter(|c| !c.is_empty()) else {
        return PLACEHOLDER_IMAGE.to_string();
    };

    if is_absolute_url(candidate) || candidate.starts_with("data:") {
        return candidate.to_string();
    }

    let mut path = candidate.to_string();
    if is_os_path(&path) {
        if let Some(name) = path.rsplit(['/', '\\']).next() {
            path = name.to_string();
        }
    }

    if is_bare_file_name(&path) {
        path = format!("{}/{}", PRODUCT_IMAGE_ROUTE, path);
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

fn is_absolute_url(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

fn is_os_path(s: &str) -> bool {
    let bytes = s.as_bytes();
    let windows_drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && bytes[2] == b'\\';
    windows_drive || s.starts_with("\\\\") || s.starts_with('/') || s.contains('\\')
}

/// `photo.jpg`: no separators and an alphanumeric extension.
fn is_bare_file_name(s: &str) -> bool {
    if s.contains('/') {
        return false;
    }
    match s.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://localhost:8080/api";

    #[test]
    fn test_missing_uses_placeholder() {
        assert_eq!(resolve_image_url(None, BASE), PLACEHOLDER_IMAGE);
        assert_eq!(resolve_image_url(Some("  "), BASE), PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_absolute_and_data_pass_through() {
        let url = "https://cdn.example.com/a.png";
        assert_eq!(resolve_image_url(Some(url), BASE), url);
        assert_eq!(resolve_image_url(Some("data:image/png;base64,AAA"), BASE), "data:image/png;base64,AAA");
    }

    #[test]
    fn test_bare_file_name_maps_to_image_route() {
        assert_eq!(
            resolve_image_url(Some("ghee.jpg"), BASE),
            "http://localhost:8080/api/admin/products/images/ghee.jpg"
        );
    }

    #[test]
    fn test_windows_path_reduced_to_file_name() {
        assert_eq!(
            resolve_image_url(Some(r"C:\uploads\products\oil.webp"), BASE),
            "http://localhost:8080/api/admin/products/images/oil.webp"
        );
    }

    #[test]
    fn test_server_relative_route_round_trips() {
        assert_eq!(
            resolve_image_url(Some("/admin/products/images/x.png"), BASE),
            "http://localhost:8080/api/admin/products/images/x.png"
        );
    }

    #[test]
    fn test_relative_path_joined() {
        assert_eq!(
            resolve_image_url(Some("static/banner"), "http://shop/api/"),
            "http://shop/api/static/banner"
        );
    }
}
