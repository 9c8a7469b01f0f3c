/// Joins `base / name / id` as path segments.
///
/// Slashes at the joints are normalised and empty segments are dropped. The
/// id is taken verbatim and percent-encoded.
pub fn compose_url(base: &str, name: &str, id: Option<&str>) -> String {
    let mut url = base.trim().trim_end_matches('/').to_string();
    let name = name.trim().trim_matches('/');
    if !name.is_empty() {
        url.push('/');
        url.push_str(name);
    }
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        url.push('/');
        url.push_str(&urlencoding::encode(id));
    }
    url
}
