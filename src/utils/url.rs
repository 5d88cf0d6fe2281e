// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Normalize a URL for visited-set membership.
///
/// Drops the fragment and query string: template membership is decided
/// by the path, and query permutations of one page must not re-enter the
/// frontier as distinct tasks.
pub fn normalize(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized.set_query(None);
    normalized
}

/// Whether two URLs share scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

/// Derive a project name from a seed URL.
///
/// # Examples
/// ```
/// use siteprint::utils::url::project_name;
/// use url::Url;
///
/// let seed = Url::parse("https://shop.example.com/").unwrap();
/// assert_eq!(project_name(&seed), "shop_example_com_clone");
/// ```
pub fn project_name(seed: &Url) -> String {
    let host = seed.host_str().unwrap_or("site").replace('.', "_");
    format!("{host}_clone")
}
