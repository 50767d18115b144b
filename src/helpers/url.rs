//! URL helper functions

use crate::config::SiteConfig;

/// Directory under the site root holding article pages
pub const POST_DIR: &str = "post";

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/styles.css") // -> "/blog/styles.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Generate a full URL including the domain
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/post/hello/") // -> "https://example.com/blog/post/hello/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let base = config.url.trim_end_matches('/');
    format!("{}{}", base, url_for(config, path))
}

/// Filesystem-safe slug for a document uid.
///
/// CMS uids are already slugs; anything else is slugified so it can never
/// escape the output directory.
pub fn post_slug(uid: &str) -> String {
    slug::slugify(uid)
}

/// Whether a uid can be used as a route segment unchanged
pub fn is_slug(uid: &str) -> bool {
    !uid.is_empty() && slug::slugify(uid) == uid
}

/// Site-relative path of an article page, e.g. `post/hello-world/`
pub fn post_path(uid: &str) -> String {
    format!("{}/{}/", POST_DIR, post_slug(uid))
}
