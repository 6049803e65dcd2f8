//! Scope and exclusion rules applied to every candidate URL.

use url::{Origin, Url};

/// True when `url` has exactly the scheme, host and port of `scope`.
///
/// Opaque origins (`mailto:`, `javascript:`, `data:` ...) never match.
pub fn is_in_scope(url: &Url, scope: &Origin) -> bool {
    scope.is_tuple() && url.origin() == *scope
}

/// True when the path of `url` ends, ignoring case, with any denylisted suffix.
pub fn is_excluded<S: AsRef<str>>(url: &Url, denylist: &[S]) -> bool {
    let path = url.path().to_lowercase();
    denylist
        .iter()
        .any(|suffix| path.ends_with(&suffix.as_ref().to_lowercase()))
}

#[derive(Debug, Clone)]
pub struct Classifier {
    scope: Origin,
    denylist: Vec<String>,
}

impl Classifier {
    pub fn new(scope: &Url, denylist: &[String]) -> Self {
        Self {
            scope: scope.origin(),
            denylist: denylist.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    pub fn scope(&self) -> &Origin {
        &self.scope
    }

    pub fn in_scope(&self, url: &Url) -> bool {
        is_in_scope(url, &self.scope)
    }

    pub fn excluded(&self, url: &Url) -> bool {
        is_excluded(url, &self.denylist)
    }

    /// In scope and not excluded. Deduplication is the caller's concern.
    pub fn admits(&self, url: &Url) -> bool {
        self.in_scope(url) && !self.excluded(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn same_origin_is_in_scope() {
        let scope = url("https://example.com/").origin();
        assert!(is_in_scope(&url("https://example.com/a/b?c=d"), &scope));
        assert!(is_in_scope(&url("https://example.com:443/x"), &scope));
    }

    #[test]
    fn other_host_scheme_or_port_is_out_of_scope() {
        let scope = url("https://example.com/").origin();
        assert!(!is_in_scope(&url("https://other.com/x"), &scope));
        assert!(!is_in_scope(&url("http://example.com/x"), &scope));
        assert!(!is_in_scope(&url("https://example.com:8443/x"), &scope));
        assert!(!is_in_scope(&url("https://www.example.com/x"), &scope));
        assert!(!is_in_scope(&url("mailto:me@example.com"), &scope));
    }

    #[test]
    fn exclusion_matches_path_suffix_ignoring_case() {
        let denylist = [".jpg", "/wp-admin/"];
        assert!(is_excluded(&url("https://example.com/a/image.JPG"), &denylist));
        assert!(is_excluded(&url("https://example.com/wp-admin/"), &denylist));
        assert!(!is_excluded(&url("https://example.com/wp-admin/edit"), &denylist));
        assert!(!is_excluded(&url("https://example.com/jpg-gallery"), &denylist));
    }

    #[test]
    fn exclusion_ignores_query_string() {
        let denylist = [".pdf"];
        assert!(!is_excluded(&url("https://example.com/doc?file=a.pdf"), &denylist));
        assert!(is_excluded(&url("https://example.com/a.pdf?dl=1"), &denylist));
    }

    #[test]
    fn classifier_combines_both_rules() {
        let classifier = Classifier::new(&url("https://example.com/"), &[".PNG".to_string()]);
        assert!(classifier.admits(&url("https://example.com/page")));
        assert!(!classifier.admits(&url("https://example.com/logo.png")));
        assert!(!classifier.admits(&url("https://other.com/page")));
    }
}
