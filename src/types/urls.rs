//! NewTypes for values used by users when first connecting to the platform.

use crate::errors::InvalidPlatformUrl;
use aliri_braid::braid;

/// A [PlatformUrl] is the base URL of a platform deployment, e.g.
/// `https://example.citrine-platform.com/api/v1/`
#[braid(validator, serde)]
pub struct PlatformUrl(String);

impl aliri_braid::Validator for PlatformUrl {
    type Error = InvalidPlatformUrl;

    fn validate(s: &str) -> Result<(), Self::Error> {
        if !(s.starts_with("http://") || s.starts_with("https://")) {
            Err(InvalidPlatformUrl::Protocol(s.to_string()))
        } else if !s.ends_with('/') {
            Err(InvalidPlatformUrl::TrailingSlash(s.to_string()))
        } else {
            Ok(())
        }
    }
}

impl PlatformUrl {
    /// Resolve a request path against this base URL.
    ///
    /// Absolute URLs (such as `next` links) are returned unchanged.
    pub fn join(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.as_str(), path.trim_start_matches('/'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("http://localhost/")]
    #[case("http://localhost:8000/api/v1/")]
    #[case("https://example.citrine-platform.com/api/v1/")]
    fn test_parse_url(#[case] url: &str) {
        assert!(PlatformUrl::try_from(url).is_ok());
    }

    #[rstest]
    #[case("idk://localhost/api/v1/")]
    #[case("localhost/api/v1/")]
    fn test_reject_bad_protocol(#[case] url: &str) {
        assert!(matches!(
            PlatformUrl::try_from(url).unwrap_err(),
            InvalidPlatformUrl::Protocol { .. }
        ))
    }

    #[rstest]
    #[case("http://localhost")]
    #[case("http://localhost/api/v1")]
    fn test_reject_missing_slash(#[case] url: &str) {
        assert!(matches!(
            PlatformUrl::try_from(url).unwrap_err(),
            InvalidPlatformUrl::TrailingSlash { .. }
        ))
    }

    #[rstest]
    #[case("projects", "http://localhost/api/v1/projects")]
    #[case("/projects/abc/predictors", "http://localhost/api/v1/projects/abc/predictors")]
    #[case("https://elsewhere/page?cursor=b", "https://elsewhere/page?cursor=b")]
    fn test_join(#[case] path: &str, #[case] expected: &str) {
        let base = PlatformUrl::try_from("http://localhost/api/v1/").unwrap();
        assert_eq!(base.join(path), expected);
    }
}
