//! File name extraction from a URL path.

use url::Url;

/// Last non-empty path segment of `url`, still percent-encoded.
///
/// Returns `None` when the path is empty/root or ends in `.`/`..`.
/// Query and fragment never contribute.
pub fn filename_from_url_path(url: &Url) -> Option<String> {
    let segment = url.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Option<String> {
        filename_from_url_path(&Url::parse(s).unwrap())
    }

    #[test]
    fn normal() {
        assert_eq!(
            name("http://ftp.gnu.org/gnu/coreutils/coreutils-8.29.tar.xz").as_deref(),
            Some("coreutils-8.29.tar.xz")
        );
        assert_eq!(name("ftp://example.test/single").as_deref(), Some("single"));
    }

    #[test]
    fn trailing_slash_uses_last_segment() {
        assert_eq!(name("https://example.test/dist/pkg/").as_deref(), Some("pkg"));
    }

    #[test]
    fn root_or_empty() {
        assert_eq!(name("https://example.test/"), None);
        assert_eq!(name("https://example.test"), None);
    }

    #[test]
    fn with_query_and_fragment() {
        assert_eq!(
            name("https://example.test/file.zip?token=abc#frag").as_deref(),
            Some("file.zip")
        );
    }

    #[test]
    fn percent_encoding_is_kept() {
        assert_eq!(
            name("https://example.test/a%20b.tar.gz").as_deref(),
            Some("a%20b.tar.gz")
        );
    }
}
