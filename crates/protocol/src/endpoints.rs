//! Endpoint layout of the upload API.
//!
//! Every path hangs off `{base}/modpacks/{slug}/versions/{version}`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::types::UploadKind;

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// URL builder for one `(slug, version)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    root: String,
}

impl Endpoints {
    /// Builds the endpoint root for `slug` and `version` under `base_url`.
    pub fn new(base_url: &str, slug: &str, version: &str) -> Self {
        let root = format!(
            "{}/modpacks/{}/versions/{}",
            base_url.trim_end_matches('/'),
            encode(slug),
            encode(version)
        );
        Self { root }
    }

    /// `GET /upload/check?type=<kind>`
    pub fn check(&self, kind: UploadKind) -> String {
        format!("{}/upload/check?type={}", self.root, kind.as_str())
    }

    /// `POST /upload/start`
    pub fn start(&self) -> String {
        format!("{}/upload/start", self.root)
    }

    /// `GET /upload/{sessionId}/status`
    pub fn status(&self, session_id: &str) -> String {
        format!("{}/upload/{}/status", self.root, encode(session_id))
    }

    /// `POST /upload/{sessionId}/chunk/{index}`
    pub fn chunk(&self, session_id: &str, index: u32) -> String {
        format!("{}/upload/{}/chunk/{index}", self.root, encode(session_id))
    }

    /// `POST /upload/{sessionId}/complete`
    pub fn complete(&self, session_id: &str) -> String {
        format!("{}/upload/{}/complete", self.root, encode(session_id))
    }
}

fn encode(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints() -> Endpoints {
        Endpoints::new("https://api.example.com/", "all-the-mods", "1.2.0")
    }

    #[test]
    fn root_trims_trailing_slash() {
        assert_eq!(
            endpoints().start(),
            "https://api.example.com/modpacks/all-the-mods/versions/1.2.0/upload/start"
        );
    }

    #[test]
    fn check_carries_kind_query() {
        assert!(endpoints().check(UploadKind::Icons).ends_with("/upload/check?type=icons"));
    }

    #[test]
    fn session_scoped_paths() {
        let ep = endpoints();
        assert!(ep.status("abc").ends_with("/upload/abc/status"));
        assert!(ep.chunk("abc", 7).ends_with("/upload/abc/chunk/7"));
        assert!(ep.complete("abc").ends_with("/upload/abc/complete"));
    }

    #[test]
    fn segments_are_percent_encoded() {
        let ep = Endpoints::new("http://h", "my pack", "1.0+beta/2");
        assert_eq!(
            ep.start(),
            "http://h/modpacks/my%20pack/versions/1.0%2Bbeta%2F2/upload/start"
        );
        assert!(ep.status("a/b").ends_with("/upload/a%2Fb/status"));
    }
}
