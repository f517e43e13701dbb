use reqwest::StatusCode;
use reqwest::blocking::Client;
use semver::Version;
use serde::Deserialize;
use tracing::{debug, trace};

use super::Registry;
use crate::error::{ApiError, RegistryQueryError};
use crate::http;

/// One line of a sparse index file
#[derive(Debug, Deserialize)]
struct IndexLine {
    vers: String,
    #[serde(default)]
    yanked: bool,
}

/// How the index answered a request for one package file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexResponse {
    Found,
    NotPublished,
    Failed,
}

/// Unknown crates are a 404 on crates.io; some mirrors answer 410 or 451.
/// Anything else outside 2xx is a failure, never "not published".
fn classify(status: StatusCode) -> IndexResponse {
    if status.is_success() {
        IndexResponse::Found
    } else if status == StatusCode::NOT_FOUND
        || status == StatusCode::GONE
        || status == StatusCode::UNAVAILABLE_FOR_LEGAL_REASONS
    {
        IndexResponse::NotPublished
    } else {
        IndexResponse::Failed
    }
}

/// Registry backed by an HTTP sparse index (crates.io layout)
pub struct SparseIndex {
    client: Client,
    base_url: String,
}

impl SparseIndex {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            client: http::client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of the index file for `package`
    pub fn url_for(&self, package: &str) -> String {
        format!("{}/{}", self.base_url, index_path(package))
    }

    fn fetch(&self, package: &str) -> Result<Vec<Version>, ApiError> {
        let url = self.url_for(package);
        debug!(%url, "querying registry index");

        let response = http::send(&url, self.client.get(&url))?;
        match classify(response.status()) {
            IndexResponse::Found => {
                let body = http::text(&url, response)?;
                parse_index_file(&url, &body)
            }
            IndexResponse::NotPublished => {
                trace!(package, status = %response.status(), "not on registry");
                Ok(Vec::new())
            }
            IndexResponse::Failed => Err(http::status_error(&url, response)),
        }
    }
}

impl Registry for SparseIndex {
    fn published_versions(&self, package: &str) -> Result<Vec<Version>, RegistryQueryError> {
        self.fetch(package).map_err(|source| RegistryQueryError {
            package: package.to_string(),
            source,
        })
    }
}

/// Relative path of a package's file in the index
///
/// Names are lowercased; 1 and 2 character names live under `1/` and `2/`,
/// 3 character names under `3/<first char>/`, longer names under
/// `<first two>/<next two>/`. Lengths count characters, not bytes.
pub fn index_path(package: &str) -> String {
    let name = package.to_lowercase();
    let chars: Vec<char> = name.chars().collect();
    let segment = |range: std::ops::Range<usize>| chars[range].iter().collect::<String>();
    match chars.len() {
        0 | 1 => format!("1/{name}"),
        2 => format!("2/{name}"),
        3 => format!("3/{}/{name}", segment(0..1)),
        _ => format!("{}/{}/{name}", segment(0..2), segment(2..4)),
    }
}

fn parse_index_file(url: &str, body: &str) -> Result<Vec<Version>, ApiError> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let entry: IndexLine =
                serde_json::from_str(line).map_err(|source| ApiError::Malformed {
                    url: url.to_string(),
                    source,
                })?;
            if entry.yanked {
                trace!(version = %entry.vers, "yanked version still counts as published");
            }
            Version::parse(&entry.vers).map_err(|source| ApiError::InvalidVersion {
                url: url.to_string(),
                version: entry.vers.clone(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubServer, closed_port_url};

    #[test]
    fn test_index_path_layout() {
        assert_eq!(index_path("a"), "1/a");
        assert_eq!(index_path("io"), "2/io");
        assert_eq!(index_path("syn"), "3/s/syn");
        assert_eq!(index_path("cargo"), "ca/rg/cargo");
        assert_eq!(index_path("Cargo-Util"), "ca/rg/cargo-util");
    }

    #[test]
    fn test_index_path_counts_characters() {
        assert_eq!(index_path("日本"), "2/日本");
        assert_eq!(index_path("é"), "1/é");
        assert_eq!(index_path("äbc"), "3/ä/äbc");
        assert_eq!(index_path("日本語のcrate"), "日本/語の/日本語のcrate");
        assert_eq!(index_path("ÄÖü-x"), "äö/ü-/äöü-x");
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify(StatusCode::OK), IndexResponse::Found);
        for missing in [404, 410, 451] {
            let status = StatusCode::from_u16(missing).unwrap();
            assert_eq!(classify(status), IndexResponse::NotPublished, "{missing}");
        }
        for failed in [301, 401, 403, 429, 500, 502, 503] {
            let status = StatusCode::from_u16(failed).unwrap();
            assert_eq!(classify(status), IndexResponse::Failed, "{failed}");
        }
    }

    #[test]
    fn test_missing_package_is_never_published() {
        let server = StubServer::start(vec![(404, String::new())]);
        let index = SparseIndex::new(&server.url).unwrap();
        assert!(index.published_versions("fresh").unwrap().is_empty());
        assert_eq!(server.requests(), ["GET /fr/es/fresh HTTP/1.1"]);
    }

    #[test]
    fn test_found_package_lists_versions() {
        let body = "{\"vers\":\"0.1.0\"}\n{\"vers\":\"0.2.0\",\"yanked\":true}\n";
        let server = StubServer::start(vec![(200, body.to_string())]);
        let index = SparseIndex::new(&server.url).unwrap();
        assert_eq!(
            index.latest_published("home").unwrap(),
            Some(Version::new(0, 2, 0))
        );
    }

    #[test]
    fn test_server_error_is_fatal() {
        let server = StubServer::start(vec![(503, "try later".to_string())]);
        let index = SparseIndex::new(&server.url).unwrap();
        let err = index.published_versions("home").unwrap_err();
        assert_eq!(err.package, "home");
        assert!(matches!(
            err.source,
            ApiError::Status { status: 503, ref body, .. } if body == "try later"
        ));
    }

    #[test]
    fn test_unreachable_registry_is_fatal() {
        let url = closed_port_url();
        let index = SparseIndex::new(&url).unwrap();
        let err = index.published_versions("home").unwrap_err();
        assert!(matches!(err.source, ApiError::Request { .. }));
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let index = SparseIndex::new("https://index.crates.io/").unwrap();
        assert_eq!(index.url_for("home"), "https://index.crates.io/ho/me/home");
    }

    #[test]
    fn test_parse_index_file() {
        let body = concat!(
            r#"{"name":"home","vers":"0.5.4","deps":[],"cksum":"x","yanked":false}"#,
            "\n",
            r#"{"name":"home","vers":"0.5.5","deps":[],"cksum":"y","yanked":true}"#,
            "\n\n",
            r#"{"name":"home","vers":"0.5.9","deps":[],"cksum":"z","yanked":false}"#,
            "\n",
        );
        let versions = parse_index_file("u", body).unwrap();
        assert_eq!(versions.len(), 3);
        assert_eq!(versions.iter().max().unwrap().to_string(), "0.5.9");
    }

    #[test]
    fn test_parse_index_file_rejects_garbage() {
        let err = parse_index_file("u", "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ApiError::Malformed { .. }));
    }

    #[test]
    fn test_parse_index_file_rejects_bad_version() {
        let err = parse_index_file("u", r#"{"vers":"one.two"}"#).unwrap_err();
        assert!(matches!(err, ApiError::InvalidVersion { .. }));
    }
}
