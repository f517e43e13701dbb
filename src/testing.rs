//! Fixtures and fake collaborators shared by unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

use git2::{IndexAddOption, Oid, Repository, Signature};
use semver::Version;
use tempfile::TempDir;

use crate::error::{ApiError, CommentPostError, RegistryQueryError};
use crate::registry::Registry;
use crate::review::ReviewSystem;
use crate::workspace::Workspace;

/// A git repository holding a cargo workspace with an initial commit
pub struct Fixture {
    pub dir: TempDir,
    pub repo: Repository,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test User").unwrap();
            config.set_str("user.email", "test@test.com").unwrap();
        }

        let fx = Self { dir, repo };
        fx.write(
            "Cargo.toml",
            "[workspace]\nresolver = \"2\"\nmembers = [\"crates/*\", \"credential/*\"]\n\n\
             [workspace.package]\nversion = \"0.9.0\"\n",
        );
        fx.commit("Initial commit");
        fx
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the workspace root, creating parents
    pub fn write(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// Create a member package at `rel_dir`
    pub fn member(&self, rel_dir: &str, name: &str, version: &str) {
        self.write(
            &format!("{rel_dir}/Cargo.toml"),
            &format!("[package]\nname = \"{name}\"\nversion = \"{version}\"\nedition = \"2021\"\n"),
        );
        self.write(&format!("{rel_dir}/src/lib.rs"), "");
    }

    /// Stage everything (including deletions) and commit on HEAD
    pub fn commit(&self, message: &str) -> Oid {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let sig = Signature::now("Test User", "test@test.com").unwrap();
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::load_from(self.dir.path().to_path_buf()).unwrap()
    }
}

/// In-memory registry; packages not listed were never published
#[derive(Default)]
pub struct FakeRegistry {
    versions: HashMap<String, Vec<Version>>,
    unreachable: bool,
    pub queries: RefCell<Vec<String>>,
}

impl FakeRegistry {
    pub fn with(mut self, package: &str, versions: &[&str]) -> Self {
        self.versions.insert(
            package.to_string(),
            versions.iter().map(|v| Version::parse(v).unwrap()).collect(),
        );
        self
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }
}

impl Registry for FakeRegistry {
    fn published_versions(&self, package: &str) -> Result<Vec<Version>, RegistryQueryError> {
        self.queries.borrow_mut().push(package.to_string());
        if self.unreachable {
            return Err(RegistryQueryError {
                package: package.to_string(),
                source: ApiError::Status {
                    url: format!("https://index.invalid/{package}"),
                    status: 503,
                    body: "unavailable".into(),
                },
            });
        }
        Ok(self.versions.get(package).cloned().unwrap_or_default())
    }
}

/// In-memory review system recording posted comments
#[derive(Default)]
pub struct FakeReview {
    pub files: Vec<String>,
    pub fail_list: bool,
    pub fail_post: bool,
    pub comments: RefCell<Vec<(u64, String)>>,
}

impl FakeReview {
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    fn error(status: u16) -> ApiError {
        ApiError::Status {
            url: "https://api.invalid".into(),
            status,
            body: "nope".into(),
        }
    }
}

impl ReviewSystem for FakeReview {
    fn list_files(&self, _pr: u64) -> Result<Vec<String>, ApiError> {
        if self.fail_list {
            return Err(Self::error(404));
        }
        Ok(self.files.clone())
    }

    fn post_comment(&self, pr: u64, body: &str) -> Result<(), CommentPostError> {
        if self.fail_post {
            return Err(CommentPostError {
                pr,
                source: Self::error(403),
            });
        }
        self.comments.borrow_mut().push((pr, body.to_string()));
        Ok(())
    }
}

/// Local HTTP server answering one connection per canned `(status, body)`
pub struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let request_line = read_request(&stream);
                seen.lock().unwrap().push(request_line);
                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        Self { url, requests }
    }

    /// Request lines received so far, e.g. `GET /ho/me/home HTTP/1.1`
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Read one request, body included, and return its request line
fn read_request(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut content_length = 0;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).unwrap();

    request_line.trim_end().to_string()
}

/// URL of a local port nothing listens on
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    url
}
