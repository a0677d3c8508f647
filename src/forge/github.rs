//! forge::github
//!
//! GitHub forge implementation using the REST v3 API.
//!
//! # Design
//!
//! This module implements the `Forge` trait for GitHub. Endpoints used:
//! - `contents/{path}` for listing, reading, writing and deleting files
//!   (base64 content, `sha` as the content token)
//! - `commits` and `commits/{sha}` for per-path history and commit details
//! - `compare/{old}...{new}` for unified diffs (the per-file `patch`)
//! - `branches` and `git/refs` for branch administration
//!
//! Rollback has no dedicated endpoint. It reads the file at the target
//! commit and writes it back at the branch tip with a compare-and-swap put.
//!
//! # Authentication
//!
//! Tokens come from a [`TokenProvider`] or a static token. Idempotent GETs
//! are retried once on 401/403 when a provider is configured. Mutations
//! are never retried.
//!
//! # Rate Limiting
//!
//! Returns `ForgeError::RateLimited` when limits are hit. No automatic
//! backoff (caller's responsibility).
//!
//! # Example
//!
//! ```ignore
//! use confrev::forge::github::GitHubForge;
//! use confrev::forge::Forge;
//!
//! let forge = GitHubForge::with_token(token);
//! let repo = RepoId::parse("acme/gateway-config")?;
//! let branches = forge.list_branches(&repo).await?;
//! ```
//!
//! [`TokenProvider`]: crate::auth::TokenProvider

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{
    Branch, ChangedFile, CommitDetail, CommitRecord, DeleteFileRequest, FileEntry, FileKind,
    FileRevision, Forge, ForgeError, PutFileRequest, RollbackOutcome, RollbackRequest,
};
use crate::auth::TokenProvider;
use crate::core::types::{BranchName, CommitId, ContentToken, RepoId, RepoPath};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "confrev-cli";

/// Page size for list endpoints.
const PER_PAGE: usize = 100;

/// GitHub forge implementation.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Token provider (re-queried on every request)
    token_provider: Option<Arc<dyn TokenProvider>>,
    /// Static token, used when no provider is configured
    static_token: Option<String>,
    /// API base URL (configurable for GitHub Enterprise and tests)
    api_base: String,
}

// Custom Debug to avoid exposing static_token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("has_token_provider", &self.token_provider.is_some())
            .field("has_static_token", &self.static_token.is_some())
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create a GitHub forge that asks `provider` for a bearer token on each request.
    ///
    /// A 401 or 403 on an idempotent read is retried once with a fresh token.
    pub fn new_with_provider(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: Client::new(),
            token_provider: Some(provider),
            static_token: None,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a GitHub forge with a fixed token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token_provider: None,
            static_token: Some(token.into()),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Use a custom API base URL (e.g. `https://github.example.com/api/v3`).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// The API base URL in use.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Check if this forge has a TokenProvider (enables retry on auth failure).
    pub fn has_token_provider(&self) -> bool {
        self.token_provider.is_some()
    }

    /// Get the current bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::AuthRequired` if no token source is configured.
    /// Returns `ForgeError::AuthFailed` if the TokenProvider fails.
    async fn get_bearer_token(&self) -> Result<String, ForgeError> {
        if let Some(ref provider) = self.token_provider {
            provider
                .bearer_token()
                .await
                .map_err(|e| ForgeError::AuthFailed(e.to_string()))
        } else if let Some(ref token) = self.static_token {
            Ok(token.clone())
        } else {
            Err(ForgeError::AuthRequired)
        }
    }

    /// Build common headers for API requests.
    async fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let token = self.get_bearer_token().await?;
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ForgeError::AuthFailed("token contains invalid characters".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Check if an error is an auth failure that might be resolved by token refresh.
    fn is_retryable_auth_error(err: &ForgeError) -> bool {
        matches!(err, ForgeError::AuthFailed(_))
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, repo: &RepoId, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base,
            repo.owner(),
            repo.name(),
            path
        )
    }

    /// Build the contents URL for a path, percent-encoding each segment.
    fn contents_url(&self, repo: &RepoId, path: &RepoPath) -> Result<Url, ForgeError> {
        let mut url = Url::parse(&self.repo_url(repo, "contents"))
            .map_err(|e| ForgeError::NetworkError(format!("invalid API URL: {}", e)))?;
        if !path.is_root() {
            url.path_segments_mut()
                .map_err(|_| ForgeError::NetworkError("API URL cannot be a base".into()))?
                .extend(path.as_str().split('/'));
        }
        Ok(url)
    }

    /// Send a GET and decode the JSON body, retrying once on auth failure.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ForgeError> {
        let result = self.get_json_once(url, query).await;
        match result {
            Err(ref e) if Self::is_retryable_auth_error(e) && self.has_token_provider() => {
                debug!(url, "auth failed on read, retrying with a fresh token");
                self.get_json_once(url, query).await
            }
            other => other,
        }
    }

    /// Fetch every page of a list endpoint.
    ///
    /// Pages are requested with `per_page=100` until one comes back short.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ForgeError> {
        let per_page = PER_PAGE.to_string();
        let mut all = Vec::new();
        let mut page = 1u32;
        loop {
            let page_str = page.to_string();
            let mut params = query.to_vec();
            params.push(("per_page", per_page.as_str()));
            params.push(("page", page_str.as_str()));

            let items: Vec<T> = self.get_json(url, &params).await?;
            let page_count = items.len();
            all.extend(items);

            if page_count < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ForgeError> {
        let response = self
            .client
            .get(url)
            .headers(self.headers().await?)
            .query(query)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;
        self.handle_response(response).await
    }

    /// Send a mutating request once. Mutations are never retried.
    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<Response, ForgeError> {
        let mut request = self
            .client
            .request(method, url)
            .headers(self.headers().await?);
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle a response whose body is irrelevant on success.
    async fn handle_empty_response(&self, response: Response) -> Result<(), ForgeError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, ForgeError> {
        // Permission headers must be read before the body is consumed.
        let headers = response.headers();
        let required_permissions = headers
            .get("X-Accepted-GitHub-Permissions")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let required_scopes = headers
            .get("X-Accepted-OAuth-Scopes")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let rate_limited = headers
            .get("X-RateLimit-Remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "0");

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN if rate_limited => ForgeError::RateLimited,
            StatusCode::FORBIDDEN => {
                let mut err_msg = format!("Permission denied: {}", message);
                if let Some(perms) = required_permissions.filter(|p| !p.is_empty()) {
                    err_msg.push_str(&format!(" [required: {}]", perms));
                } else if let Some(scopes) = required_scopes.filter(|s| !s.is_empty()) {
                    err_msg.push_str(&format!(" [required scopes: {}]", scopes));
                }
                ForgeError::AuthFailed(err_msg)
            }
            StatusCode::NOT_FOUND => ForgeError::NotFound(message),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => ForgeError::Conflict(message),
            StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Fetch the tip commit of a branch via `git/ref/heads/{branch}`.
    async fn branch_tip(&self, repo: &RepoId, branch: &BranchName) -> Result<CommitId, ForgeError> {
        let url = self.repo_url(repo, &format!("git/ref/heads/{}", branch));
        let git_ref: GitHubRef = self.get_json(&url, &[]).await?;
        parse_commit_id(git_ref.object.sha)
    }

    /// Write a file, returning the raw response so rollback can read the new commit.
    async fn put_contents(
        &self,
        repo: &RepoId,
        branch: &BranchName,
        path: &RepoPath,
        sha: Option<&str>,
        message: &str,
        content: &str,
    ) -> Result<GitHubWriteResponse, ForgeError> {
        let url = self.contents_url(repo, path)?;
        let body = PutContentsBody {
            message,
            content: BASE64_STANDARD.encode(content.as_bytes()),
            sha,
            branch: branch.as_str(),
        };
        debug!(%repo, %branch, %path, "writing file");
        let response = self.send_json(Method::PUT, url.as_str(), Some(&body)).await?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl Forge for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list_files(
        &self,
        repo: &RepoId,
        branch: &BranchName,
        dir: &RepoPath,
    ) -> Result<Vec<FileEntry>, ForgeError> {
        let url = self.contents_url(repo, dir)?;
        debug!(%repo, %branch, %dir, "listing directory");
        let response: ContentsResponse = self
            .get_json(url.as_str(), &[("ref", branch.as_str())])
            .await?;
        match response {
            ContentsResponse::Listing(items) => items.into_iter().map(FileEntry::try_from).collect(),
            ContentsResponse::File(_) => Err(ForgeError::NotFound(format!(
                "{} is a file, not a directory",
                dir
            ))),
        }
    }

    async fn get_file_content(
        &self,
        repo: &RepoId,
        reference: &str,
        path: &RepoPath,
    ) -> Result<FileRevision, ForgeError> {
        let url = self.contents_url(repo, path)?;
        debug!(%repo, reference, %path, "fetching file");
        let response: ContentsResponse = self.get_json(url.as_str(), &[("ref", reference)]).await?;
        let item = match response {
            ContentsResponse::File(item) => item,
            ContentsResponse::Listing(_) => {
                return Err(ForgeError::NotFound(format!(
                    "{} is a directory, not a file",
                    path
                )))
            }
        };
        let content = decode_content(item.content.as_deref().unwrap_or(""))?;
        Ok(FileRevision {
            path: path.clone(),
            reference: reference.to_string(),
            content,
            token: parse_token(item.sha)?,
        })
    }

    async fn put_file(
        &self,
        repo: &RepoId,
        request: PutFileRequest,
    ) -> Result<ContentToken, ForgeError> {
        let written = self
            .put_contents(
                repo,
                &request.branch,
                &request.path,
                Some(request.token.as_str()),
                &request.message,
                &request.content,
            )
            .await?;
        parse_token(written.content.sha)
    }

    async fn delete_file(
        &self,
        repo: &RepoId,
        request: DeleteFileRequest,
    ) -> Result<(), ForgeError> {
        let url = self.contents_url(repo, &request.path)?;
        let body = DeleteContentsBody {
            message: &request.message,
            sha: request.token.as_str(),
            branch: request.branch.as_str(),
        };
        debug!(%repo, branch = %request.branch, path = %request.path, "deleting file");
        let response = self
            .send_json(Method::DELETE, url.as_str(), Some(&body))
            .await?;
        self.handle_empty_response(response).await
    }

    async fn list_commits(
        &self,
        repo: &RepoId,
        branch: &BranchName,
        path: &RepoPath,
    ) -> Result<Vec<CommitRecord>, ForgeError> {
        let url = self.repo_url(repo, "commits");
        let commits: Vec<GitHubCommit> = self
            .get_all_pages(&url, &[("sha", branch.as_str()), ("path", path.as_str())])
            .await?;
        debug!(%repo, %branch, %path, count = commits.len(), "listed commits");
        commits
            .into_iter()
            .map(|c| c.into_record(path.clone()))
            .collect()
    }

    async fn get_commit(&self, repo: &RepoId, id: &CommitId) -> Result<CommitDetail, ForgeError> {
        let url = self.repo_url(repo, &format!("commits/{}", id));
        let commit: GitHubCommit = self.get_json(&url, &[]).await?;
        commit.into_detail()
    }

    async fn get_diff(
        &self,
        repo: &RepoId,
        path: &RepoPath,
        old: &CommitId,
        new: &CommitId,
    ) -> Result<String, ForgeError> {
        let url = self.repo_url(repo, &format!("compare/{}...{}", old, new));
        let comparison: GitHubComparison = self.get_json(&url, &[]).await?;
        let patch = comparison
            .files
            .into_iter()
            .find(|f| f.filename == path.as_str())
            .and_then(|f| f.patch);
        debug!(%repo, %path, old = old.short(), new = new.short(), changed = patch.is_some(), "compared commits");
        Ok(match patch {
            Some(patch) => format!("--- a/{}\n+++ b/{}\n{}", path, path, patch),
            None => String::new(),
        })
    }

    async fn rollback(
        &self,
        repo: &RepoId,
        request: RollbackRequest,
    ) -> Result<RollbackOutcome, ForgeError> {
        let target = self
            .get_file_content(repo, request.target.as_str(), &request.path)
            .await?;

        // A file deleted since the target commit is recreated without a sha.
        let current_sha = match self
            .get_file_content(repo, request.branch.as_str(), &request.path)
            .await
        {
            Ok(current) => Some(current.token),
            Err(ForgeError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        debug!(%repo, branch = %request.branch, path = %request.path, target = request.target.short(), "rolling back");
        let written = self
            .put_contents(
                repo,
                &request.branch,
                &request.path,
                current_sha.as_ref().map(ContentToken::as_str),
                &request.message,
                &target.content,
            )
            .await?;

        Ok(RollbackOutcome {
            new_token: parse_token(written.content.sha)?,
            new_commit: CommitRecord {
                id: parse_commit_id(written.commit.sha)?,
                author: written.commit.author.name,
                message: written.commit.message,
                timestamp: written.commit.author.date,
                path: request.path,
            },
        })
    }

    async fn list_branches(&self, repo: &RepoId) -> Result<Vec<Branch>, ForgeError> {
        let url = self.repo_url(repo, "branches");
        let branches: Vec<GitHubBranch> = self.get_all_pages(&url, &[]).await?;
        branches.into_iter().map(Branch::try_from).collect()
    }

    async fn create_branch(
        &self,
        repo: &RepoId,
        name: &BranchName,
        from: &BranchName,
    ) -> Result<Branch, ForgeError> {
        let tip = self.branch_tip(repo, from).await?;
        let url = self.repo_url(repo, "git/refs");
        let body = CreateRefBody {
            git_ref: format!("refs/heads/{}", name),
            sha: tip.as_str(),
        };
        debug!(%repo, %name, %from, "creating branch");
        let response = self.send_json(Method::POST, &url, Some(&body)).await?;
        let created: GitHubRef = self.handle_response(response).await?;
        Ok(Branch {
            name: name.clone(),
            tip: Some(parse_commit_id(created.object.sha)?),
            protected: false,
        })
    }

    async fn delete_branch(&self, repo: &RepoId, name: &BranchName) -> Result<(), ForgeError> {
        let url = self.repo_url(repo, &format!("git/refs/heads/{}", name));
        debug!(%repo, %name, "deleting branch");
        let response = self.send_json::<()>(Method::DELETE, &url, None).await?;
        self.handle_empty_response(response).await
    }
}

/// Decode GitHub's base64 file content (wrapped at 60 columns) as UTF-8.
fn decode_content(encoded: &str) -> Result<String, ForgeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(compact)
        .map_err(|e| ForgeError::ApiError {
            status: 200,
            message: format!("invalid base64 content: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|_| ForgeError::ApiError {
        status: 200,
        message: "file is not valid UTF-8 text".into(),
    })
}

fn parse_token(sha: String) -> Result<ContentToken, ForgeError> {
    ContentToken::new(sha).map_err(|e| ForgeError::ApiError {
        status: 200,
        message: e.to_string(),
    })
}

fn parse_commit_id(sha: String) -> Result<CommitId, ForgeError> {
    CommitId::new(sha).map_err(|e| ForgeError::ApiError {
        status: 200,
        message: e.to_string(),
    })
}

/// Parse a GitHub remote URL to extract owner and repo.
///
/// Supports SSH (`git@github.com:owner/repo.git`, `ssh://git@github.com/owner/repo`)
/// and HTTPS (`https://github.com/owner/repo.git`).
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("git@github.com:")
        .or_else(|| url.strip_prefix("ssh://git@github.com/"))
        .or_else(|| url.strip_prefix("https://github.com/"))
        .or_else(|| url.strip_prefix("http://github.com/"))?;
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    let (owner, repo) = rest.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Parse a GitHub remote URL into a [`RepoId`].
pub fn repo_id_from_url(url: &str) -> Option<RepoId> {
    let (owner, name) = parse_github_url(url)?;
    RepoId::new(owner, name).ok()
}

// =============================================================================
// GitHub API Request/Response Types
// =============================================================================

#[derive(Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

#[derive(Serialize)]
struct DeleteContentsBody<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<GitHubContentItem>),
    File(GitHubContentItem),
}

#[derive(Deserialize)]
struct GitHubContentItem {
    name: String,
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Option<String>,
}

impl TryFrom<GitHubContentItem> for FileEntry {
    type Error = ForgeError;

    fn try_from(item: GitHubContentItem) -> Result<Self, Self::Error> {
        let kind = match item.kind.as_str() {
            "file" => FileKind::File,
            "dir" => FileKind::Dir,
            _ => FileKind::Other,
        };
        let path = RepoPath::new(item.path).map_err(|e| ForgeError::ApiError {
            status: 200,
            message: e.to_string(),
        })?;
        Ok(FileEntry {
            name: item.name,
            kind,
            path,
            // The contents API does not report modification times.
            last_modified: None,
        })
    }
}

#[derive(Deserialize)]
struct GitHubWriteResponse {
    content: GitHubWrittenContent,
    commit: GitHubGitCommit,
}

#[derive(Deserialize)]
struct GitHubWrittenContent {
    sha: String,
}

#[derive(Deserialize)]
struct GitHubGitCommit {
    sha: String,
    message: String,
    author: GitHubSignature,
}

#[derive(Deserialize)]
struct GitHubSignature {
    name: String,
    date: DateTime<Utc>,
}

#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: GitHubCommitData,
    #[serde(default)]
    parents: Vec<GitHubParent>,
    #[serde(default)]
    files: Vec<GitHubFile>,
}

#[derive(Deserialize)]
struct GitHubCommitData {
    message: String,
    author: GitHubSignature,
}

#[derive(Deserialize)]
struct GitHubParent {
    sha: String,
}

#[derive(Deserialize)]
struct GitHubFile {
    filename: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    additions: u32,
    #[serde(default)]
    deletions: u32,
    #[serde(default)]
    patch: Option<String>,
}

impl GitHubCommit {
    fn into_record(self, path: RepoPath) -> Result<CommitRecord, ForgeError> {
        Ok(CommitRecord {
            id: parse_commit_id(self.sha)?,
            author: self.commit.author.name,
            message: self.commit.message,
            timestamp: self.commit.author.date,
            path,
        })
    }

    fn into_detail(self) -> Result<CommitDetail, ForgeError> {
        let parents = self
            .parents
            .into_iter()
            .map(|p| parse_commit_id(p.sha))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CommitDetail {
            id: parse_commit_id(self.sha)?,
            author: self.commit.author.name,
            message: self.commit.message,
            timestamp: self.commit.author.date,
            parents,
            files: self
                .files
                .into_iter()
                .map(|f| ChangedFile {
                    path: f.filename,
                    status: f.status,
                    additions: f.additions,
                    deletions: f.deletions,
                })
                .collect(),
        })
    }
}

#[derive(Deserialize)]
struct GitHubComparison {
    #[serde(default)]
    files: Vec<GitHubFile>,
}

#[derive(Deserialize)]
struct GitHubBranch {
    name: String,
    commit: GitHubRefObject,
    #[serde(default)]
    protected: bool,
}

impl TryFrom<GitHubBranch> for Branch {
    type Error = ForgeError;

    fn try_from(branch: GitHubBranch) -> Result<Self, Self::Error> {
        let name = BranchName::new(branch.name).map_err(|e| ForgeError::ApiError {
            status: 200,
            message: e.to_string(),
        })?;
        Ok(Branch {
            name,
            tip: Some(parse_commit_id(branch.commit.sha)?),
            protected: branch.protected,
        })
    }
}

#[derive(Deserialize)]
struct GitHubRef {
    object: GitHubRefObject,
}

#[derive(Deserialize)]
struct GitHubRefObject {
    sha: String,
}

#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parse_github_url {
        use super::*;

        #[test]
        fn ssh_with_git_suffix() {
            let result = parse_github_url("git@github.com:octocat/hello-world.git");
            assert_eq!(
                result,
                Some(("octocat".to_string(), "hello-world".to_string()))
            );
        }

        #[test]
        fn ssh_url_form() {
            let result = parse_github_url("ssh://git@github.com/octocat/hello-world.git");
            assert_eq!(
                result,
                Some(("octocat".to_string(), "hello-world".to_string()))
            );
        }

        #[test]
        fn https_without_git_suffix() {
            let result = parse_github_url("https://github.com/octocat/hello-world");
            assert_eq!(
                result,
                Some(("octocat".to_string(), "hello-world".to_string()))
            );
        }

        #[test]
        fn non_github_url() {
            assert!(parse_github_url("git@gitlab.com:owner/repo.git").is_none());
            assert!(parse_github_url("https://bitbucket.org/owner/repo").is_none());
        }

        #[test]
        fn invalid_format() {
            assert!(parse_github_url("not a url").is_none());
            assert!(parse_github_url("https://github.com/").is_none());
            assert!(parse_github_url("https://github.com/owner").is_none());
            assert!(parse_github_url("https://github.com/owner/repo/tree/main").is_none());
        }

        #[test]
        fn repo_id() {
            let repo = repo_id_from_url("git@github.com:acme/gateway.config.git").unwrap();
            assert_eq!(repo.to_string(), "acme/gateway.config");
        }
    }

    mod github_forge {
        use super::*;

        fn repo() -> RepoId {
            RepoId::parse("octocat/hello-world").unwrap()
        }

        #[test]
        fn with_token_creates_forge() {
            let forge = GitHubForge::with_token("token");
            assert_eq!(forge.name(), "github");
            assert_eq!(forge.api_base(), DEFAULT_API_BASE);
            assert!(!forge.has_token_provider());
        }

        #[test]
        fn api_base_trailing_slash_trimmed() {
            let forge =
                GitHubForge::with_token("token").with_api_base("https://ghe.example.com/api/v3/");
            assert_eq!(forge.api_base(), "https://ghe.example.com/api/v3");
        }

        #[test]
        fn repo_url_format() {
            let forge = GitHubForge::with_token("token");
            assert_eq!(
                forge.repo_url(&repo(), "branches"),
                "https://api.github.com/repos/octocat/hello-world/branches"
            );
        }

        #[test]
        fn contents_url_encodes_segments() {
            let forge = GitHubForge::with_token("token");
            let path = RepoPath::new("conf dir/app#1.yaml").unwrap();
            let url = forge.contents_url(&repo(), &path).unwrap();
            assert_eq!(
                url.as_str(),
                "https://api.github.com/repos/octocat/hello-world/contents/conf%20dir/app%231.yaml"
            );
        }

        #[test]
        fn contents_url_root() {
            let forge = GitHubForge::with_token("token");
            let url = forge.contents_url(&repo(), &RepoPath::root()).unwrap();
            assert!(url.as_str().ends_with("/contents"));
        }

        #[test]
        fn debug_redacts_static_token() {
            let forge = GitHubForge::with_token("secret_token_abc123");
            let debug_output = format!("{:?}", forge);
            assert!(!debug_output.contains("secret_token_abc123"));
            assert!(debug_output.contains("has_static_token"));
        }
    }

    mod content_decoding {
        use super::*;

        #[test]
        fn decodes_wrapped_base64() {
            let encoded = "cm91dGVz\nOiBbXQo=\n";
            assert_eq!(decode_content(encoded).unwrap(), "routes: []\n");
        }

        #[test]
        fn rejects_invalid_base64() {
            assert!(decode_content("!!!").is_err());
        }

        #[test]
        fn rejects_non_utf8() {
            let encoded = BASE64_STANDARD.encode([0xff, 0xfe]);
            assert!(decode_content(&encoded).is_err());
        }
    }

    mod github_forge_with_provider {
        use super::*;

        struct StaticProvider;

        #[async_trait]
        impl TokenProvider for StaticProvider {
            async fn bearer_token(&self) -> Result<String, crate::auth::AuthError> {
                Ok("provider_token".into())
            }

            fn is_authenticated(&self) -> bool {
                true
            }

            fn host(&self) -> &str {
                "github.com"
            }
        }

        #[test]
        fn new_with_provider_creates_forge() {
            let forge = GitHubForge::new_with_provider(Arc::new(StaticProvider));
            assert!(forge.has_token_provider());
        }

        #[tokio::test]
        async fn headers_use_provider_token() {
            let forge = GitHubForge::new_with_provider(Arc::new(StaticProvider));
            let headers = forge.headers().await.unwrap();
            assert_eq!(
                headers.get(AUTHORIZATION).unwrap().to_str().unwrap(),
                "Bearer provider_token"
            );
        }
    }
}
