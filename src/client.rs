//! Openload API client
//!
//! Each public operation issues one outbound HTTP request (uploads are an
//! explicit two-stage protocol) and passes the decoded envelope payload
//! through to the caller. The client is stateless between calls and holds no
//! token or session data beyond the credential pair it was built with.

use crate::error::{Error, Result};
use crate::types::{
    AccountInfo, Conversion, DownloadLink, DownloadTicket, FileInfo, FolderListing, RemoteUpload,
    RemoteUploadStatus, UploadTarget,
};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Default API endpoint
const DEFAULT_BASE_URL: &str = "https://api.openload.co/1";

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on the raw-body context attached to protocol errors
const PROTOCOL_BODY_LIMIT: usize = 512;

/// Openload API client
///
/// Cloning is cheap and clones share the underlying connection pool, so a
/// single client (or any number of clones) can be used from concurrent tasks
/// without coordination.
#[derive(Clone)]
pub struct OpenloadClient {
    http: reqwest::Client,
    login: String,
    key: String,
    base_url: String,
}

// Credentials stay out of Debug output.
impl fmt::Debug for OpenloadClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenloadClient")
            .field("login", &"<redacted>")
            .field("key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for [`OpenloadClient`]
#[derive(Debug, Clone)]
pub struct OpenloadClientBuilder {
    login: String,
    key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenloadClientBuilder {
    fn new(login: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            key: key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the API endpoint. Mainly useful for tests.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every request by `timeout`. Defaults to 30 seconds; a request
    /// that exceeds it fails with [`Error::Timeout`].
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate the credentials and build the client. Performs no I/O.
    pub fn build(self) -> Result<OpenloadClient> {
        if self.login.is_empty() {
            return Err(Error::Config("API login must not be empty".to_string()));
        }
        if self.key.is_empty() {
            return Err(Error::Config("API key must not be empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(OpenloadClient {
            http,
            login: self.login,
            key: self.key,
            base_url: self.base_url,
        })
    }
}

/// Optional parameters accepted by the upload endpoints.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Folder id to upload into.
    pub folder: Option<String>,
    /// Expected sha1; the service rejects the upload on mismatch.
    pub sha1: Option<String>,
    /// Restrict the returned target to plain http.
    pub httponly: bool,
}

impl UploadOptions {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(folder) = &self.folder {
            params.push(("folder", folder.clone()));
        }
        if let Some(sha1) = &self.sha1 {
            params.push(("sha1", sha1.clone()));
        }
        if self.httponly {
            params.push(("httponly", "true".to_string()));
        }
        params
    }
}

/// Optional parameters accepted by `remotedl/add`.
#[derive(Debug, Clone, Default)]
pub struct RemoteUploadOptions {
    /// Folder id to upload into.
    pub folder: Option<String>,
    /// Additional HTTP headers for the remote fetch, newline separated.
    pub headers: Option<String>,
}

impl RemoteUploadOptions {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(folder) = &self.folder {
            params.push(("folder", folder.clone()));
        }
        if let Some(headers) = &self.headers {
            params.push(("headers", headers.clone()));
        }
        params
    }
}

/// Filter for `remotedl/status`.
#[derive(Debug, Clone, Default)]
pub struct RemoteUploadStatusQuery {
    /// Maximum number of results (service default 5, maximum 100).
    pub limit: Option<u32>,
    /// Restrict to a single remote upload id.
    pub id: Option<String>,
}

impl RemoteUploadStatusQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(id) = &self.id {
            params.push(("id", id.clone()));
        }
        params
    }
}

/// Outer JSON structure every API response conforms to.
#[derive(Debug, Deserialize)]
struct Envelope {
    status: u16,
    msg: String,
    #[serde(default)]
    result: serde_json::Value,
}

impl OpenloadClient {
    /// Create a new client with the default endpoint and timeout.
    ///
    /// Fails fast with [`Error::Config`] when either credential is empty;
    /// no network traffic happens here.
    pub fn new(login: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        Self::builder(login, key).build()
    }

    /// Start building a client with a custom endpoint or timeout.
    pub fn builder(
        login: impl Into<String>,
        key: impl Into<String>,
    ) -> OpenloadClientBuilder {
        OpenloadClientBuilder::new(login, key)
    }

    /// Everything account related (storage used, traffic, balance, ...).
    pub async fn account_info(&self) -> Result<AccountInfo> {
        self.get("account/info", &[]).await
    }

    /// Info for a specific file (size, name, status, ...).
    pub async fn file_info(&self, file_id: &str) -> Result<FileInfo> {
        let file_id = non_empty(file_id, "file id")?;
        self.get("file/info", &[("file", file_id.to_string())]).await
    }

    /// Request an upload target with default options.
    pub async fn upload_link(&self) -> Result<UploadTarget> {
        self.upload_link_with(&UploadOptions::default()).await
    }

    /// Request an upload target; the returned URL is where the file bytes
    /// must be POSTed. First stage of [`upload_file`](Self::upload_file).
    pub async fn upload_link_with(&self, options: &UploadOptions) -> Result<UploadTarget> {
        self.get("file/ul", &options.params()).await
    }

    /// Upload a local file and return the descriptor of the stored copy.
    pub async fn upload_file(&self, path: impl AsRef<Path>) -> Result<FileInfo> {
        self.upload_file_with(path, &UploadOptions::default()).await
    }

    /// Upload a local file with explicit options. Negotiates an upload
    /// target via [`upload_link_with`](Self::upload_link_with), then streams
    /// the bytes to it as a multipart form.
    pub async fn upload_file_with(
        &self,
        path: impl AsRef<Path>,
        options: &UploadOptions,
    ) -> Result<FileInfo> {
        let path = path.as_ref();

        // Local readability is checked before any network call.
        let file = File::open(path).await?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("not a regular file: {}", path.display()),
            )));
        }

        let target = self.upload_link_with(options).await?;
        self.upload_to(&target, path, file, metadata.len()).await
    }

    /// Second upload stage: stream `file` to a previously negotiated target.
    async fn upload_to(
        &self,
        target: &UploadTarget,
        path: &Path,
        file: File,
        len: u64,
    ) -> Result<FileInfo> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("file")
            .to_string();

        let mut part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), len)
            .file_name(file_name);
        if let Some(mime) = mime_guess::from_path(path).first() {
            part = part.mime_str(mime.essence_str())?;
        }
        let form = Form::new().part("upload_file", part);

        debug!(url = %target.url, size = len, "uploading file");
        let response = self.http.post(&target.url).multipart(form).send().await?;
        Self::process_response(response).await
    }

    /// Prepare a file download. The returned ticket is consumed by
    /// [`download_link`](Self::download_link).
    pub async fn prepare_download(&self, file_id: &str) -> Result<DownloadTicket> {
        let file_id = non_empty(file_id, "file id")?;
        self.get("file/dlticket", &[("file", file_id.to_string())])
            .await
    }

    /// Exchange a download ticket for a direct link. `captcha_response` is
    /// required when [`prepare_download`](Self::prepare_download) returned a
    /// captcha URL.
    pub async fn download_link(
        &self,
        file_id: &str,
        ticket: &str,
        captcha_response: Option<&str>,
    ) -> Result<DownloadLink> {
        let file_id = non_empty(file_id, "file id")?;
        let ticket = non_empty(ticket, "download ticket")?;

        let mut params = vec![
            ("file", file_id.to_string()),
            ("ticket", ticket.to_string()),
        ];
        if let Some(captcha) = captcha_response {
            params.push(("captcha_response", captcha.to_string()));
        }
        self.get("file/dl", &params).await
    }

    /// Queue a server-side fetch of `remote_url` into the account.
    pub async fn remote_upload(&self, remote_url: &str) -> Result<RemoteUpload> {
        self.remote_upload_with(remote_url, &RemoteUploadOptions::default())
            .await
    }

    /// Queue a server-side fetch with explicit options.
    pub async fn remote_upload_with(
        &self,
        remote_url: &str,
        options: &RemoteUploadOptions,
    ) -> Result<RemoteUpload> {
        let remote_url = non_empty(remote_url, "remote url")?;
        let mut params = vec![("url", remote_url.to_string())];
        params.extend(options.params());
        self.get("remotedl/add", &params).await
    }

    /// Status of queued remote uploads, keyed by job id.
    pub async fn remote_upload_status(
        &self,
        query: &RemoteUploadStatusQuery,
    ) -> Result<HashMap<String, RemoteUploadStatus>> {
        self.get("remotedl/status", &query.params()).await
    }

    /// List files and folders. `None` lists the home folder.
    pub async fn list_folder(&self, folder_id: Option<&str>) -> Result<FolderListing> {
        let params = match folder_id {
            Some(folder) => vec![("folder", folder.to_string())],
            None => Vec::new(),
        };
        self.get("file/listfolder", &params).await
    }

    /// Start converting an uploaded file to a browser-streamable format.
    /// Returns whether the conversion was accepted.
    pub async fn convert_file(&self, file_id: &str) -> Result<bool> {
        let file_id = non_empty(file_id, "file id")?;
        self.get("file/convert", &[("file", file_id.to_string())])
            .await
    }

    /// Conversions currently running in a folder. `None` means home.
    pub async fn running_conversions(
        &self,
        folder_id: Option<&str>,
    ) -> Result<Vec<Conversion>> {
        let params = match folder_id {
            Some(folder) => vec![("folder", folder.to_string())],
            None => Vec::new(),
        };
        self.get("file/runningconverts", &params).await
    }

    /// URL of the video splash image (thumbnail) for a file.
    pub async fn splash_image(&self, file_id: &str) -> Result<String> {
        let file_id = non_empty(file_id, "file id")?;
        self.get("file/getsplash", &[("file", file_id.to_string())])
            .await
    }

    /// Issue a GET request against `path` with credentials plus `params` as
    /// query parameters, then validate and unwrap the envelope.
    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%path, "api request");

        let response = self
            .http
            .get(&url)
            .query(&[("login", self.login.as_str()), ("key", self.key.as_str())])
            .query(params)
            .send()
            .await?;

        Self::process_response(response).await
    }

    /// Decode an HTTP body as the API envelope and classify its status.
    async fn process_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let body = response.text().await?;

        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| Error::Protocol {
            reason: format!("response is not an API envelope: {e}"),
            body: truncate_body(&body),
        })?;

        match envelope.status {
            200..=299 => {
                serde_json::from_value(envelope.result).map_err(|e| Error::Protocol {
                    reason: format!("unexpected result payload: {e}"),
                    body: truncate_body(&body),
                })
            }
            403 => Err(Error::Authentication(envelope.msg)),
            404 => Err(Error::NotFound(envelope.msg)),
            status => Err(Error::RemoteRejection {
                status,
                message: envelope.msg,
            }),
        }
    }
}

fn non_empty<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(Error::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(value)
}

fn truncate_body(body: &str) -> String {
    if body.len() <= PROTOCOL_BODY_LIMIT {
        return body.to_string();
    }
    let mut end = PROTOCOL_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
