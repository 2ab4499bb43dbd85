//! openload - Typed async client for the Openload file hosting API
//!
//! This library wraps the service's HTTP endpoints (account info, uploads,
//! downloads, remote uploads, folder listing, conversions) behind a small
//! typed client. Every response is validated against the API's
//! status/msg/result envelope before its payload is handed back, and every
//! failure is classified into one [`Error`] variant.
//!
//! ```no_run
//! use openload::OpenloadClient;
//!
//! # async fn example() -> openload::Result<()> {
//! let client = OpenloadClient::new("api_login", "api_key")?;
//!
//! let account = client.account_info().await?;
//! println!("storage used: {:?}", account.storage_used);
//!
//! let uploaded = client.upload_file("video.mp4").await?;
//! let info = client.file_info(uploaded.id.as_deref().unwrap_or_default()).await?;
//! println!("{} is {:?}", info.name, info.status);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use client::{
    OpenloadClient, OpenloadClientBuilder, RemoteUploadOptions, RemoteUploadStatusQuery,
    UploadOptions,
};
pub use error::{Error, Result};
pub use types::{
    AccountInfo, Conversion, DownloadLink, DownloadTicket, FileInfo, FolderEntry, FolderFile,
    FolderListing, RemoteUpload, RemoteUploadStatus, Traffic, UploadTarget,
};
