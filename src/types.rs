//! Response payload types for the Openload API
//!
//! Every type here is an immutable snapshot of remote-reported data. Fields
//! the API is known to return are typed; anything else lands in the `extra`
//! map so new remote fields never break decoding.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Account-level information reported by `account/info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub extid: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Registration date, mirrored verbatim from the remote response.
    #[serde(default)]
    pub signup_at: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub storage_left: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub storage_used: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub balance: Option<String>,
    #[serde(default)]
    pub traffic: Option<Traffic>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Traffic counters nested in [`AccountInfo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traffic {
    #[serde(default)]
    pub left: i64,
    #[serde(default)]
    pub used_24h: i64,
}

/// Per-file information, returned by `file/info` and by a completed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Identifier assigned by the service at upload time.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub size: Option<u64>,
    /// Per-file status; the API uses both numeric codes and symbolic strings.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Upload target negotiated via `file/ul`. The file bytes must be POSTed to
/// `url`, which is distinct from the regular API endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadTarget {
    pub url: String,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Download preparation ticket from `file/dlticket`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadTicket {
    pub ticket: String,
    /// Set when the service wants a captcha solved before `file/dl`.
    #[serde(default)]
    pub captcha_url: Option<String>,
    #[serde(default)]
    pub wait_time: Option<u64>,
    #[serde(default)]
    pub valid_until: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Direct download link from `file/dl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadLink {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub size: Option<u64>,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Remote upload job handle from `remotedl/add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUpload {
    #[serde(deserialize_with = "de::string")]
    pub id: String,
    #[serde(default, rename = "folderid", deserialize_with = "de::opt_string")]
    pub folder_id: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// State of one remote upload job, keyed by job id in `remotedl/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUploadStatus {
    #[serde(deserialize_with = "de::string")]
    pub id: String,
    #[serde(default, rename = "remoteurl")]
    pub remote_url: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub status: Option<String>,
    #[serde(default, rename = "folderid", deserialize_with = "de::opt_string")]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Contents of a folder, from `file/listfolder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderListing {
    #[serde(default)]
    pub folders: Vec<FolderEntry>,
    #[serde(default)]
    pub files: Vec<FolderFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderEntry {
    #[serde(deserialize_with = "de::string")]
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderFile {
    pub name: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default, rename = "folderid", deserialize_with = "de::opt_string")]
    pub folder_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub upload_at: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub size: Option<u64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub download_count: Option<u64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, rename = "linkextid")]
    pub link_ext_id: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// One running conversion job, from `file/runningconverts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    #[serde(deserialize_with = "de::string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub status: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_u64")]
    pub retries: Option<u64>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default, rename = "linkextid")]
    pub link_ext_id: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Deserialization adapters for wire-format quirks.
///
/// The API emits scalars inconsistently: the same field can arrive as a JSON
/// number or a string depending on the endpoint (`"size": "5114011"` in
/// folder listings, `"size": 123` in file info). These helpers normalize
/// both forms.
mod de {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!(
                "expected string or number, got {other}"
            ))),
        }
    }

    pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(D::Error::custom(format!(
                "expected string or number, got {other}"
            ))),
        }
    }

    pub fn opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected unsigned integer, got {n}"))),
            Some(Value::String(s)) => s
                .parse::<u64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("expected unsigned integer, got {s:?}"))),
            Some(other) => Err(D::Error::custom(format!(
                "expected number or string, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_info_accepts_numeric_and_string_scalars() {
        let from_number: FileInfo =
            serde_json::from_value(json!({"name": "a.txt", "size": 123, "status": 200})).unwrap();
        let from_string: FileInfo =
            serde_json::from_value(json!({"name": "a.txt", "size": "123", "status": "200"}))
                .unwrap();

        assert_eq!(from_number.size, Some(123));
        assert_eq!(from_number.status.as_deref(), Some("200"));
        assert_eq!(from_number, from_string);
    }

    #[test]
    fn account_info_decodes_documented_sample() {
        let info: AccountInfo = serde_json::from_value(json!({
            "extid": "extuserid",
            "email": "jeff@openload.io",
            "signup_at": "2015-01-09 23:59:54",
            "storage_left": -1,
            "storage_used": "32922117680",
            "traffic": {"left": -1, "used_24h": 0},
            "balance": 0
        }))
        .unwrap();

        assert_eq!(info.email.as_deref(), Some("jeff@openload.io"));
        assert_eq!(info.storage_left.as_deref(), Some("-1"));
        assert_eq!(info.storage_used.as_deref(), Some("32922117680"));
        assert_eq!(info.balance.as_deref(), Some("0"));
        assert_eq!(info.traffic, Some(Traffic { left: -1, used_24h: 0 }));
    }

    #[test]
    fn unknown_fields_are_preserved_in_extra() {
        let info: FileInfo = serde_json::from_value(json!({
            "name": "a.txt",
            "cstatus": "ok",
            "download_count": "48"
        }))
        .unwrap();

        assert_eq!(info.extra.get("cstatus"), Some(&json!("ok")));
        assert_eq!(info.extra.get("download_count"), Some(&json!("48")));
    }

    #[test]
    fn folder_file_parses_stringly_numbers() {
        let file: FolderFile = serde_json::from_value(json!({
            "name": "big_buck_bunny.mp4.mp4",
            "sha1": "c6531f5ce9669d6547023d92aea4805b7c45d133",
            "folderid": "4258",
            "upload_at": "1419791256",
            "status": "active",
            "size": "5114011",
            "content_type": "video/mp4",
            "download_count": "48",
            "link": "https://openload.co/f/UPPjeAk--30/big_buck_bunny.mp4.mp4",
            "linkextid": "UPPjeAk--30"
        }))
        .unwrap();

        assert_eq!(file.size, Some(5_114_011));
        assert_eq!(file.download_count, Some(48));
        assert_eq!(file.link_ext_id.as_deref(), Some("UPPjeAk--30"));
    }

    #[test]
    fn remote_upload_status_keeps_service_fields() {
        let status: RemoteUploadStatus = serde_json::from_value(json!({
            "id": "24",
            "remoteurl": "http://proof.ovh.net/files/100Mio.dat",
            "status": "new",
            "folderid": "4248",
            "added": "2015-02-21 09:20:26",
            "last_update": "2015-02-21 09:20:26",
            "extid": false,
            "url": false
        }))
        .unwrap();

        assert_eq!(status.id, "24");
        assert_eq!(status.status.as_deref(), Some("new"));
        assert_eq!(status.extra.get("extid"), Some(&json!(false)));
    }
}
