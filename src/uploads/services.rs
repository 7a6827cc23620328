use anyhow::Context;
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::storage::StorageClient;

pub struct UploadItem<'a> {
    pub file_name: Option<&'a str>,
    pub content_type: &'a str,
    pub body: Bytes,
}

#[derive(Debug, Serialize)]
pub struct StoredUpload {
    pub key: String,
    pub url: String,
}

pub async fn store_upload(
    storage: &dyn StorageClient,
    item: UploadItem<'_>,
) -> anyhow::Result<StoredUpload> {
    anyhow::ensure!(!item.body.is_empty(), "empty upload");

    let key = object_key(Uuid::new_v4(), item.file_name, item.content_type);
    storage
        .put_object(&key, item.body, item.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    let url = storage.url_for(&key).await?;

    debug!(%key, "upload stored");
    Ok(StoredUpload { key, url })
}

/// `<id>-<sanitized original name>`; the id keeps same-named uploads apart.
fn object_key(id: Uuid, file_name: Option<&str>, content_type: &str) -> String {
    let name = file_name.map(sanitize_file_name).filter(|n| !n.is_empty());
    match name {
        Some(name) => format!("{id}-{name}"),
        None => format!("{id}.{}", ext_from_mime(content_type).unwrap_or("bin")),
    }
}

/// Keeps the last path component and replaces anything outside `[A-Za-z0-9._-]`.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_from_mime_known_and_unknown() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn sanitizing_strips_paths_and_odd_characters() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\pics\\my koi.png"), "my_koi.png");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name("дракон.jpg"), "______.jpg");
    }

    #[test]
    fn same_name_gets_distinct_keys() {
        let a = object_key(Uuid::new_v4(), Some("koi.png"), "image/png");
        let b = object_key(Uuid::new_v4(), Some("koi.png"), "image/png");
        assert_ne!(a, b);
        assert!(a.ends_with("-koi.png"));
    }

    #[test]
    fn nameless_upload_falls_back_to_mime_extension() {
        let id = Uuid::new_v4();
        assert_eq!(object_key(id, None, "image/webp"), format!("{id}.webp"));
        assert_eq!(object_key(id, Some("///"), "text/plain"), format!("{id}.bin"));
    }
}
