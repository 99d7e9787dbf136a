//! Drive v3 REST implementation of [`DriveClient`].

use async_trait::async_trait;
use serde::Deserialize;

use crate::traits::{ChunkOutcome, DriveClient, DriveError, DriveFileMeta, DriveResult};

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const MULTIPART_BOUNDARY: &str = "vitrina_related_boundary";

/// HTTP client for the Drive v3 API. Authenticates every call with a bearer
/// access token supplied at construction.
#[derive(Clone)]
pub struct HttpDriveClient {
    client: reqwest::Client,
    api_base: String,
    upload_base: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct FileResource {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "mimeType", default)]
    mime_type: String,
    /// Drive serializes int64 fields as JSON strings.
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    parents: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileResource>,
}

impl HttpDriveClient {
    pub fn new(api_base: &str, upload_base: &str, access_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            upload_base: upload_base.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    async fn error_from(response: reqwest::Response) -> DriveError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        DriveError::Api { status, message }
    }
}

#[async_trait]
impl DriveClient for HttpDriveClient {
    #[tracing::instrument(skip(self), fields(drive.parent = %parent_id))]
    async fn ensure_folder(&self, parent_id: &str, name: &str) -> DriveResult<String> {
        // Drive query strings quote values with single quotes.
        let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
        let query = format!(
            "name = '{}' and '{}' in parents and mimeType = '{}' and trashed = false",
            escaped, parent_id, FOLDER_MIME
        );

        let response = self
            .client
            .get(format!("{}/files", self.api_base))
            .header("Authorization", self.bearer())
            .query(&[("q", query.as_str()), ("fields", "files(id, name)")])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let list: FileList = response.json().await?;
        if let Some(existing) = list.files.into_iter().next() {
            return Ok(existing.id);
        }

        let response = self
            .client
            .post(format!("{}/files", self.api_base))
            .header("Authorization", self.bearer())
            .json(&serde_json::json!({
                "name": name,
                "mimeType": FOLDER_MIME,
                "parents": [parent_id],
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let created: FileResource = response.json().await?;
        tracing::debug!(folder = %name, folder_id = %created.id, "Created Drive folder");
        Ok(created.id)
    }

    #[tracing::instrument(skip(self, data), fields(drive.folder = %folder_id, size = data.len()))]
    async fn upload_small(
        &self,
        folder_id: &str,
        name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> DriveResult<String> {
        // multipart/related body: JSON metadata part followed by the media
        // part, hand-assembled because reqwest only builds form-data.
        let metadata = serde_json::json!({ "name": name, "parents": [folder_id] });
        let mut body = Vec::with_capacity(data.len() + 512);
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n",
                b = MULTIPART_BOUNDARY,
                m = metadata
            )
            .as_bytes(),
        );
        body.extend_from_slice(
            format!(
                "--{b}\r\nContent-Type: {ct}\r\n\r\n",
                b = MULTIPART_BOUNDARY,
                ct = content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&data);
        body.extend_from_slice(format!("\r\n--{}--", MULTIPART_BOUNDARY).as_bytes());

        let response = self
            .client
            .post(format!("{}/files", self.upload_base))
            .header("Authorization", self.bearer())
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let created: FileResource = response.json().await?;
        Ok(created.id)
    }

    #[tracing::instrument(skip(self), fields(drive.folder = %folder_id, total_bytes))]
    async fn create_resumable_session(
        &self,
        folder_id: &str,
        name: &str,
        content_type: &str,
        total_bytes: u64,
    ) -> DriveResult<String> {
        let response = self
            .client
            .post(format!("{}/files", self.upload_base))
            .header("Authorization", self.bearer())
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", total_bytes.to_string())
            .query(&[("uploadType", "resumable")])
            .json(&serde_json::json!({ "name": name, "parents": [folder_id] }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let session_url = response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(DriveError::MissingSessionUrl)?;
        Ok(session_url)
    }

    #[tracing::instrument(skip(self, data), fields(content_range, size = data.len()))]
    async fn upload_chunk(
        &self,
        session_url: &str,
        content_range: &str,
        data: Vec<u8>,
    ) -> DriveResult<ChunkOutcome> {
        let response = self
            .client
            .put(session_url)
            .header("Content-Range", content_range)
            .body(data)
            .send()
            .await?;

        // 308 Resume Incomplete: the Range header holds the confirmed bytes.
        if response.status().as_u16() == 308 {
            let uploaded_bytes = response
                .headers()
                .get("Range")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_range_end)
                .map(|last| last + 1)
                .unwrap_or(0);
            return Ok(ChunkOutcome::Incomplete { uploaded_bytes });
        }

        if response.status().is_success() {
            let created: FileResource = response
                .json()
                .await
                .map_err(|e| DriveError::UnexpectedResponse(e.to_string()))?;
            return Ok(ChunkOutcome::Complete {
                file_id: created.id,
            });
        }

        Err(Self::error_from(response).await)
    }

    #[tracing::instrument(skip(self))]
    async fn get_file(&self, file_id: &str) -> DriveResult<DriveFileMeta> {
        let response = self
            .client
            .get(format!("{}/files/{}", self.api_base, file_id))
            .header("Authorization", self.bearer())
            .query(&[("fields", "id, name, mimeType, size, parents")])
            .send()
            .await?;
        if response.status().as_u16() == 404 {
            return Err(DriveError::NotFound(file_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let resource: FileResource = response.json().await?;
        Ok(DriveFileMeta {
            id: resource.id,
            name: resource.name,
            mime_type: resource.mime_type,
            size_bytes: resource.size.and_then(|s| s.parse().ok()),
            parents: resource.parents,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn delete_file(&self, file_id: &str) -> DriveResult<()> {
        let response = self
            .client
            .delete(format!("{}/files/{}", self.api_base, file_id))
            .header("Authorization", self.bearer())
            .send()
            .await?;
        if response.status().as_u16() == 404 {
            return Err(DriveError::NotFound(file_id.to_string()));
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }
}

/// Parse the end offset out of a Drive `Range: bytes=0-12345` header.
fn parse_range_end(range: &str) -> Option<u64> {
    range
        .trim()
        .strip_prefix("bytes=")?
        .rsplit_once('-')?
        .1
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_header_end_offset_is_parsed() {
        assert_eq!(parse_range_end("bytes=0-2097151"), Some(2_097_151));
        assert_eq!(parse_range_end(" bytes=0-0"), Some(0));
        assert_eq!(parse_range_end("units=0-5"), None);
        assert_eq!(parse_range_end("bytes=garbage"), None);
    }
}
