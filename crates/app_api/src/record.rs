//! File record resource model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Uploader name used when none was given
pub const ANONYMOUS: &str = "Anonymous";

/// Kind of document a record points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Image,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Pdf => f.write_str("pdf"),
            FileType::Image => f.write_str("image"),
        }
    }
}

/// One uploaded document, as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub file_name: String,
    /// ISO-8601 timestamp
    pub uploaded_date: String,
    #[serde(default = "anonymous", deserialize_with = "uploader_or_anonymous")]
    pub uploaded_by: String,
    pub file_type: FileType,
    pub file_url: String,
}

impl FileRecord {
    /// Parsed upload instant; `None` if the stored timestamp is malformed
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.uploaded_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn is_pdf(&self) -> bool {
        self.file_type == FileType::Pdf
    }
}

/// Partial update for `PUT /files/{id}`; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<FileType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

fn anonymous() -> String {
    ANONYMOUS.to_string()
}

fn uploader_or_anonymous<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let name = Option::<String>::deserialize(de)?;
    Ok(name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(anonymous))
}

// Backends that auto-assign ids may hand back numbers
fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Id::deserialize(de)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_backend_shape() {
        let record: FileRecord = serde_json::from_value(json!({
            "id": "1700000000000",
            "fileName": "invoice.pdf",
            "uploadedDate": "2024-01-15T10:30:00.000Z",
            "uploadedBy": "Dana",
            "fileType": "pdf",
            "fileUrl": "file:///tmp/invoice.pdf"
        }))
        .unwrap();

        assert_eq!(record.id, "1700000000000");
        assert!(record.is_pdf());
        assert_eq!(
            record.uploaded_at().unwrap().to_rfc3339(),
            "2024-01-15T10:30:00+00:00"
        );
    }

    #[test]
    fn test_missing_or_null_uploader_is_anonymous() {
        let missing: FileRecord = serde_json::from_value(json!({
            "id": 3, "fileName": "a.png", "uploadedDate": "x",
            "fileType": "image", "fileUrl": "u"
        }))
        .unwrap();
        assert_eq!(missing.id, "3");
        assert_eq!(missing.uploaded_by, ANONYMOUS);
        assert_eq!(missing.uploaded_at(), None);

        let null: FileRecord = serde_json::from_value(json!({
            "id": "4", "fileName": "b.png", "uploadedDate": "x", "uploadedBy": null,
            "fileType": "image", "fileUrl": "u"
        }))
        .unwrap();
        assert_eq!(null.uploaded_by, ANONYMOUS);
    }

    #[test]
    fn test_rejects_unknown_file_type() {
        let result = serde_json::from_value::<FileRecord>(json!({
            "id": "5", "fileName": "notes.txt", "uploadedDate": "x",
            "fileType": "text", "fileUrl": "u"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = RecordPatch { file_name: Some("renamed.pdf".into()), ..Default::default() };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"fileName": "renamed.pdf"}));
    }
}
