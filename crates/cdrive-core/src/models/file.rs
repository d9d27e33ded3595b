use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Display classification of a stored file. Only used for iconography.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Document,
    Video,
    #[default]
    #[serde(other)]
    Other,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Document => "document",
            FileKind::Video => "video",
            FileKind::Other => "other",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file as reported by the remote store.
///
/// `id` and `url` are opaque and never derived locally; `name` changes only
/// through a server-confirmed rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResource {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: FileKind,
}

/// Body of `PUT /files/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Success body of `DELETE /files/{id}`. Servers may answer with an empty body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}
