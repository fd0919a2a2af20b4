//! Descriptive header records of a document.

use serde::{Deserialize, Serialize};

/// Bibliographic description of the source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDesc {
    pub author: Option<String>,
    pub title: Option<String>,
    pub publisher: Option<String>,
    pub section: Option<String>,
    pub location: Option<String>,
    pub magazine: Option<String>,
    pub filename: Option<String>,
    pub filetype: Option<String>,
    pub pages: Option<u32>,
    pub creationtime: Option<String>,
}

impl FileDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Publication identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Public {
    pub public_id: Option<String>,
    pub uri: Option<String>,
}

impl Public {
    pub fn new(public_id: impl Into<String>) -> Self {
        Public {
            public_id: Some(public_id.into()),
            uri: None,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}
