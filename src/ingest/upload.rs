use std::fs;
use std::path::Path;

/// Raw upload as handed over by the transport: bytes plus a declared content type.
#[derive(Debug, Clone)]
pub struct Upload {
    bytes: Vec<u8>,
    content_type: Option<String>
}

impl Upload {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string)
        }
    }

    /// Reads a local file, declaring the content type a browser would send for its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = fs::read(path)?;
        let extension = path.extension()
            .and_then(|extension| extension.to_str())
            .map(str::to_lowercase);

        let content_type = match extension.as_deref() {
            Some("csv") => "text/csv",
            Some("txt") => "text/plain",
            Some("xls") => "application/vnd.ms-excel",
            Some("json") => "application/json",
            _ => "application/octet-stream"
        };

        Ok(Self::new(bytes, Some(content_type)))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
