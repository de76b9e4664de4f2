use bytes::Bytes;
use serde::Serialize;

/// The three document kinds the upload surface accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::Pdf,
        DocumentKind::Docx,
        DocumentKind::PlainText,
    ];

    pub fn mime_type(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MIME,
            DocumentKind::Docx => DOCX_MIME,
            DocumentKind::PlainText => TEXT_MIME,
        }
    }

    /// Matches a declared MIME type. Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            PDF_MIME => Some(DocumentKind::Pdf),
            DOCX_MIME => Some(DocumentKind::Docx),
            TEXT_MIME => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            "txt" => Some(DocumentKind::PlainText),
            _ => None,
        }
    }

    /// Resolves the kind of an upload. The declared type wins; the file extension is
    /// consulted only when the browser sent no type or a generic octet-stream.
    pub fn detect(declared: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        match declared.map(str::trim).filter(|m| !m.is_empty()) {
            Some(mime) if !mime.eq_ignore_ascii_case("application/octet-stream") => {
                Self::from_mime(mime)
            }
            _ => file_name.and_then(Self::from_file_name),
        }
    }
}

/// A validated upload, ready to hand to the gateway.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub kind: DocumentKind,
    pub bytes: Bytes,
}
