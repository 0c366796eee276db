//! Document extraction boundary contract. PDF/image parsing is pluggable;
//! only the contract lives in `ports` (`spec.md` §1).

use crate::BoxFuture;
use resumariner_domain::ParsedDocument;
use resumariner_shared::{RequestContext, Result};

/// Raw file bytes plus the name the caller uploaded, as read from
/// temporary storage by the upload handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Original file name, used for extension-based dispatch.
    pub file_name: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Boundary contract for turning an uploaded file into page-structured
/// text. A reference PDF adapter is specified precisely; the OCR/image
/// path is contract-only.
pub trait DocumentExtractorPort: Send + Sync {
    /// File extensions this extractor claims to handle, e.g. `["pdf"]`.
    fn supported_extensions(&self) -> &[&'static str];

    /// Parse an uploaded file into a [`ParsedDocument`].
    fn parse(&self, ctx: &RequestContext, file: UploadedFile) -> BoxFuture<'_, Result<ParsedDocument>>;
}

/// Boundary contract for optical character recognition over image-based
/// documents. Contract-only per `spec.md` §1 ("image/OCR paths are defined
/// only by contract"); no adapter ships in this workspace.
pub trait OcrPort: Send + Sync {
    /// Recognize text from a single image.
    fn recognize(&self, ctx: &RequestContext, image_bytes: Vec<u8>) -> BoxFuture<'_, Result<String>>;
}
