//! Upload validation: extension/signature dispatch, size limits, and a
//! conservative content scan. Ported from the file-type registry in
//! `original_source/backend/core/file_types.py` (`FILE_TYPE_REGISTRY`,
//! `DANGEROUS_CHARS`, `MALWARE_PATTERNS`), generalized to the
//! configured `IngestLimits` instead of the per-extension hardcoded
//! `max_size_mb` the original carries.

use resumariner_config::IngestLimits;
use resumariner_shared::{ErrorCode, ErrorEnvelope, Result};

/// File category, matching the original registry's two buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Document,
    Image,
}

/// One entry in the file type registry: extension, expected magic bytes,
/// media type, and category.
#[derive(Debug, Clone, Copy)]
struct FileTypeSpec {
    extension: &'static str,
    media_type: &'static str,
    signature: &'static [u8],
    category: FileCategory,
}

const FILE_TYPE_REGISTRY: &[FileTypeSpec] = &[
    FileTypeSpec {
        extension: "pdf",
        media_type: "application/pdf",
        signature: b"%PDF-",
        category: FileCategory::Document,
    },
    FileTypeSpec {
        extension: "jpg",
        media_type: "image/jpeg",
        signature: b"\xff\xd8\xff",
        category: FileCategory::Image,
    },
    FileTypeSpec {
        extension: "jpeg",
        media_type: "image/jpeg",
        signature: b"\xff\xd8\xff",
        category: FileCategory::Image,
    },
    FileTypeSpec {
        extension: "png",
        media_type: "image/png",
        signature: b"\x89PNG\r\n\x1a\n",
        category: FileCategory::Image,
    },
];

/// Characters disallowed anywhere in an uploaded file name.
const DANGEROUS_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\\', '/', '\0'];

/// Path-traversal markers disallowed in an uploaded file name.
const SUSPICIOUS_PATH_PATTERNS: &[&str] = &["../", "..\\"];

/// Byte patterns that mark a file as carrying embedded script content
/// rather than the document/image content its extension claims.
const MALWARE_PATTERNS: &[&[u8]] = &[
    b"<?php",
    b"<script",
    b"javascript:",
    b"eval(",
    b"cmd.exe",
    b"powershell",
    b"/bin/sh",
];

/// Ratio of NUL bytes above which a document-category upload is rejected
/// as binary content misrepresenting itself as text-bearing.
const MAX_NUL_BYTE_RATIO: f64 = 0.1;

fn registry_entry(extension: &str) -> Option<&'static FileTypeSpec> {
    let normalized = extension.trim_start_matches('.').to_lowercase();
    FILE_TYPE_REGISTRY
        .iter()
        .find(|spec| spec.extension == normalized)
}

/// Extract the lowercase extension from a file name, without the dot.
#[must_use]
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, extension) = file_name.rsplit_once('.')?;
    if extension.is_empty() {
        None
    } else {
        Some(extension.to_lowercase())
    }
}

fn invalid(message: impl Into<String>) -> ErrorEnvelope {
    ErrorEnvelope::expected(ErrorCode::new("validation", "invalid_upload"), message)
}

/// Reject file names containing traversal markers or characters that
/// would be unsafe to use verbatim as a path segment.
pub fn validate_file_name(file_name: &str) -> Result<()> {
    if file_name.trim().is_empty() {
        return Err(invalid("file name must not be empty"));
    }
    if SUSPICIOUS_PATH_PATTERNS
        .iter()
        .any(|pattern| file_name.contains(pattern))
    {
        return Err(invalid("file name contains a path traversal marker"));
    }
    if file_name.chars().any(|ch| DANGEROUS_CHARS.contains(&ch)) {
        return Err(invalid("file name contains a disallowed character"));
    }
    Ok(())
}

/// Look up the media type and category for an uploaded file's extension,
/// rejecting anything outside the registry.
pub fn classify_extension(extension: &str) -> Result<(&'static str, FileCategory)> {
    let spec = registry_entry(extension)
        .ok_or_else(|| invalid(format!("unsupported file extension: .{extension}")))?;
    Ok((spec.media_type, spec.category))
}

/// Confirm the file's leading bytes match the magic signature expected
/// for its extension. Extensions with no registered signature pass.
pub fn validate_signature(extension: &str, content: &[u8]) -> Result<()> {
    let Some(spec) = registry_entry(extension) else {
        return Err(invalid(format!("unsupported file extension: .{extension}")));
    };
    if content.starts_with(spec.signature) {
        Ok(())
    } else {
        Err(invalid("file content does not match its declared extension"))
    }
}

/// Reject uploads exceeding the configured per-category size limit.
pub fn validate_size(category: FileCategory, bytes_len: u64, limits: &IngestLimits) -> Result<()> {
    let max = match category {
        FileCategory::Document => limits.max_pdf_bytes,
        FileCategory::Image => limits.max_image_bytes,
    };
    if bytes_len > max {
        return Err(invalid(format!(
            "upload of {bytes_len} bytes exceeds the {max} byte limit for this file type"
        ))
        .with_metadata("limit_bytes", max.to_string())
        .with_metadata("actual_bytes", bytes_len.to_string()));
    }
    Ok(())
}

/// Scan content for embedded script markers and an excessive NUL-byte
/// ratio, both signs the file is not what its extension claims.
pub fn scan_content(content: &[u8]) -> Result<()> {
    for pattern in MALWARE_PATTERNS {
        if content
            .windows(pattern.len())
            .any(|window| window == *pattern)
        {
            return Err(invalid("file content contains a disallowed marker").with_metadata(
                "pattern",
                String::from_utf8_lossy(pattern).into_owned(),
            ));
        }
    }
    if content.is_empty() {
        return Ok(());
    }
    let nul_count = content.iter().filter(|byte| **byte == 0).count();
    #[allow(
        clippy::cast_precision_loss,
        reason = "file sizes are well under f64's exact-integer range"
    )]
    let ratio = nul_count as f64 / content.len() as f64;
    if ratio > MAX_NUL_BYTE_RATIO {
        return Err(
            invalid("file content has an unexpectedly high proportion of NUL bytes")
                .with_metadata("nul_ratio", format!("{ratio:.4}")),
        );
    }
    Ok(())
}

/// Run the complete validation pipeline for one uploaded file: name,
/// extension/category lookup, size limit, magic signature, and content
/// scan, in that order (cheapest checks first).
pub fn validate_upload(file_name: &str, content: &[u8], limits: &IngestLimits) -> Result<FileCategory> {
    validate_file_name(file_name)?;
    let extension = extension_of(file_name)
        .ok_or_else(|| invalid("file name has no extension"))?;
    let (_, category) = classify_extension(&extension)?;
    validate_size(category, content.len() as u64, limits)?;
    validate_signature(&extension, content)?;
    scan_content(content)?;
    Ok(category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> IngestLimits {
        IngestLimits {
            max_pdf_bytes: 1024,
            max_image_bytes: 512,
        }
    }

    #[test]
    fn validate_file_name_rejects_traversal() {
        assert!(validate_file_name("../etc/passwd").is_err());
    }

    #[test]
    fn validate_file_name_rejects_dangerous_characters() {
        assert!(validate_file_name("resume<1>.pdf").is_err());
    }

    #[test]
    fn validate_file_name_accepts_normal_name() {
        assert!(validate_file_name("jane-doe-resume.pdf").is_ok());
    }

    #[test]
    fn classify_extension_rejects_unknown() {
        assert!(classify_extension("exe").is_err());
    }

    #[test]
    fn classify_extension_maps_pdf_to_document() {
        let (media_type, category) = classify_extension("pdf").expect("pdf is registered");
        assert_eq!(media_type, "application/pdf");
        assert_eq!(category, FileCategory::Document);
    }

    #[test]
    fn validate_signature_rejects_mismatched_content() {
        assert!(validate_signature("pdf", b"not a pdf").is_err());
    }

    #[test]
    fn validate_signature_accepts_matching_content() {
        assert!(validate_signature("pdf", b"%PDF-1.7\n...").is_ok());
    }

    #[test]
    fn validate_size_rejects_oversized_document() {
        let bytes = vec![0u8; 2048];
        assert!(validate_size(FileCategory::Document, bytes.len() as u64, &limits()).is_err());
    }

    #[test]
    fn scan_content_rejects_embedded_script_marker() {
        assert!(scan_content(b"%PDF-1.7\n<script>alert(1)</script>").is_err());
    }

    #[test]
    fn scan_content_rejects_high_nul_ratio() {
        let mut content = vec![0u8; 100];
        content.extend_from_slice(b"tail");
        assert!(scan_content(&content).is_err());
    }

    #[test]
    fn validate_upload_accepts_a_well_formed_pdf() {
        let mut content = b"%PDF-1.7\n".to_vec();
        content.extend_from_slice(&[b'x'; 16]);
        let category = validate_upload("resume.pdf", &content, &limits()).expect("should validate");
        assert_eq!(category, FileCategory::Document);
    }
}
