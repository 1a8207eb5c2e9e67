//! Input validation: fail fast before any engine is touched.
//!
//! pdfium gives poor diagnostics for a missing or non-PDF file, so we check
//! existence, read permission, and the `%PDF` magic bytes ourselves and map
//! each case to a dedicated [`Pdf2DocxError`] variant.

use crate::error::Pdf2DocxError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Validate that `path` names a readable PDF file.
pub fn validate_pdf(path: &Path) -> Result<(), Pdf2DocxError> {
    if !path.is_file() {
        return Err(Pdf2DocxError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    match std::fs::File::open(path) {
        Ok(f) => {
            let mut head = Vec::with_capacity(4);
            f.take(4)
                .read_to_end(&mut head)
                .map_err(|e| Pdf2DocxError::CorruptPdf {
                    path: path.to_path_buf(),
                    detail: e.to_string(),
                })?;
            if head != b"%PDF" {
                // Files shorter than the magic are reported zero-padded.
                let mut magic = [0u8; 4];
                magic[..head.len()].copy_from_slice(&head);
                return Err(Pdf2DocxError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2DocxError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(Pdf2DocxError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Validated input PDF: {}", path.display());
    Ok(())
}

/// Create the directory that will hold `output_path`, if it has one.
pub fn ensure_parent_dir(output_path: &Path) -> Result<(), Pdf2DocxError> {
    match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .map_err(|e| Pdf2DocxError::OutputWriteFailed {
                path: output_path.to_path_buf(),
                source: e,
            }),
        _ => Ok(()),
    }
}
