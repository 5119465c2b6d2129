//! Loading, saving and merging PDF files

use crate::document::PdfDocument;
use crate::types::{EditError, Result};
use std::path::{Path, PathBuf};

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<PdfDocument> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || PdfDocument::from_bytes(&bytes)).await??;
    log::debug!("Loaded {}", path.display());
    Ok(doc)
}

/// Save the edited document
pub async fn save_pdf(mut doc: PdfDocument, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || doc.to_bytes()).await??;
    tokio::fs::write(&path, bytes).await?;
    log::info!("Saved {}", path.display());
    Ok(())
}

/// Which inputs made it into a merge
#[derive(Debug, Default)]
pub struct MergeReport {
    pub loaded: Vec<PathBuf>,
    pub skipped: Vec<(PathBuf, EditError)>,
}

/// Concatenate several files in order.
///
/// A file that cannot be read or parsed is skipped and reported; the merge
/// only fails when nothing could be loaded.
pub async fn merge_files(paths: &[impl AsRef<Path>]) -> Result<(PdfDocument, MergeReport)> {
    let mut report = MergeReport::default();
    let mut documents = Vec::new();
    for path in paths {
        let path = path.as_ref();
        match load_pdf(path).await {
            Ok(doc) => {
                documents.push(doc);
                report.loaded.push(path.to_owned());
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                report.skipped.push((path.to_owned(), e));
            }
        }
    }

    let merged = tokio::task::spawn_blocking(move || merge_documents(documents)).await??;
    Ok((merged, report))
}

/// Merge documents into one, pages in input order
pub fn merge_documents(documents: Vec<PdfDocument>) -> Result<PdfDocument> {
    if documents.is_empty() {
        return Err(EditError::NoPages);
    }

    let mut merged = PdfDocument::empty();
    let mut pages = 0;
    for doc in documents {
        pages += merged.append(doc)?;
    }
    log::info!("Merged {} page(s)", pages);
    Ok(merged)
}
