//! `knowmap upload`: ingest local text files.
//!
//! Each file becomes one document. The file name is the `source_name` and
//! the bytes are decoded as UTF-8, with invalid sequences replaced rather
//! than rejected. Files are processed in argument order; the first failure
//! stops the run, and documents already uploaded stay in the index.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use knowmap_core::ingest::ingest;
use knowmap_core::models::{DocumentRecord, IngestRequest};

use crate::config::Config;
use crate::services::Services;

pub async fn run_upload(config: &Config, files: &[PathBuf], owner: &str) -> Result<()> {
    let services = Services::open(config).await?;

    for path in files {
        let record = upload_file(&services, path, owner).await?;
        println!("upload {}", record.source_name);
        println!("  id: {}", record.id);
        println!("  entities: {}", record.entities.len());
        println!("  chars stored: {}", record.normalized_text.chars().count());
    }

    println!("ok ({} document(s))", files.len());
    Ok(())
}

/// Read one file and run it through the ingestion pipeline.
pub async fn upload_file(services: &Services, path: &Path, owner: &str) -> Result<DocumentRecord> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    let source_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    let req = IngestRequest::from_parts(Some(owner.to_string()), source_name, Some(text))?;
    let record = ingest(
        services.store.as_ref(),
        services.extractor.as_ref(),
        services.embedder.as_ref(),
        req,
    )
    .await
    .with_context(|| format!("Failed to upload {}", path.display()))?;

    Ok(record)
}
