//! Knowledge base command handlers.

use std::path::PathBuf;

use anyhow::Result;
use delia_core::api::Document;
use delia_core::config::Config;

use super::{api_error, authorized_client};

pub async fn stats(config: &Config) -> Result<()> {
    let client = authorized_client(config)?;
    let stats = client
        .document_stats()
        .await
        .map_err(|e| api_error(e, "Loading stats"))?;
    println!("{stats}");
    Ok(())
}

pub async fn list(config: &Config) -> Result<()> {
    let client = authorized_client(config)?;
    let documents = client
        .list_documents()
        .await
        .map_err(|e| api_error(e, "Listing documents"))?;
    if documents.is_empty() {
        println!("No documents uploaded yet.");
        return Ok(());
    }
    for doc in &documents {
        println!("{}", document_row(doc));
    }
    Ok(())
}

/// Uploads each file in turn. Stops at the first failure.
pub async fn upload(config: &Config, files: &[PathBuf]) -> Result<()> {
    let client = authorized_client(config)?;
    for file in files {
        client
            .upload_document(file)
            .await
            .map_err(|e| api_error(e, &format!("Uploading {}", file.display())))?;
        println!("Uploaded {}", file.display());
    }
    Ok(())
}

pub async fn clear(config: &Config, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!(
            "This deletes every document in the knowledge base. Re-run with --yes to confirm."
        );
    }
    let client = authorized_client(config)?;
    client
        .clear_database()
        .await
        .map_err(|e| api_error(e, "Clearing the knowledge base"))?;
    println!("Knowledge base cleared.");
    Ok(())
}

fn document_row(doc: &Document) -> String {
    format!(
        "{:<40} {:>10}  {}",
        doc.filename,
        format_size(doc.file_size),
        doc.upload_date
    )
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
