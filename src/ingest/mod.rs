//! Document ingestion: load, chunk, index.
//!
//! A source (file path or URL) is resolved to a loader by its scheme or
//! extension, the extracted text is chunked, and the chunks are inserted
//! into the vector index. Loader failures surface to the caller;
//! re-ingesting the same source appends duplicate chunks (known
//! limitation, kept as-is).

mod loaders;

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::rag::{Chunker, PipelineError, StoredChunk, VectorIndex};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported document type: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("pdf extraction failed for {}: {reason}", path.display())]
    PdfExtract { path: PathBuf, reason: String },
    #[error("no text could be extracted from {0}")]
    EmptyDocument(String),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// How a source's raw content gets turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    PlainText,
    Pdf,
    Web,
}

impl SourceFormat {
    /// Infer the format from the origin identifier: URL scheme first,
    /// then file extension. Anything unrecognized is a reportable
    /// failure, not a silent skip.
    fn detect(source: &str) -> Result<Self, IngestError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            return Ok(SourceFormat::Web);
        }

        let extension = Path::new(source)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" | "md" => Ok(SourceFormat::PlainText),
            "pdf" => Ok(SourceFormat::Pdf),
            _ => Err(IngestError::UnsupportedFormat(source.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct Ingestor {
    index: VectorIndex,
    chunker: Chunker,
    http: reqwest::Client,
}

impl Ingestor {
    pub fn new(index: VectorIndex, chunker: Chunker) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            index,
            chunker,
            http,
        }
    }

    /// Ingest a document from a file path or URL.
    pub async fn ingest(&self, source: &str) -> Result<usize, IngestError> {
        let format = SourceFormat::detect(source)?;

        let text = match format {
            SourceFormat::Web => loaders::fetch_web_page(&self.http, source).await?,
            SourceFormat::PlainText => loaders::load_plain_text(Path::new(source)).await?,
            SourceFormat::Pdf => loaders::extract_pdf_text(Path::new(source)).await?,
        };

        if text.trim().is_empty() {
            return Err(IngestError::EmptyDocument(source.to_string()));
        }

        let chunks: Vec<StoredChunk> = self
            .chunker
            .split(&text)
            .into_iter()
            .map(|chunk| StoredChunk {
                chunk_id: Uuid::new_v4().to_string(),
                content: chunk.text,
                source: source.to_string(),
                start_offset: chunk.start_offset,
                chunk_index: chunk.chunk_index,
            })
            .collect();

        let inserted = self.index.insert(chunks).await?;
        tracing::info!("ingested {} chunks from {}", inserted, source);
        Ok(inserted)
    }
}
