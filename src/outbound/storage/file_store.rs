use crate::domain::webhook::{
    errors::RawRequestStoreError,
    ports::{RawRequestRecord, RawRequestStore},
};
use crate::outbound::telemetry::spawn_blocking_with_tracing;
use async_trait::async_trait;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const FILE_PREFIX: &str = "mailchimp_";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Writes each raw webhook request to its own file,
/// `<directory>/mailchimp_<YYYY-MM-DD-HH-mm-ss>.txt`.
#[derive(Debug, Clone)]
pub struct FileRequestStore {
    directory: PathBuf,
}

impl FileRequestStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl RawRequestStore for FileRequestStore {
    #[tracing::instrument(name = "Persisting a raw webhook request", skip(self, record))]
    async fn persist(&self, record: &RawRequestRecord) -> Result<usize, RawRequestStoreError> {
        let contents = serde_json::to_string_pretty(record)?;
        let directory = self.directory.clone();
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        let (path, written) = spawn_blocking_with_tracing(move || {
            write_record(&directory, &timestamp, contents.as_bytes())
        })
        .await
        .map_err(|e| RawRequestStoreError::Unexpected(anyhow::Error::from(e)))??;

        tracing::debug!(path = %path.display(), written, "Webhook request persisted");
        Ok(written)
    }
}

/// Creates a fresh file for the record. Deliveries landing in the same
/// second get a numeric suffix instead of overwriting each other.
fn write_record(
    directory: &Path,
    timestamp: &str,
    contents: &[u8],
) -> Result<(PathBuf, usize), std::io::Error> {
    let mut attempt: u32 = 0;
    loop {
        let file_name = match attempt {
            0 => format!("{}{}.txt", FILE_PREFIX, timestamp),
            n => format!("{}{}_{}.txt", FILE_PREFIX, timestamp, n),
        };
        let path = directory.join(file_name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                file.write_all(contents)?;
                return Ok((path, contents.len()));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}
