use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::{DatabaseError, Table, TableStore};

/// Stores each table as `<root>/<table>.csv`.
///
/// Rewrites go through a temporary file in the same directory followed by a
/// rename, so readers see either the old table or the new one.
#[derive(Debug, Clone)]
pub struct CsvTableStore {
    root: PathBuf,
}

impl CsvTableStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{}.csv", table))
    }
}

#[async_trait]
impl TableStore for CsvTableStore {
    async fn read_all(&self, table: &str) -> Result<Table, DatabaseError> {
        let path = self.table_path(table);
        debug!("Reading table {} from {}", table, path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DatabaseError::TableNotFound(table.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        decode(&bytes)
    }

    async fn overwrite_all(&self, table: &str, contents: &Table) -> Result<(), DatabaseError> {
        let path = self.table_path(table);
        debug!("Writing {} rows to table {} at {}", contents.len(), table, path.display());

        let bytes = encode(contents)?;
        let root = self.root.clone();

        tokio::task::spawn_blocking(move || replace_file(&root, &path, &bytes))
            .await
            .map_err(|e| DatabaseError::Io(std::io::Error::other(e)))??;

        Ok(())
    }
}

fn decode(bytes: &[u8]) -> Result<Table, DatabaseError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::from_parts(headers, rows))
}

fn encode(table: &Table) -> Result<Vec<u8>, DatabaseError> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    if !table.headers().is_empty() {
        writer.write_record(table.headers())?;
        for row in table.rows() {
            writer.write_record(row)?;
        }
    }

    writer.into_inner().map_err(|e| DatabaseError::Io(e.into_error()))
}

fn replace_file(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
