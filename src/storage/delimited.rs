//! Delimited text file storage
//!
//! Rows are `;`-separated (`Title;Price;Seller;Link`) because titles and
//! prices routinely contain commas. A field that does contain the delimiter
//! is quoted, so it never appears unescaped.

use crate::crawler::ListingRecord;
use crate::storage::traits::{ListingStore, StorageError, StorageResult};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// Field delimiter of the store file
pub const DELIMITER: u8 = b';';

/// Header row written when the file is created
pub const HEADER: [&str; 4] = ["Title", "Price", "Seller", "Link"];

/// Store backed by a `;`-separated text file
#[derive(Debug, Clone)]
pub struct DelimitedFileStore {
    path: PathBuf,
}

impl DelimitedFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the file is missing or has no bytes yet
    fn is_new(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|meta| meta.len() == 0)
            .unwrap_or(true)
    }
}

impl ListingStore for DelimitedFileStore {
    fn load(&self) -> StorageResult<Vec<ListingRecord>> {
        if self.is_new() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result?;
            let field = |i: usize| record.get(i).unwrap_or("").to_string();

            let seller = field(2);
            if seller.is_empty() {
                return Err(StorageError::MalformedRow {
                    path: self.path.display().to_string(),
                    // +2: one for the header, one for 1-based numbering
                    row: index as u64 + 2,
                    message: "missing seller field".to_string(),
                });
            }

            let link = field(3);
            rows.push(ListingRecord {
                title: field(0),
                price: field(1),
                seller,
                link: if link.is_empty() { None } else { Some(link) },
            });
        }

        Ok(rows)
    }

    fn append(&mut self, rows: &[ListingRecord]) -> StorageResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let write_header = self.is_new();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .from_writer(file);

        if write_header {
            writer.write_record(HEADER)?;
        }
        for row in rows {
            writer.write_record([
                row.title.as_str(),
                row.price.as_str(),
                row.seller.as_str(),
                row.link.as_deref().unwrap_or(""),
            ])?;
        }
        writer.flush()?;

        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(seller: &str, title: &str, link: Option<&str>) -> ListingRecord {
        ListingRecord {
            title: title.to_string(),
            price: "R$ 1.299,00".to_string(),
            seller: seller.to_string(),
            link: link.map(str::to_string),
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = DelimitedFileStore::new(dir.path().join("sellers.csv"));
        assert!(store.load().unwrap().is_empty());
        assert!(store.known_sellers().unwrap().is_empty());
    }

    #[test]
    fn test_header_written_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sellers.csv");
        let mut store = DelimitedFileStore::new(&path);

        store.append(&[record("A", "Phone", Some("https://x/1"))]).unwrap();
        store.append(&[record("B", "Case", None)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Title;Price;Seller;Link",
                "Phone;R$ 1.299,00;A;https://x/1",
                "Case;R$ 1.299,00;B;",
            ]
        );
    }

    #[test]
    fn test_fields_with_delimiter_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut store = DelimitedFileStore::new(dir.path().join("sellers.csv"));

        let tricky = record("Loja; Oficial", "Fone \"Pro\"; 2 peças", None);
        store.append(&[tricky.clone()]).unwrap();

        assert_eq!(store.load().unwrap(), vec![tricky]);
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data").join("sellers.csv");
        let mut store = DelimitedFileStore::new(&path);

        store.append(&[record("A", "Phone", None)]).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_row_without_seller_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sellers.csv");
        std::fs::write(&path, "Title;Price;Seller;Link\nPhone;$1;;\n").unwrap();

        let store = DelimitedFileStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(StorageError::MalformedRow { row: 2, .. })
        ));
    }
}
