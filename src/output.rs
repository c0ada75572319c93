use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::Result;
use csv::WriterBuilder;

use crate::record::BookRecord;

/// Appends record batches to one CSV file.
///
/// The header row is written exactly once, at creation, in the canonical
/// column order of `BookRecord::FIELDS`; batches never re-derive it.
pub struct CsvAppender {
    path: PathBuf,
}

impl CsvAppender {
    /// Truncate or create the output file and write the header row.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(&BookRecord::FIELDS)?;
        writer.flush()?;
        Ok(Self { path })
    }

    /// Append one batch as data rows. An empty batch writes nothing.
    pub fn append(&self, records: &[BookRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csv::Reader;
    use tempfile::tempdir;

    fn record(name: &str, author: &str) -> BookRecord {
        BookRecord {
            book_name: name.to_string(),
            rate_point: "9.1".to_string(),
            rate_number: "1000".to_string(),
            author: author.to_string(),
            publisher: "某出版社".to_string(),
            publish_date: "2020".to_string(),
            pic_link: "https://img.example.com/x.jpg".to_string(),
        }
    }

    #[test]
    fn header_is_written_once_and_rows_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.csv");
        let appender = CsvAppender::create(&path).unwrap();

        let first = vec![record("活着", "余华"), record("围城", "钱锺书")];
        let second = vec![record("红楼梦", "")];
        appender.append(&first).unwrap();
        appender.append(&second).unwrap();

        let mut reader = Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            BookRecord::FIELDS.to_vec()
        );

        let rows: Vec<BookRecord> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], first[0]);
        assert_eq!(rows[1], first[1]);
        assert_eq!(rows[2], second[0]);
        assert_eq!(rows[2].author, "");
    }

    #[test]
    fn empty_batch_appends_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.csv");
        let appender = CsvAppender::create(&path).unwrap();
        appender.append(&[]).unwrap();

        let mut reader = Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), 0);
    }

    #[test]
    fn create_truncates_a_previous_run() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("books.csv");

        let appender = CsvAppender::create(&path).unwrap();
        appender.append(&[record("旧书", "甲")]).unwrap();

        let appender = CsvAppender::create(&path).unwrap();
        appender.append(&[record("新书", "乙")]).unwrap();

        let mut reader = Reader::from_path(&path).unwrap();
        let rows: Vec<BookRecord> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].book_name, "新书");
    }
}
