use crate::error::{BibliothecaError, Result};
use crate::models::Record;

use super::ExportStrategy;

/// Comma-separated rows under a header naming the first record's fields.
///
/// An empty collection yields an empty document.
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExport;

impl ExportStrategy for CsvExport {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn extension(&self) -> &'static str {
        "csv"
    }

    fn serialize(&self, records: &[Record]) -> Result<Vec<u8>> {
        let Some(first) = records.first() else {
            return Ok(Vec::new());
        };

        let header: Vec<&str> = first.names().collect();
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&header)?;

        for record in records {
            let row: Vec<String> = header
                .iter()
                .map(|name| record.get(name).map(ToString::to_string).unwrap_or_default())
                .collect();
            writer.write_record(&row)?;
        }

        writer
            .into_inner()
            .map_err(|e| BibliothecaError::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Entity, Reader};

    #[test]
    fn test_csv_header_and_rows() {
        let mut ivan = Reader::new("Ivan", "i@x.com", "+1");
        ivan.id = 1;
        ivan.books_borrowed = vec![1, 3];
        let mut petr = Reader::new("Petr, Jr.", "p@x.com", "+2");
        petr.id = 2;

        let bytes = CsvExport.serialize(&[ivan.record(), petr.record()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "id,name,email,phone,books_borrowed");
        assert_eq!(lines[1], "1,Ivan,i@x.com,+1,\"[1,3]\"");
        assert_eq!(lines[2], "2,\"Petr, Jr.\",p@x.com,+2,[]");
    }

    #[test]
    fn test_csv_empty_collection() {
        assert!(CsvExport.serialize(&[]).unwrap().is_empty());
    }
}
