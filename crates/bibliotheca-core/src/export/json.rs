use crate::error::Result;
use crate::models::Record;

use super::ExportStrategy;

/// Pretty-printed array of objects, field names preserved.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExport;

impl ExportStrategy for JsonExport {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn serialize(&self, records: &[Record]) -> Result<Vec<u8>> {
        let objects: Vec<_> = records.iter().map(Record::as_object).collect();
        Ok(serde_json::to_vec_pretty(&objects)?)
    }
}
