use crate::error::Result;
use crate::models::Record;

use super::ExportStrategy;

/// Opaque bincode dump, readable only through [`BinaryExport::decode`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryExport;

impl BinaryExport {
    pub fn decode(bytes: &[u8]) -> Result<Vec<Record>> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl ExportStrategy for BinaryExport {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn extension(&self) -> &'static str {
        "bin"
    }

    fn serialize(&self, records: &[Record]) -> Result<Vec<u8>> {
        Ok(bincode::serialize(records)?)
    }
}
