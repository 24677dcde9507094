use crate::experiment::MessageRecord;
use anyhow::Result;
use csv::Writer;
use std::fs::File;
use std::path::Path;

/// Writes raw message records to CSV for later inspection or plotting.
pub struct RecordLogger {
    writer: Writer<File>,
}

impl RecordLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log(&mut self, record: &MessageRecord) -> Result<()> {
        self.writer.serialize(record)?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn log_batch(&mut self, records: &[MessageRecord]) -> Result<()> {
        for record in records {
            self.writer.serialize(record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
