use super::ExportWriter;
use crate::api::schema::ResultRecord;
use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Client-side CSV with one column per selected field.
pub struct CsvExport {
    writer: csv::Writer<std::fs::File>,
    fields: Vec<String>,
}

impl CsvExport {
    pub fn new(path: PathBuf, fields: Vec<String>) -> Result<Self> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&fields)?;

        Ok(Self { writer, fields })
    }
}

#[async_trait]
impl ExportWriter for CsvExport {
    async fn write(&mut self, record: &ResultRecord) -> Result<()> {
        let values: Vec<String> = self.fields.iter().map(|f| record.field(f)).collect();
        self.writer.write_record(values)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
