use super::ExportWriter;
use crate::api::schema::ResultRecord;
use crate::error::Result;
use async_trait::async_trait;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Writes records as a pretty-printed JSON array.
pub struct JsonExport {
    file: BufWriter<File>,
    first: bool,
}

impl JsonExport {
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut file = BufWriter::new(file);
        write!(file, "[")?;

        Ok(Self { file, first: true })
    }
}

#[async_trait]
impl ExportWriter for JsonExport {
    async fn write(&mut self, record: &ResultRecord) -> Result<()> {
        if !self.first {
            write!(self.file, ",")?;
        } else {
            self.first = false;
        }

        writeln!(self.file)?;
        serde_json::to_writer_pretty(&mut self.file, record)?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        writeln!(self.file, "\n]")?;
        self.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn writes_a_valid_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut out = JsonExport::new(path.clone()).unwrap();

        for n in 0..2 {
            let record: ResultRecord = serde_json::from_value(json!({ "CNPJ": n.to_string() })).unwrap();
            out.write(&record).await.unwrap();
        }
        out.close().await.unwrap();

        let parsed: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, json!([{ "CNPJ": "0" }, { "CNPJ": "1" }]));
    }
}
