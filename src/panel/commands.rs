use super::Panel;
use super::view::EXPORT_FIELDS;
use crate::api::schema::{CommandReply, ResultRecord};
use crate::error::{Error, Result};
use crate::output::csv::CsvExport;
use crate::output::json::JsonExport;
use crate::output::{ExportWriter, export_file_name};
use chrono::Utc;
use std::path::PathBuf;
use validator::Validate;

pub const VALIDATION_MESSAGE: &str =
    "Por favor, preencha o termo de busca, selecione um estado e pelo menos uma cidade.";

pub const NOTHING_TO_SAVE: &str = "Nenhum resultado para salvar.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Server accepted the command; carries its message.
    Accepted(String),
    /// Server answered with an `error`.
    Rejected(String),
    /// Blocked locally; nothing was sent.
    Invalid(String),
}

impl CommandOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CommandOutcome::Accepted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Empty,
    Rejected(String),
}

impl Panel {
    pub async fn load_proxies(&self, proxies: &str) -> Result<CommandOutcome> {
        self.view.lock().await.proxies = proxies.to_string();
        let reply = self.client.load_proxies(proxies).await?;
        Ok(self.present(reply))
    }

    pub async fn test_proxies(&self) -> Result<CommandOutcome> {
        let reply = self.client.test_proxies().await?;
        Ok(self.present(reply))
    }

    /// Submits the search described by the form, then starts syncing.
    ///
    /// Loops that are already running are kept, so a second start never
    /// doubles the feed.
    pub async fn start_search(&self) -> Result<CommandOutcome> {
        let request = self.view.lock().await.search_request();

        if request.validate().is_err() {
            self.presenter.alert(VALIDATION_MESSAGE);
            return Ok(CommandOutcome::Invalid(VALIDATION_MESSAGE.to_string()));
        }

        log::info!(
            "Starting search '{}' in {} ({} cities)",
            request.search_term,
            request.state,
            request.cities.len()
        );
        let reply = self.client.start_search(&request).await?;
        let outcome = self.present(reply);
        if outcome.is_accepted() && !self.start_sync().await {
            log::info!("Sync already running; reusing active pollers");
        }
        Ok(outcome)
    }

    /// Pauses the server-side run. Syncing continues.
    pub async fn pause_search(&self) -> Result<CommandOutcome> {
        let reply = self.client.pause_search().await?;
        Ok(self.present(reply))
    }

    /// Stops the server-side run and, once acknowledged, the local poll loops.
    pub async fn stop_search(&self) -> Result<CommandOutcome> {
        let reply = self.client.stop_search().await?;
        let outcome = self.present(reply);
        if outcome.is_accepted() {
            self.stop_sync().await;
        }
        Ok(outcome)
    }

    /// Server-side CSV export of the checked fields.
    pub async fn save_results(&self) -> Result<SaveOutcome> {
        let fields = self.selected_fields().await;

        let body = match self.client.save_results(&fields).await {
            Ok(body) => body,
            Err(Error::Server(msg)) => {
                self.presenter.alert(&msg);
                return Ok(SaveOutcome::Rejected(msg));
            }
            Err(e) => return Err(e),
        };

        tokio::fs::create_dir_all(&self.export_dir).await?;
        let path = self.export_dir.join(export_file_name("csv", Utc::now()));
        tokio::fs::write(&path, &body).await?;
        log::info!("Saved {} bytes to {}", body.len(), path.display());

        self.close_modal().await;
        Ok(SaveOutcome::Saved(path))
    }

    /// Re-fetches the results and writes them as a JSON array.
    pub async fn save_results_json(&self) -> Result<SaveOutcome> {
        let Some(results) = self.fetch_for_export().await? else {
            return Ok(SaveOutcome::Empty);
        };

        let path = self.export_dir.join(export_file_name("json", Utc::now()));
        let writer = JsonExport::new(path.clone())?;
        self.write_export(Box::new(writer), &results).await?;
        log::info!("Saved {} results to {}", results.len(), path.display());
        Ok(SaveOutcome::Saved(path))
    }

    /// Re-fetches the results and writes the checked fields as CSV locally.
    pub async fn save_results_local_csv(&self) -> Result<SaveOutcome> {
        let fields = self.selected_fields().await;
        let Some(results) = self.fetch_for_export().await? else {
            return Ok(SaveOutcome::Empty);
        };

        let path = self.export_dir.join(export_file_name("csv", Utc::now()));
        let writer = CsvExport::new(path.clone(), fields)?;
        self.write_export(Box::new(writer), &results).await?;
        log::info!("Saved {} results to {}", results.len(), path.display());

        self.close_modal().await;
        Ok(SaveOutcome::Saved(path))
    }

    fn present(&self, reply: CommandReply) -> CommandOutcome {
        match reply.into_result() {
            Ok(message) => {
                if !message.is_empty() {
                    self.presenter.alert(&message);
                }
                CommandOutcome::Accepted(message)
            }
            Err(e) => {
                let message = e.to_string();
                log::warn!("Server rejected command: {}", message);
                self.presenter.alert(&message);
                CommandOutcome::Rejected(message)
            }
        }
    }

    /// Checked export fields; every known field when the dialog was never opened.
    async fn selected_fields(&self) -> Vec<String> {
        let view = self.view.lock().await;
        if view.export_fields.is_empty() {
            EXPORT_FIELDS.iter().map(|f| f.to_string()).collect()
        } else {
            view.checked_fields()
        }
    }

    async fn fetch_for_export(&self) -> Result<Option<Vec<ResultRecord>>> {
        let batch = self.client.get_results().await?;
        if batch.results.is_empty() {
            self.presenter.alert(NOTHING_TO_SAVE);
            return Ok(None);
        }
        tokio::fs::create_dir_all(&self.export_dir).await?;
        Ok(Some(batch.results))
    }

    async fn write_export(
        &self,
        mut writer: Box<dyn ExportWriter>,
        records: &[ResultRecord],
    ) -> Result<()> {
        for record in records {
            writer.write(record).await?;
        }
        writer.close().await
    }
}
