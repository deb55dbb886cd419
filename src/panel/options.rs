use super::Panel;
use super::view::EXPORT_FIELDS;
use crate::error::{Error, Result};

impl Panel {
    /// Replaces the state list with the codes the backend offers.
    pub async fn load_states(&self) -> Result<usize> {
        let states = self.client.states().await?;
        let mut view = self.view.lock().await;
        view.states = states;
        log::info!("Loaded {} states", view.states.len());
        Ok(view.states.len())
    }

    /// Rebuilds the city checklist for `state`.
    ///
    /// The list is cleared first; an empty state stops there without a
    /// request. A response that arrives after a newer call was made is
    /// dropped. Returns the number of cities rendered.
    pub async fn update_cities(&self, state: &str) -> Result<usize> {
        let generation = {
            let mut view = self.view.lock().await;
            view.state = state.to_string();
            view.cities.clear();
            view.cities_generation += 1;
            view.cities_generation
        };

        if state.is_empty() {
            return Ok(0);
        }

        let cities = self.client.cities(state).await?;

        let mut view = self.view.lock().await;
        if view.cities_generation != generation {
            log::debug!("Discarding stale city list for {}", state);
            return Ok(0);
        }
        view.replace_cities(cities);
        log::info!("Loaded {} cities for {}", view.cities.len(), state);
        Ok(view.cities.len())
    }

    pub async fn set_city_checked(&self, city: &str, checked: bool) -> bool {
        self.view.lock().await.set_city_checked(city, checked)
    }

    /// Opens the export dialog with every known field pre-checked.
    pub async fn show_save_fields(&self) {
        self.view.lock().await.open_export_fields();
    }

    pub async fn set_field_checked(&self, field: &str, checked: bool) -> bool {
        self.view.lock().await.set_field_checked(field, checked)
    }

    /// Opens the export dialog and keeps only `fields` checked. An empty
    /// slice keeps every field. Unknown names are returned so the caller
    /// can report them; if nothing requested is known the selection is
    /// refused rather than exporting no columns.
    pub async fn select_export_fields(&self, fields: &[String]) -> Result<Vec<String>> {
        let (known, unknown): (Vec<&String>, Vec<&String>) = fields
            .iter()
            .partition(|f| EXPORT_FIELDS.contains(&f.as_str()));
        if !fields.is_empty() && known.is_empty() {
            return Err(Error::UnknownFields(fields.to_vec()));
        }

        let mut view = self.view.lock().await;
        view.open_export_fields();
        if !fields.is_empty() {
            for field in EXPORT_FIELDS {
                view.set_field_checked(field, known.iter().any(|f| f.as_str() == field));
            }
        }
        Ok(unknown.into_iter().cloned().collect())
    }

    pub async fn close_modal(&self) {
        self.view.lock().await.modal_open = false;
    }
}
