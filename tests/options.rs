mod common;

use common::{Recorder, panel, request_count};
use leadscout::Error;
use leadscout::panel::EXPORT_FIELDS;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn empty_state_clears_cities_without_a_request() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new();
    let panel = panel(&server, dir.path(), &recorder);

    Mock::given(method("GET"))
        .and(path("/cities/AL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Maceió"])))
        .mount(&server)
        .await;
    panel.update_cities("AL").await.unwrap();
    let before = request_count(&server).await;

    assert_eq!(panel.update_cities("").await.unwrap(), 0);
    assert!(panel.view().await.cities.is_empty());
    assert_eq!(request_count(&server).await, before);
}

#[tokio::test]
async fn state_change_rebuilds_unchecked_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities/AL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Maceió", "Arapiraca"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cities/AC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new();
    let panel = panel(&server, dir.path(), &recorder);

    assert_eq!(panel.update_cities("AL").await.unwrap(), 2);
    assert!(panel.set_city_checked("Maceió", true).await);

    let view = panel.snapshot().await;
    assert_eq!(view.state, "AL");
    assert_eq!(view.checked_cities(), vec!["Maceió".to_string()]);

    assert_eq!(panel.update_cities("AC").await.unwrap(), 0);
    assert!(panel.view().await.cities.is_empty());
}

#[tokio::test]
async fn slow_stale_response_does_not_overwrite_newer_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities/AC"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["Rio Branco"]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cities/AL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Maceió"])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new();
    let panel = panel(&server, dir.path(), &recorder);

    let (stale, fresh) = tokio::join!(panel.update_cities("AC"), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        panel.update_cities("AL").await
    });

    assert_eq!(stale.unwrap(), 0);
    assert_eq!(fresh.unwrap(), 1);
    let view = panel.snapshot().await;
    assert_eq!(view.state, "AL");
    assert_eq!(view.cities.len(), 1);
    assert_eq!(view.cities[0].value, "Maceió");
}

#[tokio::test]
async fn city_lookup_failure_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cities/ZZ"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new();
    let panel = panel(&server, dir.path(), &recorder);

    assert!(panel.update_cities("ZZ").await.is_err());
    assert!(panel.view().await.cities.is_empty());
}

#[tokio::test]
async fn save_fields_dialog_is_static_and_prechecked() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new();
    let panel = panel(&server, dir.path(), &recorder);

    panel.show_save_fields().await;
    {
        let view = panel.view().await;
        assert!(view.modal_open);
        assert_eq!(view.export_fields.len(), EXPORT_FIELDS.len());
        assert!(view.export_fields.iter().all(|f| f.checked));
        assert_eq!(view.export_fields[0].value, "Título");
    }

    assert!(panel.set_field_checked("LinkedIn", false).await);
    panel.close_modal().await;
    let view = panel.snapshot().await;
    assert!(!view.modal_open);
    assert_eq!(view.checked_fields().len(), EXPORT_FIELDS.len() - 1);
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn states_are_loaded_in_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["AL", "AC", "SP"])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new();
    let panel = panel(&server, dir.path(), &recorder);

    assert_eq!(panel.load_states().await.unwrap(), 3);
    assert_eq!(panel.view().await.states, vec!["AL", "AC", "SP"]);
}

#[tokio::test]
async fn state_lookup_failure_keeps_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/states"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["AL"])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/states"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new();
    let panel = panel(&server, dir.path(), &recorder);

    panel.load_states().await.unwrap();
    assert!(matches!(panel.load_states().await, Err(Error::Status { .. })));
    assert_eq!(panel.view().await.states, vec!["AL"]);
}

#[tokio::test]
async fn export_selection_keeps_only_known_requested_fields() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new();
    let panel = panel(&server, dir.path(), &recorder);

    let unknown = panel
        .select_export_fields(&["CNPJ".into(), "Fax".into(), "URL".into()])
        .await
        .unwrap();
    assert_eq!(unknown, vec!["Fax".to_string()]);
    assert_eq!(panel.view().await.checked_fields(), vec!["URL", "CNPJ"]);

    assert!(panel.select_export_fields(&[]).await.unwrap().is_empty());
    assert_eq!(panel.view().await.checked_fields().len(), EXPORT_FIELDS.len());
}

#[tokio::test]
async fn export_selection_with_only_unknown_fields_is_refused() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let recorder = Recorder::new();
    let panel = panel(&server, dir.path(), &recorder);

    let err = panel
        .select_export_fields(&["Fax".into(), "Telex".into()])
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::UnknownFields(f) if f.len() == 2));
    assert!(!panel.view().await.modal_open);
    assert_eq!(request_count(&server).await, 0);
}
