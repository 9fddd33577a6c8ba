//! GoogleTransport against wiremock servers standing in for Sheets and Drive

use gvz_http::HttpError;
use gvz_sync::wire::{BatchRequest, DeleteSheetRequest};
use gvz_sync::{
    AuthProvider, GatewayConfig, GoogleTransport, SpreadsheetTransport, SyncError, TokenAuth,
    UserProfile,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn transport(server: &MockServer, signed_in: bool) -> GoogleTransport {
    let auth = Arc::new(TokenAuth::new("test-token", UserProfile::default()));
    if signed_in {
        auth.sign_in().await.unwrap();
    }
    let config = GatewayConfig {
        sheets_base_url: format!("{}/v4", server.uri()),
        drive_base_url: format!("{}/drive/v3", server.uri()),
        ..Default::default()
    };
    GoogleTransport::new(&config, auth).unwrap()
}

#[tokio::test]
async fn test_list_files_follows_page_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("pageToken", "page-2"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "b", "name": "Beta", "mimeType": "application/vnd.google-apps.spreadsheet"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", "trashed = false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "a", "name": "Alpha"}],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let files = transport(&server, true)
        .await
        .list_files("trashed = false")
        .await
        .unwrap();
    let ids: Vec<&str> = files.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn test_cell_data_sends_every_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/abc"))
        .and(query_param("ranges", "'Members'!1:2"))
        .and(query_param("ranges", "'Events'!1:2"))
        .and(query_param("fields", "sheets/data/rowData/values/formattedValue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "abc",
            "sheets": [
                {"data": [{"rowData": [{"values": [{"formattedValue": "name"}]}]}]},
                {"data": [{"rowData": []}]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ranges = vec!["'Members'!1:2".to_string(), "'Events'!1:2".to_string()];
    let spreadsheet = transport(&server, true)
        .await
        .get_cell_data("abc", &ranges, "sheets/data/rowData/values/formattedValue")
        .await
        .unwrap();
    assert_eq!(spreadsheet.sheets.len(), 2);
    assert_eq!(
        spreadsheet.sheets[0].row(0).unwrap().values[0]["formattedValue"],
        "name"
    );
}

#[tokio::test]
async fn test_batch_update_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/abc:batchUpdate"))
        .and(body_json(json!({"requests": [{"deleteSheet": {"sheetId": 0}}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "abc",
            "replies": [{}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport(&server, true)
        .await
        .batch_update(
            "abc",
            vec![BatchRequest::DeleteSheet(DeleteSheetRequest { sheet_id: 0 })],
        )
        .await
        .unwrap();
    assert_eq!(response.replies.len(), 1);
}

#[tokio::test]
async fn test_append_uses_user_entered_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v4/spreadsheets/abc/values/.+:append$"))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(query_param("insertDataOption", "INSERT_ROWS"))
        .and(body_json(json!({
            "range": "'Members'!A1:B1",
            "majorDimension": "ROWS",
            "values": [["ada", "12.5"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "abc",
            "updates": {"updatedRows": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = transport(&server, true)
        .await
        .append_values(
            "abc",
            "'Members'!A1:B1",
            vec![vec!["ada".to_string(), "12.5".to_string()]],
        )
        .await
        .unwrap();
    assert_eq!(response.updates.unwrap().updated_rows, Some(1));
}

#[tokio::test]
async fn test_error_envelope_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;

    let err = transport(&server, true)
        .await
        .get_spreadsheet("missing")
        .await
        .unwrap_err();
    match err {
        SyncError::Http(HttpError::Status { code, status, .. }) => {
            assert_eq!(code, 404);
            assert_eq!(status, "NOT_FOUND");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_signed_out_transport_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = transport(&server, false)
        .await
        .create_spreadsheet("Club")
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::NotSignedIn));
}
