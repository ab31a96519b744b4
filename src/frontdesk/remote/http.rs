use super::{RemoteSheets, SheetBlock};
use crate::auth;
use crate::error::{FrontdeskError, Result};
use crate::model::{sheet, SheetKey, SHEETS};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Sheets v4 values-API client over blocking reqwest.
pub struct HttpRemote {
    base: String,
    spreadsheet_id: String,
    token_path: PathBuf,
    client: Option<reqwest::blocking::Client>,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BatchGetResponse {
    #[serde(default, rename = "valueRanges")]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl HttpRemote {
    pub fn new(base: String, spreadsheet_id: String, token_path: PathBuf) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            spreadsheet_id,
            token_path,
            client: None,
            token: None,
        }
    }

    fn client(&self) -> Result<&reqwest::blocking::Client> {
        self.client
            .as_ref()
            .ok_or_else(|| FrontdeskError::Remote("client not connected".into()))
    }

    fn token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| FrontdeskError::Remote("not signed in".into()))
    }

    fn spreadsheet_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}", self.base, self.spreadsheet_id)
    }

    // Range titles can contain spaces ("To do!A:ZZ"); '!' and ':' are legal
    // path characters as-is.
    fn encode_range(range: &str) -> String {
        range.replace(' ', "%20")
    }
}

impl RemoteSheets for HttpRemote {
    fn connect(&mut self) -> Result<()> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        self.client = Some(client);
        Ok(())
    }

    fn authorize(&mut self) -> Result<bool> {
        match auth::load(&self.token_path)? {
            Some(creds) if !creds.access_token.is_empty() => {
                self.token = Some(creds.access_token);
                Ok(true)
            }
            _ => {
                self.token = None;
                Ok(false)
            }
        }
    }

    fn handshake(&mut self) -> Result<()> {
        // Nothing to validate while signed out; the gate keeps sync and the
        // dataset fetch off until a session appears anyway.
        let Some(token) = self.token.clone() else {
            return Ok(());
        };
        let url = format!("{}?fields=spreadsheetId", self.spreadsheet_url());
        self.client()?
            .get(url)
            .bearer_auth(token)
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn fetch_all(&mut self) -> Result<Vec<SheetBlock>> {
        let url = format!("{}/values:batchGet", self.spreadsheet_url());
        let ranges: Vec<(&str, String)> =
            SHEETS.iter().map(|s| ("ranges", s.range())).collect();
        let response: BatchGetResponse = self
            .client()?
            .get(url)
            .query(&ranges)
            .bearer_auth(self.token()?)
            .send()?
            .error_for_status()?
            .json()?;

        if response.value_ranges.len() != SHEETS.len() {
            return Err(FrontdeskError::Remote(format!(
                "batch response has {} blocks, expected {}",
                response.value_ranges.len(),
                SHEETS.len()
            )));
        }
        Ok(response
            .value_ranges
            .into_iter()
            .map(|vr| vr.values)
            .collect())
    }

    fn append(&mut self, key: SheetKey, values: &[String]) -> Result<()> {
        let range = Self::encode_range(&sheet(key).range());
        let url = format!("{}/values/{}:append", self.spreadsheet_url(), range);
        tracing::info!(sheet = %key, cells = values.len(), "appending row");
        self.client()?
            .post(url)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(self.token()?)
            .json(&serde_json::json!({ "values": [values] }))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use std::path::Path;

    fn connected_remote(base: String, dir: &Path) -> HttpRemote {
        let token_path = dir.join("token.json");
        auth::save(&token_path, &Credentials { access_token: "tok".into() }).unwrap();
        let mut remote = HttpRemote::new(base, "sheet123".into(), token_path);
        remote.connect().unwrap();
        assert!(remote.authorize().unwrap());
        remote
    }

    #[test]
    fn authorize_without_token_is_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut remote = HttpRemote::new(
            "http://localhost".into(),
            "sheet123".into(),
            dir.path().join("token.json"),
        );
        assert!(!remote.authorize().unwrap());
    }

    #[test]
    fn fetch_all_parses_value_ranges_positionally() {
        let mut server = mockito::Server::new();
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({
            "valueRanges": [
                { "values": [["roster"], ["NAME"], ["Ada"]] },
                {},
                { "values": [] },
            ]
        })
        .to_string();
        let mock = server
            .mock("GET", "/v4/spreadsheets/sheet123/values:batchGet")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create();

        let mut remote = connected_remote(server.url(), dir.path());
        let blocks = remote.fetch_all().unwrap();
        mock.assert();

        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0][2], vec!["Ada".to_string()]);
        assert!(blocks[1].is_empty(), "an empty value range is an empty block");
    }

    #[test]
    fn fetch_all_rejects_short_responses() {
        let mut server = mockito::Server::new();
        let dir = tempfile::tempdir().unwrap();
        let _mock = server
            .mock("GET", "/v4/spreadsheets/sheet123/values:batchGet")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"valueRanges": [{}]}"#)
            .create();

        let mut remote = connected_remote(server.url(), dir.path());
        assert!(remote.fetch_all().is_err());
    }

    #[test]
    fn append_posts_to_the_sheet_range() {
        let mut server = mockito::Server::new();
        let dir = tempfile::tempdir().unwrap();
        let mock = server
            .mock("POST", "/v4/spreadsheets/sheet123/values/Checkins!A:ZZ:append")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("valueInputOption".into(), "USER_ENTERED".into()),
                mockito::Matcher::UrlEncoded("insertDataOption".into(), "INSERT_ROWS".into()),
            ]))
            .with_status(200)
            .with_body("{}")
            .create();

        let mut remote = connected_remote(server.url(), dir.path());
        remote
            .append(SheetKey::Checkins, &["'abcde".into(), "NEW".into()])
            .unwrap();
        mock.assert();
    }

    #[test]
    fn handshake_reports_auth_failures() {
        let mut server = mockito::Server::new();
        let dir = tempfile::tempdir().unwrap();
        let _mock = server
            .mock("GET", "/v4/spreadsheets/sheet123")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .create();

        let mut remote = connected_remote(server.url(), dir.path());
        assert!(remote.handshake().is_err());
    }
}
