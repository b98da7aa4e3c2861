//! Send command handler

use crate::cli::SendArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::utils::{ensure_success, prepare_request, read_body_or_empty, write_body};
use std::fs;
use std::io::Write;
use tracing::{debug, info, instrument};

/// Handle the send command
#[instrument(skip(args, config, out), fields(url = %args.request.url))]
pub async fn handle_send(args: SendArgs, config: &Config, out: &mut impl Write) -> Result<()> {
    let payload = load_payload(&args)?;

    let prepared = prepare_request(&args.request, config, "POST")?;
    let request = prepared.request.json(&payload)?;
    debug!(method = %request.method(), "Sending JSON payload");

    let mut response = request.execute().await?;
    info!(status = response.status().as_u16(), "Response received");

    let body = read_body_or_empty(&mut response, prepared.max_body_size).await?;

    let pretty = if response.content_type().contains("json") {
        serde_json::from_slice::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
    } else {
        None
    };
    match pretty {
        Some(text) => writeln!(out, "{}", text)?,
        None => write_body(out, &body)?,
    }

    ensure_success(&response)
}

/// Parse the JSON payload from `--data` or `--file`
fn load_payload(args: &SendArgs) -> Result<serde_json::Value> {
    let raw = match (&args.data, &args.file) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => {
            if !path.exists() {
                return Err(Error::FileNotFound { path: path.clone() });
            }
            fs::read_to_string(path)?
        }
        (None, None) => return Err(Error::invalid_args("either --data or --file is required")),
    };

    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::utils::request_args;
    use mockito::{Matcher, Server};
    use std::path::PathBuf;

    fn send_args(url: String, data: Option<&str>, file: Option<PathBuf>) -> SendArgs {
        SendArgs {
            request: request_args(&url),
            data: data.map(str::to_string),
            file,
        }
    }

    #[tokio::test]
    async fn test_posts_json_and_pretty_prints() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/items")
            .match_header("content-type", "application/json; charset=UTF-8")
            .match_body(Matcher::Json(serde_json::json!({"name": "gear"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":1,"name":"gear"}"#)
            .create_async()
            .await;

        let mut out = Vec::new();
        handle_send(
            send_args(format!("{}/items", server.url()), Some(r#"{"name": "gear"}"#), None),
            &Config::default(),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n  \"id\": 1,\n  \"name\": \"gear\"\n}\n"
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_payload_from_file_with_method_override() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", "/items/1")
            .match_body(Matcher::Json(serde_json::json!({"qty": 4})))
            .with_status(204)
            .create_async()
            .await;

        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"qty": 4}}"#).unwrap();

        let mut args = send_args(
            format!("{}/items/1", server.url()),
            None,
            Some(file.path().to_path_buf()),
        );
        args.request.method = Some("PUT".to_string());

        let mut out = Vec::new();
        handle_send(args, &Config::default(), &mut out).await.unwrap();

        assert!(out.is_empty());
        mock.assert_async().await;
    }

    #[test]
    fn test_payload_errors() {
        let args = send_args("https://example.test/".to_string(), Some("{broken"), None);
        assert!(matches!(load_payload(&args), Err(Error::Json(_))));

        let args = send_args(
            "https://example.test/".to_string(),
            None,
            Some(PathBuf::from("/nonexistent/payload.json")),
        );
        assert!(matches!(load_payload(&args), Err(Error::FileNotFound { .. })));

        let args = send_args("https://example.test/".to_string(), None, None);
        assert!(matches!(load_payload(&args), Err(Error::InvalidArgs(_))));
    }
}
