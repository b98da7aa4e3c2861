//! Check command handler

use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::utils::{ensure_success, prepare_request};
use hfetch_core::http::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH};
use hfetch_core::http::{HeaderName, HeaderValue, Request};
use std::io::Write;
use tracing::{info, instrument};

/// Handle the check command
///
/// Sends the recorded validators as conditional headers and reports whether
/// the resource changed. A changed resource is not a failure.
#[instrument(skip(args, config, out), fields(url = %args.request.url))]
pub async fn handle_check(args: CheckArgs, config: &Config, out: &mut impl Write) -> Result<()> {
    let mut prepared = prepare_request(&args.request, config, "GET")?;
    add_conditional(&mut prepared.request, IF_NONE_MATCH, &args.etag)?;
    add_conditional(&mut prepared.request, IF_MODIFIED_SINCE, &args.last_modified)?;

    let mut response = prepared.request.execute().await?;
    ensure_success(&response)?;

    let modified = response.is_modified(&args.etag, &args.last_modified);
    info!(status = response.status().as_u16(), modified, "Revalidated");

    writeln!(out, "{}", if modified { "modified" } else { "not-modified" })?;
    writeln!(out, "status: {}", response.status().as_u16())?;
    if !response.etag().is_empty() {
        writeln!(out, "etag: {}", response.etag())?;
    }
    if !response.last_modified().is_empty() {
        writeln!(out, "last-modified: {}", response.last_modified())?;
    }

    response.close();
    Ok(())
}

/// Set a conditional header unless it is blank or already supplied
fn add_conditional(request: &mut Request, name: HeaderName, value: &str) -> Result<()> {
    if value.is_empty() || request.headers().contains_key(&name) {
        return Ok(());
    }

    let header = HeaderValue::from_str(value)
        .map_err(|_| Error::invalid_args(format!("invalid validator for {}: '{}'", name, value)))?;
    request.headers_mut().insert(name, header);
    Ok(())
}
