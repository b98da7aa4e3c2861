//! Get command handler

use crate::cli::GetArgs;
use crate::config::Config;
use crate::error::Result;
use crate::handlers::utils::{
    ensure_success, prepare_request, read_body_or_empty, write_body, write_head,
};
use std::io::Write;
use tracing::{info, instrument};

/// Handle the get command
#[instrument(skip(args, config, out), fields(url = %args.request.url))]
pub async fn handle_get(args: GetArgs, config: &Config, out: &mut impl Write) -> Result<()> {
    let prepared = prepare_request(&args.request, config, "GET")?;
    let mut response = prepared.request.execute().await?;

    info!(
        status = response.status().as_u16(),
        effective_url = %response.effective_url(),
        "Response received"
    );

    if args.include {
        write_head(out, &response)?;
    }

    let body = read_body_or_empty(&mut response, prepared.max_body_size).await?;
    write_body(out, &body)?;

    ensure_success(&response)
}
