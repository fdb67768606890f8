use crate::prelude::{eprintln, *};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::ServerContext;
use crate::api::PokeClient;

pub async fn run_stdio(context: ServerContext<PokeClient>) -> Result<()> {
    let verbose = context.global.verbose;
    if verbose {
        eprintln!("Starting MCP server with stdio transport...");
        eprintln!();
    }

    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            break; // EOF
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if verbose {
            eprintln!("Received: {trimmed}");
        }

        let response = super::handle_request(trimmed, &context).await;
        let response_json = serde_json::to_string(&response)?;

        if verbose {
            eprintln!("Sending: {response_json}");
        }

        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    log::debug!("cache: {:?}", context.source().cache_stats());
    Ok(())
}
