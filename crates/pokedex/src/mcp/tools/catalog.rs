use pokedex_core::catalog::Intent;
use serde::Deserialize;

use super::{parse_arguments, text_result, JsonRpcError, ServerContext};
use crate::api::CatalogSource;

pub async fn handle_catalog_view<S: CatalogSource>(
    context: &ServerContext<S>,
) -> Result<serde_json::Value, JsonRpcError> {
    let view = context.session.ensure_started().await;
    text_result(&view)
}

pub async fn handle_catalog_dispatch<S: CatalogSource>(
    arguments: Option<serde_json::Value>,
    context: &ServerContext<S>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct CatalogDispatchArgs {
        intent: Intent,
    }

    let args: CatalogDispatchArgs = parse_arguments(arguments)?;
    log::debug!("catalog_dispatch: {:?}", args.intent);

    context.session.ensure_started().await;
    let view = context.session.dispatch(args.intent).await;
    text_result(&view)
}
