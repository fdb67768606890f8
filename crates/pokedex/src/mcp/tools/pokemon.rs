use serde::Deserialize;

use super::{execution_error, parse_arguments, text_result, JsonRpcError, ServerContext};
use crate::api::CatalogSource;

pub async fn handle_pokemon_list<S: CatalogSource>(
    arguments: Option<serde_json::Value>,
    context: &ServerContext<S>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct PokemonListArgs {
        limit: Option<usize>,
        offset: Option<usize>,
    }

    let args: PokemonListArgs = parse_arguments(arguments)?;
    let list_data = crate::pokemon::list_data(
        context.source(),
        args.limit.unwrap_or(context.global.page_size),
        args.offset.unwrap_or(0),
    )
    .await
    .map_err(execution_error)?;

    text_result(&list_data)
}

#[derive(Deserialize)]
struct PokemonArgs {
    pokemon: String,
}

pub async fn handle_pokemon_get<S: CatalogSource>(
    arguments: Option<serde_json::Value>,
    context: &ServerContext<S>,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: PokemonArgs = parse_arguments(arguments)?;
    let detail = crate::pokemon::get_data(context.source(), &args.pokemon)
        .await
        .map_err(execution_error)?;

    text_result(&detail)
}

pub async fn handle_pokemon_types<S: CatalogSource>(
    context: &ServerContext<S>,
) -> Result<serde_json::Value, JsonRpcError> {
    let types = crate::pokemon::types_data(context.source())
        .await
        .map_err(execution_error)?;

    text_result(&types)
}

pub async fn handle_pokemon_by_type<S: CatalogSource>(
    arguments: Option<serde_json::Value>,
    context: &ServerContext<S>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct PokemonByTypeArgs {
        #[serde(rename = "type")]
        type_name: String,
    }

    let args: PokemonByTypeArgs = parse_arguments(arguments)?;
    let members = crate::pokemon::by_type_data(context.source(), &args.type_name)
        .await
        .map_err(execution_error)?;

    text_result(&members)
}

pub async fn handle_pokemon_search<S: CatalogSource>(
    arguments: Option<serde_json::Value>,
    context: &ServerContext<S>,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Deserialize)]
    struct PokemonSearchArgs {
        query: String,
    }

    let args: PokemonSearchArgs = parse_arguments(arguments)?;
    let results = crate::pokemon::search_data(context.source(), &args.query)
        .await
        .map_err(execution_error)?;

    text_result(&results)
}

pub async fn handle_pokemon_evolution<S: CatalogSource>(
    arguments: Option<serde_json::Value>,
    context: &ServerContext<S>,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: PokemonArgs = parse_arguments(arguments)?;
    let evolution = crate::pokemon::evolution_data(context.source(), &args.pokemon)
        .await
        .map_err(execution_error)?;

    text_result(&evolution)
}
