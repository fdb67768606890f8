use crate::prelude::{println, *};
use colored::Colorize;
use pokedex_core::pokemon::{summarize, PokemonSummary};
use serde::Serialize;

use crate::api::{search_pokemon, CatalogSource, PokeClient};

use super::{format_summary_line, to_json};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct SearchOptions {
    /// Exact pokemon name or id
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct SearchOutput {
    pub query: String,
    pub results: Vec<PokemonSummary>,
}

pub async fn run(options: SearchOptions, global: crate::Global) -> Result<()> {
    let client = PokeClient::from_global(&global)?;
    let output = search_data(&client, &options.query).await?;

    if options.json {
        println!("{}", to_json(&output)?);
        return Ok(());
    }

    if output.results.is_empty() {
        println!("{}", f!("No pokemon named \"{}\".", output.query).yellow());
    }
    for summary in &output.results {
        println!("{}", format_summary_line(summary));
    }

    Ok(())
}

/// Exact lookup; a miss is an empty result
pub async fn search_data<S: CatalogSource>(source: &S, query: &str) -> Result<SearchOutput> {
    let results = search_pokemon(source, query).await?;
    Ok(SearchOutput {
        query: query.trim().to_lowercase(),
        results: results.iter().map(summarize).collect(),
    })
}
