use crate::prelude::{println, *};
use pokedex_core::pokemon::{detail, PokemonDetail};

use crate::api::{CatalogSource, PokeClient};

use super::{format_detail, spinner, to_json};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct GetOptions {
    /// Pokemon name or National Dex id (e.g., "pikachu" or "25")
    pub pokemon: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: GetOptions, global: crate::Global) -> Result<()> {
    let client = PokeClient::from_global(&global)?;
    let progress = spinner(&f!("Fetching {}...", options.pokemon));
    let output = get_data(&client, &options.pokemon).await;
    progress.finish_and_clear();
    let output = output?;

    if options.json {
        println!("{}", to_json(&output)?);
    } else {
        print!("{}", format_detail(&output));
    }

    Ok(())
}

/// Fetches a pokemon and returns its detail card
pub async fn get_data<S: CatalogSource>(source: &S, name_or_id: &str) -> Result<PokemonDetail> {
    let name_or_id = name_or_id.trim();
    if name_or_id.is_empty() {
        return Err(eyre!("A pokemon name or id is required"));
    }

    let pokemon = source
        .get_pokemon(name_or_id)
        .await
        .wrap_err_with(|| f!("Failed to fetch pokemon {}", name_or_id))?;
    Ok(detail(&pokemon))
}
