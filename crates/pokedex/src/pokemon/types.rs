use crate::prelude::{println, *};
use colored::Colorize;
use pokedex_core::pokemon::{summarize, PokemonSummary};
use pokedex_core::types::type_color;
use serde::Serialize;

use crate::api::{get_pokemon_by_type, CatalogSource, PokeClient, TYPE_MEMBER_LIMIT};

use super::{format_summaries, paint, spinner, to_json};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct TypesOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct TypeOptions {
    /// Type name (e.g., "fire")
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TypeOutput {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct TypeMembersOutput {
    pub type_name: String,
    pub color: String,
    pub count: usize,
    pub limit: usize,
    pub pokemon: Vec<PokemonSummary>,
}

pub async fn run(options: TypesOptions, global: crate::Global) -> Result<()> {
    let client = PokeClient::from_global(&global)?;
    let types = types_data(&client).await?;

    if options.json {
        println!("{}", to_json(&types)?);
        return Ok(());
    }

    let mut table = new_table();
    table.add_row(prettytable::row!["Type", "Color", "List"]);
    for t in &types {
        table.add_row(prettytable::row![
            paint(&t.name, &t.color).bold(),
            t.color,
            f!("pokedex type {}", t.name).cyan()
        ]);
    }
    table.printstd();

    Ok(())
}

pub async fn run_by_type(options: TypeOptions, global: crate::Global) -> Result<()> {
    let client = PokeClient::from_global(&global)?;
    let progress = spinner(&f!("Fetching {} pokemon...", options.name));
    let output = by_type_data(&client, &options.name).await;
    progress.finish_and_clear();
    let output = output?;

    if options.json {
        println!("{}", to_json(&output)?);
        return Ok(());
    }

    println!(
        "\n{} ({} pokemon)\n",
        paint(&output.type_name.to_uppercase(), &output.color).bold(),
        output.count
    );
    if output.pokemon.is_empty() {
        println!("{}", "No pokemon of this type.".yellow());
    } else {
        print!("{}", format_summaries(&output.pokemon));
    }
    if output.count == output.limit {
        println!(
            "\n{}",
            f!("Only the first {} members are listed.", output.limit).bright_black()
        );
    }

    Ok(())
}

/// Fetches the selectable types with their palette colors
pub async fn types_data<S: CatalogSource>(source: &S) -> Result<Vec<TypeOutput>> {
    let types = source.get_types().await?;
    Ok(types
        .into_iter()
        .map(|t| TypeOutput {
            color: type_color(&t.name).to_string(),
            name: t.name,
        })
        .collect())
}

/// Fetches the members of a type as cards
pub async fn by_type_data<S: CatalogSource>(
    source: &S,
    type_name: &str,
) -> Result<TypeMembersOutput> {
    let type_name = type_name.trim().to_lowercase();
    let pokemon = get_pokemon_by_type(source, &type_name)
        .await
        .wrap_err_with(|| f!("Failed to list pokemon of type {}", type_name))?;
    let pokemon: Vec<PokemonSummary> = pokemon.iter().map(summarize).collect();

    Ok(TypeMembersOutput {
        color: type_color(&type_name).to_string(),
        count: pokemon.len(),
        limit: TYPE_MEMBER_LIMIT,
        type_name,
        pokemon,
    })
}
