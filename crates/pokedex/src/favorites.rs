use crate::prelude::{println, *};
use colored::Colorize;
use futures::future::join_all;
use pokedex_core::favorites::{load_favorites, save_favorites, FavoritesSet};
use pokedex_core::pokemon::{summarize, PokemonSummary};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::api::{CatalogSource, PokeClient};
use crate::pokemon::{format_summaries, to_json};

#[derive(Debug, clap::Parser)]
#[command(name = "favorites")]
#[command(about = "Manage favorite pokemon")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List favorite pokemon
    #[clap(name = "list")]
    List(ListOptions),

    /// Mark a pokemon as favorite
    #[clap(name = "add")]
    Add(ChangeOptions),

    /// Remove a pokemon from the favorites
    #[clap(name = "remove")]
    Remove(ChangeOptions),
}

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Only print the stored ids, without fetching the pokemon
    #[arg(long)]
    pub ids: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct ChangeOptions {
    /// Pokemon name or id
    pub pokemon: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct FavoritesOutput {
    pub path: PathBuf,
    pub ids: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pokemon: Vec<PokemonSummary>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ChangeOutput {
    pub id: u32,
    pub name: String,
    pub changed: bool,
    pub ids: Vec<u32>,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let path = global
        .favorites_path()
        .ok_or_eyre("Could not determine where to store favorites; pass --favorites-file")?;

    if global.verbose {
        println!("Favorites file: {}", path.display());
        println!();
    }

    match app.command {
        Commands::List(options) => {
            let output = if options.ids {
                favorites_ids(&path)?
            } else {
                let client = PokeClient::from_global(&global)?;
                favorites_data(&client, &path).await?
            };
            if options.json {
                println!("{}", to_json(&output)?);
            } else {
                print!("{}", format_favorites_text(&output));
            }
        }
        Commands::Add(options) => {
            let client = PokeClient::from_global(&global)?;
            let output = change_favorite(&client, &path, &options.pokemon, true).await?;
            print_change(&output, options.json, "added to", "already in")?;
        }
        Commands::Remove(options) => {
            let client = PokeClient::from_global(&global)?;
            let output = change_favorite(&client, &path, &options.pokemon, false).await?;
            print_change(&output, options.json, "removed from", "not in")?;
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<FavoritesSet> {
    load_favorites(path).map_err(|e| eyre!("Failed to read favorites: {}", e))
}

/// Stored ids only
pub fn favorites_ids(path: &Path) -> Result<FavoritesOutput> {
    Ok(FavoritesOutput {
        path: path.to_path_buf(),
        ids: load(path)?.ids(),
        pokemon: vec![],
    })
}

/// Stored ids with the card of every favorite that can still be fetched
pub async fn favorites_data<S: CatalogSource>(source: &S, path: &Path) -> Result<FavoritesOutput> {
    let ids = load(path)?.ids();
    let keys: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    let fetched = join_all(keys.iter().map(|key| source.get_pokemon(key))).await;

    let pokemon = ids
        .iter()
        .zip(fetched)
        .filter_map(|(id, result)| match result {
            Ok(pokemon) => Some(summarize(&pokemon)),
            Err(e) => {
                log::warn!("Skipping favorite {}: {}", id, e);
                None
            }
        })
        .collect();

    Ok(FavoritesOutput {
        path: path.to_path_buf(),
        ids,
        pokemon,
    })
}

/// Add or remove a favorite given its name or id
pub async fn change_favorite<S: CatalogSource>(
    source: &S,
    path: &Path,
    name_or_id: &str,
    add: bool,
) -> Result<ChangeOutput> {
    let pokemon = source
        .get_pokemon(name_or_id)
        .await
        .wrap_err_with(|| f!("Failed to fetch pokemon {}", name_or_id))?;

    let mut favorites = load(path)?;
    let changed = if add {
        favorites.insert(pokemon.id)
    } else {
        favorites.remove(pokemon.id)
    };
    if changed {
        save_favorites(path, &favorites).map_err(|e| eyre!("Failed to save favorites: {}", e))?;
    }

    Ok(ChangeOutput {
        id: pokemon.id,
        name: pokemon.name,
        changed,
        ids: favorites.ids(),
    })
}

fn print_change(output: &ChangeOutput, json: bool, done: &str, noop: &str) -> Result<()> {
    if json {
        println!("{}", to_json(output)?);
    } else if output.changed {
        println!("{} {} favorites", output.name.bold(), done.green());
    } else {
        println!("{} was {} favorites", output.name.bold(), noop.yellow());
    }
    Ok(())
}

fn format_favorites_text(output: &FavoritesOutput) -> String {
    if output.ids.is_empty() {
        return format!("{}\n", "No favorites yet. Add one with `pokedex favorites add <name>`.".yellow());
    }

    if output.pokemon.is_empty() {
        let ids: Vec<String> = output.ids.iter().map(|id| id.to_string()).collect();
        return format!("{}: {}\n", "Favorites".green(), ids.join(", "));
    }

    format_summaries(&output.pokemon)
}
