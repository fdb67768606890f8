use crate::prelude::{println, *};
use colored::Colorize;
use pokedex_core::evolution::EvolutionStage;
use pokedex_core::pokemon::{display_number, summarize, PokemonSummary};
use serde::Serialize;

use crate::api::{CatalogSource, PokeClient};
use crate::evolution::evolution_for;

use super::{format_summary_line, spinner, to_json};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct EvolutionOptions {
    /// Pokemon name or id
    pub pokemon: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct EvolutionOutput {
    pub pokemon: PokemonSummary,
    pub stages: Vec<EvolutionStage>,
}

pub async fn run(options: EvolutionOptions, global: crate::Global) -> Result<()> {
    let client = PokeClient::from_global(&global)?;
    let progress = spinner(&f!("Resolving evolution chain of {}...", options.pokemon));
    let output = evolution_data(&client, &options.pokemon).await;
    progress.finish_and_clear();
    let output = output?;

    if options.json {
        println!("{}", to_json(&output)?);
    } else {
        print!("{}", format_evolution_text(&output));
    }

    Ok(())
}

/// Fetches a pokemon and the stages of its evolution chain
pub async fn evolution_data<S: CatalogSource>(
    source: &S,
    name_or_id: &str,
) -> Result<EvolutionOutput> {
    let (pokemon, stages) = evolution_for(source, name_or_id)
        .await
        .wrap_err_with(|| f!("Failed to resolve evolution chain of {}", name_or_id))?;

    Ok(EvolutionOutput {
        pokemon: summarize(&pokemon),
        stages,
    })
}

fn format_evolution_text(output: &EvolutionOutput) -> String {
    let mut result = String::new();
    result.push_str(&format!("\n{}\n", format_summary_line(&output.pokemon)));

    if output.stages.is_empty() {
        result.push_str(&format!("{}\n", "Does not evolve.".bright_black()));
        return result;
    }

    result.push_str(&format!("\n{}\n", "EVOLUTION CHAIN".bright_yellow().bold()));
    for stage in &output.stages {
        let marker = if stage.id == output.pokemon.id {
            "▶".bright_green().bold()
        } else {
            " ".normal()
        };
        result.push_str(&format!(
            "{} {} {}\n",
            marker,
            display_number(stage.id).bright_black(),
            stage.name.bold()
        ));
    }
    result
}
