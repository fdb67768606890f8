use crate::prelude::{println, *};
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use pokedex_core::pokemon::{PokemonDetail, PokemonSummary};
use pokedex_core::types::{hex_to_rgb, type_color};
use std::time::Duration;

pub mod evolution;
pub mod get;
pub mod list;
pub mod search;
pub mod types;

// Re-export public data functions
pub use evolution::evolution_data;
pub use get::get_data;
pub use list::list_data;
pub use search::search_data;
pub use types::{by_type_data, types_data};

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List one page of pokemon names
    #[clap(name = "list")]
    List(list::ListOptions),

    /// Show a pokemon with its stats and sprites
    #[clap(name = "get")]
    Get(get::GetOptions),

    /// List the selectable pokemon types
    #[clap(name = "types")]
    Types(types::TypesOptions),

    /// List pokemon of one type
    #[clap(name = "type")]
    Type(types::TypeOptions),

    /// Look a pokemon up by exact name or id
    #[clap(name = "search")]
    Search(search::SearchOptions),

    /// Show the evolution chain a pokemon belongs to
    #[clap(name = "evolution")]
    Evolution(evolution::EvolutionOptions),
}

pub async fn run(command: Commands, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("PokeAPI Base: {}", global.base_url);
        println!();
    }

    match command {
        Commands::List(options) => list::run(options, global).await,
        Commands::Get(options) => get::run(options, global).await,
        Commands::Types(options) => types::run(options, global).await,
        Commands::Type(options) => types::run_by_type(options, global).await,
        Commands::Search(options) => search::run(options, global).await,
        Commands::Evolution(options) => evolution::run(options, global).await,
    }
}

/// Spinner shown on stderr while a request is running
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Paint `text` with a `#RRGGBB` color
pub fn paint(text: &str, hex: &str) -> ColoredString {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

/// Type names joined and painted with their palette colors
pub fn format_types(types: &[String]) -> String {
    types
        .iter()
        .map(|t| paint(t, type_color(t)).bold().to_string())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// One line per pokemon: number, name and types
pub fn format_summary_line(summary: &PokemonSummary) -> String {
    format!(
        "{} {} {}",
        summary.number.bright_black(),
        paint(&summary.name, &summary.color).bold(),
        format_types(&summary.types)
    )
}

pub fn format_summaries(summaries: &[PokemonSummary]) -> String {
    let mut table = new_table();
    table.add_row(prettytable::row!["#", "Name", "Types"]);
    for summary in summaries {
        table.add_row(prettytable::row![
            summary.number,
            paint(&summary.name, &summary.color).bold(),
            format_types(&summary.types)
        ]);
    }
    table.to_string()
}

fn stat_bar(percent: f64) -> String {
    const WIDTH: usize = 20;
    let filled = ((percent / 100.0) * WIDTH as f64).round() as usize;
    let filled = filled.min(WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(WIDTH - filled))
}

/// Detail card: header, measurements, stat bars and sprite links
pub fn format_detail(detail: &PokemonDetail) -> String {
    let summary = &detail.summary;
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(60).bright_cyan()));
    result.push_str(&format!(
        "{} {}\n",
        summary.number.bright_black(),
        paint(&summary.name.to_uppercase(), &summary.color).bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(60).bright_cyan()));

    result.push_str(&format!(
        "\n{}: {}\n",
        "Types".green(),
        format_types(&summary.types)
    ));
    result.push_str(&format!(
        "{}: {} m | {}: {} kg\n",
        "Height".green(),
        detail.height_m,
        "Weight".green(),
        detail.weight_kg
    ));
    if !summary.image.is_empty() {
        result.push_str(&format!(
            "{}: {}\n",
            "Image".green(),
            summary.image.cyan().underline()
        ));
    }

    if !detail.stats.is_empty() {
        result.push_str(&format!("\n{}\n", "BASE STATS".bright_yellow().bold()));
        let mut table = new_table();
        for stat in &detail.stats {
            table.add_row(prettytable::row![
                stat.label,
                stat.value,
                paint(&stat_bar(stat.percent), &summary.color)
            ]);
        }
        result.push_str(&table.to_string());
    }

    if !detail.sprites.is_empty() {
        result.push_str(&format!("\n{}\n", "SPRITES".bright_yellow().bold()));
        for sprite in &detail.sprites {
            result.push_str(&format!(
                "  {}: {}\n",
                sprite.label.green(),
                sprite.url.cyan()
            ));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fake_pokemon;
    use pokedex_core::pokemon::{detail, summarize, StatSlot};

    #[test]
    fn test_stat_bar_bounds() {
        assert_eq!(stat_bar(0.0), "░".repeat(20));
        assert_eq!(stat_bar(100.0), "█".repeat(20));
        assert_eq!(stat_bar(50.0).chars().filter(|c| *c == '█').count(), 10);
    }

    #[test]
    fn test_format_summaries_lists_every_pokemon() {
        let summaries: Vec<PokemonSummary> =
            (1..=3).map(|id| summarize(&fake_pokemon(id))).collect();
        let table = format_summaries(&summaries);
        assert!(table.contains("#001"));
        assert!(table.contains("mon2"));
        assert!(table.contains("#003"));
    }

    #[test]
    fn test_format_detail_sections() {
        let mut pokemon = fake_pokemon(25);
        pokemon.stats = vec![StatSlot {
            base_stat: 90,
            effort: 2,
            stat: crate::testing::named("special-attack", "https://pokeapi.co/api/v2/stat/4/"),
        }];
        let formatted = format_detail(&detail(&pokemon));
        assert!(formatted.contains("MON25"));
        assert!(formatted.contains("BASE STATS"));
        assert!(formatted.contains("special attack"));
        assert!(formatted.contains("https://img.test/25.png"));
    }
}
