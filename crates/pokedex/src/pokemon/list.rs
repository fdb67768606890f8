use crate::prelude::{println, *};
use colored::Colorize;
use pokedex_core::pokemon::{transform_list_page, ListOutput};

use crate::api::{CatalogSource, PokeClient};

use super::{spinner, to_json};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ListOptions {
    /// Number of pokemon per page [default: --page-size]
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Position of the first pokemon to list
    #[arg(short, long, default_value = "0")]
    pub offset: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListOptions {
    /// `--limit` when given, the configured page size otherwise
    pub fn limit_or(&self, page_size: usize) -> usize {
        self.limit.unwrap_or(page_size)
    }
}

pub async fn run(options: ListOptions, global: crate::Global) -> Result<()> {
    let limit = options.limit_or(global.page_size);
    if global.verbose {
        println!(
            "Fetching pokemon {}..{}",
            options.offset,
            options.offset + limit
        );
    }

    let client = PokeClient::from_global(&global)?;
    let progress = spinner("Fetching pokemon...");
    let output = list_data(&client, limit, options.offset).await;
    progress.finish_and_clear();
    let output = output?;

    if options.json {
        println!("{}", to_json(&output)?);
    } else {
        print!("{}", format_list_text(&output));
    }

    Ok(())
}

/// Fetches one list page and returns it as a structured ListOutput
pub async fn list_data<S: CatalogSource>(
    source: &S,
    limit: usize,
    offset: usize,
) -> Result<ListOutput> {
    if limit == 0 {
        return Err(eyre!("Limit must be greater than 0"));
    }

    let page = source.list_pokemon(limit, offset).await?;
    Ok(transform_list_page(page, limit, offset))
}

fn format_list_text(output: &ListOutput) -> String {
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(60).bright_cyan()));
    let header = if output.entries.is_empty() {
        f!("NO POKEMON AT OFFSET {} OF {}", output.offset, output.total)
    } else {
        f!(
            "POKEMON {}-{} OF {}",
            output.offset + 1,
            output.offset + output.entries.len(),
            output.total
        )
    };
    result.push_str(&format!("{}\n", header.bright_cyan().bold()));
    result.push_str(&format!("{}\n", "=".repeat(60).bright_cyan()));

    if output.entries.is_empty() {
        result.push_str(&format!("\n{}\n", "No pokemon on this page.".yellow()));
    } else {
        let mut table = new_table();
        table.add_row(prettytable::row!["ID", "Name", "Show"]);
        for entry in &output.entries {
            table.add_row(prettytable::row![
                entry.id,
                entry.name.bold(),
                f!("pokedex get {}", entry.name).cyan()
            ]);
        }
        result.push('\n');
        result.push_str(&table.to_string());
    }

    if let Some(next) = &output.next_page_command {
        result.push_str(&format!("\n{}: {}\n", "Next page".green(), next.cyan()));
    }
    result.push('\n');
    result
}
