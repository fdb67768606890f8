use crate::prelude::{println, *};
use colored::Colorize;
use pokedex_core::catalog::{CatalogView, EvolutionStatus, Intent, Phase};
use pokedex_core::pokemon::display_number;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::PokeClient;
use crate::pokemon::{format_detail, format_summaries, paint};
use crate::session::CatalogSession;

#[derive(Debug, clap::Args)]
pub struct BrowseOptions {
    /// Print the view model as JSON after each command
    #[arg(long)]
    pub json: bool,
}

/// A line typed during a browse session
#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Intent(Intent),
    Help,
    Quit,
}

const HELP: &str = "\
Commands:
  search <text>   filter loaded pokemon by name or id (empty text clears it)
  type <name>     toggle a type filter
  fav <id>        toggle a favorite
  favs            toggle favorites-only
  clear           clear every filter
  show <id>       open a detail card with its evolution chain
  close           close the detail card
  more            load the next page (or just press enter)
  retry           retry a failed initial load
  help            show this help
  quit            leave";

pub async fn run(options: BrowseOptions, global: crate::Global) -> Result<()> {
    let client = PokeClient::from_global(&global)?;
    let session = CatalogSession::new(client, global.page_size, global.favorites_path());

    if global.verbose {
        println!("PokeAPI Base: {}", global.base_url);
        println!("Page size: {}", global.page_size);
    }

    let view = session.ensure_started().await;
    render(&view, options.json)?;
    println!("{}", "Type `help` for the list of commands.".bright_black());

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();

    loop {
        print!("{} ", ">".bright_cyan().bold());
        std::io::Write::flush(&mut std::io::stdout())?;

        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break; // EOF
        }

        match parse_command(&line) {
            Ok(BrowseCommand::Quit) => break,
            Ok(BrowseCommand::Help) => println!("{HELP}"),
            Ok(BrowseCommand::Intent(intent)) => {
                log::debug!("browse intent: {:?}", intent);
                let view = session.dispatch(intent).await;
                render(&view, options.json)?;
            }
            Err(e) => println!("{}", e.to_string().red()),
        }
    }

    log::debug!("cache: {:?}", session.source().cache_stats());
    Ok(())
}

fn parse_id(word: &str, arg: &str) -> Result<u32> {
    let arg = arg.trim().trim_start_matches('#');
    if arg.is_empty() {
        return Err(eyre!("`{}` needs a pokemon id", word));
    }
    arg.parse::<u32>()
        .map_err(|_| eyre!("Invalid pokemon id: {}", arg))
}

pub fn parse_command(line: &str) -> Result<BrowseCommand> {
    let line = line.trim();
    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (line, ""),
    };

    let intent = match word.to_lowercase().as_str() {
        "" | "more" | "m" => Intent::RequestLoadMore,
        "search" | "q" => Intent::SetQuery {
            query: arg.to_string(),
        },
        "type" | "t" => {
            if arg.is_empty() {
                return Err(eyre!("`type` needs a type name"));
            }
            Intent::ToggleType {
                name: arg.to_lowercase(),
            }
        }
        "fav" | "f" => Intent::ToggleFavorite {
            id: parse_id(word, arg)?,
        },
        "favs" => Intent::ToggleFavoritesOnly,
        "clear" => Intent::ClearFilters,
        "show" | "s" => Intent::SelectItem {
            id: parse_id(word, arg)?,
        },
        "close" => Intent::CloseDetail,
        "retry" => Intent::Retry,
        "help" | "h" | "?" => return Ok(BrowseCommand::Help),
        "quit" | "exit" => return Ok(BrowseCommand::Quit),
        other => return Err(eyre!("Unknown command: {} (try `help`)", other)),
    };

    Ok(BrowseCommand::Intent(intent))
}

fn render(view: &CatalogView, json: bool) -> Result<()> {
    if json {
        println!("{}", crate::pokemon::to_json(view)?);
    } else {
        print!("{}", format_view(view));
    }
    Ok(())
}

fn format_view(view: &CatalogView) -> String {
    let mut result = String::new();

    if let Phase::Failed { error } = &view.phase {
        result.push_str(&format!(
            "\n{} {}\n{}\n",
            "Failed to load pokemon:".red().bold(),
            error,
            "Type `retry` to try again.".yellow()
        ));
        return result;
    }
    if view.loading {
        result.push_str(&format!("\n{}\n", "Loading...".bright_black()));
        return result;
    }

    if let Some(detail) = &view.detail {
        result.push_str(&format_detail(&detail.pokemon));
        let star = if detail.is_favorite { "★ favorite" } else { "☆ not a favorite" };
        result.push_str(&format!("{}\n", star.yellow()));

        match &detail.evolution {
            EvolutionStatus::Loading => {
                result.push_str(&format!("{}\n", "Loading evolution chain...".bright_black()))
            }
            EvolutionStatus::Failed { error } => result.push_str(&format!(
                "{} {}\n",
                "Evolution chain unavailable:".red(),
                error
            )),
            EvolutionStatus::Loaded { stages } if stages.is_empty() => {
                result.push_str(&format!("{}\n", "Does not evolve.".bright_black()))
            }
            EvolutionStatus::Loaded { stages } => {
                let chain: Vec<String> = stages
                    .iter()
                    .map(|s| format!("{} {}", display_number(s.id), s.name))
                    .collect();
                result.push_str(&format!(
                    "{}: {}\n",
                    "Evolution".green(),
                    chain.join(" → ")
                ));
            }
        }
        result.push_str(&format!("{}\n", "Type `close` to go back.".bright_black()));
        return result;
    }

    let selected: Vec<String> = view
        .types
        .iter()
        .filter(|t| t.selected)
        .map(|t| paint(&t.name, &t.color).bold().to_string())
        .collect();

    result.push('\n');
    if !view.query.is_empty() {
        result.push_str(&format!("{}: \"{}\"  ", "Search".green(), view.query));
    }
    if !selected.is_empty() {
        result.push_str(&format!("{}: {}  ", "Types".green(), selected.join(", ")));
    }
    if view.favorites_only {
        result.push_str(&format!("{}  ", "★ favorites only".yellow()));
    }
    result.push_str(&format!(
        "{}\n",
        f!(
            "{} of {} loaded pokemon shown",
            view.items.len(),
            view.loaded_count
        )
        .bright_black()
    ));

    if view.items.is_empty() {
        result.push_str(&format!("{}\n", "No pokemon match the current filters.".yellow()));
    } else {
        result.push_str(&format_summaries(&view.items));
    }

    if let Some(error) = &view.last_error {
        result.push_str(&format!("{} {}\n", "Could not load more:".red(), error));
    }
    if view.loading_more {
        result.push_str(&format!("{}\n", "Loading more...".bright_black()));
    } else if view.show_load_more {
        result.push_str(&format!("{}\n", "Press enter to load more.".bright_black()));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeSource;

    #[test]
    fn test_parse_intents() {
        assert_eq!(
            parse_command("search  Pika \n").unwrap(),
            BrowseCommand::Intent(Intent::SetQuery {
                query: "Pika".to_string()
            })
        );
        assert_eq!(
            parse_command("type Fire").unwrap(),
            BrowseCommand::Intent(Intent::ToggleType {
                name: "fire".to_string()
            })
        );
        assert_eq!(
            parse_command("fav #25").unwrap(),
            BrowseCommand::Intent(Intent::ToggleFavorite { id: 25 })
        );
        assert_eq!(
            parse_command("show 7").unwrap(),
            BrowseCommand::Intent(Intent::SelectItem { id: 7 })
        );
        assert_eq!(
            parse_command("\n").unwrap(),
            BrowseCommand::Intent(Intent::RequestLoadMore)
        );
        assert_eq!(
            parse_command("favs").unwrap(),
            BrowseCommand::Intent(Intent::ToggleFavoritesOnly)
        );
    }

    #[test]
    fn test_parse_search_without_text_clears_query() {
        assert_eq!(
            parse_command("search").unwrap(),
            BrowseCommand::Intent(Intent::SetQuery {
                query: String::new()
            })
        );
    }

    #[test]
    fn test_parse_control_commands() {
        assert_eq!(parse_command("help").unwrap(), BrowseCommand::Help);
        assert_eq!(parse_command("QUIT").unwrap(), BrowseCommand::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("fav").is_err());
        assert!(parse_command("show pikachu").is_err());
        assert!(parse_command("type").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[tokio::test]
    async fn test_format_view_states() {
        let session = CatalogSession::new(FakeSource::with_pokemon(10), 4, None);
        session.source().fail_next_lists(1);

        let failed = format_view(&session.ensure_started().await);
        assert!(failed.contains("retry"));

        let ready = format_view(&session.dispatch(Intent::Retry).await);
        assert!(ready.contains("4 of 4 loaded pokemon shown"));
        assert!(ready.contains("mon4"));
        assert!(ready.contains("Press enter to load more."));

        let detail = format_view(&session.dispatch(Intent::SelectItem { id: 2 }).await);
        assert!(detail.contains("MON2"));
        assert!(detail.contains("Does not evolve."));

        session.dispatch(Intent::CloseDetail).await;
        let empty = format_view(
            &session
                .dispatch(Intent::SetQuery {
                    query: "zzz".to_string(),
                })
                .await,
        );
        assert!(empty.contains("No pokemon match"));
    }
}
