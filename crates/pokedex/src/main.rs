use crate::prelude::*;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod browse;
mod error;
mod evolution;
mod favorites;
mod mcp;
mod pokemon;
mod prelude;
mod session;
#[cfg(test)]
mod testing;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Browse the PokeAPI catalog: pokemon, types, evolution chains and favorites"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// PokeAPI base URL
    #[clap(
        long,
        env = "POKEAPI_BASE_URL",
        global = true,
        default_value = api::POKEAPI_BASE
    )]
    base_url: String,

    /// Maximum number of responses kept in memory
    #[clap(
        long,
        env = "POKEDEX_CACHE_CAPACITY",
        global = true,
        default_value_t = pokedex_core::cache::DEFAULT_CAPACITY
    )]
    cache_capacity: usize,

    /// Pokemon loaded per page while browsing
    #[clap(
        long,
        env = "POKEDEX_PAGE_SIZE",
        global = true,
        default_value_t = pokedex_core::catalog::DEFAULT_PAGE_SIZE
    )]
    page_size: usize,

    /// File the favorites are stored in
    #[clap(long, env = "POKEDEX_FAVORITES", global = true)]
    favorites_file: Option<PathBuf>,

    /// Whether to display additional information.
    #[clap(long, env = "POKEDEX_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

impl Global {
    /// `--favorites-file`, or `favorites.json` under the user data directory
    pub fn favorites_path(&self) -> Option<PathBuf> {
        self.favorites_file.clone().or_else(|| {
            dirs_next::data_dir().map(|dir| dir.join("pokedex").join("favorites.json"))
        })
    }
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    #[command(flatten)]
    Pokemon(crate::pokemon::Commands),

    /// Manage favorite pokemon
    Favorites(crate::favorites::App),

    /// Browse the catalog interactively
    Browse(crate::browse::BrowseOptions),

    /// Model Context Protocol server
    MCP(crate::mcp::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Pokemon(command) => crate::pokemon::run(command, app.global).await,
        SubCommands::Favorites(sub_app) => crate::favorites::run(sub_app, app.global).await,
        SubCommands::Browse(options) => crate::browse::run(options, app.global).await,
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags() {
        let app = App::parse_from([
            "pokedex",
            "get",
            "pikachu",
            "--page-size",
            "12",
            "--favorites-file",
            "/tmp/favs.json",
        ]);
        assert_eq!(app.global.page_size, 12);
        assert_eq!(
            app.global.favorites_path(),
            Some(PathBuf::from("/tmp/favs.json"))
        );
        assert!(matches!(
            app.command,
            SubCommands::Pokemon(crate::pokemon::Commands::Get(_))
        ));
    }

    #[test]
    fn test_nested_subcommands() {
        let app = App::parse_from(["pokedex", "favorites", "add", "eevee"]);
        assert!(matches!(app.command, SubCommands::Favorites(_)));

        let app = App::parse_from(["pokedex", "mcp", "sse", "--port", "4000"]);
        assert!(matches!(app.command, SubCommands::MCP(_)));
    }
}
