use chrono::Local;
use clap::Parser;
use log::*;

use notesaurus::{
    NotesaurusError, Orchestrator, Result,
    cli::{Args, Command},
    config::{file::FileConfig, resolver::ConfigResolverBuilder},
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("notesaurus")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

async fn execute(args: &Args) -> Result<()> {
    let file = FileConfig::load(&args.repo_path.join(&args.config)).await?;

    let config = ConfigResolverBuilder::default()
        .file(file)
        .inputs(args.inputs())
        .today(Local::now().date_naive())
        .build()
        .map_err(|e| NotesaurusError::invalid_config(e.to_string()))?
        .resolve()?;

    let strategy = args.command.strategy();
    let count = config.source_repos.len();

    match (&args.command, &config.release_tag) {
        (Command::Release, Some(tag)) => {
            info!("drafting release {tag} for {count} repositories")
        }
        (Command::Release, None) => {
            info!("drafting latest releases for {count} repositories")
        }
        (Command::Monthly { .. }, _) => info!(
            "drafting {strategy} notes for {} across {count} repositories",
            config.target_month
        ),
    }

    let orchestrator = Orchestrator::from_config(config, strategy).await?;

    orchestrator.run().await.log();

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    initialize_logger(args.debug)?;

    execute(&args).await?;

    Ok(())
}
