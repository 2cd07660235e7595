use lib::cart::lessons_api::{ApiClient, LessonsApi};
use lib::cart::local_api::LocalLessons;
use lib::cart::models;
use lib::cart::notifier::ConsoleNotifier;
use lib::cart::run_tool::run;
use lib::cart::view_model::CatalogViewModel;

use std::error::Error;

use clap::Parser;
use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use log::info;
use tokio::io::BufReader;

use models::{Args, Config};

async fn open_shop<A: LessonsApi>(api: A, config: &Config) -> Result<(), Box<dyn Error>> {
    let mut view_model = CatalogViewModel::new(api, ConsoleNotifier, config);
    view_model.load().await;

    let input = BufReader::new(tokio::io::stdin());
    let mut output = std::io::stdout();
    run(&mut view_model, input, &mut output).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    /* Setup logging */
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    /* Get args and config */
    let args = Args::parse();
    let config: Config = Figment::new()
        .merge(Json::file(&args.config_json_path))
        .merge(Env::prefixed("LESSONS_"))
        .extract()?;
    info!(
        "Read config.json from {}",
        std::path::absolute(&args.config_json_path)?.display()
    );

    /* Pick the backend and open the shop */
    match &args.lessons_json_path {
        Some(path) => {
            info!("Working with local lessons from {}", path.display());
            open_shop(LocalLessons::from_file(path)?, &config).await
        }
        None => {
            let api = ApiClient::new(reqwest::Client::new(), &config.api_base_url);
            info!("Working with lessons API at {}", api.base_url());
            open_shop(api, &config).await
        }
    }
}
