#[macro_use]
extern crate rocket;

mod entrypoints;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use octolens_server::github::{GithubClient, DEFAULT_TIMEOUT};
use octolens_server::search::SearchCoordinator;

#[derive(Debug, serde::Deserialize)]
pub struct Env {
    github_token: String,
    github_api_base: Option<String>,
    request_timeout_in_seconds: Option<u64>,
}

#[launch]
async fn rocket() -> _ {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().pretty());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let env = envy::from_env::<Env>().expect("Failed to load environment variables");
    let timeout = env
        .request_timeout_in_seconds
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);
    let github = match env.github_api_base {
        Some(base) => GithubClient::with_base_url(&env.github_token, timeout, base),
        None => GithubClient::new(&env.github_token, timeout),
    }
    .expect("Failed to build the GitHub client");
    let coordinator = Arc::new(SearchCoordinator::new(Arc::new(github)));

    let span = tracing::info_span!("Starting Rocket");
    let _enter = span.enter();

    rocket::build()
        .manage(coordinator)
        .attach(entrypoints::stage())
}
