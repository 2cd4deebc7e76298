mod configuration;
mod error;
mod routes;
mod state;

use anyhow::Result;
use std::fs::OpenOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use configuration::{LogSettings, Settings};
use error::ConfigError;
use sidekick::assistant::Assistant;
use sidekick::providers::openai::OpenAiProvider;
use sidekick::search::DdgClient;
use sidekick::toolkits::web::WebToolkit;
use state::AppState;

fn example_prompts() -> Vec<String> {
    [
        "Hello",
        "What is the latest news on the war in Ukraine?",
        "What is the weather in Cape Town?",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Plain-text tracing output appended to the configured log file
fn init_logging(settings: &LogSettings) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&settings.filename)?;

    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_new(&settings.level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let settings = match Settings::new() {
        Ok(settings) => settings,
        Err(ConfigError::MissingEnvVar { env_var }) => {
            eprintln!("Missing configuration: set {} (the api key is also read from OPENAI_API_KEY)", env_var);
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    init_logging(&settings.log)?;

    let provider = OpenAiProvider::new(settings.provider.into_config())?;
    let toolkit = WebToolkit::new(DdgClient::new())?;

    let mut assistant = Assistant::new(
        Box::new(provider),
        settings.assistant.name,
        settings.assistant.instructions,
    );
    assistant.add_toolkit(Box::new(toolkit));

    let state = AppState::new(assistant, example_prompts());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let addr = settings.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    let url = format!("http://{}", addr);
    if webbrowser::open(&url).is_err() {
        tracing::info!("open {} in your browser to chat", url);
    }

    axum::serve(listener, app).await?;
    Ok(())
}
