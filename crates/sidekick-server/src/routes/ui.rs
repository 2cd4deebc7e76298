use axum::{extract::State, response::Html, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

const CHAT_PAGE: &str = include_str!("../../ui/chat.html");

#[derive(Debug, Serialize)]
pub struct WidgetConfig {
    pub title: String,
    pub examples: Vec<String>,
}

async fn index() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

async fn widget_config(State(state): State<AppState>) -> Json<WidgetConfig> {
    Json(WidgetConfig {
        title: state.title(),
        examples: (*state.examples).clone(),
    })
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/config", get(widget_config))
        .with_state(state)
}
