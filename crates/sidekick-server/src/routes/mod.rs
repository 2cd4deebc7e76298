pub mod chat;
pub mod ui;

use axum::Router;

use crate::state::AppState;

pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(ui::routes(state.clone()))
        .merge(chat::routes(state))
}
