use axum::{debug_handler, extract::State, Json};

use crate::{models::Participant, store::SharedStore, AppResult, AppState};

#[debug_handler(state = AppState)]
pub(crate) async fn list_participants(
    State(store): State<SharedStore>,
) -> AppResult<Json<Vec<Participant>>> {
    Ok(Json(store.list_participants().await?))
}
