use axum::{
    debug_handler,
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    clock,
    models::{Message, Participant},
    store::SharedStore,
    validation::{self, NewParticipant},
    AppError, AppResult, AppState,
};

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(store): State<SharedStore>,
    body: Result<Json<NewParticipant>, JsonRejection>,
) -> AppResult<StatusCode> {
    let input = validation::json_body(body)?;
    validation::check(&input)?;
    let name = input.name.unwrap_or_default();

    if store.find_participant(&name).await?.is_some() {
        return Err(AppError::conflict());
    }

    let participant = Participant { name, last_status: clock::now_millis() };
    // a concurrent registration can slip past the lookup; the unique key catches it
    if !store.join(&participant, &Message::joined(&participant.name)).await? {
        return Err(AppError::conflict());
    }

    tracing::info!(name = %participant.name, "participant joined");
    Ok(StatusCode::CREATED)
}
