use axum::{
    debug_handler,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use crate::{
    clock,
    models::Message,
    store::SharedStore,
    validation::{self, MessageBody, NewMessage},
    AppError, AppResult, AppState,
};

#[debug_handler(state = AppState)]
pub(crate) async fn post_message(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    body: Result<Json<MessageBody>, JsonRejection>,
) -> AppResult<StatusCode> {
    let body = validation::json_body(body)?;
    let input = NewMessage::new(validation::claimed_user(&headers), body);
    validation::check(&input)?;

    let NewMessage { from, to, text, kind } = input;
    let from = from.unwrap_or_default();

    if store.find_participant(&from).await?.is_none() {
        return Err(AppError::unprocessable());
    }

    let message = Message {
        from,
        to: to.unwrap_or_default(),
        text: text.unwrap_or_default(),
        kind: kind.unwrap_or_default().parse()?,
        time: clock::time_of_day(),
    };
    store.insert_message(&message).await?;

    tracing::debug!(from = %message.from, to = %message.to, kind = %message.kind, "message posted");
    Ok(StatusCode::CREATED)
}
