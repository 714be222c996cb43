use axum::{
    debug_handler,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};

use crate::{
    models::Message,
    store::SharedStore,
    validation::{self, MessageQuery},
    AppResult, AppState,
};

#[debug_handler(state = AppState)]
pub(crate) async fn list_messages(
    State(store): State<SharedStore>,
    headers: HeaderMap,
    Query(query): Query<MessageQuery>,
) -> AppResult<Json<Vec<Message>>> {
    validation::check(&query)?;

    let user = validation::claimed_user(&headers);
    let messages = store.list_messages(user.as_deref(), query.limit()).await?;

    Ok(Json(messages))
}
