use axum::{
    debug_handler,
    extract::State,
    http::{HeaderMap, StatusCode},
};

use crate::{clock, store::SharedStore, validation, AppError, AppResult, AppState};

#[debug_handler(state = AppState)]
pub(crate) async fn heartbeat(
    State(store): State<SharedStore>,
    headers: HeaderMap,
) -> AppResult<StatusCode> {
    let Some(name) = validation::claimed_user(&headers).filter(|name| !name.is_empty()) else {
        return Err(AppError::not_found());
    };

    if store.find_participant(&name).await?.is_none() {
        return Err(AppError::unprocessable());
    }

    // zero matches means the sweeper evicted them between the lookup and the update
    if store.touch_participant(&name, clock::now_millis()).await? == 0 {
        return Err(AppError::not_found());
    }

    Ok(StatusCode::OK)
}
