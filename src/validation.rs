//! Request schemas. Every failing rule is reported, not just the first.

use std::borrow::Cow;

use axum::{extract::rejection::JsonRejection, http::HeaderMap, Json};
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{models::MessageType, AppError, AppResult};

/// Header carrying the caller's claimed name. Nothing authenticates it.
pub const USER_HEADER: &str = "user";

pub fn claimed_user(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewParticipant {
    #[validate(
        required(message = "\"name\" is required"),
        length(min = 1, message = "\"name\" is not allowed to be empty")
    )]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub to: Option<String>,
    pub text: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A user-authored message: the body plus the sender header.
#[derive(Debug, Validate)]
pub struct NewMessage {
    #[validate(
        required(message = "\"from\" is required"),
        length(min = 1, message = "\"from\" is not allowed to be empty")
    )]
    pub from: Option<String>,
    #[validate(
        required(message = "\"to\" is required"),
        length(min = 1, message = "\"to\" is not allowed to be empty")
    )]
    pub to: Option<String>,
    #[validate(
        required(message = "\"text\" is required"),
        length(min = 1, message = "\"text\" is not allowed to be empty")
    )]
    pub text: Option<String>,
    #[validate(
        required(message = "\"type\" is required"),
        custom(function = "user_message_type")
    )]
    pub kind: Option<String>,
}

impl NewMessage {
    pub fn new(from: Option<String>, MessageBody { to, text, kind }: MessageBody) -> Self {
        Self { from, to, text, kind }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct MessageQuery {
    #[validate(custom(function = "positive_limit"))]
    pub limit: Option<String>,
}

impl MessageQuery {
    /// Only meaningful once the query has passed validation.
    pub fn limit(&self) -> Option<i64> {
        self.limit.as_deref().and_then(|limit| limit.parse().ok())
    }
}

fn user_message_type(kind: &str) -> Result<(), ValidationError> {
    match kind.parse::<MessageType>() {
        Ok(MessageType::Message | MessageType::PrivateMessage) => Ok(()),
        _ => Err(ValidationError::new("one_of")
            .with_message(Cow::Borrowed("\"type\" must be one of [message, private_message]"))),
    }
}

fn positive_limit(limit: &str) -> Result<(), ValidationError> {
    match limit.parse::<i64>() {
        Ok(n) if n > 0 => Ok(()),
        Ok(_) => Err(ValidationError::new("greater")
            .with_message(Cow::Borrowed("\"limit\" must be greater than 0"))),
        Err(_) => Err(ValidationError::new("number")
            .with_message(Cow::Borrowed("\"limit\" must be a number"))),
    }
}

/// Fields of a schema in the order their failures are reported.
pub trait Schema: Validate {
    const FIELDS: &'static [&'static str];
}

impl Schema for NewParticipant {
    const FIELDS: &'static [&'static str] = &["name"];
}

impl Schema for NewMessage {
    const FIELDS: &'static [&'static str] = &["from", "to", "text", "kind"];
}

impl Schema for MessageQuery {
    const FIELDS: &'static [&'static str] = &["limit"];
}

pub fn messages(errors: &ValidationErrors, order: &[&str]) -> Vec<String> {
    let position = |field: &str| order.iter().position(|f| *f == field).unwrap_or(order.len());

    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|(a, _), (b, _)| position(a).cmp(&position(b)).then_with(|| a.cmp(b)));

    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("\"{field}\" failed {}", err.code),
            })
        })
        .collect()
}

pub fn check<T: Schema>(input: &T) -> AppResult<()> {
    input
        .validate()
        .map_err(|errors| AppError::Invalid(messages(&errors, T::FIELDS)))
}

/// Treats an undecodable body as one more validation failure.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(AppError::Invalid(vec![rejection.body_text()])),
    }
}
