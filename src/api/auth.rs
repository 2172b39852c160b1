use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension, Form, Json,
    extract::Query,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use reqwest::Url;
use serde::Deserialize;

use crate::{Error, Res, api::AppState, success, types::AuthorizationRequest};

#[derive(Debug, Deserialize)]
pub struct AuthorizeForm {
    pub tenant: String,
}

pub async fn authorize(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<AuthorizeForm>,
) -> Res<Json<AuthorizationRequest>> {
    let request = state.sessions.begin_authorization(&form.tenant).await?;
    Ok(Json(request))
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<Arc<AppState>>,
) -> Res<Response> {
    if let Some(reason) = params.get("error") {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Html(format!("<h4>Login failed: {}</h4>", html_escape(reason))),
        )
            .into_response());
    }

    let (Some(code), Some(auth_state)) = (params.get("code"), params.get("state")) else {
        return Err(Error::InvalidOrExpiredState);
    };

    let user_id = state
        .sessions
        .complete_authorization(code, auth_state)
        .await?;
    success!("Authorization callback completed");

    if let Some(frontend) = &state.frontend_url {
        if let Ok(url) = Url::parse_with_params(frontend, &[("user_id", user_id.as_str())]) {
            return Ok(Redirect::to(url.as_str()).into_response());
        }
    }

    Ok(Html(format!(
        "<h2>Authentication successful.</h2><p>Your user id is <code>{}</code>.</p>",
        user_id
    ))
    .into_response())
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
