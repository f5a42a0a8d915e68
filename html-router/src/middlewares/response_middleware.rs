use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Extension,
};
use common::{
    error::AppError,
    utils::template_engine::{ProvidesTemplateEngine, Value},
};
use minijinja::context;
use serde::Serialize;
use tracing::error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateKind {
    Full(String),
    Error(StatusCode),
}

/// What a handler wants rendered. The handler only builds the view-model;
/// [`with_template_response`] turns it into HTML.
#[derive(Clone, Debug)]
pub struct TemplateResponse {
    template_kind: TemplateKind,
    context: Value,
}

impl TemplateResponse {
    pub fn new_template<T: Serialize>(name: impl Into<String>, context: T) -> Self {
        Self {
            template_kind: TemplateKind::Full(name.into()),
            context: Value::from_serialize(&context),
        }
    }

    pub fn error(status: StatusCode, title: &str, description: &str) -> Self {
        let ctx = context! {
            status_code => status.as_u16(),
            title => title,
            description => description
        };
        Self {
            template_kind: TemplateKind::Error(status),
            context: ctx,
        }
    }

    pub fn server_error() -> Self {
        Self::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "Something went wrong while searching the catalog.",
        )
    }

    pub fn service_unavailable() -> Self {
        Self::error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable",
            "The catalog is taking too long to answer. Please try again shortly.",
        )
    }

    pub const fn kind(&self) -> &TemplateKind {
        &self.template_kind
    }

    pub const fn context(&self) -> &Value {
        &self.context
    }
}

impl IntoResponse for TemplateResponse {
    fn into_response(self) -> Response {
        // Error statuses are set right away so they survive even without the middleware
        let status = match self.template_kind {
            TemplateKind::Error(status) => status,
            TemplateKind::Full(_) => StatusCode::OK,
        };
        (status, Extension(self)).into_response()
    }
}

#[derive(Serialize)]
struct ContextWrapper<'a> {
    request_path: &'a str,
    #[serde(flatten)]
    context: HashMap<String, Value>,
}

fn context_to_map(value: &Value) -> Result<HashMap<String, Value>, minijinja::value::ValueKind> {
    match value.kind() {
        minijinja::value::ValueKind::Map => {
            let mut map = HashMap::new();
            if let Ok(keys) = value.try_iter() {
                for key in keys {
                    if let Ok(val) = value.get_item(&key) {
                        map.insert(key.to_string(), val);
                    }
                }
            }
            Ok(map)
        }
        minijinja::value::ValueKind::None | minijinja::value::ValueKind::Undefined => {
            Ok(HashMap::new())
        }
        other => Err(other),
    }
}

pub async fn with_template_response<S>(State(state): State<S>, req: Request, next: Next) -> Response
where
    S: ProvidesTemplateEngine + Clone + Send + Sync + 'static,
{
    let request_path = req.uri().path().to_string();
    let response = next.run(req).await;

    let Some(template_response) = response.extensions().get::<TemplateResponse>().cloned() else {
        return response;
    };

    let context_map = match context_to_map(&template_response.context) {
        Ok(map) => map,
        Err(kind) => {
            error!(
                "Template context must be a map or unit, got kind={:?} for template_kind={:?}",
                kind, template_response.template_kind
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_error())).into_response();
        }
    };

    let context = Value::from_serialize(&ContextWrapper {
        request_path: &request_path,
        context: context_map,
    });
    let template_engine = state.template_engine();

    match &template_response.template_kind {
        TemplateKind::Full(name) => match template_engine.render(name, &context) {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!("Failed to render template '{}': {:?}", name, e);
                (StatusCode::INTERNAL_SERVER_ERROR, Html(fallback_error())).into_response()
            }
        },
        TemplateKind::Error(status) => match template_engine.render("errors/error.html", &context)
        {
            Ok(html) => (*status, Html(html)).into_response(),
            Err(e) => {
                error!("Critical: Failed to render 'errors/error.html': {:?}", e);
                (*status, Html(fallback_error())).into_response()
            }
        },
    }
}

#[derive(Debug)]
pub enum HtmlError {
    AppError(AppError),
}

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        Self::AppError(err)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        match self {
            Self::AppError(err) => match err {
                AppError::Timeout(_) => {
                    error!("Timed out: {:?}", err);
                    TemplateResponse::service_unavailable().into_response()
                }
                _ => {
                    error!("Internal error: {:?}", err);
                    TemplateResponse::server_error().into_response()
                }
            },
        }
    }
}

fn fallback_error() -> String {
    r#"
    <html>
        <body>
            <main class="container">
                <h1>Error</h1>
                <p>Sorry, something went wrong displaying this page.</p>
            </main>
        </body>
    </html>
    "#
    .to_string()
}
