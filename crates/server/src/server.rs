use axum::{
    Router,
    extract::{Request, State},
    http::Method,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Error as AxumError, Header},
    typed_header::TypedHeaderRejection,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use std::{path::PathBuf, sync::Arc};

use crate::{Failure, FailureKind, ServerError, countries, index, users};
use engine::Engine;

static ADMIN_KEY_HEADER: axum::http::HeaderName =
    axum::http::HeaderName::from_static("x-admin-key");

const WRITE_DISABLED: &str = "Demo Mode - Write access disabled";

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub gate: Arc<WriteGate>,
}

/// Everything the router needs besides the engine.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub gate: WriteGate,
    /// Directory served under `/public`.
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            gate: WriteGate::default(),
            public_dir: PathBuf::from("public"),
        }
    }
}

/// Shared secret check on every non-GET request.
///
/// Disabled outside production. When enabled without a secret no write is
/// accepted.
#[derive(Clone, Debug, Default)]
pub struct WriteGate {
    enabled: bool,
    secret: Option<String>,
}

impl WriteGate {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn production(secret: Option<String>) -> Self {
        Self {
            enabled: true,
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn allows(&self, method: &Method, key: Option<&str>) -> bool {
        if !self.enabled || method == Method::GET {
            return true;
        }
        matches!((self.secret.as_deref(), key), (Some(secret), Some(key)) if secret == key)
    }
}

/// `TypedHeader` for the write gate secret
///
/// Production writes must carry the "x-admin-key" entry in the header.
#[derive(Debug)]
struct AdminKey(String);

impl Header for AdminKey {
    fn name() -> &'static axum::http::HeaderName {
        &ADMIN_KEY_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        Ok(AdminKey(value.to_string()))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        match axum::http::HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-admin-key header"),
        }
    }
}

/// A missing or undecodable key counts as no key.
async fn write_gate(
    admin_key: Result<TypedHeader<AdminKey>, TypedHeaderRejection>,
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let key = admin_key.as_ref().ok().map(|header| header.0.0.as_str());
    if !state.gate.allows(request.method(), key) {
        tracing::warn!("rejected {} {}", request.method(), request.uri().path());
        return Err(ServerError::Page(Failure::new(
            FailureKind::Forbidden,
            WRITE_DISABLED,
        )));
    }

    Ok(next.run(request).await)
}

pub fn router(state: ServerState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(index::get))
        .route("/add", post(countries::add))
        .route("/remove", post(countries::remove))
        .route("/user", post(users::switch))
        .route("/new", post(users::create))
        .route("/delete/{id}", post(users::delete))
        .nest_service("/public", ServeDir::new(&config.public_dir))
        .layer(middleware::from_fn_with_state(state.clone(), write_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server running on http://{}", addr);
    if config.gate.is_enabled() {
        tracing::info!("write access requires the x-admin-key header");
    }

    let state = ServerState {
        engine: Arc::new(engine),
        gate: Arc::new(config.gate.clone()),
    };

    axum::serve(listener, router(state, &config)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    config: ServerConfig,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, config, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
