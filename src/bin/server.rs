use std::{env, fs::OpenOptions, net::SocketAddr, process::exit, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware,
};
use axum_extra::extract::cookie::SameSite;
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use wisepenny::{
    AppState, Config, build_router, cors_layer, graceful_shutdown, logging_middleware,
    serve_static_files,
};

#[tokio::main]
async fn main() {
    let config = Config::parse();

    setup_logging();

    if let Err(error) = run(config).await {
        tracing::error!("{error}");
        exit(1);
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let secret = env::var("SECRET").map_err(|_| "The environment variable 'SECRET' must be set")?;

    let token_verifier = config.token_verifier()?;
    let connection = Connection::open(&config.db_path)?;
    let mut state = AppState::new(connection, &secret, Arc::new(token_verifier))?
        .with_session_duration(config.session_duration())
        .with_ledger_options(config.ledger_options());

    if config.allowed_origin.is_some() {
        // Browsers only attach SameSite=None cookies to cross-site requests.
        state = state.with_cookie_same_site(SameSite::None);
    }

    let mut router = build_router(state);

    if let Some(static_dir) = &config.static_dir {
        router = serve_static_files(router, static_dir);
    }

    router = router.layer(middleware::from_fn(logging_middleware));

    if let Some(allowed_origin) = &config.allowed_origin {
        router = router.layer(cors_layer(HeaderValue::from_str(allowed_origin)?));
    }

    let router = add_tracing_layer(router);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    match &config.cert_path {
        Some(cert_path) => {
            let tls_config = RustlsConfig::from_pem_file(
                cert_path.join("cert.pem"),
                cert_path.join("key.pem"),
            )
            .await?;

            tracing::info!("HTTPS server listening on {}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(router.into_make_service())
                .await?;
        }
        None => {
            tracing::info!("HTTP server listening on {}", addr);
            axum_server::bind(addr)
                .handle(handle)
                .serve(router.into_make_service())
                .await?;
        }
    }

    Ok(())
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_filter(filter::LevelFilter::INFO);

    let debug_log = match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(log_file) => Some(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_ansi(false)
                .with_writer(Arc::new(log_file))
                .with_filter(filter::LevelFilter::DEBUG),
        ),
        Err(error) => {
            eprintln!("Could not open debug.log, logging to stdout only: {error}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with(stdout_log)
        .with(debug_log)
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
