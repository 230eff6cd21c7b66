//! # Loonies Waitlist
//!
//! Backend for the Loonies landing page. Collects waitlist signups,
//! hands each one a queue position and a referral code, and serves the
//! aggregate signup count shown on the page.
//!
//!
//!
//! # General Infrastructure
//! - Frontend posts the signup form to this server
//! - One SQLite file per deployment, one row per signup
//! - Email and referral code uniqueness live in the database, not here
//! - Position is never stored, it is counted from insertion order
//!
//!
//!
//! # Routes
//! - `POST /waitlist`: JSON signup, returns the outcome as JSON
//! - `POST /waitlist/form`: form signup, redirects with the outcome in
//!   the query string so the thank-you page can render it
//! - `GET /stats`: current signup count for the landing page counter
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod database;
pub mod error;
pub mod form;
pub mod ledger;
pub mod referral;
pub mod routes;
pub mod state;
pub mod stats;

use routes::{signup_form_handler, signup_handler, stats_handler};
use state::State;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = State::new();

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/waitlist", post(signup_handler))
        .route("/waitlist/form", post(signup_form_handler))
        .route("/stats", get(stats_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
