//! HTTP server for the project-scaffolding API
//!
//! Exposes the project lifecycle (create, list, view) and the
//! instruction-application endpoint over a small axum router.

pub mod routes;
pub mod state;

pub use state::ServerAppState;

use axum::{
    http::header::{ACCEPT, CONTENT_TYPE},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Build the application router. Split out from [`run_server`] so tests
/// can drive the exact same routes without binding a socket.
pub fn router(state: ServerAppState) -> Router {
    // CORS must be the outermost layer so preflight OPTIONS requests are
    // handled before anything else.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    Router::new()
        .route("/", get(routes::index_handler))
        .route("/health", get(routes::health_handler))
        .route(
            "/projects",
            post(routes::create_project).get(routes::list_projects),
        )
        .route("/projects/:project_id", get(routes::project_view))
        .route(
            "/projects/:project_id/command",
            post(routes::run_command),
        )
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until ctrl-c.
pub async fn run_server(port: u16, bind: &str, state: ServerAppState) -> Result<(), String> {
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                        Atelier Server                         ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!("║                                                               ║");
    println!("║  Server URL: http://{}:{:<24}   ║", bind, port);
    println!("║                                                               ║");
    println!("║  Endpoints:                                                   ║");
    println!("║    POST /projects               - Create a project            ║");
    println!("║    GET  /projects               - List projects               ║");
    println!("║    GET  /projects/:id           - Project detail page         ║");
    println!("║    POST /projects/:id/command   - Apply an instruction        ║");
    println!("║    GET  /health                 - Health check                ║");
    println!("║                                                               ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    log::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {}", e))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to install ctrl-c handler: {}", e);
        return;
    }
    log::info!("Shutdown signal received, stopping server...");
}
