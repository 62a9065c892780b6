use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use crate::error::ServerError;
use crate::handlers::{self, agents, health, upload};
use crate::state::AppState;

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("Rejected request body: {}", err);
        ServerError::BadRequest("Invalid JSON payload".to_string()).into()
    }))
    .service(
        web::resource("/generate_agent")
            .route(web::post().to(agents::generate))
            .default_service(web::to(handlers::method_not_allowed)),
    )
    .service(
        web::resource("/upload_pdf")
            .route(web::post().to(upload::handler))
            .default_service(web::to(handlers::method_not_allowed)),
    )
    .route("/run_agent/{agent_id}", web::get().to(agents::run))
    .route("/agents", web::get().to(agents::list))
    .route("/agents/{agent_id}", web::delete().to(agents::delete))
    .route("/health", web::get().to(health::handler));
}

/// Serves the API on `0.0.0.0:{port}` until the server stops, then shuts
/// down every agent.
pub async fn run_server(port: u16, state: AppState) -> io::Result<()> {
    tokio::fs::create_dir_all(&state.upload_dir).await?;
    log::info!("Uploads are stored in {}", state.upload_dir.display());

    let store = state.store.clone();
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind(("0.0.0.0", port))?
    .run();

    log::info!("Listening on http://0.0.0.0:{}", port);
    let result = server.await;

    store.shutdown();
    result
}
