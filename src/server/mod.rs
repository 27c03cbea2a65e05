pub mod correlation;
mod handlers;

use std::net::SocketAddr;

use axum::{
    extract::Extension,
    middleware,
    routing::{get, post},
    Router,
};

use crate::api::DynAPI;
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{distances, geocode, routes};

pub fn app(api: DynAPI) -> Router {
    Router::new()
        .route("/routes", get(routes::list))
        .route("/routes/optimize", post(routes::optimize))
        .route("/routes/:id", get(routes::find))
        .route("/distances", post(distances::lookup))
        .route(
            "/distances/metrics",
            get(distances::metrics).delete(distances::reset_metrics),
        )
        .route("/geocode", get(geocode::find))
        .layer(Extension(api))
        .layer(middleware::from_fn(correlation::correlate))
}

pub async fn serve(api: DynAPI, addr: SocketAddr) -> Result<(), Error> {
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app(api).into_make_service())
        .await
        .map_err(|err| {
            tracing::error!(%err, "server stopped");
            unexpected_error()
        })
}
