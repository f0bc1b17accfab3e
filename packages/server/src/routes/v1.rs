use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/sites", site_routes(config))
        .nest("/attachments", attachment_routes())
}

fn site_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::site::list_sites,
            handlers::site::create_site
        ))
        .routes(routes!(handlers::site::list_all_sites))
        .routes(routes!(handlers::site::map_points))
        .routes(routes!(handlers::site::get_site))
        .layer(handlers::site::submission_body_limit(
            config.storage.max_attachment_size,
        ))
}

fn attachment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::attachment::download_attachment))
}
