use crate::handlers;
use actix_web::{web, Scope};

pub fn config() -> Scope {
    web::scope("")
        .route("/health", web::get().to(handlers::health_check))
        .route("/websearch", web::post().to(handlers::web_search))
}
