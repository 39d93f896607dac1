mod docs;
mod error;
mod state;
mod throttle;
mod util;

pub mod routes;
pub mod services;

pub use error::{ApiError, ErrorResponse};
pub use state::AppState;
pub use throttle::LoginRateLimiter;
pub use util::{require_bearer, ADMIN_ONLY_DETAIL, MANAGER_ONLY_DETAIL};

use axum::{
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_check))
        // Account routes
        .route("/api/users/signup", post(routes::auth::signup))
        .route("/api/users/login", post(routes::auth::login))
        .route("/api/users/logout", post(routes::auth::logout))
        .route("/api/users/", get(routes::users::list_users))
        .route("/api/users/me", get(routes::users::get_current_user))
        .route("/api/users/me", patch(routes::users::update_current_user))
        .route("/api/users/:user_id/role", put(routes::users::update_role))
        // Post routes
        .route("/api/posts/", get(routes::posts::list_posts))
        .route("/api/posts/", post(routes::posts::create_post))
        .route("/api/posts/:post_id", get(routes::posts::get_post))
        .route("/api/posts/:post_id", put(routes::posts::update_post))
        .route("/api/posts/:post_id", delete(routes::posts::delete_post))
        .route(
            "/api/posts/:post_id/status",
            put(routes::posts::update_post_status),
        )
        // FAQ routes
        .route("/api/faq/", get(routes::faq::list_faqs))
        .route("/api/faq/", post(routes::faq::create_faq))
        .route("/api/faq/:faq_id", get(routes::faq::get_faq))
        .route("/api/faq/:faq_id", put(routes::faq::update_faq))
        .route("/api/faq/:faq_id", delete(routes::faq::delete_faq))
        // Chat room routes
        .route("/api/chat_room/", post(routes::chat_rooms::create_room))
        .route("/api/chat_room/", get(routes::chat_rooms::list_rooms))
        .route("/api/chat_room/:room_id", get(routes::chat_rooms::get_room))
        .route(
            "/api/chat_room/:room_id",
            delete(routes::chat_rooms::delete_room),
        )
        .route(
            "/api/chat_room/:room_id/join",
            post(routes::chat_rooms::join_room),
        )
        .route(
            "/api/chat_room/:room_id/messages",
            get(routes::chat_rooms::list_messages),
        )
        .route(
            "/api/chat_room/:room_id/messages",
            post(routes::chat_rooms::create_message),
        )
        // Notification routes
        .route(
            "/api/notifications/",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/api/notifications/unread_count",
            get(routes::notifications::unread_count),
        )
        .route(
            "/api/notifications/:notification_id/read",
            put(routes::notifications::mark_read),
        )
        .route(
            "/api/notifications/read_all",
            put(routes::notifications::mark_all_read),
        )
        .route(
            "/api/notifications/:notification_id",
            delete(routes::notifications::delete_notification),
        )
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .layer(cors_layer())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
