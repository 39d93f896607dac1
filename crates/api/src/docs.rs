use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::auth::signup,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::users::list_users,
        crate::routes::users::get_current_user,
        crate::routes::users::update_current_user,
        crate::routes::users::update_role,
        crate::routes::posts::list_posts,
        crate::routes::posts::create_post,
        crate::routes::posts::get_post,
        crate::routes::posts::update_post,
        crate::routes::posts::delete_post,
        crate::routes::posts::update_post_status,
        crate::routes::faq::list_faqs,
        crate::routes::faq::create_faq,
        crate::routes::faq::get_faq,
        crate::routes::faq::update_faq,
        crate::routes::faq::delete_faq,
        crate::routes::chat_rooms::create_room,
        crate::routes::chat_rooms::list_rooms,
        crate::routes::chat_rooms::get_room,
        crate::routes::chat_rooms::delete_room,
        crate::routes::chat_rooms::join_room,
        crate::routes::chat_rooms::list_messages,
        crate::routes::chat_rooms::create_message,
        crate::routes::notifications::list_notifications,
        crate::routes::notifications::unread_count,
        crate::routes::notifications::mark_read,
        crate::routes::notifications::mark_all_read,
        crate::routes::notifications::delete_notification
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::auth::SignupRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::SessionResponse,
            crate::routes::auth::UserResponse,
            crate::routes::auth::UserProfileResponse,
            crate::routes::auth::LogoutResponse,
            crate::routes::users::UsersResponse,
            crate::routes::users::UpdateProfileRequest,
            crate::routes::users::UpdateRoleRequest,
            crate::routes::models::Post,
            crate::routes::models::Faq,
            crate::routes::models::ChatRoom,
            crate::routes::models::ChatMessage,
            crate::routes::models::Notification,
            crate::routes::models::CreatePostRequest,
            crate::routes::models::UpdatePostRequest,
            crate::routes::models::UpdatePostStatusRequest,
            crate::routes::models::CreateFaqRequest,
            crate::routes::models::UpdateFaqRequest,
            crate::routes::models::CreateChatRoomRequest,
            crate::routes::models::CreateChatMessageRequest,
            crate::routes::posts::PostsResponse,
            crate::routes::posts::PostResponse,
            crate::routes::faq::FaqsResponse,
            crate::routes::faq::FaqResponse,
            crate::routes::chat_rooms::ChatRoomsResponse,
            crate::routes::chat_rooms::ChatRoomResponse,
            crate::routes::chat_rooms::ChatMessagesResponse,
            crate::routes::chat_rooms::ChatMessageResponse,
            crate::routes::notifications::NotificationsResponse,
            crate::routes::notifications::NotificationResponse,
            crate::routes::notifications::UnreadCountResponse,
            crate::routes::notifications::BulkUpdateResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Auth", description = "Signup, login, and session management"),
        (name = "Users", description = "Account listing and profile management"),
        (name = "Posts", description = "Customer-service posts and their status workflow"),
        (name = "Faq", description = "FAQ entries"),
        (name = "Chat Rooms", description = "Chat rooms, membership, and messages"),
        (name = "Notifications", description = "Per-user notifications")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        let schemes = &mut components.security_schemes;

        let mut scheme = SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer));
        if let SecurityScheme::Http(http) = &mut scheme {
            http.bearer_format = Some("Bearer".to_string());
        }

        schemes.insert("bearerAuth".to_string(), scheme);
    }
}
