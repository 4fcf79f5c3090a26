//! API route configuration.
//!
//! Every API route runs behind [`crate::api::middleware::auth`], which attaches
//! the caller's [`crate::domain::permissions::Actor`]. Handlers enforce
//! authentication where an endpoint needs it.

use crate::api::handlers::{
    add_favorite_handler, add_to_shopping_cart_handler, create_recipe_handler,
    delete_avatar_handler, delete_recipe_handler, download_shopping_cart_handler,
    get_ingredient_handler, get_link_handler, get_recipe_handler, get_tag_handler,
    get_user_handler, list_ingredients_handler, list_recipes_handler, list_subscriptions_handler,
    list_tags_handler, list_users_handler, login_handler, logout_handler, me_handler,
    register_handler, remove_favorite_handler, remove_from_shopping_cart_handler,
    set_avatar_handler, set_password_handler, subscribe_handler, unsubscribe_handler,
    update_recipe_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

/// All API routes. Paths are registered without trailing slashes.
///
/// # Endpoints
///
/// - `POST   /auth/token/login`               - Exchange credentials for a token
/// - `POST   /auth/token/logout`              - Revoke the presented token
/// - `GET    /users` / `POST /users`          - List users / register
/// - `GET    /users/me`                       - Current user
/// - `GET    /users/{id}`                     - User profile
/// - `POST   /users/set_password`             - Change password
/// - `PUT    /users/me/avatar` / `DELETE`     - Upload / remove avatar
/// - `GET    /users/subscriptions`            - Followed authors
/// - `POST   /users/{id}/subscribe` / `DELETE`- Follow / unfollow
/// - `GET    /tags`, `/tags/{id}`             - Tags
/// - `GET    /ingredients`, `/ingredients/{id}` - Ingredients
/// - `GET    /recipes` / `POST /recipes`      - List / create recipes
/// - `GET    /recipes/{id}` / `PATCH` / `DELETE` - Read / update / delete
/// - `POST   /recipes/{id}/favorite` / `DELETE` - Favorites
/// - `POST   /recipes/{id}/shopping_cart` / `DELETE` - Shopping cart
/// - `GET    /recipes/{id}/get-link`          - Short link
/// - `GET    /recipes/download_shopping_cart` - Shopping list as text
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token/login", post(login_handler))
        .route("/auth/token/logout", post(logout_handler))
        .route("/users", get(list_users_handler).post(register_handler))
        .route("/users/me", get(me_handler))
        .route(
            "/users/me/avatar",
            put(set_avatar_handler).delete(delete_avatar_handler),
        )
        .route("/users/set_password", post(set_password_handler))
        .route("/users/subscriptions", get(list_subscriptions_handler))
        .route("/users/{id}", get(get_user_handler))
        .route(
            "/users/{id}/subscribe",
            post(subscribe_handler).delete(unsubscribe_handler),
        )
        .route("/tags", get(list_tags_handler))
        .route("/tags/{id}", get(get_tag_handler))
        .route("/ingredients", get(list_ingredients_handler))
        .route("/ingredients/{id}", get(get_ingredient_handler))
        .route(
            "/recipes",
            get(list_recipes_handler).post(create_recipe_handler),
        )
        .route(
            "/recipes/download_shopping_cart",
            get(download_shopping_cart_handler),
        )
        .route(
            "/recipes/{id}",
            get(get_recipe_handler)
                .patch(update_recipe_handler)
                .delete(delete_recipe_handler),
        )
        .route(
            "/recipes/{id}/favorite",
            post(add_favorite_handler).delete(remove_favorite_handler),
        )
        .route(
            "/recipes/{id}/shopping_cart",
            post(add_to_shopping_cart_handler).delete(remove_from_shopping_cart_handler),
        )
        .route("/recipes/{id}/get-link", get(get_link_handler))
}
