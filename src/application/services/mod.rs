//! Business logic services for the application layer.

pub mod auth_service;
pub mod catalog_service;
pub mod recipe_service;
pub mod shopping_list_service;
pub mod short_link_service;
pub mod subscription_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use catalog_service::CatalogService;
pub use recipe_service::{RecipeDetails, RecipeInput, RecipePage, RecipeQuery, RecipeService};
pub use shopping_list_service::ShoppingListService;
pub use short_link_service::{ShortLinkService, ShortLinkSettings};
pub use subscription_service::{SubscriptionService, SubscriptionView};
pub use user_service::{RegisterUser, UserProfile, UserService};
