//! Shopping list export.

use std::sync::Arc;

use crate::domain::permissions::Actor;
use crate::domain::repositories::RecipeRepository;
use crate::domain::shopping_list::{self, ShoppingListItem};
use crate::error::AppError;

/// Service for aggregating a user's shopping cart.
pub struct ShoppingListService<R: RecipeRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: RecipeRepository + ?Sized> ShoppingListService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Sums ingredient amounts over every recipe in the user's cart.
    pub async fn items(&self, user_id: i64) -> Result<Vec<ShoppingListItem>, AppError> {
        let lines = self.repository.cart_lines(user_id).await?;
        Ok(shopping_list::aggregate(lines))
    }

    /// Renders the caller's shopping list as plain text.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] for anonymous callers.
    pub async fn export(&self, actor: &Actor) -> Result<String, AppError> {
        let user = actor.require_user()?;
        let items = self.items(user.id).await?;

        metrics::counter!("shopping_lists_exported_total").increment(1);
        tracing::info!(user_id = user.id, items = items.len(), "Shopping list exported");

        Ok(shopping_list::render(&items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::CartLine;
    use crate::domain::repositories::MockRecipeRepository;
    use crate::test_support::sample_user;

    fn line(id: i64, name: &str, unit: &str, amount: i32) -> CartLine {
        CartLine {
            ingredient_id: id,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn test_export_sums_across_recipes() {
        let mut repo = MockRecipeRepository::new();
        repo.expect_cart_lines()
            .withf(|user_id| *user_id == 1)
            .returning(|_| {
                Ok(vec![
                    line(2, "Salt", "g", 5),
                    line(1, "Flour", "g", 200),
                    line(2, "Salt", "g", 10),
                ])
            });

        let service = ShoppingListService::new(Arc::new(repo));
        let text = service.export(&Actor::User(sample_user(1))).await.unwrap();

        assert_eq!(text, "Список покупок:\n\nFlour: 200g\nSalt: 15g\n");
    }

    #[tokio::test]
    async fn test_empty_cart_exports_header_only() {
        let mut repo = MockRecipeRepository::new();
        repo.expect_cart_lines().returning(|_| Ok(vec![]));

        let service = ShoppingListService::new(Arc::new(repo));
        let text = service.export(&Actor::User(sample_user(1))).await.unwrap();

        assert_eq!(text, "Список покупок:\n\n");
    }

    #[tokio::test]
    async fn test_export_requires_auth() {
        let mut repo = MockRecipeRepository::new();
        repo.expect_cart_lines().never();

        let service = ShoppingListService::new(Arc::new(repo));

        assert!(matches!(
            service.export(&Actor::Anonymous).await,
            Err(AppError::Unauthorized { .. })
        ));
    }
}
