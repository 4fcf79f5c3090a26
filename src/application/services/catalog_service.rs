//! Read access to tags and ingredients.

use std::sync::Arc;

use crate::domain::entities::{Ingredient, Tag};
use crate::domain::repositories::CatalogRepository;
use crate::error::AppError;
use serde_json::json;

/// Service for reference data lookups.
pub struct CatalogService<C: CatalogRepository + ?Sized> {
    repository: Arc<C>,
}

impl<C: CatalogRepository + ?Sized> CatalogService<C> {
    pub fn new(repository: Arc<C>) -> Self {
        Self { repository }
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        self.repository.list_tags().await
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no tag has this id.
    pub async fn get_tag(&self, id: i64) -> Result<Tag, AppError> {
        self.repository
            .find_tag(id)
            .await?
            .ok_or_else(|| AppError::not_found("Tag not found", json!({ "id": id })))
    }

    /// Searches ingredients by name.
    ///
    /// Matching is case-insensitive. Names starting with the query come first,
    /// then names containing it elsewhere; each group keeps the repository's
    /// name ordering. An empty query lists everything.
    pub async fn search_ingredients(&self, name: Option<&str>) -> Result<Vec<Ingredient>, AppError> {
        let query = name.map(str::trim).filter(|q| !q.is_empty());

        let Some(query) = query else {
            return self.repository.list_ingredients(None).await;
        };

        let matches = self
            .repository
            .list_ingredients(Some(query.to_string()))
            .await?;

        let needle = query.to_lowercase();
        let (mut prefixed, rest): (Vec<_>, Vec<_>) = matches
            .into_iter()
            .partition(|i| i.name.to_lowercase().starts_with(&needle));
        prefixed.extend(rest);

        Ok(prefixed)
    }

    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no ingredient has this id.
    pub async fn get_ingredient(&self, id: i64) -> Result<Ingredient, AppError> {
        self.repository
            .find_ingredient(id)
            .await?
            .ok_or_else(|| AppError::not_found("Ingredient not found", json!({ "id": id })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockCatalogRepository;

    fn ingredient(id: i64, name: &str) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            measurement_unit: "g".to_string(),
        }
    }

    #[tokio::test]
    async fn test_prefix_matches_come_first() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_list_ingredients()
            .withf(|name| name.as_deref() == Some("sa"))
            .returning(|_| {
                Ok(vec![
                    ingredient(1, "Brown sauce"),
                    ingredient(2, "Salmon"),
                    ingredient(3, "Salt"),
                    ingredient(4, "Wasabi"),
                ])
            });

        let service = CatalogService::new(Arc::new(repo));
        let result = service.search_ingredients(Some("sa")).await.unwrap();

        let names: Vec<&str> = result.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Salmon", "Salt", "Brown sauce", "Wasabi"]);
    }

    #[tokio::test]
    async fn test_prefix_match_is_case_insensitive() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_list_ingredients()
            .returning(|_| Ok(vec![ingredient(1, "Sea salt"), ingredient(2, "Salt")]));

        let service = CatalogService::new(Arc::new(repo));
        let result = service.search_ingredients(Some("SAL")).await.unwrap();

        assert_eq!(result[0].name, "Salt");
    }

    #[tokio::test]
    async fn test_blank_query_lists_all() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_list_ingredients()
            .withf(|name| name.is_none())
            .times(1)
            .returning(|_| Ok(vec![ingredient(1, "Salt")]));

        let service = CatalogService::new(Arc::new(repo));

        assert_eq!(service.search_ingredients(Some("  ")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_tag_is_not_found() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_find_tag().returning(|_| Ok(None));

        let service = CatalogService::new(Arc::new(repo));

        assert!(matches!(
            service.get_tag(9).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
