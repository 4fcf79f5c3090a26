//! Fixtures shared by unit tests.

use chrono::Utc;

use crate::domain::entities::{Ingredient, Recipe, RecipeIngredient, Tag, User};

pub fn sample_user(id: i64) -> User {
    User {
        id,
        email: format!("u{id}@example.com"),
        username: format!("user{id}"),
        first_name: "First".to_string(),
        last_name: "Last".to_string(),
        avatar: None,
        is_staff: false,
        created_at: Utc::now(),
    }
}

pub fn sample_tag(id: i64) -> Tag {
    Tag {
        id,
        name: format!("Tag {id}"),
        slug: format!("tag-{id}"),
    }
}

pub fn sample_ingredient(id: i64) -> Ingredient {
    Ingredient {
        id,
        name: format!("Ingredient {id}"),
        measurement_unit: "g".to_string(),
    }
}

pub fn sample_recipe(id: i64, author_id: i64) -> Recipe {
    Recipe {
        id,
        author_id,
        name: format!("Recipe {id}"),
        text: "Mix everything".to_string(),
        image: format!("recipes/images/{id}.png"),
        cooking_time: 15,
        tags: vec![sample_tag(1)],
        ingredients: vec![RecipeIngredient {
            ingredient_id: 1,
            name: "Ingredient 1".to_string(),
            measurement_unit: "g".to_string(),
            amount: 100,
        }],
        created_at: Utc::now(),
    }
}
