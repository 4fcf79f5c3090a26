mod common;

use axum::http::StatusCode;
use recipe_share::domain::repositories::UserRepository;
use serde_json::{Value, json};

#[tokio::test]
async fn test_create_recipe() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;
    let (user, token) = common::signed_in(&app, "ann").await;

    let payload = common::recipe_payload(
        "Pancakes",
        &[catalog.tag("breakfast")],
        &[(catalog.ingredient("Flour"), 200), (catalog.ingredient("Milk"), 300)],
    );

    let response = app
        .server
        .post("/api/recipes")
        .add_header("Authorization", common::auth(&token))
        .json(&payload)
        .await;

    response.assert_status(StatusCode::CREATED);
    let json = response.json::<Value>();
    assert_eq!(json["name"], "Pancakes");
    assert_eq!(json["author"]["id"], user.id);
    assert_eq!(json["author"]["is_subscribed"], false);
    assert_eq!(json["tags"][0]["slug"], "breakfast");
    assert_eq!(json["ingredients"].as_array().unwrap().len(), 2);
    assert_eq!(json["ingredients"][0]["name"], "Flour");
    assert_eq!(json["ingredients"][0]["measurement_unit"], "g");
    assert_eq!(json["ingredients"][0]["amount"], 200);
    assert_eq!(json["is_favorited"], false);
    assert_eq!(json["is_in_shopping_cart"], false);
    assert!(
        json["image"]
            .as_str()
            .unwrap()
            .starts_with("http://localhost:3000/media/recipes/images/")
    );
}

#[tokio::test]
async fn test_create_recipe_requires_authentication() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;

    let payload = common::recipe_payload(
        "Pancakes",
        &[catalog.tag("breakfast")],
        &[(catalog.ingredient("Flour"), 200)],
    );

    app.server
        .post("/api/recipes")
        .json(&payload)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_recipe_collects_every_violation() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;
    let (_, token) = common::signed_in(&app, "ann").await;
    let flour = catalog.ingredient("Flour");

    let response = app
        .server
        .post("/api/recipes")
        .add_header("Authorization", common::auth(&token))
        .json(&json!({
            "name": "   ",
            "text": "Mix.",
            "cooking_time": 0,
            "tags": [],
            "ingredients": [
                { "id": flour, "amount": 10 },
                { "id": flour, "amount": 20 },
                { "id": 999, "amount": 0 },
            ],
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let details = &response.json::<Value>()["error"]["details"];
    assert!(details["name"].is_array());
    assert!(details["cooking_time"].is_array());
    assert!(details["tags"].is_array());
    assert!(details["image"].is_array());

    let ingredients: Vec<&str> = details["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m.as_str().unwrap())
        .collect();
    assert!(ingredients.contains(&format!("Duplicate ingredient: {flour}").as_str()));
    assert!(ingredients.contains(&"Ingredient 999 does not exist"));
    assert!(ingredients.iter().any(|m| m.starts_with("Amount of ingredient 999")));

    // nothing was stored
    let list = app.server.get("/api/recipes").await;
    assert_eq!(list.json::<Value>()["count"], 0);
}

#[tokio::test]
async fn test_get_recipe_not_found() {
    let app = common::spawn_app();

    app.server
        .get("/api/recipes/12345")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_update_recipe_by_author() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;
    let (_, token) = common::signed_in(&app, "ann").await;

    let id = common::create_recipe(
        &app,
        &token,
        common::recipe_payload(
            "Pancakes",
            &[catalog.tag("breakfast")],
            &[(catalog.ingredient("Flour"), 200)],
        ),
    )
    .await;
    let before = app.server.get(&format!("/api/recipes/{id}")).await.json::<Value>();

    // image is optional on update and keeps the stored one
    let response = app
        .server
        .patch(&format!("/api/recipes/{id}"))
        .add_header("Authorization", common::auth(&token))
        .json(&json!({
            "name": "Crepes",
            "text": "Thinner.",
            "cooking_time": 15,
            "tags": [catalog.tag("dinner")],
            "ingredients": [{ "id": catalog.ingredient("Egg"), "amount": 2 }],
        }))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["name"], "Crepes");
    assert_eq!(json["cooking_time"], 15);
    assert_eq!(json["tags"].as_array().unwrap().len(), 1);
    assert_eq!(json["tags"][0]["slug"], "dinner");
    assert_eq!(json["ingredients"][0]["name"], "Egg");
    assert_eq!(json["image"], before["image"]);
}

#[tokio::test]
async fn test_update_recipe_requires_tags_and_ingredients() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;
    let (_, token) = common::signed_in(&app, "ann").await;

    let id = common::create_recipe(
        &app,
        &token,
        common::recipe_payload(
            "Pancakes",
            &[catalog.tag("breakfast")],
            &[(catalog.ingredient("Flour"), 200)],
        ),
    )
    .await;

    let response = app
        .server
        .patch(&format!("/api/recipes/{id}"))
        .add_header("Authorization", common::auth(&token))
        .json(&json!({ "name": "Crepes", "text": "Thinner.", "cooking_time": 15 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let details = &response.json::<Value>()["error"]["details"];
    assert!(details["tags"].is_array());
    assert!(details["ingredients"].is_array());
    assert!(details.get("image").is_none());
}

#[tokio::test]
async fn test_only_author_can_modify_recipe() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;
    let (_, author_token) = common::signed_in(&app, "ann").await;
    let (_, other_token) = common::signed_in(&app, "bob").await;

    let payload = common::recipe_payload(
        "Pancakes",
        &[catalog.tag("breakfast")],
        &[(catalog.ingredient("Flour"), 200)],
    );
    let id = common::create_recipe(&app, &author_token, payload.clone()).await;

    app.server
        .patch(&format!("/api/recipes/{id}"))
        .add_header("Authorization", common::auth(&other_token))
        .json(&payload)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .delete(&format!("/api/recipes/{id}"))
        .add_header("Authorization", common::auth(&other_token))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .delete(&format!("/api/recipes/{id}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_can_delete_any_recipe() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;
    let (_, author_token) = common::signed_in(&app, "ann").await;
    let staff = common::register(&app, "admin").await;

    app.store.set_staff(&staff.email, true).await.unwrap();
    let staff_token = common::login(&app, &staff).await;

    let id = common::create_recipe(
        &app,
        &author_token,
        common::recipe_payload(
            "Pancakes",
            &[catalog.tag("breakfast")],
            &[(catalog.ingredient("Flour"), 200)],
        ),
    )
    .await;

    app.server
        .delete(&format!("/api/recipes/{id}"))
        .add_header("Authorization", common::auth(&staff_token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(&format!("/api/recipes/{id}"))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_list_recipes_newest_first_with_pagination() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;
    let (_, token) = common::signed_in(&app, "ann").await;

    for name in ["First", "Second", "Third"] {
        common::create_recipe(
            &app,
            &token,
            common::recipe_payload(
                name,
                &[catalog.tag("breakfast")],
                &[(catalog.ingredient("Salt"), 1)],
            ),
        )
        .await;
    }

    let response = app
        .server
        .get("/api/recipes")
        .add_query_param("limit", 2)
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["count"], 3);
    assert_eq!(json["results"][0]["name"], "Third");
    assert_eq!(json["results"][1]["name"], "Second");
    assert_eq!(
        json["next"],
        "http://localhost:3000/api/recipes?limit=2&page=2"
    );
}

#[tokio::test]
async fn test_list_recipes_filters() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;
    let (ann, ann_token) = common::signed_in(&app, "ann").await;
    let (_, bob_token) = common::signed_in(&app, "bob").await;
    let salt = catalog.ingredient("Salt");

    let pancakes = common::create_recipe(
        &app,
        &ann_token,
        common::recipe_payload("Pancakes", &[catalog.tag("breakfast")], &[(salt, 1)]),
    )
    .await;
    common::create_recipe(
        &app,
        &ann_token,
        common::recipe_payload("Soup", &[catalog.tag("dinner")], &[(salt, 2)]),
    )
    .await;
    let omelette = common::create_recipe(
        &app,
        &bob_token,
        common::recipe_payload(
            "Omelette",
            &[catalog.tag("breakfast"), catalog.tag("dinner")],
            &[(salt, 1)],
        ),
    )
    .await;

    let ids = |json: Value| -> Vec<i64> {
        json["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_i64().unwrap())
            .collect()
    };

    let by_tag = app.server.get("/api/recipes?tags=breakfast").await.json::<Value>();
    assert_eq!(ids(by_tag), vec![omelette, pancakes]);

    let any_tag = app
        .server
        .get("/api/recipes?tags=breakfast&tags=dinner")
        .await
        .json::<Value>();
    assert_eq!(any_tag["count"], 3);

    let by_author = app
        .server
        .get(&format!("/api/recipes?author={}", ann.id))
        .await
        .json::<Value>();
    assert_eq!(by_author["count"], 2);

    let by_name = app.server.get("/api/recipes?name=CAKE").await.json::<Value>();
    assert_eq!(ids(by_name), vec![pancakes]);

    app.server
        .post(&format!("/api/recipes/{omelette}/favorite"))
        .add_header("Authorization", common::auth(&ann_token))
        .await
        .assert_status(StatusCode::CREATED);

    let favorited = app
        .server
        .get("/api/recipes?is_favorited=1")
        .add_header("Authorization", common::auth(&ann_token))
        .await
        .json::<Value>();
    assert_eq!(ids(favorited.clone()), vec![omelette]);
    assert_eq!(favorited["results"][0]["is_favorited"], true);

    let not_favorited = app
        .server
        .get("/api/recipes?is_favorited=0")
        .add_header("Authorization", common::auth(&ann_token))
        .await
        .json::<Value>();
    assert_eq!(not_favorited["count"], 2);

    // anonymous callers have no favorites
    let anonymous = app.server.get("/api/recipes?is_favorited=1").await.json::<Value>();
    assert_eq!(anonymous["count"], 0);
}

#[tokio::test]
async fn test_list_recipes_rejects_bad_filter() {
    let app = common::spawn_app();

    app.server
        .get("/api/recipes?author=abc")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_recipes_rejects_out_of_range_page() {
    let app = common::spawn_app();

    let response = app.server.get("/api/recipes?page=9223372036854775807").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<Value>();
    assert!(json["error"]["details"]["page"].is_array());
}

#[tokio::test]
async fn test_favorite_twice_and_remove_missing() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;
    let (_, token) = common::signed_in(&app, "ann").await;

    let id = common::create_recipe(
        &app,
        &token,
        common::recipe_payload(
            "Pancakes",
            &[catalog.tag("breakfast")],
            &[(catalog.ingredient("Flour"), 200)],
        ),
    )
    .await;
    let url = format!("/api/recipes/{id}/favorite");

    let response = app
        .server
        .post(&url)
        .add_header("Authorization", common::auth(&token))
        .await;
    response.assert_status(StatusCode::CREATED);
    let json = response.json::<Value>();
    assert_eq!(json["id"], id);
    assert_eq!(json["name"], "Pancakes");
    assert!(json.get("text").is_none());

    app.server
        .post(&url)
        .add_header("Authorization", common::auth(&token))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.server
        .delete(&url)
        .add_header("Authorization", common::auth(&token))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .delete(&url)
        .add_header("Authorization", common::auth(&token))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_favorite_unknown_recipe() {
    let app = common::spawn_app();
    let (_, token) = common::signed_in(&app, "ann").await;

    app.server
        .post("/api/recipes/777/favorite")
        .add_header("Authorization", common::auth(&token))
        .await
        .assert_status_not_found();
}
