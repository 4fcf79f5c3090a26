mod common;

use serde_json::Value;

#[tokio::test]
async fn test_list_tags() {
    let app = common::spawn_app();
    common::seed_catalog(&app).await;

    let response = app.server.get("/api/tags").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    let tags = json.as_array().unwrap();
    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0]["slug"], "breakfast");
    assert!(tags[0].get("id").is_some());
    assert!(tags[0].get("name").is_some());
}

#[tokio::test]
async fn test_get_tag_not_found() {
    let app = common::spawn_app();

    let response = app.server.get("/api/tags/999").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_list_ingredients_unpaginated() {
    let app = common::spawn_app();
    common::seed_catalog(&app).await;

    let response = app.server.get("/api/ingredients").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_ingredient_search_puts_prefix_matches_first() {
    let app = common::spawn_app();
    common::seed_catalog(&app).await;

    let response = app.server.get("/api/ingredients").add_query_param("name", "mi").await;
    response.assert_status_ok();
    let names: Vec<String> = response
        .json::<Value>()
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Milk"]);

    // no name starts with "l", so matches keep name order
    let response = app.server.get("/api/ingredients").add_query_param("name", "L").await;
    let names: Vec<String> = response
        .json::<Value>()
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Flour", "Milk", "Salt"]);
}

#[tokio::test]
async fn test_get_ingredient() {
    let app = common::spawn_app();
    let catalog = common::seed_catalog(&app).await;
    let salt = catalog.ingredient("Salt");

    let response = app.server.get(&format!("/api/ingredients/{salt}")).await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["name"], "Salt");
    assert_eq!(json["measurement_unit"], "g");
}
