mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use common::{create, memory_app, payload, router_with_config, send};
use menu_server::{config::Config, store::MemoryStore};
use mongodb::bson::oid::ObjectId;
use serde_json::{json, Value};

fn margherita() -> Value {
    json!({
        "name": "Margherita",
        "category": "Pizza",
        "price": "9.50",
        "description": "Tomato, mozzarella, basil",
        "image": "https://cdn.example.com/margherita.png",
    })
}

#[tokio::test]
async fn created_item_reads_back_unchanged() {
    let (app, _) = memory_app();
    let id = create(&app, "/menu", margherita()).await;

    let (status, body) = send(&app, Method::GET, &format!("/menu/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = margherita();
    expected["id"] = json!(id);
    assert_eq!(payload(&body), &expected);
}

#[tokio::test]
async fn every_field_is_required() {
    let (app, store) = memory_app();

    for field in ["name", "category", "price", "description", "image"] {
        let mut body = margherita();
        body[field] = json!("");
        let (status, json) = send(&app, Method::POST, "/menu", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field}");
        assert_eq!(payload(&json), format!("{field}: {field} is required").as_str());

        let mut body = margherita();
        body.as_object_mut().unwrap().remove(field);
        let (status, _) = send(&app, Method::POST, "/menu", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{field} absent");
    }

    assert!(store.is_empty("menus"));
}

#[tokio::test]
async fn update_ignores_category_and_image() {
    let (app, _) = memory_app();
    let id = create(&app, "/menu", margherita()).await;

    let edit = json!({
        "name": "Margherita DOP",
        "category": "Specials",
        "price": "11.00",
        "description": "Buffalo mozzarella",
        "image": "https://cdn.example.com/other.png",
    });
    let (status, body) = send(&app, Method::PUT, &format!("/menu/{id}"), Some(edit)).await;
    assert_eq!(status, StatusCode::OK);

    let updated = payload(&body);
    assert_eq!(updated["name"], "Margherita DOP");
    assert_eq!(updated["price"], "11.00");
    assert_eq!(updated["description"], "Buffalo mozzarella");
    assert_eq!(updated["category"], "Pizza");
    assert_eq!(updated["image"], "https://cdn.example.com/margherita.png");

    let (_, body) = send(&app, Method::GET, &format!("/menu/{id}"), None).await;
    assert_eq!(payload(&body)["category"], "Pizza");
    assert_eq!(payload(&body)["name"], "Margherita DOP");
}

#[tokio::test]
async fn update_still_requires_the_full_record() {
    let (app, _) = memory_app();
    let id = create(&app, "/menu", margherita()).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/menu/{id}"),
        Some(json!({ "name": "Marinara", "price": "7.00", "description": "No cheese" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        payload(&body),
        "category: category is required; image: image is required"
    );

    let (_, body) = send(&app, Method::GET, &format!("/menu/{id}"), None).await;
    assert_eq!(payload(&body)["name"], "Margherita");
}

#[tokio::test]
async fn update_of_unknown_id_returns_empty_item() {
    let (app, _) = memory_app();

    let unknown = ObjectId::new().to_hex();
    let (status, body) = send(&app, Method::PUT, &format!("/menu/{unknown}"), Some(margherita())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        payload(&body),
        &json!({ "name": "", "category": "", "price": "", "description": "", "image": "" })
    );
}

#[tokio::test]
async fn delete_then_delete_again() {
    let (app, _) = memory_app();
    let id = create(&app, "/menu", margherita()).await;

    let (status, body) = send(&app, Method::DELETE, &format!("/menu/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload(&body), "Menu successfully deleted!");

    let (status, body) = send(&app, Method::DELETE, &format!("/menu/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload(&body), "Menu with specified ID not found!");

    let (status, _) = send(&app, Method::GET, &format!("/menu/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn menus_and_categories_are_separate_collections() {
    let (app, store) = memory_app();
    let id = create(&app, "/menu", margherita()).await;
    create(&app, "/category", json!({ "name": "Pizza" })).await;

    let (_, body) = send(&app, Method::GET, "/menus", None).await;
    let items = payload(&body).as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], id.as_str());

    // a menu id is unknown to the category routes
    let (status, _) = send(&app, Method::GET, &format!("/category/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(store.len("menus"), 1);
    assert_eq!(store.len("categorys"), 1);
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let (app, _) = memory_app();

    let request = axum::http::Request::builder()
        .method(Method::OPTIONS)
        .uri("/menus")
        .header("origin", "https://shop.example.com")
        .header("access-control-request-method", "GET")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

fn preflight(origin: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method(Method::OPTIONS)
        .uri("/menus")
        .header("origin", origin)
        .header("access-control-request-method", "GET")
        .header("access-control-request-headers", "content-type")
        .body(axum::body::Body::empty())
        .unwrap()
}

#[tokio::test]
async fn cors_honours_an_explicit_origin_list() {
    let config = Config {
        cors_allowed_origins: vec![
            "https://shop.example.com".into(),
            "bad\norigin".into(),
        ],
        cors_allowed_headers: vec!["Content-Type".into(), "not a header".into()],
        ..Config::default()
    };
    let app = router_with_config(Arc::new(MemoryStore::new()), &config);

    let response = tower::ServiceExt::oneshot(app.clone(), preflight("https://shop.example.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://shop.example.com"
    );
    assert_eq!(
        response.headers()["access-control-allow-headers"],
        "content-type"
    );

    let response = tower::ServiceExt::oneshot(app, preflight("https://evil.example.com"))
        .await
        .unwrap();
    assert!(response
        .headers()
        .get("access-control-allow-origin")
        .is_none());
}
