//! Truck ordering flows: catalog CRUD and the order sheet built for a
//! delivery day, priced against par levels.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp, MANAGER_PASSWORD, TEAM_PASSWORD};
use rstest::rstest;
use serde_json::{json, Value};

/// Decimal fields serialize as JSON strings; parse them for comparison.
fn dec(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse().unwrap_or_else(|_| panic!("bad decimal: {s}")),
        Value::Number(n) => n.as_f64().expect("numeric decimal"),
        other => panic!("expected a decimal, got {other}"),
    }
}

fn item_payload(description: &str, area: &str, sort_order: i32) -> Value {
    json!({
        "description": description,
        "uom": "case",
        "total_units": 0,
        "cost": "10.00",
        "associated_items": [],
        "par_levels": {},
        "storage_area": area,
        "sort_order": sort_order,
    })
}

async fn create_item(app: &TestApp, token: &str, payload: Value) -> Value {
    let response = app
        .request(Method::POST, "/api/v1/truck-items", Some(payload), Some(token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

// ==================== Catalog CRUD ====================

#[tokio::test]
async fn catalog_round_trips_pars_and_associated_items() {
    let app = TestApp::new().await;
    let token = app.login("manager", MANAGER_PASSWORD).await;

    let mut payload = item_payload("Medium Drink Cups", "Dry Storage A", 10);
    payload["cost"] = json!("42.50");
    payload["total_units"] = json!(4);
    payload["associated_items"] = json!([{ "description": "Medium Lids", "units_per": 1 }]);
    // Day keys canonicalize to lowercase on the way in.
    payload["par_levels"] = json!({ "Monday": "6", "THURSDAY": "9" });
    let created = create_item(&app, &token, payload).await;

    let id = created["id"].as_i64().expect("item id");
    assert_eq!(created["description"], "Medium Drink Cups");
    assert_eq!(dec(&created["par_levels"]["monday"]), 6.0);
    assert_eq!(dec(&created["par_levels"]["thursday"]), 9.0);
    assert_eq!(created["associated_items"][0]["description"], "Medium Lids");

    let mut replacement = item_payload("Medium Drink Cups 16oz", "Dry Storage A", 10);
    replacement["total_units"] = json!(7);
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/truck-items/{id}"),
            Some(replacement),
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["description"], "Medium Drink Cups 16oz");
    assert_eq!(updated["data"]["total_units"], 7);
    // The replacement carried no pars, so none survive.
    assert_eq!(updated["data"]["par_levels"], json!({}));

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/truck-items/{id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/truck-items/{id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_lists_by_storage_area_then_sort_order() {
    let app = TestApp::new().await;
    let token = app.login("manager", MANAGER_PASSWORD).await;

    create_item(&app, &token, item_payload("Tea Bags", "Dry Storage B", 20)).await;
    create_item(&app, &token, item_payload("Cups", "Dry Storage A", 10)).await;
    create_item(&app, &token, item_payload("Lids", "Dry Storage A", 5)).await;

    let response = app
        .request(Method::GET, "/api/v1/truck-items", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("items")
        .iter()
        .map(|i| i["description"].as_str().expect("description"))
        .collect();
    assert_eq!(names, vec!["Lids", "Cups", "Tea Bags"]);
}

#[tokio::test]
async fn catalog_validation_rejects_bad_items() {
    let app = TestApp::new().await;
    let token = app.login("manager", MANAGER_PASSWORD).await;

    let mut blank = item_payload("   ", "Dry Storage A", 0);
    blank["cost"] = json!("5.00");

    let mut negative_cost = item_payload("Cups", "Dry Storage A", 0);
    negative_cost["cost"] = json!("-1.00");

    let mut bad_par_day = item_payload("Cups", "Dry Storage A", 0);
    bad_par_day["par_levels"] = json!({ "someday": "4" });

    let mut bad_assoc = item_payload("Cups", "Dry Storage A", 0);
    bad_assoc["associated_items"] = json!([{ "description": "Lids", "units_per": 0 }]);

    for payload in [blank, negative_cost, bad_par_day, bad_assoc] {
        let response = app
            .request(
                Method::POST,
                "/api/v1/truck-items",
                Some(payload),
                Some(&token),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn team_role_cannot_see_the_truck_catalog() {
    let app = TestApp::new().await;
    let token = app.login("team", TEAM_PASSWORD).await;

    let response = app
        .request(Method::GET, "/api/v1/truck-items", None, Some(&token))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "FORBIDDEN");
}

// ==================== Order sheets ====================

#[tokio::test]
async fn order_sheet_prices_the_shortfall_and_derives_demand() {
    let app = TestApp::new().await;
    let token = app.login("manager", MANAGER_PASSWORD).await;

    let mut cups = item_payload("Medium Drink Cups", "Dry Storage A", 10);
    cups["cost"] = json!("42.50");
    cups["total_units"] = json!(4);
    cups["par_levels"] = json!({ "thursday": "10" });
    cups["associated_items"] = json!([{ "description": "Medium Lids", "units_per": 1 }]);
    create_item(&app, &token, cups).await;

    let mut tea = item_payload("Iced Tea Bags", "Dry Storage B", 20);
    tea["cost"] = json!("31.00");
    tea["total_units"] = json!(2);
    tea["par_levels"] = json!({ "thursday": "4.5" });
    tea["associated_items"] = json!([{ "description": "Tea Filters", "units_per": 2 }]);
    create_item(&app, &token, tea).await;

    let mut fries = item_payload("Waffle Fries", "Walk-in Freezer", 30);
    fries["cost"] = json!("58.75");
    fries["total_units"] = json!(9);
    fries["par_levels"] = json!({ "thursday": "6" });
    create_item(&app, &token, fries).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/truck-items/order-sheet?day=thursday",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let sheet = body_json(response).await["data"].clone();
    assert_eq!(sheet["day"], "thursday");
    let lines = sheet["lines"].as_array().expect("lines");
    assert_eq!(lines.len(), 3);

    // Par 10 - 4 on hand = 6 cases; one lid sleeve per case.
    let cups_line = &lines[0];
    assert_eq!(cups_line["description"], "Medium Drink Cups");
    assert_eq!(cups_line["suggested_order"], 6);
    assert_eq!(dec(&cups_line["extended_cost"]), 255.0);
    assert_eq!(cups_line["associated_demand"][0]["description"], "Medium Lids");
    assert_eq!(cups_line["associated_demand"][0]["units_needed"], 6);

    // Fractional shortfall rounds up: 4.5 - 2 = 2.5 -> 3 cases.
    let tea_line = &lines[1];
    assert_eq!(tea_line["suggested_order"], 3);
    assert_eq!(dec(&tea_line["extended_cost"]), 93.0);
    assert_eq!(tea_line["associated_demand"][0]["units_needed"], 6);

    // Over par: nothing to order, no derived demand.
    let fries_line = &lines[2];
    assert_eq!(fries_line["suggested_order"], 0);
    assert_eq!(dec(&fries_line["extended_cost"]), 0.0);
    assert!(fries_line["associated_demand"]
        .as_array()
        .expect("demand")
        .is_empty());

    assert_eq!(dec(&sheet["total_cost"]), 348.0);
}

#[tokio::test]
async fn order_sheet_treats_unlisted_days_as_zero_par() {
    let app = TestApp::new().await;
    let token = app.login("manager", MANAGER_PASSWORD).await;

    let mut cups = item_payload("Medium Drink Cups", "Dry Storage A", 10);
    cups["total_units"] = json!(4);
    cups["par_levels"] = json!({ "thursday": "10" });
    create_item(&app, &token, cups).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/truck-items/order-sheet?day=monday",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let sheet = body_json(response).await["data"].clone();
    assert_eq!(sheet["lines"][0]["suggested_order"], 0);
    assert_eq!(dec(&sheet["total_cost"]), 0.0);
}

#[rstest]
#[case::lowercase("monday")]
#[case::capitalized("Thursday")]
#[case::shouted("SATURDAY")]
#[tokio::test]
async fn order_sheet_accepts_any_day_name_casing(#[case] day: &str) {
    let app = TestApp::new().await;
    let token = app.login("manager", MANAGER_PASSWORD).await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/truck-items/order-sheet?day={day}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let sheet = body_json(response).await["data"].clone();
    assert_eq!(sheet["day"], day.to_lowercase());
}

#[tokio::test]
async fn order_sheet_requires_a_known_day() {
    let app = TestApp::new().await;
    let token = app.login("manager", MANAGER_PASSWORD).await;

    let response = app
        .request(
            Method::GET,
            "/api/v1/truck-items/order-sheet?day=someday",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");

    // Missing the parameter entirely is also a bad request.
    let response = app
        .request(
            Method::GET,
            "/api/v1/truck-items/order-sheet",
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
