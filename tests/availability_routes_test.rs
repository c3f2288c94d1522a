mod common;

use actix_web::{http::StatusCode, test};

use common::TestApp;
use serendip_api::models::{bookings::NewBooking, room_type::RoomType};

fn existing_booking(ship_id: Option<i64>, ship_name: &str, room_type: RoomType) -> NewBooking {
    NewBooking {
        full_name: "Earlier Guest".to_string(),
        gender: "Female".to_string(),
        email: "earlier@example.com".to_string(),
        citizenship: "Sri Lanka".to_string(),
        age: 41,
        room_type,
        cabin_number: format!("{}100", room_type.cabin_prefix()),
        adults: 2,
        children: 0,
        number_of_guests: 2,
        card_type: "Visa".to_string(),
        card_number: "4111111111111111".to_string(),
        total_price: 1000.0,
        ship_id,
        ship_name: ship_name.to_string(),
        destination: "Mediterranean".to_string(),
    }
}

fn entry<'a>(body: &'a serde_json::Value, cabin_type: &str) -> &'a serde_json::Value {
    body["cabin_availability"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["cabin_type"] == cabin_type)
        .unwrap()
}

#[actix_rt::test]
async fn test_availability_for_empty_route() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/cabin-availability?ship_id=1&route=Caribbean")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["ship_name"], "Ocean Star");
    assert_eq!(body["total_passenger_capacity"], 1000);
    assert_eq!(body["cabin_availability"].as_array().unwrap().len(), 4);
    assert_eq!(entry(&body, "Interior")["total_capacity"], 100);
    assert_eq!(entry(&body, "Ocean View")["total_capacity"], 75);
    assert_eq!(entry(&body, "Balcony")["total_capacity"], 62);
    assert_eq!(entry(&body, "Suite")["available"], 12);
    assert_eq!(entry(&body, "Suite")["availability_percentage"], 100.0);
}

#[actix_rt::test]
async fn test_availability_counts_bookings_by_id_or_name() {
    let test_app = TestApp::new();
    test_app
        .store
        .add_booking(existing_booking(Some(2), "Sea Breeze", RoomType::Suite));
    test_app
        .store
        .add_booking(existing_booking(None, "Sea Breeze", RoomType::Suite));
    test_app
        .store
        .add_booking(existing_booking(Some(2), "Sea Breeze", RoomType::Interior));
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/cabin-availability?ship_name=Sea%20Breeze&route=Mediterranean")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["ship_id"], 2);
    let suite = entry(&body, "Suite");
    assert_eq!(suite["total_capacity"], 5);
    assert_eq!(suite["booked"], 2);
    assert_eq!(suite["available"], 3);
    assert_eq!(suite["availability_percentage"], 60.0);
    assert_eq!(entry(&body, "Interior")["availability_percentage"], 97.5);
}

#[actix_rt::test]
async fn test_overbooked_category_never_goes_negative() {
    let test_app = TestApp::new();
    for _ in 0..7 {
        test_app
            .store
            .add_booking(existing_booking(Some(2), "Sea Breeze", RoomType::Suite));
    }
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/cabin-availability?ship_id=2&route=Mediterranean")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    let suite = entry(&body, "Suite");
    assert_eq!(suite["booked"], 7);
    assert_eq!(suite["available"], 0);
    assert_eq!(suite["availability_percentage"], 0.0);
}

#[actix_rt::test]
async fn test_availability_needs_a_ship_record() {
    let test_app = TestApp::new();
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/cabin-availability?ship_name=Ghost&route=Caribbean")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri("/api/cabin-availability?ship_id=1")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "Ship identifier (ship_id or ship_name) and route are required"
    );
}
