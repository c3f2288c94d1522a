mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use common::{RecordingMailer, TestApp};
use serendip_api::models::{
    bookings::NewBooking,
    facility::{Facility, FacilityPaymentStatus},
    room_type::RoomType,
};

fn seed_facilities(test_app: &TestApp) -> i64 {
    for (id, name, price, status) in [
        (1, "Spa Access", 30.0, "active"),
        (2, "Specialty Dining", 75.0, "active"),
        (3, "Kids Club", 0.0, "active"),
        (4, "Casino Night", 60.0, "inactive"),
    ] {
        test_app.store.add_facility(Facility {
            facility_id: id,
            facility: name.to_string(),
            unit_price: price,
            status: status.to_string(),
        });
    }
    test_app.store.add_booking(NewBooking {
        full_name: "Amaya Fernando".to_string(),
        gender: "Female".to_string(),
        email: "amaya@example.com".to_string(),
        citizenship: "Sri Lanka".to_string(),
        age: 32,
        room_type: RoomType::Balcony,
        cabin_number: "B204".to_string(),
        adults: 2,
        children: 0,
        number_of_guests: 2,
        card_type: "Visa".to_string(),
        card_number: "4111111111111111".to_string(),
        total_price: 3000.0,
        ship_id: Some(1),
        ship_name: "Ocean Star".to_string(),
        destination: "Caribbean".to_string(),
    })
}

#[actix_rt::test]
async fn test_list_active_facilities() {
    let test_app = TestApp::new();
    seed_facilities(&test_app);
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get().uri("/api/facilities").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);

    let facilities = body["facilities"].as_array().unwrap();
    assert_eq!(facilities.len(), 3);
    assert_eq!(facilities[0]["name"], "Kids Club");
    assert_eq!(facilities[1]["code"], "spa_access");
    assert_eq!(facilities[1]["unit_price"], 30.0);
}

#[actix_rt::test]
async fn test_save_pending_blocks_further_selection() {
    let test_app = TestApp::new();
    let booking_id = seed_facilities(&test_app);
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/facilities/bookings")
        .set_json(&json!({
            "booking_id": booking_id,
            "action": "save_pending",
            "selected_facilities": { "spa_access": true, "specialty_dining": true },
            "quantities": { "spa_access": 2 },
            "passenger_email": "amaya@example.com",
            "total_cost": 1.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Facility preferences saved as pending!");
    assert_eq!(body["facility_details"].as_array().unwrap().len(), 2);
    assert_eq!(body["email_sent"], true);

    let sessions = test_app.store.facility_sessions();
    assert_eq!(sessions.len(), 1);
    // priced from the facility list, not from the client
    assert_eq!(sessions[0].total_cost, 135.0);

    let sent = test_app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].subject,
        "Facility Booking Saved - Payment Pending - Serendip Waves"
    );
    assert!(sent[0].html_body.contains("Specialty Dining"));

    let req = test::TestRequest::post()
        .uri("/api/facilities/bookings")
        .set_json(&json!({
            "booking_id": booking_id,
            "action": "save_pending",
            "selected_facilities": { "kids_club": true }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["pending_amount"], 135.0);
    assert_eq!(body["action_required"], "complete_payment");
}

#[actix_rt::test]
async fn test_confirm_settles_pending_sessions() {
    let test_app = TestApp::new();
    let booking_id = seed_facilities(&test_app);
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/facilities/bookings")
        .set_json(&json!({
            "booking_id": booking_id,
            "action": "save_pending",
            "selected_facilities": { "spa_access": true }
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/facilities/bookings")
        .set_json(&json!({
            "booking_id": booking_id,
            "action": "confirm",
            "card_details": { "cardNumber": "3782 822463 10005" }
        }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body["message"],
        "Payment confirmed for 1 facility booking(s). Total paid: $30.00"
    );
    assert_eq!(body["total_paid"], 30.0);

    let sessions = test_app.store.facility_sessions();
    assert_eq!(sessions[0].payment_status, FacilityPaymentStatus::Paid);
    assert_eq!(sessions[0].card_num.as_deref(), Some("**** **** **** 0005"));
    assert_eq!(sessions[0].card_type.as_deref(), Some("American Express"));
}

#[actix_rt::test]
async fn test_confirm_rejects_facilities_already_paid() {
    let test_app = TestApp::new();
    let booking_id = seed_facilities(&test_app);
    let app = test::init_service(test_app.create_app()).await;

    let confirm = json!({
        "booking_id": booking_id,
        "action": "confirm",
        "selected_facilities": { "spa_access": true }
    });
    let req = test::TestRequest::post()
        .uri("/api/facilities/bookings")
        .set_json(&confirm)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/facilities/bookings")
        .set_json(&confirm)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["already_paid_facilities"], json!(["Spa Access"]));
    assert_eq!(test_app.store.facility_sessions().len(), 1);
}

#[actix_rt::test]
async fn test_cancel_facility_booking() {
    let test_app = TestApp::new();
    let booking_id = seed_facilities(&test_app);
    let app = test::init_service(test_app.create_app()).await;

    for action in ["save_pending", "cancel"] {
        let req = test::TestRequest::post()
            .uri("/api/facilities/bookings")
            .set_json(&json!({
                "booking_id": booking_id,
                "action": action,
                "selected_facilities": { "specialty_dining": true }
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let sessions = test_app.store.facility_sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].payment_status, FacilityPaymentStatus::Cancelled);
}

#[actix_rt::test]
async fn test_facility_booking_validation() {
    let test_app = TestApp::new();
    let booking_id = seed_facilities(&test_app);
    let app = test::init_service(test_app.create_app()).await;

    let cases = [
        (json!({ "action": "confirm" }), StatusCode::BAD_REQUEST, "Missing required fields"),
        (
            json!({ "booking_id": booking_id, "action": "refund" }),
            StatusCode::BAD_REQUEST,
            "Invalid action",
        ),
        (
            json!({ "booking_id": 999, "action": "cancel" }),
            StatusCode::NOT_FOUND,
            "Booking not found",
        ),
    ];
    for (payload, status, message) in cases {
        let req = test::TestRequest::post()
            .uri("/api/facilities/bookings")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], message);
    }
}

#[actix_rt::test]
async fn test_mail_failure_does_not_fail_the_booking() {
    let test_app = TestApp::with_mailer(RecordingMailer::failing());
    let booking_id = seed_facilities(&test_app);
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/facilities/bookings")
        .set_json(&json!({
            "booking_id": booking_id,
            "action": "confirm",
            "selected_facilities": { "spa_access": true },
            "passenger_email": "amaya@example.com"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["email_sent"], false);
    assert!(body["email_error"].as_str().unwrap().contains("relay unavailable"));
}

#[actix_rt::test]
async fn test_facility_preferences_for_booking() {
    let test_app = TestApp::new();
    let booking_id = seed_facilities(&test_app);
    let app = test::init_service(test_app.create_app()).await;

    for (action, code) in [("confirm", "spa_access"), ("save_pending", "specialty_dining")] {
        let req = test::TestRequest::post()
            .uri("/api/facilities/bookings")
            .set_json(&json!({
                "booking_id": booking_id,
                "action": action,
                "selected_facilities": { (code): true }
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/facilities/preferences?booking_id={}", booking_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let preference = &body["preference"];
    assert_eq!(preference["payment_status"], "partial");
    assert_eq!(preference["paid_amount"], 30.0);
    assert_eq!(preference["pending_amount"], 75.0);
    assert_eq!(preference["total_cost"], 105.0);
    assert_eq!(preference["total_facilities"], 2);
    assert_eq!(preference["passenger_name"], "Amaya Fernando");
    assert_eq!(preference["ship_name"], "Ocean Star");
    assert_eq!(preference["departure_date"], "2025-12-01");
    assert_eq!(preference["trip_duration"], 10);
    assert_eq!(preference["facility_details"][0]["name"], "Specialty Dining");
    assert_eq!(preference["facility_details"][0]["unit_text"], "per access");
    assert_eq!(preference["booking_sessions"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_facility_preferences_require_booking_id() {
    let test_app = TestApp::new();
    seed_facilities(&test_app);
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/facilities/preferences")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/api/facilities/preferences?booking_id=42")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
