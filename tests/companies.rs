mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use pretty_assertions::assert_eq;
use serde_json::json;
use taskledger::models::{Company, CompanyMode};
use taskledger::store::MemoryStore;

use common::{init_app, seed_company, seed_user};

#[test_log::test(actix_rt::test)]
async fn test_company_crud() {
    let store = MemoryStore::new();
    let app = init_app(&store).await;

    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(json!({ "name": "Acme", "description": "Widgets", "mode": "PUB", "rating": 4 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Company = test::read_body_json(resp).await;
    assert_eq!(created.rating, Some(4.0));

    let req = test::TestRequest::get()
        .uri(&format!("/companies/{}", created.id))
        .to_request();
    let fetched: Company = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    let req = test::TestRequest::put()
        .uri(&format!("/companies/{}", created.id))
        .set_json(json!({ "name": "Acme", "description": "Widgets", "mode": "PUB", "rating": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Company = test::read_body_json(resp).await;
    assert_eq!(updated.rating, Some(2.0));
    assert!(updated.updated_at.is_some());

    let req = test::TestRequest::get().uri("/companies").to_request();
    let listed: Vec<Company> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed, vec![updated]);

    for expected in [StatusCode::NO_CONTENT, StatusCode::NOT_FOUND, StatusCode::NOT_FOUND] {
        let req = test::TestRequest::delete()
            .uri(&format!("/companies/{}", created.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }
}

#[test_log::test(actix_rt::test)]
async fn test_update_without_mode_keeps_stored_mode() {
    let store = MemoryStore::new();
    let app = init_app(&store).await;

    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(json!({ "name": "Acme", "mode": "PUB", "rating": 4 }))
        .to_request();
    let created: Company = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created.mode, CompanyMode::Public);

    let req = test::TestRequest::put()
        .uri(&format!("/companies/{}", created.id))
        .set_json(json!({ "name": "Acme", "rating": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Company = test::read_body_json(resp).await;
    assert_eq!(updated.rating, Some(2.0));
    assert_eq!(updated.mode, CompanyMode::Public);

    let req = test::TestRequest::put()
        .uri(&format!("/companies/{}", created.id))
        .set_json(json!({ "name": "Acme", "mode": "PRV" }))
        .to_request();
    let private: Company = test::call_and_read_body_json(&app, req).await;
    assert_eq!(private.mode, CompanyMode::Private);

    let req = test::TestRequest::put()
        .uri(&format!("/companies/{}", created.id))
        .set_json(json!({ "name": "Acme Corp" }))
        .to_request();
    let renamed: Company = test::call_and_read_body_json(&app, req).await;
    assert_eq!(renamed.mode, CompanyMode::Private);

    let req = test::TestRequest::post()
        .uri("/companies")
        .set_json(json!({ "name": "Globex" }))
        .to_request();
    let bare: Company = test::call_and_read_body_json(&app, req).await;
    assert_eq!(bare.mode, CompanyMode::Public);
}

#[test_log::test(actix_rt::test)]
async fn test_invalid_company_inputs() {
    let store = MemoryStore::new();
    let app = init_app(&store).await;

    let test_cases = vec![
        (json!({ "description": "No name" }), StatusCode::BAD_REQUEST, "missing name"),
        (json!({ "name": "Acme", "mode": "XYZ" }), StatusCode::BAD_REQUEST, "unknown mode"),
        (json!({ "name": "Ac" }), StatusCode::UNPROCESSABLE_ENTITY, "name too short"),
        (json!({ "name": "Acme", "rating": 6 }), StatusCode::UNPROCESSABLE_ENTITY, "rating too high"),
        (json!({ "name": "Acme", "rating": 0 }), StatusCode::UNPROCESSABLE_ENTITY, "rating too low"),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/companies")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected_status, "Test case failed: {}", description);
    }

    let req = test::TestRequest::get().uri("/companies/not-a-uuid").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri("/companies").to_request();
    let listed: Vec<Company> = test::call_and_read_body_json(&app, req).await;
    assert!(listed.is_empty());
}

#[test_log::test(actix_rt::test)]
async fn test_company_with_users_cannot_be_deleted() {
    let store = MemoryStore::new();
    let acme = seed_company(&store, "Acme").await;
    seed_user(&store, acme.id, "alice", false).await;
    let app = init_app(&store).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/companies/{}", acme.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri(&format!("/companies/{}", acme.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
