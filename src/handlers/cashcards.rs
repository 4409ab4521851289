use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};

use crate::database::models::cash_card::{CashCard, CashCardRequest};
use crate::error::ApiError;
use crate::middleware::Owner;
use crate::paging::PageQuery;
use crate::state::AppState;

pub const BASE_PATH: &str = "/cashcards";

fn not_found(id: i64) -> ApiError {
    ApiError::not_found(format!("cash card {} not found", id))
}

/// GET /cashcards/:id - A single card, only if the caller owns it
pub async fn find_by_id(
    State(state): State<AppState>,
    Owner(owner): Owner,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<CashCard>, ApiError> {
    let Path(id) = id?;

    match state.store.find_by_id_and_owner(id, &owner).await? {
        Some(card) => Ok(Json(card)),
        None => {
            tracing::debug!("Cash card {} not visible to '{}'", id, owner);
            Err(not_found(id))
        }
    }
}

/// GET /cashcards?page=&size=&sort= - One page of the caller's cards, content only
pub async fn list(
    State(state): State<AppState>,
    Owner(owner): Owner,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<CashCard>>, ApiError> {
    let Query(pairs) = query?;
    let page = PageQuery::parse(&pairs, state.paging)?;

    let cards = state.store.find_by_owner(&owner, &page).await?;
    tracing::debug!(
        "Listed {} cash cards for '{}' (page {}, size {})",
        cards.len(),
        owner,
        page.page,
        page.size
    );
    Ok(Json(cards))
}

/// POST /cashcards - Create a card owned by the caller; the store picks the id
pub async fn create(
    State(state): State<AppState>,
    Owner(owner): Owner,
    payload: Result<Json<CashCardRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    let saved = state.store.create(request.into_new(&owner)).await?;
    tracing::info!("Created cash card {} for '{}'", saved.id, owner);

    let location = format!("{}/{}", BASE_PATH, saved.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)]).into_response())
}

/// PUT /cashcards/:id - Replace the amount of an owned card. Never creates.
pub async fn update(
    State(state): State<AppState>,
    Owner(owner): Owner,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CashCardRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    request.validate()?;

    match state.store.update_by_id_and_owner(id, &owner, request.amount).await? {
        Some(card) => {
            tracing::info!("Updated cash card {} for '{}'", card.id, owner);
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(not_found(id)),
    }
}

/// DELETE /cashcards/:id - Remove an owned card
pub async fn delete(
    State(state): State<AppState>,
    Owner(owner): Owner,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;

    if state.store.delete_by_id_and_owner(id, &owner).await? {
        tracing::info!("Deleted cash card {} for '{}'", id, owner);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::database::MemoryStore;
    use crate::testing::{TestContext, HANK, KUMAR, SARAH};

    #[tokio::test]
    async fn returns_an_owned_card() {
        let ctx = TestContext::new();
        let res = ctx.get("/cashcards/99", SARAH).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json(), json!({ "id": 99, "amount": 123.45 }));
    }

    #[tokio::test]
    async fn unknown_and_foreign_ids_look_the_same() {
        let ctx = TestContext::new();
        let missing = ctx.get("/cashcards/1000", SARAH).await;
        let foreign = ctx.get("/cashcards/102", SARAH).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(foreign.status, StatusCode::NOT_FOUND);
        assert!(missing.body.is_empty());
        assert_eq!(missing.body, foreign.body);
    }

    #[tokio::test]
    async fn rejects_non_numeric_id() {
        let ctx = TestContext::new();
        let res = ctx.get("/cashcards/abc", SARAH).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn creates_with_caller_as_owner() {
        let ctx = TestContext::new();
        let res = ctx
            .send(
                Method::POST,
                "/cashcards",
                Some(SARAH),
                Some(json!({ "id": 44, "amount": 250.00, "owner": "kumar2" })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        assert!(res.body.is_empty());

        let location = res.location().unwrap().to_string();
        assert_eq!(location, "/cashcards/103");

        let created = ctx.get(&location, SARAH).await;
        assert_eq!(created.status, StatusCode::OK);
        assert_eq!(created.json(), json!({ "id": 103, "amount": 250.0 }));

        assert_eq!(ctx.get(&location, KUMAR).await.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_rejects_bad_amount() {
        let ctx = TestContext::new();
        let res = ctx
            .send(Method::POST, "/cashcards", Some(SARAH), Some(json!({ "amount": "a lot" })))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json()["code"], "INVALID_JSON");
        assert_eq!(ctx.store.len().await, 4);
    }

    #[tokio::test]
    async fn create_rejects_amounts_the_column_cannot_hold() {
        let ctx = TestContext::new();
        for amount in [json!(123.456), json!(1e20)] {
            let res = ctx
                .send(Method::POST, "/cashcards", Some(SARAH), Some(json!({ "amount": amount })))
                .await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST, "amount {}", amount);
            assert_eq!(res.json()["code"], "BAD_REQUEST");
        }
        assert_eq!(ctx.store.len().await, 4);
    }

    #[tokio::test]
    async fn update_rejects_amounts_the_column_cannot_hold() {
        let ctx = TestContext::new();
        for amount in [json!(0.001), json!(1e20)] {
            let res = ctx
                .send(Method::PUT, "/cashcards/99", Some(SARAH), Some(json!({ "amount": amount })))
                .await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST, "amount {}", amount);
        }
        assert_eq!(ctx.get("/cashcards/99", SARAH).await.json(), json!({ "id": 99, "amount": 123.45 }));
    }

    #[tokio::test]
    async fn lists_only_own_cards() {
        let ctx = TestContext::new();
        let res = ctx.get("/cashcards", SARAH).await;
        assert_eq!(res.status, StatusCode::OK);

        let body = res.json();
        let cards = body.as_array().unwrap();
        assert_eq!(cards.len(), 3);
        let mut ids: Vec<i64> = cards.iter().map(|c| c["id"].as_i64().unwrap()).collect();
        ids.sort();
        assert_eq!(ids, vec![99, 100, 101]);
        assert!(cards.iter().all(|c| c.get("owner").is_none()));
    }

    #[tokio::test]
    async fn pages_by_amount_descending() {
        let ctx = TestContext::new();
        let res = ctx.get("/cashcards?page=0&size=1&sort=amount,desc", SARAH).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json(), json!([{ "id": 101, "amount": 150.0 }]));
    }

    #[tokio::test]
    async fn sorts_ascending_by_default_direction() {
        let ctx = TestContext::new();
        let res = ctx.get("/cashcards?sort=amount", SARAH).await;
        let amounts: Vec<f64> = res
            .json()
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["amount"].as_f64().unwrap())
            .collect();
        assert_eq!(amounts, vec![1.0, 123.45, 150.0]);
    }

    #[tokio::test]
    async fn rejects_unknown_sort_property() {
        let ctx = TestContext::new();
        let res = ctx.get("/cashcards?sort=owner,asc", SARAH).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_listing_is_ok() {
        let ctx = TestContext::with_store(MemoryStore::new());
        let res = ctx.get("/cashcards", SARAH).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json(), json!([]));
    }

    #[tokio::test]
    async fn updates_only_the_amount() {
        let ctx = TestContext::new();
        let res = ctx
            .send(Method::PUT, "/cashcards/99", Some(SARAH), Some(json!({ "amount": 19.99, "owner": "kumar2" })))
            .await;
        assert_eq!(res.status, StatusCode::NO_CONTENT);
        assert!(res.body.is_empty());

        let after = ctx.get("/cashcards/99", SARAH).await;
        assert_eq!(after.json(), json!({ "id": 99, "amount": 19.99 }));
    }

    #[tokio::test]
    async fn update_does_not_upsert_or_touch_foreign_cards() {
        let ctx = TestContext::new();
        let missing = ctx
            .send(Method::PUT, "/cashcards/99999", Some(SARAH), Some(json!({ "amount": 19.99 })))
            .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(ctx.store.len().await, 4);

        let foreign = ctx
            .send(Method::PUT, "/cashcards/102", Some(SARAH), Some(json!({ "amount": 333.33 })))
            .await;
        assert_eq!(foreign.status, StatusCode::NOT_FOUND);
        assert_eq!(ctx.get("/cashcards/102", KUMAR).await.json(), json!({ "id": 102, "amount": 200.0 }));
    }

    #[tokio::test]
    async fn deletes_owned_card_once() {
        let ctx = TestContext::new();
        let res = ctx.send(Method::DELETE, "/cashcards/99", Some(SARAH), None).await;
        assert_eq!(res.status, StatusCode::NO_CONTENT);
        assert_eq!(ctx.get("/cashcards/99", SARAH).await.status, StatusCode::NOT_FOUND);

        let again = ctx.send(Method::DELETE, "/cashcards/99", Some(SARAH), None).await;
        assert_eq!(again.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cannot_delete_foreign_card() {
        let ctx = TestContext::new();
        let res = ctx.send(Method::DELETE, "/cashcards/102", Some(SARAH), None).await;
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(ctx.get("/cashcards/102", KUMAR).await.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let ctx = TestContext::new();
        let wrong_password = ctx.get("/cashcards/99", ("sarah1", "BAD-PASSWORD")).await;
        let unknown_user = ctx.get("/cashcards/99", ("BAD-USER", "abc123")).await;
        let anonymous = ctx.send(Method::GET, "/cashcards/99", None, None).await;

        for res in [wrong_password, unknown_user, anonymous] {
            assert_eq!(res.status, StatusCode::UNAUTHORIZED);
            assert!(res.headers.contains_key("www-authenticate"));
        }
    }

    #[tokio::test]
    async fn users_without_card_role_are_forbidden() {
        let ctx = TestContext::new();
        assert_eq!(ctx.get("/cashcards/99", HANK).await.status, StatusCode::FORBIDDEN);
        assert_eq!(ctx.get("/cashcards", HANK).await.status, StatusCode::FORBIDDEN);

        let create = ctx
            .send(Method::POST, "/cashcards", Some(HANK), Some(json!({ "amount": 1.0 })))
            .await;
        assert_eq!(create.status, StatusCode::FORBIDDEN);
        assert_eq!(ctx.store.len().await, 4);
    }
}
