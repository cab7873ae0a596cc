mod common;

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{StatusCode, header};
use serde_json::{Value, json};

use common::TestServer;

async fn create(server: &TestServer, token: &str) -> Result<String> {
    let res = server
        .client
        .post(server.url("/api/coursePlan/createPlan"))
        .header("x-auth-token", token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let location = res
        .headers()
        .get(header::LOCATION)
        .context("create response has no Location")?
        .to_str()?
        .to_string();
    assert_eq!(res.text().await?, "Created course plan");

    let id = location
        .strip_prefix("/api/coursePlan/getPlan/")
        .context("unexpected Location")?;
    Ok(id.to_string())
}

async fn get_plan(server: &TestServer, token: &str, id: &str) -> Result<(StatusCode, Value)> {
    let res = server
        .client
        .get(server.url(&format!("/api/coursePlan/getPlan/{id}")))
        .header("x-auth-token", token)
        .send()
        .await?;
    let status = res.status();
    Ok((status, res.json::<Value>().await?))
}

async fn update(server: &TestServer, token: &str, id: &str, body: Value) -> Result<reqwest::Response> {
    Ok(server
        .client
        .post(server.url(&format!("/api/coursePlan/updatePlan/{id}")))
        .header("x-auth-token", token)
        .json(&body)
        .send()
        .await?)
}

#[tokio::test]
async fn create_then_list_by_owner_includes_the_new_plan() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");

    let res = server
        .client
        .post(server.url("/api/coursePlan/createPlan/u1"))
        .header("x-auth-token", &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "Created course plan");

    let res = server
        .client
        .get(server.url("/api/coursePlan/allPlansByID/u1"))
        .header("x-auth-token", &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<Value>().await?;
    let plans = body.as_array().context("expected array")?;
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0], json!({"_id": common::public_id(1)}));

    // The new plan exists with the owner set and no name yet.
    let (status, plan) = get_plan(&server, &token, &common::public_id(1)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan[0]["ownerID"], "u1");
    assert!(plan[0].get("name").is_none());
    Ok(())
}

#[tokio::test]
async fn create_via_put_reports_the_new_id() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");

    let res = server
        .client
        .put(server.url("/api/coursePlan/createPlan"))
        .header("x-auth-token", &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(header::LOCATION));

    let id = create(&server, &token).await?;
    let res = server
        .client
        .get(server.url("/api/coursePlan/allPlansByID"))
        .header("x-auth-token", &token)
        .send()
        .await?;
    let ids: Vec<String> = res
        .json::<Vec<Value>>()
        .await?
        .into_iter()
        .filter_map(|v| v["_id"].as_str().map(str::to_string))
        .collect();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[1], id, "ids are listed in creation order");
    Ok(())
}

#[tokio::test]
async fn update_name_then_get_returns_it() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");
    let id = create(&server, &token).await?;

    let res = update(&server, &token, &id, json!({"name": "X"})).await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "Updated Course Plan");

    let (status, body) = get_plan(&server, &token, &id).await?;
    assert_eq!(status, StatusCode::OK);
    let plans = body.as_array().context("expected array")?;
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["name"], "X");
    assert_eq!(plans[0]["_id"], id.as_str());
    assert_eq!(plans[0]["ownerID"], "u1");
    Ok(())
}

#[tokio::test]
async fn modified_date_only_moves_when_sent() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");
    let id = create(&server, &token).await?;

    let (_, before) = get_plan(&server, &token, &id).await?;
    update(&server, &token, &id, json!({"name": "renamed"})).await?;
    let (_, renamed) = get_plan(&server, &token, &id).await?;
    assert_eq!(renamed[0]["modifiedDate"], before[0]["modifiedDate"]);

    let touched_at = "2099-01-01T00:00:00Z";
    let res = update(&server, &token, &id, json!({"modifiedDate": touched_at})).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let (_, touched) = get_plan(&server, &token, &id).await?;
    let modified: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(touched[0]["modifiedDate"].clone())?;
    assert_eq!(modified.to_rfc3339(), "2099-01-01T00:00:00+00:00");
    assert_eq!(touched[0]["createdDate"], before[0]["createdDate"]);
    assert_eq!(touched[0]["name"], "renamed");

    let res = update(&server, &token, &id, json!({"modifiedDate": "2000-01-01T00:00:00Z"})).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn unknown_plan_id_is_an_empty_array() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");

    let (status, body) = get_plan(&server, &token, &common::public_id(404)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn owner_without_plans_lists_empty() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("nobody");

    for path in ["/api/coursePlan/allPlansByID", "/api/coursePlan/allPlansByID/nobody", "/api/coursePlan/allPlans"] {
        let res = server
            .client
            .get(server.url(path))
            .header("x-auth-token", &token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "{path}");
        assert_eq!(res.json::<Value>().await?, json!([]), "{path}");
    }
    Ok(())
}

#[tokio::test]
async fn batch_listing_returns_full_plans_of_the_caller_only() -> Result<()> {
    let server = common::spawn().await?;
    let alice = common::token_for("alice");
    let bob = common::token_for("bob");

    let first = create(&server, &alice).await?;
    create(&server, &bob).await?;
    let second = create(&server, &alice).await?;
    update(&server, &alice, &first, json!({"name": "Fall"})).await?;

    let res = server
        .client
        .get(server.url("/api/coursePlan/allPlans"))
        .header("x-auth-token", &alice)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let plans = res.json::<Vec<Value>>().await?;
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0]["_id"], first.as_str());
    assert_eq!(plans[0]["name"], "Fall");
    assert_eq!(plans[1]["_id"], second.as_str());
    assert!(plans.iter().all(|p| p["ownerID"] == "alice"));
    Ok(())
}

#[tokio::test]
async fn owner_in_path_must_match_the_token() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");

    let res = server
        .client
        .get(server.url("/api/coursePlan/allPlansByID/u2"))
        .header("x-auth-token", &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .post(server.url("/api/coursePlan/createPlan/u2"))
        .header("x-auth-token", &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Nothing was created for either owner.
    let res = server
        .client
        .get(server.url("/api/coursePlan/allPlans"))
        .header("x-auth-token", common::token_for("u2"))
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?, json!([]));
    Ok(())
}

#[tokio::test]
async fn other_owners_plans_are_forbidden() -> Result<()> {
    let server = common::spawn().await?;
    let owner = common::token_for("owner");
    let intruder = common::token_for("intruder");
    let id = create(&server, &owner).await?;

    let (status, _) = get_plan(&server, &intruder, &id).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let res = update(&server, &intruder, &id, json!({"name": "mine"})).await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .delete(server.url(&format!("/api/coursePlan/deletePlan/{id}")))
        .header("x-auth-token", &intruder)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let (status, body) = get_plan(&server, &owner, &id).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body[0].get("name").is_none());
    Ok(())
}

#[tokio::test]
async fn update_rejects_fields_outside_the_allow_list() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");
    let id = create(&server, &token).await?;

    for body in [
        json!({"ownerID": "u2"}),
        json!({"name": "x", "_id": "other"}),
        json!({}),
        json!({"name": ""}),
    ] {
        let res = update(&server, &token, &id, body.clone()).await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        let err = res.json::<Value>().await?;
        assert_eq!(err["error"]["code"], "INVALID_BODY", "{body}");
    }

    let res = server
        .client
        .post(server.url(&format!("/api/coursePlan/updatePlan/{id}")))
        .header("x-auth-token", &token)
        .header(header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let (_, plan) = get_plan(&server, &token, &id).await?;
    assert_eq!(plan[0]["ownerID"], "u1");
    Ok(())
}

#[tokio::test]
async fn update_and_delete_of_unknown_plan_are_not_found() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");
    let missing = common::public_id(77);

    let res = update(&server, &token, &missing, json!({"name": "x"})).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .delete(server.url(&format!("/api/coursePlan/deletePlan/{missing}")))
        .header("x-auth-token", &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_plan() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");
    let id = create(&server, &token).await?;

    let res = server
        .client
        .delete(server.url(&format!("/api/coursePlan/deletePlan/{id}")))
        .header("x-auth-token", &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "Deleted course plan");

    let (status, body) = get_plan(&server, &token, &id).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn missing_or_malformed_plan_id_is_a_bad_request() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");

    for path in ["/api/coursePlan/getPlan", "/api/coursePlan/getPlan/"] {
        let res = server
            .client
            .get(server.url(path))
            .header("x-auth-token", &token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
        let body = res.json::<Value>().await?;
        assert_eq!(body["error"]["code"], "MISSING_PLAN_ID");
    }

    let res = server
        .client
        .post(server.url("/api/coursePlan/updatePlan"))
        .header("x-auth-token", &token)
        .json(&json!({"name": "x"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    for id in ["not-a-plan-id!".to_string(), "z".repeat(64)] {
        let (status, body) = get_plan(&server, &token, &id).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{id}");
        assert_eq!(body["error"]["code"], "INVALID_PLAN_ID", "{id}");
    }

    // The server is still up after the oversized id.
    let res = server.client.get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn owner_less_routes_accept_a_trailing_slash() -> Result<()> {
    let server = common::spawn().await?;
    let token = common::token_for("u1");

    for method in [reqwest::Method::POST, reqwest::Method::PUT] {
        let res = server
            .client
            .request(method.clone(), server.url("/api/coursePlan/createPlan/"))
            .header("x-auth-token", &token)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "{method}");
        assert!(res.headers().contains_key(header::LOCATION));
    }

    let res = server
        .client
        .get(server.url("/api/coursePlan/allPlansByID/"))
        .header("x-auth-token", &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let ids = res.json::<Vec<Value>>().await?;
    assert_eq!(ids.len(), 2);
    Ok(())
}

#[tokio::test]
async fn store_failure_is_a_generic_server_error() -> Result<()> {
    let server = common::spawn_with_repo(Arc::new(common::FailingRepo)).await?;
    let token = common::token_for("u1");

    let res = server
        .client
        .post(server.url("/api/coursePlan/createPlan"))
        .header("x-auth-token", &token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = res.json::<Value>().await?;
    assert_eq!(body["error"]["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(body["error"]["message"], "There is a problem with the server");

    let (status, _) = get_plan(&server, &token, &common::public_id(1)).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}
