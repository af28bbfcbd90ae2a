mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_endpoint_reports_store() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.client.get(format!("{}/health", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    Ok(())
}

#[tokio::test]
async fn utils_health_check_returns_true() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.client.get(server.api("/utils/health-check")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, Value::Bool(true));
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_not_found_even_without_token() -> Result<()> {
    let server = common::TestServer::start().await?;

    let res = server.client.get(server.api("/nowhere")).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
