use std::time::Duration;

use httpmock::Method::POST;
use httpmock::MockServer;
use jqdata_rs::{JqClient, JqError, Params};
use serde_json::json;
use url::Url;

use crate::common::{self, PASS, USER};

fn mock_mint<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
    let token = token.to_string();
    server.mock(move |when, then| {
        when.method(POST)
            .path("/apis")
            .json_body(json!({"method": "get_token", "mob": USER, "pwd": PASS}));
        then.status(200).body(token);
    })
}

#[tokio::test]
async fn posts_json_with_token_and_string_values() {
    let server = MockServer::start();
    let mint = mock_mint(&server, "5b6a9ba1b0f572bb6c287e280ed");
    let call = server.mock(|when, then| {
        when.method(POST)
            .path("/apis")
            .header("content-type", "application/json; charset=utf-8")
            .json_body(json!({
                "method": "get_bars",
                "token": "5b6a9ba1b0f572bb6c287e280ed",
                "code": "600000.XSHG",
                "count": "2",
                "unit": "1d",
                "end_date": "2021-06-01",
            }));
        then.status(200)
            .body("date,open,close\n2021-05-31,9.8,9.9\n2021-06-01,9.9,10.0\n");
    });

    let client = common::http_client(&server);
    let date = chrono::NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
    let body = client
        .call(
            "get_bars",
            &Params::new()
                .set("code", "600000.XSHG")
                .set("count", 2)
                .set("unit", "1d")
                .set("end_date", date)
                .set_opt::<&str>("fq_ref_date", None),
        )
        .await
        .unwrap();

    mint.assert();
    call.assert();
    assert!(body.ends_with("2021-06-01,9.9,10.0\n"));
}

#[tokio::test]
async fn error_body_with_server_status_is_an_api_error() {
    let server = MockServer::start();
    let _mint = mock_mint(&server, "tok");
    let call = server.mock(|when, then| {
        when.method(POST)
            .path("/apis")
            .json_body(json!({"method": "get_concepts", "token": "tok"}));
        then.status(500).body("error: 服务器内部错误");
    });

    let client = common::http_client(&server);
    let err = client
        .call("get_concepts", &Params::new())
        .await
        .unwrap_err();

    call.assert();
    assert!(matches!(err, JqError::Api(ref m) if m == "服务器内部错误"), "{err:?}");
}

#[tokio::test]
async fn gateway_timeout_maps_to_server_busy_guidance() {
    let server = MockServer::start();
    let _mint = mock_mint(&server, "tok");
    let call = server.mock(|when, then| {
        when.method(POST)
            .path("/apis")
            .json_body(json!({"method": "get_concepts", "token": "tok"}));
        then.status(504).body("<html>Gateway Time-out</html>");
    });

    let client = common::http_client(&server);
    let err = client
        .call("get_concepts", &Params::new())
        .await
        .unwrap_err();

    call.assert();
    assert!(matches!(err, JqError::ServerBusy { .. }), "{err:?}");
    assert!(err.to_string().contains("retry later"));
}

#[tokio::test]
async fn rate_limit_status_is_reported() {
    let server = MockServer::start();
    let _mint = mock_mint(&server, "tok");
    let _call = server.mock(|when, then| {
        when.method(POST)
            .path("/apis")
            .json_body(json!({"method": "get_concepts", "token": "tok"}));
        then.status(429).body("Too Many Requests");
    });

    let client = common::http_client(&server);
    let err = client
        .call("get_concepts", &Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, JqError::RateLimited { .. }), "{err:?}");
}

#[tokio::test]
async fn slow_round_trips_time_out() {
    let server = MockServer::start();
    let _mint = server.mock(|when, then| {
        when.method(POST).path("/apis");
        then.status(200).body("tok").delay(Duration::from_millis(500));
    });

    let client = JqClient::builder()
        .url(Url::parse(&server.url("/apis")).unwrap())
        .credentials(USER, PASS)
        .timeout(Duration::from_millis(50))
        .env_lookup(common::env_of(&[]))
        .build()
        .unwrap();
    let err = client.mint_token(None, None).await.unwrap_err();
    assert!(matches!(err, JqError::Timeout { .. }), "{err:?}");
}

#[tokio::test]
async fn url_comes_from_configuration_when_not_set() {
    let server = MockServer::start();
    let mint = mock_mint(&server, "tok");

    let url = server.url("/apis");
    let client = JqClient::builder()
        .credentials(USER, PASS)
        .env_lookup(common::env_of(&[("JQDATA_URL", url.as_str())]))
        .build()
        .unwrap();
    assert_eq!(client.endpoint(), url);

    client.mint_token(None, None).await.unwrap();
    mint.assert();
}

#[tokio::test]
async fn default_endpoint_is_the_public_api() {
    let client = JqClient::builder()
        .env_lookup(common::env_of(&[]))
        .build()
        .unwrap();
    assert_eq!(client.endpoint(), "https://dataapi.joinquant.com/apis");
}
