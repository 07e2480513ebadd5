//! Transport against a mockito store

use std::time::Duration;

use checkout_http_client::{HttpClient, HttpError, Method};
use mockito::Matcher;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromoCode {
    promo_code: String,
    order_id: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Messages {
    messages: Vec<String>,
}

#[tokio::test]
async fn test_headers_reach_the_store() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/rest/s1/pop/cart/info")
        .match_header("api_key", "secret")
        .match_header("moquiSessionToken", "token-1")
        .with_status(200)
        .with_body(r#"{"messages": ["ok"]}"#)
        .create_async()
        .await;

    let response = HttpClient::new()
        .get(&format!("{}/rest/s1/pop/cart/info", server.url()))
        .header("api_key", "secret")
        .header("moquiSessionToken", "token-1")
        .send()
        .await
        .expect("exchange");

    assert!(response.is_success());
    let body: Messages = response.json().expect("json body");
    assert_eq!(body.messages, vec!["ok".to_string()]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_refused_request_keeps_headers_and_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/s1/pop/cart/place")
        .with_status(500)
        .with_header("MOQUISESSIONTOKEN", "after-error")
        .with_body("Gateway down")
        .create_async()
        .await;

    let response = HttpClient::new()
        .post(&format!("{}/rest/s1/pop/cart/place", server.url()))
        .json(&serde_json::json!({"cardSecurityCodeByPaymentId": {"PAY1": "123"}}))
        .send()
        .await
        .expect("a 500 is still an exchange");

    assert!(response.is_server_error());
    assert!(!response.is_client_error());
    assert_eq!(
        response.header("moquiSessionToken").as_deref(),
        Some("after-error")
    );
    assert_eq!(response.body(), "Gateway down");

    let err = response.error_for_status().expect_err("500 refused");
    assert_eq!(err.status(), Some(500));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_json_body_is_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/s1/pop/cart/promoCode")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(serde_json::json!({
            "promoCode": "SAVE10",
            "orderId": "O1"
        })))
        .with_status(200)
        .with_body(r#"{"messages": []}"#)
        .create_async()
        .await;

    let response = HttpClient::new()
        .post(&format!("{}/rest/s1/pop/cart/promoCode", server.url()))
        .json(&PromoCode {
            promo_code: "SAVE10".to_string(),
            order_id: "O1".to_string(),
        })
        .send()
        .await
        .expect("exchange");

    assert_eq!(response.status(), 200);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_delete_carries_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/rest/s1/pop/cart/deleteOrderItem")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("orderId".into(), "O1".into()),
            Matcher::UrlEncoded("orderItemSeqId".into(), "01".into()),
        ]))
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let response = HttpClient::new()
        .request(
            Method::DELETE,
            &format!("{}/rest/s1/pop/cart/deleteOrderItem", server.url()),
        )
        .query(&[("orderId", "O1"), ("orderItemSeqId", "01")])
        .send()
        .await
        .expect("exchange");

    assert!(response.into_body().is_empty());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unparseable_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/rest/s1/pop/customer/info")
        .with_status(200)
        .with_body("<html>login</html>")
        .create_async()
        .await;

    let response = HttpClient::new()
        .get(&format!("{}/rest/s1/pop/customer/info", server.url()))
        .send()
        .await
        .expect("exchange");

    assert!(matches!(
        response.json::<Messages>(),
        Err(HttpError::Serialization(_))
    ));
}

#[tokio::test]
async fn test_unreachable_store() {
    let client = HttpClient::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("client");

    // Port 1 is reserved and refuses connections
    let err = client
        .get("http://127.0.0.1:1/rest/s1/pop/cart/info")
        .send()
        .await
        .expect_err("nothing listens");

    assert_eq!(err.status(), None);
}
