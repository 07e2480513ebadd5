use std::time::Duration;

use async_trait::async_trait;
use checkout_common::cart::{
    BillingShippingRequest, BillingShippingResponse, CartSnapshot, MessagesResponse,
    PlaceOrderRequest, PlaceOrderResponse, PromoCodeRequest, RemovePromoCodeRequest,
    ShippingOption, ShippingOptionsResponse, UpdateQuantityRequest,
};
use checkout_common::customer::{
    CustomerInfo, PaymentMethodInfo, PaymentMethodsResponse, ShippingAddress,
    ShippingAddressesResponse,
};
use checkout_common::error::ErrorResponse;
use checkout_common::session::SESSION_TOKEN_HEADER;
use checkout_common::store_url::DEFAULT_REST_PREFIX;
use checkout_common::util::unix_time_millis;
use checkout_http_client::{HttpClient as Transport, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use super::{CartConnector, Error};
use crate::{Session, StoreUrl};

const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";
const CACHE_BUST_PARAM: &str = "timeStamp";

#[derive(Debug, Clone)]
struct HttpClientCore {
    inner: Transport,
    session: Session,
}

impl HttpClientCore {
    fn new(inner: Transport, session: Session) -> Self {
        Self { inner, session }
    }

    /// Send with the session credential attached, then rotate the session
    /// token from the response before looking at the status.
    async fn send<R: DeserializeOwned>(&self, mut request: RequestBuilder) -> Result<R, Error> {
        for (name, value) in self.session.credential().await.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|err| {
            tracing::warn!("Http request failed: {}", err);
            Error::from(err)
        })?;

        if let Some(token) = response.header(SESSION_TOKEN_HEADER) {
            self.session.rotate_token(&token).await;
        }

        let status = response.status();
        let success = response.is_success();
        let body = response.into_body();

        if status == 401 {
            return Err(Error::AuthExpired);
        }

        if !success {
            tracing::warn!("Http response error status {}", status);
            return Err(match ErrorResponse::from_json(&body) {
                Ok(error_response) => Error::Server(status, error_response),
                Err(_) => Error::HttpError(Some(status), body),
            });
        }

        let body: &str = if body.trim().is_empty() { "{}" } else { &body };

        serde_json::from_str::<R>(body).map_err(|err| {
            tracing::warn!("Http Response error: {}", err);
            Error::Decode(err.to_string())
        })
    }

    async fn http_get<R: DeserializeOwned>(&self, url: Url, cache_bust: bool) -> Result<R, Error> {
        let mut request = self.inner.get(url.as_str());
        if cache_bust {
            request = request.query(&[(CACHE_BUST_PARAM, unix_time_millis().to_string())]);
        }
        self.send(request).await
    }

    async fn http_post<P: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: Url,
        payload: &P,
    ) -> Result<R, Error> {
        let request = self
            .inner
            .post(url.as_str())
            .header("Content-Type", JSON_CONTENT_TYPE)
            .json(payload);
        self.send(request).await
    }

    async fn http_delete<Q: Serialize + ?Sized, P: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: Url,
        query: Option<&Q>,
        payload: Option<&P>,
    ) -> Result<R, Error> {
        let mut request = self.inner.delete(url.as_str());
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(payload) = payload {
            request = request
                .header("Content-Type", JSON_CONTENT_TYPE)
                .json(payload);
        }
        self.send(request).await
    }
}

/// Http Client
#[derive(Debug, Clone)]
pub struct HttpClient {
    core: HttpClientCore,
    store_url: StoreUrl,
    rest_prefix: Vec<String>,
}

impl HttpClient {
    /// Create new [`HttpClient`]
    pub fn new(store_url: StoreUrl, session: Session) -> Self {
        Self::with_transport(store_url, session, Transport::new())
    }

    /// Create new [`HttpClient`] over an already configured transport
    pub fn with_transport(store_url: StoreUrl, session: Session, transport: Transport) -> Self {
        Self {
            core: HttpClientCore::new(transport, session),
            store_url,
            rest_prefix: DEFAULT_REST_PREFIX.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create new [`HttpClient`] with a request timeout and optional proxy
    pub fn with_settings(
        store_url: StoreUrl,
        session: Session,
        timeout: Option<Duration>,
        proxy: Option<Url>,
        accept_invalid_certs: bool,
    ) -> Result<Self, Error> {
        let mut builder = Transport::builder().danger_accept_invalid_certs(accept_invalid_certs);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = proxy {
            builder = builder.proxy(proxy);
        }

        Ok(Self::with_transport(store_url, session, builder.build()?))
    }

    /// Override the REST namespace the endpoints live under
    pub fn with_rest_prefix(mut self, prefix: &[&str]) -> Self {
        self.rest_prefix = prefix.iter().map(|s| s.to_string()).collect();
        self
    }

    fn endpoint(&self, path: &[&str]) -> Result<Url, Error> {
        let elements: Vec<&str> = self
            .rest_prefix
            .iter()
            .map(String::as_str)
            .chain(path.iter().copied())
            .collect();
        Ok(self.store_url.join_paths(&elements)?)
    }
}

#[async_trait]
impl CartConnector for HttpClient {
    #[instrument(skip(self), fields(store_url = %self.store_url))]
    async fn get_info(&self) -> Result<CartSnapshot, Error> {
        let url = self.endpoint(&["cart", "info"])?;
        self.core.http_get(url, true).await
    }

    #[instrument(skip_all, fields(store_url = %self.store_url))]
    async fn attach_billing_shipping(
        &self,
        request: BillingShippingRequest,
    ) -> Result<BillingShippingResponse, Error> {
        let url = self.endpoint(&["cart", "billingShipping"])?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self), fields(store_url = %self.store_url))]
    async fn list_shipping_options(&self) -> Result<Vec<ShippingOption>, Error> {
        let url = self.endpoint(&["cart", "shippingOptions"])?;
        Ok(self
            .core
            .http_get::<ShippingOptionsResponse>(url, false)
            .await?
            .shipping_options)
    }

    #[instrument(skip(self), fields(store_url = %self.store_url))]
    async fn update_item_quantity(
        &self,
        request: UpdateQuantityRequest,
    ) -> Result<MessagesResponse, Error> {
        let url = self.endpoint(&["cart", "updateProductQuantity"])?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self), fields(store_url = %self.store_url))]
    async fn delete_item(
        &self,
        order_id: &str,
        order_item_seq_id: &str,
    ) -> Result<MessagesResponse, Error> {
        let url = self.endpoint(&["cart", "deleteOrderItem"])?;
        let query = [("orderId", order_id), ("orderItemSeqId", order_item_seq_id)];
        self.core
            .http_delete::<_, (), _>(url, Some(&query), None)
            .await
    }

    #[instrument(skip(self), fields(store_url = %self.store_url))]
    async fn add_promo_code(&self, request: PromoCodeRequest) -> Result<MessagesResponse, Error> {
        let url = self.endpoint(&["cart", "promoCode"])?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self), fields(store_url = %self.store_url))]
    async fn remove_promo_code(
        &self,
        request: RemovePromoCodeRequest,
    ) -> Result<MessagesResponse, Error> {
        let url = self.endpoint(&["cart", "promoCode"])?;
        self.core
            .http_delete::<(), _, _>(url, None, Some(&request))
            .await
    }

    #[instrument(skip_all, fields(store_url = %self.store_url))]
    async fn place_order(&self, request: PlaceOrderRequest) -> Result<PlaceOrderResponse, Error> {
        let url = self.endpoint(&["cart", "place"])?;
        self.core.http_post(url, &request).await
    }

    #[instrument(skip(self), fields(store_url = %self.store_url))]
    async fn get_customer_info(&self) -> Result<CustomerInfo, Error> {
        let url = self.endpoint(&["customer", "info"])?;
        self.core.http_get(url, false).await
    }

    #[instrument(skip(self), fields(store_url = %self.store_url))]
    async fn get_shipping_addresses(&self) -> Result<Vec<ShippingAddress>, Error> {
        let url = self.endpoint(&["customer", "shippingAddresses"])?;
        Ok(self
            .core
            .http_get::<ShippingAddressesResponse>(url, true)
            .await?
            .postal_address_list
            .unwrap_or_default())
    }

    #[instrument(skip(self), fields(store_url = %self.store_url))]
    async fn get_payment_methods(&self) -> Result<Vec<PaymentMethodInfo>, Error> {
        let url = self.endpoint(&["customer", "paymentMethods"])?;
        Ok(self
            .core
            .http_get::<PaymentMethodsResponse>(url, true)
            .await?
            .credit_cards())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_endpoint_uses_rest_prefix() {
        let client = HttpClient::new(
            StoreUrl::from_str("https://shop.example.com").expect("valid url"),
            Session::default(),
        );
        assert_eq!(
            client
                .endpoint(&["cart", "info"])
                .expect("valid endpoint")
                .as_str(),
            "https://shop.example.com/rest/s1/pop/cart/info"
        );

        let client = client.with_rest_prefix(&["api", "v2"]);
        assert_eq!(
            client
                .endpoint(&["cart", "place"])
                .expect("valid endpoint")
                .as_str(),
            "https://shop.example.com/api/v2/cart/place"
        );
    }

    #[test]
    fn test_with_settings() {
        let client = HttpClient::with_settings(
            StoreUrl::from_str("https://shop.example.com/store").expect("valid url"),
            Session::default(),
            Some(Duration::from_secs(5)),
            None,
            false,
        );
        assert!(client.is_ok());
    }
}
