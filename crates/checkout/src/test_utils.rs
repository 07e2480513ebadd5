#![cfg(test)]
#![allow(missing_docs)]

use std::collections::VecDeque;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use checkout_common::cart::{
    BillingShippingRequest, BillingShippingResponse, CartSnapshot, ItemKind, MessagesResponse,
    OrderHeader, OrderItem, PaymentInfo, PlaceOrderRequest, PlaceOrderResponse, PromoCodeRequest,
    RemovePromoCodeRequest, ShippingOption, UpdateQuantityRequest,
};
use checkout_common::customer::{CustomerInfo, PaymentMethodInfo, ShippingAddress};
use tokio::sync::Notify;

use crate::cart_connector::CartConnector;
use crate::navigator::{MemoryLocation, Navigator};
use crate::{Checkout, CheckoutConfig, Decimal, Error, Session, SessionCredential};

/// Responses for one connector operation: queued results first, then the
/// fallback value.
#[derive(Debug)]
pub struct Scripted<T> {
    fallback: Mutex<Option<T>>,
    queue: Mutex<VecDeque<Result<T, Error>>>,
    calls: AtomicUsize,
}

impl<T: Clone> Scripted<T> {
    pub fn new(fallback: Option<T>) -> Self {
        Self {
            fallback: Mutex::new(fallback),
            queue: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, value: T) {
        *self.fallback.lock().expect("lock") = Some(value);
    }

    pub fn push(&self, response: Result<T, Error>) {
        self.queue.lock().expect("lock").push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self, operation: &str) -> Result<T, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(response) = self.queue.lock().expect("lock").pop_front() {
            return response;
        }
        self.fallback
            .lock()
            .expect("lock")
            .clone()
            .ok_or_else(|| Error::Custom(format!("MockCartConnector: no response for {operation}")))
    }
}

/// Mock CartConnector recording calls and requests
#[derive(Debug)]
pub struct MockCartConnector {
    pub cart_info: Scripted<CartSnapshot>,
    pub shipping_options: Scripted<Vec<ShippingOption>>,
    pub attach: Scripted<BillingShippingResponse>,
    pub update_quantity: Scripted<MessagesResponse>,
    pub delete_item: Scripted<MessagesResponse>,
    pub add_promo: Scripted<MessagesResponse>,
    pub remove_promo: Scripted<MessagesResponse>,
    pub place_order: Scripted<PlaceOrderResponse>,
    pub customer_info: Scripted<CustomerInfo>,
    pub addresses: Scripted<Vec<ShippingAddress>>,
    pub payment_methods: Scripted<Vec<PaymentMethodInfo>>,
    /// Every call in the order it was made
    pub call_log: Mutex<Vec<&'static str>>,
    pub attach_requests: Mutex<Vec<BillingShippingRequest>>,
    pub quantity_requests: Mutex<Vec<UpdateQuantityRequest>>,
    pub promo_requests: Mutex<Vec<PromoCodeRequest>>,
    pub remove_promo_requests: Mutex<Vec<RemovePromoCodeRequest>>,
    pub place_requests: Mutex<Vec<PlaceOrderRequest>>,
    /// Holds `place_order` open until notified
    pub place_order_gate: Mutex<Option<Arc<Notify>>>,
    /// Holds the next `get_info` open until notified
    pub cart_info_gate: Mutex<Option<Arc<Notify>>>,
}

impl MockCartConnector {
    pub fn new() -> Self {
        Self {
            cart_info: Scripted::new(Some(test_cart())),
            shipping_options: Scripted::new(Some(test_shipping_options())),
            attach: Scripted::new(Some(BillingShippingResponse {
                payment_id: Some("PAY1".to_string()),
                ..Default::default()
            })),
            update_quantity: Scripted::new(Some(MessagesResponse::default())),
            delete_item: Scripted::new(Some(MessagesResponse::default())),
            add_promo: Scripted::new(Some(MessagesResponse::default())),
            remove_promo: Scripted::new(Some(MessagesResponse::default())),
            place_order: Scripted::new(Some(placed("O100"))),
            customer_info: Scripted::new(Some(CustomerInfo {
                first_name: Some("Ada".to_string()),
                ..Default::default()
            })),
            addresses: Scripted::new(Some(test_addresses())),
            payment_methods: Scripted::new(Some(test_payment_methods())),
            call_log: Mutex::new(Vec::new()),
            attach_requests: Mutex::new(Vec::new()),
            quantity_requests: Mutex::new(Vec::new()),
            promo_requests: Mutex::new(Vec::new()),
            remove_promo_requests: Mutex::new(Vec::new()),
            place_requests: Mutex::new(Vec::new()),
            place_order_gate: Mutex::new(None),
            cart_info_gate: Mutex::new(None),
        }
    }

    pub fn set_place_order_gate(&self, gate: Arc<Notify>) {
        *self.place_order_gate.lock().expect("lock") = Some(gate);
    }

    pub fn set_cart_info_gate(&self, gate: Arc<Notify>) {
        *self.cart_info_gate.lock().expect("lock") = Some(gate);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.call_log.lock().expect("lock").clone()
    }

    fn log(&self, call: &'static str) {
        self.call_log.lock().expect("lock").push(call);
    }
}

#[async_trait::async_trait]
impl CartConnector for MockCartConnector {
    async fn get_info(&self) -> Result<CartSnapshot, Error> {
        self.log("get_info");
        let gate = self.cart_info_gate.lock().expect("lock").take();
        let response = self.cart_info.next("get_info");
        if let Some(gate) = gate {
            gate.notified().await;
        }
        response
    }

    async fn attach_billing_shipping(
        &self,
        request: BillingShippingRequest,
    ) -> Result<BillingShippingResponse, Error> {
        self.log("attach_billing_shipping");
        self.attach_requests.lock().expect("lock").push(request);
        self.attach.next("attach_billing_shipping")
    }

    async fn list_shipping_options(&self) -> Result<Vec<ShippingOption>, Error> {
        self.log("list_shipping_options");
        self.shipping_options.next("list_shipping_options")
    }

    async fn update_item_quantity(
        &self,
        request: UpdateQuantityRequest,
    ) -> Result<MessagesResponse, Error> {
        self.log("update_item_quantity");
        self.quantity_requests.lock().expect("lock").push(request);
        self.update_quantity.next("update_item_quantity")
    }

    async fn delete_item(
        &self,
        _order_id: &str,
        _order_item_seq_id: &str,
    ) -> Result<MessagesResponse, Error> {
        self.log("delete_item");
        self.delete_item.next("delete_item")
    }

    async fn add_promo_code(&self, request: PromoCodeRequest) -> Result<MessagesResponse, Error> {
        self.log("add_promo_code");
        self.promo_requests.lock().expect("lock").push(request);
        self.add_promo.next("add_promo_code")
    }

    async fn remove_promo_code(
        &self,
        request: RemovePromoCodeRequest,
    ) -> Result<MessagesResponse, Error> {
        self.log("remove_promo_code");
        self.remove_promo_requests
            .lock()
            .expect("lock")
            .push(request);
        self.remove_promo.next("remove_promo_code")
    }

    async fn place_order(&self, request: PlaceOrderRequest) -> Result<PlaceOrderResponse, Error> {
        self.log("place_order");
        self.place_requests.lock().expect("lock").push(request);
        let gate = self.place_order_gate.lock().expect("lock").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.place_order.next("place_order")
    }

    async fn get_customer_info(&self) -> Result<CustomerInfo, Error> {
        self.log("get_customer_info");
        self.customer_info.next("get_customer_info")
    }

    async fn get_shipping_addresses(&self) -> Result<Vec<ShippingAddress>, Error> {
        self.log("get_shipping_addresses");
        self.addresses.next("get_shipping_addresses")
    }

    async fn get_payment_methods(&self) -> Result<Vec<PaymentMethodInfo>, Error> {
        self.log("get_payment_methods");
        self.payment_methods.next("get_payment_methods")
    }
}

pub fn amount(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal")
}

pub fn product(seq_id: &str, unit_amount: &str, quantity: u32) -> OrderItem {
    OrderItem {
        order_id: Some("O100".to_string()),
        order_item_seq_id: Some(seq_id.to_string()),
        kind: ItemKind::Product,
        unit_amount: amount(unit_amount),
        quantity: Decimal::from(quantity),
        promo_code: None,
        product_id: Some(format!("P{seq_id}")),
        item_description: None,
    }
}

pub fn shipping_line(unit_amount: &str) -> OrderItem {
    OrderItem {
        order_id: Some("O100".to_string()),
        order_item_seq_id: Some("90".to_string()),
        kind: ItemKind::Shipping,
        unit_amount: amount(unit_amount),
        quantity: Decimal::ONE,
        promo_code: None,
        product_id: None,
        item_description: None,
    }
}

pub fn cart_with_items(items: Vec<OrderItem>) -> CartSnapshot {
    CartSnapshot {
        order_header: Some(OrderHeader {
            order_id: Some("O100".to_string()),
            currency_uom_id: Some("USD".to_string()),
            ..Default::default()
        }),
        order_item_list: items,
        ..Default::default()
    }
}

/// Two units at 10, shipping line at 5
pub fn test_cart() -> CartSnapshot {
    cart_with_items(vec![product("01", "10", 2), shipping_line("5")])
}

pub fn with_attached_payment(mut cart: CartSnapshot, payment_method_id: &str, payment_id: &str) -> CartSnapshot {
    cart.payment_info_list = vec![PaymentInfo {
        payment: checkout_common::cart::Payment {
            payment_id: Some(payment_id.to_string()),
            payment_method_id: Some(payment_method_id.to_string()),
        },
        ..Default::default()
    }];
    cart
}

pub fn option(carrier: &str, method: &str, total: &str, description: &str) -> ShippingOption {
    ShippingOption {
        carrier_party_id: carrier.to_string(),
        shipment_method_enum_id: method.to_string(),
        shipping_total: Some(amount(total)),
        shipment_method_description: Some(description.to_string()),
    }
}

pub fn test_shipping_options() -> Vec<ShippingOption> {
    vec![
        option("UPS", "ShMthNextDay", "25.00", "Next Day"),
        option("UPS", "ShMthGround", "7.50", "Ground Parcel"),
    ]
}

pub fn test_addresses() -> Vec<ShippingAddress> {
    vec![
        ShippingAddress {
            postal_contact_mech_id: "ADDR1".to_string(),
            telecom_contact_mech_id: Some("TEL1".to_string()),
            ..Default::default()
        },
        ShippingAddress {
            postal_contact_mech_id: "ADDR2".to_string(),
            telecom_contact_mech_id: Some("TEL2".to_string()),
            ..Default::default()
        },
    ]
}

pub fn test_payment_methods() -> Vec<PaymentMethodInfo> {
    vec![
        PaymentMethodInfo {
            payment_method_id: "PM1".to_string(),
            is_credit_card: true,
            ..Default::default()
        },
        PaymentMethodInfo {
            payment_method_id: "PM2".to_string(),
            is_credit_card: true,
            ..Default::default()
        },
    ]
}

pub fn placed(order_id: &str) -> PlaceOrderResponse {
    PlaceOrderResponse {
        order_header: Some(OrderHeader {
            order_id: Some(order_id.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn authenticated_session() -> Session {
    Session::new(SessionCredential::new(
        Some("api-key".to_string()),
        Some("token".to_string()),
    ))
}

/// Checkout over a mock connector, starting at `fragment`
pub fn create_test_checkout(
    mock: Arc<MockCartConnector>,
    session: Session,
    fragment: &str,
) -> (Checkout, MemoryLocation) {
    let location = MemoryLocation::new(fragment);
    let navigator = Navigator::with_fragment(Arc::new(location.clone()));
    let checkout = Checkout::new(mock, session, navigator, CheckoutConfig::default());
    (checkout, location)
}
