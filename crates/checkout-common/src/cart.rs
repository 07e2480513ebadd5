//! Cart payloads
//!
//! Explicit schemas for the cart endpoints. Anything the server sends that
//! does not fit these types fails at the connector boundary with
//! [`crate::Error::Decode`] instead of leaking half-read fields into the
//! checkout.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_quantity() -> Decimal {
    Decimal::ONE
}

/// Kind of an order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// A product
    #[serde(rename = "ItemProduct")]
    Product,
    /// The shipping charge
    #[serde(rename = "ItemShipping")]
    Shipping,
    /// A promotion discount, usually negative
    #[serde(rename = "ItemDiscount")]
    Discount,
    /// Anything else (taxes, fees) which the checkout does not price
    #[serde(other)]
    Other,
}

/// Order line, never mutated client side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Order the item belongs to
    #[serde(default)]
    pub order_id: Option<String>,
    /// Sequence id within the order
    #[serde(default)]
    pub order_item_seq_id: Option<String>,
    /// Line kind
    #[serde(rename = "itemTypeEnumId")]
    pub kind: ItemKind,
    /// Amount per unit
    #[serde(default, deserialize_with = "null_as_default")]
    pub unit_amount: Decimal,
    /// Quantity
    #[serde(default = "default_quantity")]
    pub quantity: Decimal,
    /// Promo code that produced a discount line
    #[serde(default, rename = "promoCodeText")]
    pub promo_code: Option<String>,
    /// Product id for product lines
    #[serde(default)]
    pub product_id: Option<String>,
    /// Line description
    #[serde(default)]
    pub item_description: Option<String>,
}

impl OrderItem {
    /// `unit_amount * quantity`
    pub fn amount(&self) -> Decimal {
        self.unit_amount * self.quantity
    }
}

/// Order header, present once the cart has an order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHeader {
    /// Order id
    #[serde(default)]
    pub order_id: Option<String>,
    /// ISO currency code
    #[serde(default)]
    pub currency_uom_id: Option<String>,
    /// Server computed grand total
    #[serde(default)]
    pub grand_total: Option<Decimal>,
    /// Order status
    #[serde(default)]
    pub status_id: Option<String>,
}

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostalAddress {
    /// Contact mech id of the address
    #[serde(default)]
    pub contact_mech_id: Option<String>,
    /// Telecom contact mech paired with the address
    #[serde(default)]
    pub telecom_contact_mech_id: Option<String>,
    /// Recipient
    #[serde(default)]
    pub to_name: Option<String>,
    /// Attention line
    #[serde(default)]
    pub attn_name: Option<String>,
    /// Address line 1
    #[serde(default)]
    pub address1: Option<String>,
    /// Address line 2
    #[serde(default)]
    pub address2: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// Postal code
    #[serde(default)]
    pub postal_code: Option<String>,
    /// Country geo id
    #[serde(default)]
    pub country_geo_id: Option<String>,
    /// State or province geo id
    #[serde(default)]
    pub state_province_geo_id: Option<String>,
}

/// Phone number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelecomNumber {
    /// Contact mech id
    #[serde(default)]
    pub contact_mech_id: Option<String>,
    /// Number
    #[serde(default)]
    pub contact_number: Option<String>,
}

/// Payment attached to the cart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Payment id, the key for the card security code on place
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Payment method used
    #[serde(default)]
    pub payment_method_id: Option<String>,
}

/// Payment method summary as embedded in the cart
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodSummary {
    /// Payment method id
    #[serde(default)]
    pub payment_method_id: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Billing address contact mech
    #[serde(default)]
    pub postal_contact_mech_id: Option<String>,
    /// Billing phone contact mech
    #[serde(default)]
    pub telecom_contact_mech_id: Option<String>,
}

/// Entry of the cart's payment list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    /// Payment
    #[serde(default)]
    pub payment: Payment,
    /// Method behind the payment
    #[serde(default)]
    pub payment_method: Option<PaymentMethodSummary>,
    /// Billing address
    #[serde(default)]
    pub postal_address: Option<PostalAddress>,
    /// Billing phone
    #[serde(default)]
    pub telecom_number: Option<TelecomNumber>,
}

/// Promo code applied to the order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeDetail {
    /// Order id
    #[serde(default)]
    pub order_id: Option<String>,
    /// Internal id, used for removal
    pub promo_code_id: String,
    /// Code as entered by the customer
    pub promo_code: String,
}

/// Complete, immutable cart state as returned by `cart/info`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Order header, once an order exists
    #[serde(default)]
    pub order_header: Option<OrderHeader>,
    /// Order lines in server order
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_item_list: Vec<OrderItem>,
    /// Shipping address attached to the cart
    #[serde(default)]
    pub postal_address: Option<PostalAddress>,
    /// Shipping phone attached to the cart
    #[serde(default)]
    pub telecom_number: Option<TelecomNumber>,
    /// Payments attached to the cart
    #[serde(default, deserialize_with = "null_as_default")]
    pub payment_info_list: Vec<PaymentInfo>,
    /// Applied promo codes
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_promo_code_detail_list: Vec<PromoCodeDetail>,
}

impl CartSnapshot {
    /// Order id from the header
    pub fn order_id(&self) -> Option<&str> {
        self.order_header
            .as_ref()
            .and_then(|header| header.order_id.as_deref())
    }

    /// Currency from the header
    pub fn currency(&self) -> Option<&str> {
        self.order_header
            .as_ref()
            .and_then(|header| header.currency_uom_id.as_deref())
    }

    /// First shipping line, the fallback for the shipping price
    pub fn shipping_line_item(&self) -> Option<&OrderItem> {
        self.order_item_list
            .iter()
            .find(|item| item.kind == ItemKind::Shipping)
    }

    /// Item by sequence id
    pub fn item(&self, order_item_seq_id: &str) -> Option<&OrderItem> {
        self.order_item_list
            .iter()
            .find(|item| item.order_item_seq_id.as_deref() == Some(order_item_seq_id))
    }

    /// Shipping address already attached to the cart
    pub fn attached_address(&self) -> Option<AddressRef> {
        let address = self.postal_address.as_ref()?;
        let postal = address.contact_mech_id.clone()?;
        Some(AddressRef::new(
            postal,
            address.telecom_contact_mech_id.clone(),
        ))
    }

    /// First payment attached to the cart
    pub fn attached_payment(&self) -> Option<&PaymentInfo> {
        self.payment_info_list.first()
    }

    /// Resolve a customer-entered promo code to its detail record
    pub fn promo_code_detail(&self, code: &str) -> Option<&PromoCodeDetail> {
        self.order_promo_code_detail_list
            .iter()
            .find(|detail| detail.promo_code == code)
    }
}

/// Composite key of a saved address: `postalContactMechId:telecomContactMechId`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRef {
    /// Postal contact mech id
    pub postal_contact_mech_id: String,
    /// Telecom contact mech id
    pub telecom_contact_mech_id: Option<String>,
}

impl AddressRef {
    /// New address reference
    pub fn new(postal_contact_mech_id: String, telecom_contact_mech_id: Option<String>) -> Self {
        Self {
            postal_contact_mech_id,
            telecom_contact_mech_id: telecom_contact_mech_id.filter(|id| !id.is_empty()),
        }
    }
}

impl fmt::Display for AddressRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.postal_contact_mech_id,
            self.telecom_contact_mech_id.as_deref().unwrap_or_default()
        )
    }
}

impl FromStr for AddressRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (postal, telecom) = match s.split_once(':') {
            Some((postal, telecom)) => (postal, Some(telecom.to_string())),
            None => (s, None),
        };
        if postal.is_empty() {
            return Err(format!("Invalid address reference: {s}"));
        }
        Ok(AddressRef::new(postal.to_string(), telecom))
    }
}

/// Composite key of a shipping option: `carrierPartyId:shipmentMethodEnumId`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShippingChoice {
    /// Carrier
    pub carrier_party_id: String,
    /// Shipment method
    pub shipment_method_enum_id: String,
}

impl ShippingChoice {
    /// New shipping choice
    pub fn new(carrier_party_id: impl Into<String>, shipment_method_enum_id: impl Into<String>) -> Self {
        Self {
            carrier_party_id: carrier_party_id.into(),
            shipment_method_enum_id: shipment_method_enum_id.into(),
        }
    }
}

impl fmt::Display for ShippingChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.carrier_party_id, self.shipment_method_enum_id)
    }
}

impl FromStr for ShippingChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((carrier, method)) if !carrier.is_empty() && !method.is_empty() => {
                Ok(ShippingChoice::new(carrier, method))
            }
            _ => Err(format!("Invalid shipping option: {s}")),
        }
    }
}

/// Shipping option offered for the current cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOption {
    /// Carrier
    pub carrier_party_id: String,
    /// Shipment method
    pub shipment_method_enum_id: String,
    /// Price of shipping with this option
    #[serde(default)]
    pub shipping_total: Option<Decimal>,
    /// Human readable description
    #[serde(default)]
    pub shipment_method_description: Option<String>,
}

impl ShippingOption {
    /// Composite selection key
    pub fn choice(&self) -> ShippingChoice {
        ShippingChoice::new(
            self.carrier_party_id.clone(),
            self.shipment_method_enum_id.clone(),
        )
    }
}

/// `cart/shippingOptions` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingOptionsResponse {
    /// Options
    #[serde(default, deserialize_with = "null_as_default")]
    pub shipping_options: Vec<ShippingOption>,
}

/// Free-form messages the store attaches to responses.
///
/// The server sends either a single string or a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Messages(pub Vec<String>);

impl<'de> Deserialize<'de> for Messages {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None => Messages::default(),
            Some(Raw::One(message)) if message.is_empty() => Messages::default(),
            Some(Raw::One(message)) => Messages(vec![message]),
            Some(Raw::Many(messages)) => Messages(messages),
        })
    }
}

impl Messages {
    /// No messages
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|message| message.is_empty())
    }

    /// Whether any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|message| message.contains(needle))
    }

    /// Messages as one display string, `None` when empty
    pub fn to_option(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl fmt::Display for Messages {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("\n"))
    }
}

/// Response of the mutating cart endpoints that only report messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagesResponse {
    /// Messages
    #[serde(default)]
    pub messages: Messages,
}

/// `cart/billingShipping` request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingShippingRequest {
    /// Shipping address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_postal_contact_mech_id: Option<String>,
    /// Shipping phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_telecom_contact_mech_id: Option<String>,
    /// Payment method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_id: Option<String>,
    /// Carrier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_party_id: Option<String>,
    /// Shipment method
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_method_enum_id: Option<String>,
}

impl BillingShippingRequest {
    /// Build from the current selection
    pub fn new(
        address: Option<&AddressRef>,
        payment_method_id: Option<&str>,
        shipping: Option<&ShippingChoice>,
    ) -> Self {
        Self {
            shipping_postal_contact_mech_id: address
                .map(|address| address.postal_contact_mech_id.clone()),
            shipping_telecom_contact_mech_id: address
                .and_then(|address| address.telecom_contact_mech_id.clone()),
            payment_method_id: payment_method_id.map(|id| id.to_string()),
            carrier_party_id: shipping.map(|choice| choice.carrier_party_id.clone()),
            shipment_method_enum_id: shipping.map(|choice| choice.shipment_method_enum_id.clone()),
        }
    }
}

/// `cart/billingShipping` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingShippingResponse {
    /// Payment created or updated for the cart
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Messages
    #[serde(default)]
    pub messages: Messages,
}

/// `cart/updateProductQuantity` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuantityRequest {
    /// Order id
    pub order_id: String,
    /// Item sequence id
    pub order_item_seq_id: String,
    /// New quantity
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
}

/// `cart/promoCode` add request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCodeRequest {
    /// Code entered by the customer
    pub promo_code: String,
    /// Order id
    pub order_id: String,
}

/// `cart/promoCode` remove request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovePromoCodeRequest {
    /// Order id
    pub order_id: String,
    /// Internal promo code id
    pub promo_code_id: String,
}

/// `cart/place` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    /// Card security code keyed by payment id
    pub card_security_code_by_payment_id: BTreeMap<String, String>,
}

impl PlaceOrderRequest {
    /// Request for a single payment
    pub fn new(payment_id: impl Into<String>, cvv: impl Into<String>) -> Self {
        Self {
            card_security_code_by_payment_id: BTreeMap::from([(payment_id.into(), cvv.into())]),
        }
    }
}

/// `cart/place` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    /// Header of the placed order
    #[serde(default)]
    pub order_header: Option<OrderHeader>,
    /// Messages, may carry a gateway error
    #[serde(default)]
    pub messages: Messages,
}

impl PlaceOrderResponse {
    /// Id of the placed order, if the order went through
    pub fn order_id(&self) -> Option<&str> {
        self.order_header
            .as_ref()
            .and_then(|header| header.order_id.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_snapshot_from_store_json() {
        let json = r#"{
            "orderHeader": {"orderId": "O100", "currencyUomId": "EUR", "grandTotal": 25},
            "orderItemList": [
                {"orderId": "O100", "orderItemSeqId": "01", "itemTypeEnumId": "ItemProduct", "unitAmount": 10, "quantity": 2, "productId": "P1"},
                {"orderId": "O100", "orderItemSeqId": "02", "itemTypeEnumId": "ItemShipping", "unitAmount": 5.5, "quantity": 1},
                {"orderId": "O100", "orderItemSeqId": "03", "itemTypeEnumId": "ItemSalesTax", "unitAmount": 1, "quantity": 1},
                {"orderId": "O100", "orderItemSeqId": "04", "itemTypeEnumId": "ItemDiscount", "unitAmount": -2, "quantity": 1, "promoCodeText": "SAVE2"}
            ],
            "postalAddress": {"contactMechId": "ADDR1", "telecomContactMechId": "TEL1", "city": "Bangkok"},
            "paymentInfoList": [{"payment": {"paymentId": "PAY1", "paymentMethodId": "PM1"}}],
            "orderPromoCodeDetailList": [{"orderId": "O100", "promoCodeId": "PC9", "promoCode": "SAVE2"}]
        }"#;

        let cart: CartSnapshot = serde_json::from_str(json).expect("valid cart");

        assert_eq!(cart.order_id(), Some("O100"));
        assert_eq!(cart.currency(), Some("EUR"));
        assert_eq!(cart.order_item_list.len(), 4);
        assert_eq!(cart.order_item_list[2].kind, ItemKind::Other);
        assert_eq!(
            cart.shipping_line_item().map(|item| item.unit_amount),
            Some(Decimal::new(55, 1))
        );
        assert_eq!(
            cart.attached_address(),
            Some(AddressRef::new("ADDR1".into(), Some("TEL1".into())))
        );
        assert_eq!(
            cart.promo_code_detail("SAVE2").map(|d| d.promo_code_id.as_str()),
            Some("PC9")
        );
        assert_eq!(cart.item("01").map(|item| item.amount()), Some(Decimal::from(20)));
    }

    #[test]
    fn test_null_lists_are_empty() {
        let cart: CartSnapshot =
            serde_json::from_str(r#"{"orderItemList": null, "paymentInfoList": null}"#)
                .expect("valid cart");
        assert!(cart.order_item_list.is_empty());
        assert!(cart.payment_info_list.is_empty());
        assert_eq!(cart.order_id(), None);
    }

    #[test]
    fn test_wrong_shape_fails_to_decode() {
        let result: Result<CartSnapshot, _> =
            serde_json::from_str(r#"{"orderItemList": [{"unitAmount": 1}]}"#);
        assert!(result.is_err(), "item without a kind must not decode");
    }

    #[test]
    fn test_composite_keys() {
        let address: AddressRef = "ADDR1:TEL1".parse().expect("valid");
        assert_eq!(address.to_string(), "ADDR1:TEL1");
        let address: AddressRef = "ADDR1".parse().expect("valid");
        assert_eq!(address.telecom_contact_mech_id, None);
        assert!(":TEL".parse::<AddressRef>().is_err());

        let choice: ShippingChoice = "UPS:ShMthGround".parse().expect("valid");
        assert_eq!(choice, ShippingChoice::new("UPS", "ShMthGround"));
        assert!("UPS".parse::<ShippingChoice>().is_err());
    }

    #[test]
    fn test_messages_accept_string_or_list() {
        let response: MessagesResponse =
            serde_json::from_str(r#"{"messages": "Promo code not valid"}"#).expect("valid");
        assert!(response.messages.contains("not valid"));

        let response: MessagesResponse =
            serde_json::from_str(r#"{"messages": ["Applied", "Saved 10%"]}"#).expect("valid");
        assert_eq!(response.messages.to_string(), "Applied\nSaved 10%");

        let response: MessagesResponse =
            serde_json::from_str(r#"{"messages": null}"#).expect("valid");
        assert!(response.messages.is_empty());
        assert_eq!(response.messages.to_option(), None);
    }

    #[test]
    fn test_billing_shipping_request_omits_missing_parts() {
        let address = AddressRef::new("ADDR1".into(), Some("TEL1".into()));
        let request = BillingShippingRequest::new(Some(&address), Some("PM1"), None);
        let json = serde_json::to_value(&request).expect("serializable");

        assert_eq!(
            json,
            serde_json::json!({
                "shippingPostalContactMechId": "ADDR1",
                "shippingTelecomContactMechId": "TEL1",
                "paymentMethodId": "PM1"
            })
        );
    }

    #[test]
    fn test_place_order_request_shape() {
        let json = serde_json::to_value(PlaceOrderRequest::new("PAY1", "123")).expect("ok");
        assert_eq!(
            json,
            serde_json::json!({"cardSecurityCodeByPaymentId": {"PAY1": "123"}})
        );
    }
}
