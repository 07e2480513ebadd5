//! Customer payloads read at checkout entry

use serde::{Deserialize, Serialize};

use crate::cart::{AddressRef, PaymentMethodSummary, PostalAddress, TelecomNumber};

/// `customer/info` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    /// Party id
    #[serde(default)]
    pub party_id: Option<String>,
    /// Login name
    #[serde(default)]
    pub username: Option<String>,
    /// First name
    #[serde(default)]
    pub first_name: Option<String>,
    /// Last name
    #[serde(default)]
    pub last_name: Option<String>,
    /// Email
    #[serde(default)]
    pub email_address: Option<String>,
    /// Phone
    #[serde(default)]
    pub contact_number: Option<String>,
}

impl CustomerInfo {
    /// First and last name joined, when known
    pub fn display_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
            (None, None) => self.username.clone(),
        }
    }
}

/// Saved shipping address, an entry of `postalAddressList`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Postal contact mech id
    pub postal_contact_mech_id: String,
    /// Telecom contact mech id
    #[serde(default)]
    pub telecom_contact_mech_id: Option<String>,
    /// Address details
    #[serde(default)]
    pub postal_address: Option<PostalAddress>,
    /// Phone details
    #[serde(default)]
    pub telecom_number: Option<TelecomNumber>,
}

impl ShippingAddress {
    /// Composite key used for selection
    pub fn address_ref(&self) -> AddressRef {
        AddressRef::new(
            self.postal_contact_mech_id.clone(),
            self.telecom_contact_mech_id.clone(),
        )
    }
}

/// `customer/shippingAddresses` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddressesResponse {
    /// Saved addresses
    #[serde(default)]
    pub postal_address_list: Option<Vec<ShippingAddress>>,
}

/// Masked card details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardSummary {
    /// Masked card number
    #[serde(default)]
    pub card_number: Option<String>,
    /// Expiry, `MM/YYYY`
    #[serde(default)]
    pub expire_date: Option<String>,
}

/// Saved payment method, an entry of `methodInfoList`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodInfo {
    /// Payment method id
    pub payment_method_id: String,
    /// Only credit cards can be used at checkout
    #[serde(default)]
    pub is_credit_card: bool,
    /// Method summary with its billing contact mechs
    #[serde(default)]
    pub payment_method: Option<PaymentMethodSummary>,
    /// Card details
    #[serde(default)]
    pub credit_card: Option<CreditCardSummary>,
    /// Billing address
    #[serde(default)]
    pub postal_address: Option<PostalAddress>,
    /// Billing phone
    #[serde(default)]
    pub telecom_number: Option<TelecomNumber>,
}

/// `customer/paymentMethods` response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodsResponse {
    /// Saved methods of every kind
    #[serde(default)]
    pub method_info_list: Option<Vec<PaymentMethodInfo>>,
}

impl PaymentMethodsResponse {
    /// Saved credit cards
    pub fn credit_cards(self) -> Vec<PaymentMethodInfo> {
        self.method_info_list
            .unwrap_or_default()
            .into_iter()
            .filter(|method| method.is_credit_card)
            .collect()
    }
}
