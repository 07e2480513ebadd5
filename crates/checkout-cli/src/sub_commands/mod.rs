pub mod checkout;
pub mod delete_item;
pub mod info;
pub mod options;
pub mod promo;
pub mod quantity;
