//! Cache key builders.
//!
//! Writers and readers address the same entry without coordinating, so every
//! builder is a pure function of its inputs.

use std::fmt::Display;

pub fn menu_key(restaurant_id: impl Display) -> String {
    format!("menu:{}", restaurant_id)
}

pub fn menu_category_key(restaurant_id: impl Display, category_id: impl Display) -> String {
    format!("menu:{}:category:{}", restaurant_id, category_id)
}

pub fn restaurant_key(restaurant_id: impl Display) -> String {
    format!("restaurant:{}", restaurant_id)
}

pub fn table_key(restaurant_id: impl Display, table_id: impl Display) -> String {
    format!("table:{}:{}", restaurant_id, table_id)
}

/// Key for the full table listing of a restaurant.
pub fn tables_key(restaurant_id: impl Display) -> String {
    format!("tables:{}", restaurant_id)
}

/// `period` is free-form (`day`, `week`, `2024-05`...).
pub fn analytics_key(restaurant_id: impl Display, period: impl Display) -> String {
    format!("analytics:{}:{}", restaurant_id, period)
}

pub fn session_key(token: impl Display) -> String {
    format!("session:{}", token)
}

pub fn qr_code_key(restaurant_id: impl Display, table_id: impl Display) -> String {
    format!("qrcode:{}:{}", restaurant_id, table_id)
}
