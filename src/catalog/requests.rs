//! Request DTOs for catalog API endpoints.

use serde::Deserialize;

/// Request to set the total number of copies owned
#[derive(Debug, Deserialize)]
pub struct SetInventoryRequest {
    pub inventory: i32,
}
