use serde::{Deserialize, Serialize};

/// Buyer identity and shipping destination for a checkout session.
///
/// Optional until the session reaches the shipping step; mutable until
/// payment starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub street_address: String,
    pub extended_address: Option<String>,
    pub address_locality: String,
    pub address_region: String,
    pub postal_code: String,
    pub address_country: String,
}

impl CustomerDetails {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
