//! User Profile

use serde::Serialize;
use serde_json::Value;

use crate::{
    address::DeliveryAddress,
    fields::{self, profile as keys},
};

/// The parts of the user's profile the storefront uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    /// Full name.
    pub name: Option<String>,

    /// Email address.
    pub email: Option<String>,

    /// Saved address. Fields the profile lacks are blank.
    pub address: DeliveryAddress,
}

impl UserProfile {
    /// Map a `user_details` response. The user object may be nested under
    /// `user`, `user_details` or `data`, or be the response itself.
    #[must_use]
    pub fn from_response(response: &Value) -> Self {
        let user = fields::envelope(response, keys::ENVELOPE);
        let text = |field: fields::FieldKeys| field.string(user).unwrap_or_default();

        Self {
            name: keys::NAME.string(user),
            email: keys::EMAIL.string(user),
            address: DeliveryAddress {
                door_no: text(keys::DOOR_NO),
                street_address: text(keys::STREET),
                city: text(keys::CITY),
                landmark: text(keys::LANDMARK),
                pincode: text(keys::PINCODE),
                phone: text(keys::PHONE),
            },
        }
    }
}

/// Body of `PUT /users/user_info_change`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    /// Landmark.
    pub landmark: String,

    /// Street address line.
    pub user_address: String,

    /// City.
    pub user_city: String,

    /// Door number.
    pub user_door_no: String,

    /// Name, carried over from the profile.
    pub user_name: String,

    /// Phone, digits only.
    pub user_number: Option<u64>,

    /// Postal code.
    pub user_pincode: String,
}

impl ProfileUpdate {
    /// Build the update that saves `address` as the profile address.
    #[must_use]
    pub fn new(address: &DeliveryAddress, name: Option<&str>) -> Self {
        Self {
            landmark: address.landmark.trim().to_string(),
            user_address: address.street_address.trim().to_string(),
            user_city: address.city.trim().to_string(),
            user_door_no: address.door_no.trim().to_string(),
            user_name: name.unwrap_or_default().to_string(),
            user_number: address.phone_digits(),
            user_pincode: address.pincode.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn from_response_reads_nested_user() {
        let response = json!({
            "user": {
                "user_name": "Kavya",
                "user_email": "kavya@example.com",
                "user_doorno": "7",
                "user_address": "MG Road",
                "user_city": "Bengaluru",
                "Landmark": "Opp. metro",
                "user_pincode": 560_001,
                "user_number": 9_123_456_789_u64
            }
        });

        let profile = UserProfile::from_response(&response);

        assert_eq!(profile.name.as_deref(), Some("Kavya"));
        assert_eq!(profile.address.door_no, "7");
        assert_eq!(profile.address.landmark, "Opp. metro");
        assert_eq!(profile.address.pincode, "560001");
        assert_eq!(profile.address.phone, "9123456789");
    }

    #[test]
    fn from_response_tolerates_missing_fields() {
        let profile = UserProfile::from_response(&json!({ "email": "a@b.c" }));

        assert_eq!(profile.email.as_deref(), Some("a@b.c"));
        assert!(!profile.address.has_any());
    }

    #[test]
    fn profile_update_wire_shape() -> TestResult {
        let address = DeliveryAddress {
            door_no: "7".to_string(),
            street_address: "MG Road".to_string(),
            city: "Bengaluru".to_string(),
            landmark: String::new(),
            pincode: "560001".to_string(),
            phone: "+91-91234-56789".to_string(),
        };

        let update = ProfileUpdate::new(&address, Some("Kavya"));

        assert_eq!(
            serde_json::to_value(update)?,
            json!({
                "landmark": "",
                "user_address": "MG Road",
                "user_city": "Bengaluru",
                "user_door_no": "7",
                "user_name": "Kavya",
                "user_number": 919_123_456_789_u64,
                "user_pincode": "560001"
            })
        );

        Ok(())
    }
}
