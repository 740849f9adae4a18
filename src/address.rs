//! Delivery Addresses
//!
//! The shopper has two addresses in play at once: the saved default taken
//! from their profile and a draft form they can edit. Checkout resolves one
//! of them, backfilling blank draft fields from the default, and validates
//! the result before any order is sent.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Address fields checkout cannot proceed without.
pub const REQUIRED_FIELDS: [AddressField; 4] = [
    AddressField::StreetAddress,
    AddressField::City,
    AddressField::Pincode,
    AddressField::Phone,
];

/// Errors raised while resolving or editing an address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Required fields are blank after resolution.
    #[error("please complete your profile: missing {}", list_fields(.0))]
    Incomplete(SmallVec<[AddressField; 4]>),

    /// The field name is not recognised.
    #[error("unknown address field: {0}")]
    UnknownField(String),

    /// The address choice is neither `default` nor `draft`.
    #[error("unknown address choice: {0}")]
    UnknownChoice(String),
}

fn list_fields(fields: &[AddressField]) -> String {
    fields
        .iter()
        .map(AddressField::label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One editable address field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    /// Door or flat number.
    DoorNo,
    /// Street address line.
    StreetAddress,
    /// City.
    City,
    /// Landmark.
    Landmark,
    /// Postal code.
    Pincode,
    /// Contact phone.
    Phone,
}

impl AddressField {
    /// Every field, in form order.
    pub const ALL: [Self; 6] = [
        Self::DoorNo,
        Self::StreetAddress,
        Self::City,
        Self::Landmark,
        Self::Pincode,
        Self::Phone,
    ];

    /// Human readable name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DoorNo => "door number",
            Self::StreetAddress => "street address",
            Self::City => "city",
            Self::Landmark => "landmark",
            Self::Pincode => "pincode",
            Self::Phone => "phone",
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AddressField {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "door_no" | "door" => Ok(Self::DoorNo),
            "street_address" | "street" | "address" => Ok(Self::StreetAddress),
            "city" => Ok(Self::City),
            "landmark" => Ok(Self::Landmark),
            "pincode" | "pin" => Ok(Self::Pincode),
            "phone" => Ok(Self::Phone),
            _ => Err(AddressError::UnknownField(s.to_string())),
        }
    }
}

/// A postal address used for order fulfilment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    /// Door or flat number.
    pub door_no: String,

    /// Street address line.
    pub street_address: String,

    /// City.
    pub city: String,

    /// Landmark, optional.
    pub landmark: String,

    /// Postal code.
    pub pincode: String,

    /// Contact phone.
    pub phone: String,
}

impl DeliveryAddress {
    /// Read one field.
    #[must_use]
    pub fn get(&self, field: AddressField) -> &str {
        match field {
            AddressField::DoorNo => &self.door_no,
            AddressField::StreetAddress => &self.street_address,
            AddressField::City => &self.city,
            AddressField::Landmark => &self.landmark,
            AddressField::Pincode => &self.pincode,
            AddressField::Phone => &self.phone,
        }
    }

    /// Overwrite one field.
    pub fn set(&mut self, field: AddressField, value: impl Into<String>) {
        let slot = match field {
            AddressField::DoorNo => &mut self.door_no,
            AddressField::StreetAddress => &mut self.street_address,
            AddressField::City => &mut self.city,
            AddressField::Landmark => &mut self.landmark,
            AddressField::Pincode => &mut self.pincode,
            AddressField::Phone => &mut self.phone,
        };

        *slot = value.into();
    }

    /// Copy every non-blank field of `other` over this address. Blank fields
    /// in `other` leave ours untouched.
    pub fn merge_from(&mut self, other: &Self) {
        for field in AddressField::ALL {
            let value = other.get(field).trim();

            if !value.is_empty() {
                self.set(field, value);
            }
        }
    }

    /// This address with blank fields backfilled from `fallback`.
    #[must_use]
    pub fn with_fallback(&self, fallback: &Self) -> Self {
        let mut resolved = fallback.clone();

        resolved.merge_from(self);

        resolved
    }

    /// Whether any field is filled in.
    #[must_use]
    pub fn has_any(&self) -> bool {
        AddressField::ALL
            .iter()
            .any(|field| !self.get(*field).trim().is_empty())
    }

    /// Required fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> SmallVec<[AddressField; 4]> {
        REQUIRED_FIELDS
            .into_iter()
            .filter(|field| self.get(*field).trim().is_empty())
            .collect()
    }

    /// Check every required field is filled in.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Incomplete`] listing the blank fields.
    pub fn validate(&self) -> Result<(), AddressError> {
        let missing = self.missing_fields();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AddressError::Incomplete(missing))
        }
    }

    /// Door number and street joined into one delivery line.
    #[must_use]
    pub fn delivery_line(&self) -> String {
        [self.door_no.trim(), self.street_address.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The phone as a number, digits only. `None` when it has no digits or
    /// too many to fit.
    #[must_use]
    pub fn phone_digits(&self) -> Option<u64> {
        let digits: String = self.phone.chars().filter(char::is_ascii_digit).collect();

        digits.parse().ok()
    }
}

/// Which address checkout should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressChoice {
    /// The saved default address.
    #[default]
    Default,
    /// The draft form, backfilled from the default.
    Draft,
}

impl FromStr for AddressChoice {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "saved" => Ok(Self::Default),
            "draft" | "form" | "new" => Ok(Self::Draft),
            _ => Err(AddressError::UnknownChoice(s.to_string())),
        }
    }
}

/// The default address, the draft form, and the editor state around them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    default: DeliveryAddress,
    form: DeliveryAddress,
    choice: AddressChoice,
    editing: bool,
}

impl AddressBook {
    /// Start from a known default address.
    #[must_use]
    pub fn new(default: DeliveryAddress) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }

    /// The saved default.
    #[must_use]
    pub fn default_address(&self) -> &DeliveryAddress {
        &self.default
    }

    /// The draft form.
    #[must_use]
    pub fn form(&self) -> &DeliveryAddress {
        &self.form
    }

    /// Current choice.
    #[must_use]
    pub fn choice(&self) -> AddressChoice {
        self.choice
    }

    /// Whether the editor is open.
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Merge profile data over the default and prefill the form from the
    /// result.
    pub fn seed_from_profile(&mut self, profile: &DeliveryAddress) {
        self.default.merge_from(profile);
        self.form = self.default.clone();
    }

    /// Switch between the default and the draft. Choosing the default also
    /// copies its phone into the form.
    pub fn choose(&mut self, choice: AddressChoice) {
        self.choice = choice;

        if choice == AddressChoice::Default && !self.default.phone.trim().is_empty() {
            self.form.phone.clone_from(&self.default.phone);
        }
    }

    /// Open the editor with the form prefilled from the default.
    pub fn begin_edit(&mut self) {
        self.form = self.default.clone();
        self.editing = true;
    }

    /// Change one form field.
    pub fn update_form(&mut self, field: AddressField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Close the editor and clear the form.
    pub fn cancel_edit(&mut self) {
        self.form = DeliveryAddress::default();
        self.editing = false;
    }

    /// Make the form the new default and close the editor.
    pub fn promote_form(&mut self) {
        self.default = self.form.clone();
        self.editing = false;
    }

    /// The address checkout would use right now.
    ///
    /// Whichever address is chosen, the phone resolves from the form first,
    /// then the default.
    #[must_use]
    pub fn resolve(&self) -> DeliveryAddress {
        let mut resolved = match self.choice {
            AddressChoice::Default => self.default.clone(),
            AddressChoice::Draft => self.form.with_fallback(&self.default),
        };

        resolved.phone = [&self.form.phone, &self.default.phone]
            .into_iter()
            .find(|phone| !phone.trim().is_empty())
            .cloned()
            .unwrap_or_default();

        resolved
    }

    /// Resolve and validate the checkout address. On failure the editor is
    /// opened, prefilled, unless it already is.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::Incomplete`] when required fields are blank.
    pub fn prepare_checkout(&mut self) -> Result<DeliveryAddress, AddressError> {
        let resolved = self.resolve();

        if let Err(error) = resolved.validate() {
            if !self.editing {
                self.begin_edit();
            }

            return Err(error);
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn saved() -> DeliveryAddress {
        DeliveryAddress {
            door_no: "12B".to_string(),
            street_address: "Gandhi Road".to_string(),
            city: "Chennai".to_string(),
            landmark: "Near the temple".to_string(),
            pincode: "600001".to_string(),
            phone: "+91 98765 43210".to_string(),
        }
    }

    #[test]
    fn merge_from_keeps_fields_the_source_lacks() {
        let mut address = saved();

        address.merge_from(&DeliveryAddress {
            city: "Madurai".to_string(),
            pincode: "  ".to_string(),
            ..DeliveryAddress::default()
        });

        assert_eq!(address.city, "Madurai");
        assert_eq!(address.pincode, "600001");
        assert_eq!(address.street_address, "Gandhi Road");
    }

    #[test]
    fn validate_lists_every_missing_field() {
        let address = DeliveryAddress {
            street_address: "Gandhi Road".to_string(),
            ..DeliveryAddress::default()
        };

        assert_eq!(
            address.validate(),
            Err(AddressError::Incomplete(SmallVec::from_slice(&[
                AddressField::City,
                AddressField::Pincode,
                AddressField::Phone,
            ])))
        );
    }

    #[test]
    fn incomplete_message_asks_for_profile() {
        let error = AddressError::Incomplete(SmallVec::from_slice(&[AddressField::Pincode]));

        assert_eq!(
            error.to_string(),
            "please complete your profile: missing pincode"
        );
    }

    #[test]
    fn phone_digits_strips_formatting() {
        assert_eq!(saved().phone_digits(), Some(919_876_543_210));
        assert_eq!(DeliveryAddress::default().phone_digits(), None);
    }

    #[test]
    fn delivery_line_skips_blank_parts() {
        let mut address = saved();

        assert_eq!(address.delivery_line(), "12B, Gandhi Road");

        address.door_no.clear();

        assert_eq!(address.delivery_line(), "Gandhi Road");
    }

    #[test]
    fn draft_backfills_blank_fields_from_default() {
        let mut book = AddressBook::new(saved());

        book.choose(AddressChoice::Draft);
        book.update_form(AddressField::City, "Coimbatore");

        let resolved = book.resolve();

        assert_eq!(resolved.city, "Coimbatore");
        assert_eq!(resolved.street_address, "Gandhi Road");
        assert_eq!(resolved.phone, "+91 98765 43210");
    }

    #[test]
    fn default_choice_ignores_the_form() {
        let mut book = AddressBook::new(saved());

        book.update_form(AddressField::City, "Coimbatore");

        assert_eq!(book.resolve().city, "Chennai");
    }

    #[test]
    fn phone_falls_back_to_form_when_default_has_none() {
        let mut default = saved();
        default.phone.clear();

        let mut book = AddressBook::new(default);
        book.update_form(AddressField::Phone, "9000000001");

        assert_eq!(book.resolve().phone, "9000000001");
    }

    #[test]
    fn form_phone_wins_under_default_choice() {
        let mut book = AddressBook::new(saved());

        book.update_form(AddressField::Phone, "9000000002");

        let resolved = book.resolve();

        assert_eq!(book.choice(), AddressChoice::Default);
        assert_eq!(resolved.city, "Chennai");
        assert_eq!(resolved.phone, "9000000002");
    }

    #[test]
    fn choosing_default_copies_its_phone_into_the_form() {
        let mut book = AddressBook::new(saved());

        book.choose(AddressChoice::Draft);
        book.choose(AddressChoice::Default);

        assert_eq!(book.form().phone, "+91 98765 43210");
    }

    #[test]
    fn prepare_checkout_opens_editor_on_missing_pincode() {
        let mut default = saved();
        default.pincode.clear();

        let mut book = AddressBook::new(default);

        let result = book.prepare_checkout();

        assert_eq!(
            result,
            Err(AddressError::Incomplete(SmallVec::from_slice(&[
                AddressField::Pincode
            ])))
        );
        assert!(book.is_editing());
        assert_eq!(book.form().city, "Chennai");
    }

    #[test]
    fn prepare_checkout_leaves_open_editor_alone() {
        let mut book = AddressBook::new(DeliveryAddress::default());

        book.begin_edit();
        book.update_form(AddressField::City, "Salem");

        assert!(book.prepare_checkout().is_err());
        assert_eq!(book.form().city, "Salem");
    }

    #[test]
    fn promote_form_replaces_default_and_closes_editor() {
        let mut book = AddressBook::new(saved());

        book.begin_edit();
        book.update_form(AddressField::Pincode, "641001");
        book.promote_form();

        assert_eq!(book.default_address().pincode, "641001");
        assert!(!book.is_editing());
    }

    #[test]
    fn cancel_edit_clears_form() {
        let mut book = AddressBook::new(saved());

        book.begin_edit();
        book.cancel_edit();

        assert_eq!(book.form(), &DeliveryAddress::default());
        assert!(!book.is_editing());
    }

    #[test]
    fn seed_from_profile_prefills_form() {
        let mut book = AddressBook::default();

        book.seed_from_profile(&saved());

        assert_eq!(book.default_address(), &saved());
        assert_eq!(book.form(), &saved());
    }

    #[test]
    fn field_names_parse_loosely() -> TestResult {
        assert_eq!("door-no".parse::<AddressField>()?, AddressField::DoorNo);
        assert_eq!("Street".parse::<AddressField>()?, AddressField::StreetAddress);
        assert!("zip".parse::<AddressField>().is_err());

        Ok(())
    }
}
