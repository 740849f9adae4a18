//! Cart

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    fields::cart as keys,
    pricing::{CartSnapshot, FeeRate},
};

/// Prefix of cart row ids assigned by the backend.
pub const CART_ID_PREFIX: &str = "CART";

/// Prefix of ids synthesized for records that arrive without one.
pub const PLACEHOLDER_ID_PREFIX: &str = "tmp-";

/// Name shown for lines the backend sent without one.
pub const DEFAULT_NAME: &str = "Product";

/// Category shown for lines the backend sent without one.
pub const DEFAULT_CATEGORY: &str = "PRODUCT";

/// Placeholder for missing variant attributes.
pub const NOT_AVAILABLE: &str = "N/A";

/// One product entry in the working cart view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Backend cart row id, or a `tmp-` placeholder.
    pub id: String,

    /// Product this line refers to.
    pub product_id: Option<String>,

    /// Display name.
    pub name: String,

    /// Category label.
    pub category: String,

    /// Colour variant.
    pub color: String,

    /// Size variant.
    pub size: String,

    /// Price of one unit. Never negative.
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,

    /// Units in the line. Never below one.
    pub quantity: u32,

    /// Whether the line takes part in totals and checkout.
    pub selected: bool,

    /// Product image.
    pub image_url: Option<String>,
}

impl CartLine {
    /// Create a selected line with placeholder variant attributes.
    pub fn new(
        id: impl Into<String>,
        product_id: Option<&str>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.map(str::to_string),
            name: name.into(),
            category: DEFAULT_CATEGORY.to_string(),
            color: NOT_AVAILABLE.to_string(),
            size: NOT_AVAILABLE.to_string(),
            unit_price: unit_price.max(Decimal::ZERO),
            quantity: quantity.max(1),
            selected: true,
            image_url: None,
        }
    }

    /// Map one backend cart record. `index` seeds the placeholder id when the
    /// record carries none.
    #[must_use]
    pub fn from_record(record: &Value, index: usize) -> Self {
        let quantity = keys::QUANTITY
            .integer(record)
            .and_then(|quantity| u32::try_from(quantity.max(1)).ok())
            .unwrap_or(1);

        Self {
            id: keys::ID
                .string(record)
                .unwrap_or_else(|| format!("{PLACEHOLDER_ID_PREFIX}{index}")),
            product_id: keys::PRODUCT_ID.string(record),
            name: keys::NAME
                .string(record)
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            category: keys::CATEGORY
                .string(record)
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            color: keys::COLOR
                .string(record)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            size: keys::SIZE
                .string(record)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            unit_price: keys::UNIT_PRICE
                .decimal(record)
                .unwrap_or_default()
                .max(Decimal::ZERO),
            quantity,
            selected: true,
            image_url: keys::IMAGE.string(record),
        }
    }

    /// Whether the backend assigned this line's id.
    #[must_use]
    pub fn is_backend_confirmed(&self) -> bool {
        self.id.starts_with(CART_ID_PREFIX)
    }

    /// `unit_price * quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The working cart: a local cache of the backend's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create a cart from lines.
    #[must_use]
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// Map the records of a cart view response.
    #[must_use]
    pub fn from_records(records: &[Value]) -> Self {
        Self::new(
            records
                .iter()
                .enumerate()
                .map(|(index, record)| CartLine::from_record(record, index))
                .collect(),
        )
    }

    /// Lines in backend order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Find a line by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Selected lines.
    pub fn selected(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| line.selected)
    }

    /// Whether every line is selected. An empty cart is not.
    #[must_use]
    pub fn all_selected(&self) -> bool {
        !self.is_empty() && self.lines.iter().all(|line| line.selected)
    }

    /// Flip one line's selection. Returns `false` when no line has that id.
    pub fn toggle_selection(&mut self, id: &str) -> bool {
        self.set_selected(id, None)
    }

    /// Set one line's selection. Returns `false` when no line has that id.
    pub fn select(&mut self, id: &str, selected: bool) -> bool {
        self.set_selected(id, Some(selected))
    }

    fn set_selected(&mut self, id: &str, selected: Option<bool>) -> bool {
        match self.lines.iter_mut().find(|line| line.id == id) {
            Some(line) => {
                line.selected = selected.unwrap_or(!line.selected);

                true
            }
            None => false,
        }
    }

    /// Select every line.
    pub fn select_all(&mut self) {
        self.lines.iter_mut().for_each(|line| line.selected = true);
    }

    /// Deselect every line.
    pub fn deselect_all(&mut self) {
        self.lines.iter_mut().for_each(|line| line.selected = false);
    }

    /// Deselect everything when all lines are selected, otherwise select
    /// everything.
    pub fn toggle_select_all(&mut self) {
        if self.all_selected() {
            self.deselect_all();
        } else {
            self.select_all();
        }
    }

    /// Provisionally show `quantity` on a line until the next refetch.
    /// Quantities below one are ignored.
    pub fn set_quantity_hint(&mut self, id: &str, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|line| line.id == id) {
            line.quantity = quantity;
        }
    }

    /// Drop a line from local state.
    pub fn remove(&mut self, id: &str) -> Option<CartLine> {
        let position = self.lines.iter().position(|line| line.id == id)?;

        Some(self.lines.remove(position))
    }

    /// Drop every line whose id is in `ids`.
    pub fn remove_lines(&mut self, ids: &[String]) {
        self.lines.retain(|line| !ids.contains(&line.id));
    }

    /// Replace the lines with a fresh backend view.
    ///
    /// Lines that survive the refetch keep their local selection; new lines
    /// start selected. Everything else comes from `fresh`.
    pub fn reconcile(&mut self, fresh: Cart) {
        let lines = fresh
            .lines
            .into_iter()
            .map(|mut line| {
                if let Some(previous) = self.get(&line.id) {
                    line.selected = previous.selected;
                }

                line
            })
            .collect();

        self.lines = lines;
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Derived totals for the current selection.
    #[must_use]
    pub fn snapshot(&self, fee_rate: FeeRate) -> CartSnapshot {
        CartSnapshot::from_lines(&self.lines, fee_rate)
    }
}
