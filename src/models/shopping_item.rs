//! Items on a shopping list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Category, Unit};

/// An item as stored in the backend.
///
/// `quantity`, `unit` and `category` are kept exactly as the store returned
/// them so that values written by other clients survive a round trip, even
/// ones this client would never write (a zero or negative quantity). Use [`Self::category`]
/// and [`Self::unit`] for the typed views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: Uuid,
    pub list_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub unit: String,
    pub category: String,
    pub purchased: bool,
    pub created_at: DateTime<Utc>,
}

impl ShoppingItem {
    /// Display category; unknown labels fall back to `Autres`.
    pub fn category(&self) -> Category {
        Category::for_display(&self.category)
    }

    /// Typed unit, if the stored label is one of the known units.
    pub fn unit(&self) -> Option<Unit> {
        self.unit.parse().ok()
    }

    /// Quantity label such as "3 kg".
    pub fn quantity_label(&self) -> String {
        format!("{} {}", self.quantity, self.unit)
    }
}

impl fmt::Display for ShoppingItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let check = if self.purchased { "[x]" } else { "[ ]" };
        write!(f, "{} {:<25} {}", check, self.name, self.quantity_label())
    }
}

/// Input for a new item. Quantity is kept as the text the user typed and
/// coerced when the item is created.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub quantity: String,
    pub unit: Unit,
    pub category: Category,
}

impl NewItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: "1".to_string(),
            unit: Unit::default(),
            category: Category::default(),
        }
    }

    pub fn with_quantity(mut self, quantity: impl ToString) -> Self {
        self.quantity = quantity.to_string();
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }
}
