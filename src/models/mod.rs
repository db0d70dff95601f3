mod category;
mod grouping;
mod identity;
mod shopping_item;
mod shopping_list;
mod unit;

pub use category::{Category, CategoryStyle};
pub use grouping::{group_by_category, CategoryGroup};
pub use identity::Identity;
pub use shopping_item::{NewItem, ShoppingItem};
pub use shopping_list::ShoppingList;
pub use unit::Unit;
