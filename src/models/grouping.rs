use serde::Serialize;

use super::{Category, ShoppingItem};

/// Items sharing one category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup<'a> {
    /// The category text exactly as stored on the items
    pub label: &'a str,
    /// Display category for styling
    pub category: Category,
    pub items: Vec<&'a ShoppingItem>,
}

impl CategoryGroup<'_> {
    /// Count label, e.g. "(1 article)" or "(3 articles)".
    pub fn count_label(&self) -> String {
        let n = self.items.len();
        format!("({} article{})", n, if n > 1 { "s" } else { "" })
    }
}

/// Partitions items by their category label.
///
/// Groups appear in the order their label is first seen; items keep their
/// relative order inside each group.
pub fn group_by_category(items: &[ShoppingItem]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|g| g.label == item.category) {
            Some(group) => group.items.push(item),
            None => groups.push(CategoryGroup {
                label: &item.category,
                category: item.category(),
                items: vec![item],
            }),
        }
    }
    groups
}
