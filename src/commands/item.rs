use clap::{Args, Subcommand};

use super::{explain, open_list};
use crate::controller::ViewController;
use crate::models::{Category, NewItem, Unit};

#[derive(Args)]
pub struct ItemCommand {
    #[command(subcommand)]
    pub command: ItemSubcommand,
}

#[derive(Subcommand)]
pub enum ItemSubcommand {
    /// Add an item to a list
    Add {
        /// List ID (UUID) or name
        list: String,

        /// Item name
        name: String,

        /// Quantity (whole number, defaults to 1)
        #[arg(long, short, default_value = "1", allow_negative_numbers = true)]
        quantity: String,

        /// Unit, e.g. "kg" or "pièce(s)"
        #[arg(long, short, default_value_t = Unit::default())]
        unit: Unit,

        /// Category, e.g. "Boissons"
        #[arg(long, default_value_t = Category::default())]
        category: Category,
    },

    /// Mark an item as purchased, or back to not purchased
    Toggle {
        /// List ID (UUID) or name
        list: String,

        /// Item ID (UUID) or name
        item: String,
    },

    /// Remove an item from a list
    Delete {
        /// List ID (UUID) or name
        list: String,

        /// Item ID (UUID) or name
        item: String,
    },
}

impl ItemCommand {
    pub async fn run(
        &self,
        controller: &mut ViewController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        controller.clear_notice();
        self.execute(controller)
            .await
            .map_err(|e| explain(controller, e))
    }

    async fn execute(
        &self,
        controller: &mut ViewController,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ItemSubcommand::Add {
                list,
                name,
                quantity,
                unit,
                category,
            } => {
                let target = open_list(controller, list).await?;
                let item = NewItem::new(name.as_str())
                    .with_quantity(quantity)
                    .with_unit(*unit)
                    .with_category(*category);

                let created = controller.add_item(&item).await?;
                println!("Added to '{}':", target.name);
                println!("  {}  ({})", created, created.category);
                Ok(())
            }

            ItemSubcommand::Toggle { list, item } => {
                open_list(controller, list).await?;
                let id = controller.find_item(item)?.id;

                let updated = controller.toggle_item(id).await?;
                println!("{}", updated);
                Ok(())
            }

            ItemSubcommand::Delete { list, item } => {
                let target = open_list(controller, list).await?;
                let found = controller.find_item(item)?.clone();

                controller.delete_item(found.id).await?;
                println!("Deleted '{}' from '{}'", found.name, target.name);
                Ok(())
            }
        }
    }
}
