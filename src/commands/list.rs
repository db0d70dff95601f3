use clap::{Args, Subcommand};
use serde_json::json;

use super::{confirm, explain, open_list, require_signed_in, OutputFormat};
use crate::controller::ViewController;

#[derive(Args)]
pub struct ListCommand {
    #[command(subcommand)]
    pub command: ListSubcommand,
}

#[derive(Subcommand)]
pub enum ListSubcommand {
    /// Show all your lists, newest first
    Ls {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a new list
    Create {
        /// Name of the list
        name: String,
    },

    /// Show a list with its items grouped by category
    Show {
        /// List ID (UUID) or name
        list: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a list and all its items
    Delete {
        /// List ID (UUID) or name
        list: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl ListCommand {
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
        require_signed_in(controller)?;

        match &self.command {
            ListSubcommand::Ls { format } => {
                let lists = controller.lists();
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(lists)?);
                    }
                    OutputFormat::Text => {
                        if lists.is_empty() {
                            println!("Aucune liste de courses");
                            return Ok(());
                        }
                        println!("{:<36}  {:<30}  CRÉÉE LE", "ID", "NOM");
                        println!("{}", "-".repeat(80));
                        for list in lists {
                            let name = if list.name.chars().count() > 30 {
                                format!("{}...", list.name.chars().take(27).collect::<String>())
                            } else {
                                list.name.clone()
                            };
                            println!("{:<36}  {:<30}  {}", list.id, name, list.created_on());
                        }
                        println!("\nTotal: {} liste(s)", lists.len());
                    }
                }
                Ok(())
            }

            ListSubcommand::Create { name } => {
                let created = controller.create_list(name).await?;
                println!("Created list:");
                println!("{}", created);
                Ok(())
            }

            ListSubcommand::Show { list, format } => {
                open_list(controller, list).await?;
                let Some(selected) = controller.selected() else {
                    return Ok(());
                };
                let groups = controller.grouped_items();

                match format {
                    OutputFormat::Json => {
                        let groups: Vec<_> = groups
                            .iter()
                            .map(|g| {
                                let ids: Vec<_> = g.items.iter().map(|i| i.id).collect();
                                json!({
                                    "category": g.label,
                                    "badge_class": g.category.style().badge_class,
                                    "items": ids,
                                })
                            })
                            .collect();
                        let view = json!({
                            "list": selected.list,
                            "items": selected.items,
                            "groups": groups,
                        });
                        println!("{}", serde_json::to_string_pretty(&view)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", selected.list);
                        println!();
                        if groups.is_empty() {
                            println!("Aucun article dans cette liste");
                            return Ok(());
                        }
                        for group in &groups {
                            println!("{} {}", group.label, group.count_label());
                            for item in &group.items {
                                println!("  {}", item);
                            }
                            println!();
                        }
                        let purchased = selected.items.iter().filter(|i| i.purchased).count();
                        println!("{}/{} acheté(s)", purchased, selected.items.len());
                    }
                }
                Ok(())
            }

            ListSubcommand::Delete { list, force } => {
                let target = controller.find_list(list)?.clone();

                if !force && !confirm(&format!("Delete list '{}' and all its items?", target.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                controller.delete_list(target.id).await?;
                println!("Deleted list: {}", target.name);
                Ok(())
            }
        }
    }
}
