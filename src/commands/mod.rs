mod auth;
mod config_cmd;
mod config_error;
mod item;
mod list;

pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use config_error::config_error_view;
pub use item::ItemCommand;
pub use list::ListCommand;

use clap::ValueEnum;
use std::error::Error;
use std::io::{self, Write};

use crate::controller::{ControllerError, Phase, ViewController};
use crate::models::ShoppingList;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// What the user sees for a failed command: the notice the controller
/// recorded when a backend call failed, the error itself otherwise.
pub fn explain(controller: &ViewController, err: Box<dyn Error>) -> Box<dyn Error> {
    match controller.notice() {
        Some(notice) => notice.to_string().into(),
        None => err,
    }
}

/// Fails unless the controller restored a signed-in session.
fn require_signed_in(controller: &ViewController) -> Result<(), ControllerError> {
    match controller.phase() {
        Phase::Browsing => Ok(()),
        _ => Err(ControllerError::NotAuthenticated),
    }
}

/// Resolves a list by id or name and opens it.
async fn open_list(
    controller: &mut ViewController,
    identifier: &str,
) -> Result<ShoppingList, ControllerError> {
    require_signed_in(controller)?;
    let list = controller.find_list(identifier)?.clone();
    controller.select_list(list.id).await?;
    Ok(list)
}

/// Asks a yes/no question on stdin; anything but "y" means no.
fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
