//! ShopMinder
//!
//! Shopping lists kept in a hosted Supabase project: accounts and sessions
//! through its auth service, lists and items through its data API.

pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod controller;
pub mod models;
pub mod repo;
pub mod store;
pub mod validation;

pub use auth::{AuthError, AuthEvent, GoTrueAuth, Session, SessionProvider};
pub use client::{ClientError, SupabaseClient};
pub use config::{Config, ConfigError};
pub use controller::{ControllerError, Notice, Phase, ViewController};
pub use models::{Category, Identity, NewItem, ShoppingItem, ShoppingList, Unit};
pub use repo::{ItemRepository, ListRepository, RepoError};
pub use store::{PostgrestStore, RemoteError, RemoteStore};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
