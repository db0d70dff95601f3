//! Client-side view state and its reconciliation with the backend.
//!
//! The controller owns what the user currently sees: who is signed in, the
//! list collection, and the selected list with its items. Every mutation goes
//! to the store first; local state changes only from the store's answer, so
//! a failed call leaves the view exactly as it was.
//!
//! Failures are logged, kept as a user-visible [`Notice`], and returned to the
//! caller. Nothing is retried automatically.

use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{AuthError, AuthEvent, AuthSubscription, SessionProvider};
use crate::models::{group_by_category, CategoryGroup, Identity, NewItem, ShoppingItem, ShoppingList};
use crate::repo::{ItemRepository, ListRepository, RepoError};
use crate::store::{RemoteError, RemoteStore};
use crate::validation::ValidationError;

/// Coarse state of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unauthenticated,
    Loading,
    Browsing,
}

/// The list opened in detail view, with the items loaded for it.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedList {
    pub list: ShoppingList,
    pub items: Vec<ShoppingItem>,
}

/// What the presentation should render.
#[derive(Debug, PartialEq)]
pub enum View<'a> {
    SignedOut,
    Loading,
    Lists(&'a [ShoppingList]),
    Detail(&'a SelectedList),
}

/// A failure the user should see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    /// Repeating the action may succeed
    pub retryable: bool,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if self.retryable {
            write!(f, "\nVeuillez réessayer.")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerError {
    Validation(ValidationError),
    Auth(AuthError),
    Remote(RemoteError),
    NotAuthenticated,
    NoListSelected,
    ListNotFound(String),
    ItemNotFound(String),
}

impl ControllerError {
    pub fn is_retryable(&self) -> bool {
        match self {
            ControllerError::Remote(e) => e.is_retryable(),
            ControllerError::Auth(e) => e.is_transient(),
            _ => false,
        }
    }
}

impl std::fmt::Display for ControllerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControllerError::Validation(e) => write!(f, "{}", e),
            ControllerError::Auth(e) => write!(f, "{}", e),
            ControllerError::Remote(e) => write!(f, "{}", e),
            ControllerError::NotAuthenticated => {
                write!(f, "Not signed in. Run `shopminder auth signin` first.")
            }
            ControllerError::NoListSelected => write!(f, "No list selected"),
            ControllerError::ListNotFound(id) => write!(f, "List not found: {}", id),
            ControllerError::ItemNotFound(id) => write!(f, "Item not found: {}", id),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<RepoError> for ControllerError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Validation(e) => ControllerError::Validation(e),
            RepoError::Remote(e) => ControllerError::Remote(e),
        }
    }
}

impl From<RemoteError> for ControllerError {
    fn from(e: RemoteError) -> Self {
        ControllerError::Remote(e)
    }
}

impl From<AuthError> for ControllerError {
    fn from(e: AuthError) -> Self {
        ControllerError::Auth(e)
    }
}

pub struct ViewController {
    auth: Arc<dyn SessionProvider>,
    list_repo: ListRepository,
    item_repo: ItemRepository,
    phase: Phase,
    identity: Option<Identity>,
    lists: Vec<ShoppingList>,
    selected: Option<SelectedList>,
    notice: Option<Notice>,
    subscription: Option<AuthSubscription>,
}

impl ViewController {
    pub fn new(store: Arc<dyn RemoteStore>, auth: Arc<dyn SessionProvider>) -> Self {
        Self {
            auth,
            list_repo: ListRepository::new(store.clone()),
            item_repo: ItemRepository::new(store),
            phase: Phase::Unauthenticated,
            identity: None,
            lists: Vec::new(),
            selected: None,
            notice: None,
            subscription: None,
        }
    }

    // ---- state accessors ----

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn lists(&self) -> &[ShoppingList] {
        &self.lists
    }

    pub fn selected(&self) -> Option<&SelectedList> {
        self.selected.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn view(&self) -> View<'_> {
        match (self.phase, &self.selected) {
            (Phase::Unauthenticated, _) => View::SignedOut,
            (Phase::Loading, _) => View::Loading,
            (Phase::Browsing, Some(selected)) => View::Detail(selected),
            (Phase::Browsing, None) => View::Lists(&self.lists),
        }
    }

    /// Items of the selected list grouped by category, in first-seen order.
    pub fn grouped_items(&self) -> Vec<CategoryGroup<'_>> {
        self.selected
            .as_ref()
            .map(|s| group_by_category(&s.items))
            .unwrap_or_default()
    }

    // ---- session ----

    /// Subscribes to auth changes and restores the stored session.
    pub async fn start(&mut self) -> Result<(), ControllerError> {
        if self.subscription.is_none() {
            self.subscription = Some(self.auth.on_auth_state_change());
        }

        self.phase = Phase::Loading;
        match self.auth.get_session().await {
            Ok(Some(session)) => self.enter(session.user).await,
            Ok(None) => {
                tracing::info!("No stored session");
                self.leave();
                Ok(())
            }
            Err(e) => {
                self.leave();
                Err(self.fail("Erreur lors de la restauration de la session", e.into()))
            }
        }
    }

    /// Applies every auth change received since the last call.
    pub async fn sync_auth_events(&mut self) -> Result<(), ControllerError> {
        let mut pending = Vec::new();
        if let Some(sub) = self.subscription.as_mut() {
            while let Some(event) = sub.try_next() {
                pending.push(event);
            }
        }
        for event in pending {
            self.apply_auth_event(event).await?;
        }
        Ok(())
    }

    pub async fn apply_auth_event(&mut self, event: AuthEvent) -> Result<(), ControllerError> {
        match event {
            AuthEvent::SignedIn(user) | AuthEvent::TokenRefreshed(user) => {
                let same_user = self.identity.as_ref().map(|i| i.id) == Some(user.id);
                if same_user && self.phase == Phase::Browsing {
                    self.identity = Some(user);
                    Ok(())
                } else {
                    self.enter(user).await
                }
            }
            AuthEvent::SignedOut => {
                self.leave();
                Ok(())
            }
        }
    }

    /// Stops listening for auth changes.
    pub fn teardown(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }

    pub async fn sign_out(&mut self) -> Result<(), ControllerError> {
        let result = self.auth.sign_out().await;
        self.leave();
        result.map_err(|e| self.fail("Erreur lors de la déconnexion", e.into()))
    }

    async fn enter(&mut self, user: Identity) -> Result<(), ControllerError> {
        tracing::info!("Signed in as {}", user.email);
        self.identity = Some(user);
        self.lists.clear();
        self.selected = None;
        self.phase = Phase::Browsing;
        self.load_lists().await
    }

    /// Back to signed out, dropping everything cached for the user.
    fn leave(&mut self) {
        self.phase = Phase::Unauthenticated;
        self.identity = None;
        self.lists.clear();
        self.selected = None;
    }

    fn owner_id(&self) -> Result<Uuid, ControllerError> {
        self.identity
            .as_ref()
            .map(|i| i.id)
            .ok_or(ControllerError::NotAuthenticated)
    }

    // ---- lists ----

    pub async fn load_lists(&mut self) -> Result<(), ControllerError> {
        let owner = self.owner_id()?;
        match self.list_repo.list(owner).await {
            Ok(lists) => {
                tracing::debug!("Loaded {} list(s)", lists.len());
                self.lists = lists;
                Ok(())
            }
            Err(e) => Err(self.fail("Erreur lors du chargement des listes", e.into())),
        }
    }

    pub async fn create_list(&mut self, name: &str) -> Result<ShoppingList, ControllerError> {
        let owner = self.owner_id()?;
        let created = match self.list_repo.create(name, owner).await {
            Ok(list) => list,
            Err(RepoError::Validation(e)) => return Err(ControllerError::Validation(e)),
            Err(e) => return Err(self.fail("Erreur lors de la création de la liste", e.into())),
        };

        tracing::info!("Created list '{}' ({})", created.name, created.id);
        if self.load_lists().await.is_err() {
            // keep the confirmed list visible even if the refresh failed
            self.lists.retain(|l| l.id != created.id);
            self.lists.insert(0, created.clone());
        }
        Ok(created)
    }

    pub async fn delete_list(&mut self, list_id: Uuid) -> Result<(), ControllerError> {
        self.owner_id()?;
        if let Err(e) = self.list_repo.delete(list_id).await {
            return Err(self.fail("Erreur lors de la suppression de la liste", e.into()));
        }

        tracing::info!("Deleted list {}", list_id);
        self.lists.retain(|l| l.id != list_id);
        if self.selected.as_ref().map(|s| s.list.id) == Some(list_id) {
            self.selected = None;
        }
        Ok(())
    }

    /// Opens a list. Items are always fetched again from the store.
    pub async fn select_list(&mut self, list_id: Uuid) -> Result<(), ControllerError> {
        self.owner_id()?;
        let list = self
            .lists
            .iter()
            .find(|l| l.id == list_id)
            .cloned()
            .ok_or_else(|| ControllerError::ListNotFound(list_id.to_string()))?;

        match self.item_repo.list(list.id).await {
            Ok(items) => {
                tracing::debug!("Loaded {} item(s) for '{}'", items.len(), list.name);
                self.selected = Some(SelectedList { list, items });
                Ok(())
            }
            Err(e) => Err(self.fail("Erreur lors du chargement des articles", e.into())),
        }
    }

    pub fn back_to_lists(&mut self) {
        self.selected = None;
    }

    /// Finds a list by id or by case-insensitive name.
    pub fn find_list(&self, identifier: &str) -> Result<&ShoppingList, ControllerError> {
        let by_id = Uuid::parse_str(identifier.trim())
            .ok()
            .and_then(|id| self.lists.iter().find(|l| l.id == id));
        let wanted = identifier.trim().to_lowercase();
        by_id
            .or_else(|| self.lists.iter().find(|l| l.name.to_lowercase() == wanted))
            .ok_or_else(|| ControllerError::ListNotFound(identifier.to_string()))
    }

    // ---- items ----

    fn selected_mut(&mut self) -> Result<&mut SelectedList, ControllerError> {
        self.selected.as_mut().ok_or(ControllerError::NoListSelected)
    }

    /// Finds an item of the selected list by id or case-insensitive name.
    pub fn find_item(&self, identifier: &str) -> Result<&ShoppingItem, ControllerError> {
        let selected = self.selected.as_ref().ok_or(ControllerError::NoListSelected)?;
        let by_id = Uuid::parse_str(identifier.trim())
            .ok()
            .and_then(|id| selected.items.iter().find(|i| i.id == id));
        let wanted = identifier.trim().to_lowercase();
        by_id
            .or_else(|| selected.items.iter().find(|i| i.name.to_lowercase() == wanted))
            .ok_or_else(|| ControllerError::ItemNotFound(identifier.to_string()))
    }

    pub async fn add_item(&mut self, item: &NewItem) -> Result<ShoppingItem, ControllerError> {
        let list_id = self.selected_mut()?.list.id;
        let created = match self.item_repo.create(list_id, item).await {
            Ok(created) => created,
            Err(RepoError::Validation(e)) => return Err(ControllerError::Validation(e)),
            Err(e) => return Err(self.fail("Erreur lors de l'ajout de l'article", e.into())),
        };

        tracing::info!("Added '{}' ({})", created.name, created.quantity_label());
        self.selected_mut()?.items.push(created.clone());
        Ok(created)
    }

    /// Sets the purchased flag of one item once the store confirmed it.
    pub async fn set_item_purchased(
        &mut self,
        item_id: Uuid,
        purchased: bool,
    ) -> Result<ShoppingItem, ControllerError> {
        let selected = self.selected_mut()?;
        if !selected.items.iter().any(|i| i.id == item_id) {
            return Err(ControllerError::ItemNotFound(item_id.to_string()));
        }

        let updated = match self.item_repo.set_purchased(item_id, purchased).await {
            Ok(updated) => updated,
            Err(e) => return Err(self.fail("Erreur lors de la mise à jour de l'article", e.into())),
        };

        if let Some(slot) = self
            .selected_mut()?
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
        {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Flips the purchased flag of one item.
    pub async fn toggle_item(&mut self, item_id: Uuid) -> Result<ShoppingItem, ControllerError> {
        let current = self
            .selected_mut()?
            .items
            .iter()
            .find(|i| i.id == item_id)
            .map(|i| i.purchased)
            .ok_or_else(|| ControllerError::ItemNotFound(item_id.to_string()))?;
        self.set_item_purchased(item_id, !current).await
    }

    pub async fn delete_item(&mut self, item_id: Uuid) -> Result<(), ControllerError> {
        self.selected_mut()?;
        if let Err(e) = self.item_repo.delete(item_id).await {
            return Err(self.fail("Erreur lors de la suppression de l'article", e.into()));
        }

        tracing::info!("Deleted item {}", item_id);
        self.selected_mut()?.items.retain(|i| i.id != item_id);
        Ok(())
    }

    /// Logs a failed call and keeps it as the current notice.
    fn fail(&mut self, context: &str, err: ControllerError) -> ControllerError {
        tracing::error!("{}: {}", context, err);
        self.notice = Some(Notice {
            message: format!("{}: {}", context, err),
            retryable: err.is_retryable(),
        });
        err
    }
}

impl Drop for ViewController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{sign_up_or_sign_in, MemoryAuth};
    use crate::models::{Category, Unit};
    use crate::store::{MemoryStore, RemoteStore, Table};

    struct TestContext {
        store: Arc<MemoryStore>,
        auth: Arc<MemoryAuth>,
        controller: ViewController,
    }

    async fn signed_in() -> TestContext {
        let store = Arc::new(MemoryStore::new());
        let (auth, _) = MemoryAuth::signed_in("marie@exemple.fr", "secret");
        let auth = Arc::new(auth);
        let mut controller = ViewController::new(store.clone(), auth.clone());
        controller.start().await.unwrap();
        TestContext {
            store,
            auth,
            controller,
        }
    }

    fn offline() -> RemoteError {
        RemoteError::Transport("connection refused".to_string())
    }

    #[tokio::test]
    async fn test_start_without_session() {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(MemoryAuth::new());
        let mut controller = ViewController::new(store.clone(), auth);

        controller.start().await.unwrap();

        assert_eq!(controller.phase(), Phase::Unauthenticated);
        assert_eq!(controller.view(), View::SignedOut);
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_start_with_session_loads_lists() {
        let ctx = signed_in().await;
        assert_eq!(ctx.controller.phase(), Phase::Browsing);
        assert_eq!(ctx.controller.view(), View::Lists(&[]));
        assert_eq!(ctx.store.calls(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_event_moves_to_browsing() {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(MemoryAuth::new());
        let mut controller = ViewController::new(store, auth.clone());
        controller.start().await.unwrap();

        let notice = sign_up_or_sign_in(auth.as_ref(), "paul@exemple.fr", "secret").await;
        assert!(notice.is_success());

        controller.sync_auth_events().await.unwrap();
        assert_eq!(controller.phase(), Phase::Browsing);
        assert_eq!(controller.identity().unwrap().email, "paul@exemple.fr");
    }

    #[tokio::test]
    async fn test_sign_out_clears_everything() {
        let mut ctx = signed_in().await;
        let list = ctx.controller.create_list("Samedi").await.unwrap();
        ctx.controller.select_list(list.id).await.unwrap();

        ctx.controller.sign_out().await.unwrap();

        assert_eq!(ctx.controller.phase(), Phase::Unauthenticated);
        assert!(ctx.controller.identity().is_none());
        assert!(ctx.controller.lists().is_empty());
        assert!(ctx.controller.selected().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_event_from_elsewhere() {
        let mut ctx = signed_in().await;
        ctx.controller.create_list("Samedi").await.unwrap();

        ctx.auth.sign_out().await.unwrap();
        ctx.controller.sync_auth_events().await.unwrap();

        assert_eq!(ctx.controller.phase(), Phase::Unauthenticated);
        assert!(ctx.controller.lists().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_unsubscribes() {
        let mut ctx = signed_in().await;
        ctx.controller.teardown();

        ctx.auth.sign_out().await.unwrap();
        ctx.controller.sync_auth_events().await.unwrap();

        // the event was never delivered
        assert_eq!(ctx.controller.phase(), Phase::Browsing);
    }

    #[tokio::test]
    async fn test_blank_list_name_is_local_only() {
        let mut ctx = signed_in().await;
        let calls = ctx.store.calls();

        for name in ["", "   "] {
            let err = ctx.controller.create_list(name).await.unwrap_err();
            assert_eq!(err, ControllerError::Validation(ValidationError::EmptyName));
        }

        assert_eq!(ctx.store.calls(), calls);
        assert!(ctx.controller.lists().is_empty());
        assert!(ctx.controller.notice().is_none());
    }

    #[tokio::test]
    async fn test_create_list_appears_newest_first() {
        let mut ctx = signed_in().await;
        ctx.controller.create_list("Lundi").await.unwrap();
        ctx.controller.create_list("Mardi").await.unwrap();

        let names: Vec<&str> = ctx
            .controller
            .lists()
            .iter()
            .map(|l| l.name.as_str())
            .collect();
        assert_eq!(names, vec!["Mardi", "Lundi"]);
    }

    #[tokio::test]
    async fn test_create_list_failure_changes_nothing() {
        let mut ctx = signed_in().await;
        ctx.controller.create_list("Lundi").await.unwrap();
        let before = ctx.controller.lists().to_vec();

        ctx.store.fail_with(offline());
        let err = ctx.controller.create_list("Mardi").await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(ctx.controller.lists(), before.as_slice());
        let notice = ctx.controller.notice().unwrap();
        assert!(notice.retryable);
        assert!(notice
            .message
            .starts_with("Erreur lors de la création de la liste"));
        assert!(notice.to_string().ends_with("\nVeuillez réessayer."));
    }

    #[test]
    fn test_notice_without_retry_hint() {
        let notice = Notice {
            message: "Erreur lors de la suppression de la liste: Not found: list".to_string(),
            retryable: false,
        };
        assert_eq!(notice.to_string(), notice.message);
    }

    #[tokio::test]
    async fn test_load_lists_failure_keeps_previous_lists() {
        let mut ctx = signed_in().await;
        ctx.controller.create_list("Lundi").await.unwrap();

        ctx.store.fail_with(offline());
        assert!(ctx.controller.load_lists().await.is_err());
        assert_eq!(ctx.controller.lists().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_selected_list_clears_selection() {
        let mut ctx = signed_in().await;
        let keep = ctx.controller.create_list("Garder").await.unwrap();
        let drop = ctx.controller.create_list("Jeter").await.unwrap();
        ctx.controller.select_list(drop.id).await.unwrap();
        ctx.controller
            .add_item(&NewItem::new("Lait"))
            .await
            .unwrap();

        ctx.controller.delete_list(drop.id).await.unwrap();

        assert_eq!(ctx.controller.lists(), &[keep]);
        assert!(ctx.controller.selected().is_none());
        assert_eq!(ctx.store.row_count(Table::Items), 0);
    }

    #[tokio::test]
    async fn test_delete_other_list_keeps_selection() {
        let mut ctx = signed_in().await;
        let open = ctx.controller.create_list("Ouverte").await.unwrap();
        let other = ctx.controller.create_list("Autre").await.unwrap();
        ctx.controller.select_list(open.id).await.unwrap();

        ctx.controller.delete_list(other.id).await.unwrap();

        assert_eq!(ctx.controller.selected().unwrap().list.id, open.id);
    }

    #[tokio::test]
    async fn test_delete_list_failure_keeps_it() {
        let mut ctx = signed_in().await;
        let list = ctx.controller.create_list("Samedi").await.unwrap();
        ctx.controller.select_list(list.id).await.unwrap();

        ctx.store.fail_with(offline());
        assert!(ctx.controller.delete_list(list.id).await.is_err());

        assert_eq!(ctx.controller.lists().len(), 1);
        assert!(ctx.controller.selected().is_some());
    }

    #[tokio::test]
    async fn test_reselecting_reloads_from_store() {
        let mut ctx = signed_in().await;
        let list = ctx.controller.create_list("Samedi").await.unwrap();
        ctx.controller.select_list(list.id).await.unwrap();
        ctx.controller.add_item(&NewItem::new("Lait")).await.unwrap();
        ctx.controller.back_to_lists();
        assert_eq!(ctx.controller.view(), View::Lists(ctx.controller.lists()));

        let calls = ctx.store.calls();
        ctx.controller.select_list(list.id).await.unwrap();

        assert_eq!(ctx.store.calls(), calls + 1);
        assert_eq!(ctx.controller.selected().unwrap().items.len(), 1);
    }

    #[tokio::test]
    async fn test_select_list_with_foreign_quantity() {
        let mut ctx = signed_in().await;
        let list = ctx.controller.create_list("Samedi").await.unwrap();
        ctx.store
            .insert(
                Table::Items,
                serde_json::json!({ "list_id": list.id, "name": "Oeufs", "quantity": -2 }),
            )
            .await
            .unwrap();

        ctx.controller.select_list(list.id).await.unwrap();

        let items = &ctx.controller.selected().unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, -2);
    }

    #[tokio::test]
    async fn test_select_unknown_list() {
        let mut ctx = signed_in().await;
        let err = ctx.controller.select_list(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ControllerError::ListNotFound(_)));
    }

    #[tokio::test]
    async fn test_add_item_requires_selection() {
        let mut ctx = signed_in().await;
        let err = ctx
            .controller
            .add_item(&NewItem::new("Lait"))
            .await
            .unwrap_err();
        assert_eq!(err, ControllerError::NoListSelected);
    }

    #[tokio::test]
    async fn test_add_item_failure_does_not_append() {
        let mut ctx = signed_in().await;
        let list = ctx.controller.create_list("Samedi").await.unwrap();
        ctx.controller.select_list(list.id).await.unwrap();

        ctx.store.fail_with(offline());
        assert!(ctx.controller.add_item(&NewItem::new("Lait")).await.is_err());
        assert!(ctx.controller.selected().unwrap().items.is_empty());

        ctx.store.recover();
        let calls = ctx.store.calls();
        assert!(ctx.controller.add_item(&NewItem::new(" ")).await.is_err());
        assert_eq!(ctx.store.calls(), calls);
        assert!(ctx.controller.selected().unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn test_set_purchased_touches_only_target() {
        let mut ctx = signed_in().await;
        let list = ctx.controller.create_list("Samedi").await.unwrap();
        ctx.controller.select_list(list.id).await.unwrap();
        let lait = ctx.controller.add_item(&NewItem::new("Lait")).await.unwrap();
        let pain = ctx.controller.add_item(&NewItem::new("Pain")).await.unwrap();

        for value in [true, true, false] {
            let updated = ctx
                .controller
                .set_item_purchased(lait.id, value)
                .await
                .unwrap();
            assert_eq!(updated.purchased, value);

            let items = &ctx.controller.selected().unwrap().items;
            assert_eq!(items.iter().find(|i| i.id == lait.id).unwrap().purchased, value);
            assert_eq!(items.iter().find(|i| i.id == pain.id).unwrap(), &pain);
        }
    }

    #[tokio::test]
    async fn test_toggle_failure_leaves_flag() {
        let mut ctx = signed_in().await;
        let list = ctx.controller.create_list("Samedi").await.unwrap();
        ctx.controller.select_list(list.id).await.unwrap();
        let lait = ctx.controller.add_item(&NewItem::new("Lait")).await.unwrap();

        ctx.store.fail_with(offline());
        assert!(ctx.controller.toggle_item(lait.id).await.is_err());
        assert!(!ctx.controller.selected().unwrap().items[0].purchased);

        ctx.store.recover();
        let toggled = ctx.controller.toggle_item(lait.id).await.unwrap();
        assert!(toggled.purchased);
        assert!(ctx.controller.selected().unwrap().items[0].purchased);
    }

    #[tokio::test]
    async fn test_delete_item_after_confirmation() {
        let mut ctx = signed_in().await;
        let list = ctx.controller.create_list("Samedi").await.unwrap();
        ctx.controller.select_list(list.id).await.unwrap();
        let lait = ctx.controller.add_item(&NewItem::new("Lait")).await.unwrap();
        ctx.controller.add_item(&NewItem::new("Pain")).await.unwrap();

        ctx.store.fail_with(offline());
        assert!(ctx.controller.delete_item(lait.id).await.is_err());
        assert_eq!(ctx.controller.selected().unwrap().items.len(), 2);

        ctx.store.recover();
        ctx.controller.delete_item(lait.id).await.unwrap();
        let items = &ctx.controller.selected().unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Pain");
    }

    #[tokio::test]
    async fn test_find_by_id_or_name() {
        let mut ctx = signed_in().await;
        let list = ctx.controller.create_list("Courses du Samedi").await.unwrap();

        assert_eq!(ctx.controller.find_list("courses du samedi").unwrap(), &list);
        assert_eq!(
            ctx.controller.find_list(&list.id.to_string()).unwrap(),
            &list
        );
        assert!(ctx.controller.find_list("nope").is_err());

        ctx.controller.select_list(list.id).await.unwrap();
        let lait = ctx.controller.add_item(&NewItem::new("Lait")).await.unwrap();
        assert_eq!(ctx.controller.find_item("LAIT").unwrap(), &lait);
        assert!(matches!(
            ctx.controller.find_item("Beurre"),
            Err(ControllerError::ItemNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_weekly_list_scenario() {
        let mut ctx = signed_in().await;

        let list = ctx
            .controller
            .create_list("Courses de la semaine")
            .await
            .unwrap();
        assert_eq!(ctx.controller.lists(), &[list.clone()]);

        ctx.controller.select_list(list.id).await.unwrap();
        assert!(ctx.controller.selected().unwrap().items.is_empty());
        assert!(ctx.controller.grouped_items().is_empty());

        ctx.controller
            .add_item(
                &NewItem::new("Pommes")
                    .with_quantity(3)
                    .with_unit(Unit::Kilogram)
                    .with_category(Category::FruitsEtLegumes),
            )
            .await
            .unwrap();
        ctx.controller
            .add_item(&NewItem::new("Eau").with_category(Category::Boissons))
            .await
            .unwrap();
        ctx.controller
            .add_item(
                &NewItem::new("Poires")
                    .with_quantity(2)
                    .with_unit(Unit::Kilogram)
                    .with_category(Category::FruitsEtLegumes),
            )
            .await
            .unwrap();

        let groups = ctx.controller.grouped_items();
        let labels: Vec<&str> = groups.iter().map(|g| g.label).collect();
        assert_eq!(labels, vec!["Fruits et légumes", "Boissons"]);

        let fruits: Vec<(&str, String)> = groups[0]
            .items
            .iter()
            .map(|i| (i.name.as_str(), i.quantity_label()))
            .collect();
        assert_eq!(
            fruits,
            vec![
                ("Pommes", "3 kg".to_string()),
                ("Poires", "2 kg".to_string())
            ]
        );
    }
}
