//! Lifecycle controller for catalog types.
//!
//! Every mutation follows the same order: claim the form, check the session,
//! validate locally, call the service, reload the whole list, then schedule
//! feedback expiry. The cached list is never patched in place.

use std::sync::{Arc, Weak};

use chrono::Utc;
use tokio::sync::watch;

use golden_auth::SessionGuard;
use golden_catalog::{CatalogType, CatalogTypeId, CatalogTypeInput, messages};
use golden_core::Entity;

use crate::feedback::FeedbackTimer;
use crate::submission::SubmissionGuard;
use crate::{CatalogTypeError, CatalogTypeService, ClientConfig, Confirm};

/// Why a call returned without doing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The same form already has a submission in flight.
    InFlight,
    /// The session was missing or invalid; it has been cleared.
    SessionInvalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Skipped(SkipReason),
}

impl<T> Outcome<T> {
    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }
}

/// Result of a successful create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    /// The entity returned by the catalog service.
    Confirmed(CatalogType),
    /// Built locally because the service returned no payload; replaced by the next reload.
    Provisional(CatalogType),
}

impl Saved {
    pub fn item(&self) -> &CatalogType {
        match self {
            Saved::Confirmed(item) | Saved::Provisional(item) => item,
        }
    }

    pub fn is_provisional(&self) -> bool {
        matches!(self, Saved::Provisional(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// Deactivated remotely and the list reloaded.
    Removed,
    /// Refused locally because the type still classifies products.
    Blocked { number_of_products: u64 },
    /// The user declined the confirmation.
    Cancelled,
}

/// Observable list state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceState {
    pub items: Vec<CatalogType>,
    pub loading: bool,
    /// Persistent error banner; stays until dismissed or the next successful action.
    pub error: Option<String>,
    pub success_message: Option<String>,
    pub recently_changed_id: Option<CatalogTypeId>,
}

/// How the list area should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView<'a> {
    Loading,
    Empty,
    Items(&'a [CatalogType]),
}

impl ResourceState {
    pub fn list_view(&self) -> ListView<'_> {
        if self.loading {
            ListView::Loading
        } else if self.items.is_empty() {
            ListView::Empty
        } else {
            ListView::Items(&self.items)
        }
    }

    pub fn find(&self, id: CatalogTypeId) -> Option<&CatalogType> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn is_recently_changed(&self, id: CatalogTypeId) -> bool {
        self.recently_changed_id == Some(id)
    }
}

/// Owns the cached catalog type list and mediates every read and write.
pub struct ResourceLifecycleController {
    session: SessionGuard,
    service: Arc<dyn CatalogTypeService>,
    confirm: Arc<dyn Confirm>,
    config: ClientConfig,
    state: Arc<watch::Sender<ResourceState>>,
    form: SubmissionGuard,
    removal: SubmissionGuard,
    highlight_timer: FeedbackTimer,
    success_timer: FeedbackTimer,
}

impl ResourceLifecycleController {
    pub fn new(
        session: SessionGuard,
        service: Arc<dyn CatalogTypeService>,
        confirm: Arc<dyn Confirm>,
        config: ClientConfig,
    ) -> Self {
        let (state, _) = watch::channel(ResourceState::default());
        Self {
            session,
            service,
            confirm,
            config,
            state: Arc::new(state),
            form: SubmissionGuard::new(),
            removal: SubmissionGuard::new(),
            highlight_timer: FeedbackTimer::new(),
            success_timer: FeedbackTimer::new(),
        }
    }

    /// Build the controller and fetch the initial snapshot.
    ///
    /// A failed first load is left in [`ResourceState::error`].
    pub async fn mount(
        session: SessionGuard,
        service: Arc<dyn CatalogTypeService>,
        confirm: Arc<dyn Confirm>,
        config: ClientConfig,
    ) -> Self {
        let controller = Self::new(session, service, confirm, config);
        if let Err(err) = controller.load().await {
            tracing::debug!(error = %err, "initial catalog type load failed");
        }
        controller
    }

    /// Replace the cached list with the remote one.
    pub async fn load(&self) -> Result<Outcome<Vec<CatalogType>>, CatalogTypeError> {
        if !self.session.validate_token() {
            tracing::debug!("catalog type load skipped: session invalid");
            return Ok(Outcome::Skipped(SkipReason::SessionInvalid));
        }

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.service.list().await {
            Ok(items) => {
                tracing::info!(count = items.len(), "catalog types loaded");
                self.state.send_modify(|s| {
                    s.items = items.clone();
                    s.loading = false;
                });
                Ok(Outcome::Done(items))
            }
            Err(err) => {
                let message = messages::or_fallback(&err.message, messages::LOAD_FAILED);
                tracing::warn!(error = %err, "failed to load catalog types");
                self.state.send_modify(|s| {
                    s.error = Some(message.clone());
                    s.loading = false;
                });
                Err(CatalogTypeError::Transport(message))
            }
        }
    }

    pub async fn create(
        &self,
        input: &CatalogTypeInput,
    ) -> Result<Outcome<Saved>, CatalogTypeError> {
        let Some(_permit) = self.form.try_begin() else {
            tracing::debug!("create ignored: submission already in flight");
            return Ok(Outcome::Skipped(SkipReason::InFlight));
        };
        if !self.session.validate_token() {
            return Ok(Outcome::Skipped(SkipReason::SessionInvalid));
        }
        let input = input.validated().map_err(CatalogTypeError::description)?;

        let saved = match self.service.create(&input).await {
            Ok(Some(item)) => Saved::Confirmed(item),
            Ok(None) => {
                tracing::debug!("create returned no payload; using provisional entity");
                Saved::Provisional(CatalogType::provisional(&input, Utc::now()))
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to create catalog type");
                return Err(CatalogTypeError::Transport(messages::or_fallback(
                    &err.message,
                    messages::SAVE_FAILED,
                )));
            }
        };

        tracing::info!(
            id = %saved.item().id,
            provisional = saved.is_provisional(),
            "catalog type created"
        );
        self.reconcile(saved.item().id, messages::CREATED).await;
        Ok(Outcome::Done(saved))
    }

    pub async fn update(
        &self,
        id: CatalogTypeId,
        input: &CatalogTypeInput,
    ) -> Result<Outcome<Saved>, CatalogTypeError> {
        let Some(_permit) = self.form.try_begin() else {
            tracing::debug!(%id, "update ignored: submission already in flight");
            return Ok(Outcome::Skipped(SkipReason::InFlight));
        };
        if !self.session.validate_token() {
            return Ok(Outcome::Skipped(SkipReason::SessionInvalid));
        }
        let input = input.validated().map_err(CatalogTypeError::description)?;

        let saved = match self.service.update(id, &input).await {
            Ok(Some(item)) => Saved::Confirmed(item),
            Ok(None) => {
                tracing::debug!(%id, "update returned no payload; using provisional entity");
                let prior = self.state.borrow().find(id).cloned();
                let item = match prior {
                    Some(prior) => prior.merged_with(&input),
                    None => CatalogType {
                        id,
                        description: input.description.clone(),
                        active: input.active,
                        number_of_products: 0,
                    },
                };
                Saved::Provisional(item)
            }
            Err(err) => {
                tracing::warn!(%id, error = %err, "failed to update catalog type");
                return Err(CatalogTypeError::Transport(messages::or_fallback(
                    &err.message,
                    messages::SAVE_FAILED,
                )));
            }
        };

        tracing::info!(%id, provisional = saved.is_provisional(), "catalog type updated");
        self.reconcile(saved.item().id, messages::UPDATED).await;
        Ok(Outcome::Done(saved))
    }

    /// Guarded removal: in-use types are blocked, unused ones are deactivated
    /// after explicit confirmation. Nothing is ever hard-deleted.
    pub async fn request_removal(
        &self,
        item: &CatalogType,
    ) -> Result<Outcome<Removal>, CatalogTypeError> {
        let Some(_permit) = self.removal.try_begin() else {
            tracing::debug!(id = %item.id, "removal ignored: another removal in flight");
            return Ok(Outcome::Skipped(SkipReason::InFlight));
        };
        if !self.session.validate_token() {
            return Ok(Outcome::Skipped(SkipReason::SessionInvalid));
        }

        if item.is_in_use() {
            let message = messages::removal_blocked(&item.description, item.number_of_products);
            tracing::warn!(
                id = %item.id,
                number_of_products = item.number_of_products,
                "removal blocked: catalog type in use"
            );
            self.state.send_modify(|s| s.error = Some(message));
            return Ok(Outcome::Done(Removal::Blocked {
                number_of_products: item.number_of_products,
            }));
        }

        let prompt = messages::removal_prompt(&item.description);
        if !self.confirm.confirm(&prompt).await {
            tracing::debug!(id = %item.id, "removal cancelled by user");
            return Ok(Outcome::Done(Removal::Cancelled));
        }

        self.state.send_modify(|s| s.error = None);
        if let Err(err) = self.service.deactivate(item.id).await {
            let message = messages::or_fallback(&err.message, messages::REMOVE_FAILED);
            tracing::warn!(id = %item.id, error = %err, "failed to deactivate catalog type");
            self.state.send_modify(|s| s.error = Some(message.clone()));
            return Err(CatalogTypeError::Transport(message));
        }

        tracing::info!(id = %item.id, "catalog type deactivated");
        self.reload_quietly().await;
        self.flash_success(messages::REMOVED);
        Ok(Outcome::Done(Removal::Removed))
    }

    pub fn dismiss_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// Cancel pending feedback expiries. Also happens on drop.
    pub fn teardown(&self) {
        self.highlight_timer.cancel();
        self.success_timer.cancel();
    }

    pub fn state(&self) -> ResourceState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState> {
        self.state.subscribe()
    }

    pub fn items(&self) -> Vec<CatalogType> {
        self.state.borrow().items.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.form.is_in_flight()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn reconcile(&self, changed: CatalogTypeId, message: &str) {
        self.reload_quietly().await;
        self.mark_recently_changed(changed);
        self.flash_success(message);
    }

    // Reload failures are already recorded in `state.error`.
    async fn reload_quietly(&self) {
        if let Err(err) = self.load().await {
            tracing::debug!(error = %err, "reload after mutation failed");
        }
    }

    fn mark_recently_changed(&self, id: CatalogTypeId) {
        self.state.send_modify(|s| s.recently_changed_id = Some(id));
        let state = Arc::downgrade(&self.state);
        self.highlight_timer.schedule(self.config.highlight_duration, move || {
            update_if_alive(&state, |s| s.recently_changed_id = None);
        });
    }

    fn flash_success(&self, message: &str) {
        let message = message.to_string();
        self.state.send_modify(|s| s.success_message = Some(message));
        let state = Arc::downgrade(&self.state);
        self.success_timer.schedule(self.config.success_duration, move || {
            update_if_alive(&state, |s| s.success_message = None);
        });
    }
}

fn update_if_alive(state: &Weak<watch::Sender<ResourceState>>, f: impl FnOnce(&mut ResourceState)) {
    if let Some(state) = state.upgrade() {
        state.send_modify(f);
    }
}

impl Drop for ResourceLifecycleController {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl core::fmt::Debug for ResourceLifecycleController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResourceLifecycleController")
            .field("state", &*self.state.borrow())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, description: &str, active: bool, number_of_products: u64) -> CatalogType {
        CatalogType {
            id: CatalogTypeId::new(id),
            description: description.to_string(),
            active,
            number_of_products,
        }
    }

    #[test]
    fn list_view_distinguishes_loading_empty_and_items() {
        let mut state = ResourceState {
            loading: true,
            ..ResourceState::default()
        };
        assert_eq!(state.list_view(), ListView::Loading);

        state.loading = false;
        assert_eq!(state.list_view(), ListView::Empty);

        state.items = vec![item(1, "Combo", true, 3)];
        assert!(matches!(state.list_view(), ListView::Items(items) if items.len() == 1));
    }

    #[test]
    fn find_and_highlight_match_by_id() {
        let state = ResourceState {
            items: vec![item(1, "Combo", true, 3), item(4, "Bebida", false, 0)],
            recently_changed_id: Some(CatalogTypeId::new(4)),
            ..ResourceState::default()
        };
        let found = state.find(CatalogTypeId::new(4)).map(|i| i.description.as_str());
        assert_eq!(found, Some("Bebida"));
        assert!(state.find(CatalogTypeId::new(9)).is_none());
        assert!(state.is_recently_changed(CatalogTypeId::new(4)));
        assert!(!state.is_recently_changed(CatalogTypeId::new(1)));
    }

    #[test]
    fn outcome_helpers() {
        let done: Outcome<u8> = Outcome::Done(1);
        assert_eq!(done.clone().done(), Some(1));
        assert!(!done.is_skipped());

        let skipped: Outcome<u8> = Outcome::Skipped(SkipReason::InFlight);
        assert!(skipped.is_skipped());
        assert_eq!(skipped.done(), None);
    }

    #[test]
    fn saved_exposes_item_and_provenance() {
        let saved = Saved::Provisional(item(9, "Postre", true, 0));
        assert!(saved.is_provisional());
        assert_eq!(saved.item().id, CatalogTypeId::new(9));
    }
}
