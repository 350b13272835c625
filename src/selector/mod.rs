//! The user selector: loads the users listing, populates the selection
//! control, tracks the avatar, and hands real selections to the chart
//! renderer.
//!
//! Lifecycle:
//!
//! ```text
//! Idle ──begin_load──▶ Loading ──complete_load──▶ Populated | Failed
//! Populated ──select──▶ NoSelection | SelectionActive ──select──▶ …
//! any ──begin_load──▶ Loading
//! ```
//!
//! Loads are tagged with a [`LoadTicket`]; only the latest ticket may
//! populate the control. Every selection change advances the render
//! generation so region handles given to an earlier render go inert.

use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;

use crate::models::{AvatarIndex, IdField, Selection, UserDirectory, UserId};
use crate::render::ChartRenderer;
use crate::source::{FetchError, UserSource};
use crate::view::{self, Generation, ImageHandle, Region, RegionHandle, SelectOption, SharedSurface};

/// Selector behaviour knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSettings {
    /// Where each record's identifier comes from.
    pub id_field: IdField,
    /// Control value meaning "no user" in addition to the empty string.
    pub sentinel: String,
    /// Avatar shown for users without one.
    pub avatar_placeholder: Option<String>,
}

impl Default for SelectorSettings {
    fn default() -> Self {
        Self {
            id_field: IdField::default(),
            sentinel: crate::constants::DEFAULT_SENTINEL.to_string(),
            avatar_placeholder: None,
        }
    }
}

/// Where the selector is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorState {
    Idle,
    Loading,
    Populated,
    Failed,
    NoSelection,
    SelectionActive,
}

impl SelectorState {
    /// Whether the control holds data a selection can refer to.
    pub fn has_data(self) -> bool {
        matches!(
            self,
            SelectorState::Populated | SelectorState::NoSelection | SelectorState::SelectionActive
        )
    }
}

/// Identifies one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// Result of completing a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The control now lists `users` entries.
    Populated { users: usize },
    /// The listing could not be loaded; the error text is showing.
    Failed(FetchError),
    /// A newer load was started; this result was discarded.
    Superseded,
}

/// Result of a selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// No data yet; nothing changed.
    Ignored,
    /// The sentinel or empty value was chosen.
    Cleared,
    /// The renderer was invoked for this user.
    Rendered(UserId),
    /// The value is not a known user; the error text is showing.
    Rejected(UserId),
}

/// Headless controller for the user selection control.
pub struct UserSelector {
    surface: SharedSurface,
    renderer: Arc<dyn ChartRenderer>,
    settings: SelectorSettings,
    state: SelectorState,
    directory: UserDirectory,
    avatars: AvatarIndex,
    selection: Selection,
    avatar_image: Option<ImageHandle>,
    latest_ticket: u64,
    generation: Generation,
}

impl UserSelector {
    pub fn new(
        surface: SharedSurface,
        renderer: Arc<dyn ChartRenderer>,
        settings: SelectorSettings,
    ) -> Self {
        Self {
            surface,
            renderer,
            settings,
            state: SelectorState::Idle,
            directory: UserDirectory::default(),
            avatars: AvatarIndex::default(),
            selection: Selection::None,
            avatar_image: None,
            latest_ticket: 0,
            generation: Generation::default(),
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn avatars(&self) -> &AvatarIndex {
        &self.avatars
    }

    pub fn settings(&self) -> &SelectorSettings {
        &self.settings
    }

    /// Fetch the listing from `source` and populate the control.
    pub async fn load(&mut self, source: &dyn UserSource) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = source.fetch_users().await;
        self.complete_load(ticket, result, source.base_url())
    }

    /// Enter `Loading`: show the loading indicator and hide the control.
    ///
    /// Charts still in flight for the previous listing go inert.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        let mut surface = view::lock(&self.surface);
        self.generation.bump();
        surface.set_visible(Region::Chart, false);
        surface.set_visible(Region::ErrorText, false);
        surface.set_visible(Region::Selector, false);
        surface.set_visible(Region::Loading, true);
        self.state = SelectorState::Loading;
        tracing::debug!(ticket = self.latest_ticket, "loading users");
        LoadTicket(self.latest_ticket)
    }

    /// Apply the result of the load identified by `ticket`.
    ///
    /// `base` resolves relative avatar paths. Results for any ticket but the
    /// latest are discarded.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Value, FetchError>,
        base: Option<&Url>,
    ) -> LoadOutcome {
        if ticket.0 != self.latest_ticket {
            tracing::warn!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "discarding stale users listing"
            );
            return LoadOutcome::Superseded;
        }

        let parsed = result.and_then(|body| {
            UserDirectory::from_json(&body, &self.settings.id_field, base).map_err(FetchError::from)
        });

        let mut surface = view::lock(&self.surface);
        // Whatever was rendered belongs to the previous listing.
        self.generation.bump();
        self.selection = Selection::None;
        surface.set_visible(Region::Chart, false);
        surface.set_visible(Region::Avatar, false);
        surface.set_visible(Region::Loading, false);

        match parsed {
            Ok((directory, avatars)) => {
                let options: Vec<SelectOption> = directory
                    .iter()
                    .map(|user| SelectOption {
                        value: user.id.to_string(),
                        label: user.name.clone(),
                    })
                    .collect();
                surface.set_options(&options);
                surface.set_visible(Region::Selector, true);

                let users = directory.len();
                tracing::debug!(users, avatars = avatars.len(), "users listing loaded");
                self.directory = directory;
                self.avatars = avatars;
                self.state = SelectorState::Populated;
                LoadOutcome::Populated { users }
            }
            Err(e) => {
                tracing::warn!(error = %e, "users listing failed to load");
                surface.set_options(&[]);
                surface.set_text(Region::ErrorText, &format!("Could not load users: {e}"));
                surface.set_visible(Region::ErrorText, true);

                self.directory = UserDirectory::default();
                self.avatars = AvatarIndex::default();
                self.state = SelectorState::Failed;
                LoadOutcome::Failed(e)
            }
        }
    }

    /// React to the control's value changing to `value`.
    pub fn select(&mut self, value: &str) -> SelectionOutcome {
        if !self.state.has_data() {
            tracing::debug!(value, state = ?self.state, "selection before users loaded, ignoring");
            return SelectionOutcome::Ignored;
        }

        let selection = Selection::parse(value, &self.settings.sentinel);
        let mut surface = view::lock(&self.surface);
        self.generation.bump();

        if let Selection::User(ref id) = selection {
            if !self.directory.contains(id) {
                tracing::warn!(%id, "selected user is not in the listing");
                surface.set_visible(Region::Chart, false);
                surface.set_visible(Region::Loading, false);
                surface.set_visible(Region::Avatar, false);
                surface.set_text(Region::ErrorText, &format!("Unknown user: {id}"));
                surface.set_visible(Region::ErrorText, true);
                self.selection = Selection::None;
                self.state = SelectorState::NoSelection;
                return SelectionOutcome::Rejected(id.clone());
            }
        }

        // Exactly one avatar image exists from here on.
        let source = selection.user().and_then(|id| {
            self.avatars
                .get(id)
                .map(str::to_string)
                .or_else(|| self.settings.avatar_placeholder.clone())
        });
        match self.avatar_image {
            Some(image) => surface.set_image_source(image, source.as_deref()),
            None => self.avatar_image = Some(surface.create_avatar_image(source.as_deref())),
        }

        surface.set_visible(Region::ErrorText, false);
        surface.set_visible(Region::Chart, false);

        match selection {
            Selection::None => {
                surface.set_visible(Region::Avatar, false);
                surface.set_visible(Region::Loading, false);
                self.selection = Selection::None;
                self.state = SelectorState::NoSelection;
                SelectionOutcome::Cleared
            }
            Selection::User(id) => {
                surface.set_visible(Region::Loading, true);
                surface.set_visible(Region::Avatar, true);
                let loading = RegionHandle::new(self.surface.clone(), Region::Loading, &self.generation);
                let chart = RegionHandle::new(self.surface.clone(), Region::Chart, &self.generation);
                // The renderer may update its handles synchronously.
                drop(surface);

                tracing::debug!(%id, "rendering chart");
                self.renderer.render(loading, chart, &id);
                self.selection = Selection::User(id.clone());
                self.state = SelectorState::SelectionActive;
                SelectionOutcome::Rendered(id)
            }
        }
    }
}
