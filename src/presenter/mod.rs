//! Per-screen presentation state machine.
//!
//! A [`Presenter`] is a reducer over the four inputs a screen has (the
//! latest label set, the latest ordered content, the selected language and
//! the connectivity state) and produces render instructions. It holds no
//! platform resources; the screen shell feeds it events (marshalled onto its
//! UI context) and executes the effects it returns.
//!
//! Connectivity gates rendering: while offline, held data is hidden behind
//! the placeholder rather than shown stale. That mirrors the shipped app and
//! is a deliberate contract, not an accident of implementation.

pub mod session;

#[cfg(test)]
mod tests;

use crate::content::models::{ContentItem, LabelEntry};
use crate::content::StoreError;
use crate::images::{ImageCatalog, ImageHandle};
use crate::language::Language;

/// What the screen is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    /// Online, no snapshot received yet.
    Loading,
    /// Online with data to show.
    Content,
    /// Offline (or a store failed); the "no connection" placeholder.
    Disconnected,
}

/// An input to the reducer. Stores, the connectivity monitor and the user's
/// toggle all funnel through here.
#[derive(Debug)]
pub enum ScreenEvent {
    Labels(Vec<LabelEntry>),
    Items(Vec<ContentItem>),
    StoreFailed(StoreError),
    Online,
    Offline,
    /// The user pressed this screen's language button.
    ToggleLanguage,
    /// A sibling screen toggled; re-render without re-fetching.
    LanguageChanged(Language),
}

/// A side effect the shell must execute; the reducer itself stays pure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Discard the tutorial registration and subscribe afresh.
    Resubscribe,
}

/// The reducer. Construct one per mounted screen, passing the shared
/// language explicitly rather than reading a process-wide global.
#[derive(Debug)]
pub struct Presenter {
    state: ScreenState,
    language: Language,
    labels: Option<Vec<LabelEntry>>,
    items: Option<Vec<ContentItem>>,
}

impl Presenter {
    /// `online` is the monitor's answer at mount time.
    pub fn new(language: Language, online: bool) -> Self {
        Self {
            state: if online {
                ScreenState::Loading
            } else {
                ScreenState::Disconnected
            },
            language,
            labels: None,
            items: None,
        }
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Applies one event and returns the effect the shell must run, if any.
    pub fn apply(&mut self, event: ScreenEvent) -> Option<Effect> {
        match event {
            ScreenEvent::Labels(labels) => {
                self.labels = Some(labels);
                self.snapshot_arrived();
            }
            ScreenEvent::Items(mut items) => {
                // Stores deliver ascending already; sorting is idempotent,
                // so this only matters if the backend ever misbehaves.
                items.sort_by_key(|item| item.order);
                self.items = Some(items);
                self.snapshot_arrived();
            }
            ScreenEvent::StoreFailed(_) | ScreenEvent::Offline => {
                self.state = ScreenState::Disconnected;
            }
            ScreenEvent::Online => return self.came_online(),
            ScreenEvent::ToggleLanguage => {
                // Language changes require connectivity; rejected outright.
                if self.state != ScreenState::Disconnected {
                    self.language = self.language.toggled();
                }
            }
            ScreenEvent::LanguageChanged(language) => {
                self.language = language;
            }
        }
        None
    }

    /// A snapshot only moves the state machine while online; offline it is
    /// held for later but stays hidden.
    fn snapshot_arrived(&mut self) {
        if self.state == ScreenState::Loading {
            self.state = ScreenState::Content;
        }
    }

    fn came_online(&mut self) -> Option<Effect> {
        if self.state != ScreenState::Disconnected {
            return None;
        }

        // A held empty tutorial list is indistinguishable from a listen
        // that never got anywhere; it is started over regardless of what
        // else the screen holds.
        let empty_items = matches!(&self.items, Some(items) if items.is_empty());
        let has_label_data = self.labels.is_some();
        let has_item_data = self.items.is_some() && !empty_items;

        // Held data goes straight back to content, no new subscription;
        // a screen holding nothing renderable returns to waiting.
        self.state = if has_label_data || has_item_data {
            ScreenState::Content
        } else {
            ScreenState::Loading
        };

        empty_items.then_some(Effect::Resubscribe)
    }

    /// Recomputes render instructions from the current snapshots. Nothing is
    /// cached between calls.
    pub fn render(&self, catalog: &dyn ImageCatalog) -> RenderPlan {
        match self.state {
            ScreenState::Disconnected => RenderPlan::Placeholder,
            ScreenState::Loading => RenderPlan::Pending,
            ScreenState::Content => RenderPlan::Screen(ScreenContent {
                labels: self
                    .labels
                    .iter()
                    .flatten()
                    .map(|entry| RenderedLabel {
                        key: entry.key.clone(),
                        text: entry.text(self.language).to_string(),
                    })
                    .collect(),
                steps: self
                    .items
                    .iter()
                    .flatten()
                    .map(|item| RenderedStep {
                        text: item.text(self.language).to_string(),
                        image: catalog
                            .resolve(&item.image_ref)
                            .unwrap_or_else(|| catalog.fallback()),
                    })
                    .collect(),
            }),
        }
    }
}

/// Instructions for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderPlan {
    /// Show the "no connection" placeholder instead of content.
    Placeholder,
    /// Online, still waiting for the first snapshot.
    Pending,
    Screen(ScreenContent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenContent {
    pub labels: Vec<RenderedLabel>,
    pub steps: Vec<RenderedStep>,
}

/// A UI label resolved to the selected language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLabel {
    pub key: String,
    pub text: String,
}

/// A tutorial step resolved to the selected language and a concrete image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStep {
    pub text: String,
    pub image: ImageHandle,
}
