//! Carousel navigation controller
//!
//! Navigation follows the reducer pattern: every state transition is a pure
//! function `(ControllerState, NavAction) -> ControllerState`.
//! [`CarouselController`] is a thin owner around that function.
//!
//! Invariant: `selected_index < max(page_count, 1)` after every transition.

use serde::Serialize;

/// Number of pages for a slide count and extent
///
/// Zero slides means zero pages. An extent of zero is treated as one.
pub fn page_count(slide_count: usize, extent: usize) -> usize {
    slide_count.div_ceil(extent.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub selected_index: usize,
    pub page_count: usize,
}

/// Everything the navigation reducer needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerState {
    pub navigation: NavigationState,
    /// Whether the underlying carousel engine is ready
    pub initialized: bool,
    pub slide_count: usize,
    pub extent: usize,
    pub loop_enabled: bool,
}

impl ControllerState {
    pub fn new(slide_count: usize, extent: usize, loop_enabled: bool) -> Self {
        let extent = extent.max(1);
        Self {
            navigation: NavigationState {
                selected_index: 0,
                page_count: page_count(slide_count, extent),
            },
            initialized: false,
            slide_count,
            extent,
            loop_enabled,
        }
    }

    fn with_selected(self, selected_index: usize) -> Self {
        Self {
            navigation: NavigationState {
                selected_index,
                ..self.navigation
            },
            ..self
        }
    }

    fn recomputed(self) -> Self {
        let pages = page_count(self.slide_count, self.extent);
        let max_index = pages.max(1) - 1;
        Self {
            navigation: NavigationState {
                selected_index: self.navigation.selected_index.min(max_index),
                page_count: pages,
            },
            ..self
        }
    }
}

/// Actions that trigger navigation state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    /// The carousel engine finished initializing
    Initialize,
    /// The carousel engine was torn down
    Teardown,
    Next,
    Previous,
    /// Jump to a page; out-of-range indices are ignored
    JumpTo(i64),
    /// The resolved slide sequence changed length
    SlidesChanged(usize),
    /// The effective number of visible items changed
    ExtentChanged(usize),
    /// Slide count and extent changed together; clamped once
    Resized { slide_count: usize, extent: usize },
    SetLoop(bool),
}

/// Pure navigation reducer
pub fn reduce_nav(state: ControllerState, action: NavAction) -> ControllerState {
    match action {
        NavAction::Initialize => ControllerState {
            initialized: true,
            ..state
        }
        .recomputed(),

        NavAction::Teardown => ControllerState {
            initialized: false,
            ..state
        },

        NavAction::SlidesChanged(slide_count) => ControllerState {
            slide_count,
            ..state
        }
        .recomputed(),

        NavAction::ExtentChanged(extent) => ControllerState {
            extent: extent.max(1),
            ..state
        }
        .recomputed(),

        NavAction::Resized { slide_count, extent } => ControllerState {
            slide_count,
            extent: extent.max(1),
            ..state
        }
        .recomputed(),

        NavAction::SetLoop(loop_enabled) => ControllerState {
            loop_enabled,
            ..state
        },

        // Navigation below requires a ready engine
        _ if !state.initialized => state,

        NavAction::Next => {
            let pages = state.navigation.page_count;
            let current = state.navigation.selected_index;
            if pages == 0 {
                state
            } else if current + 1 < pages {
                state.with_selected(current + 1)
            } else if state.loop_enabled {
                state.with_selected(0)
            } else {
                state
            }
        }

        NavAction::Previous => {
            let pages = state.navigation.page_count;
            let current = state.navigation.selected_index;
            if pages == 0 {
                state
            } else if current > 0 {
                state.with_selected(current - 1)
            } else if state.loop_enabled {
                state.with_selected(pages - 1)
            } else {
                state
            }
        }

        NavAction::JumpTo(index) => match usize::try_from(index) {
            Ok(index) if index < state.navigation.page_count => state.with_selected(index),
            _ => {
                tracing::debug!(
                    index,
                    page_count = state.navigation.page_count,
                    "Ignoring out-of-range jump"
                );
                state
            }
        },
    }
}

/// Owns the navigation state of one carousel instance
#[derive(Debug, Clone)]
pub struct CarouselController {
    state: ControllerState,
}

impl CarouselController {
    pub fn new(slide_count: usize, extent: usize, loop_enabled: bool) -> Self {
        Self {
            state: ControllerState::new(slide_count, extent, loop_enabled),
        }
    }

    pub fn dispatch(&mut self, action: NavAction) -> NavigationState {
        self.state = reduce_nav(self.state, action);
        self.state.navigation
    }

    pub fn initialize(&mut self) {
        self.dispatch(NavAction::Initialize);
    }

    pub fn teardown(&mut self) {
        self.dispatch(NavAction::Teardown);
    }

    pub fn next(&mut self) -> NavigationState {
        self.dispatch(NavAction::Next)
    }

    pub fn previous(&mut self) -> NavigationState {
        self.dispatch(NavAction::Previous)
    }

    pub fn jump_to(&mut self, index: i64) -> NavigationState {
        self.dispatch(NavAction::JumpTo(index))
    }

    pub fn set_slide_count(&mut self, slide_count: usize) -> NavigationState {
        self.dispatch(NavAction::SlidesChanged(slide_count))
    }

    pub fn set_extent(&mut self, extent: usize) -> NavigationState {
        self.dispatch(NavAction::ExtentChanged(extent))
    }

    /// Apply a new slide count and extent as one change
    pub fn set_dimensions(&mut self, slide_count: usize, extent: usize) -> NavigationState {
        self.dispatch(NavAction::Resized {
            slide_count,
            extent,
        })
    }

    pub fn set_loop(&mut self, loop_enabled: bool) {
        self.dispatch(NavAction::SetLoop(loop_enabled));
    }

    pub fn navigation(&self) -> NavigationState {
        self.state.navigation
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    /// Arrows are shown when not hidden and there is more than one slide
    pub fn show_arrows(&self, hide_arrows: bool) -> bool {
        !hide_arrows && self.state.slide_count > 1
    }

    /// Dots are shown when not hidden and there is more than one page
    pub fn show_dots(&self, hide_dots: bool) -> bool {
        !hide_dots && self.state.slide_count > 0 && self.state.navigation.page_count > 1
    }
}
