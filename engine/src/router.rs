//! Navigation state machine.
//!
//! ```text
//! Menu ──id──▶ Loading ──ok──▶ CalculatorShown
//!   ▲            │  └──err──▶ Error
//!   └──back/""───┴─────────────────┘
//! ```
//!
//! Every entry into `Loading` allocates a new [`Generation`]; only a
//! completion carrying the current generation may leave `Loading`. Entering
//! `Menu` also bumps the generation so in-flight loads are orphaned.

use endocalc_types::{CalculatorId, Generation, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterState {
    Menu,
    Loading {
        id: CalculatorId,
        generation: Generation,
        resync: bool,
    },
    CalculatorShown(CalculatorId),
    Error(CalculatorId),
}

/// A load the caller must start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub id: CalculatorId,
    pub generation: Generation,
    pub resync: bool,
}

#[derive(Debug)]
pub struct Router {
    state: RouterState,
    generation: Generation,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RouterState::Menu,
            generation: Generation::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &RouterState {
        &self.state
    }

    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, RouterState::Loading { .. })
    }

    /// The settled view, `None` while loading.
    #[must_use]
    pub fn view(&self) -> Option<View> {
        match &self.state {
            RouterState::Menu => Some(View::Menu),
            RouterState::Loading { .. } => None,
            RouterState::CalculatorShown(id) => Some(View::CalculatorShown(id.clone())),
            RouterState::Error(id) => Some(View::Error(id.clone())),
        }
    }

    /// Identifier of the calculator being loaded, shown, or failed.
    #[must_use]
    pub fn active_id(&self) -> Option<&CalculatorId> {
        match &self.state {
            RouterState::Menu => None,
            RouterState::Loading { id, .. }
            | RouterState::CalculatorShown(id)
            | RouterState::Error(id) => Some(id),
        }
    }

    pub fn navigate(&mut self, id: CalculatorId) -> LoadRequest {
        self.begin(id, false)
    }

    /// Reload whatever is shown or failed. `None` from `Menu` or `Loading`.
    pub fn resync(&mut self) -> Option<LoadRequest> {
        let id = match &self.state {
            RouterState::CalculatorShown(id) | RouterState::Error(id) => id.clone(),
            RouterState::Menu | RouterState::Loading { .. } => return None,
        };
        Some(self.begin(id, true))
    }

    /// Enter `Menu`. Returns `false` if already there.
    pub fn show_menu(&mut self) -> bool {
        if self.state == RouterState::Menu {
            return false;
        }
        self.generation = self.generation.next();
        self.state = RouterState::Menu;
        true
    }

    /// Back is the same as showing the menu, from any non-menu state.
    pub fn back(&mut self) -> bool {
        self.show_menu()
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        matches!(
            &self.state,
            RouterState::Loading { generation: current, .. } if *current == generation
        )
    }

    /// Settle the current load. Stale generations are rejected with `false`.
    pub fn finish(&mut self, generation: Generation, succeeded: bool) -> bool {
        let RouterState::Loading {
            id,
            generation: current,
            ..
        } = &self.state
        else {
            return false;
        };
        if *current != generation {
            return false;
        }
        let id = id.clone();
        self.state = if succeeded {
            RouterState::CalculatorShown(id)
        } else {
            RouterState::Error(id)
        };
        true
    }

    fn begin(&mut self, id: CalculatorId, resync: bool) -> LoadRequest {
        self.generation = self.generation.next();
        self.state = RouterState::Loading {
            id: id.clone(),
            generation: self.generation,
            resync,
        };
        LoadRequest {
            id,
            generation: self.generation,
            resync,
        }
    }
}
