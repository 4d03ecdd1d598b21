//! The shell controller.
//!
//! [`App`] owns the two host regions (menu and calculator detail), the
//! [`Router`], the [`OfflineCacheManager`] and both inbound channels. Every
//! state change goes through [`App::dispatch`]; platform events are first
//! folded by the cache manager, which decides whether they become messages.
//!
//! While a load is in flight the previously visible view stays on screen and
//! [`App::loading`] reports the pending id. The routing address is updated when
//! navigation starts, so it matches the visible view whenever nothing is
//! loading.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use tokio::sync::mpsc;

use endocalc_types::{
    CacheState, Calculator, CalculatorId, Container, Generation, InitializationError,
    LoadCompletion, PlatformEvent, RenderError, Route, ShellMessage, UiOptions, View,
};

use crate::anchors::require_anchors;
use crate::context::ShellContext;
use crate::loader::CatalogEntry;
use crate::offline::{OfflineCacheManager, UpdateNotification};
use crate::platform::AgentHost;
use crate::router::{LoadRequest, Router, RouterState};

/// Content of the calculator-detail region.
#[derive(Debug)]
pub enum Detail {
    Calculator {
        id: CalculatorId,
        name: String,
        container: Container,
    },
    Error {
        id: CalculatorId,
        message: String,
        /// Underlying load or render failure, for diagnostics.
        cause: String,
    },
}

impl Detail {
    #[must_use]
    pub fn id(&self) -> &CalculatorId {
        match self {
            Detail::Calculator { id, .. } | Detail::Error { id, .. } => id,
        }
    }

    /// Header text next to the back action.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Detail::Calculator { name, .. } => name,
            Detail::Error { .. } => "Error",
        }
    }
}

pub struct App {
    context: ShellContext,
    router: Router,
    offline: OfflineCacheManager,
    host: Box<dyn AgentHost>,
    messages: mpsc::UnboundedReceiver<ShellMessage>,
    platform: mpsc::UnboundedReceiver<PlatformEvent>,
    address: Route,
    view: View,
    menu_visible: bool,
    detail_visible: bool,
    detail: Option<Detail>,
    /// Instance behind `detail`, replaced on every successful load.
    instance: Option<Box<dyn Calculator>>,
    catalog: Vec<CatalogEntry>,
    selected: usize,
    /// Generations of spawned loads that have not reported back.
    in_flight: HashSet<Generation>,
    tick_count: usize,
    should_quit: bool,
}

impl App {
    /// Build the shell. Fails if either host region is missing, in which case
    /// nothing has been rendered or registered.
    pub fn new(
        context: ShellContext,
        messages: mpsc::UnboundedReceiver<ShellMessage>,
        platform: mpsc::UnboundedReceiver<PlatformEvent>,
        host: Box<dyn AgentHost>,
        anchors: &[&str],
    ) -> Result<Self, InitializationError> {
        if let Err(err) = require_anchors(anchors) {
            tracing::error!("Required host regions not found: {err}");
            return Err(err);
        }

        let offline = context.offline_manager();
        let catalog = context.loader().catalog();
        Ok(Self {
            context,
            router: Router::new(),
            offline,
            host,
            messages,
            platform,
            address: Route::Menu,
            view: View::Menu,
            menu_visible: true,
            detail_visible: false,
            detail: None,
            instance: None,
            catalog,
            selected: 0,
            in_flight: HashSet::new(),
            tick_count: 0,
            should_quit: false,
        })
    }

    /// Register the caching agent and open `initial`.
    pub fn start(&mut self, initial: Route) {
        if let Err(err) = self.offline.start(self.host.as_mut()) {
            tracing::warn!("Continuing without offline support: {err}");
        }
        self.set_address(initial);
    }

    /// The single entry point for shell state changes.
    pub fn dispatch(&mut self, message: ShellMessage) {
        tracing::debug!("Dispatching {}", message.kind());
        match message {
            ShellMessage::RouteChanged(route) => self.on_route_changed(route),
            ShellMessage::ConnectivityChanged { online } => self.on_connectivity_changed(online),
            ShellMessage::UpdateAvailable { version } => {
                tracing::info!("New version {version} available; waiting for refresh");
            }
            ShellMessage::LoadCompleted(completion) => self.on_load_completed(completion),
        }
    }

    /// Change the routing address. Setting the current value is not a change.
    pub fn set_address(&mut self, route: Route) {
        if route == self.address {
            tracing::debug!("Address already {route}");
            return;
        }
        self.dispatch(ShellMessage::RouteChanged(route));
    }

    /// Drain both inbound channels without blocking.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        while let Ok(event) = self.platform.try_recv() {
            if let Some(message) = self.offline.handle(event) {
                self.dispatch(message);
            }
        }
        while let Ok(message) = self.messages.try_recv() {
            self.dispatch(message);
        }
    }

    /// Wait until every spawned load has reported back, then drain.
    pub async fn settle(&mut self) {
        while !self.in_flight.is_empty() {
            match self.messages.recv().await {
                Some(message) => self.dispatch(message),
                None => break,
            }
        }
        self.tick();
    }

    fn on_route_changed(&mut self, route: Route) {
        self.address = route.clone();
        match route {
            Route::Menu => self.enter_menu(),
            Route::Calculator(id) => {
                let request = self.router.navigate(id);
                self.spawn_load(request);
            }
        }
    }

    fn on_connectivity_changed(&mut self, online: bool) {
        if !online {
            return;
        }
        if let Some(request) = self.router.resync() {
            tracing::info!("Back online: reloading {}", request.id);
            self.spawn_load(request);
        }
    }

    fn spawn_load(&mut self, request: LoadRequest) {
        self.in_flight.insert(request.generation);
        self.context.spawn_load(request);
    }

    fn on_load_completed(&mut self, completion: LoadCompletion) {
        let LoadCompletion {
            id,
            generation,
            resync,
            result,
        } = completion;
        self.in_flight.remove(&generation);
        if !self.router.is_current(generation) {
            tracing::debug!("Discarding stale load of {id} (generation {generation})");
            return;
        }

        let outcome = result
            .map_err(|err| err.to_string())
            .and_then(|loaded| match render_instance(loaded.instance.as_ref()) {
                Ok(container) => Ok((loaded.instance, container)),
                Err(err) => Err(err.to_string()),
            });

        match outcome {
            Ok((instance, container)) => {
                self.router.finish(generation, true);
                if resync {
                    tracing::info!("Resynced {id}");
                }
                self.show_calculator(id, instance, container);
            }
            Err(cause) => {
                tracing::error!("Failed to load calculator: {id}: {cause}");
                self.router.finish(generation, false);
                self.show_error(id, cause);
            }
        }
    }

    fn show_calculator(
        &mut self,
        id: CalculatorId,
        instance: Box<dyn Calculator>,
        container: Container,
    ) {
        self.view = View::CalculatorShown(id.clone());
        self.detail = Some(Detail::Calculator {
            id,
            name: instance.name().to_string(),
            container,
        });
        self.instance = Some(instance);
        self.menu_visible = false;
        self.detail_visible = true;
    }

    fn show_error(&mut self, id: CalculatorId, cause: String) {
        self.view = View::Error(id.clone());
        self.detail = Some(Detail::Error {
            message: format!("Failed to load calculator: {id}"),
            id,
            cause,
        });
        self.instance = None;
        self.menu_visible = false;
        self.detail_visible = true;
    }

    fn enter_menu(&mut self) {
        self.router.show_menu();
        self.view = View::Menu;
        self.detail = None;
        self.instance = None;
        self.menu_visible = true;
        self.detail_visible = false;
        self.address = Route::Menu;
    }

    /// Back to the menu. Always available from the detail region, including
    /// while a load is pending.
    pub fn back(&mut self) {
        if self.view == View::Menu && !self.router.is_loading() {
            return;
        }
        self.enter_menu();
    }

    /// The notification's reload action: clear the banner and load the
    /// current address again.
    pub fn refresh(&mut self) {
        self.offline.refresh();
        if let Route::Calculator(id) = self.address.clone() {
            tracing::info!("Refreshing {id}");
            let request = self.router.navigate(id);
            self.spawn_load(request);
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.offline.dismiss();
    }

    pub fn select_next(&mut self) {
        if !self.catalog.is_empty() {
            self.selected = (self.selected + 1) % self.catalog.len();
        }
    }

    pub fn select_prev(&mut self) {
        if !self.catalog.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.catalog.len() - 1);
        }
    }

    /// Navigate to the highlighted menu entry.
    pub fn open_selected(&mut self) {
        if let Some(entry) = self.catalog.get(self.selected) {
            let route = Route::Calculator(entry.id.clone());
            self.set_address(route);
        }
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    #[must_use]
    pub fn address(&self) -> &Route {
        &self.address
    }

    #[must_use]
    pub fn router_state(&self) -> &RouterState {
        self.router.state()
    }

    /// Id of the calculator being loaded, if any.
    #[must_use]
    pub fn loading(&self) -> Option<&CalculatorId> {
        match self.router.state() {
            RouterState::Loading { id, .. } => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn menu_visible(&self) -> bool {
        self.menu_visible
    }

    #[must_use]
    pub fn detail_visible(&self) -> bool {
        self.detail_visible
    }

    #[must_use]
    pub fn detail(&self) -> Option<&Detail> {
        self.detail.as_ref()
    }

    /// The shown calculator instance.
    #[must_use]
    pub fn instance(&self) -> Option<&dyn Calculator> {
        self.instance.as_deref()
    }

    /// The shown calculator's container, for forwarding input.
    pub fn container_mut(&mut self) -> Option<&mut Container> {
        match self.detail.as_mut()? {
            Detail::Calculator { container, .. } => Some(container),
            Detail::Error { .. } => None,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn cache_state(&self) -> CacheState {
        self.offline.state()
    }

    #[must_use]
    pub fn status_text(&self) -> &'static str {
        self.offline.status_text()
    }

    #[must_use]
    pub fn notification(&self) -> Option<&UpdateNotification> {
        self.offline.notification()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.context.settings().ui_options
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick_count
    }

    /// Loads spawned but not yet reported back.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// Render into a fresh container. A panicking calculator becomes a
/// [`RenderError`] instead of taking the shell down.
fn render_instance(instance: &dyn Calculator) -> Result<Container, RenderError> {
    let mut container = Container::new();
    match panic::catch_unwind(AssertUnwindSafe(|| instance.render(&mut container))) {
        Ok(Ok(())) => Ok(container),
        Ok(Err(err)) => Err(err),
        Err(payload) => Err(RenderError::Panicked {
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
