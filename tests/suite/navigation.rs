//! Navigation scenarios driven through the shell's public surface.

use insta::assert_snapshot;

use endocalc_engine::{Detail, ModuleLoader, Route, RouterState, ShellMessage, View};
use endocalc_types::{AddressKind, Resolution};

use crate::common::{id, shell, shown_text};

#[tokio::test]
async fn every_catalog_entry_round_trips_through_the_menu() {
    let mut shell = shell();
    let ids: Vec<_> = shell
        .app
        .catalog()
        .iter()
        .map(|entry| entry.id.clone())
        .collect();
    assert_eq!(ids.len(), 7);

    for calculator in ids {
        let route = Route::Calculator(calculator.clone());
        shell.app.set_address(route.clone());
        shell.app.settle().await;
        assert_eq!(shell.app.view(), &View::CalculatorShown(calculator.clone()));
        assert!(!shell.app.menu_visible());
        let first = shown_text(&shell.app);

        shell.app.back();
        assert_eq!(shell.app.view(), &View::Menu);
        assert!(shell.app.menu_visible());
        assert!(!shell.app.detail_visible());

        shell.app.set_address(route);
        shell.app.settle().await;
        assert_eq!(shown_text(&shell.app), first, "{calculator} re-renders identically");
        shell.app.back();
    }
}

#[tokio::test]
async fn unknown_id_shows_error_panel() {
    let mut shell = shell();
    shell.app.set_address(Route::from_fragment("#nonexistent"));
    shell.app.settle().await;

    assert_eq!(shell.app.view(), &View::Error(id("nonexistent")));
    let Some(Detail::Error { message, cause, .. }) = shell.app.detail() else {
        panic!("expected error panel");
    };
    assert_snapshot!("load_error", format!("{message}\n{cause}"));

    shell.app.back();
    assert_eq!(shell.app.address(), &Route::Menu);
    assert!(shell.app.menu_visible());
}

#[tokio::test]
async fn rapid_navigation_renders_only_the_last_target() {
    let mut shell = shell();
    for target in ["bmi", "steroid", "hba1c"] {
        shell.app.set_address(Route::from_fragment(target));
    }
    assert_eq!(shell.app.in_flight(), 3);
    assert_eq!(shell.app.loading(), Some(&id("hba1c")));

    shell.app.settle().await;
    assert_eq!(shell.app.view(), &View::CalculatorShown(id("hba1c")));
    assert_eq!(
        shell.app.detail().map(Detail::title),
        Some("Glucose Converter")
    );
    assert_eq!(shell.app.in_flight(), 0);
}

#[tokio::test]
async fn standalone_module_resolves_through_fallback() {
    let loaded = ModuleLoader::bundled("./")
        .load(&id("pounds-kg"))
        .expect("fallback resolves");
    assert_eq!(
        loaded.reference.resolution,
        Resolution::Resolved(AddressKind::Fallback)
    );
    assert_eq!(loaded.reference.fallback, "/js/calculators/pounds-kg");

    let mut shell = shell();
    shell.app.set_address(Route::from_fragment("pounds-kg"));
    shell.app.settle().await;
    assert_eq!(shell.app.view(), &View::CalculatorShown(id("pounds-kg")));
}

#[tokio::test]
async fn replayed_reconnect_reloads_in_place() {
    let mut shell = shell();
    shell.app.set_address(Route::from_fragment("steroid"));
    shell.app.settle().await;
    let before = shown_text(&shell.app);

    shell
        .app
        .dispatch(ShellMessage::ConnectivityChanged { online: false });
    shell
        .app
        .dispatch(ShellMessage::ConnectivityChanged { online: true });
    assert!(matches!(
        shell.app.router_state(),
        RouterState::Loading { resync: true, .. }
    ));
    assert_eq!(shell.app.view(), &View::CalculatorShown(id("steroid")));

    shell.app.settle().await;
    assert_eq!(shell.app.view(), &View::CalculatorShown(id("steroid")));
    assert_eq!(shown_text(&shell.app), before);
}

#[tokio::test]
async fn back_during_load_keeps_menu() {
    let mut shell = shell();
    shell.app.set_address(Route::from_fragment("metabolic-syndrome"));
    assert!(shell.app.loading().is_some());

    shell.app.back();
    shell.app.settle().await;
    assert_eq!(shell.app.view(), &View::Menu);
    assert!(shell.app.menu_visible());
    assert!(shell.app.detail().is_none());
}

#[tokio::test]
async fn input_does_not_leak_between_visits() {
    let mut shell = shell();
    shell.app.set_address(Route::from_fragment("pounds-kg"));
    shell.app.settle().await;
    let pristine = shown_text(&shell.app);

    let container = shell.app.container_mut().expect("shown");
    container.set_value("pounds", "150");
    container.submit();
    assert!(
        shown_text(&shell.app)
            .iter()
            .any(|line| line.contains("68.04"))
    );

    shell.app.back();
    shell.app.set_address(Route::from_fragment("pounds-kg"));
    shell.app.settle().await;
    assert_eq!(shown_text(&shell.app), pristine);
}
