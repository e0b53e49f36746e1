use super::{Effect, Presenter, RenderPlan, ScreenEvent, ScreenState};
use crate::content::models::{ContentItem, LabelEntry, ParseError};
use crate::content::StoreError;
use crate::images::{ImageHandle, StaticImageCatalog};
use crate::language::Language;

fn catalog() -> StaticImageCatalog {
    StaticImageCatalog::new(ImageHandle("ic_ftp".into()))
        .with("ic_login", ImageHandle("ic_login".into()))
}

fn label(key: &str, es: &str, en: &str) -> LabelEntry {
    LabelEntry {
        key: key.into(),
        es: es.into(),
        en: en.into(),
    }
}

fn item(order: i64, es: &str, image: &str) -> ContentItem {
    ContentItem {
        order,
        text_es: es.into(),
        text_en: format!("{es} (en)"),
        image_ref: image.into(),
    }
}

fn screen(plan: RenderPlan) -> super::ScreenContent {
    match plan {
        RenderPlan::Screen(content) => content,
        other => panic!("expected content, got {other:?}"),
    }
}

#[test]
fn mounts_loading_when_online_and_disconnected_when_not() {
    assert_eq!(
        Presenter::new(Language::Es, true).state(),
        ScreenState::Loading
    );
    assert_eq!(
        Presenter::new(Language::Es, false).state(),
        ScreenState::Disconnected
    );
}

#[test]
fn first_snapshot_while_online_shows_content_in_the_current_language() {
    let mut presenter = Presenter::new(Language::Es, true);
    presenter.apply(ScreenEvent::Labels(vec![
        label("logout", "Salir", "Logout"),
        label("nav_login", "Acceso", "Login"),
    ]));

    assert_eq!(presenter.state(), ScreenState::Content);
    let content = screen(presenter.render(&catalog()));
    let logout = content.labels.iter().find(|l| l.key == "logout").unwrap();
    assert_eq!(logout.text, "Salir");
}

#[test]
fn toggling_twice_renders_the_original_strings() {
    let mut presenter = Presenter::new(Language::Es, true);
    presenter.apply(ScreenEvent::Labels(vec![label("logout", "Salir", "Logout")]));
    let catalog = catalog();
    let original = presenter.render(&catalog);

    presenter.apply(ScreenEvent::ToggleLanguage);
    assert_eq!(screen(presenter.render(&catalog)).labels[0].text, "Logout");

    presenter.apply(ScreenEvent::ToggleLanguage);
    assert_eq!(presenter.render(&catalog), original);
}

#[test]
fn items_render_ascending_by_order() {
    let mut presenter = Presenter::new(Language::Es, true);
    presenter.apply(ScreenEvent::Items(vec![
        item(2, "segundo", ""),
        item(1, "primero", ""),
        item(3, "tercero", ""),
    ]));

    let content = screen(presenter.render(&catalog()));
    let texts: Vec<&str> = content.steps.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["primero", "segundo", "tercero"]);
}

#[test]
fn unresolved_image_names_fall_back_to_the_default_handle() {
    let mut presenter = Presenter::new(Language::Es, true);
    presenter.apply(ScreenEvent::Items(vec![
        item(1, "uno", "ic_login"),
        item(2, "dos", "missing_asset"),
    ]));

    let content = screen(presenter.render(&catalog()));
    assert_eq!(content.steps[0].image, ImageHandle("ic_login".into()));
    assert_eq!(content.steps[1].image, ImageHandle("ic_ftp".into()));
}

#[test]
fn going_offline_hides_held_content() {
    let mut presenter = Presenter::new(Language::Es, true);
    presenter.apply(ScreenEvent::Labels(vec![label("logout", "Salir", "Logout")]));
    assert_eq!(presenter.state(), ScreenState::Content);

    presenter.apply(ScreenEvent::Offline);
    assert_eq!(presenter.state(), ScreenState::Disconnected);
    assert_eq!(presenter.render(&catalog()), RenderPlan::Placeholder);
}

#[test]
fn reconnecting_with_held_labels_goes_straight_to_content() {
    let mut presenter = Presenter::new(Language::Es, true);
    presenter.apply(ScreenEvent::Labels(vec![label("logout", "Salir", "Logout")]));
    presenter.apply(ScreenEvent::Offline);

    let effect = presenter.apply(ScreenEvent::Online);
    assert_eq!(effect, None);
    assert_eq!(presenter.state(), ScreenState::Content);
}

#[test]
fn reconnecting_with_an_empty_item_list_resubscribes_exactly_once() {
    let mut presenter = Presenter::new(Language::Es, true);
    presenter.apply(ScreenEvent::Items(Vec::new()));
    presenter.apply(ScreenEvent::Offline);

    let effect = presenter.apply(ScreenEvent::Online);
    assert_eq!(effect, Some(Effect::Resubscribe));
    assert_eq!(presenter.state(), ScreenState::Loading);
}

#[test]
fn reconnecting_with_labels_and_an_empty_item_list_still_resubscribes() {
    let mut presenter = Presenter::new(Language::Es, true);
    presenter.apply(ScreenEvent::Labels(vec![label("logout", "Salir", "Logout")]));
    presenter.apply(ScreenEvent::Items(Vec::new()));
    presenter.apply(ScreenEvent::Offline);

    // The held labels render immediately, but the empty item list is still
    // started over.
    let effect = presenter.apply(ScreenEvent::Online);
    assert_eq!(effect, Some(Effect::Resubscribe));
    assert_eq!(presenter.state(), ScreenState::Content);
}

#[test]
fn reconnecting_with_no_snapshot_ever_returns_to_loading() {
    let mut presenter = Presenter::new(Language::Es, true);
    assert_eq!(presenter.state(), ScreenState::Loading);

    presenter.apply(ScreenEvent::Offline);
    assert_eq!(presenter.state(), ScreenState::Disconnected);

    let effect = presenter.apply(ScreenEvent::Online);
    assert_eq!(effect, None);
    assert_eq!(presenter.state(), ScreenState::Loading);
}

#[test]
fn snapshot_while_offline_is_held_but_stays_hidden() {
    let mut presenter = Presenter::new(Language::Es, false);
    presenter.apply(ScreenEvent::Labels(vec![label("logout", "Salir", "Logout")]));

    assert_eq!(presenter.state(), ScreenState::Disconnected);
    assert_eq!(presenter.render(&catalog()), RenderPlan::Placeholder);

    // The held snapshot carries it straight to content on reconnect.
    presenter.apply(ScreenEvent::Online);
    assert_eq!(presenter.state(), ScreenState::Content);
}

#[test]
fn snapshot_updates_rerender_without_a_transition() {
    let mut presenter = Presenter::new(Language::Es, true);
    presenter.apply(ScreenEvent::Labels(vec![label("logout", "Salir", "Logout")]));
    presenter.apply(ScreenEvent::Labels(vec![label("logout", "Cerrar", "Close")]));

    assert_eq!(presenter.state(), ScreenState::Content);
    assert_eq!(screen(presenter.render(&catalog())).labels[0].text, "Cerrar");
}

#[test]
fn toggle_is_rejected_while_disconnected() {
    let mut presenter = Presenter::new(Language::Es, false);
    presenter.apply(ScreenEvent::ToggleLanguage);
    assert_eq!(presenter.language(), Language::Es);
}

#[test]
fn sibling_language_broadcast_applies_unconditionally() {
    let mut presenter = Presenter::new(Language::Es, false);
    presenter.apply(ScreenEvent::LanguageChanged(Language::En));
    assert_eq!(presenter.language(), Language::En);
}

#[test]
fn store_errors_are_treated_as_lost_connectivity() {
    let mut presenter = Presenter::new(Language::Es, true);
    presenter.apply(ScreenEvent::Labels(vec![label("logout", "Salir", "Logout")]));

    presenter.apply(ScreenEvent::StoreFailed(StoreError::Deserialization(
        ParseError {
            doc_id: "logout".into(),
            reason: "field `es` is not a string".into(),
        },
    )));

    assert_eq!(presenter.state(), ScreenState::Disconnected);
    assert_eq!(presenter.render(&catalog()), RenderPlan::Placeholder);
}

#[test]
fn missing_language_value_renders_empty() {
    let mut presenter = Presenter::new(Language::En, true);
    presenter.apply(ScreenEvent::Labels(vec![label("nav_ftp", "FTP", "")]));

    assert_eq!(screen(presenter.render(&catalog())).labels[0].text, "");
}
