use chrono::{Days, NaiveDate};
use std::sync::Arc;
use tripcheck_browser::mock::{MockAction, MockBrowser, MockElementSpec, MockPage};
use tripcheck_browser::{BrowserError, Interactor};
use tripcheck_core::{AppConfig, DayCounting, DurationCheck, TripDates, WaitConfig};
use tripcheck_flow::locators::*;
use tripcheck_flow::{FlowError, Outcome, Scenario, TravelFlow};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn fast_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.waits = WaitConfig {
        explicit_timeout_secs: 1,
        short_timeout_secs: 1,
        poll_interval_ms: 10,
        keystroke_delay_ms: 0,
        clear_settle_ms: 0,
    };
    config
}

/// The wizard as the site renders it, with a label that always reads 30 days.
fn wizard() -> Arc<MockPage> {
    let page = MockPage::new();
    page.add(&FIRST_PURCHASE_BTN, MockElementSpec::button("לרכישה בפעם הראשונה"));
    page.add(&ANY_CONTINENT_CARD, MockElementSpec::label("ארה\"ב"));
    page.add(&TO_DATES_BTN, MockElementSpec::button("הלאה לבחירת תאריכים"));
    page.add(&DEPARTURE_DATE_FIELD, MockElementSpec::date_input());
    page.add(&RETURN_DATE_FIELD, MockElementSpec::date_input());
    page.add(&TOTAL_DAYS_TEXT, MockElementSpec::label("סה\"כ: 30 ימים"));
    page.add(
        &TO_PASSENGERS_BTN,
        MockElementSpec::button("הלאה לפרטי הנוסעים").revealing(PASSENGERS_HEADER),
    );
    page.add(
        &PASSENGERS_HEADER,
        MockElementSpec::label("נשמח להכיר את הנוסעים שנבטח הפעם").hidden(),
    );
    Arc::new(page)
}

fn flow(page: Arc<MockPage>, config: &AppConfig) -> TravelFlow<MockPage> {
    TravelFlow::new(
        Interactor::from_config(page, &config.waits),
        config.site.base_url.clone(),
        DurationCheck::new(DayCounting::Inclusive),
    )
}

#[tokio::test]
async fn test_first_purchase_passes_with_requested_days() {
    let page = wizard();
    let config = fast_config();
    let trip = Scenario::trip_for(&config.trip, today()).unwrap();
    assert_eq!(trip.days_between(), 29);

    let report = Scenario::run_with(Arc::clone(&page), &config, trip).await;

    assert_eq!(report.outcome, Outcome::Passed { total_days: 30 });
    assert_eq!(page.value(&DEPARTURE_DATE_FIELD).as_deref(), Some("23/10/2026"));
    assert_eq!(page.value(&RETURN_DATE_FIELD).as_deref(), Some("21/11/2026"));
    assert!(page.is_shown(&PASSENGERS_HEADER));
}

#[tokio::test]
async fn test_thirty_one_day_gap_fails_tolerance() {
    let page = wizard();
    let config = fast_config();
    let depart = today().checked_add_days(Days::new(7)).unwrap();
    let trip = TripDates::new(depart, depart.checked_add_days(Days::new(31)).unwrap()).unwrap();

    let report = Scenario::run_with(Arc::clone(&page), &config, trip).await;

    assert_eq!(
        report.outcome,
        Outcome::Failed {
            message: "assertion failed: Expected ~32 (±1), but was 30".to_string()
        }
    );
    // Stops at the failed check
    assert!(!page
        .actions()
        .iter()
        .any(|a| matches!(a, MockAction::NativeClick(target) if *target == TO_PASSENGERS_BTN.to_string())));
    assert!(!page.is_shown(&PASSENGERS_HEADER));
}

#[tokio::test]
async fn test_one_day_off_is_tolerated() {
    let page = wizard();
    let config = fast_config();
    let depart = today().checked_add_days(Days::new(7)).unwrap();
    let trip = TripDates::new(depart, depart.checked_add_days(Days::new(30)).unwrap()).unwrap();

    let report = Scenario::run_with(page, &config, trip).await;
    assert_eq!(report.outcome, Outcome::Passed { total_days: 30 });
}

#[tokio::test]
async fn test_missing_passengers_header_times_out() {
    let page = wizard();
    page.update(&TO_PASSENGERS_BTN, |spec| spec.reveals.clear());
    let config = fast_config();
    let trip = Scenario::trip_for(&config.trip, today()).unwrap();

    let err = flow(page, &config).run_first_purchase(&trip).await.unwrap_err();
    assert!(!err.is_assertion());
    assert!(matches!(
        err,
        FlowError::Browser(BrowserError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_label_without_number() {
    let page = wizard();
    page.update(&TOTAL_DAYS_TEXT, |spec| spec.text = "סה\"כ: ימים".to_string());
    let config = fast_config();
    let trip = Scenario::trip_for(&config.trip, today()).unwrap();

    let err = flow(page, &config).run_first_purchase(&trip).await.unwrap_err();
    assert!(err.is_assertion());
    assert!(err
        .to_string()
        .contains("Total days number not found in text: סה\"כ: ימים"));
}

#[tokio::test]
async fn test_steps_run_in_order() {
    let page = wizard();
    let config = fast_config();
    let trip = Scenario::trip_for(&config.trip, today()).unwrap();

    flow(Arc::clone(&page), &config)
        .run_first_purchase(&trip)
        .await
        .unwrap();

    let clicks: Vec<String> = page
        .actions()
        .into_iter()
        .filter_map(|a| match a {
            MockAction::NativeClick(target) => Some(target),
            _ => None,
        })
        .collect();
    let first_nav = page.actions().into_iter().next();

    assert_eq!(
        first_nav,
        Some(MockAction::Navigate(config.site.base_url.clone()))
    );
    let position = |locator: &tripcheck_browser::Locator| {
        clicks.iter().position(|c| *c == locator.to_string()).unwrap()
    };
    assert!(position(&FIRST_PURCHASE_BTN) < position(&ANY_CONTINENT_CARD));
    assert!(position(&ANY_CONTINENT_CARD) < position(&TO_DATES_BTN));
    assert!(position(&TO_DATES_BTN) < position(&TO_PASSENGERS_BTN));
}

#[tokio::test]
async fn test_covered_button_still_advances() {
    let page = wizard();
    page.update(&TO_DATES_BTN, |spec| {
        spec.obscured_by = Some("div.MuiBackdrop-root".to_string());
    });
    let config = fast_config();
    let trip = Scenario::trip_for(&config.trip, today()).unwrap();

    let report = Scenario::run_with(Arc::clone(&page), &config, trip).await;
    assert!(report.passed());
    assert!(page
        .actions()
        .contains(&MockAction::ScriptClick(TO_DATES_BTN.to_string())));
}

#[tokio::test]
async fn test_browser_closed_after_failed_flow() {
    let page = wizard();
    let config = fast_config();
    let depart = today().checked_add_days(Days::new(7)).unwrap();
    let trip = TripDates::new(depart, depart.checked_add_days(Days::new(31)).unwrap()).unwrap();

    let report = Scenario::run_in(MockBrowser::new(Arc::clone(&page)), &config, trip).await;

    assert!(!report.passed());
    assert_eq!(page.actions().last(), Some(&MockAction::CloseBrowser));
}

#[tokio::test]
async fn test_browser_closed_when_page_fails_to_open() {
    let page = wizard();
    let config = fast_config();
    let trip = Scenario::trip_for(&config.trip, today()).unwrap();

    let report =
        Scenario::run_in(MockBrowser::failing_open(Arc::clone(&page)), &config, trip).await;

    assert_eq!(
        report.outcome,
        Outcome::Failed {
            message: "Browser error: chromium error: target crashed while opening page"
                .to_string()
        }
    );
    assert_eq!(page.actions(), [MockAction::CloseBrowser]);
}

#[tokio::test]
async fn test_browser_closed_after_passing_flow() {
    let page = wizard();
    let config = fast_config();
    let trip = Scenario::trip_for(&config.trip, today()).unwrap();

    let report = Scenario::run_in(MockBrowser::new(Arc::clone(&page)), &config, trip).await;

    assert!(report.passed());
    let actions = page.actions();
    assert_eq!(actions.last(), Some(&MockAction::CloseBrowser));
    assert_eq!(
        actions.iter().filter(|a| **a == MockAction::CloseBrowser).count(),
        1
    );
}
