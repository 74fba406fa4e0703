use std::time::Duration;
use tripcheck_browser::{BrowserEngine, ClickStrategy, Interactor, Locator, SessionHost, Waits};
use tripcheck_core::{BrowserConfig, WaitConfig};

fn headless() -> BrowserConfig {
    BrowserConfig {
        headless: true,
        language: "en".to_string(),
        ..BrowserConfig::default()
    }
}

#[tokio::test]
#[ignore = "Requires Chrome browser to be installed"]
async fn test_browser_engine_launch_and_close() {
    let engine = BrowserEngine::launch(&headless(), Duration::from_secs(30))
        .await
        .expect("launch");
    assert!(engine.open_page().await.is_ok());
    assert!(engine.close().await.is_ok());
}

#[tokio::test]
#[ignore = "Requires Chrome browser to be installed"]
async fn test_navigation_and_visible_heading() {
    let engine = BrowserEngine::launch(&headless(), Duration::from_secs(30))
        .await
        .expect("launch");
    let page = engine.open_page().await.expect("page");
    let interactor = Interactor::from_config(page, &WaitConfig::default());

    interactor
        .navigate("https://example.com")
        .await
        .expect("navigate");
    let text = interactor
        .read_value(&Locator::css("h1"))
        .await
        .expect("heading");
    assert_eq!(text, "Example Domain");

    engine.close().await.expect("close");
}

#[tokio::test]
#[ignore = "Requires Chrome browser to be installed"]
async fn test_click_link_natively() {
    let engine = BrowserEngine::launch(&headless(), Duration::from_secs(30))
        .await
        .expect("launch");
    let page = engine.open_page().await.expect("page");
    let interactor = Interactor::from_config(page, &WaitConfig::default());

    interactor
        .navigate("https://example.com")
        .await
        .expect("navigate");
    let strategy = interactor.click(&Locator::css("a")).await.expect("click");
    assert_eq!(strategy, ClickStrategy::Native);

    engine.close().await.expect("close");
}

#[tokio::test]
#[ignore = "Requires Chrome browser to be installed"]
async fn test_missing_element_times_out() {
    let engine = BrowserEngine::launch(&headless(), Duration::from_secs(30))
        .await
        .expect("launch");
    let page = engine.open_page().await.expect("page");
    let interactor = Interactor::from_config(page, &WaitConfig::default()).with_waits(
        Waits::new(Duration::from_millis(500), Duration::from_millis(100)),
    );

    interactor
        .navigate("https://example.com")
        .await
        .expect("navigate");
    assert!(interactor.visible(&Locator::css("#absent")).await.is_err());

    engine.close().await.expect("close");
}
