//! Live-portal integration tests.
//!
//! These drive a real browser against the real portal and are ignored by
//! default; run them by hand with `cargo test -- --ignored` after setting
//! PORTAL_USERNAME / PORTAL_PASSWORD (and BROWSER_DEBUG_PORT to attach to a
//! running browser instead of launching one).

use payroll_fetcher::services::{discovery, PortalNavigator};
use payroll_fetcher::utils::logging;
use payroll_fetcher::{App, Config, PageDriver};

#[tokio::test]
#[ignore]
async fn test_browser_session_comes_up() {
    logging::init();

    let config = Config::load().expect("config");
    let result = App::initialize(config).await;

    assert!(result.is_ok(), "browser session should initialize");
}

#[tokio::test]
#[ignore]
async fn test_login_and_discovery() {
    logging::init();

    let config = Config::load().expect("config");
    let port = config.attach_port.expect("set BROWSER_DEBUG_PORT");
    let (_browser, page) = payroll_fetcher::connect_to_browser_and_page(port, None)
        .await
        .expect("attach to browser");
    let driver = PageDriver::new(page);

    let portal = PortalNavigator::new(&config);
    portal.login(&driver).await.expect("login");
    portal.open_listing(&driver).await.expect("open listing");

    let items = discovery::discover(&driver, &config.min_period)
        .await
        .expect("discover");
    println!("found {} items", items.len());
}

#[tokio::test]
#[ignore]
async fn test_full_run() {
    logging::init();

    let config = Config::load().expect("config");
    let app = App::initialize(config).await.expect("initialize");

    let stats = app.run().await.expect("run");
    println!(
        "downloaded {} / no data {} / skipped {} / failed {}",
        stats.downloaded, stats.no_data, stats.skipped, stats.failed
    );
    assert_eq!(stats.failed, 0, "no item should fail");
}
