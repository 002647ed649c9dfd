//! Interruption guard - capability layer
//!
//! The portal raises modals, banners and native alerts at unpredictable
//! moments, with no event we could subscribe to. This guard is therefore
//! called defensively at every checkpoint of the retrieval flow: it probes a
//! prioritized rule list and dismisses the first interruption it recognizes.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::PageDriver;

/// Dismiss-control recognition rules, tried in order; the first rule that
/// yields a visible, enabled control wins and no further rules run.
const DISMISS_RULES: &[&str] = &[
    // buttons with explicit text (the portal mixes capitalizations)
    "//button[contains(text(), 'OK')]",
    "//button[contains(text(), 'Ok')]",
    "//button[contains(text(), 'ok')]",
    "//button[contains(text(), 'Confirmar')]",
    "//button[contains(text(), 'Entendi')]",
    "//button[contains(text(), 'Fechar')]",
    "//button[contains(text(), 'Sim')]",
    // anchors styled as buttons (Bootstrap/Metronic themes)
    "//a[contains(@class, 'btn') and contains(text(), 'OK')]",
    "//a[contains(@class, 'btn') and contains(text(), 'Confirmar')]",
    // well-known control ids
    "//*[@id='btnOk']",
    "//*[@id='btnConfirmar']",
    // SweetAlert conventions
    "//button[contains(@class, 'confirm')]",
    "//button[contains(@class, 'swal-button')]",
    // the (X) close button in modal headers
    "//button[@class='close']",
    "//button[@aria-label='Close']",
    "//div[@class='modal-header']//button",
    // last resort: first button of a modal footer
    "//div[contains(@class, 'modal-footer')]//button[1]",
];

/// Interruption guard
pub struct PopupGuard {
    settle: Duration,
    native_settle: Duration,
}

impl PopupGuard {
    pub fn new(config: &Config) -> Self {
        Self {
            settle: config.popup_settle(),
            native_settle: config.short_pause(),
        }
    }

    /// Detect and dismiss one interruption, if any.
    ///
    /// Returns true iff something was found and dismissed. A probe that
    /// errors (mid-navigation eval, detached frame) is treated as "nothing
    /// found by this rule" — the guard must never take the session down.
    pub async fn dismiss_if_present(&self, driver: &PageDriver) -> Result<bool> {
        for rule in DISMISS_RULES {
            match driver.click_first_visible(rule).await {
                Ok(true) => {
                    info!("⚠ interruption dismissed via {}", rule);
                    sleep(self.settle).await;
                    return Ok(true);
                }
                Ok(false) => {}
                Err(e) => {
                    debug!("dismiss probe failed ({}): {}", rule, e);
                }
            }
        }

        // No DOM-level control matched; try a browser-level dialog.
        if driver.accept_native_dialog().await {
            info!("⚠ native dialog accepted");
            sleep(self.native_settle).await;
            return Ok(true);
        }

        Ok(false)
    }
}
