//! Portal navigation - capability layer
//!
//! Knows the portal's URLs and menu layout: login, reaching the listing view
//! and building per-item link selectors. Does not know the retrieval flow.

use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, ConfigError, Result};
use crate::infrastructure::PageDriver;

/// Portal navigator
pub struct PortalNavigator {
    config: Config,
}

impl PortalNavigator {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// XPath of the listing link that opens the detail view for `id`.
    pub fn detail_link_xpath(&self, id: &str) -> String {
        format!(
            "//a[contains(@href, '{}/{}')]",
            self.config.detail_path, id
        )
    }

    /// Authenticate against the portal's login form.
    pub async fn login(&self, driver: &PageDriver) -> Result<()> {
        if self.config.username.is_empty() || self.config.password.is_empty() {
            return Err(AppError::Config(ConfigError::MissingCredentials));
        }

        let login_url = self.config.login_url();
        info!("logging in at {}", login_url);
        driver.goto(&login_url).await?;

        if !driver
            .wait_for(
                "//input[@type='text']",
                self.config.element_wait(),
                self.config.poll_interval(),
            )
            .await?
        {
            return Err(AppError::Other(
                "login form never appeared".to_string(),
            ));
        }

        driver
            .fill("//input[@type='text']", &self.config.username)
            .await?;
        driver
            .fill("//input[@type='password']", &self.config.password)
            .await?;

        let submit_xpath = format!(
            "//button[contains(., '{}')]",
            self.config.login_button_label
        );
        if !driver.click_first(&submit_xpath).await? {
            return Err(AppError::Other("login submit button not found".to_string()));
        }
        sleep(self.config.login_settle()).await;

        info!("✓ logged in");
        Ok(())
    }

    /// Walk the configured menu labels to reach the listing view.
    pub async fn open_listing(&self, driver: &PageDriver) -> Result<()> {
        for label in &self.config.menu_labels {
            let xpath = format!(
                "//span[contains(@class, 'title') and contains(normalize-space(text()), '{}')]",
                label
            );
            debug!("opening menu entry '{}'", label);
            if !driver
                .wait_for(&xpath, self.config.element_wait(), self.config.poll_interval())
                .await?
            {
                return Err(AppError::Other(format!(
                    "menu entry '{}' never appeared",
                    label
                )));
            }
            driver.click_first(&xpath).await?;
            sleep(self.config.menu_settle()).await;
        }
        info!("✓ listing view open");
        Ok(())
    }

    /// Hard-navigate back to the listing view and let it settle.
    ///
    /// Used both when a stale item link vanished and when an attempt left the
    /// browser somewhere unexpected.
    pub async fn goto_listing(&self, driver: &PageDriver) -> Result<()> {
        let url = self.config.listing_url();
        debug!("navigating to listing at {}", url);
        driver.goto(&url).await?;
        sleep(self.config.reload_settle()).await;
        Ok(())
    }
}
