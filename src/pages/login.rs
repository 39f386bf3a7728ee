//! Login page object

use std::sync::Arc;

use crate::browser::{BrowserError, BrowserSession};

use super::page_url;

/// XYZ Bank login page. Customer login (dropdown) or Bank Manager login.
pub struct LoginPage {
    session: Arc<BrowserSession>,
    base_url: String,
}

mod selectors {
    pub const CUSTOMER_LOGIN_BTN: &str = "button[ng-click='customer()']";
    pub const BANK_MANAGER_LOGIN_BTN: &str = "button[ng-click='manager()']";
    pub const USER_SELECT: &str = "#userSelect";
    pub const LOGIN_BTN: &str = "button[type='submit']";
}

impl LoginPage {
    pub fn new(session: Arc<BrowserSession>, base_url: &str) -> Self {
        Self {
            session,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Open the login page (base URL).
    pub async fn navigate(&self) -> Result<(), BrowserError> {
        self.session.goto(&page_url(&self.base_url, "")).await
    }

    /// Select a customer by visible name and click Login.
    pub async fn login_as_customer(&self, name: &str) -> Result<(), BrowserError> {
        self.session.click(selectors::CUSTOMER_LOGIN_BTN).await?;
        self.session
            .select_option_by_label(selectors::USER_SELECT, name)
            .await?;
        self.session.click(selectors::LOGIN_BTN).await
    }

    /// Click Bank Manager Login to enter the manager section.
    pub async fn login_as_bank_manager(&self) -> Result<(), BrowserError> {
        self.session.click(selectors::BANK_MANAGER_LOGIN_BTN).await
    }
}
