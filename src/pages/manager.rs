//! Manager page object (Bank Manager section)

use std::sync::Arc;

use crate::browser::{BrowserError, BrowserSession};

/// Bank Manager: Add Customer, Open Account, Customers list.
pub struct ManagerPage {
    session: Arc<BrowserSession>,
}

mod selectors {
    pub const ADD_CUSTOMER_BTN: &str = "button[ng-click='addCust()']";
    pub const OPEN_ACCOUNT_BTN: &str = "button[ng-click='openAccount()']";
    pub const CUSTOMERS_BTN: &str = "button[ng-click='showCust()']";
    // Add Customer form
    pub const FIRST_NAME_INPUT: &str = "input[placeholder='First Name']";
    pub const LAST_NAME_INPUT: &str = "input[placeholder='Last Name']";
    pub const POST_CODE_INPUT: &str = "input[placeholder='Post Code']";
    pub const ADD_CUSTOMER_SUBMIT_BTN: &str = "button[type='submit']";
    // Open Account form
    pub const CUSTOMER_SELECT: &str = "#userSelect";
    pub const CURRENCY_SELECT: &str = "#currency";
    pub const PROCESS_BTN: &str = "button[type='submit']";
}

impl ManagerPage {
    pub fn new(session: Arc<BrowserSession>) -> Self {
        Self { session }
    }

    /// Fill the Add Customer form and submit. An alert with a success
    /// message may appear; capturing it is the caller's concern.
    pub async fn add_customer(
        &self,
        first_name: &str,
        last_name: &str,
        post_code: &str,
    ) -> Result<(), BrowserError> {
        self.session.click(selectors::ADD_CUSTOMER_BTN).await?;
        self.session
            .fill(selectors::FIRST_NAME_INPUT, first_name)
            .await?;
        self.session
            .fill(selectors::LAST_NAME_INPUT, last_name)
            .await?;
        self.session
            .fill(selectors::POST_CODE_INPUT, post_code)
            .await?;
        self.session.click(selectors::ADD_CUSTOMER_SUBMIT_BTN).await
    }

    /// Open an account for a customer with the given currency.
    pub async fn open_account(
        &self,
        customer_name: &str,
        currency: &str,
    ) -> Result<(), BrowserError> {
        self.session.click(selectors::OPEN_ACCOUNT_BTN).await?;
        self.session
            .select_option_by_label(selectors::CUSTOMER_SELECT, customer_name)
            .await?;
        self.session
            .select_option_by_label(selectors::CURRENCY_SELECT, currency)
            .await?;
        self.session.click(selectors::PROCESS_BTN).await
    }

    /// Navigate to the Customers list view.
    pub async fn goto_customers_list(&self) -> Result<(), BrowserError> {
        self.session.click(selectors::CUSTOMERS_BTN).await
    }
}
