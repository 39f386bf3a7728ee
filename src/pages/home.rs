//! Customer home page object (after customer login)

use std::sync::Arc;

use crate::browser::{BrowserError, BrowserSession};

/// Customer account home: welcome message, deposit, withdraw, balance,
/// transactions, logout.
pub struct CustomerHomePage {
    session: Arc<BrowserSession>,
}

mod selectors {
    pub const WELCOME_HEADING: &str = ".fontBig.ng-binding";
    pub const DEPOSIT_BTN: &str = "button[ng-click='deposit()']";
    // Site uses typo "Withdrawl" in the label; the binding is spelled the same
    pub const WITHDRAWL_BTN: &str = "button[ng-click='withdrawl()']";
    pub const AMOUNT_INPUT: &str = "input[type='number'][placeholder='amount']";
    pub const SUBMIT_AMOUNT_BTN: &str = "button[type='submit']";
    // The account line reads "Account Number : X , Balance : Y , Currency : Z";
    // the balance is the second <strong> in it
    pub const BALANCE_ELEMENT: &str = "div.center strong.ng-binding:nth-of-type(2)";
    // The app reuses the .error class for the success message text
    pub const MESSAGE_ELEMENT: &str = ".error.ng-binding";
    pub const TRANSACTIONS_BTN: &str = "button[ng-click='transactions()']";
    pub const TRANSACTION_ROWS: &str = "table tbody tr";
    pub const LOGOUT_BTN: &str = "button[ng-click='byebye()']";
}

impl CustomerHomePage {
    pub fn new(session: Arc<BrowserSession>) -> Self {
        Self { session }
    }

    /// Return the welcome message text (the logged-in customer's name).
    pub async fn welcome_message(&self) -> Result<String, BrowserError> {
        let text = self.session.text(selectors::WELCOME_HEADING).await?;
        Ok(text.trim().to_string())
    }

    /// Click Deposit, fill the amount, submit.
    pub async fn deposit(&self, amount: i64) -> Result<(), BrowserError> {
        self.session.click(selectors::DEPOSIT_BTN).await?;
        self.session
            .fill(selectors::AMOUNT_INPUT, &amount.to_string())
            .await?;
        self.session.click(selectors::SUBMIT_AMOUNT_BTN).await
    }

    /// Click Withdrawl (site typo), fill the amount, submit.
    pub async fn withdraw(&self, amount: i64) -> Result<(), BrowserError> {
        self.session.click(selectors::WITHDRAWL_BTN).await?;
        self.session
            .fill(selectors::AMOUNT_INPUT, &amount.to_string())
            .await?;
        self.session.click(selectors::SUBMIT_AMOUNT_BTN).await
    }

    /// Return the current balance text from the balance display.
    ///
    /// When several accounts render a balance cell, the last one is the
    /// active/updated one.
    pub async fn balance_text(&self) -> Result<String, BrowserError> {
        let text = self.session.last_text(selectors::BALANCE_ELEMENT).await?;
        Ok(text.trim().to_string())
    }

    /// Return the visible message after a deposit/withdraw
    /// (e.g. "Deposit Successful", "Transaction successful").
    pub async fn message_text(&self) -> Result<String, BrowserError> {
        let text = self.session.text(selectors::MESSAGE_ELEMENT).await?;
        Ok(text.trim().to_string())
    }

    /// Open the transactions view and count its rows.
    pub async fn transaction_count(&self) -> Result<usize, BrowserError> {
        self.session.click(selectors::TRANSACTIONS_BTN).await?;
        self.session.count(selectors::TRANSACTION_ROWS).await
    }

    /// Click Logout.
    pub async fn logout(&self) -> Result<(), BrowserError> {
        self.session.click(selectors::LOGOUT_BTN).await
    }
}
