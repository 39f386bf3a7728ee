//! Test-flow orchestration for the XYZ Bank demo
//!
//! `BankingLibrary` is the keyword surface a test suite drives: it owns the
//! one browser session per suite (created lazily, torn down explicitly),
//! wires the page objects to it, and sequences the composite
//! login -> act -> verify flows.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::browser::{BrowserError, BrowserSession, LaunchOptions};
use crate::data::{AddCustomerRow, DepositRow, TestData, WithdrawalRow};
use crate::pages::{CustomerHomePage, LoginPage, ManagerPage};
use crate::BankConfig;

/// Fixed delay letting the UI settle between an action and its assertion
pub const UI_SETTLE_MS: u64 = 1500;

/// How long to wait for the add-customer alert to open
const DIALOG_TIMEOUT_SECS: u64 = 10;

/// Test-flow errors
#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("Test data error: {0}")]
    Data(String),

    #[error("Could not parse balance from: {0:?}")]
    BalanceParse(String),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Browser session already closed; create a new library instance")]
    SessionClosed,
}

/// Parse a balance display text into a number.
///
/// Strips thousands-separator commas, then takes the first contiguous run of
/// digits. Text with no digits is a parse error.
pub fn parse_balance(text: &str) -> Result<i64, FlowError> {
    let cleaned = text.replace(',', "");
    let digits: String = cleaned
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return Err(FlowError::BalanceParse(text.to_string()));
    }
    digits
        .parse()
        .map_err(|_| FlowError::BalanceParse(text.to_string()))
}

/// Deposit success message check (case-insensitive).
pub fn deposit_message_ok(message: &str) -> bool {
    message.to_lowercase().contains("deposit successful")
}

/// Withdraw success message check.
///
/// An empty message is accepted (the app sometimes clears it before the
/// read); otherwise one of the known success texts must match.
pub fn withdraw_message_ok(message: &str) -> bool {
    message.is_empty()
        || message.to_lowercase().contains("transaction successful")
        || message.contains("Withdraw")
}

/// Add-customer alert text check (case-insensitive on "success").
pub fn customer_added_ok(alert_message: &str) -> bool {
    alert_message.contains("Customer added") || alert_message.to_lowercase().contains("success")
}

/// The live half of the facade: session plus the page objects bound to it.
struct ActiveSession {
    session: Arc<BrowserSession>,
    login: LoginPage,
    home: CustomerHomePage,
    manager: ManagerPage,
}

/// Session lifecycle. There is no Closed -> Active transition; a closed
/// library stays closed.
enum LibraryState {
    Uninitialized,
    Active(ActiveSession),
    Closed,
}

/// Keyword library for XYZ Bank automation. One browser per suite.
pub struct BankingLibrary {
    config: BankConfig,
    state: LibraryState,
}

impl BankingLibrary {
    /// Create a library with the given configuration. No browser is
    /// launched until the first keyword that needs the page.
    pub fn new(config: BankConfig) -> Self {
        Self {
            config,
            state: LibraryState::Uninitialized,
        }
    }

    /// Whether a browser session is currently live.
    pub fn is_active(&self) -> bool {
        matches!(self.state, LibraryState::Active(_))
    }

    /// Lazily create the session on first use; reuse it afterwards.
    async fn ensure_session(&mut self) -> Result<&ActiveSession, FlowError> {
        match self.state {
            LibraryState::Closed => return Err(FlowError::SessionClosed),
            LibraryState::Active(_) => {}
            LibraryState::Uninitialized => {
                let options = LaunchOptions::default().headless(self.config.headless);
                let session = Arc::new(BrowserSession::launch(self.config.browser, options).await?);
                session.goto(&self.config.base_url).await?;
                let active = ActiveSession {
                    login: LoginPage::new(session.clone(), &self.config.base_url),
                    home: CustomerHomePage::new(session.clone()),
                    manager: ManagerPage::new(session.clone()),
                    session,
                };
                self.state = LibraryState::Active(active);
            }
        }
        match &self.state {
            LibraryState::Active(active) => Ok(active),
            _ => Err(FlowError::SessionClosed),
        }
    }

    // ========== Keyword surface ==========

    /// Open the bank login page (launches the browser on first call).
    pub async fn open_bank_login_page(&mut self) -> Result<(), FlowError> {
        self.ensure_session().await?;
        Ok(())
    }

    /// Navigate (back) to the login page.
    pub async fn navigate_to_login_page(&mut self) -> Result<(), FlowError> {
        let base_url = self.config.base_url.clone();
        let active = self.ensure_session().await?;
        active.session.goto(&base_url).await?;
        Ok(())
    }

    /// Login as a customer selected by visible name.
    pub async fn login_as_customer(&mut self, customer_name: &str) -> Result<(), FlowError> {
        let active = self.ensure_session().await?;
        active.login.login_as_customer(customer_name).await?;
        Ok(())
    }

    /// Login as the bank manager.
    pub async fn login_as_bank_manager(&mut self) -> Result<(), FlowError> {
        let active = self.ensure_session().await?;
        active.login.login_as_bank_manager().await?;
        Ok(())
    }

    /// Get the welcome message shown after customer login.
    pub async fn get_welcome_message(&mut self) -> Result<String, FlowError> {
        let active = self.ensure_session().await?;
        Ok(active.home.welcome_message().await?)
    }

    /// Deposit an amount into the current account.
    pub async fn deposit_amount(&mut self, amount: i64) -> Result<(), FlowError> {
        let active = self.ensure_session().await?;
        active.home.deposit(amount).await?;
        Ok(())
    }

    /// Withdraw an amount from the current account.
    pub async fn withdraw_amount(&mut self, amount: i64) -> Result<(), FlowError> {
        let active = self.ensure_session().await?;
        active.home.withdraw(amount).await?;
        Ok(())
    }

    /// Get the raw balance display text.
    pub async fn get_balance_text(&mut self) -> Result<String, FlowError> {
        let active = self.ensure_session().await?;
        Ok(active.home.balance_text().await?)
    }

    /// Get the balance as a number (always re-read from the live page).
    pub async fn get_balance_number(&mut self) -> Result<i64, FlowError> {
        let text = self.get_balance_text().await?;
        parse_balance(&text)
    }

    /// Get the message shown after a deposit/withdraw.
    pub async fn get_message_text(&mut self) -> Result<String, FlowError> {
        let active = self.ensure_session().await?;
        Ok(active.home.message_text().await?)
    }

    /// Fixed wait letting the UI settle.
    pub async fn wait_for_ui(&mut self, milliseconds: u64) -> Result<(), FlowError> {
        let active = self.ensure_session().await?;
        active.session.wait_millis(milliseconds).await;
        Ok(())
    }

    /// Assert the deposit success message is shown.
    pub async fn verify_deposit_successful(&mut self) -> Result<(), FlowError> {
        let message = self.get_message_text().await?;
        if !deposit_message_ok(&message) {
            return Err(FlowError::Assertion(format!(
                "Expected deposit success message, got: {message:?}"
            )));
        }
        Ok(())
    }

    /// Assert the message after a withdraw is empty or one of the accepted texts.
    pub async fn verify_withdraw_success_message(&mut self) -> Result<(), FlowError> {
        let message = self.get_message_text().await?;
        if !withdraw_message_ok(&message) {
            return Err(FlowError::Assertion(format!(
                "Unexpected message after withdraw: {message:?}"
            )));
        }
        Ok(())
    }

    /// Fill and submit the Add Customer form (no dialog handling).
    pub async fn add_customer(
        &mut self,
        first_name: &str,
        last_name: &str,
        post_code: &str,
    ) -> Result<(), FlowError> {
        let active = self.ensure_session().await?;
        active
            .manager
            .add_customer(first_name, last_name, post_code)
            .await?;
        Ok(())
    }

    /// Add a customer while capturing the success alert.
    ///
    /// The dialog is auto-accepted; its message is returned. Missing dialog
    /// is an assertion failure, matching the flow's contract of exactly one
    /// alert per submission.
    pub async fn add_customer_and_accept_alert(
        &mut self,
        first_name: &str,
        last_name: &str,
        post_code: &str,
    ) -> Result<String, FlowError> {
        let active = self.ensure_session().await?;
        let watcher = active.session.watch_dialog().await?;
        active
            .manager
            .add_customer(first_name, last_name, post_code)
            .await?;
        watcher
            .message(Duration::from_secs(DIALOG_TIMEOUT_SECS))
            .await
            .map_err(|_| FlowError::Assertion("Expected one alert after Add Customer".into()))
    }

    /// Assert an add-customer alert text reports success.
    pub fn verify_customer_added_alert(&self, alert_message: &str) -> Result<(), FlowError> {
        if !customer_added_ok(alert_message) {
            return Err(FlowError::Assertion(format!(
                "Expected success in alert, got: {alert_message:?}"
            )));
        }
        Ok(())
    }

    /// Open an account for a customer with the given currency.
    pub async fn open_account(
        &mut self,
        customer_name: &str,
        currency: &str,
    ) -> Result<(), FlowError> {
        let active = self.ensure_session().await?;
        active.manager.open_account(customer_name, currency).await?;
        Ok(())
    }

    /// Open the transactions view and count its rows.
    pub async fn get_transaction_count(&mut self) -> Result<usize, FlowError> {
        let active = self.ensure_session().await?;
        Ok(active.home.transaction_count().await?)
    }

    /// Log the current customer out.
    pub async fn logout(&mut self) -> Result<(), FlowError> {
        let active = self.ensure_session().await?;
        active.home.logout().await?;
        Ok(())
    }

    // ========== Test data getters ==========

    /// Load the deposit rows from a test-data file.
    pub fn get_deposit_test_data(file_path: &str) -> Result<Vec<DepositRow>, FlowError> {
        Ok(TestData::load(file_path)?.customer_deposits)
    }

    /// Load the withdrawal rows from a test-data file.
    pub fn get_withdrawal_test_data(file_path: &str) -> Result<Vec<WithdrawalRow>, FlowError> {
        Ok(TestData::load(file_path)?.customer_withdrawals)
    }

    /// Load the add-customer rows from a test-data file.
    pub fn get_add_customer_test_data(file_path: &str) -> Result<Vec<AddCustomerRow>, FlowError> {
        Ok(TestData::load(file_path)?.manager_add_customers)
    }

    // ========== Composite flows ==========

    /// Execute one deposit flow: navigate to login, login as customer,
    /// deposit the amount, verify message and balance.
    pub async fn run_deposit_test_with_data(
        &mut self,
        customer_name: &str,
        amount: i64,
    ) -> Result<(), FlowError> {
        info!("Running deposit test: {} deposits {}", customer_name, amount);
        self.navigate_to_login_page().await?;
        self.login_as_customer(customer_name).await?;

        let welcome = self.get_welcome_message().await?;
        if let Some(first_name) = customer_name.split_whitespace().next() {
            if !welcome.contains(first_name) {
                return Err(FlowError::Assertion(format!(
                    "Welcome should contain customer name, got: {welcome:?}"
                )));
            }
        }

        let balance_before = self.get_balance_number().await?;
        self.deposit_amount(amount).await?;
        self.verify_deposit_successful().await?;
        self.wait_for_ui(UI_SETTLE_MS).await?;
        let balance_after = self.get_balance_number().await?;
        if balance_after < balance_before {
            return Err(FlowError::Assertion(format!(
                "Balance should not decrease after deposit: was {balance_before}, got {balance_after}"
            )));
        }
        Ok(())
    }

    /// Execute one withdrawal flow: login, deposit, withdraw, verify message
    /// and balance.
    pub async fn run_withdrawal_test_with_data(
        &mut self,
        customer_name: &str,
        deposit_amount: i64,
        withdraw_amount: i64,
    ) -> Result<(), FlowError> {
        info!(
            "Running withdrawal test: {} deposits {} then withdraws {}",
            customer_name, deposit_amount, withdraw_amount
        );
        self.navigate_to_login_page().await?;
        self.login_as_customer(customer_name).await?;
        self.deposit_amount(deposit_amount).await?;
        self.wait_for_ui(UI_SETTLE_MS).await?;
        self.withdraw_amount(withdraw_amount).await?;
        self.wait_for_ui(UI_SETTLE_MS).await?;
        self.verify_withdraw_success_message().await?;
        let balance = self.get_balance_number().await?;
        if balance < 0 {
            return Err(FlowError::Assertion(format!(
                "Balance should be non-negative, got {balance}"
            )));
        }
        Ok(())
    }

    /// Execute one add-customer flow: login as manager, add customer, accept
    /// the alert, verify success.
    pub async fn run_add_customer_test_with_data(
        &mut self,
        first_name: &str,
        last_name: &str,
        post_code: &str,
    ) -> Result<(), FlowError> {
        info!("Running add-customer test: {} {}", first_name, last_name);
        self.navigate_to_login_page().await?;
        self.login_as_bank_manager().await?;
        let alert_message = self
            .add_customer_and_accept_alert(first_name, last_name, post_code)
            .await?;
        self.verify_customer_added_alert(&alert_message)
    }

    /// Close the browser session (suite teardown).
    ///
    /// Idempotent - closing twice is a no-op. After close the library is
    /// unusable; there is no Closed -> Active transition.
    pub async fn close_browser(&mut self) {
        if let LibraryState::Active(active) = std::mem::replace(&mut self.state, LibraryState::Closed)
        {
            active.session.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance_plain() {
        assert_eq!(parse_balance("1000").unwrap(), 1000);
    }

    #[test]
    fn test_parse_balance_with_label_and_commas() {
        assert_eq!(parse_balance("Balance : 1,234").unwrap(), 1234);
    }

    #[test]
    fn test_parse_balance_first_digit_run_wins() {
        assert_eq!(parse_balance("12 and then 34").unwrap(), 12);
    }

    #[test]
    fn test_parse_balance_no_digits_is_error() {
        let err = parse_balance("Balance : pending").unwrap_err();
        assert!(matches!(err, FlowError::BalanceParse(_)));
    }

    #[test]
    fn test_deposit_message_matcher() {
        assert!(deposit_message_ok("Deposit Successful"));
        assert!(deposit_message_ok("deposit successful!"));
        assert!(!deposit_message_ok("Transaction Failed"));
        assert!(!deposit_message_ok(""));
    }

    #[test]
    fn test_withdraw_message_matcher() {
        assert!(withdraw_message_ok(""));
        assert!(withdraw_message_ok("Transaction successful"));
        assert!(withdraw_message_ok("TRANSACTION SUCCESSFUL"));
        assert!(withdraw_message_ok("Withdraw done"));
        assert!(!withdraw_message_ok("Transaction Failed. You can not withdraw amount more than the balance."));
    }

    #[test]
    fn test_customer_added_matcher() {
        assert!(customer_added_ok(
            "Customer added successfully with customer id :6"
        ));
        assert!(customer_added_ok("Operation was a SUCCESS"));
        assert!(!customer_added_ok("Please check the details"));
    }

    #[test]
    fn test_library_starts_uninitialized() {
        let library = BankingLibrary::new(BankConfig::default());
        assert!(!library.is_active());
    }

    #[tokio::test]
    async fn test_close_before_init_is_a_noop_and_seals_the_library() {
        let mut library = BankingLibrary::new(BankConfig::default());
        library.close_browser().await;
        library.close_browser().await; // second close is a no-op too

        let err = library.open_bank_login_page().await.unwrap_err();
        assert!(matches!(err, FlowError::SessionClosed));
    }
}
