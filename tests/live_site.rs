//! Live-site end-to-end scenarios against the XYZ Bank demo.
//!
//! These launch a real headless browser and talk to the public demo site, so
//! they are `#[ignore]`-gated. Run with:
//! `cargo test --test live_site -- --ignored`

use bank_lib::{BankConfig, BankingLibrary, FlowError};

fn library() -> BankingLibrary {
    BankingLibrary::new(BankConfig::default().with_env_overrides())
}

#[tokio::test]
#[ignore = "drives a real browser against the public demo site"]
async fn deposit_increases_balance_and_reports_success() {
    let mut bank = library();

    bank.navigate_to_login_page().await.unwrap();
    bank.login_as_customer("Harry Potter").await.unwrap();

    let welcome = bank.get_welcome_message().await.unwrap();
    assert!(welcome.contains("Harry"), "welcome was: {welcome:?}");

    let balance_before = bank.get_balance_number().await.unwrap();
    bank.deposit_amount(100).await.unwrap();

    let message = bank.get_message_text().await.unwrap();
    assert!(
        message.to_lowercase().contains("deposit successful"),
        "message was: {message:?}"
    );

    bank.wait_for_ui(1500).await.unwrap();
    let balance_after = bank.get_balance_number().await.unwrap();
    assert!(
        balance_after >= balance_before,
        "balance went from {balance_before} to {balance_after}"
    );

    bank.close_browser().await;
}

#[tokio::test]
#[ignore = "drives a real browser against the public demo site"]
async fn withdrawal_leaves_balance_non_negative() {
    let mut bank = library();

    bank.run_withdrawal_test_with_data("Harry Potter", 500, 200)
        .await
        .unwrap();

    let balance = bank.get_balance_number().await.unwrap();
    assert!(balance >= 0, "balance was {balance}");

    bank.close_browser().await;
}

#[tokio::test]
#[ignore = "drives a real browser against the public demo site"]
async fn add_customer_raises_exactly_one_success_alert() {
    let mut bank = library();

    bank.navigate_to_login_page().await.unwrap();
    bank.login_as_bank_manager().await.unwrap();

    let alert = bank
        .add_customer_and_accept_alert("Jane", "Doe", "12345")
        .await
        .unwrap();
    assert!(
        alert.contains("Customer added") || alert.to_lowercase().contains("success"),
        "alert was: {alert:?}"
    );

    bank.close_browser().await;
}

#[tokio::test]
#[ignore = "drives a real browser against the public demo site"]
async fn session_is_created_once_and_close_is_idempotent() {
    let mut bank = library();
    assert!(!bank.is_active());

    // First keyword call performs exactly one lazy initialization
    bank.open_bank_login_page().await.unwrap();
    assert!(bank.is_active());

    // Subsequent keywords reuse the session
    bank.navigate_to_login_page().await.unwrap();
    assert!(bank.is_active());

    // Teardown twice: no error, handles cleared, library sealed
    bank.close_browser().await;
    bank.close_browser().await;
    assert!(!bank.is_active());

    let err = bank.open_bank_login_page().await.unwrap_err();
    assert!(matches!(err, FlowError::SessionClosed));
}
