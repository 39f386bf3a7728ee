//! Tabular test data loaded from a JSON document
//!
//! The document carries one named array per scenario family; arrays the file
//! does not mention default to empty. Rows are immutable once loaded and
//! consumed once per test iteration.

use std::path::Path;

use serde::Deserialize;

use crate::library::FlowError;

/// One deposit scenario row
#[derive(Debug, Clone, Deserialize)]
pub struct DepositRow {
    pub customer_name: String,
    pub amount: i64,
}

/// One withdrawal scenario row
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRow {
    pub customer_name: String,
    pub deposit_amount: i64,
    pub withdraw_amount: i64,
}

/// One add-customer scenario row
#[derive(Debug, Clone, Deserialize)]
pub struct AddCustomerRow {
    pub first_name: String,
    pub last_name: String,
    pub post_code: String,
}

/// The whole test-data document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestData {
    #[serde(default)]
    pub customer_deposits: Vec<DepositRow>,
    #[serde(default)]
    pub customer_withdrawals: Vec<WithdrawalRow>,
    #[serde(default)]
    pub manager_add_customers: Vec<AddCustomerRow>,
}

impl TestData {
    /// Load the document from a JSON file.
    pub fn load(file_path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let path = file_path.as_ref();
        if !path.is_file() {
            return Err(FlowError::Data(format!(
                "Test data file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| FlowError::Data(format!("Failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| FlowError::Data(format!("Malformed test data in {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_full_document() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "customer_deposits": [
                    {{"customer_name": "Harry Potter", "amount": 100}}
                ],
                "customer_withdrawals": [
                    {{"customer_name": "Harry Potter", "deposit_amount": 500, "withdraw_amount": 200}}
                ],
                "manager_add_customers": [
                    {{"first_name": "Jane", "last_name": "Doe", "post_code": "12345"}}
                ]
            }}"#
        )
        .unwrap();

        let data = TestData::load(file.path()).unwrap();
        assert_eq!(data.customer_deposits.len(), 1);
        assert_eq!(data.customer_deposits[0].customer_name, "Harry Potter");
        assert_eq!(data.customer_deposits[0].amount, 100);
        assert_eq!(data.customer_withdrawals[0].deposit_amount, 500);
        assert_eq!(data.customer_withdrawals[0].withdraw_amount, 200);
        assert_eq!(data.manager_add_customers[0].post_code, "12345");
    }

    #[test]
    fn test_load_missing_arrays_default_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"customer_deposits": []}}"#).unwrap();

        let data = TestData::load(file.path()).unwrap();
        assert!(data.customer_deposits.is_empty());
        assert!(data.customer_withdrawals.is_empty());
        assert!(data.manager_add_customers.is_empty());
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = TestData::load("/no/such/test_data.json").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("not found"), "got: {message}");
        assert!(message.contains("test_data.json"), "got: {message}");
    }

    #[test]
    fn test_load_malformed_json_is_data_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = TestData::load(file.path()).unwrap_err();
        assert!(matches!(err, FlowError::Data(_)));
    }
}
