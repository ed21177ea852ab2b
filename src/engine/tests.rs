use super::{DealImporter, ImporterConfig};

use anyhow::{anyhow, Result};
use chrono::{Duration, Local};
use rust_decimal::Decimal;
use std::io;
use std::str::FromStr;
use std::sync::Arc;

use crate::ingest::{IngestError, Upload};
use crate::models::{DealRecord, ErrorClassification, ImportSummary, StoredDeal, ValidDeal};
use crate::storage::{DealStorage, DealStore, ErrorLog, StorageError};
use crate::types::CurrencyTable;
use crate::validation::ValidationError;

const HEADER: &str = "deal_id,currency_from,currency_to,timestamp,amount";

/// Store whose writes always fail, for exercising the unknown-failure path.
struct UnavailableStore;

impl DealStore for UnavailableStore {
    fn exists(&self, _deal_id: &str) -> Result<bool, StorageError> {
        Ok(false)
    }

    fn insert(&self, _deal: ValidDeal) -> Result<StoredDeal, StorageError> {
        Err(StorageError::Io(io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused by db-primary:5432")))
    }

    fn get(&self, deal_id: &str) -> Result<StoredDeal, StorageError> {
        Err(StorageError::not_found(deal_id))
    }

    fn list_all(&self) -> Result<Vec<StoredDeal>, StorageError> {
        Ok(Vec::new())
    }
}

fn importer() -> (DealImporter<DealStorage, ErrorLog>, Arc<DealStorage>, Arc<ErrorLog>) {
    let storage = Arc::new(DealStorage::new());
    let errors = Arc::new(ErrorLog::new());

    (DealImporter::new(storage.clone(), errors.clone()), storage, errors)
}

fn deal(deal_id: &str, from: &str, to: &str) -> Result<DealRecord> {
    Ok(DealRecord {
        deal_id: Some(deal_id.to_string()),
        currency_from: Some(from.to_string()),
        currency_to: Some(to.to_string()),
        timestamp: Some(Local::now().naive_local()),
        amount: Some(Decimal::from_str("10000.50")?),
        exchange_rate: Some(0.85)
    })
}

fn csv_upload(rows: &[&str]) -> Upload {
    let mut content = String::from(HEADER);

    for row in rows {
        content.push('\n');
        content.push_str(row);
    }

    Upload::new(content, Some("text/csv"))
}

#[test]
fn test_single_valid_deal_is_imported() -> Result<()> {
    let (importer, storage, errors) = importer();

    let summary = importer.import_deal(deal("DEAL-001", "USD", "EUR")?);

    assert_eq!(summary.total_records, 1);
    assert_eq!(summary.successful_imports, 1);
    assert_eq!(summary.failed_imports, 0);
    assert_eq!(summary.duplicate_imports, 0);
    assert!(summary.errors.is_empty());
    assert!(errors.entries().is_empty());
    assert!(storage.exists("DEAL-001")?);

    Ok(())
}

#[test]
fn test_single_deal_requires_exchange_rate() -> Result<()> {
    let (importer, _, _) = importer();
    let without_rate = DealRecord { exchange_rate: None, ..deal("DEAL-001", "USD", "EUR")? };

    let summary = importer.import_deal(without_rate);

    assert_eq!(summary.failed_imports, 1);
    assert_eq!(summary.errors[0].error_message, "Exchange rate is required");

    Ok(())
}

#[test]
fn test_mixed_batch_classifies_every_record() -> Result<()> {
    let (importer, _, errors) = importer();
    importer.import_deal(deal("DEAL-003", "USD", "EUR")?);

    let summary = importer.import_deals(vec![
        deal("DEAL-001", "USD", "EUR")?,
        deal("DEAL-002", "USD", "ABC")?,
        deal("DEAL-003", "USD", "EUR")?,
        deal("DEAL-004", "GBP", "JPY")?,
    ]);

    assert_eq!(summary.total_records, 4);
    assert_eq!(summary.successful_imports, 2);
    assert_eq!(summary.failed_imports, 1);
    assert_eq!(summary.duplicate_imports, 1);
    assert!(summary.is_consistent());

    assert_eq!(summary.errors[0].row_number, Some(2));
    assert_eq!(summary.errors[0].error_type, ErrorClassification::Validation);
    assert_eq!(summary.errors[1].row_number, Some(3));
    assert_eq!(summary.errors[1].error_type, ErrorClassification::Duplicate);
    assert_eq!(summary.errors[1].error_message, "Deal with ID 'DEAL-003' already exists");

    let recorded = errors.entries();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].deal_id.as_deref(), Some("DEAL-002"));
    assert_eq!(recorded[0].error_type, ErrorClassification::Validation);
    assert_eq!(recorded[1].error_type, ErrorClassification::Duplicate);

    Ok(())
}

#[test]
fn test_duplicates_within_one_batch_are_detected() -> Result<()> {
    let (importer, storage, _) = importer();

    let summary = importer.import_deals(vec![
        deal("DEAL-001", "USD", "EUR")?,
        deal("DEAL-001", "GBP", "JPY")?,
    ]);

    assert_eq!(summary.successful_imports, 1);
    assert_eq!(summary.duplicate_imports, 1);
    assert_eq!(summary.errors[0].row_number, Some(2));
    assert_eq!(storage.get("DEAL-001")?.deal.currency_from, "USD");

    Ok(())
}

#[test]
fn test_resubmitted_deal_is_always_rejected_as_duplicate() -> Result<()> {
    let (importer, storage, _) = importer();
    importer.import_deal(deal("DEAL-001", "USD", "EUR")?);

    for _ in 0..3 {
        let summary = importer.import_deal(deal("DEAL-001", "USD", "EUR")?);
        assert_eq!(summary.duplicate_imports, 1);
        assert_eq!(summary.successful_imports, 0);
    }

    assert_eq!(storage.len(), 1);

    Ok(())
}

#[test]
fn test_unknown_failures_hide_details_from_the_caller_but_not_the_audit_log() -> Result<()> {
    let errors = Arc::new(ErrorLog::new());
    let importer = DealImporter::new(Arc::new(UnavailableStore), errors.clone());

    let summary = importer.import_deals(vec![
        deal("DEAL-001", "USD", "EUR")?,
        deal("DEAL-002", "USD", "EUR")?,
    ]);

    assert_eq!(summary.total_records, 2);
    assert_eq!(summary.failed_imports, 2);
    assert!(summary.errors.iter().all(|entry| entry.error_message == "internal error"));
    assert!(summary.errors.iter().all(|entry| entry.error_type == ErrorClassification::Unknown));

    let recorded = errors.entries();
    assert_eq!(recorded.len(), 2);
    assert!(recorded[0].error_message.contains("connection refused"));

    Ok(())
}

#[test]
fn test_internal_error_message_is_configurable() -> Result<()> {
    let config = ImporterConfig {
        internal_error_message: "please retry later".to_string(),
        ..ImporterConfig::default()
    };
    let importer = DealImporter::new(Arc::new(UnavailableStore), Arc::new(ErrorLog::new())).with_config(config);

    let summary = importer.import_deal(deal("DEAL-001", "USD", "EUR")?);

    assert_eq!(summary.errors[0].error_message, "please retry later");

    Ok(())
}

#[test]
fn test_future_skew_is_configurable() -> Result<()> {
    let config = ImporterConfig {
        max_future_skew: Duration::days(3),
        ..ImporterConfig::default()
    };
    let (importer, _, _) = importer();
    let importer = importer.with_config(config);
    let ahead = DealRecord { timestamp: Some(Local::now().naive_local() + Duration::days(2)), ..deal("DEAL-001", "USD", "EUR")? };

    assert_eq!(importer.import_deal(ahead).successful_imports, 1);

    Ok(())
}

#[test]
fn test_currency_table_can_be_replaced() -> Result<()> {
    let (importer, _, _) = importer();
    let importer = importer.with_currency_table(Arc::new(CurrencyTable::from_codes(["USD", "XAU"])));

    let summary = importer.import_deals(vec![
        deal("DEAL-001", "USD", "XAU")?,
        deal("DEAL-002", "USD", "EUR")?,
    ]);

    assert_eq!(summary.successful_imports, 1);
    assert_eq!(summary.errors[0].error_message, "To currency 'EUR' is not a valid ISO 4217 currency code");

    Ok(())
}

#[test]
fn test_csv_upload_counts_short_rows_but_not_blank_rows() -> Result<()> {
    let (importer, _, errors) = importer();

    let summary = importer.upload_csv(&csv_upload(&[
        "DEAL-001,USD,EUR,2024-01-15T10:30:00,100.00",
        " , , , , ",
        "DEAL-003,USD,EUR",
    ]))?;

    assert_eq!(summary.total_records, 2);
    assert_eq!(summary.successful_imports, 1);
    assert_eq!(summary.failed_imports, 1);
    assert_eq!(summary.errors[0].row_number, Some(3));
    assert_eq!(summary.errors[0].deal_id.as_deref(), Some("DEAL-003"));
    assert_eq!(summary.errors[0].error_type, ErrorClassification::Validation);
    assert_eq!(summary.errors[0].error_message, "Row must contain at least 5 columns. Found: 3");
    assert_eq!(errors.entries()[0].row_number, Some(3));

    Ok(())
}

#[test]
fn test_csv_upload_reports_malformed_fields_precisely() -> Result<()> {
    let (importer, _, _) = importer();

    let summary = importer.upload_csv(&csv_upload(&[
        "DEAL-001,USD,EUR,2024-01-15T10:30:00,ten",
        "DEAL-002,usd,eur,2024/01/15 10:30:00,12.5",
        "DEAL-003,USD,EUR,2024-01-15T10:30:00,1.12345",
    ]))?;

    assert_eq!(summary.successful_imports, 1);
    assert_eq!(summary.failed_imports, 2);
    assert_eq!(summary.errors[0].error_message, "Invalid amount format: ten at row 1");
    assert_eq!(summary.errors[1].error_message, "Deal amount cannot have more than 4 decimal places");

    Ok(())
}

#[test]
fn test_csv_deals_persist_without_exchange_rate() -> Result<()> {
    let (importer, _, _) = importer();

    importer.upload_csv(&csv_upload(&["DEAL-001,USD,EUR,2024-01-15 10:30:00,0.0001"]))?;

    let stored = importer.get_deal("DEAL-001")?;
    assert_eq!(stored.deal.exchange_rate, None);
    assert_eq!(stored.deal.amount, Decimal::from_str("0.0001")?);

    Ok(())
}

#[test]
fn test_empty_upload_is_rejected_without_summary() {
    let (importer, _, errors) = importer();

    let result = importer.upload_csv(&Upload::new(Vec::<u8>::new(), Some("text/csv")));

    assert!(matches!(result, Err(IngestError::InvalidFile(_))));
    assert!(errors.entries().is_empty());
}

#[test]
fn test_unclosed_quote_rejects_whole_upload() {
    let (importer, storage, errors) = importer();

    let result = importer.upload_csv(&csv_upload(&[
        "DEAL-001,\"USD,EUR,2024-01-15T10:30:00,1",
        "DEAL-002,USD,EUR,2024-01-15T10:30:00,2",
        "DEAL-003,USD,EUR,2024-01-15T10:30:00,3",
    ]));

    assert!(matches!(result, Err(IngestError::UnclosedQuote { .. })));
    assert_eq!(storage.len(), 0);
    assert!(errors.entries().is_empty());
}

#[test]
fn test_json_amount_scale_is_checked_as_written() -> Result<()> {
    let (importer, storage, _) = importer();
    let deals: Vec<DealRecord> = serde_json::from_str(r#"[
        { "dealId": "DEAL-001", "currencyFrom": "USD", "currencyTo": "EUR",
          "dealTimestamp": "2024-01-15T10:30:00", "dealAmount": 1.00000, "exchangeRate": 0.85 },
        { "dealId": "DEAL-002", "currencyFrom": "USD", "currencyTo": "EUR",
          "dealTimestamp": "2024-01-15T10:30:00", "dealAmount": 123456789012345.1234, "exchangeRate": 0.85 }
    ]"#)?;

    let summary = importer.import_deals(deals);

    assert_eq!(summary.successful_imports, 1);
    assert_eq!(summary.errors[0].deal_id.as_deref(), Some("DEAL-001"));
    assert_eq!(summary.errors[0].error_message, ValidationError::TooManyDecimalPlaces { max: 4 }.to_string());
    assert_eq!(storage.get("DEAL-002")?.deal.amount, Decimal::from_str("123456789012345.1234")?);

    Ok(())
}

#[test]
fn test_wrong_content_type_is_rejected() {
    let (importer, _, _) = importer();

    let result = importer.upload_csv(&Upload::new(format!("{HEADER}\n"), Some("application/pdf")));

    assert!(matches!(result, Err(IngestError::InvalidFile(_))));
}

#[test]
fn test_error_records_follow_row_order() -> Result<()> {
    let (importer, _, errors) = importer();

    importer.upload_csv(&csv_upload(&[
        "DEAL-001,USD,USD,2024-01-15T10:30:00,1",
        "DEAL-002,USD,EUR,2024-01-15T10:30:00,1",
        "DEAL-003,USD,EUR,bad,1",
        "DEAL-002,USD,EUR,2024-01-15T10:30:00,1",
        "DEAL-005,USD,EUR,2024-01-15T10:30:00,0",
    ]))?;

    let rows: Vec<_> = errors.entries().iter().filter_map(|entry| entry.row_number).collect();

    assert_eq!(rows, vec![1, 3, 4, 5]);
    assert!(rows.windows(2).all(|pair| pair[0] <= pair[1]));

    Ok(())
}

#[test]
fn test_get_and_list_deals() -> Result<()> {
    let (importer, _, _) = importer();
    let original = deal("DEAL-001", "USD", "EUR")?;

    importer.import_deals(vec![original.clone(), deal("DEAL-002", "EUR", "CHF")?]);

    let stored = importer.get_deal("DEAL-001")?;
    assert_eq!(Some(stored.deal.deal_id.clone()), original.deal_id);
    assert_eq!(Some(stored.deal.amount), original.amount);
    assert_eq!(Some(stored.deal.timestamp), original.timestamp);
    assert_eq!(stored.deal.exchange_rate, original.exchange_rate);

    assert_eq!(importer.list_deals()?.len(), 2);
    assert!(matches!(importer.get_deal("DEAL-404"), Err(StorageError::NotFound { .. })));

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_batches_store_each_deal_once() -> Result<()> {
    let storage = Arc::new(DealStorage::new());
    let errors = Arc::new(ErrorLog::new());
    let importer = Arc::new(DealImporter::new(storage.clone(), errors.clone()));

    let handles: Vec<_> = (0..4).map(|_| {
        let importer = importer.clone();
        tokio::task::spawn_blocking(move || -> Result<ImportSummary> {
            Ok(importer.import_deals(vec![
                deal("DEAL-A", "USD", "EUR")?,
                deal("DEAL-B", "GBP", "JPY")?,
            ]))
        })
    }).collect();

    let mut successes = 0;
    let mut duplicates = 0;

    for handle in handles {
        let summary = handle.await.map_err(|error| anyhow!("import task failed: {error}"))??;
        assert!(summary.is_consistent());
        successes += summary.successful_imports;
        duplicates += summary.duplicate_imports;
    }

    assert_eq!(successes, 2);
    assert_eq!(duplicates, 6);
    assert_eq!(storage.len(), 2);
    assert_eq!(errors.entries().len(), 6);

    Ok(())
}
