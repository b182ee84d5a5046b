mod api_tests;

use crate::core::models::batch::{Instruction, NewBatch, Payment};
use crate::core::services::ApprovalService;
use crate::infrastructure::cache::in_memory::InMemoryCache;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use chrono::{DateTime, TimeZone, Utc};

pub const TEST_SECRET: &str = "test-secret";

pub fn create_test_service() -> ApprovalService<InMemoryLogging, InMemoryStorage, InMemoryCache> {
    create_test_service_with_storage().0
}

/// Service plus a handle on its storage, for asserting on what was persisted.
pub fn create_test_service_with_storage() -> (
    ApprovalService<InMemoryLogging, InMemoryStorage, InMemoryCache>,
    InMemoryStorage,
) {
    let _ = env_logger::builder().is_test(true).try_init();
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let cache = InMemoryCache::new();
    let service = ApprovalService::new(storage.clone(), logging, cache, TEST_SECRET.to_string());
    (service, storage)
}

/// Two payments totalling 500 USD.
pub fn sample_batch(id: &str) -> NewBatch {
    NewBatch {
        id: id.to_string(),
        instruction: Instruction {
            payment_type: "Salary".to_string(),
            payment_currency: "USD".to_string(),
            debit_account: "ACC-001".to_string(),
            date: "2024-01-31".to_string(),
        },
        payments: vec![
            Payment {
                payee_name: "Bob".to_string(),
                amount: 200.0,
            },
            Payment {
                payee_name: "Carol".to_string(),
                amount: 300.0,
            },
        ],
        created_at: None,
    }
}

pub fn decision_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}
