//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `StoreError` from `copydata_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::list_tables::ListTablesError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use copydata_core::storage::StoreError;

/// Errors raised before a response arrives, shared by every operation.
fn map_transport_error<E, R>(err: &SdkError<E, R>) -> Option<StoreError> {
    match err {
        SdkError::TimeoutError(_) => Some(StoreError::Transient("Request timed out".to_string())),
        SdkError::DispatchFailure(failure) => Some(StoreError::ConnectionFailed(format!(
            "Dispatch failed: {:?}",
            failure
        ))),
        _ => None,
    }
}

/// Map a Scan SDK error to StoreError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
    table: &str,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        ScanError::ResourceNotFoundException(_) => StoreError::TableNotFound(table.to_string()),
        ScanError::ProvisionedThroughputExceededException(_) => {
            StoreError::Throttled("Throughput exceeded, please retry".to_string())
        }
        ScanError::RequestLimitExceeded(_) => {
            StoreError::Throttled("Request limit exceeded, please retry".to_string())
        }
        ScanError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => StoreError::RequestFailed(format!("Scan failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to StoreError.
///
/// A failed `attribute_not_exists` condition means the key is already taken.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table: &str,
    key: impl Into<String>,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        PutItemError::ConditionalCheckFailedException(_) => StoreError::AlreadyExists(key.into()),
        PutItemError::ResourceNotFoundException(_) => StoreError::TableNotFound(table.to_string()),
        PutItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Throttled("Throughput exceeded, please retry".to_string())
        }
        PutItemError::RequestLimitExceeded(_) => {
            StoreError::Throttled("Request limit exceeded, please retry".to_string())
        }
        PutItemError::TransactionConflictException(_) => {
            StoreError::Transient("Transaction conflict, please retry".to_string())
        }
        PutItemError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            StoreError::RequestFailed("Item collection size limit exceeded".to_string())
        }
        err => StoreError::RequestFailed(format!("PutItem failed: {:?}", err)),
    }
}

/// Map a DeleteItem SDK error to StoreError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    table: &str,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => {
            StoreError::TableNotFound(table.to_string())
        }
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            StoreError::Throttled("Throughput exceeded, please retry".to_string())
        }
        DeleteItemError::RequestLimitExceeded(_) => {
            StoreError::Throttled("Request limit exceeded, please retry".to_string())
        }
        DeleteItemError::TransactionConflictException(_) => {
            StoreError::Transient("Transaction conflict, please retry".to_string())
        }
        DeleteItemError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => StoreError::RequestFailed(format!("DeleteItem failed: {:?}", err)),
    }
}

/// Map a ListTables SDK error to StoreError.
pub fn map_list_tables_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ListTablesError, R>,
) -> StoreError {
    if let Some(mapped) = map_transport_error(&err) {
        return mapped;
    }
    match err.into_service_error() {
        ListTablesError::InternalServerError(_) => {
            StoreError::Transient("DynamoDB internal server error".to_string())
        }
        err => StoreError::ConnectionFailed(format!("ListTables failed: {:?}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        ConditionalCheckFailedException, InternalServerError, ProvisionedThroughputExceededException,
        ResourceNotFoundException,
    };

    fn throughput_exceeded() -> ProvisionedThroughputExceededException {
        ProvisionedThroughputExceededException::builder()
            .message("Rate of requests exceeds the allowed throughput")
            .build()
    }

    fn internal_error() -> InternalServerError {
        InternalServerError::builder().message("Internal error").build()
    }

    #[test]
    fn test_throttled_scan_is_retryable() {
        let err = SdkError::service_error(
            ScanError::ProvisionedThroughputExceededException(throughput_exceeded()),
            (),
        );

        let mapped = map_scan_error(err, "prod-expenses");

        assert!(matches!(mapped, StoreError::Throttled(_)));
        assert!(mapped.is_retryable());
    }

    #[test]
    fn test_internal_error_is_retryable() {
        let scan = map_scan_error(
            SdkError::service_error(ScanError::InternalServerError(internal_error()), ()),
            "prod-expenses",
        );
        let delete = map_delete_item_error(
            SdkError::service_error(DeleteItemError::InternalServerError(internal_error()), ()),
            "dev-expenses",
        );

        assert!(matches!(scan, StoreError::Transient(_)));
        assert!(scan.is_retryable());
        assert!(delete.is_retryable());
    }

    #[test]
    fn test_missing_table_is_not_retryable() {
        let err = SdkError::service_error(
            ScanError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            ),
            (),
        );

        let mapped = map_scan_error(err, "prod-expenses");

        assert_eq!(mapped, StoreError::TableNotFound("prod-expenses".to_string()));
        assert!(!mapped.is_retryable());
    }

    #[test]
    fn test_failed_condition_means_already_exists() {
        let err = SdkError::service_error(
            PutItemError::ConditionalCheckFailedException(
                ConditionalCheckFailedException::builder()
                    .message("The conditional request failed")
                    .build(),
            ),
            (),
        );

        let mapped = map_put_item_error(err, "dev-expenses", "expenseId=e-1");

        assert_eq!(mapped, StoreError::AlreadyExists("expenseId=e-1".to_string()));
        assert!(!mapped.is_retryable());
    }

    #[test]
    fn test_throttled_put_is_retryable() {
        let err = SdkError::service_error(
            PutItemError::ProvisionedThroughputExceededException(throughput_exceeded()),
            (),
        );

        assert!(map_put_item_error(err, "dev-expenses", "expenseId=e-1").is_retryable());
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err: SdkError<ScanError, ()> = SdkError::timeout_error("Deadline elapsed");

        let mapped = map_scan_error(err, "prod-expenses");

        assert!(matches!(mapped, StoreError::Transient(_)));
        assert!(mapped.is_retryable());
    }
}
