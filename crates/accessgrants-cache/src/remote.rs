//! Remote call bookkeeping shared by the caches.

use accessgrants_core::ServiceError;
use accessgrants_telemetry::metrics::{record_remote_call, RemoteOutcome};

/// Operation label of `GetAccessGrantsInstanceForPrefix`.
pub(crate) const GET_INSTANCE_FOR_PREFIX: &str = "GetAccessGrantsInstanceForPrefix";

/// Operation label of `GetDataAccess`.
pub(crate) const GET_DATA_ACCESS: &str = "GetDataAccess";

/// Operation label of `HeadBucket`.
pub(crate) const HEAD_BUCKET: &str = "HeadBucket";

/// Records the outcome of a remote call and hands the result back.
pub(crate) fn observe<T>(
    operation: &'static str,
    result: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    let outcome = match &result {
        Ok(_) => RemoteOutcome::Ok,
        Err(error) if error.is_access_denied() => RemoteOutcome::Denied,
        Err(_) => RemoteOutcome::Error,
    };
    record_remote_call(operation, outcome);
    result
}
