//! S3 operation to Access Grants permission mapping.

use accessgrants_core::{AccessGrantsError, AccessGrantsResult, Permission};

/// Permission Access Grants must vend for an S3 operation.
///
/// Operation names are matched case-insensitively. Operations Access Grants
/// cannot authorize fail with [`AccessGrantsError::UnsupportedOperation`].
///
/// ```
/// use accessgrants::operation::permission_for_operation;
/// use accessgrants_core::Permission;
///
/// assert_eq!(permission_for_operation("GetObject").unwrap(), Permission::Read);
/// assert_eq!(permission_for_operation("copyobject").unwrap(), Permission::ReadWrite);
/// assert!(permission_for_operation("CreateBucket").is_err());
/// ```
pub fn permission_for_operation(operation: &str) -> AccessGrantsResult<Permission> {
    match operation.to_ascii_uppercase().as_str() {
        "HEADOBJECT" | "GETOBJECT" | "GETOBJECTACL" | "GETOBJECTATTRIBUTES" | "HEADBUCKET"
        | "LISTMULTIPARTUPLOADS" | "LISTOBJECTS" | "LISTOBJECTSV2" | "LISTOBJECTVERSIONS"
        | "LISTPARTS" => Ok(Permission::Read),
        "PUTOBJECT" | "PUTOBJECTACL" | "DELETEOBJECT" | "DELETEOBJECTS"
        | "ABORTMULTIPARTUPLOAD" | "CREATEMULTIPARTUPLOAD" | "UPLOADPART"
        | "COMPLETEMULTIPARTUPLOAD" => Ok(Permission::Write),
        "COPYOBJECT" => Ok(Permission::ReadWrite),
        _ => Err(AccessGrantsError::unsupported_operation(operation)),
    }
}
