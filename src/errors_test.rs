use super::*;

#[test]
fn test_error_fatal() {
    let err = Error::Fatal("critical failure".to_string());
    assert_eq!(err.to_string(), "Fatal error: critical failure");
}

#[test]
fn test_storage_error_converts_into_system_error() {
    let err: Error = StorageError::VersionNotSet.into();
    assert!(matches!(
        err,
        Error::System(SystemError::Storage(StorageError::VersionNotSet))
    ));
    assert_eq!(err.to_string(), "Signal store has no active database version");
}

#[test]
fn test_blobstore_unexpected_status_message() {
    let err = BlobstoreError::UnexpectedStatus {
        uri: "http://blobs/blobs".to_string(),
        status: 503,
    };
    let msg = err.to_string();
    assert!(msg.contains("http://blobs/blobs"));
    assert!(msg.contains("503"));
}

#[test]
fn test_request_error_invalid_block() {
    let err: Error = RequestError::InvalidBlock("abc".to_string()).into();
    assert!(matches!(err, Error::Request(RequestError::InvalidBlock(_))));
    assert!(err.to_string().contains("abc"));
}

#[test]
fn test_corrupt_row_names_key() {
    let err = StorageError::CorruptRow {
        key: "sig-1".to_string(),
    };
    assert_eq!(err.to_string(), "Corrupt signal row for key sig-1");
}
