/// Assert that a result failed with an error of the given kind
#[macro_export]
macro_rules! assert_err_kind {
    ($result:expr, $kind:expr) => {
        match $result {
            Ok(v) => panic!("Expected {:?} error, got Ok({:?})", $kind, v),
            Err(e) => assert_eq!(e.kind(), $kind, "Unexpected error: {}", e),
        }
    };
}
