use linear_retry::Logger;

#[test]
fn second_init_is_rejected() {
    assert!(Logger::try_init());
    assert!(!Logger::try_init());
}
