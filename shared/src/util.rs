/// Current UTC time in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Length of a QR scan token issued by the backend
pub const QR_TOKEN_LEN: usize = 32;

/// Generate an unguessable alphanumeric QR scan token.
pub fn random_token() -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(QR_TOKEN_LEN)
        .map(char::from)
        .collect()
}
