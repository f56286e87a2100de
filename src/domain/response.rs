#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Outcome reported by the mailer backend.
///
/// `success` alone decides the outcome; `message` is free text and is never
/// interpreted.
pub struct EmailResponse {
    pub success: bool,
    pub message: String,
}
