/// Source of fresh single-use signup codes.
pub trait ConfirmationCodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}
