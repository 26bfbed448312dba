use rand::distributions::Uniform;
use rand::Rng;

use crate::auth::application::ports::outgoing::ConfirmationCodeGenerator;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Uppercase alphanumeric codes from the thread-local CSPRNG.
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl ConfirmationCodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        let dist = Uniform::from(0..ALPHABET.len());
        rand::thread_rng()
            .sample_iter(dist)
            .take(self.length)
            .map(|i| ALPHABET[i] as char)
            .collect()
    }
}
