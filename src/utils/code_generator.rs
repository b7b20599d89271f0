//! Random short code generation.
//!
//! Codes are fixed-length strings drawn uniformly from a configurable
//! alphabet. The default is 6 symbols over base62, giving 62^6 (about
//! 5.7e10) distinct codes.

use rand::Rng;

/// Base62 alphabet: lowercase, uppercase, digits.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default number of symbols in a generated code.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Longest code the storage column accepts.
pub const MAX_CODE_LENGTH: usize = 32;

/// Errors raised when building a generator from configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodeGeneratorError {
    #[error("Alphabet must contain at least 2 symbols, got {0}")]
    AlphabetTooSmall(usize),

    #[error("Alphabet may only contain ASCII letters and digits, found {0:?}")]
    InvalidSymbol(char),

    #[error("Alphabet contains duplicate symbol {0:?}")]
    DuplicateSymbol(char),

    #[error("Code length must be between 1 and {MAX_CODE_LENGTH}, got {0}")]
    InvalidLength(usize),
}

/// Draws random fixed-length codes over an alphabet.
///
/// Holds no RNG state; each call uses the thread-local generator, so a single
/// instance can be shared across tasks without locking.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    alphabet: Vec<u8>,
    length: usize,
}

impl CodeGenerator {
    /// Builds a generator, validating the alphabet and length.
    ///
    /// # Errors
    ///
    /// Returns [`CodeGeneratorError`] if the alphabet has fewer than two
    /// symbols, repeats a symbol, contains anything other than ASCII
    /// alphanumerics, or if `length` is outside `1..=32`.
    pub fn new(alphabet: &str, length: usize) -> Result<Self, CodeGeneratorError> {
        if length == 0 || length > MAX_CODE_LENGTH {
            return Err(CodeGeneratorError::InvalidLength(length));
        }

        let mut symbols: Vec<u8> = Vec::with_capacity(alphabet.len());
        for c in alphabet.chars() {
            if !c.is_ascii_alphanumeric() {
                return Err(CodeGeneratorError::InvalidSymbol(c));
            }
            let b = c as u8;
            if symbols.contains(&b) {
                return Err(CodeGeneratorError::DuplicateSymbol(c));
            }
            symbols.push(b);
        }

        if symbols.len() < 2 {
            return Err(CodeGeneratorError::AlphabetTooSmall(symbols.len()));
        }

        Ok(Self {
            alphabet: symbols,
            length,
        })
    }

    /// Draws one code.
    pub fn generate(&self) -> String {
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| self.alphabet[rng.random_range(0..self.alphabet.len())] as char)
            .collect()
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alphabet_size(&self) -> usize {
        self.alphabet.len()
    }

    /// Number of distinct codes this generator can produce, saturating at `u128::MAX`.
    pub fn code_space(&self) -> u128 {
        (0..self.length).fold(1u128, |acc, _| {
            acc.saturating_mul(self.alphabet.len() as u128)
        })
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_ALPHABET.as_bytes().to_vec(),
            length: DEFAULT_CODE_LENGTH,
        }
    }
}
