use std::collections::HashSet;

use rand::rngs::OsRng;
use rand::Rng;

use super::errors::CodeFormatError;
use super::errors::CodeGeneratorError;

/// Longest code a one-time code may have.
pub const MAX_CODE_LENGTH: usize = 14;

/// Lower-case letters and digits.
pub const DEFAULT_CODE_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

const MIN_ALPHABET_SIZE: usize = 2;

/// Random code generator over a fixed alphabet.
///
/// Draws from the OS CSPRNG. Collisions are not retried; at the default
/// alphabet and length a code carries ~72 bits of entropy.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    alphabet: Vec<char>,
    length: usize,
}

impl CodeGenerator {
    /// # Errors
    /// * `InvalidLength` - `length` is 0 or above [`MAX_CODE_LENGTH`]
    /// * `AlphabetTooSmall` / `DuplicateCharacter` / `InvalidCharacter` - Alphabet is unusable
    pub fn new(alphabet: &str, length: usize) -> Result<Self, CodeGeneratorError> {
        if length == 0 || length > MAX_CODE_LENGTH {
            return Err(CodeGeneratorError::InvalidLength {
                max: MAX_CODE_LENGTH,
                actual: length,
            });
        }

        let alphabet: Vec<char> = alphabet.chars().collect();
        let mut seen = HashSet::with_capacity(alphabet.len());
        for &c in &alphabet {
            if c.is_whitespace() || c.is_control() {
                return Err(CodeGeneratorError::InvalidCharacter);
            }
            if !seen.insert(c) {
                return Err(CodeGeneratorError::DuplicateCharacter(c));
            }
        }
        if alphabet.len() < MIN_ALPHABET_SIZE {
            return Err(CodeGeneratorError::AlphabetTooSmall {
                min: MIN_ALPHABET_SIZE,
                actual: alphabet.len(),
            });
        }

        Ok(Self { alphabet, length })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate a code with the OS random source.
    pub fn generate(&self) -> String {
        self.generate_with_rng(&mut OsRng)
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.length)
            .map(|_| self.alphabet[rng.gen_range(0..self.alphabet.len())])
            .collect()
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            alphabet: DEFAULT_CODE_ALPHABET.chars().collect(),
            length: MAX_CODE_LENGTH,
        }
    }
}

/// Check that an inbound string could be a code before it reaches storage.
///
/// # Errors
/// * `Empty` / `TooLong` / `InvalidCharacters`
pub fn validate_code(code: &str) -> Result<(), CodeFormatError> {
    let length = code.chars().count();
    if length == 0 {
        return Err(CodeFormatError::Empty);
    }
    if length > MAX_CODE_LENGTH {
        return Err(CodeFormatError::TooLong {
            max: MAX_CODE_LENGTH,
            actual: length,
        });
    }
    if code.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CodeFormatError::InvalidCharacters);
    }
    Ok(())
}
