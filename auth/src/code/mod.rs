pub mod errors;
pub mod generator;

pub use errors::CodeFormatError;
pub use errors::CodeGeneratorError;
pub use generator::validate_code;
pub use generator::CodeGenerator;
pub use generator::DEFAULT_CODE_ALPHABET;
pub use generator::MAX_CODE_LENGTH;
