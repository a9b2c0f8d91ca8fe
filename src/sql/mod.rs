//! SQL generation.
//!
//! - [`token`] - Token types and the token stream builder

pub mod token;

#[cfg(test)]
pub mod test_utils;

pub use token::{quote_identifier, Token, TokenStream};
