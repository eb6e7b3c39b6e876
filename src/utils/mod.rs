//! Utility functions for the basewatch ingester.

mod conversion;

pub use conversion::{address_hex, hex_encode, topic_hex, u256_dec};
