mod resolver;

pub use resolver::{DexLookup, DexResolver};
