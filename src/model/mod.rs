pub mod dialect;
pub mod span;
pub mod symbol;

pub use dialect::Dialect;
pub use span::Span;
pub use symbol::{dedup_entries, CompletionEntry, SymbolKind};
