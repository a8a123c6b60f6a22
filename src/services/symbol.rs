use crate::error::Result;

/// Symbol resolution capability supplied by a managed host. The fallback
/// host carries none; callers degrade when the lookup fails.
pub trait SymbolService: Send + Sync {
    /// Evaluate a symbol or numeric expression into an address value.
    fn expression_value(&self, expression: &str) -> Result<u64>;
}
