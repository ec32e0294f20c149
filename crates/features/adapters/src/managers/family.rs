use super::Binding;
use crate::error::{AdapterError, AdapterErrorExt};
use crate::model::{ElementInfo, SymbolInfo};
use hb_domain::Point3;

#[derive(Debug, Clone)]
pub struct FamilyManager {
    binding: Binding,
}

impl FamilyManager {
    pub(crate) const fn new(binding: Binding) -> Self {
        Self { binding }
    }

    /// Family symbols, optionally restricted to one family.
    pub fn symbols(&self, family: Option<&str>) -> Result<Vec<SymbolInfo>, AdapterError> {
        self.binding
            .host
            .family_symbols()?
            .into_iter()
            .filter(|s| family.is_none_or(|f| s.family == f))
            .map(|s| {
                Ok(SymbolInfo { id: self.binding.uniform_id(s.id)?, family: s.family, name: s.name })
            })
            .collect()
    }

    /// Places an instance of `symbol`. Requires an open transaction.
    pub fn place(&self, symbol: i64, location: Point3) -> Result<ElementInfo, AdapterError> {
        let native = self.binding.native_id(symbol)?;
        let xyz = self.binding.strategy.native_point(location)?;
        let element =
            self.binding.host.place_symbol(native, xyz).context(format!("symbol {symbol}"))?;
        self.binding.element_info(element)
    }
}
