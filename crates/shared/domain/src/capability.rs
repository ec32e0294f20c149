use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Capability managers an adapter can expose.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
    pub struct CapabilitySet: u32 {
        const ELEMENTS = 1 << 0;
        const TRANSACTIONS = 1 << 1;
        const PARAMETERS = 1 << 2;
        const GEOMETRY = 1 << 3;
        const SELECTION = 1 << 4;
        const VIEWS = 1 << 5;
        const FAMILIES = 1 << 6;

        const ALL = Self::ELEMENTS.bits()
            | Self::TRANSACTIONS.bits()
            | Self::PARAMETERS.bits()
            | Self::GEOMETRY.bits()
            | Self::SELECTION.bits()
            | Self::VIEWS.bits()
            | Self::FAMILIES.bits();
    }
}

impl From<&str> for CapabilitySet {
    fn from(s: &str) -> Self {
        match s {
            "element" | "elements" => Self::ELEMENTS,
            "transaction" | "transactions" => Self::TRANSACTIONS,
            "parameter" | "parameters" => Self::PARAMETERS,
            "geometry" => Self::GEOMETRY,
            "selection" => Self::SELECTION,
            "view" | "views" => Self::VIEWS,
            "family" | "families" => Self::FAMILIES,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}

impl From<u32> for CapabilitySet {
    fn from(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_map_to_flags() {
        assert_eq!(CapabilitySet::from("geometry"), CapabilitySet::GEOMETRY);
        assert_eq!(CapabilitySet::from("*"), CapabilitySet::ALL);
        assert!(CapabilitySet::from("teleport").is_empty());
    }

    #[test]
    fn unknown_bits_are_dropped() {
        assert_eq!(CapabilitySet::from(u32::MAX), CapabilitySet::ALL);
    }
}
