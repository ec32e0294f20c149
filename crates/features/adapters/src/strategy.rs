//! Version strategies: how each host release represents identifiers and units.
//!
//! One [`VersionStrategy`] implementation per release family, selected once per adapter through
//! the version-keyed [`StrategyRegistry`]. Conversions are total and loud: every value either
//! converts exactly or fails with [`AdapterError::Conversion`].

use crate::error::AdapterError;
use crate::host::{NativeId, NativeValue, Xyz};
use fxhash::FxHashMap;
use hb_domain::{HostVersion, Point3, Value};
use std::fmt::Debug;
use std::sync::Arc;

/// Uniform unit name, 2021 display-unit code, forge type identifier.
const UNITS: [(&str, i32, &str); 8] = [
    ("meters", 0, "autodesk.unit.unit:meters-1.0.1"),
    ("centimeters", 1, "autodesk.unit.unit:centimeters-1.0.1"),
    ("millimeters", 2, "autodesk.unit.unit:millimeters-1.0.1"),
    ("feet", 3, "autodesk.unit.unit:feet-1.0.1"),
    ("inches", 4, "autodesk.unit.unit:inches-1.0.1"),
    ("squareMeters", 5, "autodesk.unit.unit:squareMeters-1.0.1"),
    ("cubicMeters", 6, "autodesk.unit.unit:cubicMeters-1.0.1"),
    ("degrees", 7, "autodesk.unit.unit:degrees-1.0.1"),
];

fn conversion(message: String) -> AdapterError {
    AdapterError::Conversion { message: message.into(), context: None }
}

fn unsupported_pair(strategy: &str, native: &NativeValue) -> AdapterError {
    conversion(format!("{} values are not supported by the {strategy} adapter", native.type_name()))
}

fn unknown_unit(unit: &str) -> AdapterError {
    conversion(format!("unknown unit '{unit}'"))
}

/// Host-release specific representation rules.
///
/// Implementors provide the identifier and unit hooks; the provided `to_native` / `to_uniform`
/// methods handle the shared shapes.
pub trait VersionStrategy: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn supports_nested_transactions(&self) -> bool;

    fn native_id(&self, id: i64) -> Result<NativeId, AdapterError>;
    fn uniform_id(&self, id: NativeId) -> Result<i64, AdapterError>;

    fn native_unit(&self, unit: &str) -> Result<NativeValue, AdapterError>;
    fn uniform_unit(&self, value: &NativeValue) -> Result<String, AdapterError>;

    fn native_point(&self, point: Point3) -> Result<Xyz, AdapterError> {
        if [point.x, point.y, point.z].iter().all(|c| c.is_finite()) {
            Ok(Xyz::new(point.x, point.y, point.z))
        } else {
            Err(conversion(format!("point ({}, {}, {}) is not finite", point.x, point.y, point.z)))
        }
    }

    fn uniform_point(&self, xyz: Xyz) -> Result<Point3, AdapterError> {
        if [xyz.x, xyz.y, xyz.z].iter().all(|c| c.is_finite()) {
            Ok(Point3::new(xyz.x, xyz.y, xyz.z))
        } else {
            Err(conversion(format!("host point ({}, {}, {}) is not finite", xyz.x, xyz.y, xyz.z)))
        }
    }

    fn to_native(&self, value: &Value) -> Result<NativeValue, AdapterError> {
        Ok(match value {
            Value::Null => NativeValue::Null,
            Value::Bool(b) => NativeValue::Bool(*b),
            Value::Integer(i) => NativeValue::Integer(*i),
            Value::Number(n) => NativeValue::Double(*n),
            Value::Text(s) => NativeValue::String(s.clone()),
            Value::ElementId(id) => NativeValue::ElementId(self.native_id(*id)?),
            Value::Point(p) => NativeValue::Xyz(self.native_point(*p)?),
            Value::Unit(unit) => self.native_unit(unit)?,
            Value::List(items) => NativeValue::Array(
                items.iter().map(|v| self.to_native(v)).collect::<Result<_, _>>()?,
            ),
        })
    }

    fn to_uniform(&self, value: &NativeValue) -> Result<Value, AdapterError> {
        Ok(match value {
            NativeValue::Null => Value::Null,
            NativeValue::Bool(b) => Value::Bool(*b),
            NativeValue::Integer(i) => Value::Integer(*i),
            NativeValue::Double(n) => Value::Number(*n),
            NativeValue::String(s) => Value::Text(s.clone()),
            NativeValue::ElementId(id) => Value::ElementId(self.uniform_id(*id)?),
            NativeValue::Xyz(xyz) => Value::Point(self.uniform_point(*xyz)?),
            unit @ (NativeValue::DisplayUnit(_) | NativeValue::ForgeTypeId(_)) => {
                Value::Unit(self.uniform_unit(unit)?)
            },
            NativeValue::Array(items) => Value::List(
                items.iter().map(|v| self.to_uniform(v)).collect::<Result<_, _>>()?,
            ),
        })
    }
}

fn narrow_id(strategy: &str, id: i64) -> Result<NativeId, AdapterError> {
    i32::try_from(id).map(NativeId::Int32).map_err(|_| {
        conversion(format!("element id {id} does not fit the 32-bit identifiers of the {strategy} adapter"))
    })
}

fn forge_unit(unit: &str) -> Result<NativeValue, AdapterError> {
    UNITS
        .iter()
        .find(|(name, ..)| *name == unit)
        .map(|(.., forge)| NativeValue::ForgeTypeId((*forge).to_owned()))
        .ok_or_else(|| unknown_unit(unit))
}

fn forge_unit_name(strategy: &str, value: &NativeValue) -> Result<String, AdapterError> {
    match value {
        NativeValue::ForgeTypeId(id) => UNITS
            .iter()
            .find(|(.., forge)| forge == id)
            .map(|(name, ..)| (*name).to_owned())
            .ok_or_else(|| unknown_unit(id)),
        other => Err(unsupported_pair(strategy, other)),
    }
}

/// 2021: 32-bit identifiers, integer display units, no sub-transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyStrategy;

impl VersionStrategy for LegacyStrategy {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn supports_nested_transactions(&self) -> bool {
        false
    }

    fn native_id(&self, id: i64) -> Result<NativeId, AdapterError> {
        narrow_id(self.name(), id)
    }

    fn uniform_id(&self, id: NativeId) -> Result<i64, AdapterError> {
        match id {
            NativeId::Int32(v) => Ok(i64::from(v)),
            NativeId::Int64(_) => Err(unsupported_pair(self.name(), &NativeValue::ElementId(id))),
        }
    }

    fn native_unit(&self, unit: &str) -> Result<NativeValue, AdapterError> {
        UNITS
            .iter()
            .find(|(name, ..)| *name == unit)
            .map(|(_, code, _)| NativeValue::DisplayUnit(*code))
            .ok_or_else(|| unknown_unit(unit))
    }

    fn uniform_unit(&self, value: &NativeValue) -> Result<String, AdapterError> {
        match value {
            NativeValue::DisplayUnit(code) => UNITS
                .iter()
                .find(|(_, c, _)| c == code)
                .map(|(name, ..)| (*name).to_owned())
                .ok_or_else(|| unknown_unit(&code.to_string())),
            other => Err(unsupported_pair(self.name(), other)),
        }
    }
}

/// 2022 and 2023: 32-bit identifiers with forge type identifiers. Sub-transactions arrived in
/// 2023.
#[derive(Debug, Clone, Copy)]
pub struct ForgeStrategy {
    pub nested: bool,
}

impl VersionStrategy for ForgeStrategy {
    fn name(&self) -> &'static str {
        "forge"
    }

    fn supports_nested_transactions(&self) -> bool {
        self.nested
    }

    fn native_id(&self, id: i64) -> Result<NativeId, AdapterError> {
        narrow_id(self.name(), id)
    }

    fn uniform_id(&self, id: NativeId) -> Result<i64, AdapterError> {
        match id {
            NativeId::Int32(v) => Ok(i64::from(v)),
            NativeId::Int64(_) => Err(unsupported_pair(self.name(), &NativeValue::ElementId(id))),
        }
    }

    fn native_unit(&self, unit: &str) -> Result<NativeValue, AdapterError> {
        forge_unit(unit)
    }

    fn uniform_unit(&self, value: &NativeValue) -> Result<String, AdapterError> {
        forge_unit_name(self.name(), value)
    }
}

/// 2024 onwards: 64-bit identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct WideIdStrategy;

impl VersionStrategy for WideIdStrategy {
    fn name(&self) -> &'static str {
        "wide-id"
    }

    fn supports_nested_transactions(&self) -> bool {
        true
    }

    fn native_id(&self, id: i64) -> Result<NativeId, AdapterError> {
        Ok(NativeId::Int64(id))
    }

    fn uniform_id(&self, id: NativeId) -> Result<i64, AdapterError> {
        match id {
            NativeId::Int64(v) => Ok(v),
            NativeId::Int32(_) => Err(unsupported_pair(self.name(), &NativeValue::ElementId(id))),
        }
    }

    fn native_unit(&self, unit: &str) -> Result<NativeValue, AdapterError> {
        forge_unit(unit)
    }

    fn uniform_unit(&self, value: &NativeValue) -> Result<String, AdapterError> {
        forge_unit_name(self.name(), value)
    }
}

/// Version-keyed strategy table.
#[derive(Debug, Clone)]
pub struct StrategyRegistry {
    strategies: FxHashMap<HostVersion, Arc<dyn VersionStrategy>>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        let forge_2022: Arc<dyn VersionStrategy> = Arc::new(ForgeStrategy { nested: false });
        let forge_2023: Arc<dyn VersionStrategy> = Arc::new(ForgeStrategy { nested: true });
        let wide: Arc<dyn VersionStrategy> = Arc::new(WideIdStrategy);

        registry.register(HostVersion::V2021, Arc::new(LegacyStrategy));
        registry.register(HostVersion::V2022, forge_2022);
        registry.register(HostVersion::V2023, forge_2023);
        for version in [HostVersion::V2024, HostVersion::V2025, HostVersion::Future] {
            registry.register(version, Arc::clone(&wide));
        }
        registry
    }
}

impl StrategyRegistry {
    #[must_use]
    pub fn empty() -> Self {
        Self { strategies: FxHashMap::default() }
    }

    pub fn register(&mut self, version: HostVersion, strategy: Arc<dyn VersionStrategy>) {
        self.strategies.insert(version, strategy);
    }

    pub fn get(&self, version: HostVersion) -> Result<Arc<dyn VersionStrategy>, AdapterError> {
        self.strategies.get(&version).cloned().ok_or_else(|| AdapterError::NotSupported {
            message: format!("no adapter strategy for host version {version}").into(),
            context: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_version_has_a_strategy() {
        let registry = StrategyRegistry::default();
        for version in HostVersion::ALL {
            assert_eq!(registry.get(version).is_ok(), version.is_supported(), "{version}");
        }
    }

    #[test]
    fn legacy_ids_are_narrowed_loudly() {
        let legacy = LegacyStrategy;
        assert_eq!(legacy.native_id(42).unwrap(), NativeId::Int32(42));
        let err = legacy.native_id(i64::from(i32::MAX) + 1).unwrap_err();
        assert_eq!(err.kind(), "Conversion");
    }

    #[test]
    fn unit_representation_follows_release() {
        let unit = Value::Unit("feet".into());
        assert_eq!(LegacyStrategy.to_native(&unit).unwrap(), NativeValue::DisplayUnit(3));
        assert_eq!(
            WideIdStrategy.to_native(&unit).unwrap(),
            NativeValue::ForgeTypeId("autodesk.unit.unit:feet-1.0.1".into())
        );
        assert_eq!(
            WideIdStrategy.to_uniform(&NativeValue::DisplayUnit(3)).unwrap_err().kind(),
            "Conversion"
        );
    }

    #[test]
    fn non_finite_points_are_rejected() {
        let point = Value::Point(Point3::new(f64::NAN, 0.0, 0.0));
        assert_eq!(WideIdStrategy.to_native(&point).unwrap_err().kind(), "Conversion");
    }
}
