//! The host application as the adapters see it: a synchronous API speaking host-native types.

use std::borrow::Cow;

/// Faults raised by the host. Adapters translate them; they never reach bridge callers raw.
#[hb_derive::hb_error]
pub enum HostError {
    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid argument{}: {message}", format_context(.context))]
    InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The host refused or failed the operation.
    #[error("Host fault{}: {message}", format_context(.context))]
    Fault { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal host error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl HostError {
    pub fn not_found(what: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: what.into(), context: None }
    }

    pub fn invalid(what: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidArgument { message: what.into(), context: None }
    }

    pub fn fault(what: impl Into<Cow<'static, str>>) -> Self {
        Self::Fault { message: what.into(), context: None }
    }
}

/// Element identifier as the host stores it. Releases before 2024 use 32-bit identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NativeId {
    Int32(i32),
    Int64(i64),
}

impl NativeId {
    #[must_use]
    pub fn widen(self) -> i64 {
        match self {
            Self::Int32(v) => i64::from(v),
            Self::Int64(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Xyz {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Parameter and argument values in host-native form.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NativeValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
    ElementId(NativeId),
    Xyz(Xyz),
    /// Integer display-unit code (2021 releases).
    DisplayUnit(i32),
    /// Forge type identifier (2022 releases and newer).
    ForgeTypeId(String),
    Array(Vec<NativeValue>),
}

impl NativeValue {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Integer(_) => "Integer",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::ElementId(NativeId::Int32(_)) => "ElementId32",
            Self::ElementId(NativeId::Int64(_)) => "ElementId64",
            Self::Xyz(_) => "XYZ",
            Self::DisplayUnit(_) => "DisplayUnitType",
            Self::ForgeTypeId(_) => "ForgeTypeId",
            Self::Array(_) => "Array",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeElement {
    pub id: NativeId,
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeView {
    pub id: NativeId,
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeSymbol {
    pub id: NativeId,
    pub family: String,
    pub name: String,
}

/// Native API of a running host application.
///
/// Model changes are only accepted inside an open transaction. Hosts that have a single main
/// transaction expose deeper levels through the sub-transaction calls.
pub trait HostApplication: Send + Sync {
    fn product(&self) -> &str;

    /// Release year reported by the running host.
    fn version_year(&self) -> u32;

    /// Names of the host modules loaded into the process.
    fn loaded_modules(&self) -> Vec<String>;

    fn element(&self, id: NativeId) -> Result<NativeElement, HostError>;
    fn elements_by_category(&self, category: &str) -> Result<Vec<NativeElement>, HostError>;
    fn create_element(&self, category: &str, name: &str) -> Result<NativeElement, HostError>;
    fn delete_element(&self, id: NativeId) -> Result<(), HostError>;

    fn parameter_names(&self, id: NativeId) -> Result<Vec<String>, HostError>;
    fn parameter(&self, id: NativeId, name: &str) -> Result<NativeValue, HostError>;
    fn set_parameter(&self, id: NativeId, name: &str, value: NativeValue) -> Result<(), HostError>;

    fn location(&self, id: NativeId) -> Result<Xyz, HostError>;
    fn set_location(&self, id: NativeId, location: Xyz) -> Result<(), HostError>;

    fn selection(&self) -> Result<Vec<NativeId>, HostError>;
    fn set_selection(&self, ids: &[NativeId]) -> Result<(), HostError>;

    fn views(&self) -> Result<Vec<NativeView>, HostError>;
    fn active_view(&self) -> Result<Option<NativeView>, HostError>;
    fn activate_view(&self, id: NativeId) -> Result<(), HostError>;

    fn family_symbols(&self) -> Result<Vec<NativeSymbol>, HostError>;
    fn place_symbol(&self, symbol: NativeId, location: Xyz) -> Result<NativeElement, HostError>;

    fn start_transaction(&self, name: &str) -> Result<(), HostError>;
    fn commit_transaction(&self) -> Result<(), HostError>;
    fn rollback_transaction(&self) -> Result<(), HostError>;

    fn start_sub_transaction(&self) -> Result<(), HostError>;
    fn commit_sub_transaction(&self) -> Result<(), HostError>;
    fn rollback_sub_transaction(&self) -> Result<(), HostError>;
}
