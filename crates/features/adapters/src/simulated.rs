//! In-memory host application.
//!
//! Behaves like a small building model: elements with parameters and locations, views, family
//! symbols and a selection. Model changes need an open transaction; transactions and
//! sub-transactions snapshot the model and restore it on rollback. Faults and latency can be
//! injected per operation.

use crate::host::{
    HostApplication, HostError, NativeElement, NativeId, NativeSymbol, NativeValue, NativeView, Xyz,
};
use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::Duration;

/// Releases from this year on use 64-bit element identifiers.
const WIDE_ID_YEAR: u32 = 2024;
const NARROW_ID_BASE: i64 = 1_000;
const WIDE_ID_BASE: i64 = 5_000_000_000;

pub const DEFAULT_MODULES: [&str; 4] = ["core", "geometry", "ui", "families"];

/// What an injected fault does when its operation is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    Error(String),
    Panic(String),
}

#[derive(Debug, Clone)]
struct SimElement {
    name: String,
    category: String,
    location: Xyz,
    parameters: BTreeMap<String, NativeValue>,
}

#[derive(Debug, Clone)]
struct SimView {
    name: String,
    kind: String,
}

#[derive(Debug, Clone)]
struct SimSymbol {
    family: String,
    name: String,
}

#[derive(Debug, Clone, Default)]
struct Model {
    next_id: i64,
    elements: BTreeMap<i64, SimElement>,
    views: BTreeMap<i64, SimView>,
    symbols: BTreeMap<i64, SimSymbol>,
    active_view: Option<i64>,
    selection: Vec<i64>,
}

impl Model {
    fn allocate(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn element(&self, id: i64) -> Result<&SimElement, HostError> {
        self.elements.get(&id).ok_or_else(|| HostError::not_found(format!("element {id}")))
    }

    fn element_mut(&mut self, id: i64) -> Result<&mut SimElement, HostError> {
        self.elements.get_mut(&id).ok_or_else(|| HostError::not_found(format!("element {id}")))
    }

    fn add_element(
        &mut self,
        category: &str,
        name: &str,
        location: Xyz,
        parameters: impl IntoIterator<Item = (&'static str, NativeValue)>,
    ) -> i64 {
        let id = self.allocate();
        let parameters = parameters.into_iter().map(|(k, v)| (k.to_owned(), v)).collect();
        self.elements.insert(
            id,
            SimElement { name: name.to_owned(), category: category.to_owned(), location, parameters },
        );
        id
    }
}

#[derive(Debug, Default)]
struct State {
    model: Model,
    /// Model snapshots taken when each open transaction level started, innermost last.
    snapshots: Vec<Model>,
}

fn native_id(year: u32, id: i64) -> NativeId {
    match i32::try_from(id) {
        Ok(narrow) if year < WIDE_ID_YEAR => NativeId::Int32(narrow),
        _ => NativeId::Int64(id),
    }
}

#[derive(Debug)]
pub struct SimulatedHost {
    product: String,
    year: u32,
    modules: Vec<String>,
    state: Mutex<State>,
    faults: Mutex<FxHashMap<String, Fault>>,
    latency: Mutex<Duration>,
}

impl SimulatedHost {
    /// A seeded model for a host reporting release `year`.
    #[must_use]
    pub fn new(year: u32) -> Self {
        let mut model = Model {
            next_id: if year >= WIDE_ID_YEAR { WIDE_ID_BASE } else { NARROW_ID_BASE },
            ..Model::default()
        };
        let length_unit = if year >= 2022 {
            NativeValue::ForgeTypeId("autodesk.unit.unit:meters-1.0.1".to_owned())
        } else {
            NativeValue::DisplayUnit(0)
        };

        model.add_element("Levels", "Level 1", Xyz::default(), [
            ("Elevation", NativeValue::Double(0.0)),
            ("Comments", NativeValue::String(String::new())),
        ]);
        let wall = model.add_element("Walls", "Wall 1", Xyz::default(), [
            ("Length", NativeValue::Double(5.0)),
            ("Length Unit", length_unit),
            ("Mark", NativeValue::String("W1".to_owned())),
            ("Comments", NativeValue::String(String::new())),
        ]);
        model.add_element("Doors", "Door 1", Xyz::new(2.0, 0.0, 0.0), [
            ("Mark", NativeValue::String("D1".to_owned())),
            ("Host", NativeValue::ElementId(native_id(year, wall))),
            ("Comments", NativeValue::String(String::new())),
        ]);

        for (name, kind) in [("Level 1", "FloorPlan"), ("{3D}", "ThreeD"), ("North", "Elevation")] {
            let id = model.allocate();
            model.views.insert(id, SimView { name: name.to_owned(), kind: kind.to_owned() });
        }
        model.active_view = model.views.keys().next().copied();
        for (family, name) in [("Desk", "1500x750"), ("Desk", "1800x900"), ("Chair", "Standard")] {
            let id = model.allocate();
            model.symbols.insert(id, SimSymbol { family: family.to_owned(), name: name.to_owned() });
        }

        Self {
            product: "HostApp".to_owned(),
            year,
            modules: DEFAULT_MODULES.iter().map(|m| (*m).to_owned()).collect(),
            state: Mutex::new(State { model, snapshots: Vec::new() }),
            faults: Mutex::new(FxHashMap::default()),
            latency: Mutex::new(Duration::ZERO),
        }
    }

    #[must_use]
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    #[must_use]
    pub fn with_modules<S: Into<String>>(mut self, modules: impl IntoIterator<Item = S>) -> Self {
        self.modules = modules.into_iter().map(Into::into).collect();
        self
    }

    /// Makes every later call of `operation` (a trait method name) fail or panic.
    pub fn inject_fault(&self, operation: &str, fault: Fault) {
        self.faults.lock().insert(operation.to_owned(), fault);
    }

    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    /// Delay applied to every call, imitating a busy host.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Number of open transaction levels.
    #[must_use]
    pub fn open_transactions(&self) -> usize {
        self.state.lock().snapshots.len()
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.state.lock().model.elements.len()
    }

    const fn wide_ids(&self) -> bool {
        self.year >= WIDE_ID_YEAR
    }

    fn native(&self, id: i64) -> NativeId {
        native_id(self.year, id)
    }

    fn raw(&self, id: NativeId) -> Result<i64, HostError> {
        match (id, self.wide_ids()) {
            (NativeId::Int32(v), false) => Ok(i64::from(v)),
            (NativeId::Int64(v), true) => Ok(v),
            (other, _) => Err(HostError::invalid(format!(
                "{} element identifiers are not accepted by release {}",
                NativeValue::ElementId(other).type_name(),
                self.year
            ))),
        }
    }

    fn enter(&self, operation: &str) -> Result<(), HostError> {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
        let fault = self.faults.lock().get(operation).cloned();
        match fault {
            None => Ok(()),
            Some(Fault::Error(message)) => Err(HostError::fault(message)),
            Some(Fault::Panic(message)) => panic!("{message}"),
        }
    }

    fn read<R>(&self, operation: &str, f: impl FnOnce(&Model) -> Result<R, HostError>) -> Result<R, HostError> {
        self.enter(operation)?;
        f(&self.state.lock().model)
    }

    /// Runs a model change, refusing it outside a transaction.
    fn write<R>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut Model) -> Result<R, HostError>,
    ) -> Result<R, HostError> {
        self.enter(operation)?;
        let mut state = self.state.lock();
        if state.snapshots.is_empty() {
            return Err(HostError::fault(format!(
                "{operation}: modification of the document is forbidden outside a transaction"
            )));
        }
        f(&mut state.model)
    }

    fn element_of(&self, id: i64, element: &SimElement) -> NativeElement {
        NativeElement { id: self.native(id), name: element.name.clone(), category: element.category.clone() }
    }

    fn view_of(&self, id: i64, view: &SimView) -> NativeView {
        NativeView { id: self.native(id), name: view.name.clone(), kind: view.kind.clone() }
    }
}

impl HostApplication for SimulatedHost {
    fn product(&self) -> &str {
        &self.product
    }

    fn version_year(&self) -> u32 {
        self.year
    }

    fn loaded_modules(&self) -> Vec<String> {
        self.modules.clone()
    }

    fn element(&self, id: NativeId) -> Result<NativeElement, HostError> {
        let raw = self.raw(id)?;
        self.read("element", |m| Ok(self.element_of(raw, m.element(raw)?)))
    }

    fn elements_by_category(&self, category: &str) -> Result<Vec<NativeElement>, HostError> {
        self.read("elements_by_category", |m| {
            Ok(m.elements
                .iter()
                .filter(|(_, e)| e.category.eq_ignore_ascii_case(category))
                .map(|(id, e)| self.element_of(*id, e))
                .collect())
        })
    }

    fn create_element(&self, category: &str, name: &str) -> Result<NativeElement, HostError> {
        if category.trim().is_empty() {
            return Err(HostError::invalid("category must not be empty"));
        }
        self.write("create_element", |m| {
            let id = m.add_element(category, name, Xyz::default(), [(
                "Comments",
                NativeValue::String(String::new()),
            )]);
            Ok(self.element_of(id, m.element(id)?))
        })
    }

    fn delete_element(&self, id: NativeId) -> Result<(), HostError> {
        let raw = self.raw(id)?;
        self.write("delete_element", |m| {
            m.elements.remove(&raw).ok_or_else(|| HostError::not_found(format!("element {raw}")))?;
            m.selection.retain(|s| *s != raw);
            Ok(())
        })
    }

    fn parameter_names(&self, id: NativeId) -> Result<Vec<String>, HostError> {
        let raw = self.raw(id)?;
        self.read("parameter_names", |m| Ok(m.element(raw)?.parameters.keys().cloned().collect()))
    }

    fn parameter(&self, id: NativeId, name: &str) -> Result<NativeValue, HostError> {
        let raw = self.raw(id)?;
        self.read("parameter", |m| {
            m.element(raw)?
                .parameters
                .get(name)
                .cloned()
                .ok_or_else(|| HostError::not_found(format!("parameter '{name}' on element {raw}")))
        })
    }

    fn set_parameter(&self, id: NativeId, name: &str, value: NativeValue) -> Result<(), HostError> {
        let raw = self.raw(id)?;
        if let NativeValue::ElementId(reference) = &value {
            self.raw(*reference)?;
        }
        self.write("set_parameter", |m| {
            let slot = m
                .element_mut(raw)?
                .parameters
                .get_mut(name)
                .ok_or_else(|| HostError::not_found(format!("parameter '{name}' on element {raw}")))?;
            if !matches!(slot, NativeValue::Null) && slot.type_name() != value.type_name() {
                return Err(HostError::invalid(format!(
                    "parameter '{name}' stores {}, got {}",
                    slot.type_name(),
                    value.type_name()
                )));
            }
            *slot = value;
            Ok(())
        })
    }

    fn location(&self, id: NativeId) -> Result<Xyz, HostError> {
        let raw = self.raw(id)?;
        self.read("location", |m| Ok(m.element(raw)?.location))
    }

    fn set_location(&self, id: NativeId, location: Xyz) -> Result<(), HostError> {
        let raw = self.raw(id)?;
        self.write("set_location", |m| {
            m.element_mut(raw)?.location = location;
            Ok(())
        })
    }

    fn selection(&self) -> Result<Vec<NativeId>, HostError> {
        self.read("selection", |m| Ok(m.selection.iter().map(|id| self.native(*id)).collect()))
    }

    fn set_selection(&self, ids: &[NativeId]) -> Result<(), HostError> {
        let raw = ids.iter().map(|id| self.raw(*id)).collect::<Result<Vec<_>, _>>()?;
        self.enter("set_selection")?;
        let mut state = self.state.lock();
        for id in &raw {
            state.model.element(*id)?;
        }
        state.model.selection = raw;
        Ok(())
    }

    fn views(&self) -> Result<Vec<NativeView>, HostError> {
        self.read("views", |m| Ok(m.views.iter().map(|(id, v)| self.view_of(*id, v)).collect()))
    }

    fn active_view(&self) -> Result<Option<NativeView>, HostError> {
        self.read("active_view", |m| {
            Ok(m.active_view.and_then(|id| m.views.get(&id).map(|v| self.view_of(id, v))))
        })
    }

    fn activate_view(&self, id: NativeId) -> Result<(), HostError> {
        let raw = self.raw(id)?;
        self.enter("activate_view")?;
        let mut state = self.state.lock();
        if !state.model.views.contains_key(&raw) {
            return Err(HostError::not_found(format!("view {raw}")));
        }
        state.model.active_view = Some(raw);
        Ok(())
    }

    fn family_symbols(&self) -> Result<Vec<NativeSymbol>, HostError> {
        self.read("family_symbols", |m| {
            Ok(m.symbols
                .iter()
                .map(|(id, s)| NativeSymbol {
                    id: self.native(*id),
                    family: s.family.clone(),
                    name: s.name.clone(),
                })
                .collect())
        })
    }

    fn place_symbol(&self, symbol: NativeId, location: Xyz) -> Result<NativeElement, HostError> {
        let raw = self.raw(symbol)?;
        self.write("place_symbol", |m| {
            let symbol = m
                .symbols
                .get(&raw)
                .cloned()
                .ok_or_else(|| HostError::not_found(format!("family symbol {raw}")))?;
            let id = m.add_element(&symbol.family, &symbol.name, location, [
                ("Type", NativeValue::String(symbol.name.clone())),
                ("Comments", NativeValue::String(String::new())),
            ]);
            Ok(self.element_of(id, m.element(id)?))
        })
    }

    fn start_transaction(&self, name: &str) -> Result<(), HostError> {
        self.enter("start_transaction")?;
        let mut state = self.state.lock();
        if !state.snapshots.is_empty() {
            return Err(HostError::fault(format!(
                "cannot start '{name}': a transaction is already open"
            )));
        }
        let snapshot = state.model.clone();
        state.snapshots.push(snapshot);
        Ok(())
    }

    fn commit_transaction(&self) -> Result<(), HostError> {
        self.enter("commit_transaction")?;
        let mut state = self.state.lock();
        match state.snapshots.len() {
            1 => {
                state.snapshots.clear();
                Ok(())
            },
            0 => Err(HostError::fault("no open transaction")),
            _ => Err(HostError::fault("sub-transactions are still open")),
        }
    }

    fn rollback_transaction(&self) -> Result<(), HostError> {
        self.enter("rollback_transaction")?;
        let mut state = self.state.lock();
        if state.snapshots.len() != 1 {
            return Err(HostError::fault("rollback requires exactly one open transaction"));
        }
        if let Some(snapshot) = state.snapshots.pop() {
            state.model = snapshot;
        }
        Ok(())
    }

    fn start_sub_transaction(&self) -> Result<(), HostError> {
        self.enter("start_sub_transaction")?;
        let mut state = self.state.lock();
        if state.snapshots.is_empty() {
            return Err(HostError::fault("sub-transactions need an open transaction"));
        }
        let snapshot = state.model.clone();
        state.snapshots.push(snapshot);
        Ok(())
    }

    fn commit_sub_transaction(&self) -> Result<(), HostError> {
        self.enter("commit_sub_transaction")?;
        let mut state = self.state.lock();
        if state.snapshots.len() < 2 {
            return Err(HostError::fault("no open sub-transaction"));
        }
        state.snapshots.pop();
        Ok(())
    }

    fn rollback_sub_transaction(&self) -> Result<(), HostError> {
        self.enter("rollback_sub_transaction")?;
        let mut state = self.state.lock();
        if state.snapshots.len() < 2 {
            return Err(HostError::fault("no open sub-transaction"));
        }
        if let Some(snapshot) = state.snapshots.pop() {
            state.model = snapshot;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_outside_a_transaction_are_refused() {
        let host = SimulatedHost::new(2023);
        let err = host.create_element("Walls", "Wall 2").unwrap_err();
        assert_eq!(err.kind(), "Fault");
    }

    #[test]
    fn rollback_restores_the_model() {
        let host = SimulatedHost::new(2023);
        let before = host.element_count();

        host.start_transaction("t").unwrap();
        host.create_element("Walls", "Wall 2").unwrap();
        host.start_sub_transaction().unwrap();
        host.create_element("Walls", "Wall 3").unwrap();
        host.rollback_sub_transaction().unwrap();
        assert_eq!(host.element_count(), before + 1);
        host.rollback_transaction().unwrap();

        assert_eq!(host.element_count(), before);
        assert_eq!(host.open_transactions(), 0);
    }

    #[test]
    fn identifier_width_follows_release() {
        let narrow = SimulatedHost::new(2023);
        let wide = SimulatedHost::new(2024);
        assert!(matches!(narrow.views().unwrap()[0].id, NativeId::Int32(_)));
        assert!(matches!(wide.views().unwrap()[0].id, NativeId::Int64(_)));
        assert_eq!(narrow.element(NativeId::Int64(1000)).unwrap_err().kind(), "InvalidArgument");
    }
}
