use hb_adapters::strategy::{ForgeStrategy, LegacyStrategy, WideIdStrategy};
use hb_adapters::{NativeId, NativeValue, VersionStrategy};
use hb_domain::{Point3, Value};
use proptest::prelude::*;

const UNITS: [&str; 8] =
    ["meters", "centimeters", "millimeters", "feet", "inches", "squareMeters", "cubicMeters", "degrees"];

fn finite() -> impl Strategy<Value = f64> {
    -1.0e9..1.0e9
}

fn uniform(id: impl Strategy<Value = i64> + Clone + 'static) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        finite().prop_map(Value::Number),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::Text),
        id.prop_map(Value::ElementId),
        (finite(), finite(), finite()).prop_map(|(x, y, z)| Value::Point(Point3::new(x, y, z))),
        proptest::sample::select(UNITS.to_vec()).prop_map(|u| Value::Unit(u.to_owned())),
    ];
    leaf.prop_recursive(2, 16, 4, |inner| proptest::collection::vec(inner, 0..4).prop_map(Value::List))
}

fn narrow_ids() -> impl Strategy<Value = i64> + Clone {
    any::<i32>().prop_map(i64::from)
}

fn round_trips(strategy: &dyn VersionStrategy, value: &Value) -> Result<(), TestCaseError> {
    let native = strategy.to_native(value).map_err(|e| TestCaseError::fail(e.to_string()))?;
    let back = strategy.to_uniform(&native).map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(&back, value);
    let again = strategy.to_native(&back).map_err(|e| TestCaseError::fail(e.to_string()))?;
    prop_assert_eq!(again, native);
    Ok(())
}

proptest! {
    #[test]
    fn legacy_round_trips(value in uniform(narrow_ids())) {
        round_trips(&LegacyStrategy, &value)?;
    }

    #[test]
    fn forge_round_trips(value in uniform(narrow_ids())) {
        round_trips(&ForgeStrategy { nested: true }, &value)?;
    }

    #[test]
    fn wide_round_trips(value in uniform(any::<i64>())) {
        round_trips(&WideIdStrategy, &value)?;
    }

    #[test]
    fn narrow_strategies_reject_wide_ids(id in (i64::from(i32::MAX) + 1)..i64::MAX) {
        prop_assert_eq!(LegacyStrategy.to_native(&Value::ElementId(id)).unwrap_err().kind(), "Conversion");
        prop_assert_eq!(
            ForgeStrategy { nested: false }.to_native(&Value::List(vec![Value::ElementId(id)])).unwrap_err().kind(),
            "Conversion"
        );
    }
}

#[test]
fn mismatched_native_shapes_fail_loudly() {
    assert_eq!(
        WideIdStrategy.to_uniform(&NativeValue::ElementId(NativeId::Int32(7))).unwrap_err().kind(),
        "Conversion"
    );
    assert_eq!(
        LegacyStrategy.to_uniform(&NativeValue::ElementId(NativeId::Int64(7))).unwrap_err().kind(),
        "Conversion"
    );
    assert_eq!(
        LegacyStrategy
            .to_uniform(&NativeValue::ForgeTypeId("autodesk.unit.unit:meters-1.0.1".into()))
            .unwrap_err()
            .kind(),
        "Conversion"
    );
    assert_eq!(
        ForgeStrategy { nested: true }
            .to_uniform(&NativeValue::ForgeTypeId("autodesk.unit.unit:furlongs-1.0.0".into()))
            .unwrap_err()
            .kind(),
        "Conversion"
    );
    assert_eq!(LegacyStrategy.to_native(&Value::Unit("parsecs".into())).unwrap_err().kind(), "Conversion");
}
