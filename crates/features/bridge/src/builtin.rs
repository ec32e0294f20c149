use crate::method::{MethodContext, MethodSpec, reply};
use hb_domain::features::keys;
use hb_domain::{CapabilitySet, Point3, Value};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct ById {
    id: i64,
}

#[derive(Deserialize)]
struct ByCategory {
    category: String,
}

#[derive(Deserialize)]
struct CreateElement {
    category: String,
    name: String,
}

#[derive(Deserialize)]
struct GetParameter {
    id: i64,
    name: String,
}

#[derive(Deserialize)]
struct SetParameter {
    id: i64,
    name: String,
    value: Value,
}

#[derive(Deserialize)]
struct Pair {
    a: i64,
    b: i64,
}

#[derive(Deserialize)]
struct MoveElement {
    id: i64,
    delta: Point3,
}

#[derive(Deserialize)]
struct Selection {
    ids: Vec<i64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct SymbolQuery {
    family: Option<String>,
}

#[derive(Deserialize)]
struct PlaceSymbol {
    symbol: i64,
    location: Point3,
}

#[derive(Deserialize)]
struct ByFeature {
    feature: String,
}

/// The methods every bridge starts with.
#[must_use]
pub fn builtin_methods() -> Vec<MethodSpec> {
    let mut methods = host_methods();
    methods.extend(feature_methods());
    methods.extend(element_methods());
    methods.extend(geometry_methods());
    methods.extend(ui_methods());
    methods.extend(family_methods());
    methods
}

fn host_methods() -> Vec<MethodSpec> {
    vec![
        MethodSpec::read("host.ping", |_| Ok(json!("pong"))),
        MethodSpec::read("host.info", |ctx| {
            let adapter = &ctx.adapter;
            Ok(json!({
                "product": adapter.product(),
                "version": adapter.version(),
                "year": adapter.version().year(),
                "strategy": adapter.strategy_name(),
                "capabilities": format!("{:?}", adapter.capabilities()),
                "nestedTransactions": adapter.supports_nested_transactions(),
                "features": adapter.feature_names(),
            }))
        }),
        MethodSpec::read("cloud.status", |ctx| {
            let chain = ctx.adapter.resolve_feature(keys::CLOUD_MODEL_SUPPORT)?;
            Ok(json!({
                "feature": keys::CLOUD_MODEL_SUPPORT,
                "chain": chain.iter().map(|f| f.name()).collect::<Vec<_>>(),
                "product": ctx.adapter.product(),
            }))
        })
        .feature(keys::CLOUD_MODEL_SUPPORT),
    ]
}

fn feature_methods() -> Vec<MethodSpec> {
    vec![
        MethodSpec::read("features.list", |ctx| {
            reply(ctx.adapter.features().collect::<Vec<_>>())
        }),
        MethodSpec::read("features.check", |ctx| {
            let p: ByFeature = ctx.params()?;
            let version = ctx.adapter.version();
            let status = ctx.resolver.status(&p.feature, version);
            let usable = ctx.adapter.feature(&p.feature).is_some_and(|f| f.probe());
            Ok(json!({
                "feature": p.feature,
                "version": version,
                "status": status,
                "enabled": status.is_enabled(),
                "usable": usable,
            }))
        }),
        MethodSpec::read("features.validate", |ctx| {
            let p: ByFeature = ctx.params()?;
            reply(ctx.resolver.validate_dependencies(&p.feature, ctx.adapter.version()))
        }),
        MethodSpec::read("features.resolve", |ctx| {
            let p: ByFeature = ctx.params()?;
            reply(ctx.resolver.resolve_dependencies(&p.feature, ctx.adapter.version())?)
        }),
        MethodSpec::read("features.matrix", |ctx| reply(ctx.resolver.compatibility_matrix())),
    ]
}

fn element_methods() -> Vec<MethodSpec> {
    vec![
        MethodSpec::read("element.get", |ctx| {
            let p: ById = ctx.params()?;
            reply(ctx.adapter.elements().get(p.id)?)
        })
        .requires(CapabilitySet::ELEMENTS),
        MethodSpec::read("element.exists", |ctx| {
            let p: ById = ctx.params()?;
            reply(ctx.adapter.elements().exists(p.id)?)
        })
        .requires(CapabilitySet::ELEMENTS),
        MethodSpec::read("element.byCategory", |ctx| {
            let p: ByCategory = ctx.params()?;
            reply(ctx.adapter.elements().by_category(&p.category)?)
        })
        .requires(CapabilitySet::ELEMENTS),
        MethodSpec::write("element.create", |ctx| {
            let p: CreateElement = ctx.params()?;
            reply(ctx.adapter.elements().create(&p.category, &p.name)?)
        })
        .requires(CapabilitySet::ELEMENTS | CapabilitySet::TRANSACTIONS),
        MethodSpec::write("element.delete", |ctx| {
            let p: ById = ctx.params()?;
            ctx.adapter.elements().delete(p.id)?;
            Ok(json!({ "deleted": p.id }))
        })
        .requires(CapabilitySet::ELEMENTS | CapabilitySet::TRANSACTIONS),
        MethodSpec::read("parameter.get", |ctx| {
            let p: GetParameter = ctx.params()?;
            reply(ctx.adapter.parameters().get(p.id, &p.name)?)
        })
        .requires(CapabilitySet::PARAMETERS),
        MethodSpec::read("parameter.list", |ctx| {
            let p: ById = ctx.params()?;
            reply(ctx.adapter.parameters().all(p.id)?)
        })
        .requires(CapabilitySet::PARAMETERS),
        MethodSpec::write("parameter.set", |ctx| {
            let p: SetParameter = ctx.params()?;
            ctx.adapter.parameters().set(p.id, &p.name, &p.value)?;
            reply(ctx.adapter.parameters().get(p.id, &p.name)?)
        })
        .requires(CapabilitySet::PARAMETERS | CapabilitySet::TRANSACTIONS),
    ]
}

fn geometry_methods() -> Vec<MethodSpec> {
    vec![
        MethodSpec::read("geometry.location", |ctx| {
            let p: ById = ctx.params()?;
            reply(ctx.adapter.geometry().location(p.id)?)
        })
        .requires(CapabilitySet::GEOMETRY)
        .feature(keys::GEOMETRY_API),
        MethodSpec::read("geometry.distance", |ctx| {
            let p: Pair = ctx.params()?;
            reply(ctx.adapter.geometry().distance(p.a, p.b)?)
        })
        .requires(CapabilitySet::GEOMETRY)
        .feature(keys::GEOMETRY_API),
        MethodSpec::write("geometry.move", |ctx| {
            let p: MoveElement = ctx.params()?;
            reply(ctx.adapter.geometry().move_by(p.id, p.delta)?)
        })
        .requires(CapabilitySet::GEOMETRY | CapabilitySet::TRANSACTIONS)
        .feature(keys::GEOMETRY_API),
    ]
}

fn ui_methods() -> Vec<MethodSpec> {
    vec![
        MethodSpec::read("selection.get", |ctx| reply(ctx.adapter.selection().get()?))
            .requires(CapabilitySet::SELECTION)
            .feature(keys::SELECTION_API),
        MethodSpec::write("selection.set", |ctx| {
            let p: Selection = ctx.params()?;
            ctx.adapter.selection().set(&p.ids)?;
            reply(ctx.adapter.selection().get()?)
        })
        .requires(CapabilitySet::SELECTION | CapabilitySet::TRANSACTIONS)
        .feature(keys::SELECTION_API),
        MethodSpec::read("view.list", |ctx| reply(ctx.adapter.views().list()?))
            .requires(CapabilitySet::VIEWS)
            .feature(keys::VIEW_API),
        MethodSpec::read("view.active", |ctx| reply(ctx.adapter.views().active()?))
            .requires(CapabilitySet::VIEWS)
            .feature(keys::VIEW_API),
        MethodSpec::write("view.activate", |ctx| {
            let p: ById = ctx.params()?;
            reply(ctx.adapter.views().activate(p.id)?)
        })
        .requires(CapabilitySet::VIEWS | CapabilitySet::TRANSACTIONS)
        .feature(keys::VIEW_API),
    ]
}

fn family_methods() -> Vec<MethodSpec> {
    vec![
        MethodSpec::read("family.symbols", |ctx: MethodContext| {
            let p: SymbolQuery = if ctx.params.is_null() { SymbolQuery::default() } else { ctx.params()? };
            reply(ctx.adapter.families().symbols(p.family.as_deref())?)
        })
        .requires(CapabilitySet::FAMILIES)
        .feature(keys::FAMILY_API),
        MethodSpec::write("family.place", |ctx| {
            let p: PlaceSymbol = ctx.params()?;
            reply(ctx.adapter.families().place(p.symbol, p.location)?)
        })
        .requires(CapabilitySet::FAMILIES | CapabilitySet::TRANSACTIONS)
        .feature(keys::FAMILY_API),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let methods = builtin_methods();
        let names: HashSet<_> = methods.iter().map(MethodSpec::name).collect();
        assert_eq!(names.len(), methods.len());
    }

    #[test]
    fn writes_need_transactions() {
        for method in builtin_methods() {
            if method.access() == crate::method::Access::Write {
                assert!(
                    method.capability().contains(CapabilitySet::TRANSACTIONS),
                    "{} mutates without requiring transactions",
                    method.name()
                );
            }
        }
    }
}
