use crate::cli::Format;
use anyhow::{Context as _, bail};
use hostbridge::prelude::*;
use serde_json::json;
use std::io::{self, Write};
use std::sync::Arc;

fn emit(text: &str) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{text}")?;
    Ok(())
}

fn emit_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    emit(&serde_json::to_string_pretty(value)?)
}

pub(crate) fn detect(context: &BridgeContext) -> anyhow::Result<()> {
    let info = context.detect();
    let report = context.report();
    emit_json(&json!({ "detected": info.as_ref(), "report": report }))
}

pub(crate) fn matrix(context: &BridgeContext, format: Format) -> anyhow::Result<()> {
    let matrix = context.resolver().compatibility_matrix();
    match format {
        Format::Json => emit(&matrix.to_json()?),
        Format::Markdown => emit(&matrix.to_markdown()),
    }
}

pub(crate) fn check(context: &BridgeContext, feature: &str, year: Option<u32>) -> anyhow::Result<()> {
    let version = target_version(context, year)?;
    let result = context.resolver().validate_dependencies(feature, version);
    emit_json(&result)?;
    if !result.is_valid() {
        bail!("'{feature}' cannot be used on {version}");
    }
    Ok(())
}

pub(crate) async fn call(
    context: &BridgeContext,
    method: &str,
    params: &str,
    timeout_ms: Option<u64>,
    host_year: Option<u32>,
) -> anyhow::Result<()> {
    let version = target_version(context, host_year)?;
    let year = version.year().context("no release year for the target version")?;
    let product = context.config().detection.product_name.clone();
    let info = VersionInfo::known(version, product, context.detect().source);
    context
        .bridge()
        .try_connect(Arc::new(SimulatedHost::new(year)), &info)
        .context("Connecting to the simulated host")?;

    let raw = context.bridge().call(method, params, timeout_ms).await;
    let response = CallResponse::from_json(&raw)?;
    emit_json(&response)?;
    if let Some(code) = response.code() {
        bail!("call failed with {code}");
    }
    Ok(())
}

fn target_version(context: &BridgeContext, year: Option<u32>) -> anyhow::Result<HostVersion> {
    let version = year.map_or_else(|| context.detect().version, HostVersion::from_year);
    if version == HostVersion::Unknown {
        bail!("no supported host version; pass one explicitly or set the override variable");
    }
    Ok(version)
}
