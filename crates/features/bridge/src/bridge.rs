use crate::builtin::builtin_methods;
use crate::envelope::CallResponse;
use crate::error::BridgeError;
use crate::method::{Access, MethodContext, MethodSpec, MethodTable};
use fxhash::FxHashMap;
use hb_adapters::{Adapter, AdapterContext, AdapterRegistry, HostApplication};
use hb_catalog::FeatureResolver;
use hb_domain::config::CallConfig;
use hb_domain::{HostVersion, VersionInfo};
use hb_kernel::security::PayloadGuard;
use parking_lot::{Mutex, RwLock};
use serde_json::Value as Json;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

type InFlight = Arc<Mutex<FxHashMap<String, CancellationToken>>>;

/// The single entry point for external callers.
///
/// Every call goes through the same pipeline: connection check, payload size, JSON parse,
/// injection scan, method lookup, capability and feature gates, then dispatch with a deadline.
/// Mutating methods run inside a transaction and hold the adapter's mutation slot; reads run
/// concurrently. Errors never escape as panics: they come back as typed [`BridgeError`]s or
/// failure envelopes.
#[derive(Debug)]
pub struct CallBridge {
    guard: PayloadGuard,
    config: CallConfig,
    registry: Arc<AdapterRegistry>,
    methods: RwLock<MethodTable>,
    active: RwLock<Option<Arc<Adapter>>>,
    in_flight: InFlight,
    late_results: Arc<AtomicU64>,
}

/// Removes a call from the in-flight table however the call ends.
struct Tracked {
    id: String,
    in_flight: InFlight,
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.id);
    }
}

impl CallBridge {
    /// A disconnected bridge serving the built-in methods.
    pub fn new(config: &CallConfig, registry: Arc<AdapterRegistry>) -> Result<Self, BridgeError> {
        let mut methods = MethodTable::new();
        for spec in builtin_methods() {
            methods.register(spec);
        }
        Ok(Self {
            guard: PayloadGuard::from_config(config)?,
            config: config.clone(),
            registry,
            methods: RwLock::new(methods),
            active: RwLock::new(None),
            in_flight: Arc::new(Mutex::new(FxHashMap::default())),
            late_results: Arc::new(AtomicU64::new(0)),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &CallConfig {
        &self.config
    }

    #[must_use]
    pub fn resolver(&self) -> &FeatureResolver {
        self.registry.resolver()
    }

    #[must_use]
    pub const fn registry(&self) -> &Arc<AdapterRegistry> {
        &self.registry
    }

    /// Builds (or reuses) the adapter for the detected version and makes it the active one. An
    /// adapter cached for another host handle is rebuilt against `host`.
    #[instrument(skip_all, fields(version = %info.version, product = %info.product))]
    pub fn try_connect(
        &self,
        host: Arc<dyn HostApplication>,
        info: &VersionInfo,
    ) -> Result<Arc<Adapter>, BridgeError> {
        if info.version == HostVersion::Unknown {
            return Err(BridgeError::Detection {
                message: format!("'{}' is not a supported host version", info.display).into(),
                context: Some(info.product.clone().into()),
            });
        }

        let adapter = self.registry.initialize(info.version, &AdapterContext::new(host))?;
        *self.active.write() = Some(Arc::clone(&adapter));
        info!(strategy = adapter.strategy_name(), "Bridge connected");
        Ok(adapter)
    }

    /// Like [`Self::try_connect`], reporting only whether it worked.
    pub fn connect(&self, host: Arc<dyn HostApplication>, info: &VersionInfo) -> bool {
        match self.try_connect(host, info) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Bridge connection failed");
                false
            },
        }
    }

    /// Drops the active adapter. Calls already dispatched keep running against it.
    pub fn disconnect(&self) {
        if self.active.write().take().is_some() {
            info!("Bridge disconnected");
        }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.active.read().is_some()
    }

    #[must_use]
    pub fn adapter(&self) -> Option<Arc<Adapter>> {
        self.active.read().clone()
    }

    /// Adds or replaces a method. Returns true when an existing method was replaced.
    pub fn register_method(&self, spec: MethodSpec) -> bool {
        let name = spec.name().to_owned();
        let replaced = self.methods.write().register(spec).is_some();
        debug!(method = %name, replaced, "Method registered");
        replaced
    }

    #[must_use]
    pub fn method_names(&self) -> Vec<String> {
        self.methods.read().names()
    }

    /// Calls `method` under a fresh request id and returns the JSON response envelope.
    pub async fn call(&self, method: &str, params: &str, timeout_ms: Option<u64>) -> String {
        let id = hb_kernel::request_id();
        self.call_with_id(&id, method, params, timeout_ms).await.to_json()
    }

    /// Calls `method` under the caller's request id, usable with [`Self::cancel`].
    pub async fn call_with_id(
        &self,
        request_id: &str,
        method: &str,
        params: &str,
        timeout_ms: Option<u64>,
    ) -> CallResponse {
        let outcome = self.try_call(request_id, method, params, timeout_ms).await;
        CallResponse::from_outcome(request_id.to_owned(), outcome)
    }

    /// Runs the full call pipeline and returns the typed outcome.
    pub async fn try_call(
        &self,
        request_id: &str,
        method: &str,
        params: &str,
        timeout_ms: Option<u64>,
    ) -> Result<Json, BridgeError> {
        let span = info_span!("call", %request_id, %method);
        let started = Instant::now();
        let outcome = self.dispatch(request_id, method, params, timeout_ms).instrument(span.clone()).await;
        let elapsed_ms = started.elapsed().as_millis();
        span.in_scope(|| match &outcome {
            Ok(_) => info!(elapsed_ms, "Call completed"),
            Err(e) => warn!(elapsed_ms, code = e.kind(), error = %e, "Call failed"),
        });
        outcome
    }

    /// Signals a running call to stop waiting. The caller gets [`BridgeError::Cancelled`]; the
    /// host operation itself is not interrupted. Returns false for unknown ids.
    pub fn cancel(&self, request_id: &str) -> bool {
        let token = self.in_flight.lock().get(request_id).cloned();
        token.is_some_and(|token| {
            token.cancel();
            info!(%request_id, "Call cancelled");
            true
        })
    }

    #[must_use]
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Results that arrived after their caller had stopped waiting and were thrown away.
    #[must_use]
    pub fn late_results(&self) -> u64 {
        self.late_results.load(Ordering::Relaxed)
    }

    /// Effective deadline: the requested one (zero or absent means the default), capped at the
    /// configured maximum.
    #[must_use]
    pub fn effective_timeout(&self, timeout_ms: Option<u64>) -> Duration {
        let requested =
            timeout_ms.filter(|ms| *ms > 0).unwrap_or(self.config.default_timeout_ms);
        Duration::from_millis(requested.min(self.config.max_timeout_ms))
    }

    async fn dispatch(
        &self,
        request_id: &str,
        method: &str,
        params: &str,
        timeout_ms: Option<u64>,
    ) -> Result<Json, BridgeError> {
        let adapter = self.adapter().ok_or_else(|| BridgeError::NotConnected {
            message: "no host adapter is active".into(),
            context: Some(method.to_owned().into()),
        })?;

        self.guard.check_size(params)?;
        let params = self.guard.parse(params)?;
        self.guard.scan(&params)?;
        debug!(params = %self.guard.excerpt(&params.to_string()), "Payload accepted");

        let spec = self.methods.read().get(method).ok_or_else(|| BridgeError::MethodNotFound {
            message: method.to_owned().into(),
            context: None,
        })?;
        adapter.require_capability(spec.capability())?;
        if let Some(feature) = spec.required_feature() {
            self.check_feature(&adapter, feature)?;
        }

        let timeout = self.effective_timeout(timeout_ms);
        let token = CancellationToken::new();
        let _tracked = self.track(request_id, token.clone())?;
        let _abandon_on_return = token.clone().drop_guard();

        let context = MethodContext {
            request_id: request_id.to_owned(),
            adapter: Arc::clone(&adapter),
            resolver: self.resolver().clone(),
            params,
        };
        let receiver =
            spawn_operation(&spec, context, token.clone(), Arc::clone(&self.late_results));

        tokio::select! {
            outcome = receiver => outcome.unwrap_or_else(|_| Err(BridgeError::Internal {
                message: "operation ended without a result".into(),
                context: Some(method.to_owned().into()),
            })),
            () = tokio::time::sleep(timeout) => Err(BridgeError::Timeout {
                message: format!("no result within {} ms", timeout.as_millis()).into(),
                context: Some(method.to_owned().into()),
            }),
            () = token.cancelled() => Err(BridgeError::Cancelled {
                message: format!("request '{request_id}' was cancelled").into(),
                context: Some(method.to_owned().into()),
            }),
        }
    }

    /// The feature must be enabled on the connected version, its prerequisites enabled, and the
    /// adapter able to serve the whole chain.
    fn check_feature(&self, adapter: &Adapter, feature: &str) -> Result<(), BridgeError> {
        let validation = self.resolver().validate_dependencies(feature, adapter.version());
        if !validation.status.is_some_and(|s| s.is_enabled()) {
            let reason = validation.errors.first().cloned().unwrap_or_else(|| {
                format!("'{feature}' is not enabled on {}", adapter.version())
            });
            return Err(BridgeError::Compatibility { message: reason.into(), context: None });
        }
        if let Some(e) = validation.to_error() {
            return Err(e.into());
        }
        adapter.resolve_feature(feature)?;
        Ok(())
    }

    fn track(&self, request_id: &str, token: CancellationToken) -> Result<Tracked, BridgeError> {
        let mut in_flight = self.in_flight.lock();
        if in_flight.contains_key(request_id) {
            return Err(BridgeError::validation(format!("request id '{request_id}' is already in flight")));
        }
        in_flight.insert(request_id.to_owned(), token);
        Ok(Tracked { id: request_id.to_owned(), in_flight: Arc::clone(&self.in_flight) })
    }
}

/// Starts the operation detached from the caller. Its result is delivered through the returned
/// receiver, or counted and dropped if nobody is listening anymore.
///
/// `abandoned` fires once the caller stops waiting. An operation that has not started by then
/// is skipped; one already running is left to finish.
fn spawn_operation(
    spec: &MethodSpec,
    context: MethodContext,
    abandoned: CancellationToken,
    late_results: Arc<AtomicU64>,
) -> oneshot::Receiver<Result<Json, BridgeError>> {
    let (sender, receiver) = oneshot::channel();
    let name = spec.name().to_owned();
    let handler = {
        let handler = spec.handler();
        let name = name.clone();
        move |context: MethodContext| {
            if abandoned.is_cancelled() {
                return Err(BridgeError::Cancelled {
                    message: "caller stopped waiting before the operation started".into(),
                    context: Some(name.into()),
                });
            }
            handler(context)
        }
    };
    let access = spec.access();
    let coordinator = context.adapter.transactions().coordinator().clone();

    tokio::spawn(
        async move {
            let outcome = match access {
                Access::Read => coordinator
                    .execute_shared(move || catch_unwind(AssertUnwindSafe(|| handler(context))))
                    .await
                    .map_err(BridgeError::from)
                    .and_then(|caught| {
                        caught.unwrap_or_else(|payload| {
                            Err(BridgeError::operation(format!(
                                "operation panicked: {}",
                                panic_message(payload.as_ref())
                            )))
                        })
                    }),
                Access::Write => coordinator
                    .execute_exclusive(&name, move || handler(context))
                    .await
                    .map_err(BridgeError::from),
            };
            if sender.send(outcome).is_err() {
                late_results.fetch_add(1, Ordering::Relaxed);
                debug!(method = %name, "Discarding late result");
            }
        }
        .in_current_span(),
    );
    receiver
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
