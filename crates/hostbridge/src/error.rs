use hb_bridge::BridgeError;
use hb_catalog::CatalogError;
use hb_kernel::config::ConfigError;
use std::borrow::Cow;

#[hb_derive::hb_error]
pub enum HostBridgeError {
    #[error("Configuration error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Feature catalog error{}: {source}", format_context(.context))]
    Catalog { source: CatalogError, context: Option<Cow<'static, str>> },

    #[error("Bridge error{}: {source}", format_context(.context))]
    Bridge { source: BridgeError, context: Option<Cow<'static, str>> },
}
