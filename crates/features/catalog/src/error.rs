use std::borrow::Cow;

#[hb_derive::hb_error]
pub enum CatalogError {
    #[error("Invalid feature definition{}: {message}", format_context(.context))]
    InvalidDefinition { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown feature{}: {message}", format_context(.context))]
    UnknownFeature { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown dependency{}: {message}", format_context(.context))]
    UnknownDependency { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A prerequisite exists but is not enabled for the requested version.
    #[error("Missing dependency{}: {message}", format_context(.context))]
    MissingDependency { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Dependency cycle{}: {message}", format_context(.context))]
    DependencyCycle { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Feature incompatible{}: {message}", format_context(.context))]
    Incompatible { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Matrix serialization error{}: {source}", format_context(.context))]
    Serialize { source: serde_json::Error, context: Option<Cow<'static, str>> },
}
