use hb_derive::hb_error;
use std::borrow::Cow;

#[hb_error]
pub enum SampleError {
    #[error("Parse failure{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal sample error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<i32, SampleError> {
    raw.parse::<i32>().context("parsing sample")
}

#[test]
fn hb_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/hb_error_pass.rs");
    t.compile_fail("tests/ui/hb_error_no_context.rs");
    t.compile_fail("tests/ui/hb_error_tuple_variant.rs");
}

#[test]
fn source_errors_convert_with_context() {
    let err = parse("nope").unwrap_err();
    assert_eq!(err.kind(), "Parse");
    assert!(err.to_string().starts_with("Parse failure (parsing sample):"));
}

#[test]
fn context_is_attached_to_own_variants() {
    let result: Result<(), SampleError> =
        Err(SampleError::Rejected { message: "bad input".into(), context: None });
    let err = result.context("validating").unwrap_err();
    assert_eq!(err.to_string(), "Rejected (validating): bad input");
    assert_eq!(err.kind(), "Rejected");
}

#[test]
fn strings_map_to_internal() {
    let err: SampleError = String::from("unexpected").into();
    assert_eq!(err.kind(), "Internal");
    assert_eq!(err.to_string(), "Internal sample error: unexpected");
}
