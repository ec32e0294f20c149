use hb_derive::hb_error;

#[hb_error]
pub enum DemoError {
    #[error("I/O failure: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },
}

fn main() {}
