use hb_derive::hb_error;

#[hb_error]
pub enum DemoError {
    Io(std::io::Error),
}

fn main() {}
