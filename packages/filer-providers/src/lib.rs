pub mod generate;

pub use generate::{extract_json, generate, strip_code_fences};
