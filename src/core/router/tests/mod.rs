//! Router tests module
//!
//! Covers weight normalization, strategy construction, sticky bindings and
//! candidate ordering.


use crate::core::target::{Provider, Target};

/// OpenAI-dialect target at `http://<name>.test`
pub(super) fn target(name: &str) -> Target {
    Target::new(Provider::OpenAi, &format!("http://{}.test", name)).unwrap()
}

pub(super) fn weighted(name: &str, weight: f64) -> Target {
    target(name).with_weight(weight).unwrap()
}
