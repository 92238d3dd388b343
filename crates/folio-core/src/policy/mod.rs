//! Policy - severity classification and policy reference codes

mod classifier;
mod reference;

pub use classifier::CategoryClassifier;
pub use reference::{
    generate_policy_reference, is_valid_policy_reference, POLICY_REFERENCE_PATTERN,
    POLICY_REFERENCE_PREFIX,
};
