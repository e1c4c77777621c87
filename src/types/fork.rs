use serde::{Deserialize, Serialize};

/// A GitHub fork of the upstream repository. `name` is the owner login and
/// doubles as the name of its remote in the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fork {
    pub name: String,
    pub full_name: String,
    pub url: String,
}
