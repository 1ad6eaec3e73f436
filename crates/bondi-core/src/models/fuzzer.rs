use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fuzzer {
    pub id: String,
    pub name: String,
    pub description: String,
    pub engine: String,
    pub lang: String,
    pub ci_integration: bool,
}

/// Body of a fuzzer creation request.
#[derive(Debug, Clone, Serialize)]
pub struct NewFuzzer {
    pub name: String,
    pub description: String,
    pub engine: String,
    pub lang: String,
    pub ci_integration: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedFuzzer {
    pub id: String,
    pub name: String,
}
