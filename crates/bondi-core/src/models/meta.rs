use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fuzzing engines available for each fuzzer language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuzzerConfigurations(pub BTreeMap<String, Vec<String>>);

impl FuzzerConfigurations {
    pub fn engines(&self, lang: &str) -> Option<&[String]> {
        self.0.get(lang).map(Vec::as_slice)
    }

    /// `(language, "engine, engine")` rows for display.
    pub fn display_rows(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(lang, engines)| (lang.clone(), engines.join(", ")))
            .collect()
    }
}
