use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Maps registrar-specific fund codes (CAMS product codes) to canonical
/// scheme codes.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct SchemeMap {
    codes: HashMap<String, String>,
}

impl SchemeMap {
    pub fn load(path: &Path) -> Result<Self> {
        let failed = |message: String| Error::SchemeMap {
            path: path.to_path_buf(),
            message,
        };
        let content = fs::read_to_string(path).map_err(|e| failed(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| failed(e.to_string()))
    }

    /// `fund` only names the scheme in the error when the code is unknown.
    pub fn resolve(&self, issuer_code: &str, fund: &str) -> Result<&str> {
        self.codes
            .get(issuer_code)
            .map(String::as_str)
            .ok_or_else(|| Error::Mapping {
                code: issuer_code.to_string(),
                fund: fund.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SchemeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        SchemeMap {
            codes: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
