use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Untyped route parameters, keyed by name.
pub type Params = serde_json::Map<String, serde_json::Value>;

/// Where a navigation attempt came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    UserAction,
    Redirect,
    Programmatic,
}

/// A single navigation attempt. Consumed by the resolver, then discarded
/// (or carried along as the `returnTo` parameter of the login screen).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    pub target: String,
    #[serde(default)]
    pub params: Params,
    pub origin: Origin,
}

impl NavigationRequest {
    pub fn new(target: &str, params: Params, origin: Origin) -> Self {
        Self {
            target: target.to_string(),
            params,
            origin,
        }
    }

    /// Deserializes the parameters into a typed struct.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(serde_json::Value::Object(self.params.clone()))
    }

    /// Recovers a request stored as a JSON value (e.g. a `returnTo` param).
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_value(&self) -> serde_json::Value {
        // Serializing a plain struct of strings and JSON values cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Builds a `Params` map from key/value pairs.
pub fn params<K, V, I>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
