//! Variable context — the namespace templates are rendered against.
//!
//! Three layers are merged in fixed precedence order:
//!
//! 1. `plugin` — host configuration ([`crate::ReleaseConfig::plugin_variables`])
//! 2. `option` — job-supplied runtime options
//! 3. `vars`   — the environment variable file (may be absent)
//!
//! A key defined by a higher layer is never replaced by a lower one.
//! Lower layers only fill keys that no higher layer defines.
//!
//! Templates see the merged keys at the top level. The unmerged layers
//! are also reachable as `vars.*`, `rundeck.plugin.*` and
//! `rundeck.option.*`, which existing release templates use, and under
//! `layers.{plugin,option,vars}`. Those three root names are reserved.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Key under which the unmerged layers are exposed to templates.
pub const LAYERS_KEY: &str = "layers";
/// Key exposing the environment variable file on its own.
pub const VARS_KEY: &str = "vars";
/// Key exposing the plugin and option layers as `rundeck.plugin` / `rundeck.option`.
pub const RUNDECK_KEY: &str = "rundeck";

/// Root names no layer may define.
pub const RESERVED_KEYS: [&str; 3] = [LAYERS_KEY, VARS_KEY, RUNDECK_KEY];

const LAYER_NAMES: [&str; 3] = ["plugin", "option", "vars"];

/// Immutable, merged variable namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableContext {
    merged: Map<String, Value>,
    layers: [Map<String, Value>; 3],
}

impl VariableContext {
    /// Look up a merged variable.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.merged.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.merged.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.merged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merged.is_empty()
    }

    /// The full rendering namespace: merged keys plus the reserved roots.
    pub fn to_value(&self) -> Value {
        let [plugin, option, vars] = &self.layers;
        let mut root = self.merged.clone();

        let layers: Map<String, Value> = LAYER_NAMES
            .iter()
            .zip(self.layers.iter())
            .map(|(name, layer)| (name.to_string(), Value::Object(layer.clone())))
            .collect();
        root.insert(LAYERS_KEY.to_string(), Value::Object(layers));
        root.insert(VARS_KEY.to_string(), Value::Object(vars.clone()));

        let mut rundeck = Map::new();
        rundeck.insert("plugin".to_string(), Value::Object(plugin.clone()));
        rundeck.insert("option".to_string(), Value::Object(option.clone()));
        root.insert(RUNDECK_KEY.to_string(), Value::Object(rundeck));

        Value::Object(root)
    }
}

/// Builder for [`VariableContext`].
#[derive(Debug, Default)]
pub struct VariableContextBuilder {
    plugin: Map<String, Value>,
    option: Map<String, Value>,
    vars: Option<Value>,
    required: Vec<String>,
}

impl VariableContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plugin(mut self, values: Map<String, Value>) -> Self {
        self.plugin = values;
        self
    }

    pub fn options(mut self, values: Map<String, Value>) -> Self {
        self.option = values;
        self
    }

    /// Parsed environment variable file. `None` or `null` means no file.
    pub fn environment(mut self, values: Option<Value>) -> Self {
        self.vars = values;
        self
    }

    /// Declare keys that must resolve in at least one layer.
    pub fn require<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> ConfigResult<VariableContext> {
        let vars = match self.vars {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(_) => return Err(ConfigError::LayerNotMapping { layer: "vars" }),
        };
        let layers = [self.plugin, self.option, vars];

        let mut merged = Map::new();
        for (name, layer) in LAYER_NAMES.iter().zip(layers.iter()) {
            if let Some(key) = RESERVED_KEYS.iter().find(|k| layer.contains_key(**k)) {
                return Err(ConfigError::ReservedKey {
                    layer: *name,
                    key: key.to_string(),
                });
            }
            for (key, value) in layer {
                if merged.contains_key(key) {
                    debug!(%key, layer = name, "variable shadowed by higher-precedence layer");
                    continue;
                }
                merged.insert(key.clone(), value.clone());
            }
        }

        if let Some(missing) = self.required.iter().find(|k| !merged.contains_key(k.as_str())) {
            return Err(ConfigError::MissingVariable(missing.clone()));
        }

        Ok(VariableContext { merged, layers })
    }
}
