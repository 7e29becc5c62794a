//! The `function.json` descriptor and its shadow fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// Field naming the module that provides the handler.
pub const SCRIPT_FILE: &str = "scriptFile";

/// Field naming the export within the script file to invoke.
pub const ENTRY_POINT: &str = "entryPoint";

/// Shadow of [`SCRIPT_FILE`] written by pack.
pub const ORIGINAL_SCRIPT_FILE: &str = "_originalScriptFile";

/// Shadow of [`ENTRY_POINT`] written by pack.
pub const ORIGINAL_ENTRY_POINT: &str = "_originalEntryPoint";

/// Pre-pack value of a descriptor field.
///
/// On disk, `Unset` is a missing shadow field, `ExplicitlyNone` is `false` and
/// `Value` is the original string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shadow {
    /// The descriptor has never been packed.
    Unset,
    /// The original descriptor did not carry the field.
    ExplicitlyNone,
    /// The original value of the field.
    Value(String),
}

impl Shadow {
    /// Captures a live field so it can be stored as a shadow.
    ///
    /// Strings (including the empty string) are kept verbatim and a missing
    /// field becomes [`Shadow::ExplicitlyNone`]. Any other JSON value has no
    /// shadow form and yields `None`.
    pub fn capture(field: Option<&Json>) -> Option<Self> {
        match field {
            None => Some(Self::ExplicitlyNone),
            Some(Json::String(value)) => Some(Self::Value(value.clone())),
            Some(_) => None,
        }
    }

    /// Returns true unless the shadow is [`Shadow::Unset`].
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    fn from_json(field: Option<&Json>) -> std::result::Result<Self, String> {
        match field {
            None => Ok(Self::Unset),
            Some(Json::Bool(false)) => Ok(Self::ExplicitlyNone),
            Some(Json::String(value)) => Ok(Self::Value(value.clone())),
            Some(other) => Err(format!("expected a string or false, found {other}")),
        }
    }

    fn to_json(&self) -> Option<Json> {
        match self {
            Self::Unset => None,
            Self::ExplicitlyNone => Some(Json::Bool(false)),
            Self::Value(value) => Some(Json::String(value.clone())),
        }
    }
}

/// A function's `function.json`.
///
/// Only the handler pointers and their shadows are interpreted; every other
/// field is carried through untouched and in its original order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionDescriptor {
    fields: Map<String, Json>,
}

impl FunctionDescriptor {
    /// Returns the raw value of a field.
    pub fn get(&self, key: &str) -> Option<&Json> {
        self.fields.get(key)
    }

    /// Returns `scriptFile` when it is a string.
    pub fn script_file(&self) -> Option<&str> {
        self.fields.get(SCRIPT_FILE).and_then(Json::as_str)
    }

    /// Returns `entryPoint` when it is a string.
    pub fn entry_point(&self) -> Option<&str> {
        self.fields.get(ENTRY_POINT).and_then(Json::as_str)
    }

    pub fn original_script_file(&self) -> Shadow {
        Shadow::from_json(self.fields.get(ORIGINAL_SCRIPT_FILE)).unwrap_or(Shadow::Unset)
    }

    pub fn original_entry_point(&self) -> Shadow {
        Shadow::from_json(self.fields.get(ORIGINAL_ENTRY_POINT)).unwrap_or(Shadow::Unset)
    }

    /// A descriptor is packed as soon as either shadow field is present.
    pub fn is_packed(&self) -> bool {
        self.fields.contains_key(ORIGINAL_SCRIPT_FILE)
            || self.fields.contains_key(ORIGINAL_ENTRY_POINT)
    }

    /// Checks that shadow fields hold a string or `false`.
    pub fn validate(&self) -> std::result::Result<(), String> {
        for key in [ORIGINAL_SCRIPT_FILE, ORIGINAL_ENTRY_POINT] {
            Shadow::from_json(self.fields.get(key)).map_err(|reason| format!("{key}: {reason}"))?;
        }
        Ok(())
    }

    pub fn set_script_file(&mut self, script_file: &str) {
        self.fields
            .insert(SCRIPT_FILE.to_string(), Json::String(script_file.to_string()));
    }

    pub fn set_entry_point(&mut self, entry_point: &str) {
        self.fields
            .insert(ENTRY_POINT.to_string(), Json::String(entry_point.to_string()));
    }

    pub fn remove_script_file(&mut self) {
        self.fields.shift_remove(SCRIPT_FILE);
    }

    pub fn remove_entry_point(&mut self) {
        self.fields.shift_remove(ENTRY_POINT);
    }

    /// Stores a shadow for `scriptFile`; [`Shadow::Unset`] removes the field.
    pub fn set_original_script_file(&mut self, shadow: &Shadow) {
        self.set_shadow(ORIGINAL_SCRIPT_FILE, shadow);
    }

    /// Stores a shadow for `entryPoint`; [`Shadow::Unset`] removes the field.
    pub fn set_original_entry_point(&mut self, shadow: &Shadow) {
        self.set_shadow(ORIGINAL_ENTRY_POINT, shadow);
    }

    fn set_shadow(&mut self, key: &str, shadow: &Shadow) {
        match shadow.to_json() {
            Some(value) => {
                self.fields.insert(key.to_string(), value);
            }
            None => {
                self.fields.shift_remove(key);
            }
        }
    }
}

impl From<Map<String, Json>> for FunctionDescriptor {
    fn from(fields: Map<String, Json>) -> Self {
        Self { fields }
    }
}
