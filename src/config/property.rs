// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named, typed handler properties.
//!
//! A handler declares its properties when it is constructed. Operators (or a
//! pipeline definition) fill in values, and a processor refuses to start while
//! any required property is still empty.
//!
//! # Example
//! ```
//! use flowbus::config::Configuration;
//!
//! let cfg = Configuration::new();
//! cfg.add_property("path", "the directory to watch", true);
//! assert_eq!(cfg.validate_properties(), Err(vec!["path".to_string()]));
//!
//! cfg.set_property("path", "/tmp/incoming").unwrap();
//! assert!(cfg.validate_properties().is_ok());
//! assert_eq!(cfg.get_property("path").unwrap().string().unwrap(), "/tmp/incoming");
//! ```

use parking_lot::RwLock;
use std::collections::HashMap;

use crate::errors::PropertyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Int,
    Bool,
    Map,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::String => "string",
            PropertyKind::Int => "integer",
            PropertyKind::Bool => "boolean",
            PropertyKind::Map => "map",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    Bool(bool),
    Map(HashMap<String, String>),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::String(_) => PropertyKind::String,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Map(_) => PropertyKind::Map,
        }
    }

    /// Convert a value read from a YAML pipeline definition.
    ///
    /// Maps must have scalar keys and values; scalars are kept as strings.
    pub fn from_yaml(name: &str, value: &serde_yaml::Value) -> Result<Self, PropertyError> {
        use serde_yaml::Value;

        let unsupported = |reason: &str| PropertyError::Unsupported {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        match value {
            Value::String(s) => Ok(PropertyValue::String(s.clone())),
            Value::Bool(b) => Ok(PropertyValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(PropertyValue::Int)
                .ok_or_else(|| unsupported("only integer numbers are supported")),
            Value::Mapping(mapping) => {
                let mut map = HashMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let key = yaml_scalar(key).ok_or_else(|| unsupported("map keys must be scalars"))?;
                    let value =
                        yaml_scalar(value).ok_or_else(|| unsupported("map values must be scalars"))?;
                    map.insert(key, value);
                }
                Ok(PropertyValue::Map(map))
            }
            Value::Null => Err(unsupported("null values are not allowed")),
            Value::Sequence(_) => Err(unsupported("sequences are not supported")),
            Value::Tagged(_) => Err(unsupported("tagged values are not supported")),
        }
    }
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    use serde_yaml::Value;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value.into())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<HashMap<String, String>> for PropertyValue {
    fn from(value: HashMap<String, String>) -> Self {
        PropertyValue::Map(value)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for PropertyValue {
    fn from(pairs: [(&str, &str); N]) -> Self {
        PropertyValue::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub description: String,
    pub required: bool,
    kind: Option<PropertyKind>,
    value: Option<PropertyValue>,
}

impl Property {
    pub fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn kind(&self) -> Option<PropertyKind> {
        self.kind
    }

    fn present(&self) -> Result<&PropertyValue, PropertyError> {
        self.value
            .as_ref()
            .ok_or_else(|| PropertyError::NoValue(self.name.clone()))
    }

    fn mismatch(&self, expected: PropertyKind, actual: &PropertyValue) -> PropertyError {
        PropertyError::TypeMismatch {
            name: self.name.clone(),
            expected: expected.as_str(),
            actual: actual.kind().as_str(),
        }
    }

    pub fn string(&self) -> Result<String, PropertyError> {
        match self.present()? {
            PropertyValue::String(s) => Ok(s.clone()),
            other => Err(self.mismatch(PropertyKind::String, other)),
        }
    }

    pub fn int(&self) -> Result<i32, PropertyError> {
        let value = self.int64()?;
        i32::try_from(value).map_err(|_| PropertyError::OutOfRange {
            name: self.name.clone(),
            value,
        })
    }

    pub fn int64(&self) -> Result<i64, PropertyError> {
        match self.present()? {
            PropertyValue::Int(i) => Ok(*i),
            other => Err(self.mismatch(PropertyKind::Int, other)),
        }
    }

    pub fn bool(&self) -> Result<bool, PropertyError> {
        match self.present()? {
            PropertyValue::Bool(b) => Ok(*b),
            other => Err(self.mismatch(PropertyKind::Bool, other)),
        }
    }

    pub fn map(&self) -> Result<HashMap<String, String>, PropertyError> {
        match self.present()? {
            PropertyValue::Map(m) => Ok(m.clone()),
            other => Err(self.mismatch(PropertyKind::Map, other)),
        }
    }
}

/// The property set of one handler.
///
/// Interior locking lets the configuration be edited through a handler that is
/// already shared with its processor.
#[derive(Debug, Default)]
pub struct Configuration {
    properties: RwLock<Vec<Property>>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property whose kind is fixed by the first value it receives.
    ///
    /// Declaring an existing name updates its description and required flag
    /// and keeps any value already set.
    pub fn add_property(&self, name: &str, description: &str, required: bool) {
        self.declare(name, description, required, None);
    }

    /// Declare a property that only accepts values of `kind`.
    pub fn add_typed_property(
        &self,
        name: &str,
        description: &str,
        required: bool,
        kind: PropertyKind,
    ) {
        self.declare(name, description, required, Some(kind));
    }

    fn declare(&self, name: &str, description: &str, required: bool, kind: Option<PropertyKind>) {
        let mut properties = self.properties.write();
        match properties.iter_mut().find(|p| p.name == name) {
            Some(existing) => {
                existing.description = description.to_string();
                existing.required = required;
                if kind.is_some() {
                    existing.kind = kind;
                }
            }
            None => properties.push(Property {
                name: name.to_string(),
                description: description.to_string(),
                required,
                kind,
                value: None,
            }),
        }
    }

    pub fn get_property(&self, name: &str) -> Option<Property> {
        self.properties.read().iter().find(|p| p.name == name).cloned()
    }

    pub fn set_property(
        &self,
        name: &str,
        value: impl Into<PropertyValue>,
    ) -> Result<(), PropertyError> {
        let value = value.into();
        let mut properties = self.properties.write();
        let property = properties
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| PropertyError::NoSuchProperty(name.to_string()))?;

        let kind = *property.kind.get_or_insert(value.kind());
        if kind != value.kind() {
            return Err(PropertyError::TypeMismatch {
                name: name.to_string(),
                expected: kind.as_str(),
                actual: value.kind().as_str(),
            });
        }

        property.value = Some(value);
        Ok(())
    }

    /// Names of every required property that has no value yet.
    pub fn validate_properties(&self) -> Result<(), Vec<String>> {
        let missing: Vec<String> = self
            .properties
            .read()
            .iter()
            .filter(|p| p.required && p.value.is_none())
            .map(|p| p.name.clone())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }

    pub fn properties(&self) -> Vec<Property> {
        self.properties.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_property_blocks_validation_until_set() {
        let cfg = Configuration::new();
        cfg.add_property("path", "where to look", true);
        cfg.add_property("buffertime", "how long to remember", false);

        assert_eq!(cfg.validate_properties(), Err(vec!["path".to_string()]));

        cfg.set_property("path", "testing").unwrap();
        assert_eq!(cfg.validate_properties(), Ok(()));
    }

    #[test]
    fn test_set_unknown_property_fails() {
        let cfg = Configuration::new();
        let err = cfg.set_property("nope", true).unwrap_err();
        assert_eq!(err, PropertyError::NoSuchProperty("nope".to_string()));
    }

    #[test]
    fn test_first_value_pins_kind() {
        let cfg = Configuration::new();
        cfg.add_property("forward", "", false);
        cfg.set_property("forward", true).unwrap();

        let err = cfg.set_property("forward", "yes").unwrap_err();
        assert!(matches!(err, PropertyError::TypeMismatch { expected: "boolean", .. }));
    }

    #[test]
    fn test_typed_property_rejects_other_kinds() {
        let cfg = Configuration::new();
        cfg.add_typed_property("headerlength", "", false, PropertyKind::Int);

        assert!(cfg.set_property("headerlength", "one").is_err());
        cfg.set_property("headerlength", 2).unwrap();
        assert_eq!(cfg.get_property("headerlength").unwrap().int().unwrap(), 2);
    }

    #[test]
    fn test_typed_accessors() {
        struct TestCase {
            name: &'static str,
            value: PropertyValue,
            expect_string: bool,
            expect_int: bool,
            expect_bool: bool,
            expect_map: bool,
        }

        let test_cases = vec![
            TestCase {
                name: "string",
                value: "abc".into(),
                expect_string: true,
                expect_int: false,
                expect_bool: false,
                expect_map: false,
            },
            TestCase {
                name: "int",
                value: 5.into(),
                expect_string: false,
                expect_int: true,
                expect_bool: false,
                expect_map: false,
            },
            TestCase {
                name: "bool",
                value: false.into(),
                expect_string: false,
                expect_int: false,
                expect_bool: true,
                expect_map: false,
            },
            TestCase {
                name: "map",
                value: [("username", "percybolmer")].into(),
                expect_string: false,
                expect_int: false,
                expect_bool: false,
                expect_map: true,
            },
        ];

        for case in test_cases {
            let cfg = Configuration::new();
            cfg.add_property("p", "", false);
            cfg.set_property("p", case.value).unwrap();
            let prop = cfg.get_property("p").unwrap();

            assert_eq!(prop.string().is_ok(), case.expect_string, "{}", case.name);
            assert_eq!(prop.int().is_ok(), case.expect_int, "{}", case.name);
            assert_eq!(prop.int64().is_ok(), case.expect_int, "{}", case.name);
            assert_eq!(prop.bool().is_ok(), case.expect_bool, "{}", case.name);
            assert_eq!(prop.map().is_ok(), case.expect_map, "{}", case.name);
        }
    }

    #[test]
    fn test_int_out_of_range_and_missing_value() {
        let cfg = Configuration::new();
        cfg.add_property("big", "", false);
        assert_eq!(
            cfg.get_property("big").unwrap().int64(),
            Err(PropertyError::NoValue("big".to_string()))
        );

        cfg.set_property("big", i64::MAX).unwrap();
        let prop = cfg.get_property("big").unwrap();
        assert_eq!(prop.int64().unwrap(), i64::MAX);
        assert!(matches!(prop.int(), Err(PropertyError::OutOfRange { .. })));
    }

    #[test]
    fn test_from_yaml_values() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            r#"
path: testing
buffertime: 5
append: true
filters:
  username: percybolmer
  age: 30
bad: [1, 2]
"#,
        )
        .unwrap();

        let get = |key: &str| PropertyValue::from_yaml(key, &yaml[key]);

        assert_eq!(get("path").unwrap(), PropertyValue::String("testing".into()));
        assert_eq!(get("buffertime").unwrap(), PropertyValue::Int(5));
        assert_eq!(get("append").unwrap(), PropertyValue::Bool(true));
        match get("filters").unwrap() {
            PropertyValue::Map(map) => {
                assert_eq!(map["username"], "percybolmer");
                assert_eq!(map["age"], "30");
            }
            other => panic!("expected a map, got {:?}", other),
        }
        assert!(matches!(get("bad"), Err(PropertyError::Unsupported { .. })));
    }
}
