//! Environment identities for measured components
//!
//! An [`Environment`] names one measured component, either by class
//! (vendor/model/identifier attributes shared by a family of components),
//! by instance (a unique identifier for one physical unit), or both.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::{SerializeStruct, SerializeTuple};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

use crate::errors::{ComidError, ComidResult};

/// Class identifier backed by a UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassId(Uuid);

impl ClassId {
    /// Create a new random class identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClassId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ClassId> for Uuid {
    fn from(id: ClassId) -> Self {
        id.0
    }
}

/// Class attributes of an environment
///
/// Every field is optional, but a class with no field set at all does not
/// identify anything and fails validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    /// Class identifier shared by all units of this component family
    #[serde(rename = "id", skip_serializing_if = "Option::is_none")]
    pub class_id: Option<ClassId>,
    /// Vendor name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Model name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Topological layer of the component within its platform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<u64>,
    /// Position among components of the same class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
}

impl Class {
    /// Create an empty class
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a class identified by a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self {
            class_id: Some(ClassId::from_uuid(id)),
            ..Self::default()
        }
    }

    /// Set the vendor name
    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the topological layer
    pub fn with_layer(mut self, layer: u64) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Set the positional index
    pub fn with_index(mut self, index: u64) -> Self {
        self.index = Some(index);
        self
    }

    /// Check that the class identifies something
    ///
    /// At least one attribute must be set, and string attributes that are
    /// present must be non-empty.
    pub fn validate(&self) -> ComidResult<()> {
        if self.class_id.is_none()
            && self.vendor.is_none()
            && self.model.is_none()
            && self.layer.is_none()
            && self.index.is_none()
        {
            return Err(ComidError::EmptyClass);
        }

        if self.vendor.as_deref() == Some("") {
            return Err(ComidError::InvalidClass("empty vendor".to_string()));
        }

        if self.model.as_deref() == Some("") {
            return Err(ComidError::InvalidClass("empty model".to_string()));
        }

        Ok(())
    }
}

/// Minimum length of a UEID, one type byte plus six identifier bytes
const UEID_MIN_LEN: usize = 7;

/// Maximum length of a UEID, one type byte plus thirty-two identifier bytes
const UEID_MAX_LEN: usize = 33;

/// UEID type bytes accepted by [`Instance::ueid`]
const UEID_TYPES: [u8; 3] = [0x01, 0x02, 0x03];

/// Instance identifier of one physical unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instance {
    /// UUID-based instance identifier
    Uuid(Uuid),
    /// UEID-based instance identifier: a type byte followed by 6 to 32
    /// identifier bytes
    Ueid(Vec<u8>),
}

impl Instance {
    /// Create a UUID-based instance identifier
    pub fn uuid(id: Uuid) -> Self {
        Self::Uuid(id)
    }

    /// Create a UEID-based instance identifier, checking its shape
    pub fn ueid(bytes: impl Into<Vec<u8>>) -> ComidResult<Self> {
        let instance = Self::Ueid(bytes.into());
        instance.validate()?;
        Ok(instance)
    }

    /// Check that the identifier is well-formed
    pub fn validate(&self) -> ComidResult<()> {
        match self {
            Instance::Uuid(_) => Ok(()),
            Instance::Ueid(bytes) => {
                if bytes.len() < UEID_MIN_LEN || bytes.len() > UEID_MAX_LEN {
                    return Err(ComidError::InvalidInstance(format!(
                        "UEID length {} out of range [{UEID_MIN_LEN}, {UEID_MAX_LEN}]",
                        bytes.len()
                    )));
                }
                if !UEID_TYPES.contains(&bytes[0]) {
                    return Err(ComidError::InvalidInstance(format!(
                        "unknown UEID type byte {:#04x}",
                        bytes[0]
                    )));
                }
                Ok(())
            }
        }
    }
}

const INSTANCE_KIND_UUID: &str = "uuid";
const INSTANCE_KIND_UEID: &str = "ueid";

/// Byte-string wrapper so UEID payloads encode as a CBOR byte string
/// rather than an array of integers.
struct RawBytes(Vec<u8>);

impl Serialize for RawBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for RawBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BytesVisitor;

        impl<'de> Visitor<'de> for BytesVisitor {
            type Value = RawBytes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte string")
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                Ok(RawBytes(v.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Self::Value, E> {
                Ok(RawBytes(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(b) = seq.next_element::<u8>()? {
                    bytes.push(b);
                }
                Ok(RawBytes(bytes))
            }
        }

        deserializer.deserialize_byte_buf(BytesVisitor)
    }
}

// Textual form: a keyed object tagged by kind, with the UEID payload
// rendered as base64. Binary form: a two-element array of kind and payload,
// with the UEID payload as a byte string.
impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            let mut record = serializer.serialize_struct("Instance", 2)?;
            match self {
                Instance::Uuid(id) => {
                    record.serialize_field("type", INSTANCE_KIND_UUID)?;
                    record.serialize_field("value", &id.to_string())?;
                }
                Instance::Ueid(bytes) => {
                    record.serialize_field("type", INSTANCE_KIND_UEID)?;
                    record.serialize_field("value", &BASE64.encode(bytes))?;
                }
            }
            record.end()
        } else {
            let mut pair = serializer.serialize_tuple(2)?;
            match self {
                Instance::Uuid(id) => {
                    pair.serialize_element(INSTANCE_KIND_UUID)?;
                    pair.serialize_element(id)?;
                }
                Instance::Ueid(bytes) => {
                    pair.serialize_element(INSTANCE_KIND_UEID)?;
                    pair.serialize_element(&RawBytes(bytes.clone()))?;
                }
            }
            pair.end()
        }
    }
}

impl<'de> Deserialize<'de> for Instance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            #[derive(Deserialize)]
            struct Keyed {
                #[serde(rename = "type")]
                kind: String,
                value: String,
            }

            let keyed = Keyed::deserialize(deserializer)?;
            match keyed.kind.as_str() {
                INSTANCE_KIND_UUID => {
                    let id = Uuid::parse_str(&keyed.value).map_err(de::Error::custom)?;
                    Ok(Instance::Uuid(id))
                }
                INSTANCE_KIND_UEID => {
                    let bytes = BASE64.decode(&keyed.value).map_err(de::Error::custom)?;
                    Ok(Instance::Ueid(bytes))
                }
                other => Err(de::Error::custom(format!(
                    "unknown instance kind `{other}`"
                ))),
            }
        } else {
            struct PairVisitor;

            impl<'de> Visitor<'de> for PairVisitor {
                type Value = Instance;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a two-element instance array")
                }

                fn visit_seq<A: SeqAccess<'de>>(
                    self,
                    mut seq: A,
                ) -> Result<Self::Value, A::Error> {
                    let kind: String = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                    match kind.as_str() {
                        INSTANCE_KIND_UUID => {
                            let id: Uuid = seq
                                .next_element()?
                                .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                            Ok(Instance::Uuid(id))
                        }
                        INSTANCE_KIND_UEID => {
                            let bytes: RawBytes = seq
                                .next_element()?
                                .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                            Ok(Instance::Ueid(bytes.0))
                        }
                        other => Err(de::Error::custom(format!(
                            "unknown instance kind `{other}`"
                        ))),
                    }
                }
            }

            deserializer.deserialize_tuple(2, PairVisitor)
        }
    }
}

/// Identity of one measured component, by class and/or instance
///
/// An environment with neither part set identifies nothing and fails
/// validation. Environments are plain owned values; storing one in a
/// record copies it, so later mutation of the caller's original cannot
/// reach the stored copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Class attributes, if the environment is identified by class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<Class>,
    /// Instance identifier, if the environment is identified by instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<Instance>,
}

impl Environment {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the class attributes
    pub fn with_class(mut self, class: Class) -> Self {
        self.class = Some(class);
        self
    }

    /// Set the instance identifier
    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Check that the environment identifies something
    ///
    /// At least one of class or instance must be present, and whichever
    /// parts are present must themselves be well-formed.
    pub fn validate(&self) -> ComidResult<()> {
        if self.class.is_none() && self.instance.is_none() {
            return Err(ComidError::EmptyEnvironment);
        }

        if let Some(class) = &self.class {
            class.validate()?;
        }

        if let Some(instance) = &self.instance {
            instance.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const TEST_UUID: Uuid = Uuid::from_bytes([
        0x31, 0xfb, 0x5a, 0xbf, 0x02, 0x3e, 0x49, 0x92, 0xaa, 0x4e, 0x95, 0xf9, 0xc1, 0x50,
        0x3b, 0xfa,
    ]);

    #[test]
    fn test_empty_environment_is_invalid() {
        let env = Environment::new();
        let err = env.validate().unwrap_err();
        assert!(matches!(err, ComidError::EmptyEnvironment));
    }

    #[test]
    fn test_environment_with_class_only_is_valid() {
        let env = Environment::new()
            .with_class(Class::new().with_vendor("ACME").with_model("Roadrunner"));
        assert!(env.validate().is_ok());
    }

    #[test]
    fn test_environment_with_instance_only_is_valid() {
        let env = Environment::new().with_instance(Instance::uuid(TEST_UUID));
        assert!(env.validate().is_ok());
    }

    #[test]
    fn test_empty_class_is_invalid() {
        let env = Environment::new().with_class(Class::new());
        let err = env.validate().unwrap_err();
        assert!(matches!(err, ComidError::EmptyClass));
    }

    #[test]
    fn test_empty_vendor_string_is_invalid() {
        let env = Environment::new().with_class(Class::new().with_vendor(""));
        let err = env.validate().unwrap_err();
        assert!(err.to_string().contains("empty vendor"));
    }

    #[test_case(&[0x02, 1, 2, 3, 4, 5, 6] => true; "minimum length EUI")]
    #[test_case(&[0x01, 1, 2, 3, 4, 5, 6, 7, 8] => true; "RAND type")]
    #[test_case(&[0x03, 1, 2, 3, 4, 5, 6, 7] => true; "IMEI type")]
    #[test_case(&[0x02, 1, 2] => false; "too short")]
    #[test_case(&[0x07, 1, 2, 3, 4, 5, 6] => false; "unknown type byte")]
    fn test_ueid_shape(bytes: &[u8]) -> bool {
        Instance::ueid(bytes.to_vec()).is_ok()
    }

    #[test]
    fn test_ueid_too_long_is_rejected() {
        let mut bytes = vec![0x01];
        bytes.extend(std::iter::repeat(0xab).take(33));
        assert!(Instance::ueid(bytes).is_err());
    }

    #[test]
    fn test_instance_json_round_trip() {
        let instance = Instance::ueid(vec![0x02, 1, 2, 3, 4, 5, 6]).unwrap();
        let json = serde_json::to_string(&instance).unwrap();
        let back: Instance = serde_json::from_str(&json).unwrap();
        assert_eq!(instance, back);
    }

    #[test]
    fn test_instance_cbor_round_trip() {
        let instance = Instance::uuid(TEST_UUID);
        let cbor = serde_cbor::to_vec(&instance).unwrap();
        let back: Instance = serde_cbor::from_slice(&cbor).unwrap();
        assert_eq!(instance, back);
    }

    #[test]
    fn test_environment_json_uses_keyed_fields() {
        let env = Environment::new()
            .with_class(Class::from_uuid(TEST_UUID).with_vendor("ACME"))
            .with_instance(Instance::uuid(TEST_UUID));
        let value: serde_json::Value = serde_json::to_value(&env).unwrap();
        assert!(value.get("class").is_some());
        assert!(value.get("instance").is_some());
        assert_eq!(value["class"]["vendor"], "ACME");
    }

    #[test]
    fn test_absent_parts_are_omitted_from_json() {
        let env = Environment::new().with_instance(Instance::uuid(TEST_UUID));
        let value: serde_json::Value = serde_json::to_value(&env).unwrap();
        assert!(value.get("class").is_none());
    }
}
