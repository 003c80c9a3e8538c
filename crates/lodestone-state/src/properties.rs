use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::error::{Result, StateError};

/// Reserved property carrying raw legacy data for blocks without a declared layout.
pub const LEGACY_PROPERTY_NAME: &str = "legacy_data";

/// Storage is a `u64`; layouts wider than this are rejected.
pub const MAX_STORAGE_BITS: u32 = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    /// One bit, persisted as `0` / `1`.
    Boolean,
    /// Inclusive range, stored as the offset from `min`.
    Integer { min: i64, max: i64 },
    /// Index into `values`, persisted as the value string.
    Enum { values: Vec<String> },
    /// Opaque raw bits.
    LegacyData { bits: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockProperty {
    pub name: String,
    pub persistence_name: String,
    pub kind: PropertyKind,
}

impl BlockProperty {
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        let name = name.into();
        Self {
            persistence_name: name.clone(),
            name,
            kind,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Boolean)
    }

    pub fn integer(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self::new(name, PropertyKind::Integer { min, max })
    }

    pub fn enumeration<S: Into<String>>(
        name: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            name,
            PropertyKind::Enum {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn legacy(bits: u32) -> Self {
        Self::new(LEGACY_PROPERTY_NAME, PropertyKind::LegacyData { bits })
    }

    pub fn with_persistence_name(mut self, name: impl Into<String>) -> Self {
        self.persistence_name = name.into();
        self
    }

    /// Number of distinct raw values, `None` when every bit pattern is valid.
    fn cardinality(&self) -> Option<u64> {
        match &self.kind {
            PropertyKind::Boolean => Some(2),
            PropertyKind::Integer { min, max } => Some(max.abs_diff(*min).saturating_add(1)),
            PropertyKind::Enum { values } => Some(values.len() as u64),
            PropertyKind::LegacyData { .. } => None,
        }
    }

    pub fn bits(&self) -> u32 {
        match self.kind {
            PropertyKind::LegacyData { bits } => bits,
            _ => match self.cardinality() {
                Some(n) if n > 1 => 64 - (n - 1).leading_zeros(),
                _ => 0,
            },
        }
    }

    fn check_raw(&self, raw: u64) -> Result<()> {
        match self.cardinality() {
            Some(n) if raw >= n => Err(StateError::InvalidRawValue {
                property: self.name.clone(),
                raw,
            }),
            _ => Ok(()),
        }
    }

    /// Persisted textual form of a raw field value.
    pub fn persistence_value(&self, raw: u64) -> Result<String> {
        self.check_raw(raw)?;
        Ok(match &self.kind {
            PropertyKind::Boolean => raw.to_string(),
            PropertyKind::Integer { min, .. } => (*min as i128 + raw as i128).to_string(),
            PropertyKind::Enum { values } => values[raw as usize].clone(),
            PropertyKind::LegacyData { .. } => raw.to_string(),
        })
    }

    /// Raw field value for a textual value.
    pub fn encode(&self, value: &str) -> Result<u64> {
        let invalid = || StateError::InvalidValue {
            property: self.name.clone(),
            value: value.to_string(),
        };
        let raw = match &self.kind {
            PropertyKind::Boolean => match value {
                "0" | "false" => 0,
                "1" | "true" => 1,
                _ => return Err(invalid()),
            },
            PropertyKind::Integer { min, max } => {
                let v: i64 = value.parse().map_err(|_| invalid())?;
                if v < *min || v > *max {
                    return Err(invalid());
                }
                v.abs_diff(*min)
            }
            PropertyKind::Enum { values } => {
                values.iter().position(|s| s == value).ok_or_else(invalid)? as u64
            }
            PropertyKind::LegacyData { bits } => {
                let v: u64 = value.parse().map_err(|_| invalid())?;
                if v & !field_mask(*bits) != 0 {
                    return Err(invalid());
                }
                v
            }
        };
        Ok(raw)
    }
}

#[inline]
fn field_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyField {
    pub property: BlockProperty,
    pub bits: u32,
    pub offset: u32,
}

impl PropertyField {
    #[inline]
    fn extract(&self, storage: u64) -> u64 {
        if self.bits == 0 {
            return 0;
        }
        (storage >> self.offset) & field_mask(self.bits)
    }
}

/// Bit layout of one block's properties. Fields are packed in declaration
/// order, first field in the lowest bits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockProperties {
    fields: Vec<PropertyField>,
    index: HashMap<String, usize>,
    total_bits: u32,
}

impl BlockProperties {
    pub fn new(properties: Vec<BlockProperty>) -> Result<Self> {
        let mut fields = Vec::with_capacity(properties.len());
        let mut index = HashMap::with_capacity(properties.len());
        let mut offset: u32 = 0;
        for property in properties {
            if let PropertyKind::Integer { min, max } = property.kind {
                if min > max {
                    return Err(StateError::InvalidRange {
                        property: property.name,
                        min,
                        max,
                    });
                }
            }
            let bits = property.bits();
            if index.insert(property.name.clone(), fields.len()).is_some() {
                return Err(StateError::DuplicateProperty(property.name));
            }
            let end = offset
                .checked_add(bits)
                .filter(|&end| end <= MAX_STORAGE_BITS)
                .ok_or(StateError::LayoutTooWide {
                    bits: offset.saturating_add(bits),
                })?;
            fields.push(PropertyField {
                property,
                bits,
                offset,
            });
            offset = end;
        }
        Ok(Self {
            fields,
            index,
            total_bits: offset,
        })
    }

    /// Layout with no properties at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shared layout for ids nobody declared: one full-width legacy field.
    pub fn unknown() -> Arc<BlockProperties> {
        static UNKNOWN: OnceLock<Arc<BlockProperties>> = OnceLock::new();
        UNKNOWN
            .get_or_init(|| {
                let field = PropertyField {
                    property: BlockProperty::legacy(MAX_STORAGE_BITS),
                    bits: MAX_STORAGE_BITS,
                    offset: 0,
                };
                let index = HashMap::from([(LEGACY_PROPERTY_NAME.to_string(), 0)]);
                Arc::new(BlockProperties {
                    fields: vec![field],
                    index,
                    total_bits: MAX_STORAGE_BITS,
                })
            })
            .clone()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn total_bits(&self) -> u32 {
        self.total_bits
    }

    /// True when the only declared property is the legacy marker.
    pub fn is_legacy_only(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].property.name == LEGACY_PROPERTY_NAME
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.property.name.as_str())
    }

    pub fn field(&self, name: &str) -> Option<&PropertyField> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    fn require(&self, name: &str) -> Result<&PropertyField> {
        self.field(name)
            .ok_or_else(|| StateError::UnknownProperty(name.to_string()))
    }

    /// Rejects storage with bits outside the layout or out-of-range fields.
    pub fn validate(&self, storage: u64) -> Result<()> {
        if storage & !field_mask(self.total_bits) != 0 {
            return Err(StateError::StorageOverflow {
                storage,
                bits: self.total_bits,
            });
        }
        for f in &self.fields {
            f.property.check_raw(f.extract(storage))?;
        }
        Ok(())
    }

    pub fn value_of(&self, storage: u64, name: &str) -> Result<String> {
        let f = self.require(name)?;
        f.property.persistence_value(f.extract(storage))
    }

    pub fn with_value(&self, storage: u64, name: &str, value: &str) -> Result<u64> {
        let f = self.require(name)?;
        let raw = f.property.encode(value)?;
        if f.bits == 0 {
            return Ok(storage);
        }
        let mask = field_mask(f.bits) << f.offset;
        Ok((storage & !mask) | ((raw << f.offset) & mask))
    }

    /// `(persistence name, persistence value)` for every field, in layout order.
    pub fn persistence_entries(&self, storage: u64) -> Result<Vec<(String, String)>> {
        self.fields
            .iter()
            .map(|f| {
                let value = f.property.persistence_value(f.extract(storage))?;
                Ok((f.property.persistence_name.clone(), value))
            })
            .collect()
    }

    /// Packs named values; omitted properties take their first value.
    pub fn pack(&self, values: &HashMap<String, String>) -> Result<u64> {
        if let Some(unknown) = values.keys().find(|k| !self.index.contains_key(k.as_str())) {
            return Err(StateError::UnknownProperty(unknown.clone()));
        }
        let mut acc: u64 = 0;
        for f in &self.fields {
            if let Some(v) = values.get(&f.property.name) {
                acc = self.with_value(acc, &f.property.name, v)?;
            }
        }
        Ok(acc)
    }
}
