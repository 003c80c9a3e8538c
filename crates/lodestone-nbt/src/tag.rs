use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::error::{NbtError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagType {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagType {
    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Result<TagType> {
        Ok(match id {
            0 => TagType::End,
            1 => TagType::Byte,
            2 => TagType::Short,
            3 => TagType::Int,
            4 => TagType::Long,
            5 => TagType::Float,
            6 => TagType::Double,
            7 => TagType::ByteArray,
            8 => TagType::String,
            9 => TagType::List,
            10 => TagType::Compound,
            11 => TagType::IntArray,
            12 => TagType::LongArray,
            other => return Err(NbtError::UnknownTagType(other)),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            TagType::End => "end",
            TagType::Byte => "byte",
            TagType::Short => "short",
            TagType::Int => "int",
            TagType::Long => "long",
            TagType::Float => "float",
            TagType::Double => "double",
            TagType::ByteArray => "byte_array",
            TagType::String => "string",
            TagType::List => "list",
            TagType::Compound => "compound",
            TagType::IntArray => "int_array",
            TagType::LongArray => "long_array",
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single tag value. Floating point payloads compare and hash by bit
/// pattern so that trees can be used as map keys.
#[derive(Clone, Debug)]
pub enum Tag {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    String(String),
    List(ListTag),
    Compound(CompoundTag),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    pub fn tag_type(&self) -> TagType {
        match self {
            Tag::Byte(_) => TagType::Byte,
            Tag::Short(_) => TagType::Short,
            Tag::Int(_) => TagType::Int,
            Tag::Long(_) => TagType::Long,
            Tag::Float(_) => TagType::Float,
            Tag::Double(_) => TagType::Double,
            Tag::ByteArray(_) => TagType::ByteArray,
            Tag::String(_) => TagType::String,
            Tag::List(_) => TagType::List,
            Tag::Compound(_) => TagType::Compound,
            Tag::IntArray(_) => TagType::IntArray,
            Tag::LongArray(_) => TagType::LongArray,
        }
    }

    /// Integer view over any integral scalar tag.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Tag::Byte(v) => Some(v as i64),
            Tag::Short(v) => Some(v as i64),
            Tag::Int(v) => Some(v as i64),
            Tag::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Tag::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&CompoundTag> {
        match self {
            Tag::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListTag> {
        match self {
            Tag::List(l) => Some(l),
            _ => None,
        }
    }

    /// Plain textual value used when tags are flattened into string keys:
    /// integers in decimal, strings verbatim, everything else in SNBT form.
    pub fn value_string(&self) -> String {
        match self {
            Tag::Byte(v) => v.to_string(),
            Tag::Short(v) => v.to_string(),
            Tag::Int(v) => v.to_string(),
            Tag::Long(v) => v.to_string(),
            Tag::Float(v) => v.to_string(),
            Tag::Double(v) => v.to_string(),
            Tag::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Tag {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Tag::Byte(a), Tag::Byte(b)) => a == b,
            (Tag::Short(a), Tag::Short(b)) => a == b,
            (Tag::Int(a), Tag::Int(b)) => a == b,
            (Tag::Long(a), Tag::Long(b)) => a == b,
            (Tag::Float(a), Tag::Float(b)) => a.to_bits() == b.to_bits(),
            (Tag::Double(a), Tag::Double(b)) => a.to_bits() == b.to_bits(),
            (Tag::ByteArray(a), Tag::ByteArray(b)) => a == b,
            (Tag::String(a), Tag::String(b)) => a == b,
            (Tag::List(a), Tag::List(b)) => a == b,
            (Tag::Compound(a), Tag::Compound(b)) => a == b,
            (Tag::IntArray(a), Tag::IntArray(b)) => a == b,
            (Tag::LongArray(a), Tag::LongArray(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Tag {}

impl Hash for Tag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag_type().hash(state);
        match self {
            Tag::Byte(v) => v.hash(state),
            Tag::Short(v) => v.hash(state),
            Tag::Int(v) => v.hash(state),
            Tag::Long(v) => v.hash(state),
            Tag::Float(v) => v.to_bits().hash(state),
            Tag::Double(v) => v.to_bits().hash(state),
            Tag::ByteArray(v) => v.hash(state),
            Tag::String(v) => v.hash(state),
            Tag::List(v) => v.hash(state),
            Tag::Compound(v) => v.hash(state),
            Tag::IntArray(v) => v.hash(state),
            Tag::LongArray(v) => v.hash(state),
        }
    }
}

impl From<bool> for Tag {
    fn from(v: bool) -> Self {
        Tag::Byte(v as i8)
    }
}
impl From<i8> for Tag {
    fn from(v: i8) -> Self {
        Tag::Byte(v)
    }
}
impl From<i16> for Tag {
    fn from(v: i16) -> Self {
        Tag::Short(v)
    }
}
impl From<i32> for Tag {
    fn from(v: i32) -> Self {
        Tag::Int(v)
    }
}
impl From<i64> for Tag {
    fn from(v: i64) -> Self {
        Tag::Long(v)
    }
}
impl From<f32> for Tag {
    fn from(v: f32) -> Self {
        Tag::Float(v)
    }
}
impl From<f64> for Tag {
    fn from(v: f64) -> Self {
        Tag::Double(v)
    }
}
impl From<&str> for Tag {
    fn from(v: &str) -> Self {
        Tag::String(v.to_string())
    }
}
impl From<String> for Tag {
    fn from(v: String) -> Self {
        Tag::String(v)
    }
}
impl From<CompoundTag> for Tag {
    fn from(v: CompoundTag) -> Self {
        Tag::Compound(v)
    }
}
impl From<ListTag> for Tag {
    fn from(v: ListTag) -> Self {
        Tag::List(v)
    }
}

/// Homogeneous list. An empty list may carry any element type, including `End`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListTag {
    element: TagType,
    items: Vec<Tag>,
}

impl ListTag {
    pub fn new(element: TagType) -> Self {
        Self {
            element,
            items: Vec::new(),
        }
    }

    pub fn from_tags(element: TagType, items: Vec<Tag>) -> Result<Self> {
        if let Some(bad) = items.iter().find(|t| t.tag_type() != element) {
            return Err(NbtError::MixedList {
                declared: element.name(),
                found: bad.tag_type().name(),
            });
        }
        Ok(Self { element, items })
    }

    pub fn of_compounds<I: IntoIterator<Item = CompoundTag>>(items: I) -> Self {
        Self {
            element: TagType::Compound,
            items: items.into_iter().map(Tag::Compound).collect(),
        }
    }

    pub fn push(&mut self, tag: Tag) -> Result<()> {
        if self.items.is_empty() && self.element == TagType::End {
            self.element = tag.tag_type();
        }
        if tag.tag_type() != self.element {
            return Err(NbtError::MixedList {
                declared: self.element.name(),
                found: tag.tag_type().name(),
            });
        }
        self.items.push(tag);
        Ok(())
    }

    #[inline]
    pub fn element_type(&self) -> TagType {
        self.element
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Tag> {
        self.items.get(index)
    }

    /// Compound elements only; other element types yield nothing.
    pub fn compounds(&self) -> impl Iterator<Item = &CompoundTag> {
        self.items.iter().filter_map(Tag::as_compound)
    }

    pub fn into_compounds(self) -> Vec<CompoundTag> {
        self.items
            .into_iter()
            .filter_map(|t| match t {
                Tag::Compound(c) => Some(c),
                _ => None,
            })
            .collect()
    }
}

/// Insertion-ordered compound. Equality and hashing ignore entry order,
/// serialization preserves it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompoundTag {
    entries: IndexMap<String, Tag>,
}

impl CompoundTag {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Self {
        self.insert(name, tag);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Option<Tag> {
        self.entries.insert(name.into(), tag.into())
    }

    /// Removes an entry while keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Tag> {
        self.entries.shift_remove(name)
    }

    /// Copy of this compound without `name`.
    pub fn without(&self, name: &str) -> CompoundTag {
        let mut out = self.clone();
        out.remove(name);
        out
    }

    pub fn get(&self, name: &str) -> Option<&Tag> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get_compound(&self, name: &str) -> Option<&CompoundTag> {
        self.get(name).and_then(Tag::as_compound)
    }

    pub fn get_list(&self, name: &str) -> Option<&ListTag> {
        self.get(name).and_then(Tag::as_list)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Tag::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Tag::as_i64)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Tag> {
        self.entries.iter()
    }
}

impl Hash for CompoundTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut sorted: Vec<(&String, &Tag)> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        sorted.len().hash(state);
        for (k, v) in sorted {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<'a> IntoIterator for &'a CompoundTag {
    type Item = (&'a String, &'a Tag);
    type IntoIter = indexmap::map::Iter<'a, String, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Byte(v) => write!(f, "{v}b"),
            Tag::Short(v) => write!(f, "{v}s"),
            Tag::Int(v) => write!(f, "{v}"),
            Tag::Long(v) => write!(f, "{v}L"),
            Tag::Float(v) => write!(f, "{v}f"),
            Tag::Double(v) => write!(f, "{v}d"),
            Tag::ByteArray(v) => write_array(f, "B", v.iter()),
            Tag::String(s) => write!(f, "{s:?}"),
            Tag::List(l) => {
                f.write_str("[")?;
                for (i, item) in l.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Tag::Compound(c) => write!(f, "{c}"),
            Tag::IntArray(v) => write_array(f, "I", v.iter()),
            Tag::LongArray(v) => write_array(f, "L", v.iter()),
        }
    }
}

impl fmt::Display for CompoundTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{k}:{v}")?;
        }
        f.write_str("}")
    }
}

fn write_array<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    prefix: &str,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    write!(f, "[{prefix};")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of<T: Hash>(v: &T) -> u64 {
        let mut h = DefaultHasher::new();
        v.hash(&mut h);
        h.finish()
    }

    #[test]
    fn compound_equality_ignores_order() {
        let a = CompoundTag::new().with("name", "minecraft:stone").with("version", 1);
        let b = CompoundTag::new().with("version", 1).with("name", "minecraft:stone");
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn without_keeps_remaining_order() {
        let c = CompoundTag::new()
            .with("name", "x")
            .with("states", CompoundTag::new())
            .with("version", 3);
        let stripped = c.without("states");
        let keys: Vec<&str> = stripped.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "version"]);
        assert!(c.contains("states"));
    }

    #[test]
    fn list_rejects_mixed_elements() {
        let mut l = ListTag::new(TagType::End);
        l.push(Tag::Int(1)).unwrap();
        assert_eq!(l.element_type(), TagType::Int);
        assert!(l.push(Tag::from("x")).is_err());
    }

    #[test]
    fn value_string_renders_bytes_as_decimal() {
        assert_eq!(Tag::from(true).value_string(), "1");
        assert_eq!(Tag::Int(-4).value_string(), "-4");
        assert_eq!(Tag::from("north").value_string(), "north");
    }
}
