//! Tag codec for the three encodings found in palette data:
//!
//! * `BigEndian`: fixed-width big-endian numbers, `u16` string lengths.
//! * `LittleEndian`: same layout, little-endian numbers.
//! * `Network`: little-endian, but ints/longs and every `i32` length are
//!   zig-zag varints and string lengths are unsigned varints.

use bytes::{Buf, BufMut};

use crate::error::{NbtError, Result};
use crate::tag::{CompoundTag, ListTag, Tag, TagType};

/// Hard limit on list/compound nesting while decoding and encoding.
pub const MAX_DEPTH: usize = 512;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Flavor {
    #[default]
    BigEndian,
    LittleEndian,
    Network,
}

/// Reads one named root tag from `buf`.
pub fn read_named<B: Buf>(buf: &mut B, flavor: Flavor) -> Result<(String, Tag)> {
    let mut r = Reader { buf, flavor };
    let ty = TagType::from_id(r.u8()?)?;
    if ty == TagType::End {
        return Err(NbtError::UnexpectedRoot {
            expected: "any",
            found: TagType::End.name(),
        });
    }
    let name = r.string()?;
    let tag = r.payload(ty, 0)?;
    Ok((name, tag))
}

/// Decodes a whole buffer holding exactly one named root tag.
pub fn from_slice(bytes: &[u8], flavor: Flavor) -> Result<(String, Tag)> {
    let mut cursor = bytes;
    let out = read_named(&mut cursor, flavor)?;
    if !cursor.is_empty() {
        return Err(NbtError::TrailingBytes(cursor.len()));
    }
    Ok(out)
}

pub fn write_named<B: BufMut>(buf: &mut B, name: &str, tag: &Tag, flavor: Flavor) -> Result<()> {
    let mut w = Writer { buf, flavor };
    w.u8(tag.tag_type().id());
    w.string(name)?;
    w.payload(tag, 0)
}

pub fn to_vec(name: &str, tag: &Tag, flavor: Flavor) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_named(&mut out, name, tag, flavor)?;
    Ok(out)
}

struct Reader<'a, B> {
    buf: &'a mut B,
    flavor: Flavor,
}

impl<B: Buf> Reader<'_, B> {
    #[inline]
    fn need(&self, n: usize) -> Result<()> {
        let remaining = self.buf.remaining();
        if remaining < n {
            return Err(NbtError::UnexpectedEof {
                needed: n,
                remaining,
            });
        }
        Ok(())
    }

    fn u8(&mut self) -> Result<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    fn i16(&mut self) -> Result<i16> {
        self.need(2)?;
        Ok(match self.flavor {
            Flavor::BigEndian => self.buf.get_i16(),
            Flavor::LittleEndian | Flavor::Network => self.buf.get_i16_le(),
        })
    }

    fn u16(&mut self) -> Result<u16> {
        self.need(2)?;
        Ok(match self.flavor {
            Flavor::BigEndian => self.buf.get_u16(),
            Flavor::LittleEndian | Flavor::Network => self.buf.get_u16_le(),
        })
    }

    fn i32(&mut self) -> Result<i32> {
        match self.flavor {
            Flavor::Network => {
                let v = self.var_u32()?;
                Ok(((v >> 1) as i32) ^ -((v & 1) as i32))
            }
            Flavor::BigEndian => {
                self.need(4)?;
                Ok(self.buf.get_i32())
            }
            Flavor::LittleEndian => {
                self.need(4)?;
                Ok(self.buf.get_i32_le())
            }
        }
    }

    fn i64(&mut self) -> Result<i64> {
        match self.flavor {
            Flavor::Network => {
                let v = self.var_u64()?;
                Ok(((v >> 1) as i64) ^ -((v & 1) as i64))
            }
            Flavor::BigEndian => {
                self.need(8)?;
                Ok(self.buf.get_i64())
            }
            Flavor::LittleEndian => {
                self.need(8)?;
                Ok(self.buf.get_i64_le())
            }
        }
    }

    fn f32(&mut self) -> Result<f32> {
        self.need(4)?;
        Ok(match self.flavor {
            Flavor::BigEndian => self.buf.get_f32(),
            Flavor::LittleEndian | Flavor::Network => self.buf.get_f32_le(),
        })
    }

    fn f64(&mut self) -> Result<f64> {
        self.need(8)?;
        Ok(match self.flavor {
            Flavor::BigEndian => self.buf.get_f64(),
            Flavor::LittleEndian | Flavor::Network => self.buf.get_f64_le(),
        })
    }

    fn var_u32(&mut self) -> Result<u32> {
        let mut value: u32 = 0;
        for i in 0..5 {
            let b = self.u8()?;
            value |= ((b & 0x7F) as u32) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(NbtError::VarIntTooLong(5))
    }

    fn var_u64(&mut self) -> Result<u64> {
        let mut value: u64 = 0;
        for i in 0..10 {
            let b = self.u8()?;
            value |= ((b & 0x7F) as u64) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(NbtError::VarIntTooLong(10))
    }

    fn len(&mut self) -> Result<usize> {
        let n = self.i32()?;
        if n < 0 {
            return Err(NbtError::NegativeLength(n as i64));
        }
        Ok(n as usize)
    }

    fn string(&mut self) -> Result<String> {
        let n = match self.flavor {
            Flavor::Network => self.var_u32()? as usize,
            Flavor::BigEndian | Flavor::LittleEndian => self.u16()? as usize,
        };
        self.need(n)?;
        let mut raw = vec![0u8; n];
        self.buf.copy_to_slice(&mut raw);
        String::from_utf8(raw).map_err(|_| NbtError::InvalidUtf8)
    }

    fn payload(&mut self, ty: TagType, depth: usize) -> Result<Tag> {
        if depth > MAX_DEPTH {
            return Err(NbtError::TooDeep(MAX_DEPTH));
        }
        Ok(match ty {
            TagType::End => return Err(NbtError::UnknownTagType(TagType::End.id())),
            TagType::Byte => Tag::Byte(self.u8()? as i8),
            TagType::Short => Tag::Short(self.i16()?),
            TagType::Int => Tag::Int(self.i32()?),
            TagType::Long => Tag::Long(self.i64()?),
            TagType::Float => Tag::Float(self.f32()?),
            TagType::Double => Tag::Double(self.f64()?),
            TagType::ByteArray => {
                let n = self.len()?;
                self.need(n)?;
                let mut raw = vec![0u8; n];
                self.buf.copy_to_slice(&mut raw);
                Tag::ByteArray(raw)
            }
            TagType::String => Tag::String(self.string()?),
            TagType::List => {
                let element = TagType::from_id(self.u8()?)?;
                let n = self.len()?;
                if element == TagType::End && n > 0 {
                    return Err(NbtError::UnknownTagType(TagType::End.id()));
                }
                // capacity clamped to the remaining input
                let mut items = Vec::with_capacity(n.min(self.buf.remaining()));
                for _ in 0..n {
                    items.push(self.payload(element, depth + 1)?);
                }
                Tag::List(ListTag::from_tags(element, items)?)
            }
            TagType::Compound => Tag::Compound(self.compound(depth + 1)?),
            TagType::IntArray => {
                let n = self.len()?;
                let mut out = Vec::with_capacity(n.min(self.buf.remaining()));
                for _ in 0..n {
                    out.push(self.i32()?);
                }
                Tag::IntArray(out)
            }
            TagType::LongArray => {
                let n = self.len()?;
                let mut out = Vec::with_capacity(n.min(self.buf.remaining()));
                for _ in 0..n {
                    out.push(self.i64()?);
                }
                Tag::LongArray(out)
            }
        })
    }

    fn compound(&mut self, depth: usize) -> Result<CompoundTag> {
        let mut out = CompoundTag::new();
        loop {
            let ty = TagType::from_id(self.u8()?)?;
            if ty == TagType::End {
                return Ok(out);
            }
            let name = self.string()?;
            let tag = self.payload(ty, depth)?;
            out.insert(name, tag);
        }
    }
}

struct Writer<'a, B> {
    buf: &'a mut B,
    flavor: Flavor,
}

impl<B: BufMut> Writer<'_, B> {
    fn u8(&mut self, v: u8) {
        self.buf.put_u8(v);
    }

    fn i16(&mut self, v: i16) {
        match self.flavor {
            Flavor::BigEndian => self.buf.put_i16(v),
            Flavor::LittleEndian | Flavor::Network => self.buf.put_i16_le(v),
        }
    }

    fn i32(&mut self, v: i32) {
        match self.flavor {
            Flavor::Network => self.var_u32(((v << 1) ^ (v >> 31)) as u32),
            Flavor::BigEndian => self.buf.put_i32(v),
            Flavor::LittleEndian => self.buf.put_i32_le(v),
        }
    }

    fn i64(&mut self, v: i64) {
        match self.flavor {
            Flavor::Network => self.var_u64(((v << 1) ^ (v >> 63)) as u64),
            Flavor::BigEndian => self.buf.put_i64(v),
            Flavor::LittleEndian => self.buf.put_i64_le(v),
        }
    }

    fn f32(&mut self, v: f32) {
        match self.flavor {
            Flavor::BigEndian => self.buf.put_f32(v),
            Flavor::LittleEndian | Flavor::Network => self.buf.put_f32_le(v),
        }
    }

    fn f64(&mut self, v: f64) {
        match self.flavor {
            Flavor::BigEndian => self.buf.put_f64(v),
            Flavor::LittleEndian | Flavor::Network => self.buf.put_f64_le(v),
        }
    }

    fn var_u32(&mut self, mut v: u32) {
        loop {
            if v & !0x7F == 0 {
                self.buf.put_u8(v as u8);
                return;
            }
            self.buf.put_u8((v & 0x7F | 0x80) as u8);
            v >>= 7;
        }
    }

    fn var_u64(&mut self, mut v: u64) {
        loop {
            if v & !0x7F == 0 {
                self.buf.put_u8(v as u8);
                return;
            }
            self.buf.put_u8((v & 0x7F | 0x80) as u8);
            v >>= 7;
        }
    }

    fn len(&mut self, n: usize) -> Result<()> {
        let n = i32::try_from(n).map_err(|_| NbtError::CollectionTooLong(n))?;
        self.i32(n);
        Ok(())
    }

    fn string(&mut self, s: &str) -> Result<()> {
        let n = s.len();
        match self.flavor {
            Flavor::Network => {
                let n = u32::try_from(n).map_err(|_| NbtError::StringTooLong(n))?;
                self.var_u32(n);
            }
            Flavor::BigEndian => {
                let n = u16::try_from(n).map_err(|_| NbtError::StringTooLong(n))?;
                self.buf.put_u16(n);
            }
            Flavor::LittleEndian => {
                let n = u16::try_from(n).map_err(|_| NbtError::StringTooLong(n))?;
                self.buf.put_u16_le(n);
            }
        }
        self.buf.put_slice(s.as_bytes());
        Ok(())
    }

    fn payload(&mut self, tag: &Tag, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(NbtError::TooDeep(MAX_DEPTH));
        }
        match tag {
            Tag::Byte(v) => self.u8(*v as u8),
            Tag::Short(v) => self.i16(*v),
            Tag::Int(v) => self.i32(*v),
            Tag::Long(v) => self.i64(*v),
            Tag::Float(v) => self.f32(*v),
            Tag::Double(v) => self.f64(*v),
            Tag::ByteArray(v) => {
                self.len(v.len())?;
                self.buf.put_slice(v);
            }
            Tag::String(s) => self.string(s)?,
            Tag::List(list) => {
                self.u8(list.element_type().id());
                self.len(list.len())?;
                for item in list.iter() {
                    self.payload(item, depth + 1)?;
                }
            }
            Tag::Compound(c) => {
                for (name, value) in c.iter() {
                    self.u8(value.tag_type().id());
                    self.string(name)?;
                    self.payload(value, depth + 1)?;
                }
                self.u8(TagType::End.id());
            }
            Tag::IntArray(v) => {
                self.len(v.len())?;
                for x in v {
                    self.i32(*x);
                }
            }
            Tag::LongArray(v) => {
                self.len(v.len())?;
                for x in v {
                    self.i64(*x);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_layout_of_named_int() {
        let bytes = to_vec("a", &Tag::Int(1), Flavor::LittleEndian).unwrap();
        assert_eq!(bytes, vec![3, 1, 0, b'a', 1, 0, 0, 0]);
    }

    #[test]
    fn big_endian_layout_of_named_int() {
        let bytes = to_vec("a", &Tag::Int(1), Flavor::BigEndian).unwrap();
        assert_eq!(bytes, vec![3, 0, 1, b'a', 0, 0, 0, 1]);
    }

    #[test]
    fn network_uses_zigzag_varints() {
        let bytes = to_vec("a", &Tag::Int(-1), Flavor::Network).unwrap();
        assert_eq!(bytes, vec![3, 1, b'a', 1]);
        let bytes = to_vec("", &Tag::Int(300), Flavor::Network).unwrap();
        // 300 zig-zags to 600 = 0b100_1011000
        assert_eq!(bytes, vec![3, 0, 0xD8, 0x04]);
    }

    #[test]
    fn truncated_input_reports_eof() {
        let bytes = to_vec("name", &Tag::Long(7), Flavor::BigEndian).unwrap();
        let err = from_slice(&bytes[..bytes.len() - 1], Flavor::BigEndian).unwrap_err();
        assert!(matches!(err, NbtError::UnexpectedEof { .. }));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = to_vec("", &Tag::Byte(1), Flavor::LittleEndian).unwrap();
        bytes.push(0);
        assert_eq!(
            from_slice(&bytes, Flavor::LittleEndian).unwrap_err(),
            NbtError::TrailingBytes(1)
        );
    }

    #[test]
    fn negative_list_length_is_rejected() {
        // list of ints with length -1
        let bytes = vec![9, 0, 0, 3, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(
            from_slice(&bytes, Flavor::LittleEndian).unwrap_err(),
            NbtError::NegativeLength(-1)
        );
    }

    #[test]
    fn excessive_nesting_is_rejected() {
        let mut bytes = vec![9u8, 0, 0];
        for _ in 0..(MAX_DEPTH + 2) {
            bytes.extend_from_slice(&[9, 1, 0, 0, 0]);
        }
        let err = from_slice(&bytes, Flavor::LittleEndian).unwrap_err();
        assert_eq!(err, NbtError::TooDeep(MAX_DEPTH));
    }
}
