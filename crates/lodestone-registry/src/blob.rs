use std::sync::Arc;

use bytes::Bytes;
use lodestone_nbt::{CompoundTag, Flavor, ListTag, Tag, to_vec};

use crate::error::{BlobError, RegistryError, Result};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Standard 32-bit FNV-1a, used as the palette fingerprint.
pub fn fnv1a_32(data: &[u8]) -> u32 {
    data.iter()
        .fold(FNV_OFFSET_BASIS, |hash, &byte| (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME))
}

/// The palette serialized once for the wire: a network-flavour root list
/// with an empty name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteBlob {
    bytes: Bytes,
    fingerprint: u32,
}

impl PaletteBlob {
    pub fn encode(palette: &[Arc<CompoundTag>]) -> Result<Self> {
        let list = ListTag::of_compounds(palette.iter().map(|e| CompoundTag::clone(e)));
        let bytes = to_vec("", &Tag::List(list), Flavor::Network).map_err(RegistryError::Serialize)?;
        Ok(Self::from_bytes(Bytes::from(bytes)))
    }

    pub fn from_bytes(bytes: Bytes) -> Self {
        let fingerprint = fnv1a_32(&bytes);
        Self { bytes, fingerprint }
    }

    /// A private copy.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// Copies the whole blob into `target` starting at `offset`.
    pub fn copy_into(&self, target: &mut [u8], offset: usize) -> std::result::Result<(), BlobError> {
        let len = self.bytes.len();
        let end = offset
            .checked_add(len)
            .filter(|&end| end <= target.len())
            .ok_or(BlobError::OutOfBounds {
                offset,
                len,
                capacity: target.len(),
            })?;
        target[offset..end].copy_from_slice(&self.bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PaletteBlob {
        let entry = Arc::new(
            CompoundTag::new().with("block", CompoundTag::new().with("name", "minecraft:air")),
        );
        PaletteBlob::encode(&[entry]).unwrap()
    }

    #[test]
    fn fnv_matches_reference_vectors() {
        assert_eq!(fnv1a_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1a_32(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a_32(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn blob_starts_with_an_unnamed_compound_list() {
        let blob = sample();
        // list tag, empty name, compound elements, one element
        assert_eq!(&blob.as_bytes()[..4], &[9, 0, 10, 2]);
    }

    #[test]
    fn copy_into_respects_bounds() {
        let blob = sample();
        let mut buf = vec![0u8; blob.len() + 3];
        blob.copy_into(&mut buf, 3).unwrap();
        assert_eq!(&buf[3..], blob.as_bytes());
        assert_eq!(
            blob.copy_into(&mut buf, 4),
            Err(BlobError::OutOfBounds {
                offset: 4,
                len: blob.len(),
                capacity: blob.len() + 3,
            })
        );
        assert!(blob.copy_into(&mut buf, usize::MAX).is_err());
    }

    #[test]
    fn copies_are_private() {
        let blob = sample();
        let mut copy = blob.to_vec();
        copy[0] = 0xFF;
        assert_eq!(blob.as_bytes()[0], 9);
        assert_eq!(blob.fingerprint(), fnv1a_32(blob.as_bytes()));
    }
}
