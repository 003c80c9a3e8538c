//! Named Binary Tag trees and their three wire flavours.
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod tag;

pub use codec::{Flavor, from_slice, read_named, to_vec, write_named};
pub use error::NbtError;
pub use tag::{CompoundTag, ListTag, Tag, TagType};
