use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

use chrono::Utc;
use crossbeam::atomic::AtomicCell;
use rand::{thread_rng, RngCore};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

type IdType = u64;
static ID_COUNTER: AtomicCell<IdType> = AtomicCell::new(1);

/// A process-local unique identifier for any type.
pub struct Id<T: ?Sized> {
    value: IdType,
    kind: PhantomData<T>,
}

impl<T: ?Sized> Id<T> {
    /// Creates a new id.
    pub fn new() -> Self {
        Self {
            value: ID_COUNTER.fetch_add(1),
            kind: PhantomData,
        }
    }
}

impl<T: ?Sized> Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T: ?Sized> Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T: ?Sized> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: ?Sized> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state)
    }
}

impl<T: ?Sized> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Id<T> {}
impl<T: ?Sized> Eq for Id<T> {}

/// Number of bytes in a [DocumentId].
const DOCUMENT_ID_BYTES: usize = 12;

/// A store-generated document identifier.
///
/// Rendered as 24 lowercase hex characters: four bytes of seconds since the
/// unix epoch followed by eight random bytes. Parsing accepts any case, so two
/// ids that compare equal always have the same string form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId([u8; DOCUMENT_ID_BYTES]);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{0}' is not a valid document id")]
pub struct InvalidDocumentId(pub String);

impl DocumentId {
    /// Generates a fresh id.
    pub fn generate() -> Self {
        let mut bytes = [0; DOCUMENT_ID_BYTES];
        let seconds = Utc::now().timestamp() as u32;

        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        thread_rng().fill_bytes(&mut bytes[4..]);

        Self(bytes)
    }

    pub fn parse(input: &str) -> Result<Self, InvalidDocumentId> {
        let invalid = || InvalidDocumentId(input.to_string());

        if input.len() != DOCUMENT_ID_BYTES * 2 || !input.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let mut bytes = [0; DOCUMENT_ID_BYTES];

        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &input[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }

        Ok(Self(bytes))
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }

        Ok(())
    }
}

impl Debug for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocumentId({})", self)
    }
}

impl FromStr for DocumentId {
    type Err = InvalidDocumentId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}
