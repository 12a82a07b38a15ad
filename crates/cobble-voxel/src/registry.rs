//! Block and item registry: maps numeric ids and names to [`BlockType`] records.
//!
//! Blocks occupy ids `0..=255` and items `256..`; the two id ranges and the two
//! name sets never overlap. The registry is validated once when built and is
//! read-only afterwards, so a shared `&BlockRegistry` can be read from any
//! number of threads without locking.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::blocks;
use crate::face::Face;

/// Highest id a block (as opposed to an item) may use.
pub const MAX_BLOCK_ID: u16 = 255;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An exact block or item variant: primary id plus secondary (damage) value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Slot {
    /// Block or item id.
    pub primary: u16,
    /// Variant / damage value; 0 for the plain variant.
    pub secondary: u16,
}

impl Slot {
    /// The empty slot, which is also air's slot.
    pub const AIR: Slot = Slot::new(0, 0);

    /// Creates a slot.
    pub const fn new(primary: u16, secondary: u16) -> Self {
        Self { primary, secondary }
    }
}

impl From<Slot> for (u16, u16) {
    fn from(slot: Slot) -> Self {
        (slot.primary, slot.secondary)
    }
}

/// Which id space an entry belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Placeable terrain, id `0..=255`.
    Block,
    /// Inventory-only item, id `256..`.
    Item,
}

/// Bijective mapping between faces and metadata nibble values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Orientation {
    values: [Option<u8>; 6],
}

impl Orientation {
    /// Builds a table from `(face, metadata)` pairs.
    pub fn from_pairs(pairs: &[(Face, u8)]) -> Self {
        let mut values = [None; 6];
        for &(face, value) in pairs {
            values[face.index()] = Some(value);
        }
        Self { values }
    }

    /// Metadata value for `face`, if supported.
    pub fn value(&self, face: Face) -> Option<u8> {
        self.values[face.index()]
    }

    /// Face encoded by `value`, if any.
    pub fn face(&self, value: u8) -> Option<Face> {
        Face::ALL
            .into_iter()
            .find(|face| self.values[face.index()] == Some(value))
    }

    /// Supported faces with their metadata values.
    pub fn entries(&self) -> impl Iterator<Item = (Face, u8)> + '_ {
        Face::ALL
            .into_iter()
            .filter_map(|face| self.value(face).map(|value| (face, value)))
    }

    /// First metadata value shared by two faces, which would break invertibility.
    fn duplicate_value(&self) -> Option<u8> {
        let mut seen = [false; 16];
        for (_, value) in self.entries() {
            let slot = &mut seen[usize::from(value & 0x0F)];
            if *slot || value > 0x0F {
                return Some(value);
            }
            *slot = true;
        }
        None
    }
}

/// Full descriptor for a block or item.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockType {
    /// Registered name (lowercase words joined by hyphens, e.g. "coal-ore").
    pub name: String,
    /// Block or item id space.
    pub kind: BlockKind,
    /// The exact variant this entry names.
    pub slot: Slot,
    /// What destroying the block yields; [`Slot::AIR`] for nothing.
    pub drop: Slot,
    /// Probability in `[0, 1]` that the drop is produced.
    pub ratio: f64,
    /// `false` only for indestructible terrain.
    pub breakable: bool,
    /// Present for blocks whose metadata encodes a facing.
    pub orientation: Option<Orientation>,
}

impl BlockType {
    /// A breakable block that drops itself.
    pub fn block(id: u8, name: &str) -> Self {
        Self::with_kind(BlockKind::Block, u16::from(id), name)
    }

    /// An item entry.
    pub fn item(id: u16, name: &str) -> Self {
        Self::with_kind(BlockKind::Item, id, name)
    }

    fn with_kind(kind: BlockKind, id: u16, name: &str) -> Self {
        let slot = Slot::new(id, 0);
        Self {
            name: name.to_string(),
            kind,
            slot,
            drop: slot,
            ratio: 1.0,
            breakable: true,
            orientation: None,
        }
    }

    /// Replaces the drop slot.
    pub fn with_drop(mut self, drop: Slot) -> Self {
        self.drop = drop;
        self
    }

    /// Replaces the drop probability.
    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    /// Marks the block indestructible.
    pub fn unbreakable(mut self) -> Self {
        self.breakable = false;
        self
    }

    /// Attaches an orientation table.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Primary id.
    pub fn id(&self) -> u16 {
        self.slot.primary
    }

    /// Returns `true` if the block's metadata encodes a facing.
    pub fn orientable(&self) -> bool {
        self.orientation.is_some()
    }

    /// Metadata value that makes this block face `face`.
    ///
    /// # Errors
    ///
    /// [`OrientationError::UnsupportedDirection`] if the block has no
    /// orientation table or the table lacks `face`.
    pub fn orientation(&self, face: Face) -> Result<u8, OrientationError> {
        self.orientation
            .and_then(|table| table.value(face))
            .ok_or_else(|| OrientationError::UnsupportedDirection {
                block: self.name.clone(),
                face,
            })
    }

    /// Face encoded by metadata `value`; the inverse of [`orientation`](Self::orientation).
    ///
    /// # Errors
    ///
    /// [`OrientationError::UnknownOrientationValue`] if nothing maps to `value`.
    pub fn face(&self, value: u8) -> Result<Face, OrientationError> {
        self.orientation
            .and_then(|table| table.face(value))
            .ok_or_else(|| OrientationError::UnknownOrientationValue {
                block: self.name.clone(),
                value,
            })
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Inconsistencies detected while building a registry.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    /// Two entries share a name.
    #[error("duplicate block name: {0}")]
    DuplicateName(String),
    /// Two entries share a primary id.
    #[error("duplicate block id: {0}")]
    DuplicateId(u16),
    /// A block above 255 or an item below 256.
    #[error("{name}: id {id} is outside the {kind:?} id range")]
    IdOutOfRange {
        name: String,
        id: u16,
        kind: BlockKind,
    },
    /// A drop refers to an id nobody registered.
    #[error("{name}: drop {drop:?} is not a registered id")]
    DanglingDrop { name: String, drop: Slot },
    /// A name referenced by a definition table is not defined.
    #[error("unknown block or item name in definition table: {0}")]
    UnknownName(String),
    /// Drop ratio outside `[0, 1]`.
    #[error("{name}: drop ratio {ratio} is outside [0, 1]")]
    InvalidRatio { name: String, ratio: f64 },
    /// Two faces share a metadata value, or a value does not fit in a nibble.
    #[error("{name}: orientation value {value:#x} is not invertible")]
    AmbiguousOrientation { name: String, value: u8 },
}

/// Failure to resolve a textual block token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseBlockError {
    /// The token is not a decimal number, `0x` hex number, or name.
    #[error("malformed block token: {0:?}")]
    Malformed(String),
    /// The token is well formed but names no registered block or item.
    #[error("unknown block: {0:?}")]
    Unknown(String),
}

/// Orientation query outside a block's table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrientationError {
    /// The block cannot face this way (or cannot face at all).
    #[error("{block} does not support facing {face}")]
    UnsupportedDirection { block: String, face: Face },
    /// No face maps to this metadata value.
    #[error("{block} has no facing for metadata {value:#x}")]
    UnknownOrientationValue { block: String, value: u8 },
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

static GLOBAL: LazyLock<BlockRegistry> = LazyLock::new(|| {
    blocks::builtin_defs()
        .and_then(BlockRegistry::new)
        .expect("built-in block table is consistent")
});

/// Lookup tables over a validated set of [`BlockType`] entries.
#[derive(Debug)]
pub struct BlockRegistry {
    /// Entries in registration order.
    types: Vec<BlockType>,
    /// Primary id → index into `types`.
    by_id: FxHashMap<u16, usize>,
    /// Name → index into `types`.
    by_name: FxHashMap<String, usize>,
}

impl BlockRegistry {
    /// Builds a registry, checking ids, names, drops, ratios, and orientations.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] found.
    pub fn new(defs: Vec<BlockType>) -> Result<Self, RegistryError> {
        let mut by_id = FxHashMap::default();
        let mut by_name = FxHashMap::default();

        for (index, def) in defs.iter().enumerate() {
            let in_range = match def.kind {
                BlockKind::Block => def.id() <= MAX_BLOCK_ID,
                BlockKind::Item => def.id() > MAX_BLOCK_ID,
            };
            if !in_range {
                return Err(RegistryError::IdOutOfRange {
                    name: def.name.clone(),
                    id: def.id(),
                    kind: def.kind,
                });
            }
            if !(0.0..=1.0).contains(&def.ratio) {
                return Err(RegistryError::InvalidRatio {
                    name: def.name.clone(),
                    ratio: def.ratio,
                });
            }
            if let Some(value) = def.orientation.and_then(|t| t.duplicate_value()) {
                return Err(RegistryError::AmbiguousOrientation {
                    name: def.name.clone(),
                    value,
                });
            }
            if by_name.insert(def.name.clone(), index).is_some() {
                return Err(RegistryError::DuplicateName(def.name.clone()));
            }
            if by_id.insert(def.id(), index).is_some() {
                return Err(RegistryError::DuplicateId(def.id()));
            }
        }

        if let Some(def) = defs.iter().find(|d| !by_id.contains_key(&d.drop.primary)) {
            return Err(RegistryError::DanglingDrop {
                name: def.name.clone(),
                drop: def.drop,
            });
        }

        tracing::debug!(entries = defs.len(), "block registry built");
        Ok(Self {
            types: defs,
            by_id,
            by_name,
        })
    }

    /// The process-wide registry built from the built-in table.
    ///
    /// # Panics
    ///
    /// Only if the built-in table is inconsistent, which the crate's tests rule out.
    pub fn global() -> &'static BlockRegistry {
        LazyLock::force(&GLOBAL)
    }

    /// Returns the entry with primary id `id`.
    pub fn lookup_by_id(&self, id: u16) -> Option<&BlockType> {
        self.by_id.get(&id).map(|&i| &self.types[i])
    }

    /// Returns the entry registered under `name`.
    pub fn lookup_by_name(&self, name: &str) -> Option<&BlockType> {
        self.by_name.get(name).map(|&i| &self.types[i])
    }

    /// Resolves a token to a `(id, 0)` slot.
    ///
    /// Accepted forms are a decimal number (`"16"`), a `0x`-prefixed hex
    /// number (`"0x10"`), or a registered name (`"coal-ore"`).
    ///
    /// # Errors
    ///
    /// [`ParseBlockError::Malformed`] when the token fits none of the forms,
    /// [`ParseBlockError::Unknown`] when it fits one but nothing is registered.
    pub fn parse_block(&self, token: &str) -> Result<Slot, ParseBlockError> {
        let unknown = || ParseBlockError::Unknown(token.to_string());

        let numeric = if let Some(hex) = token.strip_prefix("0x") {
            if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ParseBlockError::Malformed(token.to_string()));
            }
            Some(u16::from_str_radix(hex, 16))
        } else if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            Some(token.parse::<u16>())
        } else {
            None
        };

        let def = match numeric {
            // Digits-only but too large for any id.
            Some(Err(_)) => return Err(unknown()),
            Some(Ok(id)) => self.lookup_by_id(id),
            None if is_name_token(token) => self.lookup_by_name(token),
            None => return Err(ParseBlockError::Malformed(token.to_string())),
        };
        def.map(|d| Slot::new(d.id(), 0)).ok_or_else(unknown)
    }

    /// Number of entries (blocks and items).
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &BlockType> {
        self.types.iter()
    }

    /// Block entries only.
    pub fn blocks(&self) -> impl Iterator<Item = &BlockType> {
        self.types.iter().filter(|d| d.kind == BlockKind::Block)
    }

    /// Item entries only.
    pub fn items(&self) -> impl Iterator<Item = &BlockType> {
        self.types.iter().filter(|d| d.kind == BlockKind::Item)
    }

    /// Names of all block entries.
    pub fn block_names(&self) -> impl Iterator<Item = &str> {
        self.blocks().map(|d| d.name.as_str())
    }

    /// Names of all item entries.
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items().map(|d| d.name.as_str())
    }
}

/// [`BlockRegistry::parse_block`] against the global registry.
pub fn parse_block(token: &str) -> Result<Slot, ParseBlockError> {
    BlockRegistry::global().parse_block(token)
}

/// Lowercase alphanumeric words separated by single hyphens.
fn is_name_token(token: &str) -> bool {
    !token.is_empty()
        && token.split('-').all(|word| {
            !word.is_empty()
                && word
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
