use num_traits::{One, PrimInt};

/// Trait implemented by flag enums declared with [`define_bitmask_flags!`].
///
/// The enum's discriminant (via `#[repr(u8)]`) determines the bit index.
/// The backing integer type is chosen via the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // Equivalent to: 1 << index
        // NOTE: Ensure your `bit_index()` is < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container over any primitive integer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    /// Every bit set.
    pub fn all() -> Self {
        Self { bits: !T::zero() }
    }

    pub fn none() -> Self {
        Self { bits: T::zero() }
    }

    /// Build a mask from a list of flags.
    pub fn from_flags<U: FlagBitmask<Storage = T> + Copy>(tags: &[U]) -> Self {
        let mut flags = Self::none();
        flags.add_many(tags);
        flags
    }

    // --- Single Tag Operations ---
    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits & !tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    // --- Bulk Operations ---
    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.add(tag);
        }
    }

    pub fn remove_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.remove(tag);
        }
    }

    // --- Logic Gates ---
    pub fn has_all<U: FlagBitmask<Storage = T> + Copy>(&self, tags: &[U]) -> bool {
        if tags.is_empty() {
            return true;
        }
        let combined = tags.iter().fold(T::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) == combined
    }

    pub fn has_any<U: FlagBitmask<Storage = T> + Copy>(&self, tags: &[U]) -> bool {
        if tags.is_empty() {
            return false;
        }
        let combined = tags.iter().fold(T::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) != T::zero()
    }

    /// True if the two masks share at least one bit.
    pub fn intersects(&self, other: &Self) -> bool {
        (self.bits & other.bits) != T::zero()
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }

    pub fn clear(&mut self) {
        self.bits = T::zero();
    }
}

/// Declare a bitmask-backed enum and implement `FlagBitmask` for it.
///
/// Example:
/// ```rust
/// kcc::define_bitmask_flags!(SurfaceTag, u16, {
///     Ice,
///     Mud,
///     Ladder,
/// });
/// ```
#[macro_export]
macro_rules! define_bitmask_flags {
    ($name:ident, $storage:ty, { $($variant:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[repr(u8)]
        pub enum $name {
            $($variant),*
        }

        impl $crate::bitmask_flags::FlagBitmask for $name {
            type Storage = $storage;

            fn bit_index(&self) -> u8 {
                *self as u8
            }
        }
    };
}
