// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A macro to define bitflag sets in a structured way.

/// Declares a `Copy` newtype over an integer with named flag constants and the
/// usual set operations.
///
/// ```
/// use penumbra_core::penumbra_bitflags;
///
/// penumbra_bitflags! {
///     /// Example flags.
///     pub struct Sides: u8 {
///         /// Left.
///         const LEFT = 1 << 0;
///         /// Right.
///         const RIGHT = 1 << 1;
///     }
/// }
///
/// let both = Sides::LEFT | Sides::RIGHT;
/// assert!(both.contains(Sides::LEFT));
/// assert_eq!(both.bits(), 0b11);
/// ```
#[macro_export]
macro_rules! penumbra_bitflags {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident: $ty:ty {
            $(
                $(#[$flag_attr:meta])*
                const $flag_name:ident = $flag_value:expr;
            )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name {
            bits: $ty,
        }

        impl $name {
            /// An empty set of flags.
            pub const EMPTY: Self = Self { bits: 0 };

            $(
                $(#[$flag_attr])*
                pub const $flag_name: Self = Self { bits: $flag_value };
            )*

            /// Creates a flag set from raw bits, keeping unknown bits.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self { bits }
            }

            /// Returns the raw value of the flag set.
            pub const fn bits(&self) -> $ty {
                self.bits
            }

            /// Returns `true` if no flag is set.
            pub const fn is_empty(&self) -> bool {
                self.bits == 0
            }

            /// Returns `true` if all flags in `other` are contained within `self`.
            pub const fn contains(&self, other: Self) -> bool {
                (self.bits & other.bits) == other.bits
            }

            /// Returns `true` if any flag in `other` is contained within `self`.
            pub const fn intersects(&self, other: Self) -> bool {
                (self.bits & other.bits) != 0
            }

            /// Inserts the flags in `other` into `self`.
            pub fn insert(&mut self, other: Self) {
                self.bits |= other.bits;
            }

            /// Removes the flags in `other` from `self`.
            pub fn remove(&mut self, other: Self) {
                self.bits &= !other.bits;
            }
        }

        impl core::ops::BitOr for $name {
            type Output = Self;
            fn bitor(self, other: Self) -> Self {
                Self { bits: self.bits | other.bits }
            }
        }

        impl core::ops::BitAnd for $name {
            type Output = Self;
            fn bitand(self, other: Self) -> Self {
                Self { bits: self.bits & other.bits }
            }
        }

        impl core::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, other: Self) {
                self.bits |= other.bits;
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                let mut set = f.debug_set();
                $(
                    if $flag_value != 0 && self.contains(Self::$flag_name) {
                        set.entry(&stringify!($flag_name));
                    }
                )*
                set.finish()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    penumbra_bitflags! {
        struct TestFlags: u32 {
            const A = 1 << 0;
            const B = 1 << 1;
            const C = 1 << 2;
        }
    }

    #[test]
    fn test_set_operations() {
        let mut flags = TestFlags::A | TestFlags::C;
        assert!(flags.contains(TestFlags::A));
        assert!(!flags.contains(TestFlags::A | TestFlags::B));
        assert!(flags.intersects(TestFlags::B | TestFlags::C));

        flags.remove(TestFlags::A);
        assert_eq!(flags, TestFlags::C);
        flags.insert(TestFlags::B);
        assert_eq!(flags.bits(), 0b110);
        assert!(TestFlags::EMPTY.is_empty());
    }

    #[test]
    fn test_debug_lists_names() {
        let flags = TestFlags::A | TestFlags::B;
        assert_eq!(format!("{flags:?}"), "{\"A\", \"B\"}");
    }
}
