//! The facet bitset of an abstract value.
//!
//! The bit layout is private to this crate; the public contract is the
//! grouping into primitives, number categories, string categories,
//! property attributes, and meta-states. The composite masks mirror the
//! groups used throughout the lattice operations.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct ValueFlags: u32 {
        /// The boolean true.
        const BOOL_TRUE = 0x0000_0001;
        /// The boolean false.
        const BOOL_FALSE = 0x0000_0002;
        /// The undefined value.
        const UNDEF = 0x0000_0004;
        /// The null value.
        const NULL = 0x0000_0008;

        /// Strings representing numbers that are UInt32.
        const STR_UINT = 0x0000_0010;
        /// Strings representing non-UInt32 numbers, including Infinity,
        /// -Infinity, and NaN.
        const STR_OTHERNUM = 0x0000_0020;
        /// Strings consisting of a fixed nonempty prefix followed by an
        /// unknown string.
        const STR_PREFIX = 0x0000_0040;
        /// Strings that are valid identifiers (reserved names not excluded).
        const STR_IDENTIFIER = 0x0000_0080;
        /// Strings that are valid identifier-parts but neither identifiers
        /// nor UInt32 strings.
        const STR_OTHERIDENTIFIERPARTS = 0x0000_0100;
        /// Strings not representing numbers and not identifier-parts.
        const STR_OTHER = 0x0000_0200;
        /// Strings originating from a JSON source.
        const STR_JSON = 0x0000_0400;

        /// NaN.
        const NUM_NAN = 0x0000_1000;
        /// +/-Infinity.
        const NUM_INF = 0x0000_2000;
        /// Non-zero UInt32 numbers.
        const NUM_UINT_POS = 0x0000_4000;
        /// Numbers that are not UInt32, not NaN, and not +/-Infinity.
        const NUM_OTHER = 0x0000_8000;
        /// Zero (positive or negative).
        const NUM_ZERO = 0x4000_0000;

        /// DontEnum property attribute.
        const ATTR_DONTENUM = 0x0001_0000;
        /// Definitely not DontEnum.
        const ATTR_NOTDONTENUM = 0x0002_0000;
        /// ReadOnly property attribute.
        const ATTR_READONLY = 0x0004_0000;
        /// Definitely not ReadOnly.
        const ATTR_NOTREADONLY = 0x0008_0000;
        /// DontDelete property attribute.
        const ATTR_DONTDELETE = 0x0010_0000;
        /// Definitely not DontDelete.
        const ATTR_NOTDONTDELETE = 0x0020_0000;

        /// Deprecated maybe-modified marker, preserved for representation
        /// compatibility.
        const MODIFIED = 0x0100_0000;
        /// Maybe absent property.
        const ABSENT = 0x0200_0000;
        /// Maybe present data property (polymorphic values only).
        const PRESENT_DATA = 0x0400_0000;
        /// Maybe present accessor property (polymorphic values only).
        const PRESENT_ACCESSOR = 0x0800_0000;
        /// Unknown, for lazy propagation.
        const UNKNOWN = 0x1000_0000;
        /// Extended-scope register marker.
        const EXTENDEDSCOPE = 0x2000_0000;

        // Composite masks.

        /// UInt32 numbers, including zero.
        const NUM_UINT = Self::NUM_UINT_POS.bits() | Self::NUM_ZERO.bits();
        /// Any boolean.
        const BOOL = Self::BOOL_TRUE.bits() | Self::BOOL_FALSE.bits();
        /// String categories that are identifier parts.
        const STR_IDENTIFIERPARTS = Self::STR_UINT.bits()
            | Self::STR_IDENTIFIER.bits()
            | Self::STR_OTHERIDENTIFIERPARTS.bits();
        /// All string category bits.
        const STR = Self::STR_OTHERNUM.bits()
            | Self::STR_PREFIX.bits()
            | Self::STR_IDENTIFIERPARTS.bits()
            | Self::STR_OTHER.bits()
            | Self::STR_JSON.bits();
        /// All number category bits.
        const NUM = Self::NUM_NAN.bits()
            | Self::NUM_INF.bits()
            | Self::NUM_UINT.bits()
            | Self::NUM_OTHER.bits();
        /// Both DontEnum polarities.
        const ATTR_DONTENUM_ANY = Self::ATTR_DONTENUM.bits() | Self::ATTR_NOTDONTENUM.bits();
        /// Both ReadOnly polarities.
        const ATTR_READONLY_ANY = Self::ATTR_READONLY.bits() | Self::ATTR_NOTREADONLY.bits();
        /// Both DontDelete polarities.
        const ATTR_DONTDELETE_ANY = Self::ATTR_DONTDELETE.bits() | Self::ATTR_NOTDONTDELETE.bits();
        /// All attribute bits.
        const ATTR = Self::ATTR_DONTENUM_ANY.bits()
            | Self::ATTR_READONLY_ANY.bits()
            | Self::ATTR_DONTDELETE_ANY.bits();
        /// Attribute bits plus the deprecated modified marker.
        const PROPERTYDATA = Self::ATTR.bits() | Self::MODIFIED.bits();
        /// All meta-state bits.
        const META = Self::ABSENT.bits()
            | Self::PROPERTYDATA.bits()
            | Self::EXTENDEDSCOPE.bits()
            | Self::PRESENT_DATA.bits()
            | Self::PRESENT_ACCESSOR.bits();
        /// All primitive facet bits.
        const PRIMITIVE = Self::UNDEF.bits()
            | Self::NULL.bits()
            | Self::BOOL.bits()
            | Self::NUM.bits()
            | Self::STR.bits();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_cover_their_groups() {
        assert!(ValueFlags::NUM.contains(ValueFlags::NUM_ZERO));
        assert!(ValueFlags::NUM.contains(ValueFlags::NUM_NAN));
        assert!(ValueFlags::STR.contains(ValueFlags::STR_PREFIX));
        assert!(ValueFlags::STR.contains(ValueFlags::STR_JSON));
        assert!(ValueFlags::STR_IDENTIFIERPARTS.contains(ValueFlags::STR_UINT));
        assert!(ValueFlags::PRIMITIVE.contains(ValueFlags::STR));
        assert!(ValueFlags::PRIMITIVE.contains(ValueFlags::NUM));
        assert!(!ValueFlags::PRIMITIVE.intersects(ValueFlags::META));
    }

    #[test]
    fn test_groups_disjoint() {
        assert!(!ValueFlags::NUM.intersects(ValueFlags::STR));
        assert!(!ValueFlags::ATTR.intersects(ValueFlags::PRIMITIVE));
        assert!(!ValueFlags::UNKNOWN.intersects(ValueFlags::PRIMITIVE | ValueFlags::META));
    }
}
