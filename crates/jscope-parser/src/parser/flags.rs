//! Declaration modifiers.

use bitflags::bitflags;

bitflags! {
    /// Source-level modifiers of a declaration.
    ///
    /// Carried through to symbols as opaque attributes; name resolution
    /// never inspects them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModifierFlags: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
        const NATIVE = 1 << 6;
        const SYNCHRONIZED = 1 << 7;
        const TRANSIENT = 1 << 8;
        const VOLATILE = 1 << 9;
        const STRICTFP = 1 << 10;
        const DEFAULT = 1 << 11;
        const SEALED = 1 << 12;
        const NON_SEALED = 1 << 13;
    }
}

impl ModifierFlags {
    /// Lower-case source spellings of the set flags, in declaration order.
    pub fn keywords(self) -> Vec<&'static str> {
        self.iter_names()
            .map(|(name, _)| match name {
                "PUBLIC" => "public",
                "PROTECTED" => "protected",
                "PRIVATE" => "private",
                "STATIC" => "static",
                "FINAL" => "final",
                "ABSTRACT" => "abstract",
                "NATIVE" => "native",
                "SYNCHRONIZED" => "synchronized",
                "TRANSIENT" => "transient",
                "VOLATILE" => "volatile",
                "STRICTFP" => "strictfp",
                "DEFAULT" => "default",
                "SEALED" => "sealed",
                _ => "non-sealed",
            })
            .collect()
    }
}
