//! Access levels and modifier bitsets shared by the parser (which recognizes
//! modifier keywords on a declaration header) and the binder (which stores
//! them on the resulting symbol). Spec §3.4.

use bitflags::bitflags;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessLevel {
    Public,
    #[default]
    Private,
    Protected,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Modifiers: u32 {
        const STATIC   = 1 << 0;
        const VIRTUAL  = 1 << 1;
        const OVERRIDE = 1 << 2;
        const ABSTRACT = 1 << 3;
        const ASYNC    = 1 << 4;
        const EXTERN   = 1 << 5;
        const REF      = 1 << 6;
        const INLINE   = 1 << 7;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_combine() {
        let m = Modifiers::STATIC | Modifiers::ABSTRACT;
        assert!(m.contains(Modifiers::STATIC));
        assert!(m.contains(Modifiers::ABSTRACT));
        assert!(!m.contains(Modifiers::ASYNC));
    }
}
