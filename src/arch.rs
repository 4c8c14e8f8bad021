//! Target architectures a test case can be restricted to.

/// Every architecture a `CHECK-START-<ARCH>` line may name.
pub const ARCHITECTURES: &[&str] = &["ARM", "ARM64", "MIPS", "MIPS64", "X86", "X86_64"];

/// Look up an architecture by name, ignoring case. Returns the canonical
/// spelling.
pub fn lookup(name: &str) -> Option<&'static str> {
    ARCHITECTURES
        .iter()
        .copied()
        .find(|arch| arch.eq_ignore_ascii_case(name))
}

pub fn is_known(name: &str) -> bool {
    lookup(name).is_some()
}

/// Whether two architecture names denote the same target.
pub fn same(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(lookup("arm64"), Some("ARM64"));
        assert_eq!(lookup("X86_64"), Some("X86_64"));
        assert_eq!(lookup("riscv"), None);
    }

    #[test]
    fn test_same() {
        assert!(same("x86", "X86"));
        assert!(!same("x86", "x86_64"));
    }
}
