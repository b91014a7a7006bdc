//! Architecture-related macros

/// Determine the architecture named by an `ArchName` and yield the
/// architecture's type for use in generic contexts.
///
/// This macro must be invoked in order to do almost anything generic with a
/// particular architecture. It is responsible for instantiating your code
/// across each architecture's particular type system.
macro_rules! with_architecture {
    ($name:expr, |$arch:ident| $callback:block) => {
        match $name {
            crate::arch::ArchName::Tlcs90 => {
                let $arch = crate::arch::tlcs90::Tlcs90();
                $callback
            }
        }
    };
}
