//! Typed identifiers handed out by a dependency graph
//!
//! Ids are dense indices offset by one and stored in a `NonZeroU32`, so
//! `Option<Id>` doubles as the "invalid id" sentinel at no cost. Each graph
//! numbers its own objects from zero; ids from different graphs are not
//! comparable.

use std::fmt;
use std::num::NonZeroU32;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Id of the object stored at `index`
            pub fn from_index(index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize, "{} index overflow: {}", $label, index);
                Self(NonZeroU32::MIN.saturating_add(index as u32))
            }

            /// Dense index of the object this id designates
            pub fn index(self) -> usize {
                (self.0.get() - 1) as usize
            }

            /// Raw (offset) value, as shown in logs
            pub fn raw(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }
    };
}

define_id!(
    /// Render target declared with `DependencyGraph::add_rtarget`
    RenderTargetId, "rtarget"
);
define_id!(
    /// Render pass declared with `DependencyGraph::add_rpass`
    RenderPassId, "rpass"
);
define_id!(
    /// Renderer registered with `DependencyGraph::add_renderer`
    RendererId, "renderer"
);
define_id!(
    /// Step declared with `DependencyGraph::add_step` or `add_dummy_step`
    StepId, "step"
);

/// Wave number assigned to a step by dependency resolution (0-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SequenceIndex(pub u32);

impl fmt::Display for SequenceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wave#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip_is_offset() {
        let id = StepId::from_index(0);
        assert_eq!(id.index(), 0);
        assert_eq!(id.raw(), 1);
        assert_eq!(RenderTargetId::from_index(41).index(), 41);
    }

    #[test]
    fn test_option_id_has_no_overhead() {
        assert_eq!(std::mem::size_of::<Option<RenderPassId>>(), std::mem::size_of::<u32>());
    }

    #[test]
    fn test_ids_order_by_index() {
        assert!(StepId::from_index(1) < StepId::from_index(2));
    }

    #[test]
    fn test_display_labels() {
        assert_eq!(format!("{}", RendererId::from_index(2)), "renderer#3");
        assert_eq!(format!("{}", SequenceIndex(4)), "wave#4");
    }
}
