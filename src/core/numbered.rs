//! Fixed-depth `c01` .. `c20` levels.
//!
//! Each level only binds its own tag and the tag of the level below it; the
//! node building itself is shared through [`CLevel`].

use crate::core::model::Component;
use crate::core::nodes::CLevel;
use crate::core::parser::{children, parse_component};
use roxmltree::Node;

macro_rules! numbered_level {
    ($name:ident, $nested:ident, $nested_tag:literal) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub component: Component,
            pub nested: Vec<$nested>,
        }

        impl $name {
            pub(crate) fn from_node(node: Node, src: &str) -> Self {
                $name {
                    component: parse_component(node, src),
                    nested: children(node, $nested_tag)
                        .map(|n| $nested::from_node(n, src))
                        .collect(),
                }
            }
        }

        impl CLevel for $name {
            type Nested = $nested;

            fn component(&self) -> &Component {
                &self.component
            }

            fn nested(&self) -> &[$nested] {
                &self.nested
            }
        }
    };
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub component: Component,
        }

        impl $name {
            pub(crate) fn from_node(node: Node, src: &str) -> Self {
                $name {
                    component: parse_component(node, src),
                }
            }
        }

        impl CLevel for $name {
            type Nested = $name;

            fn component(&self) -> &Component {
                &self.component
            }

            fn nested(&self) -> &[$name] {
                &[]
            }
        }
    };
}

numbered_level!(C01, C02, "c02");
numbered_level!(C02, C03, "c03");
numbered_level!(C03, C04, "c04");
numbered_level!(C04, C05, "c05");
numbered_level!(C05, C06, "c06");
numbered_level!(C06, C07, "c07");
numbered_level!(C07, C08, "c08");
numbered_level!(C08, C09, "c09");
numbered_level!(C09, C10, "c10");
numbered_level!(C10, C11, "c11");
numbered_level!(C11, C12, "c12");
numbered_level!(C12, C13, "c13");
numbered_level!(C13, C14, "c14");
numbered_level!(C14, C15, "c15");
numbered_level!(C15, C16, "c16");
numbered_level!(C16, C17, "c17");
numbered_level!(C17, C18, "c18");
numbered_level!(C18, C19, "c19");
numbered_level!(C19, C20, "c20");
numbered_level!(C20);
