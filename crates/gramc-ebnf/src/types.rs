//! Semantic types computed for grammar symbols and expressions.

use std::fmt;

use gramc_util::ManagedPtr;

use crate::ast::{NonterminalDeclaration, TypePtr};

/// A resolved type. Types are arena-allocated and compared by identity,
/// except arrays, which compare by element type.
pub enum Type {
    Void,
    /// Primitive type declared in the grammar.
    UserPrimitive { name: String },
    /// Primitive type provided by the generator itself.
    SystemPrimitive { name: String },
    /// Class generated for a nonterminal.
    NonterminalClass(ManagedPtr<NonterminalDeclaration>),
    /// Class referenced by explicit name.
    NameClass { name: String },
    Array { element: TypePtr },
}

impl Type {
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Name of the generated class, for the class-shaped types.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::NonterminalClass(nt) => Some(nt.name.as_str()),
            Type::NameClass { name } => Some(name),
            _ => None,
        }
    }
}

/// Type equality: identity for everything except arrays, which are equal
/// when their element types are.
pub fn types_equal(a: TypePtr, b: TypePtr) -> bool {
    if a.ptr_eq(b) {
        return true;
    }
    match (&*a, &*b) {
        (Type::Array { element: ea }, Type::Array { element: eb }) => types_equal(*ea, *eb),
        _ => false,
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::UserPrimitive { name } => write!(f, "user:{name}"),
            Type::SystemPrimitive { name } => write!(f, "sys:{name}"),
            Type::NonterminalClass(nt) => write!(f, "nt:{}", nt.name),
            Type::NameClass { name } => write!(f, "cl:{name}"),
            Type::Array { element } => write!(f, "array[{}]", **element),
        }
    }
}

// Shallow formatting: a nonterminal-class type must not drag the whole
// declaration graph into the output.
impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gramc_util::Arena;

    #[test]
    fn identity_equality_for_primitives() {
        let arena: Arena<Type> = Arena::new();
        let a = arena.add(Type::UserPrimitive {
            name: "Token".to_string(),
        });
        let b = arena.add(Type::UserPrimitive {
            name: "Token".to_string(),
        });

        assert!(types_equal(a, a));
        // Same spelling, different node: not the same type.
        assert!(!types_equal(a, b));
    }

    #[test]
    fn structural_equality_for_arrays() {
        let arena: Arena<Type> = Arena::new();
        let element = arena.add(Type::SystemPrimitive {
            name: "int".to_string(),
        });
        let other_element = arena.add(Type::SystemPrimitive {
            name: "int".to_string(),
        });
        let a = arena.add(Type::Array { element });
        let b = arena.add(Type::Array { element });
        let c = arena.add(Type::Array {
            element: other_element,
        });

        assert!(types_equal(a, b));
        // Array of a *different* primitive node: unequal elements.
        assert!(!types_equal(a, c));
    }

    #[test]
    fn nested_arrays_compare_by_element() {
        let arena: Arena<Type> = Arena::new();
        let element = arena.add(Type::Void);
        let inner_a = arena.add(Type::Array { element });
        let inner_b = arena.add(Type::Array { element });
        let a = arena.add(Type::Array { element: inner_a });
        let b = arena.add(Type::Array { element: inner_b });
        assert!(types_equal(a, b));
    }

    #[test]
    fn display_forms() {
        let arena: Arena<Type> = Arena::new();
        let element = arena.add(Type::UserPrimitive {
            name: "Sym".to_string(),
        });
        let array = arena.add(Type::Array { element });
        assert_eq!(array.to_string(), "array[user:Sym]");
        assert_eq!(arena.add(Type::Void).to_string(), "void");
    }
}
