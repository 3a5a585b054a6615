//! Extension records attached to AST nodes.
//!
//! Syntactic structure is fixed when a node is built; everything computed
//! afterwards lives in an extension record of write-once slots. Each slot
//! is populated by exactly one compiler pass; a second assignment panics
//! (see [`AssignOnce`]).

use std::cell::{Cell, Ref, RefCell};

use gramc_util::AssignOnce;

use crate::ast::{ExprPtr, TypePtr};

/// Coarse classification of an expression's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralType {
    Void,
    Primitive,
    Array,
    Class,
}

/// Conversion applied when an expression's value is materialized. The
/// emission layer defines the concrete operations; the IR records only
/// which shape applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Value passed through unchanged.
    Direct,
    /// Occurrences collected into an array.
    Array,
    /// Class object constructed from attribute elements.
    Class,
    /// No value produced.
    Void,
}

/// Slots shared by expression and nonterminal extensions.
#[derive(Debug)]
pub struct ExtensionCore {
    is_void: AssignOnce<bool>,
    general_type: AssignOnce<GeneralType>,
    concrete_type: AssignOnce<TypePtr>,
}

impl ExtensionCore {
    fn new() -> ExtensionCore {
        ExtensionCore {
            is_void: AssignOnce::new(),
            general_type: AssignOnce::new(),
            concrete_type: AssignOnce::new(),
        }
    }

    pub fn set_is_void(&self, is_void: bool) {
        self.is_void.set(is_void);
    }

    pub fn is_void_defined(&self) -> bool {
        self.is_void.is_set()
    }

    pub fn is_void(&self) -> bool {
        self.is_void.value()
    }

    /// Installs the general type. `is_void` must already be set, and the
    /// two must agree: the general type is `Void` iff the expression is
    /// void.
    pub fn set_general_type(&self, general_type: GeneralType) {
        assert_eq!(
            self.is_void(),
            general_type == GeneralType::Void,
            "general type contradicts the is_void slot"
        );
        self.general_type.set(general_type);
    }

    pub fn general_type_defined(&self) -> bool {
        self.general_type.is_set()
    }

    pub fn general_type(&self) -> GeneralType {
        self.general_type.value()
    }

    pub fn set_concrete_type(&self, concrete_type: TypePtr) {
        self.concrete_type.set(concrete_type);
    }

    pub fn concrete_type_defined(&self) -> bool {
        self.concrete_type.is_set()
    }

    pub fn concrete_type(&self) -> TypePtr {
        self.concrete_type.value()
    }
}

/// Extension record of a syntax expression.
#[derive(Debug)]
pub struct ExprExtension {
    core: ExtensionCore,
    expected_type: AssignOnce<TypePtr>,

    /// Whether a `this=` element is related to this expression.
    and_result: AssignOnce<bool>,

    /// Name elements producing this expression's attributes. For
    /// `a=A (b=B | (c=C)?)` all three attributes relate to the whole
    /// expression; duplicates are expected.
    and_attributes: RefCell<Vec<ExprPtr>>,

    conversion: AssignOnce<Conversion>,
}

impl ExprExtension {
    pub(crate) fn new() -> ExprExtension {
        ExprExtension {
            core: ExtensionCore::new(),
            expected_type: AssignOnce::new(),
            and_result: AssignOnce::new(),
            and_attributes: RefCell::new(Vec::new()),
            conversion: AssignOnce::new(),
        }
    }

    pub fn core(&self) -> &ExtensionCore {
        &self.core
    }

    pub fn set_expected_type(&self, expected_type: TypePtr) {
        self.expected_type.set(expected_type);
    }

    pub fn expected_type(&self) -> TypePtr {
        self.expected_type.value()
    }

    pub fn add_and_attribute(&self, attribute: ExprPtr) {
        self.and_attributes.borrow_mut().push(attribute);
    }

    pub fn add_and_attributes(&self, attributes: &[ExprPtr]) {
        self.and_attributes.borrow_mut().extend_from_slice(attributes);
    }

    pub fn clear_and_attributes(&self) {
        self.and_attributes.borrow_mut().clear();
    }

    pub fn and_attributes(&self) -> Ref<'_, Vec<ExprPtr>> {
        self.and_attributes.borrow()
    }

    pub fn set_and_result(&self, and_result: bool) {
        self.and_result.set(and_result);
    }

    pub fn is_and_result(&self) -> bool {
        self.and_result.value()
    }

    pub fn set_conversion(&self, conversion: Conversion) {
        self.conversion.set(conversion);
    }

    pub fn conversion(&self) -> Conversion {
        self.conversion.value()
    }
}

/// What kind of result an AND expression produces.
#[derive(Debug)]
pub struct AndMeaning {
    /// Sub-expressions that contribute no part of the result.
    pub non_result_sub_exprs: Vec<ExprPtr>,
    pub kind: AndMeaningKind,
}

#[derive(Debug)]
pub enum AndMeaningKind {
    /// The expression produces no result.
    Void,
    /// `this=` elements define the result.
    This { result_elements: Vec<ExprPtr> },
    /// The result is a class object.
    Class { has_attributes: bool },
}

/// Extension record specific to AND expressions.
#[derive(Debug)]
pub struct AndExtension {
    meaning: AssignOnce<AndMeaning>,
}

impl AndExtension {
    pub(crate) fn new() -> AndExtension {
        AndExtension {
            meaning: AssignOnce::new(),
        }
    }

    pub fn set_meaning(&self, meaning: AndMeaning) {
        self.meaning.set(meaning);
    }

    pub fn meaning(&self) -> &AndMeaning {
        self.meaning.get()
    }

    pub fn meaning_defined(&self) -> bool {
        self.meaning.is_set()
    }
}

/// Extension record of a nonterminal declaration.
#[derive(Debug)]
pub struct NonterminalExtension {
    core: ExtensionCore,
    class_type: AssignOnce<TypePtr>,

    /// Re-entrancy guard for traversals of cyclic grammars.
    visiting: Cell<bool>,
}

impl NonterminalExtension {
    pub(crate) fn new() -> NonterminalExtension {
        NonterminalExtension {
            core: ExtensionCore::new(),
            class_type: AssignOnce::new(),
            visiting: Cell::new(false),
        }
    }

    pub fn core(&self) -> &ExtensionCore {
        &self.core
    }

    /// Sets the visiting guard and returns its previous value.
    pub fn set_visiting(&self, visiting: bool) -> bool {
        self.visiting.replace(visiting)
    }

    pub fn set_class_type(&self, class_type: TypePtr) {
        self.class_type.set(class_type);
    }

    pub fn class_type(&self) -> TypePtr {
        self.class_type.value()
    }

    pub fn class_type_opt(&self) -> Option<TypePtr> {
        self.class_type.get_opt().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn general_type_must_match_is_void() {
        let core = ExtensionCore::new();
        core.set_is_void(false);
        core.set_general_type(GeneralType::Class);
        assert_eq!(core.general_type(), GeneralType::Class);
        assert!(!core.is_void());
    }

    #[test]
    #[should_panic(expected = "contradicts")]
    fn void_general_type_on_non_void_panics() {
        let core = ExtensionCore::new();
        core.set_is_void(false);
        core.set_general_type(GeneralType::Void);
    }

    #[test]
    #[should_panic(expected = "assigned twice")]
    fn double_is_void_panics() {
        let core = ExtensionCore::new();
        core.set_is_void(true);
        core.set_is_void(true);
    }

    #[test]
    fn visiting_guard_reports_previous_value() {
        let ext = NonterminalExtension::new();
        assert!(!ext.set_visiting(true));
        assert!(ext.set_visiting(true));
        assert!(ext.set_visiting(false));
        assert!(!ext.set_visiting(false));
    }
}
