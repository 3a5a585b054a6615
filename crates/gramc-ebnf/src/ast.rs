//! Grammar AST node definitions.
//!
//! All nodes live in arenas owned by a single [`gramc_util::Root`]; links
//! between nodes are unowning [`ManagedPtr`] handles into those arenas.
//! Syntactic children are fixed at construction; everything a later
//! compiler pass computes goes into the write-once extension records (see
//! [`crate::extension`]).

use gramc_util::{AssignOnce, ManagedPtr, Pos, SynString};

use crate::extension::{AndExtension, ExprExtension, NonterminalExtension};
use crate::types::Type;

pub type ExprPtr = ManagedPtr<SyntaxExpr>;
pub type TypePtr = ManagedPtr<Type>;

/// A named type referenced in grammar text, before type resolution. The
/// concept is referenced from several node kinds, so it is a node of its
/// own rather than a bare string.
#[derive(Debug)]
pub struct RawType {
    pub name: SynString,
}

/// Top-level grammar declaration.
#[derive(Debug, Clone, Copy)]
pub enum Declaration {
    Type(ManagedPtr<TypeDeclaration>),
    Terminal(ManagedPtr<TerminalDeclaration>),
    Nonterminal(ManagedPtr<NonterminalDeclaration>),
    CustomTerminalType(ManagedPtr<CustomTerminalTypeDeclaration>),
}

impl Declaration {
    pub fn as_terminal(self) -> Option<ManagedPtr<TerminalDeclaration>> {
        match self {
            Declaration::Terminal(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_nonterminal(self) -> Option<ManagedPtr<NonterminalDeclaration>> {
        match self {
            Declaration::Nonterminal(nt) => Some(nt),
            _ => None,
        }
    }
}

/// Declaration of a user primitive type, e.g. the value type of a terminal.
#[derive(Debug)]
pub struct TypeDeclaration {
    pub name: SynString,
}

/// Declaration of a terminal symbol.
#[derive(Debug)]
pub struct TerminalDeclaration {
    pub name: SynString,
    pub raw_type: Option<ManagedPtr<RawType>>,

    tr_index: AssignOnce<usize>,
    value_type: AssignOnce<TypePtr>,
}

impl TerminalDeclaration {
    pub fn new(name: SynString, raw_type: Option<ManagedPtr<RawType>>) -> TerminalDeclaration {
        TerminalDeclaration {
            name,
            raw_type,
            tr_index: AssignOnce::new(),
            value_type: AssignOnce::new(),
        }
    }

    /// Position of this terminal in the grammar's terminal enumeration.
    pub fn tr_index(&self) -> usize {
        self.tr_index.value()
    }

    pub(crate) fn set_tr_index(&self, index: usize) {
        self.tr_index.set(index);
    }

    pub fn set_value_type(&self, value_type: TypePtr) {
        self.value_type.set(value_type);
    }

    pub fn value_type_opt(&self) -> Option<TypePtr> {
        self.value_type.get_opt().copied()
    }
}

/// Declaration of a nonterminal symbol with its production expression.
#[derive(Debug)]
pub struct NonterminalDeclaration {
    pub start: bool,
    pub name: SynString,
    pub expression: ExprPtr,
    pub explicit_raw_type: Option<ManagedPtr<RawType>>,

    explicit_type: AssignOnce<TypePtr>,
    nt_index: AssignOnce<usize>,
    ext: NonterminalExtension,
}

impl NonterminalDeclaration {
    pub fn new(
        start: bool,
        name: SynString,
        expression: ExprPtr,
        explicit_raw_type: Option<ManagedPtr<RawType>>,
    ) -> NonterminalDeclaration {
        NonterminalDeclaration {
            start,
            name,
            expression,
            explicit_raw_type,
            explicit_type: AssignOnce::new(),
            nt_index: AssignOnce::new(),
            ext: NonterminalExtension::new(),
        }
    }

    /// Position of this nonterminal in the grammar's nonterminal
    /// enumeration.
    pub fn nt_index(&self) -> usize {
        self.nt_index.value()
    }

    pub(crate) fn set_nt_index(&self, index: usize) {
        self.nt_index.set(index);
    }

    pub fn set_explicit_type(&self, explicit_type: TypePtr) {
        self.explicit_type.set(explicit_type);
    }

    pub fn explicit_type_opt(&self) -> Option<TypePtr> {
        self.explicit_type.get_opt().copied()
    }

    pub fn ext(&self) -> &NonterminalExtension {
        &self.ext
    }
}

/// Declaration of the value type shared by custom terminals.
#[derive(Debug)]
pub struct CustomTerminalTypeDeclaration {
    pub raw_type: ManagedPtr<RawType>,
}

/// A syntax expression node: the variant data plus the extension record
/// later passes write into.
#[derive(Debug)]
pub struct SyntaxExpr {
    kind: SyntaxExprKind,
    ext: ExprExtension,
}

impl SyntaxExpr {
    pub fn new(kind: SyntaxExprKind) -> SyntaxExpr {
        SyntaxExpr {
            kind,
            ext: ExprExtension::new(),
        }
    }

    pub fn kind(&self) -> &SyntaxExprKind {
        &self.kind
    }

    pub fn ext(&self) -> &ExprExtension {
        &self.ext
    }

    /// The node's direct syntactic sub-expressions, in source order.
    pub fn sub_expressions(&self) -> Vec<ExprPtr> {
        match &self.kind {
            SyntaxExprKind::Empty
            | SyntaxExprKind::NameRef(_)
            | SyntaxExprKind::StringLiteral(_)
            | SyntaxExprKind::Const(_) => Vec::new(),
            SyntaxExprKind::Or(or) => or.sub_exprs.clone(),
            SyntaxExprKind::And(and) => and.sub_exprs.clone(),
            SyntaxExprKind::NameElement(element) => vec![element.expression],
            SyntaxExprKind::ThisElement(element) => vec![element.expression],
            SyntaxExprKind::Cast(cast) => vec![cast.expression],
            SyntaxExprKind::ZeroOne(zero_one) => vec![zero_one.sub_expr],
            SyntaxExprKind::ZeroMany(repeat) | SyntaxExprKind::OneMany(repeat) => {
                let mut subs = vec![repeat.body.expression];
                subs.extend(repeat.body.separator);
                subs
            }
        }
    }
}

#[derive(Debug)]
pub enum SyntaxExprKind {
    /// Matches the empty string, produces nothing.
    Empty,
    /// Ordered choice between alternatives.
    Or(OrExpr),
    /// Sequence; may produce a class object carrying attributes.
    And(AndExpr),
    /// `name=expr` — binds the sub-expression's value to an attribute.
    NameElement(NameElement),
    /// `this=expr` — the sub-expression's value becomes the enclosing AND
    /// expression's result.
    ThisElement(ThisElement),
    /// Reference to a declared terminal or nonterminal by name.
    NameRef(NameRefExpr),
    /// A literal token.
    StringLiteral(StringLiteralExpr),
    /// Type-cast of a sub-expression.
    Cast(CastExpr),
    /// `expr?`
    ZeroOne(ZeroOneExpr),
    /// `expr*`, with an optional separator.
    ZeroMany(RepeatExpr),
    /// `expr+`, with an optional separator.
    OneMany(RepeatExpr),
    /// A constant value in place of a parsed one.
    Const(ConstSyntaxExpr),
}

#[derive(Debug)]
pub struct OrExpr {
    pub sub_exprs: Vec<ExprPtr>,
}

#[derive(Debug)]
pub struct AndExpr {
    pub sub_exprs: Vec<ExprPtr>,
    /// Explicit class name, when the production spells one.
    pub raw_type: Option<ManagedPtr<RawType>>,

    class_type: AssignOnce<TypePtr>,
    and_ext: AndExtension,
}

impl AndExpr {
    pub fn new(sub_exprs: Vec<ExprPtr>, raw_type: Option<ManagedPtr<RawType>>) -> AndExpr {
        AndExpr {
            sub_exprs,
            raw_type,
            class_type: AssignOnce::new(),
            and_ext: AndExtension::new(),
        }
    }

    pub fn set_class_type(&self, class_type: TypePtr) {
        self.class_type.set(class_type);
    }

    pub fn class_type_opt(&self) -> Option<TypePtr> {
        self.class_type.get_opt().copied()
    }

    pub fn and_ext(&self) -> &AndExtension {
        &self.and_ext
    }
}

#[derive(Debug)]
pub struct NameElement {
    /// Attribute name; empty when the element only groups.
    pub name: SynString,
    pub expression: ExprPtr,
}

#[derive(Debug)]
pub struct ThisElement {
    pub pos: Pos,
    pub expression: ExprPtr,
}

/// Reference to a declared symbol. The target is resolved by the name
/// resolution pass and installed once.
#[derive(Debug)]
pub struct NameRefExpr {
    pub name: SynString,
    sym: AssignOnce<SymbolRef>,
}

impl NameRefExpr {
    pub fn new(name: SynString) -> NameRefExpr {
        NameRefExpr {
            name,
            sym: AssignOnce::new(),
        }
    }

    pub fn set_sym(&self, sym: SymbolRef) {
        self.sym.set(sym);
    }

    pub fn sym(&self) -> SymbolRef {
        *self.sym.get()
    }

    pub fn sym_opt(&self) -> Option<SymbolRef> {
        self.sym.get_opt().copied()
    }
}

/// Resolved target of a [`NameRefExpr`].
#[derive(Clone, Copy)]
pub enum SymbolRef {
    Terminal(ManagedPtr<TerminalDeclaration>),
    Nonterminal(ManagedPtr<NonterminalDeclaration>),
}

// Printed shallowly: grammars are cyclic through symbol references, so
// formatting must not follow the target node.
impl std::fmt::Debug for SymbolRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolRef::Terminal(t) => write!(f, "Terminal({})", t.name),
            SymbolRef::Nonterminal(nt) => write!(f, "Nonterminal({})", nt.name),
        }
    }
}

#[derive(Debug)]
pub struct StringLiteralExpr {
    pub value: SynString,
}

#[derive(Debug)]
pub struct CastExpr {
    pub raw_type: ManagedPtr<RawType>,
    pub expression: ExprPtr,

    cast_type: AssignOnce<TypePtr>,
}

impl CastExpr {
    pub fn new(raw_type: ManagedPtr<RawType>, expression: ExprPtr) -> CastExpr {
        CastExpr {
            raw_type,
            expression,
            cast_type: AssignOnce::new(),
        }
    }

    pub fn set_cast_type(&self, cast_type: TypePtr) {
        self.cast_type.set(cast_type);
    }

    pub fn cast_type_opt(&self) -> Option<TypePtr> {
        self.cast_type.get_opt().copied()
    }
}

#[derive(Debug)]
pub struct ZeroOneExpr {
    pub sub_expr: ExprPtr,
}

/// Body of a repetition: the repeated expression and an optional separator
/// between occurrences.
#[derive(Debug)]
pub struct LoopBody {
    pub expression: ExprPtr,
    pub separator: Option<ExprPtr>,
    pub separator_pos: Pos,
}

#[derive(Debug)]
pub struct RepeatExpr {
    pub body: LoopBody,
}

#[derive(Debug)]
pub struct ConstSyntaxExpr {
    pub value: ManagedPtr<ConstExpr>,
}

/// Compile-time constant expression.
#[derive(Debug)]
pub enum ConstExpr {
    Integer(i64),
    String(SynString),
    Boolean(bool),
    Native(NativeConstExpr),
}

/// Reference to a host-language constant: qualifiers, a variable or
/// function name, and a chain of member references.
#[derive(Debug)]
pub struct NativeConstExpr {
    pub qualifiers: Vec<SynString>,
    pub name: ManagedPtr<NativeName>,
    pub references: Vec<ManagedPtr<NativeRef>>,
}

#[derive(Debug)]
pub struct NativeName {
    pub name: SynString,
    pub kind: NativeNameKind,
}

#[derive(Debug)]
pub enum NativeNameKind {
    Variable,
    Function { arguments: Vec<ManagedPtr<ConstExpr>> },
}

#[derive(Debug)]
pub struct NativeRef {
    pub name: ManagedPtr<NativeName>,
    pub kind: NativeRefKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeRefKind {
    /// Member accessed through a pointer.
    Pointer,
    /// Member accessed through a reference.
    Reference,
}
