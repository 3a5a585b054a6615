//! End-to-end IR exercise: build a small grammar the way the parser
//! front-end would, run resolution- and typing-style passes over it, and
//! derive the scanner trie.
//!
//! The grammar under test:
//!
//! ```text
//! type Value;
//! token NUM {Value};
//! @Expr : left=Term "+" this=Expr | this=Term;
//! Term : NUM | "(" this=Expr ")";
//! ```

use gramc_ebnf::ast::*;
use gramc_ebnf::extension::{AndMeaning, AndMeaningKind, GeneralType};
use gramc_ebnf::scan::{build_literal_trie, TerminalDescriptor, TerminalKind};
use gramc_ebnf::types::{types_equal, Type};
use gramc_ebnf::{print, Grammar};
use gramc_util::{Arena, Heap, ManagedPtr, Pos, Root, SynString};

struct Builder {
    exprs: ManagedPtr<Arena<SyntaxExpr>>,
    raw_types: ManagedPtr<Arena<RawType>>,
    types: ManagedPtr<Arena<Type>>,
}

impl Builder {
    fn expr(&self, kind: SyntaxExprKind) -> ExprPtr {
        self.exprs.add(SyntaxExpr::new(kind))
    }

    fn name_ref(&self, name: &str) -> ExprPtr {
        self.expr(SyntaxExprKind::NameRef(NameRefExpr::new(
            SynString::synthetic(name),
        )))
    }

    fn literal(&self, text: &str) -> ExprPtr {
        self.expr(SyntaxExprKind::StringLiteral(StringLiteralExpr {
            value: SynString::synthetic(text),
        }))
    }

    fn named(&self, name: &str, expression: ExprPtr) -> ExprPtr {
        self.expr(SyntaxExprKind::NameElement(NameElement {
            name: SynString::synthetic(name),
            expression,
        }))
    }

    fn this(&self, expression: ExprPtr) -> ExprPtr {
        self.expr(SyntaxExprKind::ThisElement(ThisElement {
            pos: Pos::new(1, 1),
            expression,
        }))
    }

    fn and(&self, sub_exprs: Vec<ExprPtr>) -> ExprPtr {
        self.expr(SyntaxExprKind::And(AndExpr::new(sub_exprs, None)))
    }

    fn or(&self, sub_exprs: Vec<ExprPtr>) -> ExprPtr {
        self.expr(SyntaxExprKind::Or(OrExpr { sub_exprs }))
    }

    fn raw_type(&self, name: &str) -> ManagedPtr<RawType> {
        self.raw_types.add(RawType {
            name: SynString::synthetic(name),
        })
    }
}

/// Builds the test grammar inside a fresh heap and wraps it in a root.
fn build_grammar() -> (Root<Grammar>, Builder) {
    let mut heap = Heap::new();
    let builder = Builder {
        exprs: heap.create_container(),
        raw_types: heap.create_container(),
        types: heap.create_container(),
    };
    let type_decls = heap.create_container::<TypeDeclaration>();
    let terminal_decls = heap.create_container::<TerminalDeclaration>();
    let nonterminal_decls = heap.create_container::<NonterminalDeclaration>();

    let value_type = type_decls.add(TypeDeclaration {
        name: SynString::synthetic("Value"),
    });
    let num = terminal_decls.add(TerminalDeclaration::new(
        SynString::synthetic("NUM"),
        Some(builder.raw_type("Value")),
    ));

    // Expr : left=Term "+" this=Expr | this=Term;
    let expr_body = builder.or(vec![
        builder.and(vec![
            builder.named("left", builder.name_ref("Term")),
            builder.literal("+"),
            builder.this(builder.name_ref("Expr")),
        ]),
        builder.this(builder.name_ref("Term")),
    ]);
    let expr_decl = nonterminal_decls.add(NonterminalDeclaration::new(
        true,
        SynString::synthetic("Expr"),
        expr_body,
        None,
    ));

    // Term : NUM | "(" this=Expr ")";
    let term_body = builder.or(vec![
        builder.name_ref("NUM"),
        builder.and(vec![
            builder.literal("("),
            builder.this(builder.name_ref("Expr")),
            builder.literal(")"),
        ]),
    ]);
    let term_decl = nonterminal_decls.add(NonterminalDeclaration::new(
        false,
        SynString::synthetic("Term"),
        term_body,
        None,
    ));

    let grammar = Grammar::new(vec![
        Declaration::Type(value_type),
        Declaration::Terminal(num),
        Declaration::Nonterminal(expr_decl),
        Declaration::Nonterminal(term_decl),
    ]);
    let grammar_ptr = heap.add_object(grammar);
    (Root::new(heap, grammar_ptr), builder)
}

/// Name-resolution-style pass: installs the symbol target of every
/// `NameRef` in the tree.
fn resolve_names(grammar: &Grammar) {
    for nt in grammar.nonterminals() {
        let mut work = vec![nt.expression];
        while let Some(expr) = work.pop() {
            work.extend(expr.sub_expressions());
            if let SyntaxExprKind::NameRef(name_ref) = expr.kind() {
                let target = grammar
                    .terminals()
                    .iter()
                    .find(|t| t.name.text == name_ref.name.text)
                    .map(|t| SymbolRef::Terminal(*t))
                    .or_else(|| {
                        grammar
                            .nonterminals()
                            .iter()
                            .find(|n| n.name.text == name_ref.name.text)
                            .map(|n| SymbolRef::Nonterminal(*n))
                    });
                name_ref.set_sym(target.expect("undefined name"));
            }
        }
    }
}

#[test]
fn grammar_indexes_are_stable() {
    let (root, _) = build_grammar();
    assert_eq!(root.tr_count(), 1);
    assert_eq!(root.nt_count(), 2);
    assert_eq!(root.terminals()[0].tr_index(), 0);
    assert_eq!(root.nonterminals()[0].nt_index(), 0);
    assert_eq!(root.nonterminals()[1].nt_index(), 1);
    assert_eq!(root.start_nonterminal().unwrap().name.text, "Expr");
}

#[test]
fn name_resolution_installs_symbols_once() {
    let (root, _) = build_grammar();
    resolve_names(&root);

    let expr = root.nonterminals()[0];
    let or_subs = match expr.expression.kind() {
        SyntaxExprKind::Or(or) => &or.sub_exprs,
        _ => panic!("expected an OR body"),
    };

    // Second alternative: this=Term.
    let this_target = match or_subs[1].kind() {
        SyntaxExprKind::ThisElement(this) => this.expression,
        _ => panic!("expected this="),
    };
    match this_target.kind() {
        SyntaxExprKind::NameRef(name_ref) => match name_ref.sym() {
            SymbolRef::Nonterminal(nt) => assert_eq!(nt.name.text, "Term"),
            SymbolRef::Terminal(_) => panic!("Term resolved to a terminal"),
        },
        _ => panic!("expected a name reference"),
    }
}

#[test]
fn typing_pass_fills_extension_slots() {
    let (root, builder) = build_grammar();
    resolve_names(&root);

    let value = builder.types.add(Type::UserPrimitive {
        name: "Value".to_string(),
    });
    root.terminals()[0].set_value_type(value);

    let expr_decl = root.nonterminals()[0];
    let expr_class = builder.types.add(Type::NonterminalClass(expr_decl));
    expr_decl.ext().set_class_type(expr_class);
    expr_decl.ext().core().set_is_void(false);
    expr_decl.ext().core().set_general_type(GeneralType::Class);
    expr_decl.ext().core().set_concrete_type(expr_class);

    assert!(types_equal(
        expr_decl.ext().core().concrete_type(),
        expr_class
    ));
    assert_eq!(expr_class.class_name(), Some("Expr"));
    assert_eq!(
        root.terminals()[0].value_type_opt().unwrap().to_string(),
        "user:Value"
    );
}

#[test]
fn and_meaning_distinguishes_this_and_attributes() {
    let (root, _) = build_grammar();

    let expr_decl = root.nonterminals()[0];
    let or_subs = match expr_decl.expression.kind() {
        SyntaxExprKind::Or(or) => or.sub_exprs.clone(),
        _ => panic!("expected an OR body"),
    };

    // First alternative carries a this= element: its meaning is This.
    let and = match or_subs[0].kind() {
        SyntaxExprKind::And(and) => and,
        _ => panic!("expected an AND"),
    };
    let (result_elements, non_result): (Vec<_>, Vec<_>) = and
        .sub_exprs
        .iter()
        .partition(|sub| matches!(sub.kind(), SyntaxExprKind::ThisElement(_)));

    and.and_ext().set_meaning(AndMeaning {
        non_result_sub_exprs: non_result.into_iter().copied().collect(),
        kind: AndMeaningKind::This {
            result_elements: result_elements.into_iter().copied().collect(),
        },
    });

    let meaning = and.and_ext().meaning();
    assert_eq!(meaning.non_result_sub_exprs.len(), 2);
    match &meaning.kind {
        AndMeaningKind::This { result_elements } => assert_eq!(result_elements.len(), 1),
        _ => panic!("expected a This meaning"),
    }
}

#[test]
fn cyclic_traversal_terminates_with_visiting_guard() {
    let (root, _) = build_grammar();
    resolve_names(&root);

    // Expr and Term reference each other; the guard bounds the walk.
    fn count_reachable(nt: ManagedPtr<NonterminalDeclaration>) -> usize {
        if nt.ext().set_visiting(true) {
            return 0;
        }
        let mut count = 1;
        let mut work = vec![nt.expression];
        while let Some(expr) = work.pop() {
            work.extend(expr.sub_expressions());
            if let SyntaxExprKind::NameRef(name_ref) = expr.kind() {
                if let SymbolRef::Nonterminal(target) = name_ref.sym() {
                    count += count_reachable(target);
                }
            }
        }
        nt.ext().set_visiting(false);
        count
    }

    let start = root.start_nonterminal().unwrap();
    assert_eq!(count_reachable(start), 2);
}

#[test]
fn printed_grammar_matches_notation() {
    let (root, _) = build_grammar();
    let mut out = String::new();
    print::write_grammar(&root, &mut out).unwrap();

    let expected = "\
type Value;
token NUM {Value};
@Expr : left=Term \"+\" this=Expr | this=Term;
Term : NUM | \"(\" this=Expr \")\";
";
    assert_eq!(out, expected);
}

#[test]
fn literal_trie_from_grammar_literals() {
    let (root, _) = build_grammar();

    // Collect the literal strings the way the scanner generator would:
    // string literals from the tree, named terminals from declarations.
    let mut texts = Vec::new();
    for nt in root.nonterminals() {
        let mut work = vec![nt.expression];
        while let Some(expr) = work.pop() {
            work.extend(expr.sub_expressions());
            if let SyntaxExprKind::StringLiteral(literal) = expr.kind() {
                texts.push(literal.value.text.clone());
            }
        }
    }
    texts.sort();
    texts.dedup();

    let mut descriptors: Vec<TerminalDescriptor> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| TerminalDescriptor::new(text.clone(), TerminalKind::Literal, i))
        .collect();
    descriptors.push(TerminalDescriptor::new(
        "NUM",
        TerminalKind::Name,
        descriptors.len(),
    ));

    let refs: Vec<&TerminalDescriptor> = descriptors.iter().collect();
    let trie = build_literal_trie(&refs).unwrap();

    let mut found: Vec<char> = trie.edges().iter().map(|e| e.ch()).collect();
    found.sort();
    assert_eq!(found, vec!['(', ')', '+']);
    for ch in ['(', ')', '+'] {
        assert!(trie.child(ch).unwrap().token().is_some());
    }
}
