//! Grammar container.

use gramc_util::ManagedPtr;

use crate::ast::{Declaration, NonterminalDeclaration, TerminalDeclaration};

/// An EBNF grammar: the declaration list in source order plus derived
/// enumerations of its symbols. Building the container assigns every
/// terminal its `tr_index` and every nonterminal its `nt_index`.
pub struct Grammar {
    declarations: Vec<Declaration>,
    terminals: Vec<ManagedPtr<TerminalDeclaration>>,
    nonterminals: Vec<ManagedPtr<NonterminalDeclaration>>,
}

impl Grammar {
    pub fn new(declarations: Vec<Declaration>) -> Grammar {
        let mut terminals = Vec::new();
        let mut nonterminals = Vec::new();

        for declaration in &declarations {
            match declaration {
                Declaration::Terminal(terminal) => {
                    terminal.set_tr_index(terminals.len());
                    terminals.push(*terminal);
                }
                Declaration::Nonterminal(nonterminal) => {
                    nonterminal.set_nt_index(nonterminals.len());
                    nonterminals.push(*nonterminal);
                }
                Declaration::Type(_) | Declaration::CustomTerminalType(_) => {}
            }
        }

        Grammar {
            declarations,
            terminals,
            nonterminals,
        }
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn terminals(&self) -> &[ManagedPtr<TerminalDeclaration>] {
        &self.terminals
    }

    pub fn nonterminals(&self) -> &[ManagedPtr<NonterminalDeclaration>] {
        &self.nonterminals
    }

    pub fn tr_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn nt_count(&self) -> usize {
        self.nonterminals.len()
    }

    /// The designated start nonterminal, when the grammar marks one.
    pub fn start_nonterminal(&self) -> Option<ManagedPtr<NonterminalDeclaration>> {
        self.nonterminals.iter().copied().find(|nt| nt.start)
    }
}
