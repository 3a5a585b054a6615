//! Literal-token scanner trie.
//!
//! The generated scanner recognizes literal tokens (`"if"`, `"+="`, ...)
//! with a prefix tree: one node per common prefix, one edge per next
//! character, and a terminal descriptor on every node where some token's
//! string ends. Named terminals (identifiers, numbers) are matched by
//! custom code and take no part in the tree.
//!
//! Construction sorts the literals and recursively partitions contiguous
//! ranges by the character at the current offset, so the resulting tree is
//! deterministic and independent of declaration order.

use crate::error::EbnfError;

/// What a terminal matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    /// A fixed literal string.
    Literal,
    /// A named token class matched by custom code.
    Name,
}

/// Scanner-level description of one terminal symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalDescriptor {
    pub text: String,
    pub kind: TerminalKind,
    /// The terminal's `tr_index` in the grammar.
    pub index: usize,
}

impl TerminalDescriptor {
    pub fn new(text: impl Into<String>, kind: TerminalKind, index: usize) -> TerminalDescriptor {
        TerminalDescriptor {
            text: text.into(),
            kind,
            index,
        }
    }

    pub fn is_name(&self) -> bool {
        self.kind == TerminalKind::Name
    }
}

/// A state of the literal-token scanner.
pub struct TrieNode<'a> {
    token: Option<&'a TerminalDescriptor>,
    edges: Vec<TrieEdge<'a>>,
}

/// A transition: the character consumed and the destination state. The
/// node exclusively owns its children.
pub struct TrieEdge<'a> {
    ch: char,
    node: TrieNode<'a>,
}

impl<'a> TrieEdge<'a> {
    pub fn ch(&self) -> char {
        self.ch
    }

    pub fn node(&self) -> &TrieNode<'a> {
        &self.node
    }
}

impl<'a> TrieNode<'a> {
    fn new() -> TrieNode<'a> {
        TrieNode {
            token: None,
            edges: Vec::new(),
        }
    }

    /// The token accepted in this state, if any.
    pub fn token(&self) -> Option<&'a TerminalDescriptor> {
        self.token
    }

    /// Outgoing edges, ordered by character.
    pub fn edges(&self) -> &[TrieEdge<'a>] {
        &self.edges
    }

    /// The child reached by consuming `ch`, if the transition exists.
    pub fn child(&self, ch: char) -> Option<&TrieNode<'a>> {
        self.edges
            .iter()
            .find(|edge| edge.ch == ch)
            .map(|edge| &edge.node)
    }

    fn add_edge(&mut self, ch: char) -> &mut TrieNode<'a> {
        self.edges.push(TrieEdge {
            ch,
            node: TrieNode::new(),
        });
        &mut self.edges.last_mut().unwrap().node
    }

    /// Writes an indented dump of the sub-tree, one edge per line.
    pub fn write_tree(&self, out: &mut String, indent: usize) {
        for edge in &self.edges {
            for _ in 0..indent {
                out.push('\t');
            }
            out.push('\'');
            out.push(edge.ch);
            out.push('\'');
            if let Some(token) = edge.node.token {
                out.push_str(" : \"");
                out.push_str(&token.text);
                out.push('"');
            }
            out.push('\n');
            edge.node.write_tree(out, indent + 1);
        }
    }
}

/// Builds the scanner trie for the literal terminals of `tokens`. Named
/// terminals are skipped. Fails when two literals carry the same string.
pub fn build_literal_trie<'a>(
    tokens: &[&'a TerminalDescriptor],
) -> Result<TrieNode<'a>, EbnfError> {
    // Sort the literals, so tokens starting with the same characters form
    // contiguous ranges.
    let mut literals: Vec<(&TerminalDescriptor, Vec<char>)> = tokens
        .iter()
        .copied()
        .filter(|token| !token.is_name())
        .map(|token| (token, token.text.chars().collect()))
        .collect();
    literals.sort_by(|a, b| a.0.text.cmp(&b.0.text));

    let mut root = TrieNode::new();
    build_sub_nodes(&mut root, &literals, 0, literals.len(), 0)?;
    Ok(root)
}

fn build_sub_nodes<'a>(
    node: &mut TrieNode<'a>,
    tokens: &[(&'a TerminalDescriptor, Vec<char>)],
    start: usize,
    end: usize,
    str_ofs: usize,
) -> Result<(), EbnfError> {
    let mut pos = start;

    // The first token of a sorted range is the shortest; if its string ends
    // here, this node accepts it.
    if pos < end && tokens[pos].1.len() == str_ofs {
        node.token = Some(tokens[pos].0);
        pos += 1;
    }

    while pos < end {
        let chars = &tokens[pos].1;
        if chars.len() == str_ofs {
            // Ends here too: same string as the token already accepted.
            return Err(EbnfError::DuplicateLiteralToken {
                text: tokens[pos].0.text.clone(),
            });
        }

        let group_start = pos;
        let ch = chars[str_ofs];
        pos += 1;
        while pos < end {
            let other = &tokens[pos].1;
            if str_ofs >= other.len() || other[str_ofs] != ch {
                break;
            }
            pos += 1;
        }

        let child = node.add_edge(ch);
        build_sub_nodes(child, tokens, group_start, pos, str_ofs + 1)?;
    }

    Ok(())
}
