//! Concrete parse tree.

use std::fmt;

use crate::ast::Span;
use crate::grammar::Rule;
use crate::lexer::token::Token;

/// A node of the concrete parse tree: one grammar production and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    pub rule: Rule,
    pub span: Span,
    pub children: Vec<ParseNode>,
}

/// A child of a parse-tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNode {
    Tree(ParseTree),
    Token(Token),
}

impl ParseNode {
    pub fn span(&self) -> &Span {
        match self {
            ParseNode::Tree(tree) => &tree.span,
            ParseNode::Token(token) => &token.span,
        }
    }
}

impl ParseTree {
    /// Creates a node; the span covers all children.
    pub fn new(rule: Rule, children: Vec<ParseNode>) -> Self {
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => first.span().start..last.span().end,
            _ => 0..0,
        };
        Self {
            rule,
            span,
            children,
        }
    }

    /// Child subtrees, skipping token leaves.
    pub fn subtrees(&self) -> impl Iterator<Item = &ParseTree> {
        self.children.iter().filter_map(|child| match child {
            ParseNode::Tree(tree) => Some(tree),
            ParseNode::Token(_) => None,
        })
    }

    /// Token leaves, skipping subtrees.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.children.iter().filter_map(|child| match child {
            ParseNode::Token(token) => Some(token),
            ParseNode::Tree(_) => None,
        })
    }

    /// The first direct subtree for `rule`.
    pub fn child(&self, rule: Rule) -> Option<&ParseTree> {
        self.subtrees().find(|tree| tree.rule == rule)
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        writeln!(f, "{:indent$}{} @ {:?}", "", self.rule, self.span, indent = depth * 2)?;
        for child in &self.children {
            match child {
                ParseNode::Tree(tree) => tree.write_indented(f, depth + 1)?,
                ParseNode::Token(token) => {
                    writeln!(f, "{:indent$}{:?}", "", token.text, indent = (depth + 1) * 2)?
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
