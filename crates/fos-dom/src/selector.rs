//! Selector Parsing and Matching
//!
//! Supports selector lists of compound selectors (tag, `*`, `#id`, `.class`,
//! `[attr]`, `[attr=value]`) joined by descendant and child combinators.
//! Matching runs right to left against the arena tree.

use crate::{DomError, DomResult, DomTree, ElementData, NodeId};

/// A parsed selector list (`a, b, c`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub alternatives: Vec<ComplexSelector>,
}

/// Compound selectors joined by combinators, stored left to right
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    /// First compound selector
    pub head: CompoundSelector,
    /// Following (combinator, compound) pairs
    pub tail: Vec<(Combinator, CompoundSelector)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace
    Descendant,
    /// `>`
    Child,
}

/// Simple selectors that must all match one element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// `None` for `*` or when no type selector was given
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrSelector {
    pub name: String,
    pub value: Option<String>,
}

impl Selector {
    /// Parse a selector list
    pub fn parse(input: &str) -> DomResult<Self> {
        let invalid = || DomError::InvalidSelector(input.to_string());

        let tokens = tokenize(input).ok_or_else(invalid)?;
        let alternatives = tokens
            .split(|t| matches!(t, Token::Comma))
            .map(|group| ComplexSelector::from_tokens(group).ok_or_else(invalid))
            .collect::<DomResult<Vec<_>>>()?;

        Ok(Self { alternatives })
    }

    /// Check whether an element matches any alternative
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(tree, element))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Child,
    Comma,
}

/// Split on top-level `,`, `>` and whitespace. Text inside `[...]`,
/// including quoted values, always stays within one word.
fn tokenize(input: &str) -> Option<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for (i, c) in input.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if in_brackets {
            match c {
                '"' | '\'' => quote = Some(c),
                ']' => in_brackets = false,
                _ => {}
            }
            continue;
        }

        match c {
            ',' | '>' => {
                if let Some(start) = word_start.take() {
                    tokens.push(Token::Word(&input[start..i]));
                }
                tokens.push(if c == ',' { Token::Comma } else { Token::Child });
            }
            c if c.is_whitespace() => {
                if let Some(start) = word_start.take() {
                    tokens.push(Token::Word(&input[start..i]));
                }
            }
            _ => {
                if c == '[' {
                    in_brackets = true;
                }
                word_start.get_or_insert(i);
            }
        }
    }

    if in_brackets || quote.is_some() {
        return None;
    }
    if let Some(start) = word_start {
        tokens.push(Token::Word(&input[start..]));
    }
    Some(tokens)
}

impl ComplexSelector {
    fn from_tokens(tokens: &[Token<'_>]) -> Option<Self> {
        let mut tokens = tokens.iter();

        let Some(Token::Word(first)) = tokens.next() else {
            return None;
        };
        let head = CompoundSelector::parse(first)?;
        let mut tail = Vec::new();
        let mut pending = Combinator::Descendant;
        let mut saw_child = false;

        for token in tokens {
            match token {
                Token::Child if saw_child => return None,
                Token::Child => {
                    pending = Combinator::Child;
                    saw_child = true;
                }
                Token::Word(word) => {
                    tail.push((pending, CompoundSelector::parse(word)?));
                    pending = Combinator::Descendant;
                    saw_child = false;
                }
                Token::Comma => return None,
            }
        }

        // Dangling combinator
        if saw_child {
            return None;
        }

        Some(Self { head, tail })
    }

    /// Right-to-left match with backtracking over descendant combinators
    pub fn matches(&self, tree: &DomTree, element: NodeId) -> bool {
        let mut compounds: Vec<&CompoundSelector> = Vec::with_capacity(self.tail.len() + 1);
        let mut combinators: Vec<Combinator> = Vec::with_capacity(self.tail.len());
        compounds.push(&self.head);
        for (comb, compound) in &self.tail {
            combinators.push(*comb);
            compounds.push(compound);
        }
        match_from(tree, element, &compounds, &combinators)
    }
}

fn match_from(
    tree: &DomTree,
    element: NodeId,
    compounds: &[&CompoundSelector],
    combinators: &[Combinator],
) -> bool {
    let Some((last, rest)) = compounds.split_last() else {
        return true;
    };
    let Some(data) = tree.get(element).and_then(|n| n.as_element()) else {
        return false;
    };
    if !last.matches(data) {
        return false;
    }
    let Some((comb, rest_combs)) = combinators.split_last() else {
        return true;
    };

    let parent = tree.get(element).map_or(NodeId::NONE, |n| n.parent);
    match comb {
        Combinator::Child => match_from(tree, parent, rest, rest_combs),
        Combinator::Descendant => tree
            .ancestors(element)
            .any(|ancestor| match_from(tree, ancestor, rest, rest_combs)),
    }
}

impl CompoundSelector {
    fn parse(word: &str) -> Option<Self> {
        let mut compound = CompoundSelector::default();
        let mut rest = word;

        // Leading type selector or universal
        let tag_len = rest
            .find(|c| c == '#' || c == '.' || c == '[')
            .unwrap_or(rest.len());
        let (tag, after) = rest.split_at(tag_len);
        if !tag.is_empty() && tag != "*" {
            if !is_ident(tag) {
                return None;
            }
            compound.tag = Some(tag.to_ascii_lowercase());
        }
        rest = after;

        while let Some(c) = rest.chars().next() {
            match c {
                '#' | '.' => {
                    let body = &rest[1..];
                    let end = body
                        .find(|c| c == '#' || c == '.' || c == '[')
                        .unwrap_or(body.len());
                    let name = &body[..end];
                    if !is_ident(name) {
                        return None;
                    }
                    if c == '#' {
                        compound.id = Some(name.to_string());
                    } else {
                        compound.classes.push(name.to_string());
                    }
                    rest = &body[end..];
                }
                '[' => {
                    let close = closing_bracket(rest)?;
                    compound.attrs.push(AttrSelector::parse(&rest[1..close])?);
                    rest = &rest[close + 1..];
                }
                _ => return None,
            }
        }

        Some(compound)
    }

    /// Check this compound against element data
    pub fn matches(&self, elem: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if &elem.tag != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if elem.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| elem.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| match (&a.value, elem.get_attr(&a.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
        })
    }
}

impl AttrSelector {
    fn parse(body: &str) -> Option<Self> {
        match body.split_once('=') {
            Some((name, value)) => {
                let name = name.trim();
                if !is_ident(name) {
                    return None;
                }
                let value = value.trim();
                let value = value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                    .unwrap_or(value);
                Some(Self {
                    name: name.to_ascii_lowercase(),
                    value: Some(value.to_string()),
                })
            }
            None => {
                let name = body.trim();
                is_ident(name).then(|| Self {
                    name: name.to_ascii_lowercase(),
                    value: None,
                })
            }
        }
    }
}

/// Index of the `]` closing the attribute selector at the start of `s`,
/// skipping quoted text
fn closing_bracket(s: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ']' => return Some(i),
            None => {}
        }
    }
    None
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with(|c: char| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
