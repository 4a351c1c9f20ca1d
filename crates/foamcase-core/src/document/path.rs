//! Structured queries over a case document.
//!
//! A `CasePath` is a list of steps evaluated from the document root. Each step
//! has an axis (direct child or any descendant), a name test (a tag or `*`) and
//! zero or more predicates. Paths are usually built in code:
//!
//! ```
//! use foamcase_core::document::CasePath;
//!
//! let p = CasePath::root()
//!     .child("regions")
//!     .child("region")
//!     .where_child("name", "fluid")
//!     .child("material");
//! assert_eq!(p.to_string(), r#"regions/region[name="fluid"]/material"#);
//! ```
//!
//! The textual form can also be parsed back, which the CLI relies on:
//! `.//boundaryCondition[@bcid="3"]/physicalType`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::document::element::Element;
use crate::errors::{CaseError, CaseResult};

/// Position of a node as child indices from the root.
///
/// Lexicographic order of indices is document order.
pub type NodeIndex = Vec<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTest {
    Tag(String),
    Any,
}

impl NameTest {
    fn matches(&self, tag: &str) -> bool {
        match self {
            Self::Tag(t) => t == tag,
            Self::Any => true,
        }
    }
}

/// Filter applied to the candidates of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Some node reached through the relative child path has this text.
    Child { path: Vec<String>, value: String },
    /// The candidate carries the attribute with this value.
    Attribute { name: String, value: String },
    /// The candidate's own text equals the value.
    Text(String),
}

impl Predicate {
    fn matches(&self, node: &Element) -> bool {
        match self {
            Self::Child { path, value } => child_path_has_text(node, path, value),
            Self::Attribute { name, value } => node.attribute(name) == Some(value.as_str()),
            Self::Text(value) => node.text() == value,
        }
    }
}

fn child_path_has_text(node: &Element, path: &[String], value: &str) -> bool {
    match path.split_first() {
        None => node.text() == value,
        Some((head, rest)) => node
            .children()
            .iter()
            .filter(|c| c.tag() == head)
            .any(|c| child_path_has_text(c, rest, value)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    pub name: NameTest,
    pub predicates: Vec<Predicate>,
}

/// A query addressing zero or more nodes of a case document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CasePath {
    steps: Vec<Step>,
}

impl CasePath {
    /// The document root element itself.
    pub fn root() -> Self {
        Self { steps: Vec::new() }
    }

    /// Nodes with `tag` anywhere below the root.
    pub fn anywhere(tag: impl Into<String>) -> Self {
        Self::root().descendant(tag)
    }

    pub fn child(self, tag: impl Into<String>) -> Self {
        self.step(Axis::Child, NameTest::Tag(tag.into()))
    }

    /// Every direct child, whatever its tag.
    pub fn any_child(self) -> Self {
        self.step(Axis::Child, NameTest::Any)
    }

    pub fn descendant(self, tag: impl Into<String>) -> Self {
        self.step(Axis::Descendant, NameTest::Tag(tag.into()))
    }

    /// Every node below the current step, whatever its tag.
    pub fn any_descendant(self) -> Self {
        self.step(Axis::Descendant, NameTest::Any)
    }

    /// Follow a `/`-separated chain of child tags.
    pub fn children(self, chain: &str) -> Self {
        chain
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(self, |p, tag| p.child(tag))
    }

    fn step(mut self, axis: Axis, name: NameTest) -> Self {
        self.steps.push(Step {
            axis,
            name,
            predicates: Vec::new(),
        });
        self
    }

    fn with_predicate(mut self, predicate: Predicate) -> Self {
        if let Some(last) = self.steps.last_mut() {
            last.predicates.push(predicate);
        }
        self
    }

    /// Keep candidates whose child (or `/`-separated child chain) has `value`.
    ///
    /// Predicates attach to the last step and have no effect on the root path.
    pub fn where_child(self, child: &str, value: impl ToString) -> Self {
        let path = child
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self.with_predicate(Predicate::Child {
            path,
            value: value.to_string(),
        })
    }

    pub fn where_attr(self, name: impl Into<String>, value: impl ToString) -> Self {
        self.with_predicate(Predicate::Attribute {
            name: name.into(),
            value: value.to_string(),
        })
    }

    pub fn where_text(self, value: impl ToString) -> Self {
        self.with_predicate(Predicate::Text(value.to_string()))
    }

    /// Append the steps of `other` to this path.
    pub fn join(&self, other: &CasePath) -> CasePath {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().cloned());
        CasePath { steps }
    }

    /// The path without its last step; `None` for the root.
    pub fn parent(&self) -> Option<CasePath> {
        if self.steps.is_empty() {
            return None;
        }
        Some(CasePath {
            steps: self.steps[..self.steps.len() - 1].to_vec(),
        })
    }

    /// Tag of the last step, if it names one.
    pub fn last_tag(&self) -> Option<&str> {
        match self.steps.last().map(|s| &s.name) {
            Some(NameTest::Tag(t)) => Some(t),
            _ => None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Resolve to node positions, in document order, without duplicates.
    pub fn evaluate(&self, root: &Element) -> Vec<NodeIndex> {
        let mut current: BTreeSet<NodeIndex> = BTreeSet::new();
        current.insert(Vec::new());

        for step in &self.steps {
            let mut next = BTreeSet::new();
            for idx in &current {
                let Some(node) = node_at(root, idx) else { continue };
                match step.axis {
                    Axis::Child => {
                        for (i, c) in node.children().iter().enumerate() {
                            if step_matches(step, c) {
                                let mut ci = idx.clone();
                                ci.push(i);
                                next.insert(ci);
                            }
                        }
                    }
                    Axis::Descendant => collect_descendants(node, idx, step, &mut next),
                }
            }
            current = next;
            if current.is_empty() {
                break;
            }
        }

        current.into_iter().collect()
    }

    /// Parse the textual form.
    pub fn parse(s: &str) -> CaseResult<Self> {
        parse_path(s)
    }
}

fn step_matches(step: &Step, node: &Element) -> bool {
    step.name.matches(node.tag()) && step.predicates.iter().all(|p| p.matches(node))
}

fn collect_descendants(node: &Element, idx: &NodeIndex, step: &Step, out: &mut BTreeSet<NodeIndex>) {
    for (i, c) in node.children().iter().enumerate() {
        let mut ci = idx.clone();
        ci.push(i);
        if step_matches(step, c) {
            out.insert(ci.clone());
        }
        collect_descendants(c, &ci, step, out);
    }
}

/// Borrow the node at `idx`.
pub fn node_at<'a>(root: &'a Element, idx: &[usize]) -> Option<&'a Element> {
    idx.iter().try_fold(root, |node, &i| node.children().get(i))
}

/// Mutably borrow the node at `idx`.
pub fn node_at_mut<'a>(root: &'a mut Element, idx: &[usize]) -> Option<&'a mut Element> {
    idx.iter()
        .try_fold(root, |node, &i| node.children_mut().get_mut(i))
}

impl fmt::Display for CasePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str(".");
        }
        for (i, step) in self.steps.iter().enumerate() {
            match (i, step.axis) {
                (0, Axis::Child) => {}
                (0, Axis::Descendant) => f.write_str(".//")?,
                (_, Axis::Child) => f.write_str("/")?,
                (_, Axis::Descendant) => f.write_str("//")?,
            }
            match &step.name {
                NameTest::Tag(t) => f.write_str(t)?,
                NameTest::Any => f.write_str("*")?,
            }
            for p in &step.predicates {
                match p {
                    Predicate::Child { path, value } => write!(f, "[{}={}]", path.join("/"), quote(value))?,
                    Predicate::Attribute { name, value } => write!(f, "[@{name}={}]", quote(value))?,
                    Predicate::Text(value) => write!(f, "[.={}]", quote(value))?,
                }
            }
        }
        Ok(())
    }
}

/// Quote a predicate value. A value holding both quote characters is
/// double-quoted with each `"` doubled.
fn quote(value: &str) -> String {
    match (value.contains('"'), value.contains('\'')) {
        (false, _) => format!("\"{value}\""),
        (true, false) => format!("'{value}'"),
        (true, true) => format!("\"{}\"", value.replace('"', "\"\"")),
    }
}

impl FromStr for CasePath {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

fn parse_path(input: &str) -> CaseResult<CasePath> {
    let s = input.trim();
    let (mut rest, mut axis) = if let Some(r) = s.strip_prefix(".//") {
        (r, Axis::Descendant)
    } else if let Some(r) = s.strip_prefix("//") {
        (r, Axis::Descendant)
    } else if let Some(r) = s.strip_prefix("./") {
        (r, Axis::Child)
    } else if let Some(r) = s.strip_prefix('/') {
        (r, Axis::Child)
    } else {
        (s, Axis::Child)
    };

    let mut path = CasePath::root();
    if rest.is_empty() || rest == "." {
        return Ok(path);
    }

    loop {
        let (segment, tail) = split_segment(rest, input)?;
        if segment.is_empty() {
            return Err(CaseError::invalid_argument(format!("empty step in path: {input}")));
        }
        path.steps.push(parse_step(segment, axis, input)?);

        match tail {
            None => break,
            Some(t) => {
                if let Some(r) = t.strip_prefix('/') {
                    axis = Axis::Descendant;
                    rest = r;
                } else {
                    axis = Axis::Child;
                    rest = t;
                }
            }
        }
    }

    Ok(path)
}

/// Split off the first step, honoring brackets and quotes.
fn split_segment<'a>(s: &'a str, whole: &str) -> CaseResult<(&'a str, Option<&'a str>)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, ch) in s.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| CaseError::invalid_argument(format!("unbalanced ']' in path: {whole}")))?;
            }
            (None, '/') if depth == 0 => return Ok((&s[..i], Some(&s[i + 1..]))),
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return Err(CaseError::invalid_argument(format!("unterminated predicate in path: {whole}")));
    }
    Ok((s, None))
}

fn parse_step(segment: &str, axis: Axis, whole: &str) -> CaseResult<Step> {
    let name_end = segment.find('[').unwrap_or(segment.len());
    let name = match &segment[..name_end] {
        "*" => NameTest::Any,
        "" => return Err(CaseError::invalid_argument(format!("missing tag in path: {whole}"))),
        t if t.chars().all(is_tag_char) => NameTest::Tag(t.to_string()),
        t => return Err(CaseError::invalid_argument(format!("invalid tag '{t}' in path: {whole}"))),
    };

    let mut predicates = Vec::new();
    let mut rest = &segment[name_end..];
    while !rest.is_empty() {
        let body_end = closing_bracket(rest)
            .ok_or_else(|| CaseError::invalid_argument(format!("unterminated predicate in path: {whole}")))?;
        predicates.push(parse_predicate(&rest[1..body_end], whole)?);
        rest = &rest[body_end + 1..];
    }

    Ok(Step { axis, name, predicates })
}

fn closing_bracket(s: &str) -> Option<usize> {
    if !s.starts_with('[') {
        return None;
    }
    let mut quote: Option<char> = None;
    for (i, ch) in s.char_indices().skip(1) {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(ch),
            (None, ']') => return Some(i),
            _ => {}
        }
    }
    None
}

fn parse_predicate(body: &str, whole: &str) -> CaseResult<Predicate> {
    let (lhs, rhs) = body
        .split_once('=')
        .ok_or_else(|| CaseError::invalid_argument(format!("predicate without '=' in path: {whole}")))?;
    let lhs = lhs.trim();
    let value = unquote(rhs.trim());

    if lhs == "." {
        return Ok(Predicate::Text(value));
    }
    if let Some(name) = lhs.strip_prefix('@') {
        return Ok(Predicate::Attribute {
            name: name.to_string(),
            value,
        });
    }
    let path: Vec<String> = lhs.split('/').map(str::to_string).collect();
    if path.iter().any(|t| t.is_empty() || !t.chars().all(is_tag_char)) {
        return Err(CaseError::invalid_argument(format!("invalid predicate '{body}' in path: {whole}")));
    }
    Ok(Predicate::Child { path, value })
}

fn unquote(s: &str) -> String {
    for q in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            let doubled = format!("{q}{q}");
            return s[1..s.len() - 1].replace(&doubled, &q.to_string());
        }
    }
    s.to_string()
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Element {
        Element::new("configuration").with_child(
            Element::new("regions")
                .with_child(
                    Element::new("region")
                        .with_child(Element::leaf("name", "fluid"))
                        .with_child(Element::new("boundaryConditions").with_child(
                            Element::new("boundaryCondition")
                                .with_attribute("bcid", "1")
                                .with_child(Element::leaf("name", "inlet")),
                        )),
                )
                .with_child(
                    Element::new("region")
                        .with_child(Element::leaf("name", "solid"))
                        .with_child(Element::new("boundaryConditions").with_child(
                            Element::new("boundaryCondition")
                                .with_attribute("bcid", "2")
                                .with_child(Element::leaf("name", "wall")),
                        )),
                ),
        )
    }

    #[test]
    fn builder_and_display() {
        let p = CasePath::anywhere("boundaryCondition").where_attr("bcid", 2).child("name");
        assert_eq!(p.to_string(), r#".//boundaryCondition[@bcid="2"]/name"#);
        assert_eq!(CasePath::root().to_string(), ".");
    }

    #[test]
    fn child_filter_selects_one_region() {
        let root = sample();
        let p = CasePath::root().children("regions/region").where_child("name", "solid");
        assert_eq!(p.evaluate(&root), vec![vec![0, 1]]);
    }

    #[test]
    fn descendant_axis_in_document_order() {
        let root = sample();
        let hits = CasePath::anywhere("boundaryCondition").evaluate(&root);
        assert_eq!(hits, vec![vec![0, 0, 1, 0], vec![0, 1, 1, 0]]);
    }

    #[test]
    fn nested_child_predicate() {
        let root = sample();
        let p = CasePath::root()
            .children("regions/region")
            .where_child("boundaryConditions/boundaryCondition/name", "wall");
        assert_eq!(p.evaluate(&root).len(), 1);
    }

    #[test]
    fn parse_round_trip() {
        for s in [
            r#"regions/region[name="fluid"]/material"#,
            r#".//boundaryCondition[@bcid="3"]/physicalType"#,
            r#"monitors/*/*/field/field[.="modifiedPressure"]"#,
            r#"regions//boundaryCondition"#,
        ] {
            assert_eq!(CasePath::parse(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn parse_accepts_single_quotes_and_slash_inside_value() {
        let p = CasePath::parse("a/b[name='x/y']").unwrap();
        assert_eq!(p.steps().len(), 2);
        assert_eq!(p.to_string(), r#"a/b[name="x/y"]"#);
    }

    #[test]
    fn values_with_both_quotes_survive_display() {
        let p = CasePath::root().child("monitors").where_child("name", r#"it's "p""#);
        assert_eq!(p.to_string(), r#"monitors[name="it's ""p"""]"#);
        assert_eq!(CasePath::parse(&p.to_string()).unwrap(), p);

        let q = CasePath::root().child("a").where_attr("id", r#"say "hi""#);
        assert_eq!(q.to_string(), r#"a[@id='say "hi"']"#);
        assert_eq!(CasePath::parse(&q.to_string()).unwrap(), q);
    }

    #[test]
    fn parse_rejects_broken_input() {
        assert!(CasePath::parse("a/b[name=x").is_err());
        assert!(CasePath::parse("a//").is_err());
        assert!(CasePath::parse("a/b c").is_err());
        assert!(CasePath::parse("a/b[name]").is_err());
    }

    #[test]
    fn parent_drops_last_step() {
        let p = CasePath::root().child("a").child("b");
        assert_eq!(p.parent().unwrap().to_string(), "a");
        assert_eq!(p.last_tag(), Some("b"));
        assert!(CasePath::root().parent().is_none());
    }
}
