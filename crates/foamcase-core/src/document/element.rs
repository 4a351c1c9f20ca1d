//! In-memory element tree.
//!
//! Elements keep attributes and children in insertion order. Leaf text is
//! optional; `text()` reports a missing value as the empty string.

/// One node of a case document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Leaf element carrying a text value.
    pub fn leaf(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Element with `x`, `y`, `z` leaf children.
    pub fn vector(tag: impl Into<String>, x: impl Into<String>, y: impl Into<String>, z: impl Into<String>) -> Self {
        Self::new(tag)
            .with_child(Self::leaf("x", x))
            .with_child(Self::leaf("y", y))
            .with_child(Self::leaf("z", z))
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    pub fn clear_text(&mut self) {
        self.text = None;
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace an existing attribute in place, or append a new one.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    pub fn child_mut(&mut self, tag: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|c| c.tag == tag)
    }

    pub fn has_child(&self, tag: &str) -> bool {
        self.child(tag).is_some()
    }

    pub fn child_position(&self, tag: &str) -> Option<usize> {
        self.children.iter().position(|c| c.tag == tag)
    }

    /// Text of a direct child, if that child exists.
    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.child(tag).map(Element::text)
    }

    /// Follow a chain of child tags.
    pub fn descend(&self, tags: &[&str]) -> Option<&Element> {
        tags.iter().try_fold(self, |node, tag| node.child(tag))
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Insert at `index`, appending when the index is past the end.
    pub fn insert_child(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, child);
    }

    /// Append `child` unless a sibling with the same tag already exists.
    pub fn ensure_child(&mut self, child: Element) -> bool {
        if self.has_child(&child.tag) {
            return false;
        }
        self.children.push(child);
        true
    }

    /// Insert `child` at `index` unless a sibling with the same tag exists.
    pub fn ensure_child_at(&mut self, index: usize, child: Element) -> bool {
        if self.has_child(&child.tag) {
            return false;
        }
        self.insert_child(index, child);
        true
    }

    /// Remove the first child with the given tag.
    pub fn remove_child(&mut self, tag: &str) -> Option<Element> {
        let pos = self.child_position(tag)?;
        Some(self.children.remove(pos))
    }

    /// Number of nodes in this subtree, self included.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Element::subtree_len).sum::<usize>()
    }

    /// Depth of the deepest path below this node, self counted as 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Element::depth).max().unwrap_or(0)
    }
}
