//! `constant/<region>/polyMesh` files.
//!
//! The mesh itself is produced by external tools; only the patch list in
//! `polyMesh/boundary` is rewritten so that patch types and coupling match
//! the configured boundary conditions. Entries are kept as raw text, so keys
//! this crate does not know about survive a rewrite unchanged.

use foamcase_core::{CaseError, CaseResult};

use crate::dictionary::{FoamDict, FoamValue};

pub mod boundary;

pub use boundary::{boundary_file, load_boundary_file};

/// Parse the patch list of a `polyMesh/boundary` file.
pub fn parse_boundary(text: &str) -> CaseResult<FoamDict> {
    let clean = strip_comments(text);
    let mut p = Parser { s: &clean, pos: 0 };

    if p.peek_token() == Some("FoamFile") {
        p.token()?;
        p.dict()?;
    }

    let raw = p.token()?;
    let count = raw
        .parse::<usize>()
        .map_err(|_| p.error(&format!("expected patch count, found '{raw}'")))?;
    p.expect('(')?;

    let mut patches = FoamDict::new();
    loop {
        p.skip_ws();
        if p.eat(')') {
            break;
        }
        let name = p.token()?;
        let patch = p.dict()?;
        patches.insert(name, patch);
    }

    if patches.len() != count {
        return Err(CaseError::resource(format!(
            "polyMesh boundary: {count} patches announced, {} found",
            patches.len()
        )));
    }
    Ok(patches)
}

/// Drop `//` and `/* */` comments.
fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("//") {
            rest = after.find('\n').map_or("", |i| &after[i..]);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.find("*/").map_or("", |i| &after[i + 2..]);
            out.push(' ');
        } else {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                out.push(c);
            }
            rest = chars.as_str();
        }
    }
    out
}

struct Parser<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, msg: &str) -> CaseError {
        CaseError::resource(format!("polyMesh boundary: {msg} at offset {}", self.pos))
    }

    fn rest(&self) -> &'a str {
        &self.s[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> CaseResult<()> {
        self.skip_ws();
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{c}'")))
        }
    }

    fn peek_token(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let end = rest
            .find(|c: char| c.is_whitespace() || "{}();".contains(c))
            .unwrap_or(rest.len());
        (end > 0).then(|| &rest[..end])
    }

    fn token(&mut self) -> CaseResult<&'a str> {
        let t = self.peek_token().ok_or_else(|| self.error("expected a word"))?;
        self.pos += t.len();
        Ok(t)
    }

    /// `{ key value; key { ... } }` with values kept as raw text.
    fn dict(&mut self) -> CaseResult<FoamDict> {
        self.expect('{')?;
        let mut d = FoamDict::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Ok(d);
            }
            if self.rest().is_empty() {
                return Err(self.error("unterminated dictionary"));
            }
            let key = self.token()?;
            self.skip_ws();
            if self.rest().starts_with('{') {
                let nested = self.dict()?;
                d.insert(key, nested);
            } else {
                let raw = self.raw_value()?;
                d.insert(key, FoamValue::word(raw));
            }
        }
    }

    /// Text up to the `;` that ends the entry, outside any parentheses.
    fn raw_value(&mut self) -> CaseResult<String> {
        let mut depth = 0usize;
        for (i, c) in self.rest().char_indices() {
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ';' if depth == 0 => {
                    let raw = self.rest()[..i].split_whitespace().collect::<Vec<_>>().join(" ");
                    self.pos += i + 1;
                    return Ok(raw);
                }
                _ => {}
            }
        }
        Err(self.error("missing ';'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESH: &str = r#"/*--------------------------------*- C++ -*----------------------------------*\
  =========                 |
\*---------------------------------------------------------------------------*/
FoamFile
{
    version     2.0;
    format      ascii;
    class       polyBoundaryMesh;
    location    "constant/polyMesh";
    object      boundary;
}
// * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * * //

3
(
    inlet
    {
        type            patch;
        nFaces          20;
        startFace       760;
    }
    walls
    {
        type            wall;
        inGroups        List<word> 1(wall);
        nFaces          60;
        startFace       780;
    }
    unused
    {
        type            patch;
        nFaces          0;
        startFace       840;
    }
)

// ************************************************************************* //
"#;

    #[test]
    fn parses_patch_list() {
        let patches = parse_boundary(MESH).unwrap();
        assert_eq!(patches.keys().collect::<Vec<_>>(), ["inlet", "walls", "unused"]);
        assert_eq!(patches.lookup("walls/inGroups").and_then(FoamValue::as_word), Some("List<word> 1(wall)"));
        assert_eq!(patches.lookup("inlet/startFace").and_then(FoamValue::as_word), Some("760"));
    }

    #[test]
    fn count_mismatch_is_an_error() {
        let text = "2\n(\n a { type patch; nFaces 1; }\n)\n";
        assert!(matches!(parse_boundary(text), Err(CaseError::Resource(_))));
    }

    #[test]
    fn truncated_file_is_an_error() {
        assert!(parse_boundary("1\n(\n a { type patch;").is_err());
    }

    #[test]
    fn comments_are_ignored() {
        assert_eq!(strip_comments("a // b\nc /* d */ e"), "a \nc   e");
    }
}
