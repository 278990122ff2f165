//! Template parsing.
//!
//! A template is SQL text with placeholder slots:
//!
//! - `[]` / `[name]`: a value, bound as a parameter
//! - `{}` / `{name}`: an identifier, always quoted
//! - `{{}}` / `{{name}}`: an identifier quoted only when it is a bare name
//!
//! Positional slots consume arguments left to right. Brackets that do not form a
//! slot (`ARRAY[1,2]`, `'{json}'`) are kept as literal text.

/// How a slot treats its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Value,
    Identifier,
    SoftIdentifier,
}

/// Which argument feeds a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotKey {
    Positional(usize),
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Slot { kind: SlotKind, key: SlotKey },
}

/// A parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
    positional: usize,
}

impl Template {
    pub fn parse(source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut positional = 0;
        let mut i = 0;
        let mut lit_start = 0;

        while i < bytes.len() {
            let found = match bytes[i] {
                b'[' => slot_at(source, i, "[", "]", SlotKind::Value),
                b'{' if source[i..].starts_with("{{") => {
                    slot_at(source, i, "{{", "}}", SlotKind::SoftIdentifier)
                        .or_else(|| slot_at(source, i, "{", "}", SlotKind::Identifier))
                }
                b'{' => slot_at(source, i, "{", "}", SlotKind::Identifier),
                _ => None,
            };

            match found {
                Some((kind, name, end)) => {
                    literal.push_str(&source[lit_start..i]);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let key = match name {
                        Some(n) => SlotKey::Named(n.to_string()),
                        None => {
                            positional += 1;
                            SlotKey::Positional(positional - 1)
                        }
                    };
                    segments.push(Segment::Slot { kind, key });
                    i = end;
                    lit_start = end;
                }
                None => i += 1,
            }
        }
        literal.push_str(&source[lit_start..]);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            segments,
            positional,
        }
    }

    /// A template that is `text` verbatim, with no slots.
    pub fn literal(text: &str) -> Self {
        let segments = if text.is_empty() {
            Vec::new()
        } else {
            vec![Segment::Literal(text.to_string())]
        };
        Self {
            segments,
            positional: 0,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of positional slots.
    pub fn positional_count(&self) -> usize {
        self.positional
    }

    /// Names used by named slots, in order of first appearance.
    pub fn names(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if let Segment::Slot {
                key: SlotKey::Named(n),
                ..
            } = seg
            {
                if !out.contains(&n.as_str()) {
                    out.push(n);
                }
            }
        }
        out
    }
}

/// Try to read a slot opening at byte `start`.
///
/// Returns the slot kind, its name (if named) and the byte index after the slot.
fn slot_at<'a>(
    source: &'a str,
    start: usize,
    open: &str,
    close: &str,
    kind: SlotKind,
) -> Option<(SlotKind, Option<&'a str>, usize)> {
    let body_start = start + open.len();
    let rest = source.get(body_start..)?;
    let body_len = rest.find(close)?;
    let body = &rest[..body_len];
    let end = body_start + body_len + close.len();
    if body.is_empty() {
        return Some((kind, None, end));
    }
    is_slot_name(body).then_some((kind, Some(body), end))
}

fn is_slot_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
