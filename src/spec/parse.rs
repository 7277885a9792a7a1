use crate::error::OpenError;
use crate::spec::ComponentDescriptor;

/// Component separators inside a composite spec.
const SEPARATORS: &[char] = &[',', ' ', '\t', '\r', '\n'];

/// Ordered component list of a composite, e.g. the interior of
/// `or:{static:one, inline:{foo=two}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeSpec {
    components: Vec<ComponentDescriptor>,
}

impl CompositeSpec {
    /// Parse the locator of a `kind:{...}` composite.
    ///
    /// The locator must be a single brace group with nothing after it. The
    /// interior is split on commas and whitespace, except inside nested
    /// braces or double quotes, and every entry must be `type:name`.
    pub fn parse(kind: &str, locator: &str) -> Result<Self, OpenError> {
        let spec = format!("{kind}:{locator}");
        let expected = format!("{kind}:{{type:name...}}");
        let malformed = |detail: String| OpenError::malformed(&spec, &expected, detail);

        let len = group_len(locator, '{', '}')
            .ok_or_else(|| malformed("expected a brace-enclosed table list".to_string()))?;
        if len != locator.len() {
            return Err(malformed(format!(
                "unexpected text after closing brace: {:?}",
                &locator[len..]
            )));
        }

        let inner = &locator[1..len - 1];
        let mut components = Vec::new();
        for token in split_grouped(inner, SEPARATORS).map_err(malformed)? {
            let descriptor = ComponentDescriptor::parse(token).ok_or_else(|| {
                malformed(format!("entry \"{token}\" is not of the form type:name"))
            })?;
            components.push(descriptor);
        }

        Ok(Self { components })
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComponentDescriptor> {
        self.components.iter()
    }
}

impl<'a> IntoIterator for &'a CompositeSpec {
    type Item = &'a ComponentDescriptor;
    type IntoIter = std::slice::Iter<'a, ComponentDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Byte length of the group opening at the start of `s`, closing bracket
/// included. `None` if `s` does not start with `open` or the group never
/// closes. Brackets inside double quotes do not count.
pub fn group_len(s: &str, open: char, close: char) -> Option<usize> {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c == open => {}
        _ => return None,
    }

    let mut depth = 1usize;
    let mut quoted = false;
    for (i, c) in chars {
        if quoted {
            quoted = c != '"';
        } else if c == '"' {
            quoted = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i + c.len_utf8());
            }
        }
    }
    None
}

/// Strip one enclosing `{...}` pair, if `s` is exactly one such group.
pub fn strip_group(s: &str) -> Option<&str> {
    let s = s.trim();
    match group_len(s, '{', '}') {
        Some(len) if len == s.len() => Some(s[1..len - 1].trim()),
        _ => None,
    }
}

/// Split `s` on runs of `separators`, keeping brace groups and double-quoted
/// text intact. Empty tokens are dropped.
pub fn split_grouped<'a>(s: &'a str, separators: &[char]) -> Result<Vec<&'a str>, String> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start: Option<usize> = None;

    for (i, c) in s.char_indices() {
        if quoted {
            quoted = c != '"';
            continue;
        }
        if depth == 0 && separators.contains(&c) {
            if let Some(st) = start.take() {
                tokens.push(&s[st..i]);
            }
            continue;
        }
        if start.is_none() {
            start = Some(i);
        }
        match c {
            '"' => quoted = true,
            '{' => depth += 1,
            '}' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced '}}' at offset {i}"))?;
            }
            _ => {}
        }
    }

    if quoted {
        return Err("unterminated quote".to_string());
    }
    if depth != 0 {
        return Err("missing '}'".to_string());
    }
    if let Some(st) = start {
        tokens.push(&s[st..]);
    }
    Ok(tokens)
}
