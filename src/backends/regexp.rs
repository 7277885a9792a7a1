//! Regular-expression tables.
//!
//! Rule syntax: `/pattern/flags result`. Any non-alphanumeric character may
//! be used as the delimiter. Patterns match case-insensitively; the `i`
//! flag toggles that. In `result`, `$N` and `${N}` are replaced by capture
//! group N (empty when the group did not participate) and `$$` by `$`.
//!
//! Rules come either inline, `regexp:{{/a|c/ 1}, {/b/ 2}}`, or from a file,
//! `regexp:/etc/mail/rules`, one rule per logical line. The first matching
//! rule answers.

use crate::backends::ENTRY_SEPARATORS;
use crate::backends::file::{LogicalLine, TableFile};
use crate::dict::{DictFlags, LookupResult, Owner, Table};
use crate::error::OpenError;
use crate::registry::OpenRequest;
use crate::spec::{split_grouped, strip_group};

use regex::{Captures, Regex, RegexBuilder};
use std::path::Path;
use std::sync::Arc;

pub const KIND: &str = "regexp";

#[derive(Debug)]
struct Rule {
    pattern: Regex,
    result: String,
}

#[derive(Debug)]
pub struct RegexpTable {
    name: String,
    rules: Vec<Rule>,
    owner: Owner,
    flags: DictFlags,
}

impl RegexpTable {
    pub fn open(spec: &str, name: &str, flags: DictFlags) -> Result<Self, OpenError> {
        let (lines, owner) = match strip_group(name) {
            Some(inner) => (inline_rules(spec, inner)?, Owner::Trusted),
            None => {
                let file = TableFile::read(spec, Path::new(name))?;
                (file.lines(), file.owner)
            }
        };

        let rules = lines
            .iter()
            .map(|line| parse_rule(spec, line))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_string(),
            rules,
            owner,
            flags: flags.difference(DictFlags::MATCH) | DictFlags::PATTERN,
        })
    }
}

pub fn open(req: &OpenRequest<'_>) -> Result<Arc<dyn Table>, OpenError> {
    req.require_read_only()?;
    Ok(Arc::new(RegexpTable::open(req.spec, req.name, req.flags)?))
}

impl Table for RegexpTable {
    fn kind(&self) -> &str {
        KIND
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, key: &str) -> LookupResult {
        for rule in &self.rules {
            if let Some(caps) = rule.pattern.captures(key) {
                return LookupResult::Found(expand(&rule.result, &caps));
            }
        }
        LookupResult::NotFound
    }

    fn owner(&self) -> Owner {
        self.owner
    }

    fn flags(&self) -> DictFlags {
        self.flags
    }
}

/// Inline rules are brace groups: `{/pattern/ result}`.
fn inline_rules(spec: &str, inner: &str) -> Result<Vec<LogicalLine>, OpenError> {
    let expected = "regexp:{{/pattern/ result}, ...}";
    let tokens = split_grouped(inner, ENTRY_SEPARATORS)
        .map_err(|detail| OpenError::malformed(spec, expected, detail))?;

    let mut lines = Vec::with_capacity(tokens.len());
    for (idx, token) in tokens.into_iter().enumerate() {
        let text = strip_group(token).ok_or_else(|| {
            OpenError::malformed(spec, expected, format!("rule \"{token}\" is not enclosed in {{}}"))
        })?;
        lines.push(LogicalLine {
            lineno: idx + 1,
            text: text.to_string(),
        });
    }
    Ok(lines)
}

fn parse_rule(spec: &str, line: &LogicalLine) -> Result<Rule, OpenError> {
    let lineno = line.lineno;
    let text = line.text.as_str();
    let bad = |detail: String| OpenError::bad_entry(spec, format!("rule {lineno}: {detail}"));

    let delim = text
        .chars()
        .next()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace() && *c != '\\')
        .ok_or_else(|| bad(format!("expected a delimited pattern, got \"{text}\"")))?;

    // Find the closing delimiter, skipping backslash escapes.
    let body = &text[delim.len_utf8()..];
    let mut end = None;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delim {
            end = Some(i);
            break;
        }
    }
    let end = end.ok_or_else(|| bad(format!("missing closing '{delim}'")))?;

    let mut pattern = body[..end].to_string();
    if !regex_syntax_char(delim) {
        pattern = pattern.replace(&format!("\\{delim}"), &delim.to_string());
    }

    let rest = &body[end + delim.len_utf8()..];
    let flags_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let mut case_insensitive = true;
    for flag in rest[..flags_len].chars() {
        match flag {
            'i' => case_insensitive = !case_insensitive,
            other => return Err(bad(format!("unknown pattern flag '{other}'"))),
        }
    }

    let result = rest[flags_len..].trim();
    if result.is_empty() {
        return Err(bad("missing result text".to_string()));
    }

    let compiled = RegexBuilder::new(&pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source| OpenError::BadPattern {
            spec: spec.to_string(),
            pattern: pattern.clone(),
            source,
        })?;

    let mut max_group = 0;
    substitute(result, |group, _| max_group = max_group.max(group));
    if max_group >= compiled.captures_len() {
        return Err(bad(format!(
            "result references ${max_group} but the pattern has {} group(s)",
            compiled.captures_len() - 1
        )));
    }

    Ok(Rule {
        pattern: compiled,
        result: result.to_string(),
    })
}

fn regex_syntax_char(c: char) -> bool {
    matches!(
        c,
        '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '#'
            | '&' | '-' | '~'
    )
}

fn expand(template: &str, caps: &Captures<'_>) -> String {
    substitute(template, |group, out| {
        if let Some(m) = caps.get(group) {
            out.push_str(m.as_str());
        }
    })
}

/// Copy `template`, calling `group` for every `$N` / `${N}` reference.
fn substitute(template: &str, mut group: impl FnMut(usize, &mut String)) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];

        if let Some(after) = rest.strip_prefix('$') {
            out.push('$');
            rest = after;
            continue;
        }

        let (digits, after) = match rest.strip_prefix('{') {
            Some(inner) => match inner.find('}') {
                Some(close) if is_number(&inner[..close]) => (&inner[..close], &inner[close + 1..]),
                _ => ("", rest),
            },
            None => {
                let len = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(rest.len());
                (&rest[..len], &rest[len..])
            }
        };

        match digits.parse::<usize>() {
            Ok(n) => group(n, &mut out),
            Err(_) => out.push('$'),
        }
        rest = after;
    }

    out.push_str(rest);
    out
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
