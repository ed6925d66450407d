use crate::error::{Error, Result};

// ----------------------------------------------------------------------------
// Raw statement tree

/// One parsed source statement. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    pub labels: Vec<String>,
    pub body: Body,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Instruction {
        operator: String,
        operands: Vec<RawOperand>,
    },
    Directive {
        name: String,
        args: Vec<i64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawOperand {
    Register(String),
    Constant(i64),
    Indirect {
        base: Option<String>,
        offset: i64,
        index: Option<String>,
        scale: Option<i64>,
    },
    Label(String),
}

/// Parsed program. Labels after the last statement end up in `trailing`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Parsed {
    pub statements: Vec<RawStatement>,
    pub trailing: Vec<(String, usize)>,
}

// ----------------------------------------------------------------------------
// Parser

pub fn parse(text: &str) -> Result<Parsed> {
    let mut parsed = Parsed::default();
    let mut pending: Vec<(String, usize)> = vec![];

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let mut rest = strip_comment(raw).trim();

        while let Some((label, tail)) = split_label(rest) {
            pending.push((label.to_string(), line));
            rest = tail.trim_start();
        }
        if rest.is_empty() {
            continue;
        }

        let body = parse_body(rest).map_err(|e| e.at(line))?;
        parsed.statements.push(RawStatement {
            labels: pending.drain(..).map(|(name, _)| name).collect(),
            body,
            line,
        });
    }
    parsed.trailing = pending;
    Ok(parsed)
}

fn strip_comment(raw: &str) -> &str {
    match raw.find(|c| c == ';' || c == '#') {
        Some(pos) => &raw[..pos],
        None => raw,
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '.' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '$')
}

fn split_label(s: &str) -> Option<(&str, &str)> {
    let (head, tail) = s.split_once(':')?;
    let head = head.trim();
    is_ident(head).then_some((head, tail))
}

fn parse_body(s: &str) -> Result<Body> {
    let (head, tail) = match s.find(char::is_whitespace) {
        Some(pos) => (&s[..pos], s[pos..].trim()),
        None => (s, ""),
    };
    let head = head.to_ascii_lowercase();

    if head.starts_with('.') {
        let args = split_args(tail)?
            .into_iter()
            .map(parse_number)
            .collect::<Result<Vec<_>>>()?;
        return Ok(Body::Directive { name: head, args });
    }

    if !is_ident(&head) {
        return Err(Error::syntax(format!("Unexpected `{head}`")));
    }
    let operands = split_args(tail)?
        .into_iter()
        .map(parse_operand)
        .collect::<Result<Vec<_>>>()?;
    Ok(Body::Instruction {
        operator: head,
        operands,
    })
}

/// Splits on commas outside parentheses.
fn split_args(s: &str) -> Result<Vec<&str>> {
    if s.is_empty() {
        return Ok(vec![]);
    }
    let mut args = vec![];
    let mut depth = 0i32;
    let mut start = 0;
    for (pos, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                args.push(s[start..pos].trim());
                start = pos + 1;
            }
            _ => {}
        }
        if depth < 0 || depth > 1 {
            return Err(Error::syntax(format!("Unbalanced parentheses in `{s}`")));
        }
    }
    if depth != 0 {
        return Err(Error::syntax(format!("Unbalanced parentheses in `{s}`")));
    }
    args.push(s[start..].trim());
    match args.iter().any(|a| a.is_empty()) {
        true => Err(Error::syntax(format!("Empty operand in `{s}`"))),
        false => Ok(args),
    }
}

fn parse_register(s: &str) -> Result<String> {
    match s.trim().strip_prefix('%') {
        Some(name) if is_ident(name) => Ok(name.to_ascii_lowercase()),
        _ => Err(Error::syntax(format!("Expected register, found `{s}`"))),
    }
}

fn parse_operand(s: &str) -> Result<RawOperand> {
    if s.starts_with('%') {
        return parse_register(s).map(RawOperand::Register);
    }
    if let Some(imm) = s.strip_prefix('$') {
        return parse_number(imm.trim()).map(RawOperand::Constant);
    }
    if let Some(open) = s.find('(') {
        let inner = s[open + 1..]
            .strip_suffix(')')
            .ok_or_else(|| Error::syntax(format!("Expected `)` at the end of `{s}`")))?;
        let offset = match s[..open].trim() {
            "" => 0,
            disp => parse_number(disp)?,
        };
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() > 3 {
            return Err(Error::syntax(format!("Too many address parts in `{s}`")));
        }
        let optional_reg = |part: Option<&&str>| match part {
            None | Some(&"") => Ok(None),
            Some(p) => parse_register(p).map(Some),
        };
        let base = optional_reg(parts.first())?;
        let index = optional_reg(parts.get(1))?;
        let scale = match parts.get(2) {
            None | Some(&"") => None,
            Some(p) => Some(parse_number(p)?),
        };
        return Ok(RawOperand::Indirect {
            base,
            offset,
            index,
            scale,
        });
    }
    if s.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        return Ok(RawOperand::Indirect {
            base: None,
            offset: parse_number(s)?,
            index: None,
            scale: None,
        });
    }
    if is_ident(s) {
        return Ok(RawOperand::Label(s.to_string()));
    }
    Err(Error::syntax(format!("Cannot parse operand `{s}`")))
}

pub fn parse_number(s: &str) -> Result<i64> {
    let (neg, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        (8, oct)
    } else {
        (10, lower.as_str())
    };
    let value = i64::from_str_radix(body, radix)
        .map_err(|_| Error::syntax(format!("Cannot parse `{s}` as number")))?;
    Ok(if neg { -value } else { value })
}
