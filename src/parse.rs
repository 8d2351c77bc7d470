use regex::Regex;

use crate::error::Error;

/// Marker preceding the type listing in `iptables -p icmp -h` output.
const TYPES_HEADER: &str = "Valid ICMP Types:";

/// One top-level entry of the help listing: a canonical type name, an
/// optional parenthesized alias, and the indented code names nested under
/// it, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub alias: Option<String>,
    pub codes: Vec<String>,
}

/// Parse the help text into type declarations.
///
/// Only the text after the `Valid ICMP Types:` header is considered. A
/// non-indented line declares a type; `name (free text)` carries an alias.
/// An indented line is a code name belonging to the most recent
/// declaration.
pub fn parse_help(help: &str) -> Result<Vec<TypeDecl>, Error> {
    let Some(pos) = help.find(TYPES_HEADER) else {
        return Err(Error::ProbeFormat(format!(
            "help output does not contain {TYPES_HEADER:?}"
        )));
    };
    let body = &help[pos + TYPES_HEADER.len()..];

    let alias_re = Regex::new(r"^([\w-]+) \((.*)\)$").expect("alias pattern is valid");

    let mut decls: Vec<TypeDecl> = Vec::new();
    for line in body.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            let code = line.trim().to_string();
            let Some(current) = decls.last_mut() else {
                return Err(Error::OrphanCode(code));
            };
            current.codes.push(code);
        } else {
            let (name, alias) = match alias_re.captures(line) {
                Some(caps) => (caps[1].to_string(), Some(caps[2].to_string())),
                None => (line.to_string(), None),
            };
            decls.push(TypeDecl {
                name,
                alias,
                codes: Vec::new(),
            });
        }
    }

    Ok(decls)
}
