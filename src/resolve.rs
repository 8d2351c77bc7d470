use log::info;

use crate::error::Error;
use crate::oracle::Oracle;
use crate::parse::TypeDecl;

/// A resolved type name. An alias becomes its own entry sharing the
/// numeric value of the canonical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub name: String,
    pub value: u32,
}

/// A resolved code name, tied to the numeric type it was nested under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeEntry {
    pub name: String,
    pub type_value: u32,
    pub code_value: u32,
}

/// Everything one run resolved. Rebuilt fresh per run, never mutated after
/// resolution.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResolvedTable {
    pub types: Vec<TypeEntry>,
    pub codes: Vec<CodeEntry>,
}

/// Find `marker` in `haystack` at or after byte offset `from` and parse
/// the decimal integer between it and the next `stop` (or end of text).
/// Returns the value and the offset just past the scanned region so a
/// follow-up scan can continue from there.
fn scan_int(
    haystack: &str,
    from: usize,
    marker: &str,
    stop: char,
) -> Result<(u32, usize), Error> {
    let Some(rel) = haystack[from..].find(marker) else {
        return Err(Error::ProbeFormat(format!(
            "marker {marker:?} not found in rule listing"
        )));
    };
    let start = from + rel + marker.len();
    let rest = &haystack[start..];
    let end = rest.find(stop).unwrap_or(rest.len());
    let token = rest[..end].trim();
    let value = token.parse::<u32>().map_err(|_| {
        Error::ProbeFormat(format!("expected integer after {marker:?}, found {token:?}"))
    })?;
    Ok((value, start + end))
}

/// Drive the oracle through one probe-and-inspect cycle per declared name
/// and collect the numeric answers.
///
/// Each type probe installs the name as a match filter and reads the
/// canonical `icmptype N` back out of the numeric listing. Code probes
/// additionally read `code M` and must agree with the enclosing type's
/// already-resolved value. The first failure aborts the whole run.
pub fn resolve(oracle: &mut dyn Oracle, decls: &[TypeDecl]) -> Result<ResolvedTable, Error> {
    let mut table = ResolvedTable::default();

    for decl in decls {
        match &decl.alias {
            Some(alias) => info!("found type {} (alias {alias})", decl.name),
            None => info!("found type {}", decl.name),
        }

        oracle.install_match(&decl.name)?;
        let listing = oracle.list_rules()?;
        let (value, _) = scan_int(&listing, 0, "icmptype ", '\n')?;
        info!("resolved {} to type {value}", decl.name);

        table.types.push(TypeEntry {
            name: decl.name.clone(),
            value,
        });
        if let Some(alias) = &decl.alias {
            table.types.push(TypeEntry {
                name: alias.clone(),
                value,
            });
        }

        for code_name in &decl.codes {
            oracle.install_match(code_name)?;
            let listing = oracle.list_rules()?;
            let (type_value, after) = scan_int(&listing, 0, "icmptype ", ' ')?;
            let (code_value, _) = scan_int(&listing, after, "code ", '\n')?;
            if type_value != value {
                return Err(Error::TypeCodeMismatch {
                    name: code_name.clone(),
                    found: type_value,
                    expected: value,
                });
            }
            info!("resolved {code_name} to type {type_value}, code {code_value}");
            table.codes.push(CodeEntry {
                name: code_name.clone(),
                type_value,
                code_value,
            });
        }
    }

    Ok(table)
}
