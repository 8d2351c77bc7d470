use std::io::{self, Write};

use crate::resolve::ResolvedTable;

/// Write the generated table as a sequence of assignment statements.
///
/// Types sort by `(value, name)` and codes by `(type, code, name)`; the two
/// sorted lists are merged so a type line lands next to the code lines
/// sharing its numeric type. The interleave is cosmetic only; every emitted
/// line is an independent assignment.
pub fn emit_table<W: Write>(
    out: &mut W,
    invoked_as: &str,
    table: &ResolvedTable,
) -> io::Result<()> {
    writeln!(out, "# icmp.py")?;
    writeln!(out, "# generated by {invoked_as}")?;
    writeln!(out, "ICMP_TYPE = {{}}")?;
    writeln!(out, "ICMP_TYPE_CODE = {{}}")?;

    let mut types: Vec<(u32, &str)> = table
        .types
        .iter()
        .map(|t| (t.value, t.name.as_str()))
        .collect();
    types.sort();

    let mut codes: Vec<(u32, u32, &str)> = table
        .codes
        .iter()
        .map(|c| (c.type_value, c.code_value, c.name.as_str()))
        .collect();
    codes.sort();

    let mut ti = 0;
    let mut ci = 0;
    while ti < types.len() && ci < codes.len() {
        if types[ti].0 <= codes[ci].0 {
            let (value, name) = types[ti];
            ti += 1;
            writeln!(out, "ICMP_TYPE[\"{name}\"] = {value}")?;
        } else {
            let (type_value, code_value, name) = codes[ci];
            ci += 1;
            writeln!(out, "ICMP_TYPE_CODE[\"{name}\"] = ({type_value}, {code_value},)")?;
        }
    }
    for &(value, name) in &types[ti..] {
        writeln!(out, "ICMP_TYPE[\"{name}\"] = {value}")?;
    }
    for &(type_value, code_value, name) in &codes[ci..] {
        writeln!(out, "ICMP_TYPE_CODE[\"{name}\"] = ({type_value}, {code_value},)")?;
    }

    Ok(())
}
