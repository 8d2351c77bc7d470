pub mod cli;
pub mod emit;
pub mod error;
pub mod oracle;
pub mod parse;
pub mod resolve;

use anyhow::{Context, Result};
use log::info;

use cli::Args;
use emit::emit_table;
use oracle::{IptablesOracle, Oracle};
use parse::parse_help;
use resolve::resolve;

/// Run one generation pass. Returns the exit code: 0 = table written.
///
/// The pipeline is strictly sequential: query the help text, parse it into
/// type declarations, resolve every declared name against the oracle, then
/// emit the merged table to stdout. Any failure aborts before a single
/// table line is written.
pub fn run(args: Args) -> Result<i32> {
    let invoked_as = std::env::args()
        .next()
        .unwrap_or_else(|| "icmptab".to_string());

    let mut oracle = IptablesOracle::new(&args.iptables_cmd, &args.chain)?;

    info!("getting supported ICMP types and sub-types");
    let help = oracle.help_text()?;
    let decls = parse_help(&help)?;

    let table = resolve(&mut oracle, &decls)?;

    info!("generating output");
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    emit_table(&mut out, &invoked_as, &table).context("failed to write generated table")?;

    Ok(0)
}
