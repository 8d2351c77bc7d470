use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "icmptab",
    version,
    about = "Generate ICMP type/code name tables from the local iptables"
)]
pub struct Args {
    /// Scratch chain for probe rules. Its contents are flushed repeatedly;
    /// the run must own it exclusively.
    #[arg(long, value_name = "CHAIN", default_value = "FORWARD")]
    pub chain: String,

    /// Override the iptables command (split on whitespace, so values like
    /// "sudo iptables" work)
    #[arg(long, value_name = "CMD", default_value = "iptables")]
    pub iptables_cmd: String,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,
}
