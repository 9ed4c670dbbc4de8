use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "hostblock")]
#[command(about = "Drop outgoing HTTP requests to blocklisted hosts via NFQUEUE", long_about = None)]
pub struct Args {
    /// Site list, one `<rank>,<hostname>` record per line
    #[arg(value_name = "SITE_LIST")]
    pub site_list: Option<PathBuf>,

    /// NFQUEUE number to bind (matches `--queue-num` in the firewall rule)
    #[arg(short, long)]
    pub queue_num: Option<u16>,

    /// Bytes of each packet copied to userspace
    #[arg(long)]
    pub copy_range: Option<u32>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub log_level: Option<String>,
}
