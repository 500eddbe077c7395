use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "zipsalvage")]
#[command(version)]
#[command(about = "Recover files from a ZIP archive with a broken central directory", long_about = None)]
#[command(after_help = "Examples:\n  \
  zipsalvage broken.zip                 extract recovered files into the current directory\n  \
  zipsalvage -l broken.zip              list recoverable entries without extracting\n  \
  zipsalvage -o saved.zip broken.zip    repack recovered entries into a fresh archive")]
pub struct Cli {
    /// Broken ZIP file to scan
    #[arg(value_name = "FILE")]
    pub file: String,

    /// List recoverable entries instead of extracting
    #[arg(short = 'l', long = "list", conflicts_with = "output")]
    pub list: bool,

    /// Repack recovered entries into a fresh ZIP file
    #[arg(short = 'o', long = "output", value_name = "ZIP")]
    pub output: Option<String>,

    /// Extract files into DIR instead of the current directory
    #[arg(short = 'd', long = "dir", value_name = "DIR", conflicts_with_all = ["list", "output"])]
    pub extract_dir: Option<String>,

    /// Overwrite existing files without prompting
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Print parsed header and descriptor fields for each entry
    #[arg(long)]
    pub debug: bool,
}
