use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-shrink",
    about = "Compress a batch of up to 10 images and report the size savings",
    long_about = "img-shrink compresses a selection of images one at a time under a size, \
                  dimension and quality budget, optionally converting them to another format \
                  first. It reports before/after sizes for every file, the overall reduction, \
                  and writes all results to an output directory.",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    img-shrink compress a.png b.jpg -o ./out\n  \
    img-shrink compress ./photos -o ./out -m 500KB -d 1280 -q 75\n  \
    img-shrink compress \"./shots/*.png\" -o ./out -c webp\n  \
    img-shrink scan ./photos -r"
)]
pub struct Args {
    #[arg(long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Print per-iteration details")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress a batch of images",
        long_about = "Compress every image in the selection sequentially. Non-image files are \
                      ignored; selections containing more than 10 images are rejected without \
                      processing anything."
    )]
    Compress {
        #[arg(
            required = true,
            help = "Input files, directories or glob patterns",
            long_help = "Inputs can be file paths, directories or glob expressions. \
                         Examples: 'a.png', './images', './images/*.jpg'"
        )]
        inputs: Vec<String>,

        #[arg(short = 'o', long, help = "Directory the results are written to")]
        output: PathBuf,

        #[arg(
            short = 'm',
            long,
            help = "Maximum output size per file (default: 1MB)",
            long_help = "Target upper bound for each compressed file. Accepts units \
                         Bytes, KB, MB and GB, e.g. '500KB' or '1.5MB'."
        )]
        max_size: Option<String>,

        #[arg(
            short = 'd',
            long,
            help = "Maximum width or height in pixels (default: 1920)",
            long_help = "Images whose longest edge exceeds this are downscaled, \
                         preserving the aspect ratio."
        )]
        max_dimension: Option<u32>,

        #[arg(
            short = 'q',
            long,
            help = "Initial compression quality (1-100, default: 80)",
            long_help = "Starting quality. It is stepped down while an output is \
                         still larger than the maximum size."
        )]
        quality: Option<u8>,

        #[arg(
            long,
            help = "Never reduce dimensions to reach the size target",
            long_help = "Keep the resolution even if the maximum size cannot be met."
        )]
        preserve_resolution: bool,

        #[arg(
            short = 'c',
            long,
            help = "Convert to this format before compressing (jpeg, png, webp)",
            long_help = "Manual format conversion. Files already in the target format \
                         are not converted."
        )]
        convert_to: Option<String>,

        #[arg(
            long,
            help = "Format used when writing results (jpeg, png, webp)",
            long_help = "Re-encode results whose format differs at export time \
                         instead of at compression time."
        )]
        download_format: Option<String>,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,

        #[arg(long, help = "Compress and report without writing any files")]
        no_export: bool,
    },

    #[command(
        about = "Show which files a selection would accept",
        long_about = "Run the input checks only: list each file with its declared type and \
                      size, and report whether the selection would be rejected."
    )]
    Scan {
        #[arg(required = true, help = "Input files, directories or glob patterns")]
        inputs: Vec<String>,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,
    },
}
