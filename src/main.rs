use clap::{Parser, Subcommand};
use sheet_import::cli::{self, OutputFormat};
use sheet_import::logging::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheet-import")]
#[command(about = "Import spreadsheet rows that pass the Name/Amount/Date/Verified schema.")]
#[command(long_about = "Sheet Import - validate spreadsheet rows before you use them

Every sheet must carry the columns Name, Amount, Date and Verified (any order,
extra columns are kept). Rows missing a required value or with an Amount that
is not a number greater than zero are left out and reported.

COMMANDS:
  sheets   - List the sheets of a workbook
  import   - Validate a sheet and print the accepted rows
  browse   - Interactive session: switch sheets, delete rows

LIMITS:
  Files larger than 2MB are rejected before they are read.

EXAMPLES:
  sheet-import sheets payments.xlsx
  sheet-import import payments.xlsx --sheet March --format json
  sheet-import import payments.xlsx --delete 2 --delete 5 --yes
  sheet-import browse payments.xlsx

Set RUST_LOG=sheet_import=debug for detailed logs on stderr.")]
#[command(version)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the sheets of a workbook
    Sheets {
        /// Spreadsheet file (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv)
        file: PathBuf,
    },

    #[command(long_about = "Validate a sheet and print the accepted rows.

The first sheet is used unless --sheet names another one. Dates are shown as
DD/MM/YYYY. Rejected rows are listed after the table as
'Sheet: <name>, Row: <n>, Errors: <reasons>'.

DELETING ROWS:
  --delete takes 1-based row numbers as printed in the table. Each deletion
  asks for confirmation unless --yes is given.")]
    /// Validate a sheet and print the accepted rows
    Import {
        /// Spreadsheet file (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv)
        file: PathBuf,

        /// Sheet to validate (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table", env = "SHEET_IMPORT_FORMAT")]
        format: OutputFormat,

        /// Row number to delete from the displayed rows (repeatable)
        #[arg(short, long = "delete")]
        delete: Vec<usize>,

        /// Do not ask before deleting rows
        #[arg(short, long)]
        yes: bool,
    },

    /// Interactive session: switch sheets, delete rows
    Browse {
        /// Spreadsheet file (.xlsx, .xlsm, .xlsb, .xls, .ods or .csv)
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sheets { file } => cli::sheets(&file)?,

        Commands::Import {
            file,
            sheet,
            format,
            delete,
            yes,
        } => cli::import(&file, sheet, format, delete, yes)?,

        Commands::Browse { file } => cli::browse(&file)?,
    }

    Ok(())
}
