use crate::error::{ImportError, ImportResult};
use crate::session::{ImportSession, SessionConfig, DELETE_CONFIRMATION_PROMPT};
use crate::types::Record;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// How the imported dataset is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

/// Serialized view of a session for json/yaml output
#[derive(Debug, Serialize)]
struct SessionOutput<'a> {
    file: Option<&'a str>,
    sheets: &'a [String],
    selected_sheet: Option<&'a str>,
    columns: &'a [String],
    records: &'a [Record],
    messages: Vec<String>,
}

/// Select a file from disk. The size is checked before any bytes are read.
pub fn load_file(session: &mut ImportSession, path: &Path) -> ImportResult<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let size = fs::metadata(path)?.len();

    let ticket = session.select_file(name, size)?;
    let bytes = fs::read(path)?;
    session.attach_contents(ticket, bytes)?;
    Ok(())
}

/// Execute the sheets command
pub fn sheets(file: &Path) -> ImportResult<()> {
    let mut session = ImportSession::default();
    load_file(&mut session, file)?;

    // Sheet-level failures on the first sheet do not matter for listing
    match session.import() {
        Ok(_) | Err(ImportError::EmptySheet { .. }) | Err(ImportError::MissingColumns { .. }) => {}
        Err(e) => return Err(e),
    }

    println!("{}", "📄 Sheets".bold().green());
    println!("   File: {}\n", file.display());
    for (i, name) in session.sheet_names().iter().enumerate() {
        println!("   {}. {}", i + 1, name.bright_blue());
    }
    Ok(())
}

/// Execute the import command
pub fn import(
    file: &Path,
    sheet: Option<String>,
    format: OutputFormat,
    deletes: Vec<usize>,
    assume_yes: bool,
) -> ImportResult<()> {
    let mut session = ImportSession::new(SessionConfig::default());
    load_file(&mut session, file)?;

    let mut notices = Vec::new();
    match session.import() {
        Ok(_) => notices.extend_from_slice(session.messages()),
        // A failing first sheet is irrelevant when another one was asked for
        Err(ImportError::EmptySheet { .. }) | Err(ImportError::MissingColumns { .. })
            if sheet.is_some() => {}
        Err(e) => return Err(e),
    }

    if let Some(name) = sheet {
        notices.clear();
        session.select_sheet(&name)?;
        notices.extend_from_slice(session.messages());
    }

    if !deletes.is_empty() {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut stderr = io::stderr();
        apply_deletes(&mut session, &deletes, assume_yes, &mut input, &mut stderr)?;
    }

    match format {
        OutputFormat::Table => {
            print!("{}", render_table(&session));
            for notice in &notices {
                println!("\n{}", notice.yellow());
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let output = SessionOutput {
                file: session.file_name(),
                sheets: session.sheet_names(),
                selected_sheet: session.selected_sheet(),
                columns: session.columns(),
                records: session.records(),
                messages: notices,
            };
            let text = if format == OutputFormat::Json {
                serde_json::to_string_pretty(&output).map_err(io::Error::from)?
            } else {
                serde_yaml::to_string(&output).map_err(io::Error::other)?
            };
            println!("{}", text);
        }
    }

    Ok(())
}

/// Execute the browse command
pub fn browse(file: &Path) -> ImportResult<()> {
    let mut session = ImportSession::default();
    load_file(&mut session, file)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();
    browse_with(&mut session, &mut input, &mut stdout)
}

/// Interactive loop over `input`. Sheet and row errors are reported and the
/// loop continues; only IO failures end it early.
pub fn browse_with<R: BufRead, W: Write>(
    session: &mut ImportSession,
    input: &mut R,
    out: &mut W,
) -> ImportResult<()> {
    match session.import() {
        Ok(_) => write_messages(session, out)?,
        Err(e) => writeln!(out, "{}", e)?,
    }
    write!(out, "{}", render_table(session))?;
    writeln!(out, "Type 'help' for commands.")?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        let (command, arg) = match line.split_once(' ') {
            Some((c, a)) => (c, a.trim()),
            None => (line, ""),
        };

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                writeln!(out, "  show              print the displayed rows")?;
                writeln!(out, "  sheets            list sheets")?;
                writeln!(out, "  sheet <name>      switch sheet")?;
                writeln!(out, "  delete <n>        delete displayed row n")?;
                writeln!(out, "  quit              leave")?;
            }
            "show" => write!(out, "{}", render_table(session))?,
            "sheets" => {
                for name in session.sheet_names() {
                    let marker = if Some(name.as_str()) == session.selected_sheet() {
                        "*"
                    } else {
                        " "
                    };
                    writeln!(out, " {} {}", marker, name)?;
                }
            }
            "sheet" => {
                match session.select_sheet(arg) {
                    Ok(_) => write_messages(session, out)?,
                    Err(e) => writeln!(out, "{}", e)?,
                }
                write!(out, "{}", render_table(session))?;
            }
            "delete" => match arg.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    if confirm(input, out)? {
                        if session.delete_row(n - 1).is_ok() {
                            writeln!(out, "Deleted row {}", n)?;
                        }
                        write_messages(session, out)?;
                    }
                }
                _ => writeln!(out, "Usage: delete <row number>")?,
            },
            other => writeln!(out, "Unknown command: {}", other)?,
        }
    }

    Ok(())
}

/// Delete 1-based display positions, highest first so every position refers
/// to the display as it was before any deletion.
pub fn apply_deletes<R: BufRead, W: Write>(
    session: &mut ImportSession,
    positions: &[usize],
    assume_yes: bool,
    input: &mut R,
    out: &mut W,
) -> ImportResult<usize> {
    let mut ordered: Vec<usize> = positions.to_vec();
    ordered.sort_unstable_by(|a, b| b.cmp(a));
    ordered.dedup();

    let len = session.records().len();
    if let Some(&bad) = ordered.iter().find(|&&p| p == 0 || p > len) {
        return Err(ImportError::RowOutOfRange { position: bad, len });
    }

    let mut deleted = 0;
    for position in ordered {
        writeln!(out, "Row {}", position)?;
        if assume_yes || confirm(input, out)? {
            session.delete_row(position - 1)?;
            deleted += 1;
        }
    }
    Ok(deleted)
}

/// Ask the delete confirmation question; anything but y/yes declines
fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<bool> {
    write!(out, "{} [y/N] ", DELETE_CONFIRMATION_PROMPT)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn write_messages<W: Write>(session: &ImportSession, out: &mut W) -> io::Result<()> {
    for message in session.messages() {
        writeln!(out, "{}", message)?;
    }
    Ok(())
}

/// Render the displayed dataset as an aligned text table with 1-based row numbers
pub fn render_table(session: &ImportSession) -> String {
    let columns = session.columns();
    let records = session.records();

    let mut out = String::new();
    if let Some(sheet) = session.selected_sheet() {
        out.push_str(&format!("Sheet: {}\n", sheet));
    }

    if records.is_empty() {
        if !columns.is_empty() {
            out.push_str(&format!("#  {}\n", columns.join("  ")));
        }
        out.push_str("No Data\n");
        return out;
    }

    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|record| columns.iter().map(|c| record.value(c).to_string()).collect())
        .collect();

    let index_width = records.len().to_string().len().max(1);
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(col.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(col, w)| pad(col, *w))
        .collect();
    out.push_str(&format!(
        "{}  {}\n",
        pad("#", index_width),
        header.join("  ").trim_end()
    ));

    for (i, row) in cells.iter().enumerate() {
        let line: Vec<String> = row.iter().zip(&widths).map(|(v, w)| pad(v, *w)).collect();
        out.push_str(&format!(
            "{}  {}\n",
            pad(&(i + 1).to_string(), index_width),
            line.join("  ").trim_end()
        ));
    }
    out
}

fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - len))
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
