use std::{io::Write, path::Path};

use crate::{decode, error::Result, types::BUNDLED_ALLOWED_LIBRARIES};

/// Print the allowed libraries listed in `path`.
pub fn print_allowed_libraries(path: impl AsRef<Path>, out: &mut impl Write) -> Result<()> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let lines = if path.exists() {
        writeln!(out, "File {} exists", name)?;
        decode::read_lines(path)?
    } else {
        writeln!(out, "File {} does not exist", name)?;
        Vec::new()
    };

    write_listing(&lines, out)
}

/// Print the allowed libraries bundled with this crate.
pub fn print_bundled_allowed_libraries(out: &mut impl Write) -> Result<()> {
    let lines: Vec<String> = BUNDLED_ALLOWED_LIBRARIES.lines().map(str::to_string).collect();
    write_listing(&lines, out)
}

fn write_listing(lines: &[String], out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", "*".repeat(32))?;
    writeln!(out, "These libraries are allowed: ")?;
    writeln!(out, "{}", "-".repeat(32))?;
    for line in lines {
        writeln!(out, "{}", line.trim_end())?;
    }
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(32))?;
    Ok(())
}
