use anstyle::{AnsiColor, Style};

pub(crate) const BOLD: Style = Style::new().bold();
pub(crate) const DIM: Style = Style::new().dimmed();
pub(crate) const GREEN: Style = AnsiColor::Green.on_default();
pub(crate) const HEADER: Style = AnsiColor::White.on_default().bold();

pub(crate) struct CliExamples(pub &'static str);

impl From<CliExamples> for clap::builder::StyledStr {
    fn from(ex: CliExamples) -> Self {
        use clap::builder::styling::Style;
        use std::fmt::Write;

        const CLAP_HEADER: Style = Style::new().bold().underline();

        let mut s = clap::builder::StyledStr::new();
        write!(s, "{CLAP_HEADER}Examples{CLAP_HEADER:#}").unwrap();
        for line in ex.0.trim_matches('\n').lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                write!(s, "{DIM}\n{line}{DIM:#}").unwrap();
            } else if !trimmed.is_empty() {
                write!(s, "{BOLD}\n{line}{BOLD:#}").unwrap();
            } else {
                writeln!(s).unwrap();
            }
        }
        s
    }
}
