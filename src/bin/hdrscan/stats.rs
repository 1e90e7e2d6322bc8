use console::style;
use pad::{Alignment, PadStr};

use std::fmt::{self, Display};

use hdrscan::{Response, ScanSummary, Status};

// Maximum padding for each entry in the final statistics output
const MAX_PADDING: usize = 20;

pub fn color_response(response: &Response) -> String {
    let out = match response.status {
        Status::Found(_) => style(response).green().bright(),
        Status::Missing(_) => style(response).dim(),
        Status::Cancelled => style(response).dim(),
        Status::Error(_) | Status::Timeout => style(response).yellow().bright(),
    };
    out.to_string()
}

/// Summary printed in verbose mode
pub struct ResponseStats {
    summary: ScanSummary,
    failures: Vec<Response>,
}

impl ResponseStats {
    pub fn new() -> Self {
        ResponseStats {
            summary: ScanSummary::default(),
            failures: Vec::new(),
        }
    }

    /// Remember hosts that could not be requested
    pub fn add(&mut self, response: &Response) {
        if response.status.is_failure() {
            self.failures.push(response.clone());
        }
    }

    pub fn finish(&mut self, summary: ScanSummary) {
        self.summary = summary;
        self.failures.sort_by(|a, b| a.host.cmp(&b.host));
    }
}

fn write_stat(f: &mut fmt::Formatter, title: &str, stat: usize) -> fmt::Result {
    let fill = title.chars().count();
    f.write_str(title)?;
    f.write_str(
        &stat
            .to_string()
            .pad(MAX_PADDING - fill, '.', Alignment::Right, false),
    )?;
    f.write_str("\n")
}

impl Display for ResponseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(MAX_PADDING + 1);

        writeln!(f, "📝 Summary")?;
        writeln!(f, "{}", separator)?;
        write_stat(f, "🔍 Total", self.summary.total)?;
        write_stat(f, "🎯 Found", self.summary.found)?;
        write_stat(f, "👻 Missing", self.summary.missing)?;
        write_stat(f, "🚫 Failed", self.summary.failed)?;
        write_stat(f, "⛔ Cancelled", self.summary.cancelled)?;

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed hosts")?;
        }
        for response in &self.failures {
            writeln!(f, "{}", color_response(response))?;
        }
        Ok(())
    }
}
