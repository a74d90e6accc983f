//! Collected output of one CLI run.

use serde::Serialize;

use stanza_parser::{BlockMatch, ParseSummary};

/// One recognized block, ready for text or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    pub block: String,
    pub occurrence: u32,
    pub first_line: u64,
    pub last_line: u64,
    pub lines: Vec<String>,
}

impl BlockReport {
    pub fn from_match(m: &BlockMatch) -> Self {
        let first_line = m.lines.first().map(|l| l.number).unwrap_or(0);
        let last_line = m.lines.last().map(|l| l.number).unwrap_or(0);
        Self {
            block: m.block.clone(),
            occurrence: m.occurrence,
            first_line,
            last_line,
            lines: m.lines.iter().map(|l| l.text.clone()).collect(),
        }
    }
}

/// Envelope for `--format json`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub summary: ParseSummary,
    pub blocks: Vec<BlockReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use stanza_parser::Line;

    #[test]
    fn test_report_records_line_span() {
        let m = BlockMatch {
            block: "fence".to_string(),
            lines: vec![Line::new(3, "```"), Line::new(5, "```")],
            occurrence: 2,
        };
        let report = BlockReport::from_match(&m);
        assert_eq!(report.first_line, 3);
        assert_eq!(report.last_line, 5);
        assert_eq!(report.occurrence, 2);
    }
}
