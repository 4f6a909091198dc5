//! Block extraction: the contiguous text of a detected dialog

use super::ScanWindow;

/// Collect window lines from absolute line `start` downward.
///
/// Stops before the first line containing any of `footers`, at a missing
/// buffer line, or at the end of the window. Blank lines inside the dialog
/// are kept.
pub fn extract_block(window: &ScanWindow, start: usize, footers: &[String]) -> String {
    let mut collected: Vec<&str> = Vec::new();
    let mut expected = start;

    for line in window.lines().iter().skip_while(|l| l.index < start) {
        if line.index != expected {
            break;
        }
        if footers.iter().any(|f| line.text.contains(f.as_str())) {
            break;
        }
        collected.push(&line.text);
        expected += 1;
    }

    collected.join("\n")
}
