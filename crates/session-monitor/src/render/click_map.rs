use super::{line_text, RenderedFrame, CONNECTOR_LAST, CONNECTOR_MID};
use std::collections::BTreeMap;

/// Maps frame line indices back to the session drawn there.
///
/// Built by scanning the emitted text for lines whose first glyph after any
/// box border is a tree connector. The n-th such line opens the block of the
/// n-th session in [`RenderedFrame::order`]; it and the status line below it
/// both map to that session. The line under a box's top border is the group
/// title and is never a session line, whatever the project is called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickMap {
    lines: BTreeMap<usize, String>,
}

impl ClickMap {
    pub fn build(frame: &RenderedFrame) -> Self {
        let mut lines = BTreeMap::new();
        let mut next = frame.order.iter();
        let mut title_next = false;

        for (index, line) in frame.lines.iter().enumerate() {
            let text = line_text(line);
            if std::mem::take(&mut title_next) {
                continue;
            }
            if text.trim_start().starts_with('╭') {
                title_next = true;
                continue;
            }
            if !opens_session_block(&text) {
                continue;
            }
            let Some(id) = next.next() else { break };
            lines.insert(index, id.clone());
            lines.insert(index + 1, id.clone());
        }

        Self { lines }
    }

    /// Session drawn on `line`, if any.
    pub fn resolve(&self, line: usize) -> Option<&str> {
        self.lines.get(&line).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Line indices mapped to `session_id`, in ascending order.
    pub fn lines_for(&self, session_id: &str) -> Vec<usize> {
        self.lines
            .iter()
            .filter(|(_, id)| id.as_str() == session_id)
            .map(|(line, _)| *line)
            .collect()
    }
}

fn opens_session_block(text: &str) -> bool {
    let rest = text.trim_start_matches(|c: char| c == '│' || c.is_whitespace());
    rest.starts_with(CONNECTOR_MID) || rest.starts_with(CONNECTOR_LAST)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::text::Line;

    fn frame(lines: &[&str], order: &[&str]) -> RenderedFrame {
        RenderedFrame {
            lines: lines.iter().map(|l| Line::raw(l.to_string())).collect(),
            order: order.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_connector_detection() {
        assert!(opens_session_block("│ ├─ \"prompt\" │"));
        assert!(opens_session_block("  └─ (no description)"));
        assert!(!opens_session_block("│ │  ○ Idle   x  now │"));
        assert!(!opens_session_block("╭────╮"));
        assert!(!opens_session_block("│ api/ /home/api │"));
        assert!(!opens_session_block("│ │ │"));
    }

    #[test]
    fn test_build_maps_block_lines() {
        let f = frame(
            &[
                "title",
                "│ proj/ /proj │",
                "│ ├─ one │",
                "│ │  ○ Idle │",
                "│ └─ two │",
                "│    ○ Idle │",
                "╰──╯",
            ],
            &["a", "b"],
        );
        let map = ClickMap::build(&f);

        assert_eq!(map.len(), 4);
        assert_eq!(map.resolve(2), Some("a"));
        assert_eq!(map.resolve(3), Some("a"));
        assert_eq!(map.resolve(4), Some("b"));
        assert_eq!(map.resolve(5), Some("b"));
        assert_eq!(map.resolve(0), None);
        assert_eq!(map.resolve(6), None);
        assert_eq!(map.lines_for("b"), vec![4, 5]);
    }

    #[test]
    fn test_extra_markers_are_ignored() {
        let f = frame(&["├─ one", "x", "├─ stray", "y"], &["a"]);
        let map = ClickMap::build(&f);
        assert_eq!(map.resolve(2), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_group_title_is_never_a_session_line() {
        let f = frame(
            &[
                "╭────╮",
                "│ ├─x/ /tmp/├─x │",
                "│ │ │",
                "│ └─ one │",
                "│    ○ Idle │",
                "╰──╯",
            ],
            &["a"],
        );
        let map = ClickMap::build(&f);
        assert_eq!(map.resolve(1), None);
        assert_eq!(map.resolve(3), Some("a"));
        assert_eq!(map.resolve(4), Some("a"));
    }

    #[test]
    fn test_empty_frame() {
        let map = ClickMap::build(&RenderedFrame::default());
        assert!(map.is_empty());
    }
}
