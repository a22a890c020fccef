/// A fenced code block found in a post body. Lines are 1-based and relative to the scanned text.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeFence {
    pub start_line: usize,
    /// `None` when the block is still open at the end of the text.
    pub end_line: Option<usize>,
    pub marker: char,
    pub info: String,
}

impl CodeFence {
    pub fn is_closed(&self) -> bool {
        self.end_line.is_some()
    }

    pub fn language(&self) -> Option<&str> {
        self.info.split_whitespace().next()
    }

    /// True when `line` is one of the fence lines or inside the block.
    pub fn contains(&self, line: usize) -> bool {
        line >= self.start_line && self.end_line.map_or(true, |end| line <= end)
    }
}

// Returns the fence character, its run length and what follows the run.
fn fence_prefix(line: &str) -> Option<(char, usize, &str)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }

    let rest = &line[indent..];
    let marker = rest.chars().next()?;
    if marker != '`' && marker != '~' {
        return None;
    }

    let len = rest.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }

    Some((marker, len, &rest[len..]))
}

/// Scans `text` for fenced code blocks, following the CommonMark fence rules.
pub fn scan(text: &str) -> Vec<CodeFence> {
    let mut fences = vec![];
    let mut open: Option<(CodeFence, usize)> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        match open.take() {
            None => {
                if let Some((marker, len, info)) = fence_prefix(line) {
                    // ``` followed by a backtick is inline code, not a fence
                    if marker == '`' && info.contains('`') {
                        continue;
                    }
                    let fence = CodeFence {
                        start_line: line_no,
                        end_line: None,
                        marker,
                        info: info.trim().to_string(),
                    };
                    open = Some((fence, len));
                }
            }
            Some((mut fence, len)) => match fence_prefix(line) {
                Some((marker, close_len, rest))
                if marker == fence.marker && close_len >= len && rest.trim().is_empty() => {
                    fence.end_line = Some(line_no);
                    fences.push(fence);
                }
                _ => open = Some((fence, len)),
            },
        }
    }

    if let Some((fence, _)) = open {
        fences.push(fence);
    }

    fences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_fences() {
        let text = "Intro\n\n```bash\nls -la\n```\n\ntext\n\n~~~yaml title=\"x\"\nkey: value\n~~~\n";
        let fences = scan(text);
        assert_eq!(fences.len(), 2);
        assert_eq!(fences[0], CodeFence {
            start_line: 3,
            end_line: Some(5),
            marker: '`',
            info: "bash".to_string(),
        });
        assert_eq!(fences[1].language(), Some("yaml"));
        assert_eq!(fences[1].info, "yaml title=\"x\"");
        assert_eq!(fences[1].end_line, Some(11));
        assert!(fences.iter().all(|f| f.is_closed()));
    }

    #[test]
    fn test_unclosed_fence() {
        let text = "```python\nclass EnterpriseBackupManager:\n    pass\n";
        let fences = scan(text);
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].end_line, None);
        assert!(fences[0].contains(100));
    }

    #[test]
    fn test_closing_fence_rules() {
        // A shorter run does not close, a longer one does
        let text = "````\n```\ninner\n`````\n";
        let fences = scan(text);
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].end_line, Some(4));

        // A different character does not close
        let text = "~~~\n```\n";
        let fences = scan(text);
        assert_eq!(fences[0].end_line, None);

        // Text after the closing run does not close
        let text = "```\n``` not closed\n";
        assert_eq!(scan(text)[0].end_line, None);
    }

    #[test]
    fn test_not_a_fence() {
        assert!(scan("``inline``\n").is_empty());
        assert!(scan("```inline code``` in a paragraph\n").is_empty());
        assert!(scan("    ```\n    indented code\n").is_empty());
        assert_eq!(scan("   ```go\nfmt.Println()\n   ```\n")[0].language(), Some("go"));
    }

    #[test]
    fn test_fence_contains() {
        let fence = CodeFence { start_line: 3, end_line: Some(5), marker: '`', info: String::new() };
        assert!(!fence.contains(2));
        assert!(fence.contains(3));
        assert!(fence.contains(5));
        assert!(!fence.contains(6));
    }
}
