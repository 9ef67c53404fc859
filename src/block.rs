//! Balanced Block Scanner
//!
//! Line-oriented brace matching for locating a code block by an anchor
//! substring on its opening line. Regex alone cannot bound a nested
//! resolver body reliably, so block-level steps go through here.

/// A block of whole lines, located by byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Byte offset of the start of the opening line
    pub start: usize,
    /// Byte offset one past the closing line (including its newline, if any)
    pub end: usize,
    /// 0-based index of the opening line
    pub start_line: usize,
    /// 0-based index of the closing line
    pub end_line: usize,
}

fn brace_delta(line: &str) -> i32 {
    let mut delta = 0;
    for c in line.chars() {
        match c {
            '{' => delta += 1,
            '}' => delta -= 1,
            _ => {}
        }
    }
    delta
}

/// Find the balanced-brace block whose opening line contains `anchor`.
///
/// Scans line by line from the first line containing `anchor`, tracking
/// brace depth, and ends the block on the line where depth returns to
/// zero or below. A block left unbalanced runs to the end of input.
pub fn find_block(content: &str, anchor: &str) -> Option<Block> {
    let mut offset = 0;
    let mut depth: i32 = 0;
    let mut found: Option<(usize, usize)> = None; // (start_byte, start_line)

    for (idx, line) in content.split_inclusive('\n').enumerate() {
        match found {
            None => {
                if line.contains(anchor) {
                    depth = brace_delta(line);
                    if depth <= 0 {
                        // Block opens and closes on the anchor line
                        return Some(Block {
                            start: offset,
                            end: offset + line.len(),
                            start_line: idx,
                            end_line: idx,
                        });
                    }
                    found = Some((offset, idx));
                }
            }
            Some((start, start_line)) => {
                depth += brace_delta(line);
                if depth <= 0 {
                    return Some(Block {
                        start,
                        end: offset + line.len(),
                        start_line,
                        end_line: idx,
                    });
                }
            }
        }
        offset += line.len();
    }

    // Unbalanced: run to EOF
    found.map(|(start, start_line)| Block {
        start,
        end: content.len(),
        start_line,
        end_line: content.split_inclusive('\n').count().saturating_sub(1),
    })
}

/// Replace the block located by `anchor` with `replacement`.
///
/// The replacement keeps a trailing newline when the removed block had
/// one. Returns None when the anchor does not occur.
pub fn replace_block(content: &str, anchor: &str, replacement: &str) -> Option<String> {
    let block = find_block(content, anchor)?;

    let removed = &content[block.start..block.end];
    let mut out = String::with_capacity(content.len() - removed.len() + replacement.len() + 1);
    out.push_str(&content[..block.start]);
    out.push_str(replacement);
    if removed.ends_with('\n') && !replacement.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&content[block.end..]);
    Some(out)
}
