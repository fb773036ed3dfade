//! Line breaking over raw byte streams.
//!
//! The breaker is the single source of truth for where lines end: the
//! paginator and the render path both derive their geometry from it, so
//! a page re-read after reboot shows exactly the bytes the index pass
//! counted. It works on bytes, not glyphs; text files on the volume are
//! ASCII or Latin-1 where every printable byte is one cell wide.

/// Result of scanning one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineBreak {
    /// One past the last byte of the line's visible content.
    pub end: usize,
    /// Where the next line starts (newline bytes and soft-wrap
    /// whitespace already skipped).
    pub next: usize,
}

/// Scan `buf` from `start` and find where the current line ends, given
/// a budget of `max_width` printable cells.
///
/// Break priority: a hard newline wins outright; otherwise the last
/// space, tab, or hyphen seen before the budget runs out; otherwise a
/// forced cut after exactly `max_width` cells. A hyphen breaks after
/// itself so the hyphen stays on the upper line.
pub fn find_line_break(buf: &[u8], start: usize, max_width: usize) -> LineBreak {
    if start >= buf.len() {
        return LineBreak {
            end: buf.len(),
            next: buf.len(),
        };
    }

    let mut width = 0usize;
    let mut break_at: Option<usize> = None;
    let mut in_word = false;

    for (i, &b) in buf.iter().enumerate().skip(start) {
        match b {
            b'\n' => return hard_break(buf, i, b'\r'),
            b'\r' => return hard_break(buf, i, b'\n'),
            b' ' | b'\t' => {
                width = width.saturating_add(1);
                if in_word {
                    break_at = Some(i);
                    in_word = false;
                }
            }
            b'-' => {
                width = width.saturating_add(1);
                if in_word {
                    // break lands after the hyphen, not before it
                    break_at = Some(i.saturating_add(1));
                }
            }
            b if b >= 0x20 => {
                width = width.saturating_add(1);
                in_word = true;
            }
            // other control bytes take no cell and cannot host a break
            _ => continue,
        }
        if width >= max_width {
            return width_break(buf, start, i, break_at);
        }
    }

    LineBreak {
        end: buf.len(),
        next: buf.len(),
    }
}

/// Hard break at a newline byte; a `companion` byte right after it
/// (the other half of a CRLF or LFCR pair) is consumed with it.
fn hard_break(buf: &[u8], i: usize, companion: u8) -> LineBreak {
    let mut next = i.saturating_add(1);
    if buf.get(next) == Some(&companion) {
        next = next.saturating_add(1);
    }
    LineBreak { end: i, next }
}

/// The width budget ran out at byte `i`.
fn width_break(buf: &[u8], start: usize, i: usize, break_at: Option<usize>) -> LineBreak {
    match break_at {
        Some(at) if at > start => {
            // soft wrap: resume after the whitespace run at the break
            let mut next = at;
            while matches!(buf.get(next), Some(b' ' | b'\t')) {
                next = next.saturating_add(1);
            }
            LineBreak { end: at, next }
        }
        // one unbreakable token: cut it at exactly the budget
        _ => {
            let end = i.saturating_add(1);
            LineBreak { end, next: end }
        }
    }
}
