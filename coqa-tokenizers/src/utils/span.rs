use std::ops::Range;

///
/// Location of a rationale inside an encoded context, as token indices.
/// `start` is inclusive and `end` exclusive. A rationale that could not be
/// located is reported as `(-1, -1)`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RationaleSpan {
    pub start: isize,
    pub end: isize,
}

impl RationaleSpan {
    pub const NOT_FOUND: RationaleSpan = RationaleSpan { start: -1, end: -1 };

    pub fn new(start: usize, end: usize) -> Self {
        RationaleSpan {
            start: start as isize,
            end: end as isize,
        }
    }

    pub fn is_found(&self) -> bool {
        *self != Self::NOT_FOUND
    }

    ///
    /// The span as a range usable for slicing, or `None` for the sentinel.
    ///
    pub fn as_range(&self) -> Option<Range<usize>> {
        if self.is_found() {
            Some(self.start as usize..self.end as usize)
        } else {
            None
        }
    }

    ///
    /// Shift a located span by `offset` tokens. The sentinel stays as it is.
    ///
    pub fn offset(&self, offset: usize) -> Self {
        match self.as_range() {
            Some(range) => RationaleSpan::new(range.start + offset, range.end + offset),
            None => *self,
        }
    }
}

impl From<RationaleSpan> for (isize, isize) {
    fn from(span: RationaleSpan) -> Self {
        (span.start, span.end)
    }
}

///
/// Find the first place the rationale ids occur, contiguously and id for id,
/// inside the context ids.
///
/// Matching is on ids, not on text: a rationale encoded with its own BOS/EOS
/// markers, or tokenized differently at its boundaries, will not be found.
///
/// # Arguments:
/// - `context_tokens`: the encoded context
/// - `rationale_tokens`: the encoded rationale
///
pub fn find_rationale_span(context_tokens: &[u32], rationale_tokens: &[u32]) -> RationaleSpan {
    let width = rationale_tokens.len();
    if width > context_tokens.len() {
        return RationaleSpan::NOT_FOUND;
    }

    // an empty rationale trivially matches at the very start
    if width == 0 {
        return RationaleSpan::new(0, 0);
    }

    context_tokens
        .windows(width)
        .position(|window| window == rationale_tokens)
        .map(|start| RationaleSpan::new(start, start + width))
        .unwrap_or(RationaleSpan::NOT_FOUND)
}
