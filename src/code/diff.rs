//! Patience diff over arbitrary token sequences.
//!
//! Only entries that occur exactly once on both sides of the compared range anchor the longest
//! common subsequence. Ranges without such anchors are emitted as one deletion block followed
//! by one insertion block. Moved-line detection is not attempted.

use std::collections::HashMap;
use std::hash::Hash;

/// One entry of the edit script. An index of `-1` marks the side the line is missing from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DiffLine<T> {
    pub line: T,
    pub a_index: isize,
    pub b_index: isize,
}

impl<T> DiffLine<T> {
    pub fn is_deleted(&self) -> bool {
        self.b_index < 0
    }

    pub fn is_inserted(&self) -> bool {
        self.a_index < 0
    }

    pub fn is_matched(&self) -> bool {
        self.a_index >= 0 && self.b_index >= 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct PatienceDiff<T> {
    pub lines: Vec<DiffLine<T>>,
    pub line_count_deleted: usize,
    pub line_count_inserted: usize,
}

impl<T> PatienceDiff<T> {
    pub fn matched(&self) -> usize {
        self.lines.iter().filter(|l| l.is_matched()).count()
    }
}

#[derive(Clone, Copy, Debug)]
struct Anchor {
    a: isize,
    b: isize,
}

struct Differ<'a, T> {
    a: &'a [T],
    b: &'a [T],
    out: PatienceDiff<T>,
}

/// Diff `a` into `b`.
#[tracing::instrument(skip_all, fields(a = a.len(), b = b.len()))]
pub fn patience_diff<T: Eq + Hash + Clone>(a: &[T], b: &[T]) -> PatienceDiff<T> {
    let mut differ = Differ {
        a,
        b,
        out: PatienceDiff {
            lines: Vec::with_capacity(a.len().max(b.len())),
            line_count_deleted: 0,
            line_count_inserted: 0,
        },
    };
    differ.recurse_lcs(0, a.len() as isize - 1, 0, b.len() as isize - 1, None);
    differ.out
}

/// Lines occurring exactly once in `lines[start..=end]`, mapped to their index.
fn find_unique<T: Eq + Hash>(lines: &[T], start: isize, end: isize) -> HashMap<&T, isize> {
    let mut counts: HashMap<&T, (usize, isize)> = HashMap::new();
    for i in start..=end {
        let entry = counts.entry(&lines[i as usize]).or_insert((0, i));
        entry.0 += 1;
        entry.1 = i;
    }
    counts
        .into_iter()
        .filter(|(_, (count, _))| *count == 1)
        .map(|(line, (_, index))| (line, index))
        .collect()
}

impl<T: Eq + Hash + Clone> Differ<'_, T> {
    /// Anchors for lines unique in both ranges, ordered by their position in `a`.
    fn unique_common(&self, a_start: isize, a_end: isize, b_start: isize, b_end: isize) -> Vec<Anchor> {
        let a_unique = find_unique(self.a, a_start, a_end);
        let b_unique = find_unique(self.b, b_start, b_end);
        let mut anchors: Vec<Anchor> = a_unique
            .into_iter()
            .filter_map(|(line, a)| b_unique.get(line).map(|&b| Anchor { a, b }))
            .collect();
        anchors.sort_by_key(|anchor| anchor.a);
        anchors
    }

    /// Patience sorting over the anchors' `b` indices.
    fn longest_common_subsequence(anchors: &[Anchor]) -> Vec<Anchor> {
        let mut piles: Vec<Vec<usize>> = Vec::new();
        let mut prev: Vec<Option<usize>> = vec![None; anchors.len()];
        for (n, anchor) in anchors.iter().enumerate() {
            let mut i = 0;
            while i < piles.len()
                && piles[i]
                    .last()
                    .is_some_and(|&top| anchors[top].b < anchor.b)
            {
                i += 1;
            }
            if i > 0 {
                prev[n] = piles[i - 1].last().copied();
            }
            match piles.get_mut(i) {
                Some(pile) => pile.push(n),
                None => piles.push(vec![n]),
            }
        }

        let mut lcs = Vec::new();
        let mut cursor = piles.last().and_then(|pile| pile.last().copied());
        while let Some(n) = cursor {
            lcs.push(anchors[n]);
            cursor = prev[n];
        }
        lcs.reverse();
        lcs
    }

    fn push(&mut self, a_index: isize, b_index: isize) {
        if b_index < 0 {
            self.out.line_count_deleted += 1;
        } else if a_index < 0 {
            self.out.line_count_inserted += 1;
        }
        let line = if a_index >= 0 {
            self.a[a_index as usize].clone()
        } else {
            self.b[b_index as usize].clone()
        };
        self.out.lines.push(DiffLine {
            line,
            a_index,
            b_index,
        });
    }

    fn add_sub_match(&mut self, mut a_start: isize, mut a_end: isize, mut b_start: isize, mut b_end: isize) {
        while a_start <= a_end
            && b_start <= b_end
            && self.a[a_start as usize] == self.b[b_start as usize]
        {
            self.push(a_start, b_start);
            a_start += 1;
            b_start += 1;
        }

        // Common suffix is emitted after the middle has been resolved.
        let a_end_full = a_end;
        while a_start <= a_end && b_start <= b_end && self.a[a_end as usize] == self.b[b_end as usize] {
            a_end -= 1;
            b_end -= 1;
        }

        let anchors = self.unique_common(a_start, a_end, b_start, b_end);
        if anchors.is_empty() {
            while a_start <= a_end {
                self.push(a_start, -1);
                a_start += 1;
            }
            while b_start <= b_end {
                self.push(-1, b_start);
                b_start += 1;
            }
        } else {
            self.recurse_lcs(a_start, a_end, b_start, b_end, Some(anchors));
        }

        while a_end < a_end_full {
            a_end += 1;
            b_end += 1;
            self.push(a_end, b_end);
        }
    }

    fn recurse_lcs(
        &mut self,
        a_start: isize,
        a_end: isize,
        b_start: isize,
        b_end: isize,
        anchors: Option<Vec<Anchor>>,
    ) {
        let anchors = anchors.unwrap_or_else(|| self.unique_common(a_start, a_end, b_start, b_end));
        let lcs = Self::longest_common_subsequence(&anchors);
        let (Some(first), Some(last)) = (lcs.first().copied(), lcs.last().copied()) else {
            self.add_sub_match(a_start, a_end, b_start, b_end);
            return;
        };

        if a_start < first.a || b_start < first.b {
            self.add_sub_match(a_start, first.a - 1, b_start, first.b - 1);
        }
        for pair in lcs.windows(2) {
            self.add_sub_match(pair[0].a, pair[1].a - 1, pair[0].b, pair[1].b - 1);
        }
        if last.a <= a_end || last.b <= b_end {
            self.add_sub_match(last.a, a_end, last.b, b_end);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/code/diff.rs"]
mod tests;
