use std::ops::Range;

/// One word-level edit operation touching at most one element of each side.
/// `a` indexes the hypothesis, `b` the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DiffOp {
    /// hypothesis[a] matches reference[b]
    Equal { a: usize, b: usize },
    /// hypothesis[a] was decoded where reference[b] was expected
    Replace { a: usize, b: usize },
    /// reference[b] has no hypothesis counterpart
    RefOnly { b: usize },
    /// hypothesis[a] has no reference counterpart
    HypOnly { a: usize },
}

impl DiffOp {
    /// The reference index this operation classifies, if any. Exactly one
    /// operation exists per reference index.
    pub(crate) fn ref_index(&self) -> Option<usize> {
        match *self {
            DiffOp::Equal { b, .. } | DiffOp::Replace { b, .. } | DiffOp::RefOnly { b } => Some(b),
            DiffOp::HypOnly { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockTag {
    Equal,
    Replace,
    /// hypothesis-only run
    Delete,
    /// reference-only run
    Insert,
}

#[derive(Debug, Clone)]
struct OpBlock {
    tag: BlockTag,
    a: Range<usize>,
    b: Range<usize>,
}

/// Word-level edit-distance alignment between a hypothesis sequence and a
/// reference sequence, decomposed so that every operation touches exactly
/// one element of each side: an n-for-m substitution block expands into
/// max(n, m) one-to-one operations, surplus elements on the longer side
/// becoming pure insertions/deletions.
pub(crate) fn word_diff(hypothesis: &[&str], reference: &[&str]) -> Vec<DiffOp> {
    let mut ops = Vec::with_capacity(hypothesis.len().max(reference.len()));
    for block in opcode_blocks(hypothesis, reference) {
        match block.tag {
            BlockTag::Equal => {
                for (a, b) in block.a.zip(block.b) {
                    ops.push(DiffOp::Equal { a, b });
                }
            }
            BlockTag::Delete => {
                for a in block.a {
                    ops.push(DiffOp::HypOnly { a });
                }
            }
            BlockTag::Insert => {
                for b in block.b {
                    ops.push(DiffOp::RefOnly { b });
                }
            }
            BlockTag::Replace => {
                let len_a = block.a.len();
                let len_b = block.b.len();
                let paired = len_a.min(len_b);
                for k in 0..paired {
                    ops.push(DiffOp::Replace {
                        a: block.a.start + k,
                        b: block.b.start + k,
                    });
                }
                for a in block.a.start + paired..block.a.end {
                    ops.push(DiffOp::HypOnly { a });
                }
                for b in block.b.start + paired..block.b.end {
                    ops.push(DiffOp::RefOnly { b });
                }
            }
        }
    }
    ops
}

/// Longest-common-subsequence opcode blocks over the two sequences.
/// Rolling length rows plus a flat direction table, backtracked from the
/// far corner.
fn opcode_blocks(a: &[&str], b: &[&str]) -> Vec<OpBlock> {
    let n = a.len();
    let m = b.len();

    let mut prev = vec![0u32; m + 1];
    let mut curr = vec![0u32; m + 1];
    // 0 = match (diagonal), 1 = skip a, 2 = skip b
    let mut dir = vec![0u8; n * m];

    for i in 0..n {
        for j in 0..m {
            if a[i] == b[j] {
                curr[j + 1] = prev[j] + 1;
                dir[i * m + j] = 0;
            } else if prev[j + 1] >= curr[j] {
                curr[j + 1] = prev[j + 1];
                dir[i * m + j] = 1;
            } else {
                curr[j + 1] = curr[j];
                dir[i * m + j] = 2;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let mut matches: Vec<(usize, usize)> = Vec::new();
    let mut i = n;
    let mut j = m;
    while i > 0 && j > 0 {
        match dir[(i - 1) * m + (j - 1)] {
            0 => {
                matches.push((i - 1, j - 1));
                i -= 1;
                j -= 1;
            }
            1 => i -= 1,
            _ => j -= 1,
        }
    }
    matches.reverse();

    blocks_from_matches(&matches, n, m)
}

fn blocks_from_matches(matches: &[(usize, usize)], n: usize, m: usize) -> Vec<OpBlock> {
    let mut blocks = Vec::new();
    let mut ai = 0usize;
    let mut bi = 0usize;
    let mut k = 0usize;
    while k < matches.len() {
        let (ma, mb) = matches[k];
        push_gap(&mut blocks, ai..ma, bi..mb);
        let mut run = 1usize;
        while k + run < matches.len()
            && matches[k + run].0 == ma + run
            && matches[k + run].1 == mb + run
        {
            run += 1;
        }
        blocks.push(OpBlock {
            tag: BlockTag::Equal,
            a: ma..ma + run,
            b: mb..mb + run,
        });
        ai = ma + run;
        bi = mb + run;
        k += run;
    }
    push_gap(&mut blocks, ai..n, bi..m);
    blocks
}

fn push_gap(blocks: &mut Vec<OpBlock>, a: Range<usize>, b: Range<usize>) {
    let tag = match (a.is_empty(), b.is_empty()) {
        (true, true) => return,
        (false, false) => BlockTag::Replace,
        (false, true) => BlockTag::Delete,
        (true, false) => BlockTag::Insert,
    };
    blocks.push(OpBlock { tag, a, b });
}
