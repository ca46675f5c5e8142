use crate::types::Word;

/// Resolve ambiguous placement of not-found-in-audio runs.
///
/// The diff aligner has no timing awareness inside a run, so a repeated word
/// ("really really" with only one occurrence spoken) can get its timing
/// attached to the wrong occurrence, leaving an implausibly large gap around
/// the unaligned run. This pass walks each maximal unaligned run and swaps
/// alignment-derived fields with a matching neighboring subsequence when the
/// neighbor's own outer gap is strictly larger than the run's gap. Greedy,
/// one swap per run, larger subsequences first; not globally optimal.
pub fn optimize(words: &mut [Word]) {
    let mut i = 0;
    while i < words.len() {
        if !words[i].is_not_found_in_audio() {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = start;
        while end < words.len() && words[end].is_not_found_in_audio() {
            end += 1;
        }
        match swap_run(words, start, end) {
            Some(Swap::Left { candidate_start }) => {
                // the swap exposed new unaligned words to our left; walk back
                // to the start of that region and reprocess
                let mut back = candidate_start;
                while back > 0 && words[back - 1].is_not_found_in_audio() {
                    back -= 1;
                }
                i = back;
            }
            _ => i = end,
        }
    }
}

enum Swap {
    Left { candidate_start: usize },
    Right,
}

/// Try to improve the run `[i, j)`. Larger swap sizes win over smaller, the
/// left side is tried before the right, and the first beneficial swap ends
/// the search.
fn swap_run(words: &mut [Word], i: usize, j: usize) -> Option<Swap> {
    let seq_gap = start_after(words, j) - end_before(words, i);

    for n in (1..=j - i).rev() {
        if i >= n {
            let cand = i - n;
            if all_success(&words[cand..i]) {
                if let Some(m) = matching_subsequence(words, cand, n, i, j) {
                    let neighbor_gap =
                        words[cand].start.unwrap_or(f64::NEG_INFINITY) - end_before(words, cand);
                    if neighbor_gap > seq_gap {
                        swap_ranges(words, cand, m, n);
                        return Some(Swap::Left {
                            candidate_start: cand,
                        });
                    }
                }
            }
        }
        if j + n <= words.len() && all_success(&words[j..j + n]) {
            if let Some(m) = matching_subsequence(words, j, n, i, j) {
                let neighbor_gap =
                    start_after(words, j + n) - words[j + n - 1].end.unwrap_or(f64::INFINITY);
                if neighbor_gap > seq_gap {
                    swap_ranges(words, j, m, n);
                    return Some(Swap::Right);
                }
            }
        }
    }
    None
}

/// Position `m` within `[i, j - n]` whose `n` words match the candidate's
/// text, case-insensitively.
fn matching_subsequence(
    words: &[Word],
    candidate: usize,
    n: usize,
    i: usize,
    j: usize,
) -> Option<usize> {
    (i..=j.checked_sub(n)?).find(|&m| {
        (0..n).all(|k| {
            words[m + k].word.to_lowercase() == words[candidate + k].word.to_lowercase()
        })
    })
}

fn all_success(words: &[Word]) -> bool {
    words.iter().all(Word::is_success)
}

/// End time of the nearest successful word before `idx`, or 0 at the
/// sequence edge.
fn end_before(words: &[Word], idx: usize) -> f64 {
    words[..idx]
        .iter()
        .rev()
        .find_map(|w| if w.is_success() { w.end } else { None })
        .unwrap_or(0.0)
}

/// Start time of the nearest successful word at or after `idx`. Infinite at
/// the sequence edge, which makes every swap comparison fail there.
fn start_after(words: &[Word], idx: usize) -> f64 {
    words[idx.min(words.len())..]
        .iter()
        .find_map(|w| if w.is_success() { w.start } else { None })
        .unwrap_or(f64::INFINITY)
}

/// Exchange the alignment-derived fields of `words[a..a+n]` and
/// `words[b..b+n]` pairwise. Text offsets and display words stay put.
fn swap_ranges(words: &mut [Word], a: usize, b: usize, n: usize) {
    for k in 0..n {
        swap_alignment(words, a + k, b + k);
    }
}

fn swap_alignment(words: &mut [Word], a: usize, b: usize) {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let (head, tail) = words.split_at_mut(hi);
    let x = &mut head[lo];
    let y = &mut tail[0];
    std::mem::swap(&mut x.case, &mut y.case);
    std::mem::swap(&mut x.aligned_word, &mut y.aligned_word);
    std::mem::swap(&mut x.conf, &mut y.conf);
    std::mem::swap(&mut x.start, &mut y.start);
    std::mem::swap(&mut x.end, &mut y.end);
    std::mem::swap(&mut x.duration, &mut y.duration);
}
