//! Ruge-Stuben C/F splitting (§4.3, §4.4): maximal-independent-set first
//! pass followed by the interpolation-consistency repair pass.

use crate::sets::IndexSet;
use log::debug;

/// Result of the two-pass C/F splitting: disjoint coarse/fine point sets plus
/// the coarse-interpolatory (`ci`) and strong-non-interpolatory (`ds`) sets
/// derived from `s` and the final `c`.
pub struct Splitting {
    pub c: IndexSet,
    pub f: IndexSet,
    pub ci: Vec<IndexSet>,
    pub ds: Vec<IndexSet>,
}

/// Run both passes of C/F splitting over `n` points given their strong
/// dependence (`s`) and strong influence (`st`) sets.
pub fn split(n: usize, s: &[IndexSet], st: &[IndexSet]) -> Splitting {
    let (c, f) = first_pass(n, s, st);
    let (c, f, ci, ds) = second_pass(n, s, c, f);
    debug!("C/F split: |C|={} |F|={}", c.cardinality(), f.cardinality());
    Splitting { c, f, ci, ds }
}

/// First pass: greedy lambda-measure maximal independent set selection.
/// Ties on `argmax` break on the first occurrence in index order.
fn first_pass(n: usize, s: &[IndexSet], st: &[IndexSet]) -> (IndexSet, IndexSet) {
    let mut lambda: Vec<i64> = st.iter().map(|set| set.cardinality() as i64).collect();
    let mut c = IndexSet::new();
    let mut f = IndexSet::new();
    let mut in_cf = vec![false; n];

    loop {
        let (best_idx, best_val) = lambda
            .iter()
            .enumerate()
            .fold((0usize, i64::MIN), |(bi, bv), (i, &v)| {
                if v > bv {
                    (i, v)
                } else {
                    (bi, bv)
                }
            });
        if best_val == -1 {
            break;
        }

        let i = best_idx;
        c.push(i);
        in_cf[i] = true;

        let mut new_f = Vec::new();
        for &j in st[i].as_slice() {
            if !in_cf[j] {
                new_f.push(j);
                in_cf[j] = true;
                f.push(j);
            }
        }

        lambda[i] = -1;
        for &j in &new_f {
            lambda[j] = -1;
        }
        for &j in &new_f {
            for &k in s[j].as_slice() {
                if !in_cf[k] {
                    lambda[k] += 1;
                }
            }
        }
    }

    c.sort();
    f.sort();
    (c, f)
}

/// Derive `ci[i] = s[i] ∩ c` and `ds[i] = s[i] \ c` for every row.
fn coarse_strong_dependence(n: usize, s: &[IndexSet], c: &IndexSet) -> (Vec<IndexSet>, Vec<IndexSet>) {
    let mut ci = vec![IndexSet::new(); n];
    let mut ds = vec![IndexSet::new(); n];
    for i in 0..n {
        for &j in s[i].as_slice() {
            if c.contains(j) {
                ci[i].push(j);
            } else {
                ds[i].push(j);
            }
        }
    }
    (ci, ds)
}

/// Second pass: promote F-points that share no coarse-interpolatory neighbor
/// with one of their strong non-interpolatory neighbors. Promotion happens
/// once per F-point, on the first witnessing neighbor (further neighbors are
/// skipped for that point).
fn second_pass(
    n: usize,
    s: &[IndexSet],
    mut c: IndexSet,
    mut f: IndexSet,
) -> (IndexSet, IndexSet, Vec<IndexSet>, Vec<IndexSet>) {
    let (mut ci, mut ds) = coarse_strong_dependence(n, s, &c);

    for idx in 0..f.cardinality() {
        let fi = f.get(idx).expect("index within current cardinality");
        let mut promoted = false;
        let neighbors: Vec<usize> = ds[fi].as_slice().to_vec();
        for g in neighbors {
            if promoted {
                break;
            }
            if IndexSet::intersection(&ci[fi], &ci[g]).is_empty() {
                promoted = true;
                c.push(fi);
                for k in 0..n {
                    if ds[k].contains(fi) {
                        ci[k].push(fi);
                        ds[k].delete(fi).expect("fi was just confirmed present");
                    }
                }
            }
        }
    }

    c.sort();
    f = IndexSet::difference(&f, &c);
    f.sort();

    (c, f, ci, ds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mkset(items: &[usize]) -> IndexSet {
        let mut s = IndexSet::from_vec(items.to_vec());
        s.sort();
        s
    }

    #[test]
    fn first_pass_covers_every_index_disjointly() {
        // line graph 0-1-2-3-4, symmetric strong connections both ways.
        let s = vec![
            mkset(&[1]),
            mkset(&[0, 2]),
            mkset(&[1, 3]),
            mkset(&[2, 4]),
            mkset(&[3]),
        ];
        let st = s.clone();
        let (c, f) = first_pass(5, &s, &st);
        let union = IndexSet::union(&c, &f);
        assert_eq!(union.as_slice(), &[0, 1, 2, 3, 4]);
        assert!(IndexSet::intersection(&c, &f).is_empty());
    }

    #[test]
    fn second_pass_guarantees_shared_coarse_neighbor() {
        let s = vec![
            mkset(&[1]),
            mkset(&[0, 2]),
            mkset(&[1, 3]),
            mkset(&[2, 4]),
            mkset(&[3]),
        ];
        let st = s.clone();
        let splitting = split(5, &s, &st);
        for &fi in splitting.f.as_slice() {
            for &g in splitting.ds[fi].as_slice() {
                let shared = IndexSet::intersection(&splitting.ci[fi], &splitting.ci[g]);
                assert!(
                    !shared.is_empty(),
                    "F-point {fi} shares no C-interpolatory neighbor with {g}"
                );
            }
        }
    }
}
