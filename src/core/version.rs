//! Natural ("human") ordering of version strings.
//!
//! Recipe versions are free-form directory names, not semver, so "latest"
//! is decided by comparing digit runs numerically and everything else
//! lexically: `1.9 < 1.10`, `2.0-rc2 < 2.0-rc10`.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut digits: Option<bool> = None;

    for (i, c) in s.char_indices() {
        let is_digit = c.is_ascii_digit();
        match digits {
            Some(prev) if prev != is_digit => {
                out.push(chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        digits = Some(is_digit);
    }

    if let Some(prev) = digits {
        out.push(chunk(&s[start..], prev));
    }

    out
}

fn chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Number(s)
    } else {
        Chunk::Text(s)
    }
}

/// Compare two digit runs by numeric value without overflowing.
fn cmp_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compare two strings in natural order.
///
/// Falls back to a plain byte comparison when the chunks tie (e.g. `01`
/// vs `1`) so the ordering stays total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Number(x), Chunk::Number(y)) => cmp_numeric(x, y),
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

/// Sort version strings in natural order.
pub fn sort_natural<S: AsRef<str>>(versions: &mut [S]) {
    versions.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

/// Pick the latest version: the last one in natural order.
pub fn latest<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions.into_iter().max_by(|a, b| natural_cmp(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_runs() {
        assert_eq!(natural_cmp("1.9", "1.10"), Ordering::Less);
        assert_eq!(natural_cmp("1.10", "1.9"), Ordering::Greater);
        assert_eq!(natural_cmp("4.27", "4.27"), Ordering::Equal);
        assert_eq!(natural_cmp("2.0-rc2", "2.0-rc10"), Ordering::Less);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("1.0", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn test_leading_zeros_stay_total() {
        assert_eq!(natural_cmp("01", "1"), Ordering::Less);
        assert_ne!(natural_cmp("1.01", "1.1"), Ordering::Equal);
    }

    #[test]
    fn test_huge_numbers_do_not_overflow() {
        assert_eq!(
            natural_cmp("99999999999999999999999", "100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn test_sort_and_latest() {
        let mut versions = vec!["1.10.0", "1.2.0", "1.9.3", "0.9"];
        sort_natural(&mut versions);
        assert_eq!(versions, vec!["0.9", "1.2.0", "1.9.3", "1.10.0"]);

        assert_eq!(latest(["1.2.11", "1.2.13", "1.2.9"]), Some("1.2.13"));
        assert_eq!(latest(std::iter::empty()), None);
    }
}
