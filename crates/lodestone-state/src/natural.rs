use std::cmp::Ordering;

/// Human ordering: digit runs compare by numeric value (`"2" < "10"`), text
/// runs compare case-insensitively. Strings that tie under those rules fall
/// back to byte order so the result stays a total order.
pub fn human_cmp(a: &str, b: &str) -> Ordering {
    let mut ra = Runs::new(a);
    let mut rb = Runs::new(b);
    loop {
        match (ra.next(), rb.next()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = cmp_run(x, y);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
    a.cmp(b)
}

/// Sorts `(key, value)` pairs by key in human order.
pub fn sort_human<V>(pairs: &mut [(String, V)]) {
    pairs.sort_by(|x, y| human_cmp(&x.0, &y.0));
}

fn cmp_run(x: &str, y: &str) -> Ordering {
    let xd = x.as_bytes()[0].is_ascii_digit();
    let yd = y.as_bytes()[0].is_ascii_digit();
    match (xd, yd) {
        (true, true) => {
            let xs = x.trim_start_matches('0');
            let ys = y.trim_start_matches('0');
            xs.len().cmp(&ys.len()).then_with(|| xs.cmp(ys))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(y.chars().flat_map(char::to_lowercase)),
    }
}

/// Splits a string into maximal runs of ASCII digits and non-digits.
struct Runs<'a> {
    rest: &'a str,
}

impl<'a> Runs<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Runs<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.as_bytes().first()?;
        let digit = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digit)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());
        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(run)
    }
}
