//! "Did you mean" hints for unknown palette names and color codes.

/// Edit distance between `a` and `b`, ignoring ASCII case.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().map(|c| c.to_ascii_lowercase()).collect();
    let b: Vec<char> = b.chars().map(|c| c.to_ascii_lowercase()).collect();
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }

    // Single row; `diag` holds the previous row's value at j - 1.
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.iter().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let substitute = diag + usize::from(ca != cb);
            row[j + 1] = substitute.min(above + 1).min(row[j] + 1);
            diag = above;
        }
    }
    row[b.len()]
}

/// Largest edit distance still worth suggesting for a query of this length.
fn tolerance(query: &str) -> usize {
    ((query.chars().count() + 1) / 3).max(1)
}

/// Up to three candidates close to `query`, nearest first. Equal distances
/// keep candidate order.
pub fn suggest<'a, I>(query: &str, candidates: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let limit = tolerance(query);
    let mut scored: Vec<(usize, &str)> = candidates
        .into_iter()
        .map(|c| (edit_distance(query, c), c))
        .filter(|&(d, _)| d <= limit)
        .collect();
    scored.sort_by_key(|&(d, _)| d);
    scored.into_iter().take(3).map(|(_, c)| c).collect()
}

/// Format suggestions as a hint sentence, or `None` when there are none.
pub fn did_you_mean<'a, I>(query: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let found = suggest(query, candidates);
    let quoted: Vec<String> = found.iter().map(|s| format!("'{s}'")).collect();
    match quoted.as_slice() {
        [] => None,
        [one] => Some(format!("Did you mean {one}?")),
        [init @ .., last] => Some(format!("Did you mean {} or {last}?", init.join(", "))),
    }
}
