use super::types::Flow;

/// Minimum query length for plain substring matching.
const MIN_CONTAINS_LEN: usize = 3;

/// Resolves a flow by a loosely typed name.
///
/// Tiers, first hit wins: exact name, name starting with the query, name
/// containing the query (queries of at least three characters only), and
/// finally a name the query itself contains. In the last tier several flows
/// can match; the longest name wins and store order breaks ties.
pub fn find_by_name<'a>(flows: &'a [Flow], query: &str) -> Option<&'a Flow> {
    let query = normalize(query);
    if query.is_empty() {
        return None;
    }

    let lowered: Vec<(String, &Flow)> = flows
        .iter()
        .map(|flow| (flow.name.trim().to_lowercase(), flow))
        .collect();

    if let Some((_, flow)) = lowered.iter().find(|(name, _)| *name == query) {
        return Some(flow);
    }
    if let Some((_, flow)) = lowered.iter().find(|(name, _)| name.starts_with(&query)) {
        return Some(flow);
    }
    if query.chars().count() >= MIN_CONTAINS_LEN {
        if let Some((_, flow)) = lowered.iter().find(|(name, _)| name.contains(&query)) {
            return Some(flow);
        }
    }

    let mut best: Option<(usize, &Flow)> = None;
    for (name, flow) in &lowered {
        if name.is_empty() || !query.contains(name.as_str()) {
            continue;
        }
        let len = name.chars().count();
        if best.map_or(true, |(best_len, _)| len > best_len) {
            best = Some((len, flow));
        }
    }
    best.map(|(_, flow)| flow)
}

/// Every flow whose name contains the query or is contained in it.
pub fn find_all_by_name<'a>(flows: &'a [Flow], query: &str) -> Vec<&'a Flow> {
    let query = normalize(query);
    if query.is_empty() {
        return Vec::new();
    }
    flows
        .iter()
        .filter(|flow| {
            let name = flow.name.trim().to_lowercase();
            !name.is_empty() && (name.contains(&query) || query.contains(&name))
        })
        .collect()
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flows(names: &[&str]) -> Vec<Flow> {
        names.iter().map(|name| Flow::new(*name)).collect()
    }

    #[test]
    fn exact_match_beats_prefix_and_substring() {
        let flows = flows(&["Star Burst", "My Star", "Star"]);
        let found = find_by_name(&flows, "  STAR ").unwrap();
        assert_eq!(found.name, "Star");
    }

    #[test]
    fn prefix_before_substring() {
        let flows = flows(&["My Star", "Star Burst"]);
        assert_eq!(find_by_name(&flows, "sta").unwrap().name, "Star Burst");
    }

    #[test]
    fn short_query_skips_substring_tier() {
        let flows = flows(&["My Star"]);
        assert!(find_by_name(&flows, "ta").is_none());
        assert_eq!(find_by_name(&flows, "y st").unwrap().name, "My Star");
    }

    #[test]
    fn reverse_containment_prefers_longest_name() {
        let flows = flows(&["duck", "draw a duck", "draw"]);
        let found = find_by_name(&flows, "please draw a duck now").unwrap();
        assert_eq!(found.name, "draw a duck");
    }

    #[test]
    fn empty_query_matches_nothing() {
        let flows = flows(&["Star"]);
        assert!(find_by_name(&flows, "   ").is_none());
        assert!(find_all_by_name(&flows, "").is_empty());
    }

    #[test]
    fn find_all_matches_both_directions() {
        let flows = flows(&["Star", "Star Burst", "Circle", "burst"]);
        let names: Vec<&str> = find_all_by_name(&flows, "star burst")
            .into_iter()
            .map(|flow| flow.name.as_str())
            .collect();
        assert_eq!(names, vec!["Star", "Star Burst", "burst"]);
    }
}
