use lazy_static::lazy_static;
use regex::Regex;

use crate::expr::{ExprRef, Query};

lazy_static! {
    // Matches loc:<N> or loc:<N>:branch:<B>
    static ref LOC_TAG: Regex = Regex::new(r"loc:(\d+)(:branch:(\d+))?").unwrap();
}

/// Sentinel returned when no expression carries a marker.
pub const UNKNOWN_LOCATION: &str = "loc:0";

fn scan_for_loc_tag(expr: &ExprRef) -> Option<String> {
    let text = expr.to_string();
    let caps = LOC_TAG.captures(&text)?;
    match caps.get(3) {
        Some(branch) => Some(format!("loc:{}:branch:{}", &caps[1], branch.as_str())),
        None => Some(format!("loc:{}", &caps[1])),
    }
}

/// Scan the rendered constraints, then the goal, for an observation
/// marker. The leftmost match in the first expression that has one
/// wins. Scanning text instead of structure keeps the rewriter
/// independent of how the engine encodes the marker.
pub fn extract_location(query: &Query) -> String {
    for constraint in query.constraints.iter() {
        if let Some(tag) = scan_for_loc_tag(constraint) {
            return tag;
        }
    }
    if let Some(tag) = scan_for_loc_tag(&query.expr) {
        return tag;
    }
    UNKNOWN_LOCATION.to_string()
}
