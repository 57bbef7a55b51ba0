//! The fixed runtime helper emitted into every target file, and the
//! indentation pass that turns a flat line list into formatted Java
//! source.

/// `subList` only covers a contiguous forward range with step 1;
/// anything with an explicit step (or a negative bound) goes through
/// this helper instead.
pub fn step_method_lines() -> Vec<String> {
    [
        "static ArrayList step_method(ArrayList lst, int p_start, int p_end, int step) {",
        "ArrayList return_lst = new ArrayList()",
        "if (step == 0) {",
        "throw new IllegalArgumentException(\"step_method() cannot have step param be 0!\")",
        "}",
        "int start = p_start",
        "int end = p_end",
        "if (start < 0) {",
        "start = lst.size() - p_start",
        "}",
        "if (end < 0) {",
        "end = lst.size() - p_end",
        "}",
        "if (step > 0) {",
        "for (int index = start; index < end; index += step) {",
        "return_lst.add(lst.get(index))",
        "}",
        "}",
        "else {",
        "for (int index = start; index > end; index += step) {",
        "return_lst.add(lst.get(index))",
        "}",
        "}",
        "return return_lst",
        "}",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Indents every line by its brace nesting depth and appends the
/// trailing `;`/newline a bare statement line needs (a line already
/// ending in `{` or `}` gets neither).
pub fn format_lines(lines: &[String], indents: &mut usize) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        if line.ends_with('{') {
            out.push(format!("{}{}\n", "    ".repeat(*indents), line));
            *indents += 1;
        } else if line.ends_with('}') {
            *indents = indents.saturating_sub(1);
            out.push(format!("{}{}\n", "    ".repeat(*indents), line));
        } else {
            out.push(format!("{}{};\n", "    ".repeat(*indents), line));
        }
    }
    out
}
