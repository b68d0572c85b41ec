/// Split one snapshot line into its fields.
///
/// Runs of spaces outside quotes separate fields and never produce empty
/// fields. A `"` toggles quoting and is not kept in the field, so spaces
/// between quotes stay part of the value. An unterminated quote makes the
/// rest of the line literal.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut field = String::new();

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ' ' if !in_quotes => {
                if !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                }
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() {
        fields.push(field);
    }

    fields
}

/// Split snapshot text into lines worth parsing: `\r\n` endings are
/// tolerated and lines that are blank after trimming are skipped.
pub fn data_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_spaces_are_kept() {
        assert_eq!(parse_line(r#"a "b c" d"#), vec!["a", "b c", "d"]);
    }

    #[test]
    fn unquoted_space_runs_collapse() {
        assert_eq!(parse_line("  12   34 56  "), vec!["12", "34", "56"]);
    }

    #[test]
    fn empty_line_yields_nothing() {
        assert!(parse_line("").is_empty());
        assert!(parse_line("     ").is_empty());
    }

    #[test]
    fn unterminated_quote_swallows_rest_of_line() {
        assert_eq!(parse_line(r#"x "open quote  here"#), vec!["x", "open quote  here"]);
    }

    #[test]
    fn quotes_inside_a_word_join_segments() {
        assert_eq!(parse_line(r#"Rosetta"@"home 5"#), vec!["Rosetta@home", "5"]);
    }

    #[test]
    fn empty_quoted_field_is_dropped() {
        assert_eq!(parse_line(r#"a "" b"#), vec!["a", "b"]);
    }

    #[test]
    fn tabs_are_not_separators() {
        assert_eq!(parse_line("a\tb c"), vec!["a\tb", "c"]);
    }

    #[test]
    fn data_lines_skip_blank_and_strip_cr() {
        let text = "2024-01-01 10\r\n\r\n   \n2024-01-02 20\n";
        let lines: Vec<&str> = data_lines(text).collect();
        assert_eq!(lines, vec!["2024-01-01 10", "2024-01-02 20"]);
    }
}
