use ariadne::{sources, Config, Label, Report, ReportKind};

use crate::dead_code::DeadCode;

// assumes results to be sorted by occurrence in file
pub fn print(file: String, content: &str, results: &[DeadCode]) {
    let first_result_offset = results[0].ident_range.start;
    let mut builder = Report::build(ReportKind::Warning, file.clone(), first_result_offset)
        .with_config(Config::default().with_compact(true))
        .with_message("Unused declarations were found.");

    // advance into content to convert byte offsets into char offsets
    let mut content_bytes = 0;
    let mut content_chars = 0usize;
    let mut char_bytes = content.chars().map(char::len_utf8);
    // reverse order to avoid overlapping lanes
    let mut order = results.len();
    for result in results {
        order -= 1;

        let range = &result.ident_range;
        while content_bytes < range.start {
            content_bytes += char_bytes.next().unwrap();
            content_chars += 1;
        }
        let start_char = content_chars;
        while content_bytes < range.end {
            content_bytes += char_bytes.next().unwrap();
            content_chars += 1;
        }
        let end_char = content_chars;

        // add report label
        builder = builder.with_label(
            Label::new((file.clone(), start_char..end_char))
                .with_message(format!("{}", result))
                .with_color(result.scope_kind.color())
                .with_order(order as i32),
        );
    }

    // print
    builder
        .finish()
        .print(sources(vec![(file, content)]))
        .unwrap();
}

#[cfg(feature = "json-out")]
pub fn print_json(file: &str, content: &str, results: &[DeadCode]) {
    #[derive(serde::Serialize)]
    struct JsonResult<'a> {
        message: String,
        name: &'a str,
        scope: String,
        start: usize,
        end: usize,
        line: usize,
        column: usize,
    }

    let results = results
        .iter()
        .map(|result| {
            let (line, column) = line_col(content, result.ident_range.start);
            JsonResult {
                message: result.to_string(),
                name: &result.name,
                scope: result.scope_kind.to_string(),
                start: result.ident_range.start,
                end: result.ident_range.end,
                line,
                column,
            }
        })
        .collect::<Vec<_>>();
    println!(
        "{}",
        serde_json::json!({
            "file": file,
            "results": results,
        })
    );
}

/// 1-based line and column of a byte offset
#[cfg(feature = "json-out")]
fn line_col(content: &str, byte: usize) -> (usize, usize) {
    let prefix = &content[..byte];
    let line = prefix.bytes().filter(|&b| b == b'\n').count() + 1;
    let column = byte - prefix.rfind('\n').map_or(0, |newline| newline + 1) + 1;
    (line, column)
}
