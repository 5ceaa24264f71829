use mdpreview::markdown_to_html;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
struct Case {
    markdown: String,
    html: String,
    example: u32,
    section: String,
}

fn load_cases() -> Vec<Case> {
    let data = fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/cases.json"))
        .expect("Failed to read cases.json");
    serde_json::from_str(&data).expect("Failed to parse cases.json")
}

#[test]
fn conversion_cases() {
    let cases = load_cases();
    assert!(!cases.is_empty());

    let mut failures = Vec::new();

    for case in &cases {
        let result = markdown_to_html(&case.markdown);
        if result != case.html {
            eprintln!("\nExample {} failed ({})", case.example, case.section);
            eprintln!("  Input:    {:?}", case.markdown);
            eprintln!("  Expected: {:?}", case.html);
            eprintln!("  Got:      {:?}", result);
            failures.push(case.example);
        }
    }

    assert!(
        failures.is_empty(),
        "{} of {} examples failed: {:?}",
        failures.len(),
        cases.len(),
        failures
    );
}

#[test]
fn every_heading_level_round_trips() {
    for level in 1..=6 {
        let markdown = format!("{} Title", "#".repeat(level));
        assert_eq!(
            markdown_to_html(&markdown),
            format!("<h{level}>Title</h{level}>")
        );
    }
}

#[test]
fn alignment_applies_to_every_body_row() {
    let markdown = "| A | B | C |\n|:---|:---:|---:|\n| 1 | 2 | 3 |\n| 4 | 5 | 6 |\n| 7 | 8 | 9 |";
    let html = markdown_to_html(markdown);
    assert_eq!(html.matches("text-align: left;").count(), 4);
    assert_eq!(html.matches("text-align: center;").count(), 4);
    assert_eq!(html.matches("text-align: right;").count(), 4);
    assert!(html.contains("<td style=\"text-align: right;\">9</td>"));
}

#[test]
fn task_list_checkbox_state() {
    let html = markdown_to_html("- [x] done\n- [ ] todo");
    assert_eq!(html.matches("class=\"task-list-item\"").count(), 2);
    assert_eq!(html.matches(" checked>").count(), 1);
    assert!(html.contains("disabled checked> done"));
    assert!(html.contains("disabled> todo"));
}

#[test]
fn sample_document_converts() {
    let markdown = "\
# Heading 1

Paragraphs are separated by a blank line.

2nd paragraph. *Italic*, **bold**, `monospace`. Itemized lists look like:

* this one
* that one

> Block quotes are
> written like so.
>
> They can span multiple paragraphs,
> if you like.

```swift
func greet(name: String) -> String {
    return \"Hello, \\(name)!\"
}
```
";
    let html = markdown_to_html(markdown);
    assert!(html.starts_with("<h1>Heading 1</h1>\n<p>Paragraphs are separated"));
    assert!(html.contains("<em>Italic</em>, <strong>bold</strong>, <code>monospace</code>"));
    assert!(html.contains("<ul>\n<li>this one</li>\n<li>that one</li>\n</ul>"));
    assert!(html.contains("written like so.<br>\nThey can span"));
    assert!(html.contains(
        "<pre><code class=\"language-swift\">func greet(name: String) -&gt; String {\n    return &quot;Hello, \\(name)!&quot;\n}\n</code></pre>"
    ));
}
