//! Properties of the render pipeline that hold for any document.

use serde_json::{json, Value};

use comms_preview_service::render::{
    apply_format, extract_html, extract_plain_text, render_preview, substitute_placeholders,
    Branding, Content, PreviewInput, TextFormat, Variables,
};

fn vars(value: Value) -> Variables {
    Variables::from_json(&value).unwrap()
}

fn sample_documents() -> Vec<Value> {
    vec![
        Value::Null,
        json!("plain <b>text</b> with {{name}}"),
        json!({"root": {"type": "root", "children": []}}),
        json!({"root": {"type": "root", "children": [
            {"type": "heading", "tag": "h1", "children": [{"type": "text", "text": "Notice"}]},
            {"type": "paragraph", "children": []},
            {"type": "paragraph", "children": []},
            {"type": "paragraph", "children": []},
            {"type": "paragraph", "children": [
                {"type": "text", "text": "Dear "},
                {"type": "inlineBlock", "fields": {"blockType": "var", "variable": {"key": "name"}}},
                {"type": "linebreak"},
                {"type": "text", "text": "see {{name}}", "format": 2}
            ]},
            {"type": "list", "listType": "bullet", "children": [
                {"type": "listitem", "children": [{"type": "text", "text": "one"}]},
                {"type": "listitem", "children": [{"type": "text", "text": "two"}]}
            ]},
            {"type": "mystery", "body": {"type": "text", "text": "nested"}}
        ]}}),
        json!([{"type": "paragraph", "children": [{"type": "text", "text": "array root"}]}]),
        json!(42),
    ]
}

#[test]
fn test_rendering_is_deterministic() {
    let variables = vars(json!({"name": "Ana"}));
    let branding = Branding::default();

    for raw in sample_documents() {
        let body = Content::from_json(&raw);
        let input = PreviewInput {
            title: "Hi {{name}}",
            body: &body,
            buttons: &[],
            variables: &variables,
            branding: Some(&branding),
        };
        assert_eq!(render_preview(input), render_preview(input), "doc: {}", raw);
    }
}

#[test]
fn test_plain_text_never_has_triple_newlines() {
    let variables = vars(json!({"name": "Ana"}));
    for raw in sample_documents() {
        let text = extract_plain_text(&Content::from_json(&raw), &variables);
        assert!(!text.contains("\n\n\n"), "doc: {} text: {:?}", raw, text);
    }
}

#[test]
fn test_unresolved_variable_block_renders_placeholder() {
    let body = Content::from_json(&json!({"root": {"type": "root", "children": [
        {"type": "paragraph", "children": [
            {"type": "inlineBlock", "fields": {"blockType": "var", "variable": {"key": "missing"}}}
        ]}
    ]}}));

    let text = extract_plain_text(&body, &Variables::new());
    assert_eq!(text, "{{missing}}\n");

    let html = extract_html(&body, &Variables::new(), None);
    assert_eq!(html, "<p>{{missing}}</p>");
}

#[test]
fn test_literal_placeholders_in_text_are_untouched() {
    let body = Content::from_json(&json!({"root": {"type": "root", "children": [
        {"type": "paragraph", "children": [{"type": "text", "text": "Hi {{name}}"}]}
    ]}}));
    let text = extract_plain_text(&body, &vars(json!({"name": "Ana"})));
    assert_eq!(text, "Hi {{name}}\n");
}

#[test]
fn test_null_and_plain_bodies() {
    let variables = vars(json!({"name": "Ana"}));

    assert_eq!(extract_plain_text(&Content::Null, &variables), "");
    assert_eq!(extract_html(&Content::Null, &variables, None), "");

    let plain = Content::from_json(&json!("a <b> {{name}}"));
    assert_eq!(extract_plain_text(&plain, &variables), "a <b> {{name}}");
    assert_eq!(extract_html(&plain, &variables, None), "a &lt;b&gt; {{name}}");
}

#[test]
fn test_html_escapes_text_and_variables() {
    let body = Content::from_json(&json!({"root": {"type": "root", "children": [
        {"type": "paragraph", "children": [
            {"type": "text", "text": "<script>"},
            {"type": "inlineBlock", "fields": {"blockType": "var", "variable": {"key": "who"}}}
        ]}
    ]}}));
    let html = extract_html(&body, &vars(json!({"who": "a & b"})), None);
    assert_eq!(html, "<p>&lt;script&gt;a &amp; b</p>");
}

#[test]
fn test_format_bits_nest_bold_innermost() {
    assert_eq!(apply_format("x", TextFormat(0)), "x");
    assert_eq!(apply_format("x", TextFormat(1)), "<strong>x</strong>");
    assert_eq!(apply_format("x", TextFormat(9)), "<u><strong>x</strong></u>");
}

#[test]
fn test_substitution_preserves_shape() {
    let payload = json!({
        "{{name}}": ["{{name}}", 1, true, null, {"deep": "{{name}} / {{other}}"}]
    });
    let out = substitute_placeholders(&payload, &vars(json!({"name": "Ana"})));

    assert_eq!(
        out,
        json!({"{{name}}": ["Ana", 1, true, null, {"deep": "Ana / {{other}}"}]})
    );
}

#[test]
fn test_variables_reject_non_objects() {
    for bad in [json!([]), json!("x"), json!(1), json!(true)] {
        assert!(Variables::from_json(&bad).is_err(), "value: {}", bad);
    }
    assert!(Variables::from_json(&Value::Null).unwrap().is_empty());
}

#[test]
fn test_substitution_is_idempotent_when_all_keys_present() {
    let payload = json!({"title": "{{a}} and {{b}}", "items": ["{{a}}", {"x": "{{b}}-{{a}}"}]});
    let variables = vars(json!({"a": "1", "b": "two"}));

    let once = substitute_placeholders(&payload, &variables);
    let twice = substitute_placeholders(&once, &variables);
    assert_eq!(once, twice);
}
