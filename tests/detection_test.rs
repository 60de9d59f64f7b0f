//! End-to-end detection scenarios.

#![allow(clippy::expect_used, clippy::unwrap_used)] // Clear panic messages in tests

use rs_patterns::{
    detect, detect_tree, detect_with_options, FieldValue, Options, Tree, NO_PATTERNS_WARNING,
};

const CARDS_HTML: &str = r#"<html><body>
<section class="cards">
  <div class="card"><h3>Title 1</h3><span data-id="1">Price 1</span></div>
  <div class="card"><h3>Title 2</h3><span data-id="2">Price 2</span></div>
  <div class="card"><h3>Title 3</h3><span data-id="3">Price 3</span></div>
</section>
</body></html>"#;

fn nested_list_html() -> String {
    let items: String = (1..=5)
        .map(|i| format!("<li><span>Name {i}</span><span>Price {i}</span><span>Stock {i}</span></li>"))
        .collect();
    format!("<ul>{items}</ul>")
}

fn both_presets() -> [Options; 2] {
    [Options::fingerprint(), Options::statistical()]
}

#[test]
fn test_cards_fingerprint() {
    let report = detect(CARDS_HTML).expect("detection should succeed");

    assert_eq!(report.containers.len(), 1);
    let container = &report.containers[0];
    assert_eq!(container.container_tag, "section");
    assert_eq!(container.unit_root_tag, "div");
    assert_eq!(container.unit_count, 3);
    assert_eq!(container.address.xpath(), "/html[1]/body[1]/section[1]");
    assert_eq!(
        container.css_path,
        "html:nth-of-type(1) > body:nth-of-type(1) > section:nth-of-type(1)"
    );
    assert_eq!(container.preview, r#"<section class="cards">"#);
    assert_eq!(container.dominant_fingerprint.as_deref(), Some("h3+span"));
    assert_eq!(
        container.variable_fields,
        vec![
            "h3_text[1]@text_content",
            "span[2]@data-id",
            "span_text[3]@text_content",
        ]
    );

    let group = &report.instances[0];
    assert_eq!(group.container_address, container.address);
    assert_eq!(group.instances.len(), 3);
    for (i, record) in group.instances.iter().enumerate() {
        let n = i + 1;
        assert_eq!(record.get("h3_text[1]@text_content").and_then(FieldValue::as_str), Some(format!("Title {n}").as_str()));
        assert_eq!(record.get("span[2]@data-id").and_then(FieldValue::as_str), Some(n.to_string().as_str()));
        assert_eq!(record.get("span_text[3]@text_content").and_then(FieldValue::as_str), Some(format!("Price {n}").as_str()));
        assert!(record.iter().all(|(_, v)| v.is_found()));
    }
}

#[test]
fn test_cards_statistical() {
    let report = detect_with_options(CARDS_HTML, &Options::statistical()).unwrap();

    assert_eq!(report.containers.len(), 1, "inner cards are nested candidates");
    let container = &report.containers[0];
    assert_eq!(container.container_tag, "section");
    assert_eq!(container.unit_count, 3);
    assert!(container.dominant_fingerprint.is_none());

    for key in ["h3@text_content", "span@data-id", "span@text_content"] {
        assert!(container.variable_fields.iter().any(|k| k == key), "missing {key}");
    }

    let titles: Vec<_> = report.instances[0]
        .instances
        .iter()
        .map(|r| r.get("h3@text_content").unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Title 1", "Title 2", "Title 3"]);
    assert!(report.instances[0]
        .instances
        .iter()
        .all(|r| r.iter().all(|(_, v)| v.is_found())));
}

#[test]
fn test_identical_children_are_not_reported() {
    let html = "<div><p>Hello</p><p>Hello</p><p>Hello</p></div>";

    for options in both_presets() {
        let report = detect_with_options(html, &options).unwrap();
        assert!(report.containers.is_empty(), "{:?}", options.strategy);
        assert!(report.instances.is_empty());
    }
}

#[test]
fn test_identical_attributed_children_are_not_reported() {
    let items = r#"<li class="item">Hello</li>"#.repeat(5);
    let html = format!("<ul>{items}</ul>");

    for options in both_presets() {
        let report = detect_with_options(&html, &options).unwrap();
        assert!(report.is_empty(), "{:?}", options.strategy);
    }
}

#[test]
fn test_empty_document() {
    for html in ["", "   \n", "<html></html>", "just some plain text"] {
        for options in both_presets() {
            let report = detect_with_options(html, &options).unwrap();
            assert!(report.containers.is_empty());
            assert!(report.instances.is_empty());
            assert_eq!(report.warnings, vec![NO_PATTERNS_WARNING.to_string()]);
        }
    }
}

#[test]
fn test_nested_container_reported_once() {
    let html = nested_list_html();

    for options in both_presets() {
        let report = detect_with_options(&html, &options).unwrap();
        assert_eq!(report.containers.len(), 1, "{:?}", options.strategy);
        assert_eq!(report.containers[0].container_tag, "ul");
        assert_eq!(report.containers[0].unit_count, 5);
        assert_eq!(report.instances.len(), 1);
    }
}

#[test]
fn test_sibling_containers_keep_distinct_addresses() {
    let list = "<ul><li>a</li><li>b</li><li>c</li></ul>";
    let html = format!("<div>{list}</div><div>{list}</div>");

    let report = detect(&html).unwrap();
    assert_eq!(report.containers.len(), 2);
    assert_ne!(report.containers[0].address, report.containers[1].address);
    assert_eq!(report.containers[0].address.xpath(), "/html[1]/body[1]/div[1]/ul[1]");
    assert_eq!(report.containers[1].address.xpath(), "/html[1]/body[1]/div[2]/ul[1]");
}

#[test]
fn test_uniform_instance_schema() {
    let html = "<ul>
        <li><b>Item 1</b><em>Offer 1</em></li>
        <li><b>Item 2</b></li>
        <li><b>Item 3</b><em>Offer 3</em></li>
        <li><b>Item 4</b></li>
    </ul>";

    let report = detect_with_options(html, &Options::statistical()).unwrap();
    assert_eq!(report.containers.len(), 1);

    let container = &report.containers[0];
    assert!(container.variable_fields.iter().any(|k| k == "em@text_content"));

    let group = &report.instances[0];
    for record in &group.instances {
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, container.variable_fields);
    }
    assert_eq!(group.instances[1].get("em@text_content"), Some(&FieldValue::NotFound));
    assert_eq!(
        group.instances[2].get("em@text_content"),
        Some(&FieldValue::Found("Offer 3".to_string()))
    );
}

#[test]
fn test_dominance_threshold_boundary() {
    // 3 of 5 children share a shape
    let html = "<div><p><i>1</i></p><p><i>2</i></p><p><i>3</i></p><span>a</span><em>b</em></div>";

    let at = Options {
        frequency_threshold: 0.6,
        ..Options::fingerprint()
    };
    let report = detect_with_options(html, &at).unwrap();
    assert_eq!(report.containers.len(), 1);
    assert_eq!(report.containers[0].unit_count, 3);
    assert_eq!(report.containers[0].unit_root_tag, "p");

    let above = Options {
        frequency_threshold: 0.61,
        ..Options::fingerprint()
    };
    assert!(detect_with_options(html, &above).unwrap().is_empty());
}

#[test]
fn test_minority_shapes_are_not_extracted() {
    let html = r#"<ul>
        <li><a href="/1">One</a></li>
        <li><a href="/2">Two</a></li>
        <li><a href="/3">Three</a></li>
        <li><b>Ad</b><i>x</i></li>
    </ul>"#;

    let report = detect(html).unwrap();
    assert_eq!(report.containers[0].unit_count, 3);
    let values: Vec<_> = report.instances[0]
        .instances
        .iter()
        .map(|r| r.get("a[0]@href").unwrap().to_string())
        .collect();
    assert_eq!(values, vec!["/1", "/2", "/3"]);
}

#[test]
fn test_determinism() {
    let html = format!("{CARDS_HTML}{}", nested_list_html());

    for options in both_presets() {
        let tree = Tree::parse(&html);
        let first = detect_tree(&tree, &options).unwrap();
        let second = detect_tree(&tree, &options).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_parallel_matches_sequential() {
    let html = format!("{CARDS_HTML}{}{CARDS_HTML}", nested_list_html());

    for options in both_presets() {
        let sequential = Options {
            parallel: false,
            ..options.clone()
        };
        assert_eq!(
            detect_with_options(&html, &options).unwrap(),
            detect_with_options(&html, &sequential).unwrap()
        );
    }
}

#[test]
fn test_results_are_ranked() {
    let html = format!("{CARDS_HTML}{}", nested_list_html());
    let report = detect(&html).unwrap();

    let counts: Vec<_> = report.containers.iter().map(|c| c.unit_count).collect();
    assert_eq!(counts, vec![5, 3]);
    for (container, group) in report.containers.iter().zip(&report.instances) {
        assert_eq!(container.address, group.container_address);
        assert_eq!(container.unit_count, group.instances.len());
    }
}

#[test]
fn test_detect_document() {
    let document = rs_patterns::dom::parse(CARDS_HTML);
    let report = rs_patterns::detect_document(&document, &Options::default()).unwrap();
    assert_eq!(report.containers.len(), 1);
}

#[test]
fn test_indexed_keys_drop_fields_shifted_by_stray_text() {
    // The second card has a whitespace text node before its span
    let html = "<section>
        <div><h3>Title 1</h3><span>Price 1</span></div>
        <div><h3>Title 2</h3> <span>Price 2</span></div>
        <div><h3>Title 3</h3><span>Price 3</span></div>
    </section>";

    let report = detect(html).unwrap();
    let container = &report.containers[0];
    assert_eq!(container.unit_count, 3);
    assert_eq!(container.variable_fields, vec!["h3_text[1]@text_content"]);
    for key in ["span_text[3]@text_content", "span_text[4]@text_content"] {
        assert!(container.noise_fields.iter().any(|k| k == key), "missing {key}");
    }
    assert!(report.instances[0].instances.iter().all(|r| r.len() == 1));

    // Path keys are unaffected by the shift
    let options = Options {
        key_style: rs_patterns::KeyStyle::Path,
        ..Options::fingerprint()
    };
    let report = detect_with_options(html, &options).unwrap();
    let prices: Vec<_> = report.instances[0]
        .instances
        .iter()
        .map(|r| r.get("span@text_content").unwrap().to_string())
        .collect();
    assert_eq!(prices, vec!["Price 1", "Price 2", "Price 3"]);
}
