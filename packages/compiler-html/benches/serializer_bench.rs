use criterion::{black_box, criterion_group, criterion_main, Criterion};
use folio_compiler_html::{compile_to_html, parse_inline, parse_markdown_table, CompileOptions};
use folio_document::{ContainerNode, IdGenerator, InlineRun, Node, TextNode};

fn sample_document(blocks: usize) -> Node {
    let children = (0..blocks)
        .map(|i| {
            TextNode::paragraph(format!("p{}", i), "")
                .with_runs(vec![
                    InlineRun::plain("Some plain text, then "),
                    InlineRun::plain("bold").bold(),
                    InlineRun::plain(" and a "),
                    InlineRun::plain("link").with_href("https://example.com"),
                ])
                .into()
        })
        .collect();
    Node::Container(ContainerNode::new("root").with_children(children))
}

fn compile_document(c: &mut Criterion) {
    let root = sample_document(200);
    let options = CompileOptions::default();

    c.bench_function("compile_200_blocks", |b| {
        b.iter(|| compile_to_html(black_box(&root), &options))
    });
}

fn parse_surface_markup(c: &mut Criterion) {
    let markup = r#"Hello <strong>bold <em>both</em></strong> <a href="/x">link</a><br>second &amp; line"#;

    c.bench_function("parse_inline", |b| b.iter(|| parse_inline(black_box(markup))));
}

fn parse_table(c: &mut Criterion) {
    let mut source = String::from("| a | b | c |\n|---|:-:|--:|\n");
    for i in 0..100 {
        source.push_str(&format!("| {} | {} | {} |\n", i, i * 2, i * 3));
    }

    c.bench_function("parse_markdown_table_100_rows", |b| {
        b.iter(|| {
            let mut ids = IdGenerator::new("root");
            parse_markdown_table(black_box(&source), &mut ids)
        })
    });
}

criterion_group!(benches, compile_document, parse_surface_markup, parse_table);
criterion_main!(benches);
