//! End-to-end tests: definitions file -> registry -> document pass -> glossary.

use std::io::Write;

use acronyms::{
    Config, Definitions, Document, Registry, RenderError, SortCriterion, SortError, Style,
    convert, domain::style::Name, pass::Block,
};

const DEFINITIONS: &str = "\
acronyms:
  - key: RL
    shortname: RL
    longname: Reinforcement Learning
  - key: GPU
    shortname: GPU
    longname: \"*Graphics* Processing Unit\"
  - key: ML
    shortname: ML
    longname: Machine Learning
";

fn registry() -> Registry {
    let mut registry = Registry::new();
    Definitions::from_yaml_str(DEFINITIONS)
        .unwrap()
        .register_into(&mut registry, true)
        .unwrap();
    registry
}

fn config(style: Style) -> Config {
    let mut config = Config::default();
    config.set_style(style);
    config.insert_links = false;
    config
}

fn render(source: &str, registry: &mut Registry, config: &Config) -> String {
    convert(&Document::parse(source, true), registry, config)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[test]
fn long_short_document() {
    let mut registry = registry();
    let out = render(
        "\\acr{RL} agents use \\acr{GPU}s.\n\nMore \\acr{RL}.",
        &mut registry,
        &config(Style::LongShort),
    );
    assert_eq!(
        out,
        "Reinforcement Learning (RL) agents use *Graphics* Processing Unit (GPU)s.\n\nMore RL."
    );
}

#[test]
fn links_point_at_glossary_entries() {
    let mut registry = registry();
    let mut config = config(Style::ShortLong);
    config.insert_links = true;

    let out = render(
        "\\acr{RL} and \\acr{RL}.\n\n\\printacronyms",
        &mut registry,
        &config,
    );

    assert_eq!(
        out,
        "[RL (Reinforcement Learning)](#acronyms_RL) and [RL](#acronyms_RL).\n\n\
         # List of Acronyms\n\n\
         [GPU]{#acronyms_GPU}\n:   *Graphics* Processing Unit\n\n\
         [ML]{#acronyms_ML}\n:   Machine Learning\n\n\
         [RL]{#acronyms_RL}\n:   Reinforcement Learning"
    );
}

#[test]
fn usage_order_follows_document_order() {
    let mut registry = registry();
    render(
        "[!ML] then [!RL] then [!ML] again.",
        &mut registry,
        &config(Style::LongShort),
    );

    let ml = registry.lookup("ML").unwrap().usage_order().unwrap();
    let rl = registry.lookup("RL").unwrap().usage_order().unwrap();
    assert!(ml < rl);
    assert_eq!(registry.lookup("GPU").unwrap().usage_order(), None);
}

#[test]
fn formatted_plural_without_variant_aborts_the_pass() {
    let mut registry = registry();
    let err = convert(
        &Document::parse("Fine: \\acr{RL}.\n\nBroken: \\acrs{GPU}.", true),
        &mut registry,
        &config(Style::LongShort),
    )
    .unwrap_err();

    assert_eq!(
        err.to_string(),
        RenderError::MissingPluralVariant {
            key: "GPU".parse().unwrap(),
            name: Name::Long,
        }
        .to_string()
    );
}

#[test]
fn usage_glossary_including_unused_is_rejected() {
    let mut registry = registry();
    let mut config = config(Style::LongShort);
    config.set_sorting(SortCriterion::Usage);
    config.include_unused = true;

    let err = convert(
        &Document::parse("\\acr{RL}\n\n\\printacronyms", true),
        &mut registry,
        &config,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        acronyms::PassError::Sort(SortError::InvalidConfiguration(_))
    ));
}

#[test]
fn short_footnote_document() {
    let mut registry = registry();
    let blocks = convert(
        &Document::parse("\\acr{RL} is used. \\acr{RL} again.", true),
        &mut registry,
        &config(Style::ShortFootnote),
    )
    .unwrap();

    assert_eq!(
        blocks,
        [Block::Paragraph(
            acronyms::RichText::from(vec![
                acronyms::domain::Inline::text("RL"),
                acronyms::domain::Inline::Note(
                    acronyms::RichText::plain("RL")
                        .concat(acronyms::RichText::plain(": "))
                        .concat(acronyms::RichText::plain("Reinforcement Learning"))
                ),
                acronyms::domain::Inline::text(" is used. RL again."),
            ])
        )]
    );
}

#[test]
fn config_and_definitions_from_files() {
    let dir = tempfile::tempdir().unwrap();

    let config_path = dir.path().join("acronyms.toml");
    std::fs::write(
        &config_path,
        "_version = \"1\"\nstyle = \"long-long\"\ninsert_links = false\n",
    )
    .unwrap();

    let definitions_path = dir.path().join("definitions.yaml");
    let mut file = std::fs::File::create(&definitions_path).unwrap();
    file.write_all(DEFINITIONS.as_bytes()).unwrap();

    let config = Config::load(&config_path).unwrap();
    let mut registry = Registry::new();
    Definitions::load(&definitions_path)
        .unwrap()
        .register_into(&mut registry, config.parse_markdown)
        .unwrap();

    let out = render("\\acr{ML}, \\acr{ML}.", &mut registry, &config);
    assert_eq!(out, "Machine Learning, Machine Learning.");
}

#[test]
fn literal_names_stay_literal_in_the_output() {
    let mut registry = Registry::new();
    Definitions::from_yaml_str(
        "acronyms:\n  - {key: C, shortname: C, longname: '*literally*', parse_markdown: false}\n",
    )
    .unwrap()
    .register_into(&mut registry, true)
    .unwrap();

    let out = render("\\acr{C}", &mut registry, &config(Style::LongShort));

    assert_eq!(out, "\\*literally\\* (C)");
    assert_eq!(
        acronyms::RichText::from_markdown(&out).stringify(),
        "*literally* (C)"
    );
}

#[test]
fn document_structure_is_preserved_around_references() {
    let mut registry = registry();
    let out = render(
        "# Introduction\n\n- first \\acr{RL}\n- second `code`\n\n> quoted \\acr{RL}\n",
        &mut registry,
        &config(Style::LongShort),
    );

    assert_eq!(
        out,
        "# Introduction\n\n\
         - first Reinforcement Learning (RL)\n- second `code`\n\n\
         > quoted RL"
    );
}
