use std::fs;
use std::path::Path;
use std::sync::Arc;

use anchorage::catalog::{extract_catalog, Dataset, Names, ANCHORS_FILE};
use anchorage::format::{Format, Json};
use anchorage::reference::{all_anchors_adoc, llms_txt, LlmsInput};
use anchorage::search::IndexState;
use anchorage::source::DirSource;
use anchorage::{AppState, CatalogEntry, Conversion};

const TDD: &str = "\
= TDD, London School
:categories: testing-quality
:roles: software-developer, qa-engineer
:proponents: Steve Freeman, Nat Pryce
:tags: testing, mocks

[%collapsible]
====
*Core Concepts*:

* Outside-in development, starting from acceptance tests
* Mock collaborators to discover interfaces

See <<hexagonal-architecture,Ports and Adapters>>.
====
";

const HEXAGONAL: &str = "\
= Hexagonal Architecture
:categories: architecture-design
:roles: software-architect
:proponents: Alistair Cockburn
:related: tdd-london-school

The application core talks to the world through ports.
";

const NO_ROLES: &str = "\
= Broken
:categories: architecture-design
";

fn write(root: &Path, path: &str, contents: &str) {
    let path = root.join(path);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn catalog_to_search() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "docs/anchors/tdd-london-school.adoc", TDD);
    write(root, "docs/anchors/tdd-london-school.de.adoc", "= TDD, Londoner Schule\n:roles: software-developer\n");
    write(root, "docs/anchors/hexagonal-architecture.adoc", HEXAGONAL);
    write(root, "docs/anchors/_template.adoc", "= Template\n");

    // extraction and the derived dataset
    let extraction = extract_catalog(&root.join("docs/anchors")).unwrap();
    assert!(extraction.errors.is_empty());
    let entries = extraction.into_entries().unwrap();
    let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["hexagonal-architecture", "tdd-london-school"]);

    let dataset = Dataset::build(entries, &Names::default());
    dataset.write(&root.join("data")).unwrap();
    let written: Vec<CatalogEntry> = Json::read(root.join("data").join(ANCHORS_FILE)).unwrap();
    assert_eq!(written, dataset.entries);
    assert_eq!(dataset.summary.counts.anchors, 2);
    assert_eq!(dataset.roles.len(), 3);

    // reference documents
    let adoc = all_anchors_adoc(&dataset.categories, |id| {
        root.join("docs/anchors").join(format!("{id}.adoc")).is_file()
    });
    assert!(adoc.contains("include::anchors/tdd-london-school.adoc[leveloffset=+2]"));

    let sources = dataset.entries.iter()
        .map(|e| (e.id.clone(), fs::read_to_string(root.join(&e.source_path)).unwrap()))
        .collect();

    let llms = llms_txt(&LlmsInput {
        categories: &dataset.categories,
        about: "= About\n\nTerms with meaning.",
        sources: &sources,
        conversion: &Conversion::default(),
    });

    assert!(llms.contains("### TDD, London School\n"));
    assert!(llms.contains("**Core Concepts**:"));
    assert!(llms.contains("See Ports and Adapters."));
    assert!(!llms.contains(":roles:"));
    assert!(!llms.contains("===="));

    // the reading side, over the same tree
    let state = AppState::new(Arc::new(DirSource::new(root)), "data");
    let data = state.loader().load().await.unwrap();
    assert_eq!(data.entries.len(), 2);

    let index = state.search_index();
    assert_eq!(index.state(), IndexState::NotBuilt);
    assert_eq!(index.search_or_filter("hexagonal", &data.entries), ["hexagonal-architecture"]);

    index.build(&data.entries).await;
    assert_eq!(index.len(), 2);
    assert_eq!(index.search("freeman"), ["tdd-london-school"]);
    assert_eq!(index.search("ports"), ["hexagonal-architecture", "tdd-london-school"]);
    assert_eq!(index.search("outside-in mock"), ["tdd-london-school"]);
    assert!(index.search("cockburn freeman").is_empty());
}

#[test]
fn invalid_documents_fail_the_extraction() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.adoc", HEXAGONAL);
    write(dir.path(), "broken.adoc", NO_ROLES);

    let extraction = extract_catalog(dir.path()).unwrap();
    assert_eq!(extraction.entries.len(), 1);
    assert_eq!(extraction.errors.len(), 1);
    assert_eq!(extraction.errors[0].file, "broken.adoc");

    let error = extraction.into_entries().unwrap_err();
    assert!(error.to_string().contains("broken.adoc: Missing :roles: attribute"));
}
