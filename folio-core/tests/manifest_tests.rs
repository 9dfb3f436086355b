//! End-to-end tests for manifest generation, delivery and lookup.

use folio_core::markdown::codeblock::BlockKey;
use folio_core::markdown::highlight::{HighlightError, Highlighter};
use folio_core::provider::{read_artifact, write_artifact};
use folio_core::url::route_table;
use folio_core::{
    generate_manifest, render_post, ContentRoot, LookupService, ManifestError, ManifestOptions,
    ManifestProvider,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A site with a primary `posts` root and an aliased `notes` root.
fn sample_site(dir: &Path) -> ManifestOptions {
    let posts = dir.join("posts");
    let notes = dir.join("notes");

    write(&posts, "2024-03-05.my-post.mdx", "---\ntitle: My Post\n---\nHello\n");
    write(
        &posts,
        "about.md",
        "---\ntitle: About\nslug: about-me\ndate: 2023-01-01\n---\nAbout\n",
    );
    write(&posts, "guides/setup.md", "Setup guide\n");
    write(&notes, "2024-01-02.day-one.md", "Day one\n");

    ManifestOptions::new(vec![
        ContentRoot::new(&posts),
        ContentRoot::with_alias(&notes, "journal"),
    ])
}

#[test]
fn dated_filename_without_frontmatter_identity() {
    let dir = tempdir().unwrap();
    let options = sample_site(dir.path());
    let manifest = generate_manifest(&options).unwrap();

    let post = manifest.find_by_slug("my-post").unwrap();
    assert_eq!(post.url_path, "/my-post");
    assert_eq!(post.attributes.published_at.as_deref(), Some("2024-03-05"));
    assert_eq!(post.attributes.date.as_deref(), Some("2024-03-05T00:00:00.000Z"));
    assert_eq!(post.raw_body, "Hello\n");
}

#[test]
fn urls_follow_root_alias_rules() {
    let dir = tempdir().unwrap();
    let options = sample_site(dir.path());
    let manifest = generate_manifest(&options).unwrap();

    let urls: Vec<(&str, &str)> = manifest
        .files
        .iter()
        .map(|f| (f.slug.as_str(), f.url_path.as_str()))
        .collect();
    assert_eq!(
        urls,
        vec![
            ("my-post", "/my-post"),
            ("about-me", "/about-me"),
            ("guides/setup", "/guides/setup"),
            ("day-one", "/journal/day-one"),
        ]
    );
    assert!(manifest.files.iter().all(|f| f.url_path.starts_with('/')));
}

#[test]
fn regeneration_is_deterministic() {
    let dir = tempdir().unwrap();
    let options = sample_site(dir.path());

    let first = generate_manifest(&options).unwrap();
    let second = generate_manifest(&options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn artifact_and_live_paths_agree() {
    let dir = tempdir().unwrap();
    let options = sample_site(dir.path());
    let artifact = dir.path().join("dist").join("content-manifest.json");

    let built = ManifestProvider::build(&options).unwrap();
    write_artifact(&built.manifest().unwrap(), &artifact).unwrap();

    let from_disk = ManifestProvider::from_artifact(&artifact).unwrap();
    let live = ManifestProvider::live(options);

    assert_eq!(*from_disk.manifest().unwrap(), *live.manifest().unwrap());
    assert_eq!(read_artifact(&artifact).unwrap(), *built.manifest().unwrap());
}

#[test]
fn missing_root_contributes_nothing() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("posts"), "hello.md", "Hi\n");

    let options = ManifestOptions::new(vec![
        ContentRoot::new(dir.path().join("posts")),
        ContentRoot::new(dir.path().join("snippets")),
    ]);
    let manifest = generate_manifest(&options).unwrap();
    assert_eq!(manifest.len(), 1);
}

#[test]
fn no_roots_is_a_configuration_error() {
    let options = ManifestOptions::new(Vec::new());
    assert!(matches!(
        generate_manifest(&options),
        Err(ManifestError::NoContentRoots)
    ));
    assert!(ManifestProvider::live(options).manifest().is_err());
}

#[test]
fn broken_file_does_not_abort_scan() {
    let dir = tempdir().unwrap();
    let posts = dir.path().join("posts");
    write(&posts, "a.md", "---\ntitle: A\n---\n");
    write(&posts, "b.md", "---\ntitle: B\n");
    write(&posts, "c.md", "---\ntitle: C\n---\n");

    let manifest = generate_manifest(&ManifestOptions::new(vec![ContentRoot::new(&posts)])).unwrap();
    let slugs: Vec<&str> = manifest.files.iter().map(|f| f.slug.as_str()).collect();
    assert_eq!(slugs, vec!["a", "c"]);
    assert_eq!(manifest.diagnostics.len(), 1);
}

#[test]
fn lookup_handles_trailing_slash_and_misses() {
    let dir = tempdir().unwrap();
    let options = sample_site(dir.path());
    let manifest = generate_manifest(&options).unwrap();
    let lookup = LookupService::new(&manifest);

    let exact = lookup.get_by_url_path("/my-post").unwrap();
    let slashed = lookup.get_by_url_path("/my-post/").unwrap();
    assert_eq!(exact, slashed);
    assert!(lookup.get_by_url_path("/nope").is_none());

    let journal = lookup
        .list_roots(&options, &["journal".to_string()])
        .unwrap();
    assert_eq!(journal.len(), 1);
    assert_eq!(journal[0].slug, "day-one");
}

#[test]
fn route_table_mirrors_manifest() {
    let dir = tempdir().unwrap();
    let manifest = generate_manifest(&sample_site(dir.path())).unwrap();
    let routes = route_table(&manifest);

    assert_eq!(routes.len(), manifest.len());
    assert_eq!(routes[3].path, "/journal/day-one");
    assert_eq!(routes[3].id, "day-one");
}

struct FailsFirst;

impl Highlighter for FailsFirst {
    fn highlight(&self, code: &str, lang: &str) -> Result<String, HighlightError> {
        if code.starts_with("fail") {
            return Err(HighlightError::UnknownTheme(lang.to_string()));
        }
        Ok(format!("<pre class=\"{}\">{}</pre>", lang, code.trim_end()))
    }
}

#[test]
fn post_rendering_keys_and_isolates_code_blocks() {
    let dir = tempdir().unwrap();
    let posts = dir.path().join("posts");
    write(
        &posts,
        "code.md",
        "Intro\n\n```js\nfail here\n```\n\n```jsx live\n<Demo />\n```\n\n```rust\nok\n```\n",
    );

    let manifest = generate_manifest(&ManifestOptions::new(vec![ContentRoot::new(&posts)])).unwrap();
    let rendered = render_post(&manifest.files[0], &FailsFirst);

    assert_eq!(
        rendered.code_blocks.keys().collect::<Vec<_>>(),
        vec![BlockKey(0), BlockKey(1)]
    );
    assert_eq!(
        rendered.code_blocks.get(BlockKey(0)),
        Some("<pre><code>fail here\n</code></pre>")
    );
    assert_eq!(
        rendered.code_blocks.get(BlockKey(1)),
        Some("<pre class=\"rust\">ok</pre>")
    );
    assert!(rendered.html.contains("<p>Intro</p>"));
    assert!(rendered.html.contains("data-language=\"jsx\""));
}

#[test]
fn loose_frontmatter_values_are_kept() {
    let dir = tempdir().unwrap();
    let posts = dir.path().join("posts");
    write(&posts, "single.md", "---\ntitle: Single\ntags: rust\n---\n");
    write(&posts, "mixed.md", "---\ntitle: Mixed\ntags: [rust, 2024]\n---\n");
    write(
        &posts,
        "stamped.md",
        "---\ntitle: Stamped\ndate: 2024-03-05 10:00:00 +01:00\n---\n",
    );

    let manifest = generate_manifest(&ManifestOptions::new(vec![ContentRoot::new(&posts)])).unwrap();
    assert!(manifest.diagnostics.is_empty());
    assert_eq!(manifest.len(), 3);

    let single = manifest.find_by_slug("single").unwrap();
    assert_eq!(single.attributes.tags, Some(vec!["rust".to_string()]));

    let mixed = manifest.find_by_slug("mixed").unwrap();
    assert_eq!(
        mixed.attributes.tags,
        Some(vec!["rust".to_string(), "2024".to_string()])
    );

    assert!(manifest.find_by_slug("stamped").is_some());
}
