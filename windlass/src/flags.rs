use std::path::PathBuf;

xflags::xflags! {
    /// Builds the Semantic Anchors catalog data, reference documents, pages
    /// and sitemap.
    cmd windlass {
        /// Project root. Defaults to the current directory.
        optional -r, --root root: PathBuf
        /// Settings file. Defaults to `anchorage.toml` in the root.
        optional -c, --config config: PathBuf
        /// Log more: once for debug, twice for trace.
        repeated -v, --verbose

        /// Extract and validate the anchors, then write the data files.
        cmd extract {}
        /// Write `all-anchors.adoc` and `llms.txt`.
        cmd reference {}
        /// Render the configured pages to HTML.
        cmd render {}
        /// Write `sitemap.xml`.
        cmd sitemap {}
        /// Run extract, reference, render and sitemap.
        cmd build {}
        /// Print the Markdown conversion of an AsciiDoc file.
        cmd convert {
            required file: PathBuf
            /// Shift every heading by this many levels.
            optional --offset offset: i8
        }
        /// Search the catalog and print the matching anchor ids.
        cmd search {
            repeated terms: String
            /// Search a published site instead of the local project.
            optional --site site: String
            /// Language of the anchor documents.
            optional --lang lang: String
        }
    }
}
