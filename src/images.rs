//! Raster image audit and WebP conversion for the assets directory.

use crate::discovery::find_markdown_files;
use anyhow::{Context, Result};
use image::ImageFormat;
use image::imageops::FilterType;
use std::path::Path;

/// Files above this size are reported as heavy.
pub const HEAVY_THRESHOLD: u64 = 500 * 1024;

pub const DEFAULT_MAX_WIDTH: u32 = 2000;

const OPTIMIZABLE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

const HEAVY_SHOWN: usize = 20;
const NOT_WEBP_SHOWN: usize = 10;

/// A convertible image, relative to the assets directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: String,
    pub size: u64,
}

/// Every png/jpg/jpeg/gif file under `assets_dir`.
pub fn find_optimizable(assets_dir: &Path) -> Vec<ImageFile> {
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    };
    let base = glob::Pattern::escape(&assets_dir.to_string_lossy());

    let mut files = Vec::new();
    for ext in OPTIMIZABLE_EXTENSIONS {
        let pattern = format!("{}/**/*.{}", base, ext);
        let Ok(paths) = glob::glob_with(&pattern, options) else {
            continue;
        };
        for path in paths.flatten() {
            let Ok(rel) = path.strip_prefix(assets_dir) else {
                continue;
            };
            let size = match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() => meta.len(),
                _ => continue,
            };
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            files.push(ImageFile { path: rel, size });
        }
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

/// Optimizable images split into heavy ones and the rest.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Unoptimized {
    /// Largest first.
    pub heavy: Vec<ImageFile>,
    /// Largest first.
    pub not_webp: Vec<ImageFile>,
}

impl Unoptimized {
    pub fn classify(mut files: Vec<ImageFile>) -> Self {
        files.sort_by(|a, b| b.size.cmp(&a.size));
        let (heavy, not_webp) = files.into_iter().partition(|f| f.size > HEAVY_THRESHOLD);
        Self { heavy, not_webp }
    }

    pub fn len(&self) -> usize {
        self.heavy.len() + self.not_webp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Print the heavy / not-WebP report. Returns the number of findings.
pub fn check_unoptimized(assets_dir: &Path) -> usize {
    let files = find_optimizable(assets_dir);
    let total = files.len();
    let report = Unoptimized::classify(files);

    if report.is_empty() {
        println!("\u{2713} {} images checked, all optimized", total);
        return 0;
    }

    println!("Found {} unoptimized images:\n", report.len());

    if !report.heavy.is_empty() {
        println!("  Heavy images (>500KB):");
        print_listing(&report.heavy, HEAVY_SHOWN);
        println!();
    }
    if !report.not_webp.is_empty() {
        println!("  Not WebP ({} files)", report.not_webp.len());
        print_listing(&report.not_webp, NOT_WEBP_SHOWN);
    }

    println!("\nRun 'docs-lint images optimize' to convert to WebP");
    report.len()
}

fn print_listing(files: &[ImageFile], shown: usize) {
    for img in files.iter().take(shown) {
        println!("    {} ({})", img.path, format_size(img.size));
    }
    if files.len() > shown {
        println!("    ... and {} more", files.len() - shown);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OptimizeOptions {
    pub dry_run: bool,
    pub keep_originals: bool,
    pub max_width: u32,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            keep_originals: false,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

/// A planned or completed conversion, paths relative to the assets directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Default)]
pub struct OptimizeReport {
    pub renames: Vec<Rename>,
    pub original_bytes: u64,
    pub new_bytes: u64,
    pub failed: usize,
    pub updated_docs: usize,
}

fn webp_name(path: &str) -> String {
    match path.rfind('.') {
        Some(dot) => format!("{}.webp", &path[..dot]),
        None => format!("{}.webp", path),
    }
}

/// Decode `src`, downscale to `max_width` when wider, write lossless WebP to `dest`.
pub fn convert_to_webp(src: &Path, dest: &Path, max_width: u32) -> Result<()> {
    let mut img = image::open(src).with_context(|| format!("decoding {}", src.display()))?;
    if max_width > 0 && img.width() > max_width {
        let height = (u64::from(img.height()) * u64::from(max_width) / u64::from(img.width())).max(1);
        img = img.resize_exact(max_width, height as u32, FilterType::Lanczos3);
    }
    image::DynamicImage::ImageRgba8(img.to_rgba8())
        .save_with_format(dest, ImageFormat::WebP)
        .with_context(|| format!("encoding {}", dest.display()))
}

fn savings(before: u64, after: u64) -> i64 {
    if before == 0 {
        return 0;
    }
    ((1.0 - after as f64 / before as f64) * 100.0).round() as i64
}

/// Convert every optimizable image to WebP and rewrite markdown references.
pub fn optimize(assets_dir: &Path, docs_dir: &Path, options: &OptimizeOptions) -> Result<OptimizeReport> {
    let files = find_optimizable(assets_dir);
    let mut report = OptimizeReport::default();
    if files.is_empty() {
        println!("No images to optimize");
        return Ok(report);
    }
    println!("Found {} images to optimize\n", files.len());

    for file in &files {
        let to = webp_name(&file.path);
        if options.dry_run {
            println!("  Would convert: {} -> {}", file.path, to);
            report.renames.push(Rename {
                from: file.path.clone(),
                to,
            });
            continue;
        }

        let src = assets_dir.join(&file.path);
        let dest = assets_dir.join(&to);
        if let Err(e) = convert_to_webp(&src, &dest, options.max_width) {
            eprintln!("  Error converting {}: {:#}", file.path, e);
            report.failed += 1;
            continue;
        }
        let new_size = std::fs::metadata(&dest)
            .with_context(|| format!("reading {}", dest.display()))?
            .len();
        println!(
            "  {} -> {} ({} -> {}, -{}%)",
            file.path,
            to,
            format_size(file.size),
            format_size(new_size),
            savings(file.size, new_size)
        );
        report.original_bytes += file.size;
        report.new_bytes += new_size;

        if !options.keep_originals {
            std::fs::remove_file(&src).with_context(|| format!("removing {}", src.display()))?;
        }
        report.renames.push(Rename {
            from: file.path.clone(),
            to,
        });
    }

    if report.renames.is_empty() {
        return Ok(report);
    }
    if options.dry_run {
        println!("\nWould update references in {}/", docs_dir.display());
        return Ok(report);
    }

    println!("\nUpdating markdown references...");
    report.updated_docs = update_references(docs_dir, &report.renames)?;
    if report.updated_docs > 0 {
        println!("  Updated references in {} file(s)", report.updated_docs);
    }
    println!(
        "\nDone: {} images converted ({} -> {}, -{}%)",
        report.renames.len(),
        format_size(report.original_bytes),
        format_size(report.new_bytes),
        savings(report.original_bytes, report.new_bytes)
    );
    Ok(report)
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Apply `renames` by basename to `content`. Returns `None` when nothing changed.
pub fn rewrite_references(content: &str, renames: &[Rename]) -> Option<String> {
    let mut text = content.to_string();
    let mut changed = false;
    for rename in renames {
        let from = basename(&rename.from);
        let to = basename(&rename.to);
        if text.contains(from) {
            text = text.replace(from, to);
            changed = true;
        }
        let from_encoded = encode_uri_component(from).replace("%20", " ");
        if from_encoded != from && text.contains(&from_encoded) {
            text = text.replace(&from_encoded, &encode_uri_component(to).replace("%20", " "));
            changed = true;
        }
    }
    changed.then_some(text)
}

/// Rewrite image references in every markdown file under `docs_dir`.
/// Returns the number of files written.
pub fn update_references(docs_dir: &Path, renames: &[Rename]) -> Result<usize> {
    let mut updated = 0;
    for rel in find_markdown_files(docs_dir, &[]) {
        let path = docs_dir.join(&rel);
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        if let Some(rewritten) = rewrite_references(&content, renames) {
            std::fs::write(&path, rewritten).with_context(|| format!("writing {}", path.display()))?;
            log::debug!("updated image references in {}", rel);
            updated += 1;
        }
    }
    Ok(updated)
}

/// Percent-encode everything except unreserved URI component characters.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.0}KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbImage::new(width, height).save(path).unwrap();
    }

    #[test]
    fn sizes() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(2048), "2KB");
        assert_eq!(format_size(1536 * 1024), "1.5MB");
    }

    #[test]
    fn uri_component_encoding() {
        assert_eq!(encode_uri_component("my image (1).png"), "my%20image%20(1).png");
        assert_eq!(encode_uri_component("a&b.png"), "a%26b.png");
        assert_eq!(encode_uri_component("ü.png"), "%C3%BC.png");
    }

    #[test]
    fn classification_by_size() {
        let files = vec![
            ImageFile { path: "small.png".into(), size: 10 },
            ImageFile { path: "big.jpg".into(), size: HEAVY_THRESHOLD + 1 },
            ImageFile { path: "edge.gif".into(), size: HEAVY_THRESHOLD },
        ];
        let report = Unoptimized::classify(files);
        assert_eq!(report.heavy.len(), 1);
        assert_eq!(report.heavy[0].path, "big.jpg");
        assert_eq!(
            report.not_webp.iter().map(|f| f.path.as_str()).collect::<Vec<_>>(),
            vec!["edge.gif", "small.png"]
        );
    }

    #[test]
    fn finds_only_convertible_formats() {
        let tmp = TempDir::new().unwrap();
        let assets = tmp.path().join("assets");
        write_png(&assets.join("nested/a.png"), 1, 1);
        fs::write(assets.join("b.webp"), "x").unwrap();
        fs::write(assets.join("c.svg"), "x").unwrap();
        fs::write(assets.join("d.jpg"), "x").unwrap();

        let paths: Vec<String> = find_optimizable(&assets).into_iter().map(|f| f.path).collect();
        assert_eq!(paths, vec!["d.jpg", "nested/a.png"]);
    }

    #[test]
    fn references_rewritten_by_basename() {
        let renames = vec![
            Rename { from: "shots/login.png".into(), to: "shots/login.webp".into() },
            Rename { from: "my shot.jpg".into(), to: "my shot.webp".into() },
        ];
        let content = "![a](../assets/shots/login.png)\n![b](<my shot.jpg>)\n";
        assert_eq!(
            rewrite_references(content, &renames).as_deref(),
            Some("![a](../assets/shots/login.webp)\n![b](<my shot.webp>)\n")
        );
        assert_eq!(rewrite_references("no images", &renames), None);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let tmp = TempDir::new().unwrap();
        let assets = tmp.path().join("assets");
        let docs = tmp.path().join("docs");
        write_png(&assets.join("a.png"), 2, 2);
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("page.md"), "![a](a.png)\n").unwrap();

        let options = OptimizeOptions { dry_run: true, ..Default::default() };
        let report = optimize(&assets, &docs, &options).unwrap();
        assert_eq!(report.renames, vec![Rename { from: "a.png".into(), to: "a.webp".into() }]);
        assert!(assets.join("a.png").is_file());
        assert!(!assets.join("a.webp").exists());
        assert_eq!(fs::read_to_string(docs.join("page.md")).unwrap(), "![a](a.png)\n");
    }

    #[test]
    fn optimize_converts_downscales_and_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let assets = tmp.path().join("assets");
        let docs = tmp.path().join("docs");
        write_png(&assets.join("wide.png"), 40, 20);
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("page.md"), "# Page\n![w](../assets/wide.png)\n").unwrap();

        let options = OptimizeOptions { max_width: 10, ..Default::default() };
        let report = optimize(&assets, &docs, &options).unwrap();
        assert_eq!(report.renames.len(), 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.updated_docs, 1);

        assert!(!assets.join("wide.png").exists());
        assert_eq!(image::image_dimensions(assets.join("wide.webp")).unwrap(), (10, 5));
        assert_eq!(
            fs::read_to_string(docs.join("page.md")).unwrap(),
            "# Page\n![w](../assets/wide.webp)\n"
        );

        let again = optimize(&assets, &docs, &options).unwrap();
        assert!(again.renames.is_empty());
    }

    #[test]
    fn keep_originals_and_skip_undecodable() {
        let tmp = TempDir::new().unwrap();
        let assets = tmp.path().join("assets");
        let docs = tmp.path().join("docs");
        write_png(&assets.join("ok.png"), 2, 2);
        fs::write(assets.join("broken.jpg"), "not a jpeg").unwrap();
        fs::create_dir_all(&docs).unwrap();

        let options = OptimizeOptions { keep_originals: true, ..Default::default() };
        let report = optimize(&assets, &docs, &options).unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.renames.len(), 1);
        assert!(assets.join("ok.png").is_file());
        assert!(assets.join("ok.webp").is_file());
        assert!(assets.join("broken.jpg").is_file());
    }
}
