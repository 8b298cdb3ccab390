use eframe::egui::Color32;
use url::Url;

use crate::crawl::GraphNode;

use super::filter::FilteredGraph;

/// Reserved for the seed node; no other node is drawn in this hue band.
pub(in crate::app) const SEED_ORANGE: Color32 = Color32::from_rgb(0xF5, 0x9E, 0x0B);
pub(in crate::app) const SEED_BORDER: Color32 = Color32::BLACK;

const SEED_HUE_BAND: u32 = 18;
const SEED_HUE_ROTATION: u32 = 60;
const LABEL_MAX_CHARS: usize = 80;

/// A filtered node plus everything the canvas needs to draw it.
#[derive(Clone, Debug, PartialEq)]
pub(in crate::app) struct VisualNode {
    pub(in crate::app) node: GraphNode,
    pub(in crate::app) short_label: String,
    pub(in crate::app) normalized_domain: String,
    pub(in crate::app) size_px: f32,
    pub(in crate::app) fill_color: Color32,
    pub(in crate::app) border_color: Color32,
    pub(in crate::app) is_seed: bool,
    pub(in crate::app) is_same_domain_as_seed: bool,
}

pub(in crate::app) fn encode_nodes(filtered: &FilteredGraph) -> Vec<VisualNode> {
    let seed_id = filtered.seed_node.as_ref().map(|seed| seed.id.as_str());
    let seed_domain = filtered
        .seed_node
        .as_ref()
        .map(|seed| normalize_domain(&seed.domain, &seed.url));

    filtered
        .nodes
        .iter()
        .map(|node| {
            let normalized_domain = normalize_domain(&node.domain, &node.url);
            let is_seed = seed_id == Some(node.id.as_str());
            let is_same_domain_as_seed = seed_domain
                .as_deref()
                .is_some_and(|domain| !domain.is_empty() && domain == normalized_domain);

            VisualNode {
                short_label: readable_label(&node.url),
                size_px: size_by_depth(node.depth),
                fill_color: domain_fill_color(&normalized_domain, is_seed),
                border_color: domain_border_color(&normalized_domain, is_seed),
                is_seed,
                is_same_domain_as_seed,
                normalized_domain,
                node: node.clone(),
            }
        })
        .collect()
}

fn host_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(str::to_lowercase)
}

/// Lower-cased host without `www.` or port. An empty `domain` is derived from `url`;
/// an unparseable url yields an empty string.
pub(in crate::app) fn normalize_domain(domain: &str, url_fallback: &str) -> String {
    let raw = domain.trim().to_lowercase();
    let base = if raw.is_empty() {
        host_from_url(url_fallback).unwrap_or_default()
    } else {
        raw
    };

    let without_www = base.strip_prefix("www.").unwrap_or(&base);
    without_www
        .split(':')
        .next()
        .unwrap_or_default()
        .to_owned()
}

fn truncate_label(text: &str) -> String {
    if text.chars().count() > LABEL_MAX_CHARS {
        let mut truncated = text.chars().take(LABEL_MAX_CHARS).collect::<String>();
        truncated.push('…');
        truncated
    } else {
        text.to_owned()
    }
}

/// `host/…/last-segment`, or just the host for root paths.
pub(in crate::app) fn readable_label(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return truncate_label(url);
    };

    let host = parsed.host_str().unwrap_or_default();
    let label = match parsed.path().split('/').rfind(|part| !part.is_empty()) {
        Some(last) => format!("{host}/…/{last}"),
        None => host.to_owned(),
    };
    truncate_label(&label)
}

/// Seed biggest, deeper nodes never bigger than shallower ones.
pub(in crate::app) fn size_by_depth(depth: u32) -> f32 {
    match depth {
        0 => 78.0,
        1 => 54.0,
        2 => 40.0,
        _ => 32.0,
    }
}

/// Polynomial (base 31) hash over UTF-16 code units, folded into a hue.
pub(in crate::app) fn hash_hue(text: &str) -> u32 {
    let hash = text
        .encode_utf16()
        .fold(0u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(u32::from(unit)));
    hash % 360
}

pub(in crate::app) fn hsl_to_color(hue: u32, saturation: f64, lightness: f64) -> Color32 {
    let saturation = saturation / 100.0;
    let lightness = lightness / 100.0;

    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = f64::from(hue % 360) / 60.0;
    let x = chroma * (1.0 - ((sector % 2.0) - 1.0).abs());

    let (r1, g1, b1) = match sector {
        s if s < 1.0 => (chroma, x, 0.0),
        s if s < 2.0 => (x, chroma, 0.0),
        s if s < 3.0 => (0.0, chroma, x),
        s if s < 4.0 => (0.0, x, chroma),
        s if s < 5.0 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    let m = lightness - chroma / 2.0;
    let channel = |value: f64| ((value + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgb(channel(r1), channel(g1), channel(b1))
}

/// Hue in whole degrees of an opaque color.
pub(in crate::app) fn color_hue(color: Color32) -> u32 {
    let r = f64::from(color.r()) / 255.0;
    let g = f64::from(color.g()) / 255.0;
    let b = f64::from(color.b()) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    if delta == 0.0 {
        return 0;
    }

    let sector = if max == r {
        ((g - b) / delta) % 6.0
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    let hue = (sector * 60.0).round();
    if hue < 0.0 {
        (hue + 360.0) as u32
    } else {
        hue as u32
    }
}

fn hue_distance(a: u32, b: u32) -> u32 {
    let diff = a.abs_diff(b) % 360;
    diff.min(360 - diff)
}

fn domain_hue(domain_norm: &str) -> u32 {
    if domain_norm.is_empty() {
        hash_hue("unknown")
    } else {
        hash_hue(domain_norm)
    }
}

/// Non-seed hues near the seed orange are rotated away from it.
pub(in crate::app) fn safe_domain_hue(domain_norm: &str) -> u32 {
    let hue = domain_hue(domain_norm);
    if hue_distance(hue, color_hue(SEED_ORANGE)) <= SEED_HUE_BAND {
        (hue + SEED_HUE_ROTATION) % 360
    } else {
        hue
    }
}

pub(in crate::app) fn domain_fill_color(domain_norm: &str, is_seed: bool) -> Color32 {
    if is_seed {
        return SEED_ORANGE;
    }
    hsl_to_color(safe_domain_hue(domain_norm), 85.0, 55.0)
}

pub(in crate::app) fn domain_border_color(domain_norm: &str, is_seed: bool) -> Color32 {
    if is_seed {
        return SEED_BORDER;
    }
    hsl_to_color(domain_hue(domain_norm), 85.0, 22.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_domains() {
        assert_eq!(normalize_domain("WWW.Example.COM", ""), "example.com");
        assert_eq!(normalize_domain("example.com:8080", ""), "example.com");
        assert_eq!(normalize_domain("  sub.example.com ", ""), "sub.example.com");
        assert_eq!(
            normalize_domain("", "https://www.Docs.Rust-Lang.org:443/std"),
            "docs.rust-lang.org"
        );
        assert_eq!(normalize_domain("", "not a url"), "");
    }

    #[test]
    fn labels_use_host_and_last_segment() {
        assert_eq!(readable_label("https://example.com"), "example.com");
        assert_eq!(readable_label("https://example.com/"), "example.com");
        assert_eq!(
            readable_label("https://example.com/a/b/page.html?x=1"),
            "example.com/…/page.html"
        );
        assert_eq!(readable_label("https://example.com/docs/"), "example.com/…/docs");
    }

    #[test]
    fn labels_are_truncated_with_ellipsis() {
        let long_segment = "x".repeat(120);
        let label = readable_label(&format!("https://example.com/{long_segment}"));
        assert_eq!(label.chars().count(), 81);
        assert!(label.ends_with('…'));

        let raw = "y".repeat(100);
        let fallback = readable_label(&raw);
        assert_eq!(fallback, format!("{}…", "y".repeat(80)));
        assert_eq!(readable_label("::bad::"), "::bad::");
    }

    #[test]
    fn size_is_non_increasing_in_depth() {
        let sizes = (0..8).map(size_by_depth).collect::<Vec<_>>();
        assert_eq!(&sizes[..4], &[78.0, 54.0, 40.0, 32.0]);
        for pair in sizes.windows(2) {
            assert!(pair[0] >= pair[1], "sizes must not grow with depth: {sizes:?}");
        }
    }

    #[test]
    fn hash_hue_matches_known_values() {
        assert_eq!(hash_hue(""), 0);
        assert_eq!(hash_hue("a"), 97);
        // ((97 * 31) + 98) % 360
        assert_eq!(hash_hue("ab"), 3105 % 360);
    }

    #[test]
    fn hsl_conversion_hits_primary_colors() {
        assert_eq!(hsl_to_color(0, 100.0, 50.0), Color32::from_rgb(255, 0, 0));
        assert_eq!(hsl_to_color(120, 100.0, 50.0), Color32::from_rgb(0, 255, 0));
        assert_eq!(hsl_to_color(240, 100.0, 50.0), Color32::from_rgb(0, 0, 255));
        assert_eq!(hsl_to_color(0, 0.0, 100.0), Color32::from_rgb(255, 255, 255));
    }

    #[test]
    fn seed_orange_hue_is_38_degrees() {
        assert_eq!(color_hue(SEED_ORANGE), 38);
    }

    #[test]
    fn colors_are_pure_functions_of_domain() {
        let domains = ["example.com", "rust-lang.org", "a.b.c", "", "unknown", "docs.rs"];
        let first = domains
            .iter()
            .map(|domain| domain_fill_color(domain, false))
            .collect::<Vec<_>>();
        let reversed = domains
            .iter()
            .rev()
            .map(|domain| domain_fill_color(domain, false))
            .collect::<Vec<_>>();

        for (index, color) in first.iter().enumerate() {
            assert_eq!(*color, reversed[domains.len() - 1 - index]);
            assert_eq!(*color, domain_fill_color(domains[index], false));
        }
        assert_eq!(domain_fill_color("", false), domain_fill_color("unknown", false));
    }

    #[test]
    fn seed_always_gets_reserved_color() {
        for domain in ["example.com", "", "zzz"] {
            assert_eq!(domain_fill_color(domain, true), SEED_ORANGE);
            assert_eq!(domain_border_color(domain, true), SEED_BORDER);
        }
    }

    #[test]
    fn non_seed_hues_stay_out_of_seed_band() {
        let seed_hue = color_hue(SEED_ORANGE);
        let mut rotated = 0;
        for index in 0..5000 {
            let domain = format!("host-{index}.test");
            let hue = safe_domain_hue(&domain);
            assert!(
                hue_distance(hue, seed_hue) > SEED_HUE_BAND,
                "{domain} landed on hue {hue}"
            );
            if hue != hash_hue(&domain) {
                rotated += 1;
            }
        }
        assert!(rotated > 0, "some domains should have needed rotation");
    }

    #[test]
    fn encodes_seed_and_same_domain_flags() {
        let seed = GraphNode {
            id: "s".to_owned(),
            url: "https://www.example.com".to_owned(),
            domain: String::new(),
            depth: 0,
            pagerank: 0.3,
        };
        let sibling = GraphNode {
            id: "n".to_owned(),
            url: "https://example.com/about".to_owned(),
            domain: "Example.com".to_owned(),
            depth: 1,
            pagerank: 0.2,
        };
        let other = GraphNode {
            id: "o".to_owned(),
            url: "https://other.test/x".to_owned(),
            domain: "other.test".to_owned(),
            depth: 4,
            pagerank: 0.1,
        };
        let filtered = FilteredGraph {
            seed_url: seed.url.clone(),
            seed_node: Some(seed.clone()),
            nodes: vec![seed, sibling, other],
            edges: Vec::new(),
        };

        let visual = encode_nodes(&filtered);

        assert!(visual[0].is_seed);
        assert_eq!(visual[0].fill_color, SEED_ORANGE);
        assert_eq!(visual[0].size_px, 78.0);
        assert!(visual[0].is_same_domain_as_seed);
        assert!(!visual[1].is_seed);
        assert!(visual[1].is_same_domain_as_seed);
        assert_eq!(visual[1].short_label, "example.com/…/about");
        assert!(!visual[2].is_same_domain_as_seed);
        assert_eq!(visual[2].size_px, 32.0);
        assert_eq!(visual.iter().filter(|node| node.is_seed).count(), 1);
    }
}
